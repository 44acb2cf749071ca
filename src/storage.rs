use crate::config::Config;
use crate::model::BoardState;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_DIR: &str = ".kanbandesk";

pub trait BoardPersistence {
    /// `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<BoardState>>;
    fn save(&mut self, board: &BoardState) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardScope {
    Project,
    Global,
}

#[derive(Debug, Clone)]
pub struct BoardLocation {
    pub path: PathBuf,
    pub scope: BoardScope,
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    location: BoardLocation,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    board: Option<BoardState>,
    saves: usize,
}

impl FileStorage {
    pub fn new(location: BoardLocation) -> Self {
        FileStorage { location }
    }

    pub fn location(&self) -> &BoardLocation {
        &self.location
    }
}

impl BoardPersistence for FileStorage {
    fn load(&self) -> Result<Option<BoardState>> {
        let path = &self.location.path;
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let board: BoardState = serde_json::from_str(&data).context("parsing board file")?;
        Ok(Some(board))
    }

    fn save(&mut self, board: &BoardState) -> Result<()> {
        let path = &self.location.path;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        let serialized = serde_json::to_string_pretty(board).context("serializing board")?;
        fs::write(path, serialized).with_context(|| format!("writing {:?}", path))?;
        Ok(())
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn with_board(board: BoardState) -> Self {
        MemoryStorage {
            board: Some(board),
            saves: 0,
        }
    }

    pub fn saved(&self) -> Option<&BoardState> {
        self.board.as_ref()
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl BoardPersistence for MemoryStorage {
    fn load(&self) -> Result<Option<BoardState>> {
        Ok(self.board.clone())
    }

    fn save(&mut self, board: &BoardState) -> Result<()> {
        self.board = Some(board.clone());
        self.saves += 1;
        Ok(())
    }
}

pub fn init_project_board(config: &Config) -> Result<BoardLocation> {
    let cwd = env::current_dir()?;
    let dir = cwd.join(PROJECT_DIR);
    fs::create_dir_all(&dir).context("failed to create .kanbandesk directory")?;
    let location = BoardLocation {
        path: dir.join(config.storage_file_name()),
        scope: BoardScope::Project,
    };
    if !location.path.exists() {
        FileStorage::new(location.clone()).save(&BoardState::default_board())?;
    }
    Ok(location)
}

pub fn locate_board(start: &Path, config: &Config) -> Result<BoardLocation> {
    let file_name = config.storage_file_name();
    if let Some(project_path) = find_project_board(start, &file_name) {
        return Ok(BoardLocation {
            path: project_path,
            scope: BoardScope::Project,
        });
    }
    let dir = match &config.data_dir {
        Some(dir) => dir.clone(),
        None => global_data_dir()?,
    };
    Ok(BoardLocation {
        path: dir.join(file_name),
        scope: BoardScope::Global,
    })
}

fn find_project_board(start: &Path, file_name: &str) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR).join(file_name);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn global_data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "kanbandesk").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TicketDraft;
    use chrono::Utc;
    use tempfile::TempDir;

    fn location_in(dir: &TempDir) -> BoardLocation {
        BoardLocation {
            path: dir.path().join("nested").join("kanbandesk-data.json"),
            scope: BoardScope::Global,
        }
    }

    #[test]
    fn missing_file_loads_as_absent() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(location_in(&dir));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn file_round_trips_board() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(location_in(&dir));
        let mut board = BoardState::default_board();
        board
            .tickets
            .push(TicketDraft::new("Fix bug").into_ticket("t1".into(), "1".into(), Utc::now()));
        storage.save(&board).unwrap();
        assert_eq!(storage.load().unwrap(), Some(board));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let location = location_in(&dir);
        fs::create_dir_all(location.path.parent().unwrap()).unwrap();
        fs::write(&location.path, "{ not json").unwrap();
        assert!(FileStorage::new(location).load().is_err());
    }

    #[test]
    fn project_board_is_found_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let board_dir = dir.path().join(PROJECT_DIR);
        fs::create_dir_all(&board_dir).unwrap();
        fs::write(board_dir.join(config.storage_file_name()), "{}").unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let location = locate_board(&nested, &config).unwrap();
        assert_eq!(location.scope, BoardScope::Project);
        assert_eq!(location.path, board_dir.join("kanbandesk-data.json"));
    }

    #[test]
    fn configured_data_dir_is_used_without_project_board() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: Some(dir.path().join("data")),
            ..Config::default()
        };
        let location = locate_board(dir.path(), &config).unwrap();
        assert_eq!(location.scope, BoardScope::Global);
        assert_eq!(location.path, dir.path().join("data").join("kanbandesk-data.json"));
    }

    #[test]
    fn memory_storage_counts_saves() {
        let mut storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_none());
        storage.save(&BoardState::default_board()).unwrap();
        storage.save(&BoardState::default_board()).unwrap();
        assert_eq!(storage.save_count(), 2);
        assert!(storage.saved().is_some());
    }
}
