use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yml";
pub const DEFAULT_STORAGE_KEY: &str = "kanbandesk-data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub storage_key: String,
    /// Fallback filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub assume_yes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: "warn".to_string(),
            assume_yes: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        match ProjectDirs::from("", "", "kanbandesk") {
            Some(dirs) => Self::from_path(&dirs.config_dir().join(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn storage_file_name(&self) -> String {
        format!("{}.json", self.storage_key)
    }

    fn validate(&self) -> Result<()> {
        let key = self.storage_key.trim();
        if key.is_empty() {
            bail!("storage_key must not be empty");
        }
        if key.contains(['/', '\\']) {
            bail!("storage_key must not contain path separators: {}", key);
        }
        Ok(())
    }
}
