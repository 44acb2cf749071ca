use crate::model::{
    generate_id, is_blank, normalize_tags, validate_tags, BoardError, BoardState, Column, ColumnId,
    Ticket, TicketDraft, TicketId,
};
use crate::storage::BoardPersistence;
use chrono::Utc;
use tracing::{debug, warn};

pub type Result<T> = std::result::Result<T, BoardError>;

const COLUMN_HAS_TICKETS: &str =
    "Cannot delete column with tickets. Move or delete the tickets first.";

/// Sole owner and writer of the board. Every successful mutation is saved
/// through the injected persistence before returning.
pub struct BoardStore<P: BoardPersistence> {
    board: BoardState,
    persistence: P,
}

impl<P: BoardPersistence> BoardStore<P> {
    pub fn open(persistence: P) -> Self {
        let board = match persistence.load() {
            Ok(Some(board)) => sanitize_loaded(board),
            Ok(None) => BoardState::default_board(),
            Err(err) => {
                warn!(error = %format!("{:#}", err), "saved board unreadable, using default board");
                BoardState::default_board()
            }
        };
        BoardStore { board, persistence }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn add_column(&mut self, name: &str) -> Result<Column> {
        if is_blank(name) {
            return Err(BoardError::Validation("Column name cannot be empty".into()));
        }
        let column = Column {
            id: generate_id(),
            name: name.trim().to_string(),
            order: self.board.columns.len() as i64,
        };
        self.board.columns.push(column.clone());
        debug!(column = %column.id, name = %column.name, "added column");
        self.persist();
        Ok(column)
    }

    /// Returns `Ok(false)` when no column has `id`; nothing is changed then.
    pub fn rename_column(&mut self, id: &str, new_name: &str) -> Result<bool> {
        if is_blank(new_name) {
            return Err(BoardError::Validation("Column name cannot be empty".into()));
        }
        let Some(idx) = self.board.find_column_index(id) else {
            debug!(column = %id, "rename of unknown column ignored");
            return Ok(false);
        };
        self.board.columns[idx].name = new_name.trim().to_string();
        debug!(column = %id, "renamed column");
        self.persist();
        Ok(true)
    }

    pub fn delete_column(&mut self, id: &str) -> Result<Column> {
        let idx = self
            .board
            .find_column_index(id)
            .ok_or_else(|| BoardError::ColumnNotFound(id.to_string()))?;
        let referencing = self.board.ticket_count(id);
        if referencing > 0 {
            debug!(column = %id, tickets = referencing, "refused to delete non-empty column");
            return Err(BoardError::Conflict(COLUMN_HAS_TICKETS.into()));
        }
        let removed = self.board.columns.remove(idx);
        debug!(column = %id, "deleted column");
        self.persist();
        Ok(removed)
    }

    pub fn add_ticket(&mut self, draft: TicketDraft, column_id: &str) -> Result<Ticket> {
        if is_blank(&draft.title) {
            return Err(BoardError::Validation("Title is required".into()));
        }
        validate_tags(draft.tags.iter().map(String::as_str))?;
        self.ensure_column(column_id)?;
        let ticket = draft.into_ticket(generate_id(), column_id.to_string(), Utc::now());
        self.board.tickets.push(ticket.clone());
        debug!(ticket = %ticket.id, column = %column_id, "added ticket");
        self.persist();
        Ok(ticket)
    }

    /// Replaces the stored ticket with the same id. The creation timestamp of
    /// the stored ticket is kept.
    pub fn edit_ticket(&mut self, mut ticket: Ticket) -> Result<Ticket> {
        if is_blank(&ticket.title) {
            return Err(BoardError::Validation("Title is required".into()));
        }
        validate_tags(ticket.tags.iter().map(String::as_str))?;
        self.ensure_column(&ticket.column_id)?;
        let idx = self
            .board
            .find_ticket_index(&ticket.id)
            .ok_or_else(|| BoardError::TicketNotFound(ticket.id.clone()))?;
        ticket.title = ticket.title.trim().to_string();
        ticket.tags = normalize_tags(std::mem::take(&mut ticket.tags));
        ticket.created_date = self.board.tickets[idx].created_date;
        self.board.tickets[idx] = ticket.clone();
        debug!(ticket = %ticket.id, "edited ticket");
        self.persist();
        Ok(ticket)
    }

    pub fn delete_ticket(&mut self, id: &str) -> Result<Ticket> {
        let idx = self
            .board
            .find_ticket_index(id)
            .ok_or_else(|| BoardError::TicketNotFound(id.to_string()))?;
        let removed = self.board.tickets.remove(idx);
        debug!(ticket = %id, "deleted ticket");
        self.persist();
        Ok(removed)
    }

    /// Returns `Ok(false)` when the ticket already sits in `column_id`.
    pub fn move_ticket_to_column(&mut self, id: &str, column_id: &str) -> Result<bool> {
        self.ensure_column(column_id)?;
        let idx = self
            .board
            .find_ticket_index(id)
            .ok_or_else(|| BoardError::TicketNotFound(id.to_string()))?;
        if self.board.tickets[idx].column_id == column_id {
            return Ok(false);
        }
        self.board.tickets[idx].column_id = column_id.to_string();
        debug!(ticket = %id, column = %column_id, "moved ticket");
        self.persist();
        Ok(true)
    }

    /// Rewrites the order of one column's tickets. `ordered` must hold exactly
    /// the ids currently in that column. Tickets of other columns keep their
    /// slots in the collection.
    pub fn reorder_column(&mut self, column_id: &str, ordered: &[TicketId]) -> Result<()> {
        self.ensure_column(column_id)?;
        let slots: Vec<usize> = self
            .board
            .tickets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.column_id == column_id)
            .map(|(idx, _)| idx)
            .collect();
        let mut current: Vec<&str> = slots.iter().map(|&i| self.board.tickets[i].id.as_str()).collect();
        let mut requested: Vec<&str> = ordered.iter().map(String::as_str).collect();
        current.sort_unstable();
        requested.sort_unstable();
        if current != requested {
            return Err(BoardError::Conflict(format!(
                "new order does not match the tickets in column {}",
                column_id
            )));
        }

        let mut reordered: Vec<Ticket> = Vec::with_capacity(ordered.len());
        for id in ordered {
            if let Some(&slot) = slots.iter().find(|&&i| &self.board.tickets[i].id == id) {
                reordered.push(self.board.tickets[slot].clone());
            }
        }
        for (slot, ticket) in slots.into_iter().zip(reordered) {
            self.board.tickets[slot] = ticket;
        }
        debug!(column = %column_id, "reordered column");
        self.persist();
        Ok(())
    }

    pub fn import_tickets(&mut self, tickets: Vec<Ticket>) -> Result<usize> {
        for ticket in &tickets {
            if is_blank(&ticket.title) {
                return Err(BoardError::Validation("Title is required".into()));
            }
            validate_tags(ticket.tags.iter().map(String::as_str))?;
            self.ensure_column(&ticket.column_id)?;
        }
        let count = tickets.len();
        self.board.tickets.extend(tickets);
        debug!(count, "imported tickets");
        self.persist();
        Ok(count)
    }

    /// Applies `f` to every listed ticket that still exists and saves once.
    /// Returns how many tickets were visited.
    pub(crate) fn update_tickets<F>(&mut self, ids: &[TicketId], mut f: F) -> usize
    where
        F: FnMut(&mut Ticket),
    {
        let mut touched = 0;
        for id in ids {
            match self.board.tickets.iter_mut().find(|t| &t.id == id) {
                Some(ticket) => {
                    f(ticket);
                    touched += 1;
                }
                None => debug!(ticket = %id, "skipping missing ticket"),
            }
        }
        if touched > 0 {
            self.persist();
        }
        touched
    }

    pub(crate) fn remove_tickets(&mut self, ids: &[TicketId]) -> usize {
        let before = self.board.tickets.len();
        self.board.tickets.retain(|t| !ids.contains(&t.id));
        let removed = before - self.board.tickets.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    pub(crate) fn ensure_column(&self, column_id: &str) -> Result<()> {
        match self.board.column(column_id) {
            Some(_) => Ok(()),
            None => Err(BoardError::ColumnNotFound(column_id.to_string())),
        }
    }

    fn persist(&mut self) {
        if let Err(err) = self.persistence.save(&self.board) {
            warn!(error = %format!("{:#}", err), "failed to save board");
        }
    }
}

fn sanitize_loaded(mut board: BoardState) -> BoardState {
    if board.columns.is_empty() && !board.tickets.is_empty() {
        warn!(
            tickets = board.tickets.len(),
            "saved board has tickets but no columns, using default board"
        );
        return BoardState::default_board();
    }
    let repaired = board.repair_orphans();
    if repaired > 0 {
        warn!(repaired, "moved tickets with unknown columns to the leftmost column");
    }
    board
}

pub fn first_column_id(board: &BoardState) -> Option<ColumnId> {
    board.first_column().map(|c| c.id.clone())
}
