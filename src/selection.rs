//! Ticket selection and the bulk edits applied over it.
//!
//! Bulk operations validate their input before touching any ticket, then
//! apply to each selected ticket independently. Tickets deleted since they
//! were selected are skipped.

use crate::model::{is_blank, validate_tags, BoardError, TicketId};
use crate::storage::BoardPersistence;
use crate::store::{BoardStore, Result};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<TicketId>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    /// Adds `ticket_id` if absent, removes it if present. Returns whether the
    /// ticket is selected afterwards.
    pub fn toggle<P: BoardPersistence>(&mut self, store: &BoardStore<P>, ticket_id: &str) -> Result<bool> {
        if self.ids.remove(ticket_id) {
            return Ok(false);
        }
        if store.board().ticket(ticket_id).is_none() {
            return Err(BoardError::TicketNotFound(ticket_id.to_string()));
        }
        self.ids.insert(ticket_id.to_string());
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn prune(&mut self, ticket_id: &str) {
        self.ids.remove(ticket_id);
    }

    pub fn contains(&self, ticket_id: &str) -> bool {
        self.ids.contains(ticket_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &TicketId> {
        self.ids.iter()
    }

    pub fn bulk_move<P: BoardPersistence>(&self, store: &mut BoardStore<P>, column_id: &str) -> Result<usize> {
        self.ensure_not_empty()?;
        store.ensure_column(column_id)?;
        let moved = store.update_tickets(&self.snapshot(), |t| t.column_id = column_id.to_string());
        debug!(column = %column_id, moved, "bulk move");
        Ok(moved)
    }

    pub fn bulk_reassign<P: BoardPersistence>(&self, store: &mut BoardStore<P>, assignee: &str) -> Result<usize> {
        if is_blank(assignee) {
            return Err(BoardError::Validation("Assignee cannot be empty".into()));
        }
        self.ensure_not_empty()?;
        let assignee = assignee.trim();
        let updated = store.update_tickets(&self.snapshot(), |t| t.assignee = assignee.to_string());
        debug!(assignee, updated, "bulk reassign");
        Ok(updated)
    }

    pub fn bulk_add_tag<P: BoardPersistence>(&self, store: &mut BoardStore<P>, tag: &str) -> Result<usize> {
        if is_blank(tag) {
            return Err(BoardError::Validation("Tag cannot be empty".into()));
        }
        validate_tags([tag])?;
        self.ensure_not_empty()?;
        let tag = tag.trim();
        let updated = store.update_tickets(&self.snapshot(), |t| {
            t.add_tag(tag);
        });
        debug!(tag, updated, "bulk tag");
        Ok(updated)
    }

    pub fn bulk_delete<P: BoardPersistence>(&mut self, store: &mut BoardStore<P>) -> Result<usize> {
        self.ensure_not_empty()?;
        let removed = store.remove_tickets(&self.snapshot());
        self.clear();
        debug!(removed, "bulk delete");
        Ok(removed)
    }

    fn ensure_not_empty(&self) -> Result<()> {
        if self.ids.is_empty() {
            return Err(BoardError::Validation("No tickets selected".into()));
        }
        Ok(())
    }

    fn snapshot(&self) -> Vec<TicketId> {
        self.ids.iter().cloned().collect()
    }
}
