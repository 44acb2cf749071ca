//! The operation boundary between user events and the board.
//!
//! A [`Desk`] owns the store, the current selection and the drag gesture.
//! Every operation reports its outcome through the [`Notifier`]; failures
//! come back as `None` with the board left as it was.

use crate::csv;
use crate::drag::{self, DragEffect, DragEvent, DragGesture};
use crate::model::{BoardError, BoardState, Column, Ticket, TicketDraft};
use crate::notify::{Confirm, Notifier, NotifyLevel};
use crate::search;
use crate::selection::Selection;
use crate::storage::BoardPersistence;
use crate::store::{BoardStore, Result};
use chrono::Utc;
use tracing::debug;

pub struct Desk<P: BoardPersistence> {
    store: BoardStore<P>,
    selection: Selection,
    gesture: DragGesture,
    notifier: Box<dyn Notifier>,
    confirm: Box<dyn Confirm>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub contents: String,
    pub tickets: usize,
}

impl<P: BoardPersistence> Desk<P> {
    pub fn new(store: BoardStore<P>, notifier: Box<dyn Notifier>, confirm: Box<dyn Confirm>) -> Self {
        Desk {
            store,
            selection: Selection::new(),
            gesture: DragGesture::Idle,
            notifier,
            confirm,
        }
    }

    pub fn store(&self) -> &BoardStore<P> {
        &self.store
    }

    pub fn board(&self) -> &BoardState {
        self.store.board()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn gesture(&self) -> &DragGesture {
        &self.gesture
    }

    pub fn notify(&self, level: NotifyLevel, message: &str) {
        self.notifier.notify(level, message);
    }

    pub fn add_column(&mut self, name: &str) -> Option<Column> {
        let result = self.store.add_column(name);
        self.report(result, |_| "Column added successfully".into())
    }

    pub fn rename_column(&mut self, id: &str, new_name: &str) -> Option<bool> {
        let result = self.store.rename_column(id, new_name);
        self.report(result, |_| "Column updated successfully".into())
    }

    /// Asks for confirmation only when the delete could succeed.
    pub fn delete_column(&mut self, id: &str) -> Option<Column> {
        let board = self.store.board();
        let deletable = board.column(id).is_some() && board.ticket_count(id) == 0;
        if deletable && !self.confirm.confirm("Are you sure you want to delete this column?") {
            return None;
        }
        let result = self.store.delete_column(id);
        self.report(result, |_| "Column deleted successfully".into())
    }

    pub fn add_ticket(&mut self, draft: TicketDraft, column_id: &str) -> Option<Ticket> {
        let result = self.store.add_ticket(draft, column_id);
        self.report(result, |_| "Ticket created successfully".into())
    }

    pub fn edit_ticket(&mut self, ticket: Ticket) -> Option<Ticket> {
        let result = self.store.edit_ticket(ticket);
        self.report(result, |_| "Ticket updated successfully".into())
    }

    pub fn delete_ticket(&mut self, id: &str) -> Option<Ticket> {
        if self.store.board().ticket(id).is_some()
            && !self.confirm.confirm("Are you sure you want to delete this ticket?")
        {
            return None;
        }
        let result = self.store.delete_ticket(id);
        if result.is_ok() {
            self.selection.prune(id);
        }
        self.report(result, |_| "Ticket deleted successfully".into())
    }

    pub fn move_ticket(&mut self, id: &str, column_id: &str) -> Option<bool> {
        let result = self.store.move_ticket_to_column(id, column_id);
        self.report(result, |_| "Ticket moved successfully".into())
    }

    /// Selection changes are silent unless they fail.
    pub fn toggle_select(&mut self, ticket_id: &str) -> Option<bool> {
        match self.selection.toggle(&self.store, ticket_id) {
            Ok(selected) => Some(selected),
            Err(err) => {
                self.fail(&err);
                None
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn bulk_move(&mut self, column_id: &str) -> Option<usize> {
        let result = self.selection.bulk_move(&mut self.store, column_id);
        self.report(result, |n| format!("Moved {} tickets", n))
    }

    pub fn bulk_reassign(&mut self, assignee: &str) -> Option<usize> {
        let result = self.selection.bulk_reassign(&mut self.store, assignee);
        self.report(result, |n| format!("Reassigned {} tickets", n))
    }

    pub fn bulk_add_tag(&mut self, tag: &str) -> Option<usize> {
        let result = self.selection.bulk_add_tag(&mut self.store, tag);
        self.report(result, |n| format!("Tagged {} tickets", n))
    }

    pub fn bulk_delete(&mut self) -> Option<usize> {
        if !self.selection.is_empty() {
            let prompt = format!(
                "Are you sure you want to delete {} selected tickets?",
                self.selection.len()
            );
            if !self.confirm.confirm(&prompt) {
                return None;
            }
        }
        let result = self.selection.bulk_delete(&mut self.store);
        self.report(result, |n| format!("Deleted {} tickets", n))
    }

    /// Feeds one gesture event through the drag state machine and applies
    /// the resulting effect, if any.
    pub fn drag(&mut self, event: DragEvent) -> Option<DragEffect> {
        let gesture = std::mem::take(&mut self.gesture);
        let (next, effect) = drag::step(gesture, event, self.store.board());
        self.gesture = next;
        let effect = effect?;
        let applied = match &effect {
            DragEffect::MoveToColumn {
                ticket_id,
                column_id,
            } => self.store.move_ticket_to_column(ticket_id, column_id).map(|_| ()),
            DragEffect::Reorder {
                column_id,
                ticket_ids,
            } => self.store.reorder_column(column_id, ticket_ids),
        };
        match applied {
            Ok(()) => {
                debug!(?effect, "applied drag effect");
                Some(effect)
            }
            Err(err) => {
                self.fail(&err);
                None
            }
        }
    }

    pub fn drag_overlay(&self) -> Option<&Ticket> {
        match &self.gesture {
            DragGesture::Dragging { snapshot, .. } => Some(snapshot),
            DragGesture::Idle => None,
        }
    }

    pub fn import_csv(&mut self, text: &str) -> Option<usize> {
        let result = csv::decode(text, &self.store.board().columns)
            .and_then(|tickets| self.store.import_tickets(tickets));
        self.report(result, |n| format!("Imported {} tickets successfully", n))
    }

    /// Builds the export; the caller writes it and reports the outcome.
    pub fn export_csv(&self) -> Option<CsvExport> {
        let board = self.store.board();
        if board.tickets.is_empty() {
            self.fail(&BoardError::Validation("No tickets to export".into()));
            return None;
        }
        Some(CsvExport {
            file_name: csv::export_file_name(Utc::now().date_naive()),
            contents: csv::encode(&board.tickets, &board.columns),
            tickets: board.tickets.len(),
        })
    }

    pub fn visible_tickets(&self, query: &str) -> Vec<&Ticket> {
        search::filter(&self.store.board().tickets, query)
    }

    pub fn column_counts(&self, query: &str) -> Vec<(&Column, usize)> {
        let visible = self.visible_tickets(query);
        search::column_counts(self.store.board(), &visible)
    }

    fn report<T, F>(&self, result: Result<T>, success: F) -> Option<T>
    where
        F: FnOnce(&T) -> String,
    {
        match result {
            Ok(value) => {
                self.notifier.notify(NotifyLevel::Success, &success(&value));
                Some(value)
            }
            Err(err) => {
                self.fail(&err);
                None
            }
        }
    }

    fn fail(&self, err: &BoardError) {
        debug!(error = %err, "operation rejected");
        self.notifier.notify(NotifyLevel::Error, &err.to_string());
    }
}
