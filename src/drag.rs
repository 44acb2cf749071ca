//! Drag-and-drop as an explicit gesture state machine.
//!
//! [`step`] never mutates the board. It returns the next gesture state and
//! at most one [`DragEffect`] for the caller to apply to the store.

use crate::model::{BoardState, ColumnId, Ticket, TicketId};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragGesture {
    #[default]
    Idle,
    Dragging {
        active: TicketId,
        /// The ticket as it was when the drag started, for overlay rendering.
        snapshot: Ticket,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Start { active: TicketId },
    /// `over` is a ticket id or a column id.
    Over { over: String },
    End { over: Option<String> },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEffect {
    MoveToColumn {
        ticket_id: TicketId,
        column_id: ColumnId,
    },
    Reorder {
        column_id: ColumnId,
        ticket_ids: Vec<TicketId>,
    },
}

impl DragGesture {
    pub fn active(&self) -> Option<&str> {
        match self {
            DragGesture::Idle => None,
            DragGesture::Dragging { active, .. } => Some(active),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DragGesture::Idle)
    }
}

pub fn step(
    gesture: DragGesture,
    event: DragEvent,
    board: &BoardState,
) -> (DragGesture, Option<DragEffect>) {
    match event {
        DragEvent::Start { active } => match board.ticket(&active) {
            Some(ticket) => (
                DragGesture::Dragging {
                    snapshot: ticket.clone(),
                    active,
                },
                None,
            ),
            None => (DragGesture::Idle, None),
        },
        DragEvent::Over { over } => {
            let effect = gesture
                .active()
                .and_then(|active| cross_column_move(board, active, &over));
            (gesture, effect)
        }
        DragEvent::End { over } => {
            let effect = match (gesture.active(), over.as_deref()) {
                (Some(active), Some(over)) => same_column_reorder(board, active, over),
                _ => None,
            };
            (DragGesture::Idle, effect)
        }
        DragEvent::Cancel => (DragGesture::Idle, None),
    }
}

pub fn resolve_column<'a>(board: &'a BoardState, target: &str) -> Option<&'a str> {
    if let Some(column) = board.column(target) {
        return Some(column.id.as_str());
    }
    board.ticket(target).map(|t| t.column_id.as_str())
}

/// Move of `active` into the column under `over`, if that column differs.
pub fn cross_column_move(board: &BoardState, active: &str, over: &str) -> Option<DragEffect> {
    let current = board.ticket(active)?.column_id.as_str();
    let target = resolve_column(board, over)?;
    if current == target {
        return None;
    }
    Some(DragEffect::MoveToColumn {
        ticket_id: active.to_string(),
        column_id: target.to_string(),
    })
}

/// New order of the shared column after dropping `active` onto ticket `over`.
pub fn same_column_reorder(board: &BoardState, active: &str, over: &str) -> Option<DragEffect> {
    if active == over {
        return None;
    }
    let column = board.ticket(active)?.column_id.as_str();
    if resolve_column(board, over)? != column {
        return None;
    }
    let mut ids: Vec<TicketId> = board.tickets_in(column).map(|t| t.id.clone()).collect();
    let old_index = ids.iter().position(|id| id == active)?;
    let new_index = ids.iter().position(|id| id == over)?;
    array_move(&mut ids, old_index, new_index);
    Some(DragEffect::Reorder {
        column_id: column.to_string(),
        ticket_ids: ids,
    })
}

pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}
