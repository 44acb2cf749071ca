//! Board state engine for a local ticket/kanban desk: columns, tickets,
//! selection and bulk edits, drag reordering, search and CSV exchange.

pub mod config;
pub mod csv;
pub mod desk;
pub mod drag;
pub mod model;
pub mod notify;
pub mod search;
pub mod selection;
pub mod storage;
pub mod store;

pub use desk::{CsvExport, Desk};
pub use model::{BoardError, BoardState, Column, Priority, Ticket, TicketDraft};
pub use store::BoardStore;
