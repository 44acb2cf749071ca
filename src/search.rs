use crate::model::{BoardState, Column, Ticket};

/// Case-insensitive substring matcher over a ticket's text fields.
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Returns `None` for blank queries, which match everything.
    pub fn new(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            needle: trimmed.to_lowercase(),
        })
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.matches_field(&ticket.title)
            || self.matches_field(&ticket.description)
            || self.matches_field(&ticket.assignee)
            || self.matches_field(&ticket.customer)
            || ticket.tags.iter().any(|tag| self.matches_field(tag))
    }

    fn matches_field(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}

pub fn filter<'a>(tickets: &'a [Ticket], query: &str) -> Vec<&'a Ticket> {
    match TextMatcher::new(query) {
        Some(matcher) => tickets.iter().filter(|t| matcher.matches(t)).collect(),
        None => tickets.iter().collect(),
    }
}

pub fn column_counts<'a>(board: &'a BoardState, visible: &[&Ticket]) -> Vec<(&'a Column, usize)> {
    board
        .ordered_columns()
        .into_iter()
        .map(|column| {
            let count = visible.iter().filter(|t| t.column_id == column.id).count();
            (column, count)
        })
        .collect()
}
