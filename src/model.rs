use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type TicketId = String;
pub type ColumnId = String;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Ticket order inside `tickets` is the display order within each column.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct BoardState {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub order: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub customer: String,
    pub created_date: DateTime<Utc>,
    #[serde(default, with = "due_date_format")]
    pub due_date: Option<NaiveDate>,
    pub column_id: ColumnId,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub assignee: String,
    pub customer: String,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Format(String),
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("ticket not found: {0}")]
    TicketNotFound(String),
}

impl BoardState {
    pub fn default_board() -> Self {
        let columns = ["New", "In Progress", "Waiting for Customer", "Resolved"]
            .iter()
            .enumerate()
            .map(|(idx, name)| Column {
                id: (idx + 1).to_string(),
                name: (*name).to_string(),
                order: idx as i64,
            })
            .collect();
        BoardState {
            tickets: Vec::new(),
            columns,
        }
    }

    pub fn find_column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn find_ticket_index(&self, id: &str) -> Option<usize> {
        self.tickets.iter().position(|t| t.id == id)
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn ticket(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns left to right. Equal `order` values keep insertion order.
    pub fn ordered_columns(&self) -> Vec<&Column> {
        let mut cols: Vec<&Column> = self.columns.iter().collect();
        cols.sort_by_key(|c| c.order);
        cols
    }

    pub fn first_column(&self) -> Option<&Column> {
        first_column(&self.columns)
    }

    pub fn tickets_in<'a>(&'a self, column_id: &'a str) -> impl Iterator<Item = &'a Ticket> + 'a {
        self.tickets.iter().filter(move |t| t.column_id == column_id)
    }

    pub fn ticket_count(&self, column_id: &str) -> usize {
        self.tickets_in(column_id).count()
    }

    /// Reassigns tickets whose column no longer exists to the leftmost column.
    pub fn repair_orphans(&mut self) -> usize {
        let Some(fallback) = self.first_column().map(|c| c.id.clone()) else {
            return 0;
        };
        let known: Vec<ColumnId> = self.columns.iter().map(|c| c.id.clone()).collect();
        let mut repaired = 0;
        for ticket in &mut self.tickets {
            if !known.contains(&ticket.column_id) {
                ticket.column_id = fallback.clone();
                repaired += 1;
            }
        }
        repaired
    }
}

impl Ticket {
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }
}

impl TicketDraft {
    pub fn new(title: impl Into<String>) -> Self {
        TicketDraft {
            title: title.into(),
            ..TicketDraft::default()
        }
    }

    pub fn into_ticket(self, id: TicketId, column_id: ColumnId, created: DateTime<Utc>) -> Ticket {
        Ticket {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            priority: self.priority,
            assignee: self.assignee,
            customer: self.customer,
            created_date: created,
            due_date: self.due_date,
            column_id,
            tags: normalize_tags(self.tags),
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(BoardError::Validation(format!(
                "unknown priority '{}' (expected High, Medium or Low)",
                other
            ))),
        }
    }
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Leftmost column; ties on `order` go to the earliest inserted.
pub fn first_column(columns: &[Column]) -> Option<&Column> {
    columns.iter().min_by_key(|c| c.order)
}

/// Commas separate tags on export and may not appear inside one.
pub fn validate_tags<'a, I>(tags: I) -> Result<(), BoardError>
where
    I: IntoIterator<Item = &'a str>,
{
    for tag in tags {
        if tag.contains(',') {
            return Err(BoardError::Validation(format!("Tag cannot contain a comma: {}", tag.trim())));
        }
    }
    Ok(())
}

pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|dt| dt.date_naive()))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

mod due_date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => super::parse_date(text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid due date: {}", text))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(id: &str, column: &str) -> Ticket {
        TicketDraft::new(format!("ticket {}", id)).into_ticket(id.into(), column.into(), Utc::now())
    }

    #[test]
    fn default_board_has_four_ordered_columns() {
        let board = BoardState::default_board();
        let names: Vec<&str> = board.ordered_columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["New", "In Progress", "Waiting for Customer", "Resolved"]);
        assert_eq!(board.columns[3].id, "4");
        assert_eq!(board.columns[3].order, 3);
        assert!(board.tickets.is_empty());
    }

    #[test]
    fn ordered_columns_breaks_ties_by_insertion() {
        let mut board = BoardState::default_board();
        board.columns[0].order = 5;
        board.columns.push(Column {
            id: "x".into(),
            name: "Extra".into(),
            order: 1,
        });
        let ids: Vec<&str> = board.ordered_columns().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["2", "x", "3", "4", "1"]);
    }

    #[test]
    fn generated_ids_are_base36() {
        let id = generate_id();
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = normalize_tags(vec![" a".into(), "b".into(), "a".into(), "".into(), "B".into()]);
        assert_eq!(tags, ["a", "b", "B"]);
    }

    #[test]
    fn add_tag_suppresses_duplicates() {
        let mut t = ticket("t1", "1");
        assert!(t.add_tag("urgent"));
        assert!(!t.add_tag("urgent"));
        assert_eq!(t.tags, ["urgent"]);
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("high".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(" LOW ".parse::<Priority>(), Ok(Priority::Low));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn parse_date_accepts_plain_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert_eq!(parse_date("2024-05-01"), expected);
        assert_eq!(parse_date("2024-05-01T10:30:00.000Z"), expected);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn repair_orphans_uses_leftmost_column() {
        let mut board = BoardState::default_board();
        board.columns[0].order = 9;
        board.tickets.push(ticket("a", "gone"));
        assert_eq!(board.repair_orphans(), 1);
        assert_eq!(board.tickets[0].column_id, "2");
        assert_eq!(board.first_column().map(|c| c.id.as_str()), Some("2"));
        assert_eq!(board.first_column(), board.ordered_columns().first().copied());
    }

    #[test]
    fn commas_are_rejected_inside_tags() {
        assert!(validate_tags(["vpn", "remote access"]).is_ok());
        assert!(matches!(
            validate_tags(["a,b"]),
            Err(BoardError::Validation(_))
        ));
    }

    #[test]
    fn repair_orphans_moves_to_first_column() {
        let mut board = BoardState::default_board();
        board.tickets.push(ticket("a", "gone"));
        board.tickets.push(ticket("b", "2"));
        assert_eq!(board.repair_orphans(), 1);
        assert_eq!(board.tickets[0].column_id, "1");
        assert_eq!(board.tickets[1].column_id, "2");
    }

    #[test]
    fn board_json_uses_camel_case_and_empty_due_date() {
        let mut board = BoardState::default_board();
        board.tickets.push(ticket("a", "1"));
        let json = serde_json::to_value(&board).unwrap();
        let t = &json["tickets"][0];
        assert_eq!(t["columnId"], "1");
        assert_eq!(t["dueDate"], "");
        assert!(t.get("createdDate").is_some());

        let back: BoardState = serde_json::from_value(json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn saved_due_dates_may_be_timestamps() {
        let json = r#"{"id":"a","title":"x","createdDate":"2024-01-01T00:00:00Z",
            "dueDate":"2024-02-03T00:00:00.000Z","columnId":"1"}"#;
        let t: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(t.due_date, NaiveDate::from_ymd_opt(2024, 2, 3));
        assert_eq!(t.priority, Priority::Medium);
        assert!(t.tags.is_empty());
    }
}
