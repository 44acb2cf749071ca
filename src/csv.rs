//! CSV export and import of tickets.
//!
//! Every exported field is quoted, so values keep their commas, quotes and
//! line breaks. Tags are joined with `", "`.

use crate::model::{
    first_column, generate_id, is_blank, normalize_tags, parse_date, parse_timestamp, BoardError,
    Column, Priority, Ticket,
};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

pub const HEADERS: [&str; 9] = [
    "Title",
    "Description",
    "Priority",
    "Assignee",
    "Customer",
    "Created Date",
    "Due Date",
    "Status",
    "Tags",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

fn re_markup() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid markup regex"))
}

/// One header row plus one row per ticket, in collection order.
pub fn encode(tickets: &[Ticket], columns: &[Column]) -> String {
    let mut lines = Vec::with_capacity(tickets.len() + 1);
    lines.push(HEADERS.join(","));
    for ticket in tickets {
        let status = columns
            .iter()
            .find(|c| c.id == ticket.column_id)
            .map(|c| c.name.as_str())
            .unwrap_or("");
        let fields = [
            ticket.title.clone(),
            strip_markup(&ticket.description),
            ticket.priority.to_string(),
            ticket.assignee.clone(),
            ticket.customer.clone(),
            ticket.created_date.format(DATE_FORMAT).to_string(),
            ticket
                .due_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            status.to_string(),
            ticket.tags.join(", "),
        ];
        let row: Vec<String> = fields.iter().map(|f| quote(f)).collect();
        lines.push(row.join(","));
    }
    lines.join("\n")
}

/// Parses CSV text into new tickets, each with a fresh id. Unknown or
/// missing statuses land in the leftmost of `columns`.
pub fn decode(text: &str, columns: &[Column]) -> Result<Vec<Ticket>, BoardError> {
    let records = split_records(text);
    if records.len() < 2 {
        return Err(BoardError::Format("CSV file is empty or invalid".into()));
    }
    let header = HeaderIndex::parse(&records[0])?;
    let fallback = first_column(columns)
        .ok_or_else(|| BoardError::Conflict("Board has no columns to import into".into()))?;

    let mut tickets = Vec::new();
    for (record_no, row) in records.iter().enumerate().skip(1) {
        if row.iter().all(|field| is_blank(field)) {
            continue;
        }
        let title = header.field(row, header.title);
        if is_blank(title) {
            debug!(record = record_no + 1, "skipping CSV row without a title");
            continue;
        }

        let status = header.field(row, header.status);
        let column_id = columns
            .iter()
            .find(|c| c.name == status)
            .unwrap_or(fallback)
            .id
            .clone();
        let priority = header.field(row, header.priority);
        let priority = if is_blank(priority) {
            Priority::default()
        } else {
            priority.parse().unwrap_or_else(|_| {
                debug!(record = record_no + 1, priority, "unknown priority, using Medium");
                Priority::default()
            })
        };
        let created_date = parse_timestamp(header.field(row, header.created_date)).unwrap_or_else(Utc::now);
        let tags = header
            .field(row, header.tags)
            .split(',')
            .map(str::to_string)
            .collect();

        tickets.push(Ticket {
            id: generate_id(),
            title: title.trim().to_string(),
            description: header.field(row, header.description).to_string(),
            priority,
            assignee: header.field(row, header.assignee).to_string(),
            customer: header.field(row, header.customer).to_string(),
            created_date,
            due_date: parse_date(header.field(row, header.due_date)),
            column_id,
            tags: normalize_tags(tags),
        });
    }

    if tickets.is_empty() {
        return Err(BoardError::Format("No valid tickets found in CSV".into()));
    }
    Ok(tickets)
}

/// Suggested download name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("kanbandesk-tickets-{}.csv", date.format(DATE_FORMAT))
}

pub fn strip_markup(text: &str) -> String {
    re_markup().replace_all(text, "").into_owned()
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Splits CSV text into records of fields. Commas and line breaks inside
/// quotes belong to the field; a doubled quote inside quotes is a literal
/// quote. `\r\n` and `\n` both end a record.
fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                records.push(std::mem::take(&mut fields));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    records.push(fields);
    records
}

/// Position of each known header, matched trimmed and case-insensitively.
#[derive(Debug, Default)]
struct HeaderIndex {
    title: Option<usize>,
    description: Option<usize>,
    priority: Option<usize>,
    assignee: Option<usize>,
    customer: Option<usize>,
    created_date: Option<usize>,
    due_date: Option<usize>,
    status: Option<usize>,
    tags: Option<usize>,
}

impl HeaderIndex {
    fn parse(fields: &[String]) -> Result<Self, BoardError> {
        let mut index = HeaderIndex::default();
        for (pos, raw) in fields.iter().enumerate() {
            let name = raw.trim().to_lowercase();
            let slot = match name.as_str() {
                "title" => &mut index.title,
                "description" => &mut index.description,
                "priority" => &mut index.priority,
                "assignee" => &mut index.assignee,
                "customer" => &mut index.customer,
                "created date" => &mut index.created_date,
                "due date" => &mut index.due_date,
                "status" => &mut index.status,
                "tags" => &mut index.tags,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(pos);
            }
        }
        if index.title.is_none() {
            return Err(BoardError::Format("CSV must include a \"Title\" column".into()));
        }
        Ok(index)
    }

    fn field<'a>(&self, row: &'a [String], idx: Option<usize>) -> &'a str {
        idx.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
    }
}
