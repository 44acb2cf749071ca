use crate::cli::{BulkCommand, ColumnCommand};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use kanbandesk::config::Config;
use kanbandesk::drag::DragEvent;
use kanbandesk::model::{normalize_tags, parse_date, Priority, Ticket, TicketDraft};
use kanbandesk::notify::{Confirm, ConsoleNotifier, FixedConfirm, NotifyLevel, PromptConfirm};
use kanbandesk::storage::{init_project_board, locate_board, BoardLocation, BoardScope, FileStorage};
use kanbandesk::store::first_column_id;
use kanbandesk::{BoardStore, Desk};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::PathBuf;

type FileDesk = Desk<FileStorage>;

pub struct AddArgs {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub customer: Option<String>,
    pub due: Option<String>,
    pub tags: Vec<String>,
    pub column: Option<String>,
}

pub struct EditArgs {
    pub ticket_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub customer: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub tags: Vec<String>,
    pub clear_tags: bool,
    pub column: Option<String>,
}

pub fn init(config: &Config) -> Result<bool> {
    let location = init_project_board(config)?;
    println!("Initialized board at {}", location.path.display());
    Ok(true)
}

pub fn list(config: &Config, column: Option<String>, search: Option<String>) -> Result<bool> {
    let (desk, location) = open_desk(config)?;
    let query = search.unwrap_or_default();
    println!(
        "Board: {} ({})",
        location.path.display(),
        match location.scope {
            BoardScope::Project => "project",
            BoardScope::Global => "global",
        }
    );
    let visible = desk.visible_tickets(&query);
    for (col, count) in desk.column_counts(&query) {
        if let Some(ref filter) = column {
            if &col.id != filter {
                continue;
            }
        }
        println!("{} [{}] ({})", col.name, count, col.id);
        if count == 0 {
            println!("  (empty)");
        }
        for ticket in visible.iter().filter(|t| t.column_id == col.id) {
            print_ticket(ticket);
        }
        println!();
    }
    Ok(true)
}

pub fn add(config: &Config, args: AddArgs) -> Result<bool> {
    let (mut desk, _) = open_desk(config)?;
    let column_id = match args.column {
        Some(column) => column,
        None => first_column_id(desk.board()).ok_or_else(|| anyhow!("board has no columns"))?,
    };
    let draft = TicketDraft {
        title: args.title,
        description: args.description.unwrap_or_default(),
        priority: parse_priority(args.priority.as_deref())?.unwrap_or_default(),
        assignee: args.assignee.unwrap_or_default(),
        customer: args.customer.unwrap_or_default(),
        due_date: parse_due(args.due.as_deref())?,
        tags: args.tags,
    };
    match desk.add_ticket(draft, &column_id) {
        Some(ticket) => {
            println!("  id {}", ticket.id);
            Ok(true)
        }
        None => Ok(false),
    }
}

pub fn edit(config: &Config, args: EditArgs) -> Result<bool> {
    let (mut desk, _) = open_desk(config)?;
    let mut ticket: Ticket = match desk.board().ticket(&args.ticket_id) {
        Some(ticket) => ticket.clone(),
        None => {
            desk.notify(
                NotifyLevel::Error,
                &format!("ticket not found: {}", args.ticket_id),
            );
            return Ok(false);
        }
    };
    if let Some(title) = args.title {
        ticket.title = title;
    }
    if let Some(description) = args.description {
        ticket.description = description;
    }
    if let Some(priority) = parse_priority(args.priority.as_deref())? {
        ticket.priority = priority;
    }
    if let Some(assignee) = args.assignee {
        ticket.assignee = assignee;
    }
    if let Some(customer) = args.customer {
        ticket.customer = customer;
    }
    if args.clear_due {
        ticket.due_date = None;
    }
    if let Some(due) = parse_due(args.due.as_deref())? {
        ticket.due_date = Some(due);
    }
    if args.clear_tags {
        ticket.tags.clear();
    }
    if !args.tags.is_empty() {
        ticket.tags = normalize_tags(args.tags);
    }
    if let Some(column) = args.column {
        ticket.column_id = column;
    }
    Ok(desk.edit_ticket(ticket).is_some())
}

pub fn delete(config: &Config, ticket_id: String) -> Result<bool> {
    let (mut desk, _) = open_desk(config)?;
    Ok(desk.delete_ticket(&ticket_id).is_some())
}

pub fn move_ticket(config: &Config, ticket_id: String, column_id: String) -> Result<bool> {
    let (mut desk, _) = open_desk(config)?;
    Ok(desk.move_ticket(&ticket_id, &column_id).is_some())
}

pub fn column(config: &Config, action: ColumnCommand) -> Result<bool> {
    let (mut desk, _) = open_desk(config)?;
    let ok = match action {
        ColumnCommand::List => {
            for (col, count) in desk.column_counts("") {
                println!("{}\t{}\t{} tickets", col.id, col.name, count);
            }
            true
        }
        ColumnCommand::Add { name } => match desk.add_column(&name) {
            Some(col) => {
                println!("  id {}", col.id);
                true
            }
            None => false,
        },
        ColumnCommand::Rename { column_id, name } => desk.rename_column(&column_id, &name).is_some(),
        ColumnCommand::Delete { column_id } => desk.delete_column(&column_id).is_some(),
    };
    Ok(ok)
}

pub fn bulk(config: &Config, tickets: Vec<String>, action: BulkCommand) -> Result<bool> {
    let (mut desk, _) = open_desk(config)?;
    let unique: BTreeSet<String> = tickets.into_iter().collect();
    for id in &unique {
        if desk.toggle_select(id).is_none() {
            return Ok(false);
        }
    }
    let applied = match action {
        BulkCommand::Move { column_id } => desk.bulk_move(&column_id),
        BulkCommand::Assign { assignee } => desk.bulk_reassign(&assignee),
        BulkCommand::Tag { tag } => desk.bulk_add_tag(&tag),
        BulkCommand::Delete => desk.bulk_delete(),
    };
    Ok(applied.is_some())
}

/// Replays a whole gesture: start, each hover, then hover and drop on the
/// drop target.
pub fn drag(config: &Config, active: String, over: Vec<String>, drop: Option<String>) -> Result<bool> {
    let (mut desk, _) = open_desk(config)?;
    desk.drag(DragEvent::Start {
        active: active.clone(),
    });
    if desk.gesture().is_idle() {
        desk.notify(NotifyLevel::Error, &format!("ticket not found: {}", active));
        return Ok(false);
    }
    for target in over.into_iter().chain(drop.clone()) {
        desk.drag(DragEvent::Over { over: target });
    }
    desk.drag(DragEvent::End { over: drop });

    let board = desk.board();
    let Some(ticket) = board.ticket(&active) else {
        return Ok(false);
    };
    let position = board
        .tickets_in(&ticket.column_id)
        .position(|t| t.id == active)
        .map(|idx| idx + 1)
        .unwrap_or_default();
    let column_name = board
        .column(&ticket.column_id)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    desk.notify(
        NotifyLevel::Success,
        &format!("Ticket {} is now #{} in {}", active, position, column_name),
    );
    Ok(true)
}

pub fn import(config: &Config, file: PathBuf) -> Result<bool> {
    let text = fs::read_to_string(&file).with_context(|| format!("reading {:?}", file))?;
    let (mut desk, _) = open_desk(config)?;
    Ok(desk.import_csv(&text).is_some())
}

pub fn export(config: &Config, out: Option<PathBuf>) -> Result<bool> {
    let (desk, _) = open_desk(config)?;
    let Some(export) = desk.export_csv() else {
        return Ok(false);
    };
    let path = match out {
        Some(path) => path,
        None => env::current_dir()?.join(&export.file_name),
    };
    fs::write(&path, &export.contents).with_context(|| format!("writing {:?}", path))?;
    desk.notify(
        NotifyLevel::Success,
        &format!("Exported {} tickets to {}", export.tickets, path.display()),
    );
    Ok(true)
}

fn open_desk(config: &Config) -> Result<(FileDesk, BoardLocation)> {
    let cwd = env::current_dir()?;
    let location = locate_board(&cwd, config)?;
    let store = BoardStore::open(FileStorage::new(location.clone()));
    let confirm: Box<dyn Confirm> = if config.assume_yes {
        Box::new(FixedConfirm(true))
    } else {
        Box::new(PromptConfirm)
    };
    Ok((Desk::new(store, Box::new(ConsoleNotifier), confirm), location))
}

fn parse_priority(input: Option<&str>) -> Result<Option<Priority>> {
    match input {
        Some(raw) => Ok(Some(raw.parse()?)),
        None => Ok(None),
    }
}

fn parse_due(input: Option<&str>) -> Result<Option<NaiveDate>> {
    let raw = match input {
        Some(r) => r.trim(),
        None => return Ok(None),
    };
    if raw.is_empty() {
        return Ok(None);
    }
    parse_date(raw)
        .map(Some)
        .ok_or_else(|| anyhow!("invalid date format (use YYYY-MM-DD): {}", raw))
}

fn print_ticket(ticket: &Ticket) {
    println!("  - {}: {} [{}]", ticket.id, ticket.title, ticket.priority);
    if !ticket.description.is_empty() {
        println!("    {}", ticket.description);
    }
    if !ticket.assignee.is_empty() {
        println!("    assignee: {}", ticket.assignee);
    }
    if !ticket.customer.is_empty() {
        println!("    customer: {}", ticket.customer);
    }
    if !ticket.tags.is_empty() {
        println!("    tags: {}", ticket.tags.join(", "));
    }
    if let Some(due) = ticket.due_date {
        println!("    due: {}", due.format("%Y-%m-%d"));
    }
}
