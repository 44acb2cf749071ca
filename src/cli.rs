use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kanbandesk", version, about = "Local ticket board with CSV import and export")]
pub struct Cli {
    /// Directory for the global board (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a project board in the current directory
    Init,
    /// List tickets column by column
    List {
        /// Only show this column id
        #[arg(long)]
        column: Option<String>,
        /// Only show tickets matching this text
        #[arg(long, short = 's')]
        search: Option<String>,
    },
    /// Add a new ticket
    Add {
        /// Title of the ticket
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// High, Medium or Low
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        customer: Option<String>,
        /// Due date in YYYY-MM-DD format
        #[arg(long)]
        due: Option<String>,
        /// Tags for the ticket (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
        /// Column id to place the ticket (defaults to the first column)
        #[arg(long)]
        column: Option<String>,
    },
    /// Edit an existing ticket
    Edit {
        ticket_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        customer: Option<String>,
        /// Set due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// Clear due date
        #[arg(long)]
        clear_due: bool,
        /// Replace tags (repeatable)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
        /// Clear existing tags
        #[arg(long)]
        clear_tags: bool,
        /// Move to column id
        #[arg(long)]
        column: Option<String>,
    },
    /// Delete a ticket
    Delete { ticket_id: String },
    /// Move a ticket to a different column
    Move { ticket_id: String, column_id: String },
    /// Manage columns
    Column {
        #[command(subcommand)]
        action: ColumnCommand,
    },
    /// Apply one edit to several tickets at once
    Bulk {
        /// Ticket id to include (repeatable)
        #[arg(long = "ticket", required = true)]
        tickets: Vec<String>,
        #[command(subcommand)]
        action: BulkCommand,
    },
    /// Drag a ticket over targets and drop it
    Drag {
        /// Ticket being dragged
        active: String,
        /// Ticket or column ids passed over, in order (repeatable)
        #[arg(long)]
        over: Vec<String>,
        /// Ticket or column id to drop onto
        #[arg(long)]
        drop: Option<String>,
    },
    /// Import tickets from a CSV file
    Import { file: PathBuf },
    /// Export all tickets to CSV
    Export {
        /// Output path (defaults to kanbandesk-tickets-<date>.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ColumnCommand {
    /// List columns with their ticket counts
    List,
    Add { name: String },
    Rename { column_id: String, name: String },
    Delete { column_id: String },
}

#[derive(Subcommand, Debug)]
pub enum BulkCommand {
    /// Move the tickets to a column
    Move { column_id: String },
    /// Reassign the tickets
    Assign { assignee: String },
    /// Add a tag to the tickets
    Tag { tag: String },
    /// Delete the tickets
    Delete,
}
