mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use kanbandesk::config::Config;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();
    let mut config = Config::load()?;
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }
    if args.yes {
        config.assume_yes = true;
    }
    install_tracing(&config.log_level);

    let command = args.command.unwrap_or(cli::Command::List {
        column: None,
        search: None,
    });
    let applied = match command {
        cli::Command::Init => commands::init(&config),
        cli::Command::List { column, search } => commands::list(&config, column, search),
        cli::Command::Add {
            title,
            description,
            priority,
            assignee,
            customer,
            due,
            tags,
            column,
        } => commands::add(
            &config,
            commands::AddArgs {
                title,
                description,
                priority,
                assignee,
                customer,
                due,
                tags,
                column,
            },
        ),
        cli::Command::Edit {
            ticket_id,
            title,
            description,
            priority,
            assignee,
            customer,
            due,
            clear_due,
            tags,
            clear_tags,
            column,
        } => commands::edit(
            &config,
            commands::EditArgs {
                ticket_id,
                title,
                description,
                priority,
                assignee,
                customer,
                due,
                clear_due,
                tags,
                clear_tags,
                column,
            },
        ),
        cli::Command::Delete { ticket_id } => commands::delete(&config, ticket_id),
        cli::Command::Move {
            ticket_id,
            column_id,
        } => commands::move_ticket(&config, ticket_id, column_id),
        cli::Command::Column { action } => commands::column(&config, action),
        cli::Command::Bulk { tickets, action } => commands::bulk(&config, tickets, action),
        cli::Command::Drag { active, over, drop } => commands::drag(&config, active, over, drop),
        cli::Command::Import { file } => commands::import(&config, file),
        cli::Command::Export { out } => commands::export(&config, out),
    }?;
    Ok(if applied {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn install_tracing(default_level: &str) {
    // RUST_LOG wins over the configured level.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
