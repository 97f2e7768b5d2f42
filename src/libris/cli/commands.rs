//! # CLI Layer
//!
//! This module is **one possible UI client** for libris; it is not the application itself.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Reads the clock
//! - Installs the log subscriber
//! - Formats output for human consumption
//!
//! Every invocation is one session: resolve the data directory, open the
//! library (load + reconcile), heal the stores, run one command.
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `init_logging()`: stderr subscriber, filtered by `RUST_LOG` or `--verbose`
//! - `handle_*()`: Per-command handlers that call the API and print the result

use super::print::{print_borrowers, print_config, print_items, print_messages, print_paths};
use super::setup::{
    print_grouped_help, print_help_for_command, print_subcommand_help, CatalogCommands, Cli,
    Commands, LendingCommands, MiscCommands,
};
use chrono::{Local, NaiveDate};
use clap::Parser;
use libris::api::{ConfigAction, ItemOrder, LibrisApi};
use libris::error::{LibrisError, Result};
use libris::init::{initialize, resolve_data_dir};
use libris::store::fs::FileStore;
use tracing_subscriber::EnvFilter;

struct AppContext {
    api: LibrisApi<FileStore>,
    today: NaiveDate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.help {
        if cli.command.is_none() {
            print_grouped_help();
        } else {
            print_subcommand_help(&cli.command);
        }
        return Ok(());
    }

    init_logging(cli.verbose);

    // Help needs no library
    if let Some(Commands::Misc(MiscCommands::Help { command })) = &cli.command {
        match command {
            Some(name) => print_help_for_command(name),
            None => print_grouped_help(),
        }
        return Ok(());
    }

    let today = Local::now().date_naive();
    let data_dir = resolve_data_dir(cli.home.as_deref())?;
    let mut ctx = AppContext {
        api: initialize(&data_dir, today)?.api,
        today,
    };

    let healed = ctx.api.heal()?;
    let is_doctor = matches!(cli.command, Some(Commands::Misc(MiscCommands::Doctor)));
    if !is_doctor {
        print_messages(&healed.messages);
    }

    match cli.command {
        Some(Commands::Catalog(cmd)) => match cmd {
            CatalogCommands::Add { quantity, title } => handle_add(&mut ctx, title, quantity),
            CatalogCommands::Delete { item } => handle_delete(&mut ctx, item),
            CatalogCommands::Edit { position, title } => handle_edit(&mut ctx, position, title),
            CatalogCommands::List { sort } => handle_list(&ctx, &sort),
            CatalogCommands::Find { term } => handle_find(&ctx, term),
        },
        Some(Commands::Lending(cmd)) => match cmd {
            LendingCommands::Borrow { borrower, item } => handle_borrow(&mut ctx, item, &borrower),
            LendingCommands::Return { borrower, item } => handle_return(&mut ctx, item, &borrower),
            LendingCommands::Extend { title } => handle_extend(&mut ctx, title),
            LendingCommands::Borrowers => handle_borrowers(&ctx),
        },
        Some(Commands::Misc(cmd)) => match cmd {
            MiscCommands::Doctor => handle_doctor(&ctx),
            MiscCommands::Paths => handle_paths(&ctx),
            MiscCommands::Config { key, value } => handle_config(&ctx, key, value),
            MiscCommands::Help { .. } => Ok(()),
        },
        None => handle_list(&ctx, "insertion"),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "libris=debug" } else { "libris=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn handle_add(ctx: &mut AppContext, title: Vec<String>, quantity: u32) -> Result<()> {
    let result = ctx.api.add_items(&title, quantity)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, item: Vec<String>) -> Result<()> {
    let result = ctx.api.delete_item(&item)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_edit(ctx: &mut AppContext, position: usize, title: Vec<String>) -> Result<()> {
    let result = ctx.api.edit_title(position, &title)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_list(ctx: &AppContext, sort: &str) -> Result<()> {
    let order: ItemOrder = sort.parse().map_err(LibrisError::Config)?;
    let result = ctx.api.list_items(order, ctx.today)?;
    print_items(&result.listed_items);
    print_messages(&result.messages);
    Ok(())
}

fn handle_find(ctx: &AppContext, term: Vec<String>) -> Result<()> {
    let result = ctx.api.find_items(&term, ctx.today)?;
    print_items(&result.listed_items);
    print_messages(&result.messages);
    Ok(())
}

fn handle_borrow(ctx: &mut AppContext, item: Vec<String>, borrower: &str) -> Result<()> {
    let result = ctx.api.borrow(&item, borrower, ctx.today)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_return(ctx: &mut AppContext, item: Vec<String>, borrower: &str) -> Result<()> {
    let result = ctx.api.return_item(&item, borrower, ctx.today)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_extend(ctx: &mut AppContext, title: Vec<String>) -> Result<()> {
    let result = ctx.api.extend(&title)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_borrowers(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_borrowers(ctx.today)?;
    print_borrowers(&result.listed_borrowers);
    print_messages(&result.messages);
    Ok(())
}

fn handle_doctor(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.doctor_report();
    print_messages(&result.messages);
    Ok(())
}

fn handle_paths(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.paths()?;
    print_paths(&result.paths);
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };

    let result = ctx.api.config(action)?;
    match &result.config {
        Some(config) if result.messages.is_empty() => print_config(config),
        _ => {}
    }
    print_messages(&result.messages);
    Ok(())
}
