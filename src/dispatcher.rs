//! Command dispatcher that routes parsed `Command`s to their handlers.
//!
//! Handlers open the store and build the fetcher themselves so every
//! command runs against the current config and database.

mod export;
mod record;
mod search;
mod watchlist;

use anyhow::{Context, Result};
use chrono::Local;
use tokio::sync::mpsc;

use crate::commands::Command;
use fundwatch::config::Config;
use fundwatch::db::{FundEntry, RecordPoint, SqliteStore};
use fundwatch::pricing::FundFetcher;
use fundwatch::reports::{refresh_watchlist, WatchlistReport};
use fundwatch::ui::progress::{ProgressEvent, ProgressPrinter};

/// Route a parsed command to its handler
pub async fn dispatch_command(command: Command, json_output: bool) -> Result<()> {
    match command {
        Command::Search { code, range } => search::dispatch_search(&code, range, json_output).await,
        Command::Info { code } => search::dispatch_info(&code, json_output).await,
        Command::Watchlist { action } => watchlist::dispatch_watchlist(action, json_output).await,
        Command::Record { action } => record::dispatch_record(action, json_output).await,
        Command::Export { output } => export::dispatch_export(output, json_output).await,
    }
}

fn open_store() -> Result<SqliteStore> {
    SqliteStore::open(None).context("Failed to open fundwatch database")
}

fn build_fetcher() -> Result<FundFetcher> {
    let config = Config::load()?;
    Ok(FundFetcher::from_config(config)?)
}

/// Refresh `entries` while drawing progress on stderr.
async fn refresh_with_progress(
    fetcher: &FundFetcher,
    entries: &[FundEntry],
    record: &RecordPoint,
    json_output: bool,
) -> WatchlistReport {
    let printer = ProgressPrinter::new(json_output);
    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let today = Local::now().date_naive();

    let render = async {
        while let Some(event) = rx.recv().await {
            printer.handle_event(&event);
        }
    };
    // The sender is moved into the refresh, so the channel closes when it returns.
    let (report, ()) = tokio::join!(
        refresh_watchlist(fetcher, entries, record, today, Some(tx)),
        render
    );
    report
}
