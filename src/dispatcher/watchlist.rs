use anyhow::Result;
use colored::Colorize;

use crate::cli::formatters;
use crate::commands::WatchlistAction;
use fundwatch::record::RecordStore;
use fundwatch::utils::format_optional_amount;
use fundwatch::watchlist::WatchlistStore;

pub async fn dispatch_watchlist(action: WatchlistAction, json_output: bool) -> Result<()> {
    let store = super::open_store()?;
    let watchlist = WatchlistStore::new(&store);

    match action {
        WatchlistAction::List => {
            let entries = watchlist.load()?;
            if json_output {
                println!("{}", formatters::format_json(&entries));
            } else {
                print!("{}", formatters::format_entries_table(&entries));
            }
            Ok(())
        }

        WatchlistAction::Add { codes, verify } => {
            let fetcher = super::build_fetcher()?;
            // Nothing to verify against when offline.
            let verifier = (verify && !fetcher.config().offline).then_some(&fetcher);
            let report = watchlist.add_codes(&codes, verifier).await?;
            if json_output {
                println!("{}", formatters::format_json(&report));
            } else {
                print!("{}", formatters::format_add_report(&report));
            }
            Ok(())
        }

        WatchlistAction::Remove { code } => {
            let removed = watchlist.remove(&code)?;
            if json_output {
                println!("{}", serde_json::json!({ "code": code, "removed": removed }));
            } else if removed {
                println!("{} Removed {}", "✓".green(), code);
            } else {
                println!("{} {} is not in the watchlist", "ℹ".blue(), code);
            }
            Ok(())
        }

        WatchlistAction::Shares { code, shares } => {
            let entry = watchlist.upsert_shares(&code, shares)?;
            if json_output {
                println!("{}", formatters::format_json(&entry));
            } else {
                println!(
                    "{} {} shares: {}",
                    "✓".green(),
                    entry.code,
                    format_optional_amount(entry.shares)
                );
            }
            Ok(())
        }

        WatchlistAction::Move { from, to } => {
            let entries = watchlist.move_entry(from, to)?;
            if json_output {
                println!("{}", formatters::format_json(&entries));
            } else {
                print!("{}", formatters::format_entries_table(&entries));
            }
            Ok(())
        }

        WatchlistAction::Refresh => {
            let entries = watchlist.load()?;
            if entries.is_empty() {
                if json_output {
                    println!("[]");
                } else {
                    print!("{}", formatters::format_empty_watchlist());
                }
                return Ok(());
            }

            let record = RecordStore::new(&store).get()?;
            let fetcher = super::build_fetcher()?;
            let report = super::refresh_with_progress(&fetcher, &entries, &record, json_output).await;

            if json_output {
                println!("{}", formatters::format_json(&report));
            } else {
                print!("{}", formatters::format_watchlist_table(&report));
            }
            Ok(())
        }
    }
}
