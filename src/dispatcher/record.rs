use anyhow::Result;
use colored::Colorize;

use crate::cli::formatters;
use crate::commands::RecordAction;
use fundwatch::error::FundError;
use fundwatch::record::RecordStore;
use fundwatch::reports::watchlist::snapshot_values;
use fundwatch::utils::format_amount;
use fundwatch::watchlist::WatchlistStore;

pub async fn dispatch_record(action: RecordAction, json_output: bool) -> Result<()> {
    let store = super::open_store()?;
    let records = RecordStore::new(&store);

    match action {
        RecordAction::Show => {
            let record = records.get()?;
            if json_output {
                println!("{}", formatters::format_json(&record));
            } else {
                print!("{}", formatters::format_record(&record));
            }
            Ok(())
        }

        RecordAction::Set => {
            let entries = WatchlistStore::new(&store).load()?;
            if entries.is_empty() {
                return Err(FundError::Validation("the watchlist is empty".to_string()).into());
            }

            let fetcher = super::build_fetcher()?;
            let current = records.get()?;
            let report = super::refresh_with_progress(&fetcher, &entries, &current, json_output).await;

            let values = snapshot_values(&report);
            if values.is_empty() {
                return Err(FundError::Validation(
                    "no fund has both shares and a quote; nothing to record".to_string(),
                )
                .into());
            }

            let point = records.set(values)?;
            if json_output {
                println!("{}", formatters::format_json(&point));
            } else {
                let total: rust_decimal::Decimal = point.values.values().copied().sum();
                println!(
                    "{} Record point saved: {} funds, total {}",
                    "✓".green(),
                    point.values.len(),
                    format_amount(total)
                );
            }
            Ok(())
        }
    }
}
