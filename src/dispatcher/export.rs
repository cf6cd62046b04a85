use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use std::path::PathBuf;

use crate::cli::formatters;
use fundwatch::error::FundError;
use fundwatch::record::RecordStore;
use fundwatch::reports::export::{default_filename, export_to_path};
use fundwatch::watchlist::WatchlistStore;

pub async fn dispatch_export(output: Option<String>, json_output: bool) -> Result<()> {
    let store = super::open_store()?;
    let entries = WatchlistStore::new(&store).load()?;
    if entries.is_empty() {
        return Err(FundError::Validation("nothing to export: the watchlist is empty".to_string()).into());
    }

    let record = RecordStore::new(&store).get()?;
    let fetcher = super::build_fetcher()?;
    let report = super::refresh_with_progress(&fetcher, &entries, &record, json_output).await;

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default_filename(Local::now().date_naive())));
    let path = export_to_path(&report.rows, &path)?;

    if json_output {
        println!(
            "{}",
            formatters::format_json(&serde_json::json!({
                "path": path,
                "rows": report.rows.len(),
                "failed": report.failed,
            }))
        );
    } else {
        println!(
            "{} Exported {} funds to: {}",
            "✓".green().bold(),
            report.rows.len(),
            path.display()
        );
        if report.failed > 0 {
            println!(
                "{} {} funds had no quote; their cells are empty",
                "⚠".yellow(),
                report.failed
            );
        }
    }
    Ok(())
}
