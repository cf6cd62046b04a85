//! Batch quote refresh
//!
//! Quotes are fetched concurrently (bounded by `max_concurrency`), progress
//! is reported as each fund completes, and the rows come back in
//! watchlist order.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::db::{FundEntry, FundQuote, RecordPoint};
use crate::pricing::FundFetcher;
use crate::record::{compare, RecordComparison};
use crate::ui::progress::{send_progress, ProgressEvent};
use crate::utils::is_within_days;

/// One watchlist line after refresh
#[derive(Debug, Clone, Serialize)]
pub struct WatchlistRow {
    pub code: String,
    pub shares: Option<Decimal>,
    pub quote: Option<FundQuote>,
    pub dividend_date: Option<NaiveDate>,
    pub recent_dividend: bool,
    pub market_value: Option<Decimal>,
    pub record_value: Option<Decimal>,
    pub comparison: Option<RecordComparison>,
    pub error: Option<String>,
}

impl WatchlistRow {
    pub fn is_ok(&self) -> bool {
        self.quote.is_some()
    }

    /// Quote name, or the code when the quote failed
    pub fn display_name(&self) -> &str {
        self.quote.as_ref().map(|q| q.name.as_str()).unwrap_or(&self.code)
    }

    fn failed(entry: &FundEntry, record_value: Option<Decimal>, error: String) -> Self {
        Self {
            code: entry.code.clone(),
            shares: entry.shares,
            quote: None,
            dividend_date: None,
            recent_dividend: false,
            market_value: None,
            record_value,
            comparison: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchlistReport {
    pub rows: Vec<WatchlistRow>,
    pub record_date: Option<NaiveDate>,
    pub total_market_value: Decimal,
    pub total_record_value: Decimal,
    pub total_comparison: Option<RecordComparison>,
    pub succeeded: usize,
    pub failed: usize,
}

/// shares × NAV, only when both are positive
pub fn market_value(shares: Option<Decimal>, net_value: Decimal) -> Option<Decimal> {
    let shares = shares?;
    if shares > Decimal::ZERO && net_value > Decimal::ZERO {
        Some((shares * net_value).round_dp(2))
    } else {
        None
    }
}

/// Refresh every entry. Never fails as a whole; per-fund failures are
/// carried in the rows.
pub async fn refresh_watchlist(
    fetcher: &FundFetcher,
    entries: &[FundEntry],
    record: &RecordPoint,
    today: NaiveDate,
    progress_tx: Option<UnboundedSender<ProgressEvent>>,
) -> WatchlistReport {
    let total = entries.len();
    info!("Refreshing {} watchlist funds", total);
    send_progress(&progress_tx, ProgressEvent::Started { total });

    let semaphore = Arc::new(Semaphore::new(fetcher.config().max_concurrency.max(1)));
    let recent_days = fetcher.config().recent_dividend_days;
    let mut set = JoinSet::new();

    for (idx, entry) in entries.iter().enumerate() {
        let fetcher = fetcher.clone();
        let semaphore = semaphore.clone();
        let entry = entry.clone();
        let record_value = record.value_for(&entry.code);
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let row = refresh_one(&fetcher, &entry, record_value, today, recent_days).await;
            (idx, row)
        });
    }

    let mut slots: Vec<Option<WatchlistRow>> = vec![None; total];
    let mut completed = 0;
    while let Some(joined) = set.join_next().await {
        completed += 1;
        match joined {
            Ok((idx, row)) => {
                send_progress(
                    &progress_tx,
                    ProgressEvent::Item {
                        code: row.code.clone(),
                        completed,
                        total,
                        ok: row.is_ok(),
                    },
                );
                slots[idx] = Some(row);
            }
            Err(e) => {
                warn!("Refresh task failed: {}", e);
                send_progress(
                    &progress_tx,
                    ProgressEvent::Item {
                        code: String::new(),
                        completed,
                        total,
                        ok: false,
                    },
                );
            }
        }
    }

    let rows: Vec<WatchlistRow> = slots
        .into_iter()
        .zip(entries)
        .map(|(slot, entry)| {
            slot.unwrap_or_else(|| {
                WatchlistRow::failed(entry, record.value_for(&entry.code), "refresh task aborted".to_string())
            })
        })
        .collect();

    let succeeded = rows.iter().filter(|r| r.is_ok()).count();
    let failed = rows.len() - succeeded;
    send_progress(&progress_tx, ProgressEvent::Finished { succeeded, failed });

    build_report(rows, record)
}

async fn refresh_one(
    fetcher: &FundFetcher,
    entry: &FundEntry,
    record_value: Option<Decimal>,
    today: NaiveDate,
    recent_days: i64,
) -> WatchlistRow {
    let quote = match fetcher.fetch_quote(&entry.code).await {
        Ok(quote) => quote,
        Err(e) => {
            debug!("Quote for {} failed: {}", entry.code, e);
            return WatchlistRow::failed(entry, record_value, e.to_string());
        }
    };

    let dividend_date = fetcher.fetch_dividend_date(&entry.code).await;
    let market_value = market_value(entry.shares, quote.net_value);

    WatchlistRow {
        code: entry.code.clone(),
        shares: entry.shares,
        recent_dividend: dividend_date
            .map(|d| is_within_days(d, today, recent_days))
            .unwrap_or(false),
        dividend_date,
        market_value,
        record_value,
        comparison: compare(market_value, record_value),
        quote: Some(quote),
        error: None,
    }
}

fn build_report(rows: Vec<WatchlistRow>, record: &RecordPoint) -> WatchlistReport {
    let total_market_value: Decimal = rows.iter().filter_map(|r| r.market_value).sum();
    let total_record_value: Decimal = rows.iter().filter_map(|r| r.record_value).sum();
    // Only rows holding both a market and a record value take part.
    let paired: Vec<(Decimal, Decimal)> = rows
        .iter()
        .filter_map(|r| Some((r.market_value?, r.record_value?)))
        .collect();
    let total_comparison = if record.is_set() && !paired.is_empty() {
        let market: Decimal = paired.iter().map(|(m, _)| *m).sum();
        let baseline: Decimal = paired.iter().map(|(_, b)| *b).sum();
        compare(Some(market), Some(baseline))
    } else {
        None
    };
    let succeeded = rows.iter().filter(|r| r.is_ok()).count();

    WatchlistReport {
        failed: rows.len() - succeeded,
        succeeded,
        record_date: record.date,
        total_market_value,
        total_record_value,
        total_comparison,
        rows,
    }
}

/// Market value per code for every row that has one, for a new record point
pub fn snapshot_values(report: &WatchlistReport) -> std::collections::BTreeMap<String, Decimal> {
    report
        .rows
        .iter()
        .filter_map(|r| r.market_value.map(|v| (r.code.clone(), v)))
        .collect()
}
