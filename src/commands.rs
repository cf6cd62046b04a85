//! Internal command representation
//!
//! clap arguments are converted into these types (see `cli::runner`) so
//! parsing and validation of free-form values live in one place.

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

use fundwatch::reports::ChartRange;

/// Parsed command ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `search <code> [--range 1m|3m|6m|1y]`
    Search { code: String, range: ChartRange },
    /// `info <code>`
    Info { code: String },
    Watchlist { action: WatchlistAction },
    Record { action: RecordAction },
    /// `export [--output <path>]`
    Export { output: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchlistAction {
    List,
    Add { codes: String, verify: bool },
    Remove { code: String },
    /// `None` clears the shares
    Shares { code: String, shares: Option<Decimal> },
    /// 0-based positions
    Move { from: usize, to: usize },
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Set,
    Show,
}

/// Parse a share amount. Accepts `,` thousands separators; rejects negatives.
pub fn parse_shares(input: &str) -> Result<Decimal> {
    let cleaned = input.trim().replace(',', "");
    let shares = Decimal::from_str(&cleaned).map_err(|_| anyhow!("Invalid share amount: {}", input))?;
    if shares < Decimal::ZERO {
        return Err(anyhow!("Share amount cannot be negative: {}", input));
    }
    Ok(shares)
}

/// Convert a 1-based position typed by the user into an index.
pub fn parse_position(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Positions start at 1"))
}

pub fn parse_range(input: &str) -> Result<ChartRange> {
    ChartRange::from_str(input).map_err(|e| anyhow!(e))
}
