use clap::{Parser, Subcommand};

pub mod formatters;
pub mod runner;

#[derive(Parser)]
#[command(name = "fundwatch")]
#[command(version, about = "Mutual fund watchlist tracker")]
#[command(
    long_about = "Look up fund quotes and NAV history, keep a watchlist with held shares, compare market value against a saved record point and export it all to CSV."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a fund's quote, NAV chart and profile
    Search {
        /// 6-digit fund code
        code: String,

        /// Chart range: 1m, 3m, 6m or 1y
        #[arg(short, long, default_value = "1m")]
        range: String,
    },

    /// Show a fund's profile (manager, company, size, inception)
    Info {
        /// 6-digit fund code
        code: String,
    },

    /// Watchlist management
    Watchlist {
        #[command(subcommand)]
        action: WatchlistCommands,
    },

    /// Record point (baseline market values)
    Record {
        #[command(subcommand)]
        action: RecordCommands,
    },

    /// Export the refreshed watchlist to CSV
    Export {
        /// Output file (default: funds_YYYYMMDD.csv)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum WatchlistCommands {
    /// List stored funds and shares without fetching quotes
    List,

    /// Add funds, comma separated (e.g. 000001,110022)
    Add {
        codes: String,

        /// Do not verify codes against the quote feed
        #[arg(long)]
        no_verify: bool,
    },

    /// Remove a fund
    Remove { code: String },

    /// Set held shares; omit the amount to clear it
    Shares { code: String, shares: Option<String> },

    /// Move a fund from one position to another (1-based)
    Move { from: usize, to: usize },

    /// Fetch quotes and dividends for every fund
    Refresh,
}

#[derive(Subcommand)]
pub enum RecordCommands {
    /// Save current market values as the record point
    Set,

    /// Show the saved record point
    Show,
}
