use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One watchlist entry, as persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FundEntry {
    pub code: String,
    pub shares: Option<Decimal>,
}

impl FundEntry {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
            shares: None,
        }
    }

    pub fn with_shares(code: &str, shares: Decimal) -> Self {
        Self {
            code: code.to_string(),
            shares: Some(shares),
        }
    }
}

/// Record-point snapshot: market value per fund code on `date`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordPoint {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub values: BTreeMap<String, Decimal>,
}

impl RecordPoint {
    pub fn is_set(&self) -> bool {
        self.date.is_some()
    }

    pub fn value_for(&self, code: &str) -> Option<Decimal> {
        self.values.get(code).copied()
    }
}

/// Where a quote came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    /// Intraday estimate feed (JSONP)
    Live,
    /// Derived from the most recent NAV history rows
    History,
}

impl QuoteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteSource::Live => "live",
            QuoteSource::History => "history",
        }
    }
}

/// Quote snapshot for one fund. Never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FundQuote {
    pub code: String,
    pub name: String,
    pub net_value: Decimal,
    pub net_value_date: Option<NaiveDate>,
    pub day_growth_pct: Option<Decimal>,
    pub estimated_value: Option<Decimal>,
    pub estimated_time: Option<String>,
    pub source: QuoteSource,
}

/// A single NAV observation
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub net_value: Decimal,
}

/// Descriptive fund metadata scraped from the profile page
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FundProfile {
    pub manager: String,
    pub company: String,
    pub scale: String,
    pub establish_date: String,
}

impl Default for FundProfile {
    fn default() -> Self {
        Self {
            manager: "-".to_string(),
            company: "-".to_string(),
            scale: "-".to_string(),
            establish_date: "-".to_string(),
        }
    }
}
