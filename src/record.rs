//! Record point: a saved snapshot of market values per fund, used as the
//! baseline for gain/loss comparison in the watchlist view.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::db::{KvStore, RecordPoint};

pub const RECORD_KEY: &str = "fund_record_point";

pub struct RecordStore<'a> {
    store: &'a dyn KvStore,
}

impl<'a> RecordStore<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    /// Replace the record point with today's snapshot.
    pub fn set(&self, values: BTreeMap<String, Decimal>) -> Result<RecordPoint> {
        self.set_on(Local::now().date_naive(), values)
    }

    pub fn set_on(&self, date: NaiveDate, values: BTreeMap<String, Decimal>) -> Result<RecordPoint> {
        let point = RecordPoint {
            date: Some(date),
            values,
        };
        let json = serde_json::to_string(&point).context("Failed to serialize record point")?;
        self.store.put(RECORD_KEY, &json)?;
        info!("Record point set on {} for {} funds", date, point.values.len());
        Ok(point)
    }

    /// Current record point; empty when unset or unreadable.
    pub fn get(&self) -> Result<RecordPoint> {
        let Some(raw) = self.store.get(RECORD_KEY)? else {
            return Ok(RecordPoint::default());
        };
        match serde_json::from_str(&raw) {
            Ok(point) => Ok(point),
            Err(e) => {
                warn!("Ignoring unreadable record point: {}", e);
                Ok(RecordPoint::default())
            }
        }
    }
}

/// Market value versus record value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordComparison {
    pub delta: Decimal,
    /// Percent of the record value, 2 dp
    pub pct: Decimal,
}

pub fn compare(market_value: Option<Decimal>, record_value: Option<Decimal>) -> Option<RecordComparison> {
    let market = market_value?;
    let record = record_value?;
    if record.is_zero() {
        return None;
    }
    let delta = market - record;
    Some(RecordComparison {
        delta,
        pct: (delta / record * Decimal::ONE_HUNDRED).round_dp(2),
    })
}
