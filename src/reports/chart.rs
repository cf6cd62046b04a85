use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::db::HistoryPoint;

const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Chart range selectable for the NAV history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ChartRange {
    #[default]
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl ChartRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartRange::OneMonth => "1m",
            ChartRange::ThreeMonths => "3m",
            ChartRange::SixMonths => "6m",
            ChartRange::OneYear => "1y",
        }
    }

    fn months(&self) -> u32 {
        match self {
            ChartRange::OneMonth => 1,
            ChartRange::ThreeMonths => 3,
            ChartRange::SixMonths => 6,
            ChartRange::OneYear => 12,
        }
    }

    /// `[start, end]` window ending today. Month arithmetic clamps to the
    /// last day of the target month (Mar 31 - 1m = Feb 28/29).
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today
            .checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN);
        (start, today)
    }
}

impl FromStr for ChartRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1m" => Ok(ChartRange::OneMonth),
            "3m" => Ok(ChartRange::ThreeMonths),
            "6m" => Ok(ChartRange::SixMonths),
            "1y" | "12m" => Ok(ChartRange::OneYear),
            other => Err(format!("invalid range '{}': use 1m, 3m, 6m or 1y", other)),
        }
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline numbers of a NAV series
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartSummary {
    pub first: HistoryPoint,
    pub last: HistoryPoint,
    pub min: Decimal,
    pub max: Decimal,
    pub growth_pct: Option<Decimal>,
}

pub fn summarize(points: &[HistoryPoint]) -> Option<ChartSummary> {
    let first = *points.first()?;
    let last = *points.last()?;
    let min = points.iter().map(|p| p.net_value).min()?;
    let max = points.iter().map(|p| p.net_value).max()?;
    Some(ChartSummary {
        first,
        last,
        min,
        max,
        growth_pct: crate::pricing::history::period_growth(points),
    })
}

/// Render the series as a one-line sparkline, downsampled to `width`.
pub fn sparkline(points: &[HistoryPoint], width: usize) -> String {
    if points.is_empty() || width == 0 {
        return String::new();
    }

    let step = points.len().div_ceil(width).max(1);
    let sampled: Vec<Decimal> = points.iter().step_by(step).map(|p| p.net_value).collect();

    let min = sampled.iter().copied().min().unwrap_or_default();
    let max = sampled.iter().copied().max().unwrap_or_default();
    let span = max - min;
    let top = Decimal::from(SPARK_BARS.len() - 1);

    sampled
        .iter()
        .map(|value| {
            if span.is_zero() {
                return SPARK_BARS[SPARK_BARS.len() / 2];
            }
            let level = ((*value - min) / span * top).round();
            let idx = level.to_usize().unwrap_or(0);
            SPARK_BARS[idx.min(SPARK_BARS.len() - 1)]
        })
        .collect()
}
