//! Parsers for the NAV history and dividend tables
//!
//! Both feeds deliver an HTML table fragment. Rows are matched with a
//! date cell followed by a value cell; anything else is skipped.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::db::{FundQuote, HistoryPoint, QuoteSource};

static NAV_ROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<td>(\d{4}-\d{2}-\d{2})</td>\s*<td[^>]*>([\d.]+)</td>").expect("valid NAV row regex")
});

static DATE_CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<td>(\d{4}-\d{2}-\d{2})</td>").expect("valid date cell regex"));

/// Parse NAV rows out of the history table markup.
///
/// The feed lists newest first; the result is ascending by date.
pub fn parse_history(raw_markup: &str) -> Vec<HistoryPoint> {
    let mut points: Vec<HistoryPoint> = NAV_ROW_RE
        .captures_iter(raw_markup)
        .filter_map(|caps| {
            let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()?;
            let net_value = Decimal::from_str(&caps[2]).ok()?;
            Some(HistoryPoint { date, net_value })
        })
        .collect();

    points.reverse();

    // Pages that are not strictly newest-first still come out ascending.
    if !points.windows(2).all(|w| w[0].date < w[1].date) {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
    }

    points
}

/// Build a quote from the two most recent NAV rows.
///
/// Day growth is left empty when there is no previous positive NAV.
pub fn latest_quote_from_history(code: &str, name: &str, points: &[HistoryPoint]) -> Option<FundQuote> {
    let latest = points.last()?;
    let day_growth_pct = match points.len() {
        n if n >= 2 => {
            let prev = points[n - 2].net_value;
            growth_pct(prev, latest.net_value)
        }
        _ => None,
    };

    Some(FundQuote {
        code: code.to_string(),
        name: name.to_string(),
        net_value: latest.net_value,
        net_value_date: Some(latest.date),
        day_growth_pct,
        estimated_value: None,
        estimated_time: None,
        source: QuoteSource::History,
    })
}

/// Growth between the first and last point of a series, in percent.
pub fn period_growth(points: &[HistoryPoint]) -> Option<Decimal> {
    let first = points.first()?;
    let last = points.last()?;
    if points.len() < 2 {
        return None;
    }
    growth_pct(first.net_value, last.net_value)
}

fn growth_pct(from: Decimal, to: Decimal) -> Option<Decimal> {
    if from <= Decimal::ZERO {
        return None;
    }
    Some(((to - from) / from * Decimal::ONE_HUNDRED).round_dp(2))
}

/// First dividend date listed in the dividend table, if any.
pub fn parse_dividend_date(raw_markup: &str) -> Option<NaiveDate> {
    DATE_CELL_RE
        .captures_iter(raw_markup)
        .find_map(|caps| NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok())
}
