//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation. Gains are red and
//! losses green, following mainland market convention.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use fundwatch::db::{FundEntry, FundProfile, RecordPoint};
use fundwatch::pricing::FundSearch;
use fundwatch::reports::chart::{sparkline, summarize};
use fundwatch::reports::WatchlistReport;
use fundwatch::utils::{format_amount, format_optional_amount, format_percent, format_signed_amount};
use fundwatch::watchlist::AddReport;

const SPARKLINE_WIDTH: usize = 60;

/// Pretty JSON for any report; serialization errors become an error object.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

fn color_change(value: Decimal, text: String) -> String {
    if value > Decimal::ZERO {
        text.red().to_string()
    } else if value < Decimal::ZERO {
        text.green().to_string()
    } else {
        text
    }
}

fn optional_percent(value: Option<Decimal>) -> String {
    value
        .map(|v| color_change(v, format_percent(v)))
        .unwrap_or_else(|| "-".to_string())
}

/// Format a search result: quote header, chart summary and profile
pub fn format_search(result: &FundSearch) -> String {
    let quote = &result.quote;
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} {} ({})\n\n",
        "📈".cyan().bold(),
        quote.name.bold(),
        quote.code
    ));
    output.push_str(&format!(
        "{:<14} {}\n",
        "Net value:".bold(),
        quote.net_value
    ));
    output.push_str(&format!(
        "{:<14} {}\n",
        "NAV date:".bold(),
        quote
            .net_value_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    if let Some(estimate) = quote.estimated_value {
        output.push_str(&format!(
            "{:<14} {} ({})\n",
            "Estimate:".bold(),
            estimate,
            quote.estimated_time.as_deref().unwrap_or("-")
        ));
    }
    output.push_str(&format!(
        "{:<14} {}\n",
        "Day growth:".bold(),
        optional_percent(quote.day_growth_pct)
    ));
    output.push_str(&format!(
        "{:<14} {}\n",
        "Source:".bold(),
        quote.source.as_str()
    ));

    output.push_str(&format!(
        "\n{} NAV {} ({} to {})\n",
        "━".repeat(10).bright_black(),
        result.range,
        result.start_date,
        result.end_date
    ));
    match summarize(&result.series) {
        Some(summary) => {
            output.push_str(&format!("{}\n", sparkline(&result.series, SPARKLINE_WIDTH)));
            output.push_str(&format!(
                "{} {} ({})  {} {} ({})\n",
                "First:".bold(),
                summary.first.net_value,
                summary.first.date,
                "Last:".bold(),
                summary.last.net_value,
                summary.last.date
            ));
            output.push_str(&format!(
                "{} {}  {} {}  {} {}  {} {}\n",
                "Low:".bold(),
                summary.min,
                "High:".bold(),
                summary.max,
                "Points:".bold(),
                result.series.len(),
                "Change:".bold(),
                optional_percent(summary.growth_pct)
            ));
        }
        None => output.push_str(&format!("{} Chart data unavailable\n", "⚠".yellow())),
    }

    if let Some(profile) = &result.profile {
        output.push('\n');
        output.push_str(&format_profile(profile));
    }

    output
}

/// Format a fund profile as label/value lines
pub fn format_profile(profile: &FundProfile) -> String {
    format!(
        "{:<14} {}\n{:<14} {}\n{:<14} {}\n{:<14} {}\n",
        "Manager:".bold(),
        profile.manager,
        "Company:".bold(),
        profile.company,
        "Size:".bold(),
        profile.scale,
        "Inception:".bold(),
        profile.establish_date
    )
}

/// Format stored entries without quotes
pub fn format_entries_table(entries: &[FundEntry]) -> String {
    if entries.is_empty() {
        return format_empty_watchlist();
    }

    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "#")]
        position: usize,
        #[tabled(rename = "Code")]
        code: String,
        #[tabled(rename = "Shares")]
        shares: String,
    }

    let rows: Vec<EntryRow> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| EntryRow {
            position: i + 1,
            code: e.code.clone(),
            shares: format_optional_amount(e.shares),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());
    format!("{}\n", table)
}

/// Format a refreshed watchlist with totals
pub fn format_watchlist_table(report: &WatchlistReport) -> String {
    if report.rows.is_empty() {
        return format_empty_watchlist();
    }

    #[derive(Tabled)]
    struct QuoteRow {
        #[tabled(rename = "#")]
        position: usize,
        #[tabled(rename = "Fund")]
        name: String,
        #[tabled(rename = "Code")]
        code: String,
        #[tabled(rename = "NAV")]
        nav: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Day %")]
        growth: String,
        #[tabled(rename = "Shares")]
        shares: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "vs Record")]
        vs_record: String,
        #[tabled(rename = "Dividend")]
        dividend: String,
    }

    let rows: Vec<QuoteRow> = report
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let name = if r.recent_dividend {
                r.display_name().red().bold().to_string()
            } else {
                r.display_name().to_string()
            };
            match &r.quote {
                Some(q) => QuoteRow {
                    position: i + 1,
                    name,
                    code: r.code.clone(),
                    nav: q.net_value.to_string(),
                    date: q
                        .net_value_date
                        .map(|d| d.format("%m-%d").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    growth: optional_percent(q.day_growth_pct),
                    shares: format_optional_amount(r.shares),
                    value: format_optional_amount(r.market_value),
                    vs_record: r
                        .comparison
                        .map(|c| {
                            color_change(
                                c.delta,
                                format!("{} ({})", format_signed_amount(c.delta), format_percent(c.pct)),
                            )
                        })
                        .unwrap_or_else(|| "-".to_string()),
                    dividend: r
                        .dividend_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                },
                None => QuoteRow {
                    position: i + 1,
                    name,
                    code: r.code.clone(),
                    nav: "failed".red().to_string(),
                    date: "-".to_string(),
                    growth: "-".to_string(),
                    shares: format_optional_amount(r.shares),
                    value: "-".to_string(),
                    vs_record: "-".to_string(),
                    dividend: "-".to_string(),
                },
            }
        })
        .collect();

    let mut output = String::new();
    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(3..), Alignment::right());
    output.push_str(&table.to_string());

    output.push_str(&format!("\n\n{} Summary", "━".repeat(60).bright_black()));
    output.push_str(&format!(
        "\n{:<20} {}",
        "Total Value:".bold(),
        format_amount(report.total_market_value)
    ));
    if let Some(date) = report.record_date {
        output.push_str(&format!(
            "\n{:<20} {} ({})",
            "Record Value:".bold(),
            format_amount(report.total_record_value),
            date
        ));
    }
    if let Some(cmp) = report.total_comparison {
        output.push_str(&format!(
            "\n{:<20} {}",
            "vs Record:".bold(),
            color_change(
                cmp.delta,
                format!("{} ({})", format_signed_amount(cmp.delta), format_percent(cmp.pct))
            )
        ));
    }
    if report.failed > 0 {
        output.push_str(&format!(
            "\n{} {} of {} funds failed to refresh",
            "⚠".yellow(),
            report.failed,
            report.rows.len()
        ));
        for row in report.rows.iter().filter(|r| !r.is_ok()) {
            output.push_str(&format!(
                "\n  {}: {}",
                row.code,
                row.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }
    output.push('\n');
    output
}

/// Format the result of adding codes
pub fn format_add_report(report: &AddReport) -> String {
    let mut output = String::new();
    if !report.added.is_empty() {
        output.push_str(&format!("{} Added: {}\n", "✓".green(), report.added.join(", ")));
    }
    if !report.duplicates.is_empty() {
        output.push_str(&format!(
            "{} Already in watchlist: {}\n",
            "ℹ".blue(),
            report.duplicates.join(", ")
        ));
    }
    if !report.not_found.is_empty() {
        output.push_str(&format!(
            "{} Not found: {}\n",
            "⚠".yellow(),
            report.not_found.join(", ")
        ));
    }
    for (code, error) in &report.errored {
        output.push_str(&format!("{} {}: {}\n", "❌".red(), code, error));
    }
    if output.is_empty() {
        output.push_str("Nothing to add\n");
    }
    output
}

/// Format the saved record point
pub fn format_record(record: &RecordPoint) -> String {
    let Some(date) = record.date else {
        return format!(
            "{} No record point set\nSave one with: {} record set\n",
            "ℹ".blue().bold(),
            "fundwatch".bold()
        );
    };

    let mut output = format!("\n{} Record point of {}\n\n", "📌".cyan().bold(), date);
    for (code, value) in &record.values {
        output.push_str(&format!("  {:<8} {:>16}\n", code, format_amount(*value)));
    }
    let total: Decimal = record.values.values().copied().sum();
    output.push_str(&format!("  {:<8} {:>16}\n", "Total".bold(), format_amount(total)));
    output
}

/// Format empty watchlist message
pub fn format_empty_watchlist() -> String {
    format!(
        "{} Watchlist is empty\nAdd funds using: {} watchlist add <codes>\n",
        "ℹ".blue().bold(),
        "fundwatch".bold()
    )
}
