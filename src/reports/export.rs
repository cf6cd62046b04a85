//! CSV export of a refreshed watchlist

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::watchlist::WatchlistRow;
use crate::error::FundError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADERS: [&str; 8] = [
    "基金名称",
    "基金代码",
    "净值日期",
    "单位净值",
    "持有份额",
    "市值",
    "记录点市值",
    "分红日期",
];

/// `funds_YYYYMMDD.csv`
pub fn default_filename(today: NaiveDate) -> String {
    format!("funds_{}.csv", today.format("%Y%m%d"))
}

/// Write rows as BOM-prefixed UTF-8 CSV. Missing values are empty cells.
pub fn write_csv<W: Write>(mut writer: W, rows: &[WatchlistRow]) -> Result<()> {
    writer.write_all(UTF8_BOM)?;
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADERS)?;

    for row in rows {
        let quote = row.quote.as_ref();
        csv.write_record([
            row.display_name().to_string(),
            row.code.clone(),
            quote
                .and_then(|q| q.net_value_date)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            quote.map(|q| q.net_value.to_string()).unwrap_or_default(),
            row.shares.map(|v| v.normalize().to_string()).unwrap_or_default(),
            money_cell(row.market_value),
            money_cell(row.record_value),
            row.dividend_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Write the export file and return its path.
pub fn export_to_path(rows: &[WatchlistRow], path: &Path) -> Result<PathBuf> {
    if rows.is_empty() {
        return Err(FundError::Validation("nothing to export: the watchlist is empty".to_string()).into());
    }
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    write_csv(std::io::BufWriter::new(file), rows)?;
    info!("Exported {} rows to {:?}", rows.len(), path);
    Ok(path.to_path_buf())
}

fn money_cell(value: Option<Decimal>) -> String {
    value.map(|v| format!("{:.2}", v.round_dp(2))).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FundQuote, QuoteSource};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn ok_row() -> WatchlistRow {
        WatchlistRow {
            code: "000001".to_string(),
            shares: Some(dec!(1000)),
            quote: Some(FundQuote {
                code: "000001".to_string(),
                name: "华夏成长混合".to_string(),
                net_value: dec!(1.0370),
                net_value_date: NaiveDate::from_ymd_opt(2024, 1, 12),
                day_growth_pct: Some(dec!(0.22)),
                estimated_value: None,
                estimated_time: None,
                source: QuoteSource::Live,
            }),
            dividend_date: NaiveDate::from_ymd_opt(2023, 11, 20),
            recent_dividend: false,
            market_value: Some(dec!(1037.00)),
            record_value: None,
            comparison: None,
            error: None,
        }
    }

    fn failed_row() -> WatchlistRow {
        WatchlistRow {
            code: "110022".to_string(),
            shares: None,
            quote: None,
            dividend_date: None,
            recent_dividend: false,
            market_value: None,
            record_value: Some(dec!(500)),
            comparison: None,
            error: Some("network error: offline mode".to_string()),
        }
    }

    #[test]
    fn test_default_filename() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(default_filename(day), "funds_20240305.csv");
    }

    #[test]
    fn test_write_csv_with_bom_and_empty_cells() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[ok_row(), failed_row()]).unwrap();

        assert!(buf.starts_with(UTF8_BOM));
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "基金名称,基金代码,净值日期,单位净值,持有份额,市值,记录点市值,分红日期");
        assert_eq!(lines[1], "华夏成长混合,000001,2024-01-12,1.0370,1000,1037.00,,2023-11-20");
        assert_eq!(lines[2], "110022,110022,,,,,500.00,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_export_empty_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = export_to_path(&[], &dir.path().join("out.csv")).unwrap_err();
        assert!(matches!(err.downcast_ref::<FundError>(), Some(FundError::Validation(_))));
        assert!(!dir.path().join("out.csv").exists());
    }

    #[test]
    fn test_export_to_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("funds.csv");
        export_to_path(&[ok_row()], &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        assert!(String::from_utf8_lossy(&bytes).contains("000001"));
    }
}
