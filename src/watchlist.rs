//! Watchlist store
//!
//! The watchlist is one JSON array under a single key. Every save replaces
//! the whole array; concurrent writers overwrite each other (last write
//! wins).

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::db::{FundEntry, KvStore};
use crate::error::FundError;
use crate::pricing::FundFetcher;
use crate::utils::validate_code;

pub const WATCHLIST_KEY: &str = "fund_query_data";
pub const MAX_CODES_PER_ADD: usize = 50;

/// Stored entries are objects; very old data holds bare code strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Entry(FundEntry),
    Code(String),
}

impl From<StoredEntry> for FundEntry {
    fn from(stored: StoredEntry) -> Self {
        match stored {
            StoredEntry::Entry(entry) => entry,
            StoredEntry::Code(code) => FundEntry::new(&code),
        }
    }
}

pub struct WatchlistStore<'a> {
    store: &'a dyn KvStore,
}

impl<'a> WatchlistStore<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Vec<FundEntry>> {
        let Some(raw) = self.store.get(WATCHLIST_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<StoredEntry>>(&raw) {
            Ok(stored) => Ok(stored.into_iter().map(FundEntry::from).collect()),
            Err(e) => {
                warn!("Ignoring unreadable watchlist data: {}", e);
                Ok(Vec::new())
            }
        }
    }

    pub fn save(&self, entries: &[FundEntry]) -> Result<()> {
        let json = serde_json::to_string(entries).context("Failed to serialize watchlist")?;
        self.store.put(WATCHLIST_KEY, &json)
    }

    /// Move the entry at `from` to `to` (0-based) and persist.
    pub fn move_entry(&self, from: usize, to: usize) -> Result<Vec<FundEntry>> {
        let mut entries = self.load()?;
        reorder(&mut entries, from, to)?;
        self.save(&entries)?;
        Ok(entries)
    }

    /// Set (or clear) the shares held of `code`, appending the code when it
    /// is not in the list yet.
    pub fn upsert_shares(&self, code: &str, shares: Option<Decimal>) -> Result<FundEntry> {
        validate_code(code)?;
        if let Some(s) = shares {
            if s < Decimal::ZERO {
                return Err(FundError::Validation(format!("shares cannot be negative: {}", s)).into());
            }
        }

        let mut entries = self.load()?;
        let entry = match index_of(&entries, code) {
            Some(idx) => {
                entries[idx].shares = shares;
                entries[idx].clone()
            }
            None => {
                let entry = FundEntry {
                    code: code.to_string(),
                    shares,
                };
                entries.push(entry.clone());
                entry
            }
        };
        self.save(&entries)?;
        Ok(entry)
    }

    /// Returns true when the code was in the list.
    pub fn remove(&self, code: &str) -> Result<bool> {
        let mut entries = self.load()?;
        let Some(idx) = index_of(&entries, code) else {
            return Ok(false);
        };
        entries.remove(idx);
        self.save(&entries)?;
        info!("Removed {} from watchlist", code);
        Ok(true)
    }

    /// Add a comma separated list of codes. Unless `fetcher` is `None`,
    /// each new code is checked against the quote feed first.
    pub async fn add_codes(&self, input: &str, fetcher: Option<&FundFetcher>) -> Result<AddReport> {
        let codes = parse_code_list(input)?;
        let mut entries = self.load()?;
        let mut report = AddReport::default();
        let mut seen: HashSet<String> = entries.iter().map(|e| e.code.clone()).collect();

        for code in codes {
            if !seen.insert(code.clone()) {
                report.duplicates.push(code);
                continue;
            }

            if let Some(fetcher) = fetcher {
                match fetcher.fetch_quote(&code).await {
                    Ok(_) => {}
                    Err(e) if e.is_missing_data() => {
                        report.not_found.push(code);
                        continue;
                    }
                    Err(e) => {
                        report.errored.push((code, e.to_string()));
                        continue;
                    }
                }
            }

            entries.push(FundEntry::new(&code));
            report.added.push(code);
        }

        if !report.added.is_empty() {
            self.save(&entries)?;
            info!("Added {} funds to watchlist", report.added.len());
        }
        Ok(report)
    }
}

/// Outcome of [`WatchlistStore::add_codes`]
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct AddReport {
    pub added: Vec<String>,
    pub duplicates: Vec<String>,
    pub not_found: Vec<String>,
    pub errored: Vec<(String, String)>,
}

pub fn index_of(entries: &[FundEntry], code: &str) -> Option<usize> {
    entries.iter().position(|e| e.code == code)
}

/// Move `entries[from]` to position `to`.
pub fn reorder(entries: &mut Vec<FundEntry>, from: usize, to: usize) -> Result<(), FundError> {
    let len = entries.len();
    if from >= len || to >= len {
        return Err(FundError::Validation(format!(
            "position out of range: {} -> {} (watchlist has {} funds)",
            from + 1,
            to + 1,
            len
        )));
    }
    let entry = entries.remove(from);
    entries.insert(to, entry);
    Ok(())
}

/// Split a user supplied list on ASCII or full-width commas. Rejects the
/// whole input if any code is malformed.
pub fn parse_code_list(input: &str) -> Result<Vec<String>, FundError> {
    let codes: Vec<String> = input
        .split([',', '，'])
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if codes.is_empty() {
        return Err(FundError::Validation("no fund codes given".to_string()));
    }
    if codes.len() > MAX_CODES_PER_ADD {
        return Err(FundError::Validation(format!(
            "too many codes: {} (at most {} per add)",
            codes.len(),
            MAX_CODES_PER_ADD
        )));
    }

    let invalid: Vec<&str> = codes
        .iter()
        .filter(|c| validate_code(c).is_err())
        .map(String::as_str)
        .collect();
    if !invalid.is_empty() {
        return Err(FundError::Validation(format!(
            "invalid fund codes: {}",
            invalid.join(", ")
        )));
    }

    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use rust_decimal_macros::dec;

    fn codes(entries: &[FundEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.code.as_str()).collect()
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let store = MemoryStore::new();
        assert!(WatchlistStore::new(&store).load().unwrap().is_empty());
    }

    #[test]
    fn test_save_load_round_trip_keeps_order() {
        let store = MemoryStore::new();
        let watchlist = WatchlistStore::new(&store);
        let entries = vec![
            FundEntry::with_shares("110022", dec!(1000.5)),
            FundEntry::new("000001"),
            FundEntry::with_shares("161725", dec!(0)),
        ];
        watchlist.save(&entries).unwrap();
        let loaded = watchlist.load().unwrap();
        assert_eq!(loaded, entries);

        watchlist.save(&loaded).unwrap();
        assert_eq!(watchlist.load().unwrap(), entries);
    }

    #[test]
    fn test_load_accepts_legacy_and_numeric_entries() {
        let store = MemoryStore::new();
        store
            .put(WATCHLIST_KEY, r#"["000001",{"code":"110022","shares":1200.5},{"code":"161725","shares":null}]"#)
            .unwrap();
        let loaded = WatchlistStore::new(&store).load().unwrap();
        assert_eq!(codes(&loaded), vec!["000001", "110022", "161725"]);
        assert_eq!(loaded[0].shares, None);
        assert_eq!(loaded[1].shares, Some(dec!(1200.5)));
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        let store = MemoryStore::new();
        store.put(WATCHLIST_KEY, "not json").unwrap();
        assert!(WatchlistStore::new(&store).load().unwrap().is_empty());
    }

    #[test]
    fn test_reorder_moves_entry_with_shares() {
        let mut entries = vec![
            FundEntry::new("000001"),
            FundEntry::with_shares("110022", dec!(300)),
            FundEntry::new("161725"),
        ];
        reorder(&mut entries, 1, 0).unwrap();
        assert_eq!(codes(&entries), vec!["110022", "000001", "161725"]);
        assert_eq!(entries[0].shares, Some(dec!(300)));

        reorder(&mut entries, 0, 2).unwrap();
        assert_eq!(codes(&entries), vec!["000001", "161725", "110022"]);

        assert!(matches!(reorder(&mut entries, 3, 0), Err(FundError::Validation(_))));
        assert!(matches!(reorder(&mut entries, 0, 3), Err(FundError::Validation(_))));
    }

    #[test]
    fn test_move_entry_persists() {
        let store = MemoryStore::new();
        let watchlist = WatchlistStore::new(&store);
        watchlist
            .save(&[FundEntry::new("000001"), FundEntry::new("110022")])
            .unwrap();
        watchlist.move_entry(1, 0).unwrap();
        assert_eq!(codes(&watchlist.load().unwrap()), vec!["110022", "000001"]);
    }

    #[test]
    fn test_upsert_shares() {
        let store = MemoryStore::new();
        let watchlist = WatchlistStore::new(&store);
        watchlist.save(&[FundEntry::new("000001")]).unwrap();

        watchlist.upsert_shares("000001", Some(dec!(1500))).unwrap();
        watchlist.upsert_shares("110022", Some(dec!(20))).unwrap();
        let loaded = watchlist.load().unwrap();
        assert_eq!(loaded[0], FundEntry::with_shares("000001", dec!(1500)));
        assert_eq!(loaded[1], FundEntry::with_shares("110022", dec!(20)));

        watchlist.upsert_shares("000001", None).unwrap();
        assert_eq!(watchlist.load().unwrap()[0].shares, None);

        let err = watchlist.upsert_shares("000001", Some(dec!(-1))).unwrap_err();
        assert!(matches!(err.downcast_ref::<FundError>(), Some(FundError::Validation(_))));
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();
        let watchlist = WatchlistStore::new(&store);
        watchlist
            .save(&[FundEntry::new("000001"), FundEntry::new("110022")])
            .unwrap();
        assert!(watchlist.remove("000001").unwrap());
        assert!(!watchlist.remove("000001").unwrap());
        assert_eq!(codes(&watchlist.load().unwrap()), vec!["110022"]);
    }

    #[test]
    fn test_parse_code_list() {
        assert_eq!(
            parse_code_list(" 000001，110022 ,,161725 ").unwrap(),
            vec!["000001", "110022", "161725"]
        );
        assert!(matches!(parse_code_list(" , "), Err(FundError::Validation(_))));

        let err = parse_code_list("000001,12345,abcdef").unwrap_err();
        assert!(err.to_string().contains("12345, abcdef"));

        let many = (0..51).map(|i| format!("{:06}", i)).collect::<Vec<_>>().join(",");
        assert!(matches!(parse_code_list(&many), Err(FundError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_codes_without_verification_skips_duplicates() {
        let store = MemoryStore::new();
        let watchlist = WatchlistStore::new(&store);
        watchlist.save(&[FundEntry::with_shares("000001", dec!(10))]).unwrap();

        let report = watchlist
            .add_codes("000001,110022,110022,161725", None)
            .await
            .unwrap();
        assert_eq!(report.added, vec!["110022", "161725"]);
        assert_eq!(report.duplicates, vec!["000001", "110022"]);

        let loaded = watchlist.load().unwrap();
        assert_eq!(codes(&loaded), vec!["000001", "110022", "161725"]);
        assert_eq!(loaded[0].shares, Some(dec!(10)));
        assert_eq!(loaded[1].shares, None);
    }
}
