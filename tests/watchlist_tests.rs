use fundwatch::db::{FundEntry, KvStore, SqliteStore};
use fundwatch::record::RecordStore;
use fundwatch::watchlist::{WatchlistStore, WATCHLIST_KEY};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use tempfile::TempDir;

#[test]
fn test_last_write_wins_between_two_stores() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.db");

    let store_a = SqliteStore::open(Some(path.clone())).unwrap();
    let store_b = SqliteStore::open(Some(path.clone())).unwrap();
    let a = WatchlistStore::new(&store_a);
    let b = WatchlistStore::new(&store_b);

    a.save(&[FundEntry::new("000001")]).unwrap();

    // Both writers read the same snapshot
    let mut from_a = a.load().unwrap();
    let mut from_b = b.load().unwrap();

    from_a.push(FundEntry::new("110022"));
    from_b.push(FundEntry::with_shares("161725", dec!(50)));

    a.save(&from_a).unwrap();
    b.save(&from_b).unwrap();

    // The second save replaced the first one entirely
    let reopened = SqliteStore::open(Some(path)).unwrap();
    let entries = WatchlistStore::new(&reopened).load().unwrap();
    assert_eq!(
        entries,
        vec![FundEntry::new("000001"), FundEntry::with_shares("161725", dec!(50))]
    );
}

#[test]
fn test_save_load_is_stable() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(Some(dir.path().join("data.db"))).unwrap();
    let watchlist = WatchlistStore::new(&store);

    let entries = vec![
        FundEntry::with_shares("161725", dec!(1234.56)),
        FundEntry::new("000001"),
        FundEntry::with_shares("110022", dec!(0)),
    ];
    watchlist.save(&entries).unwrap();
    let raw_first = store.get(WATCHLIST_KEY).unwrap();

    watchlist.save(&watchlist.load().unwrap()).unwrap();
    assert_eq!(store.get(WATCHLIST_KEY).unwrap(), raw_first);
    assert_eq!(watchlist.load().unwrap(), entries);
}

#[test]
fn test_reorder_persists_with_shares() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(Some(dir.path().join("data.db"))).unwrap();
    let watchlist = WatchlistStore::new(&store);
    watchlist
        .save(&[
            FundEntry::new("000001"),
            FundEntry::new("110022"),
            FundEntry::with_shares("161725", dec!(10)),
        ])
        .unwrap();

    watchlist.move_entry(2, 0).unwrap();

    let codes: Vec<String> = watchlist.load().unwrap().into_iter().map(|e| e.code).collect();
    assert_eq!(codes, vec!["161725", "000001", "110022"]);
    assert_eq!(watchlist.load().unwrap()[0].shares, Some(dec!(10)));
}

#[test]
fn test_record_point_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.db");
    {
        let store = SqliteStore::open(Some(path.clone())).unwrap();
        let mut values = BTreeMap::new();
        values.insert("000001".to_string(), dec!(1037.00));
        RecordStore::new(&store).set(values).unwrap();
    }

    let store = SqliteStore::open(Some(path)).unwrap();
    let record = RecordStore::new(&store).get().unwrap();
    assert!(record.is_set());
    assert_eq!(record.value_for("000001"), Some(dec!(1037.00)));
}
