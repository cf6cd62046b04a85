//! Fundwatch - mutual fund watchlist tracker
//!
//! This library fetches fund quotes and NAV history from public feeds,
//! keeps a persisted watchlist with held shares and a record-point
//! baseline, and produces refresh reports and CSV exports.

pub mod config;
pub mod db;
pub mod error;
pub mod pricing;
pub mod record;
pub mod reports;
pub mod ui;
pub mod utils;
pub mod watchlist;
