// Reports module - watchlist refresh, NAV charts and CSV export

pub mod chart;
pub mod export;
pub mod watchlist;

pub use chart::ChartRange;
pub use watchlist::{market_value, refresh_watchlist, WatchlistReport, WatchlistRow};
