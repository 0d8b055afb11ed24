pub mod aggregator;
pub mod reader;

pub use aggregator::{aggregate, breakdown, daily_series, monthly_series};
pub use reader::{fetch_receipts, load_snapshot, AnalyticsSnapshot};
