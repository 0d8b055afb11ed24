use chrono::NaiveDate;
use tracing::{debug, warn};

use super::aggregator::{aggregate, breakdown};
use crate::backend::ReceiptApi;
use crate::error::AnalyticsFetchError;
use crate::models::{Receipt, SpendSeries};

/// Receipts plus the series derived from them
#[derive(Debug, Clone)]
pub struct AnalyticsSnapshot {
    pub reference: NaiveDate,
    pub receipts: Vec<Receipt>,
    pub series: SpendSeries,
    /// Set when the fetch failed; the series are then all zero
    pub error: Option<AnalyticsFetchError>,
}

impl AnalyticsSnapshot {
    pub fn from_receipts(receipts: Vec<Receipt>, reference: NaiveDate) -> Self {
        let series = aggregate(&receipts, reference);
        Self {
            reference,
            receipts,
            series,
            error: None,
        }
    }

    pub fn breakdown(&self, key: &str) -> Vec<&Receipt> {
        breakdown(&self.receipts, key)
    }

    pub fn eligible_count(&self) -> usize {
        self.receipts.iter().filter(|r| r.spend().is_some()).count()
    }
}

/// Fetch the analytics receipt collection
pub async fn fetch_receipts(api: &ReceiptApi) -> Result<Vec<Receipt>, AnalyticsFetchError> {
    let receipts = api.analytics_receipts().await?;
    debug!("Loaded {} receipts for analytics", receipts.len());
    Ok(receipts)
}

/// Fetch and aggregate. A failed fetch yields zero-filled series and keeps
/// the error for the caller to report.
pub async fn load_snapshot(api: &ReceiptApi, reference: NaiveDate) -> AnalyticsSnapshot {
    match fetch_receipts(api).await {
        Ok(receipts) => AnalyticsSnapshot::from_receipts(receipts, reference),
        Err(e) => {
            warn!("{}", e);
            AnalyticsSnapshot {
                error: Some(e),
                ..AnalyticsSnapshot::from_receipts(Vec::new(), reference)
            }
        }
    }
}
