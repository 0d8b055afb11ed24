use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Backend-assigned receipt identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptId(pub i64);

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Processing status of a receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReceiptStatus {
    #[default]
    Pending,
    Processing,
    Ready,
    Failed,
    Unknown,
}

impl<'de> Deserialize<'de> for ReceiptStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_backend(&raw))
    }
}

impl ReceiptStatus {
    /// Case-insensitive; statuses this client does not know map to `Unknown`
    pub fn from_backend(status: &str) -> Self {
        match status.trim().to_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "PROCESSING" => Self::Processing,
            "READY" => Self::Ready,
            "FAILED" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Ready => "READY",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// A receipt as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    #[serde(default)]
    pub merchant_name: Option<String>,
    /// Decimal amount; the backend sends it as a string but numbers are accepted
    #[serde(default, deserialize_with = "amount_as_string")]
    pub total_amount: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub status: ReceiptStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Receipt {
    pub fn new(id: i64, status: ReceiptStatus) -> Self {
        Self {
            id: ReceiptId(id),
            merchant_name: None,
            total_amount: None,
            purchase_date: None,
            status,
            created_at: None,
        }
    }

    /// Parsed amount, if present and a finite number
    pub fn amount(&self) -> Option<f64> {
        let raw = self.total_amount.as_deref()?.trim();
        let value: f64 = raw.parse().ok()?;
        value.is_finite().then_some(value)
    }

    /// Calendar day of purchase, as written in the timestamp's own offset
    pub fn purchase_day(&self) -> Option<NaiveDate> {
        parse_purchase_date(self.purchase_date.as_deref()?)
    }

    /// Day and amount for receipts that count towards spend analytics
    pub fn spend(&self) -> Option<(NaiveDate, f64)> {
        if !self.status.is_ready() {
            return None;
        }
        Some((self.purchase_day()?, self.amount()?))
    }

    pub fn display_merchant(&self) -> &str {
        self.merchant_name
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("Unknown merchant")
    }
}

fn parse_purchase_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn amount_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(amount: &str, date: &str) -> Receipt {
        Receipt {
            total_amount: Some(amount.to_string()),
            purchase_date: Some(date.to_string()),
            ..Receipt::new(1, ReceiptStatus::Ready)
        }
    }

    #[test]
    fn test_status_from_backend() {
        assert_eq!(ReceiptStatus::from_backend("ready"), ReceiptStatus::Ready);
        assert_eq!(ReceiptStatus::from_backend("ARCHIVED"), ReceiptStatus::Unknown);
    }

    #[test]
    fn test_status_decoding_ignores_case() {
        let statuses: Vec<ReceiptStatus> =
            serde_json::from_str(r#"["ready", "READY", "Processing", "archived"]"#).unwrap();
        assert_eq!(
            statuses,
            vec![
                ReceiptStatus::Ready,
                ReceiptStatus::Ready,
                ReceiptStatus::Processing,
                ReceiptStatus::Unknown
            ]
        );
        assert_eq!(
            serde_json::to_string(&ReceiptStatus::Ready).unwrap(),
            r#""READY""#
        );
    }

    #[test]
    fn test_receipt_id_honours_width() {
        assert_eq!(format!("{:<6}|", ReceiptId(42)), "42    |");
        assert_eq!(format!("{:>4}", ReceiptId(7)), "   7");
    }

    #[test]
    fn test_decode_numeric_and_string_amounts() {
        let json = r#"[
            {"id": 1, "total_amount": "12.50", "status": "READY"},
            {"id": 2, "total_amount": 7.25, "status": "PENDING"},
            {"id": 3, "total_amount": null, "status": "SOMETHING_NEW"}
        ]"#;
        let receipts: Vec<Receipt> = serde_json::from_str(json).unwrap();
        assert_eq!(receipts[0].amount(), Some(12.5));
        assert_eq!(receipts[1].amount(), Some(7.25));
        assert_eq!(receipts[2].total_amount, None);
        assert_eq!(receipts[2].status, ReceiptStatus::Unknown);
    }

    #[test]
    fn test_purchase_date_formats() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(ready("1", "2024-03-05T23:30:00+05:30").purchase_day(), Some(day));
        assert_eq!(ready("1", "2024-03-05T10:00:00Z").purchase_day(), Some(day));
        assert_eq!(ready("1", "2024-03-05T10:00:00").purchase_day(), Some(day));
        assert_eq!(ready("1", "2024-03-05").purchase_day(), Some(day));
        assert_eq!(ready("1", "05/03/2024").purchase_day(), None);
    }

    #[test]
    fn test_spend_requires_ready_and_numeric_amount() {
        assert!(ready("250.00", "2024-03-05").spend().is_some());
        assert!(ready("n/a", "2024-03-05").spend().is_none());
        assert!(ready("NaN", "2024-03-05").spend().is_none());

        let mut pending = ready("250.00", "2024-03-05");
        pending.status = ReceiptStatus::Processing;
        assert!(pending.spend().is_none());
    }
}
