mod common;

use chrono::NaiveDate;
use common::{client, logged_in, url, FakeTransport};
use receipt_client::analytics::{aggregate, breakdown, load_snapshot};
use receipt_client::backend::{HttpResponse, Method, ReceiptApi};
use receipt_client::models::{Receipt, ReceiptStatus};
use serde_json::json;

const TOLERANCE: f64 = 1e-9;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn receipt(id: i64, status: ReceiptStatus, amount: Option<&str>, purchased: Option<&str>) -> Receipt {
    Receipt {
        total_amount: amount.map(str::to_string),
        purchase_date: purchased.map(str::to_string),
        merchant_name: Some(format!("Shop {}", id)),
        ..Receipt::new(id, status)
    }
}

fn ready(id: i64, amount: &str, purchased: &str) -> Receipt {
    receipt(id, ReceiptStatus::Ready, Some(amount), Some(purchased))
}

#[test]
fn empty_month_is_dense_and_zero() {
    let series = aggregate(&[], date(2024, 4, 17));

    assert_eq!(series.daily.len(), 30);
    assert_eq!(series.daily[0].key, "2024-04-01");
    assert_eq!(series.daily[29].key, "2024-04-30");
    assert!(series.daily.iter().all(|b| b.amount == 0.0));
    assert!(series.daily.windows(2).all(|w| w[0].key < w[1].key));

    assert_eq!(series.monthly.len(), 12);
    assert!(series.monthly.iter().all(|b| b.amount == 0.0));
}

#[test]
fn single_receipt_lands_on_its_day() {
    let receipts = vec![ready(1, "250.00", "2024-04-05T12:00:00Z")];
    let series = aggregate(&receipts, date(2024, 4, 17));

    for bucket in &series.daily {
        let expected = if bucket.key == "2024-04-05" { 250.0 } else { 0.0 };
        assert!((bucket.amount - expected).abs() < TOLERANCE, "{}", bucket.key);
    }
    assert!((series.month("2024-04").unwrap().amount - 250.0).abs() < TOLERANCE);
}

#[test]
fn ineligible_receipts_are_ignored() {
    let receipts = vec![
        receipt(1, ReceiptStatus::Pending, Some("10"), Some("2024-04-02")),
        receipt(2, ReceiptStatus::Failed, Some("10"), Some("2024-04-02")),
        receipt(3, ReceiptStatus::Ready, None, Some("2024-04-02")),
        receipt(4, ReceiptStatus::Ready, Some("10"), None),
        receipt(5, ReceiptStatus::Ready, Some("ten"), Some("2024-04-02")),
        ready(6, "1.50", "2024-04-02"),
    ];
    let series = aggregate(&receipts, date(2024, 4, 30));

    assert!((series.day("2024-04-02").unwrap().amount - 1.5).abs() < TOLERANCE);
    assert!((series.total() - 1.5).abs() < TOLERANCE);
}

#[test]
fn other_months_stay_out_of_daily_series() {
    let receipts = vec![ready(1, "40", "2024-03-05"), ready(2, "60", "2023-04-05")];
    let series = aggregate(&receipts, date(2024, 4, 10));

    assert!(series.daily.iter().all(|b| b.amount == 0.0));
    assert!((series.month("2024-03").unwrap().amount - 40.0).abs() < TOLERANCE);
}

#[test]
fn twelve_month_window_boundaries() {
    let receipts = vec![
        // 13 months before the reference month
        ready(1, "100", "2023-03-15"),
        // oldest month still inside the window
        ready(2, "20", "2023-05-01"),
        ready(3, "5", "2024-04-30"),
    ];
    let series = aggregate(&receipts, date(2024, 4, 1));

    assert_eq!(series.monthly.first().unwrap().key, "2023-05");
    assert_eq!(series.monthly.last().unwrap().key, "2024-04");
    assert!(series.month("2023-03").is_none());
    assert!((series.month("2023-05").unwrap().amount - 20.0).abs() < TOLERANCE);
    assert!((series.total() - 25.0).abs() < TOLERANCE);
}

#[test]
fn breakdown_returns_receipts_of_the_day() {
    let receipts = vec![
        ready(1, "12", "2024-04-09T08:00:00Z"),
        ready(2, "30", "2024-04-09T20:15:00Z"),
        ready(3, "7", "2024-04-10"),
        receipt(4, ReceiptStatus::Processing, Some("9"), Some("2024-04-09")),
    ];

    let mut ids: Vec<i64> = breakdown(&receipts, "2024-04-09").iter().map(|r| r.id.0).collect();
    ids.sort();
    assert_eq!(ids, vec![1, 2]);
    assert!(breakdown(&receipts, "2024-04-11").is_empty());
}

#[tokio::test]
async fn snapshot_from_backend() {
    let transport = FakeTransport::new();
    transport.respond_json(
        Method::GET,
        &url("/receipts/analytics/"),
        200,
        json!([
            {"id": 1, "merchant_name": "Cafe", "total_amount": "250.00",
             "purchase_date": "2024-04-05T10:00:00Z", "status": "READY",
             "created_at": "2024-04-05T11:00:00Z"},
            {"id": 2, "merchant_name": null, "total_amount": null,
             "purchase_date": null, "status": "PROCESSING",
             "created_at": "2024-04-06T11:00:00Z"}
        ]),
    );
    let api = ReceiptApi::new(client(&transport, &logged_in()));

    let snapshot = load_snapshot(&api, date(2024, 4, 20)).await;

    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.receipts.len(), 2);
    assert_eq!(snapshot.eligible_count(), 1);
    assert!((snapshot.series.day("2024-04-05").unwrap().amount - 250.0).abs() < TOLERANCE);
    assert_eq!(snapshot.breakdown("2024-04-05").len(), 1);
}

#[tokio::test]
async fn failed_fetch_yields_zero_filled_series() {
    let transport = FakeTransport::new();
    transport.respond(
        Method::GET,
        &url("/receipts/analytics/"),
        Ok(HttpResponse::new(503)),
    );
    let api = ReceiptApi::new(client(&transport, &logged_in()));

    let snapshot = load_snapshot(&api, date(2024, 2, 10)).await;

    assert!(snapshot.error.is_some());
    assert!(snapshot.receipts.is_empty());
    assert_eq!(snapshot.series.daily.len(), 29);
    assert_eq!(snapshot.series.monthly.len(), 12);
    assert_eq!(snapshot.series.total(), 0.0);
}
