use chrono::{Datelike, NaiveDate};

use crate::models::spend::{day_key, month_key};
use crate::models::{BucketKey, Receipt, SpendBucket, SpendSeries};

/// Months covered by the monthly series, reference month included
pub const MONTH_WINDOW: i32 = 12;

/// Build both spend series for the month containing `reference`
pub fn aggregate(receipts: &[Receipt], reference: NaiveDate) -> SpendSeries {
    SpendSeries {
        daily: daily_series(receipts, reference),
        monthly: monthly_series(receipts, reference),
    }
}

/// One bucket per calendar day of the reference month, ascending
pub fn daily_series(receipts: &[Receipt], reference: NaiveDate) -> Vec<SpendBucket> {
    let first = reference - chrono::Days::new(u64::from(reference.day0()));

    let mut buckets: Vec<SpendBucket> = first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .map(|d| SpendBucket::empty(day_key(d)))
        .collect();

    for (day, amount) in receipts.iter().filter_map(Receipt::spend) {
        if day.year() == first.year() && day.month() == first.month() {
            buckets[day.day0() as usize].amount += amount;
        }
    }

    buckets
}

/// One bucket per month for the 12 months ending with the reference month
pub fn monthly_series(receipts: &[Receipt], reference: NaiveDate) -> Vec<SpendBucket> {
    let end = month_index(reference);

    let mut buckets: Vec<SpendBucket> = (end - MONTH_WINDOW + 1..=end)
        .map(|idx| SpendBucket::empty(month_key(idx.div_euclid(12), idx.rem_euclid(12) as u32 + 1)))
        .collect();

    for (day, amount) in receipts.iter().filter_map(Receipt::spend) {
        let age = end - month_index(day);
        if (0..MONTH_WINDOW).contains(&age) {
            buckets[(MONTH_WINDOW - 1 - age) as usize].amount += amount;
        }
    }

    buckets
}

/// Eligible receipts falling in the given day (`YYYY-MM-DD`) or month
/// (`YYYY-MM`) bucket. Unparseable keys match nothing.
pub fn breakdown<'a>(receipts: &'a [Receipt], key: &str) -> Vec<&'a Receipt> {
    let Some(key) = BucketKey::parse(key) else {
        return Vec::new();
    };

    receipts
        .iter()
        .filter(|r| r.spend().map(|(day, _)| key.contains(day)).unwrap_or(false))
        .collect()
}

fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}
