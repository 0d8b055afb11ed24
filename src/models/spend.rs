use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Total spend for one calendar day or month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendBucket {
    pub key: String,
    pub amount: f64,
}

impl SpendBucket {
    pub fn empty(key: String) -> Self {
        Self { key, amount: 0.0 }
    }
}

/// Dense daily and monthly spend series for one reference date
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpendSeries {
    pub daily: Vec<SpendBucket>,
    pub monthly: Vec<SpendBucket>,
}

impl SpendSeries {
    pub fn day(&self, key: &str) -> Option<&SpendBucket> {
        self.daily.iter().find(|b| b.key == key)
    }

    pub fn month(&self, key: &str) -> Option<&SpendBucket> {
        self.monthly.iter().find(|b| b.key == key)
    }

    /// Spend over the current month
    pub fn month_to_date(&self) -> f64 {
        self.daily.iter().map(|b| b.amount).sum()
    }

    /// Spend over the 12-month window
    pub fn total(&self) -> f64 {
        self.monthly.iter().map(|b| b.amount).sum()
    }

    /// Busiest day of the current month, ignoring empty days
    pub fn peak_day(&self) -> Option<&SpendBucket> {
        self.daily
            .iter()
            .filter(|b| b.amount > 0.0)
            .max_by(|a, b| a.amount.total_cmp(&b.amount))
    }
}

/// Parsed bucket key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKey {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

impl BucketKey {
    /// Accepts `YYYY-MM-DD` or `YYYY-MM`
    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        if let Ok(date) = NaiveDate::parse_from_str(key, "%Y-%m-%d") {
            return Some(Self::Day(date));
        }

        let (year, month) = key.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        (1..=12).contains(&month).then_some(Self::Month { year, month })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            Self::Day(day) => day == date,
            Self::Month { year, month } => date.year() == year && date.month() == month,
        }
    }
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}
