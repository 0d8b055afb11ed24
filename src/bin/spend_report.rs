use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use receipt_client::analytics::{aggregate, breakdown};
use receipt_client::models::Receipt;
use std::path::PathBuf;

/// Offline spend report from a saved receipts JSON file
#[derive(Parser)]
#[command(name = "spend-report", version)]
struct Args {
    /// Receipts JSON, as returned by the analytics endpoint
    path: PathBuf,

    /// Reference day (YYYY-MM-DD), defaults to today
    date: Option<NaiveDate>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let reference = args.date.unwrap_or_else(|| Local::now().date_naive());

    let content = std::fs::read_to_string(&args.path)
        .context(format!("Failed to read {:?}", args.path))?;
    let receipts: Vec<Receipt> =
        serde_json::from_str(&content).context("Failed to parse receipts JSON")?;

    let eligible = receipts.iter().filter(|r| r.spend().is_some()).count();
    println!("{} receipts, {} counted\n", receipts.len(), eligible);

    let series = aggregate(&receipts, reference);

    for bucket in series.daily.iter().filter(|b| b.amount > 0.0) {
        println!("{}  {:>10.2}", bucket.key, bucket.amount);
        for r in breakdown(&receipts, &bucket.key) {
            println!(
                "    {:<28} {:>10}",
                r.display_merchant(),
                r.total_amount.as_deref().unwrap_or("-")
            );
        }
    }
    println!("Month to date: {:.2}\n", series.month_to_date());

    for bucket in &series.monthly {
        println!("{}  {:>10.2}", bucket.key, bucket.amount);
    }
    println!("Last 12 months: {:.2}", series.total());

    if let Some(peak) = series.peak_day() {
        println!("Busiest day: {} ({:.2})", peak.key, peak.amount);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_path_and_optional_date() {
        let args = Args::try_parse_from(["spend-report", "receipts.json", "2024-04-17"]).unwrap();
        assert_eq!(args.path, PathBuf::from("receipts.json"));
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 4, 17));

        let args = Args::try_parse_from(["spend-report", "receipts.json"]).unwrap();
        assert_eq!(args.date, None);
    }

    #[test]
    fn test_rejects_bad_date_and_missing_path() {
        assert!(Args::try_parse_from(["spend-report", "receipts.json", "17/04/2024"]).is_err());
        assert!(Args::try_parse_from(["spend-report"]).is_err());
    }
}
