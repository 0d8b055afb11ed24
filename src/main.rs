use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing_subscriber::EnvFilter;

use receipt_client::analytics::load_snapshot;
use receipt_client::models::{ReceiptId, SpendBucket, UploadFile};
use receipt_client::{ClientConfig, ReceiptApi, SessionError, UploadError, UploadOrchestrator};

#[derive(Parser)]
#[command(name = "receipt-client", version, about = "Upload receipts and review spending")]
struct Cli {
    /// Path to a config.yaml (overrides discovery)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "RECEIPT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session
    Logout,
    /// Upload receipt files (paths or glob patterns)
    Upload {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// List receipts
    Receipts,
    /// Show one receipt
    Show { id: i64 },
    /// Daily and monthly spend
    Analytics {
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Show receipts for a day (YYYY-MM-DD) or month (YYYY-MM)
        #[arg(long)]
        breakdown: Option<String>,
        /// Print the series as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a temporary link to a receipt image
    ViewUrl { id: i64 },
    /// Ask a question about your spending
    Ask {
        #[arg(required = true)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::discover()?,
    };
    let client = Arc::new(config.build_client()?);
    let api = ReceiptApi::new(client.clone());

    match cli.command {
        Command::Login { email, password } => {
            client.login(&email, &password).await?;
            println!("Logged in as {}", email);
        }
        Command::Logout => {
            client.logout().await?;
            println!("Logged out");
        }
        Command::Upload { paths } => {
            let files = load_files(&paths).await?;
            let orchestrator = UploadOrchestrator::new(client.clone());

            let outcome = match orchestrator.upload(files).await {
                Ok(outcome) => outcome,
                Err(UploadError::Session(SessionError::Expired)) => session_expired(),
                Err(e) => return Err(e.into()),
            };

            for ok in &outcome.succeeded {
                println!("  ok      #{:<6} {}", ok.receipt_id, ok.filename);
            }
            for failed in &outcome.failed {
                println!("  failed  {:<7} {} ({})", "", failed.filename, failed.reason);
            }
            println!("{}", outcome.summary());
            if !outcome.is_complete_success() {
                std::process::exit(1);
            }
        }
        Command::Receipts => {
            let receipts = api.list_receipts().await.map_err(expired_or)?;
            for r in &receipts {
                println!(
                    "#{:<6} {:<10} {:<30} {:>10} {}",
                    r.id,
                    r.status.as_str(),
                    r.display_merchant(),
                    r.total_amount.as_deref().unwrap_or("-"),
                    r.purchase_date.as_deref().unwrap_or("-"),
                );
            }
            println!("{} receipts", receipts.len());
        }
        Command::Analytics {
            date,
            breakdown,
            json,
        } => {
            let reference = date.unwrap_or_else(|| Local::now().date_naive());
            let snapshot = load_snapshot(&api, reference).await;
            if let Some(ref e) = snapshot.error {
                eprintln!("Warning: {}", e);
            }

            if let Some(key) = breakdown {
                let items = snapshot.breakdown(&key);
                if items.is_empty() {
                    println!("No spending on {}", key);
                }
                for r in items {
                    println!(
                        "{:<30} {:>10}",
                        r.display_merchant(),
                        r.total_amount.as_deref().unwrap_or("-")
                    );
                }
            } else if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.series)?);
            } else {
                println!("Day-wise spending ({})", reference.format("%B %Y"));
                print_buckets(&snapshot.series.daily);
                println!("\nMonth-wise spending");
                print_buckets(&snapshot.series.monthly);
                println!("\nLast 12 months: {:.2}", snapshot.series.total());
            }
        }
        Command::Show { id } => {
            let r = api.receipt(ReceiptId(id)).await.map_err(expired_or)?;
            println!("Receipt #{}", r.id);
            println!("  status    {}", r.status.as_str());
            println!("  merchant  {}", r.display_merchant());
            println!("  amount    {}", r.total_amount.as_deref().unwrap_or("-"));
            println!("  purchased {}", r.purchase_date.as_deref().unwrap_or("-"));
            println!("  uploaded  {}", r.created_at.as_deref().unwrap_or("-"));
        }
        Command::ViewUrl { id } => match api.view_url(ReceiptId(id)).await.map_err(expired_or)? {
            Some(url) => println!("{}", url),
            None => println!("Receipt #{} is not available yet", id),
        },
        Command::Ask { query } => {
            let answer = api.ask(&query.join(" ")).await.map_err(expired_or)?;
            println!("{}", answer);
        }
    }

    Ok(())
}

/// Expand paths and glob patterns, then read every file
async fn load_files(patterns: &[String]) -> Result<Vec<UploadFile>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matched: Vec<PathBuf> = glob(pattern)
            .context(format!("Invalid pattern: {}", pattern))?
            .flatten()
            .filter(|p| p.is_file())
            .collect();
        if matched.is_empty() {
            bail!("No files match {}", pattern);
        }
        paths.extend(matched);
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(UploadFile::from_path(&path).await?);
    }
    Ok(files)
}

fn print_buckets(buckets: &[SpendBucket]) {
    for bucket in buckets {
        println!("  {:<10} {:>12.2}", bucket.key, bucket.amount);
    }
}

fn expired_or(e: receipt_client::ApiError) -> anyhow::Error {
    if e == receipt_client::ApiError::Session(SessionError::Expired) {
        session_expired();
    }
    e.into()
}

fn session_expired() -> ! {
    eprintln!("Session expired. Run `receipt-client login` to sign in again.");
    std::process::exit(2);
}
