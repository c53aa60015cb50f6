//! # Plan Sweep Runner
//!
//! Runs the premium plan consistency sweep for one user from the command
//! line. Useful in development and as a cron-style driver.
//!
//! ## Usage
//! ```bash
//! cargo run -p playverse-store --bin sweep -- --email lapsed@playverse.dev
//! cargo run -p playverse-store --bin sweep -- --db ./data/playverse.db --email x@y.z
//! ```

use std::env;
use std::sync::Arc;

use playverse_db::{Database, DbConfig};
use playverse_store::{Dispatcher, LogDelivery, Notifier, PlanService, StoreConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./playverse_dev.db");
    let mut email: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--email" | "-e" => {
                if i + 1 < args.len() {
                    email = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("PlayVerse Plan Sweep Runner");
                println!();
                println!("Usage: sweep [OPTIONS] --email <EMAIL>");
                println!();
                println!("Options:");
                println!("  -e, --email <EMAIL>  Profile to sweep (required)");
                println!("  -d, --db <PATH>      Database file path (default: ./playverse_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let Some(email) = email else {
        eprintln!("Missing --email; see --help");
        std::process::exit(2);
    };

    let config = StoreConfig::load()?;
    let db = Database::new(DbConfig::new(&db_path)).await?;

    let (dispatcher, handle) = Dispatcher::new(Arc::new(LogDelivery));
    let worker = tokio::spawn(dispatcher.run());

    let notifier = Notifier::new(db.clone(), handle.clone(), config.dedupe_window());
    let plans = PlanService::new(db.clone(), notifier);

    let outcome = plans.ensure_for_email(&email).await?;
    info!(email = %email, ?outcome, "Plan sweep finished");

    handle.shutdown().await;
    worker.await?;
    db.close().await;

    Ok(())
}
