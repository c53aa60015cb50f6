//! # Seed Data Generator
//!
//! Populates the database with a demo catalog and demo profiles for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p playverse-db --bin seed
//!
//! # Specify database path
//! cargo run -p playverse-db --bin seed -- --db ./data/playverse.db
//! ```
//!
//! ## Generated Data
//! - A small game catalog spanning free and premium plans, with purchase
//!   and weekly rental prices
//! - Three demo profiles: a free player, an active premium subscriber and
//!   a lapsed premium subscriber (useful for exercising the plan sweep)

use chrono::{Duration, Utc};
use playverse_core::{Game, GamePlan, Profile, Role};
use playverse_db::{Database, DbConfig};
use std::env;
use uuid::Uuid;

/// (title, plan, purchase cents, weekly cents, description)
const CATALOG: &[(&str, GamePlan, i64, i64, &str)] = &[
    (
        "Star Drifter",
        GamePlan::Free,
        4999,
        1999,
        "An endless drift through a neon galaxy.",
    ),
    (
        "Dungeon Ledger",
        GamePlan::Free,
        2999,
        999,
        "Balance the books of a goblin bank, one heist at a time.",
    ),
    (
        "Mech Harvest",
        GamePlan::Premium,
        5999,
        2499,
        "Farm the wasteland with scavenged battle mechs.",
    ),
    (
        "Tidebound",
        GamePlan::Premium,
        6999,
        2999,
        "A deck-building voyage across a drowned world.",
    ),
    (
        "Pocket Orbit",
        GamePlan::Free,
        1999,
        799,
        "Sling tiny moons into stable orbits.",
    ),
    (
        "Circuit Breaker",
        GamePlan::Premium,
        4499,
        1799,
        "Speedrun collapsing power grids before the lights go out.",
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./playverse_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("PlayVerse Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./playverse_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 PlayVerse Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing games
    let existing = db.games().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} games", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    let now = Utc::now();
    for (title, plan, purchase_cents, weekly_cents, description) in CATALOG {
        let game = Game {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            plan: *plan,
            purchase_price_cents: *purchase_cents,
            weekly_price_cents: *weekly_cents,
            description: Some(description.to_string()),
            embed_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = db.games().insert(&game).await {
            eprintln!("Failed to insert {}: {}", game.title, e);
            continue;
        }
        println!("  + {} ({:?})", title, plan);
    }

    println!();
    println!("Seeding profiles...");

    let profiles = [
        Profile {
            id: Uuid::new_v4().to_string(),
            email: "free@playverse.dev".to_string(),
            role: Role::Free,
            premium_plan: None,
            premium_expires_at: None,
            premium_auto_renew: false,
            trial_ends_at: None,
            free_trial_used: false,
            created_at: now,
            updated_at: now,
        },
        Profile {
            id: Uuid::new_v4().to_string(),
            email: "premium@playverse.dev".to_string(),
            role: Role::Premium,
            premium_plan: Some("monthly".to_string()),
            premium_expires_at: Some(now + Duration::days(30)),
            premium_auto_renew: true,
            trial_ends_at: None,
            free_trial_used: true,
            created_at: now,
            updated_at: now,
        },
        // Already lapsed: the first plan sweep for this user downgrades it
        Profile {
            id: Uuid::new_v4().to_string(),
            email: "lapsed@playverse.dev".to_string(),
            role: Role::Premium,
            premium_plan: Some("monthly".to_string()),
            premium_expires_at: Some(now - Duration::days(3)),
            premium_auto_renew: false,
            trial_ends_at: None,
            free_trial_used: true,
            created_at: now - Duration::days(33),
            updated_at: now - Duration::days(33),
        },
    ];

    for profile in &profiles {
        if let Err(e) = db.profiles().insert(profile).await {
            eprintln!("Failed to insert {}: {}", profile.email, e);
            continue;
        }
        println!("  + {} ({:?})", profile.email, profile.role);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
