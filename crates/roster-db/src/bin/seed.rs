//! # Seed Data Generator
//!
//! Populates the users collection with sample users for development and for
//! the browser test suite.
//!
//! ## Usage
//! ```bash
//! # Generate 25 users (default) in ./data
//! cargo run -p roster-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p roster-db --bin seed -- --count 200
//!
//! # Specify data directory
//! cargo run -p roster-db --bin seed -- --data-dir ./src/datos
//! ```
//!
//! Users go through `UserService::create`, so every seeded record passes the
//! same rules as a real request. Statuses rotate between "Activo",
//! "Pendiente", "Inactivo", and none.

use std::env;
use std::time::Instant;

use roster_core::{DefaultUserRules, NewUser, UserService, USERS_COLLECTION};
use roster_db::{JsonFileStore, StoreConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// First names for generated users
const FIRST_NAMES: &[&str] = &[
    "Juan", "María", "Pedro", "Ana", "Luis", "Carmen", "José", "Lucía", "Carlos", "Elena",
    "Miguel", "Sofía", "Javier", "Paula", "Diego", "Laura",
];

/// Last names for generated users
const LAST_NAMES: &[&str] = &[
    "Pérez", "García", "López", "Martínez", "González", "Rodríguez", "Sánchez", "Ramírez",
    "Torres", "Flores",
];

/// Status rotation; `None` leaves the field out
const STATUSES: &[Option<&str>] = &[Some("Activo"), Some("Pendiente"), Some("Inactivo"), None];

const DEFAULT_COUNT: usize = 25;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count = DEFAULT_COUNT;
    let mut config = StoreConfig::from_env();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--data-dir" | "-d" => {
                if i + 1 < args.len() {
                    config.data_dir = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Roster Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>        Number of users to generate (default: {DEFAULT_COUNT})");
                println!("  -d, --data-dir <PATH>  Data directory (default: $ROSTER_DATA_DIR or ./data)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(data_dir = %config.data_dir.display(), count, "Seeding users");

    let store = JsonFileStore::new(config);

    // Check existing users
    let existing = store.count(USERS_COLLECTION).await?;
    if existing > 0 {
        warn!(existing, "Users collection is not empty, skipping seed to avoid duplicates");
        println!("Delete {} to regenerate.", store.path_of(USERS_COLLECTION)?.display());
        return Ok(());
    }

    let service = UserService::new(store, DefaultUserRules);
    let start = Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let candidate = generate_user(seed);

        if let Err(e) = service.create(candidate).await {
            warn!(seed, error = %e, "Failed to create user");
            continue;
        }

        generated += 1;

        if generated % 100 == 0 {
            info!(generated, "Seeding in progress");
        }
    }

    let elapsed = start.elapsed();
    info!(generated, ?elapsed, "Seed complete");

    let stored = service.list_all().await?;
    println!("✓ {} users in {}", stored.len(), USERS_COLLECTION);

    Ok(())
}

/// Generates a single user candidate with realistic data.
fn generate_user(seed: usize) -> NewUser {
    let first = FIRST_NAMES[seed % FIRST_NAMES.len()];
    let last = LAST_NAMES[(seed / FIRST_NAMES.len() + seed) % LAST_NAMES.len()];

    let name = format!("{first} {last}");
    let email = format!(
        "{}.{}{}@example.com",
        ascii_lower(first),
        ascii_lower(last),
        seed
    );

    let mut candidate = NewUser::new(name, email);
    if let Some(status) = STATUSES[seed % STATUSES.len()] {
        candidate = candidate.with_status(status);
    }
    candidate
}

/// Lowercases a name and strips accents for use in an email local part.
fn ascii_lower(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            'á' | 'Á' => 'a',
            'é' | 'É' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'Ó' => 'o',
            'ú' | 'Ú' | 'ü' => 'u',
            'ñ' | 'Ñ' => 'n',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
