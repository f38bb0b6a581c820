//! Default seed script - creates the schema and fills it with test data
//!
//! Run with:
//! ```
//! cargo run -p testdb-seed --bin seed
//! ```
//!
//! Connection parameters and row counts come from the environment; see
//! `SeedConfig::from_lookup` for the recognised variables.

use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use testdb_seed::config::SeedConfig;
use testdb_seed::db::Seeder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SeedConfig::from_env().context("Invalid configuration")?;

    let mut rng = match config.rng_seed {
        Some(seed) => {
            tracing::info!("Using RNG seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut seeder = Seeder::connect(&config).await?;

    seeder
        .create_tables()
        .await
        .context("Failed to create tables")?;

    let report = seeder
        .seed(&config.counts, &mut rng)
        .await
        .context("Failed to seed test data")?;

    // Summary output
    tracing::info!("Seed completed!");
    tracing::info!("  Users: {}", report.users);
    tracing::info!("  DNA samples: {}", report.dna_samples);
    tracing::info!("  Transactions: {}", report.transactions);
    tracing::info!("  Query logs: {}", report.query_logs);

    seeder.close().await.context("Failed to close connection")?;

    Ok(())
}
