//! Test database bootstrap.
//!
//! This crate creates a fixed relational schema (users, DNA samples,
//! transactions, query logs) and fills it with synthetic rows for manual
//! verification and integration testing.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use testdb_seed::prelude::*;
//!
//! let config = SeedConfig::from_env()?;
//! let mut seeder = Seeder::connect(&config).await?;
//! seeder.create_tables().await?;
//! let report = seeder.seed(&config.counts, &mut rand::thread_rng()).await?;
//! ```

pub mod config;
pub mod db;
pub mod generators;
pub mod models;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{DbSettings, RecordCounts, RetryPolicy, SeedConfig};
    pub use crate::db::{ConnectError, SeedError, SeedReport, Seeder};
    pub use crate::generators::{
        DnaSampleGenerator, QueryLogGenerator, TransactionGenerator, UserGenerator, UserIds,
    };
    pub use crate::models::{Role, Table};
}
