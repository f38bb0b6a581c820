//! Configuration for schema bootstrap and seeding.
//!
//! Everything has a default matching the docker-compose test database. Any
//! value can be overridden from the environment with [`SeedConfig::from_env`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Number of rows to generate per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub users: usize,
    pub dna_samples: usize,
    pub transactions: usize,
    pub query_logs: usize,
}

impl Default for RecordCounts {
    fn default() -> Self {
        Self {
            users: 1000,
            dna_samples: 2000,
            transactions: 3000,
            query_logs: 5000,
        }
    }
}

/// PostgreSQL connection parameters.
#[derive(Clone, Serialize, Deserialize)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Full connection URL. Takes precedence over the discrete fields.
    #[serde(skip_serializing, default)]
    pub url: Option<String>,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            host: "postgres".to_string(),
            port: 5432,
            dbname: "testdb".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            url: None,
        }
    }
}

impl fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DbSettings {
    /// Human-readable target for log lines. Never includes credentials.
    pub fn display_target(&self) -> String {
        match &self.url {
            Some(_) => "DATABASE_URL".to_string(),
            None => format!("{}:{}/{}", self.host, self.port, self.dbname),
        }
    }
}

/// Fixed-delay bounded retry for connection acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of connection attempts, including the first.
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
    /// Upper bound on a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

/// Configuration for a bootstrap run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Rows to generate per table.
    pub counts: RecordCounts,

    /// Where to connect.
    pub database: DbSettings,

    /// How hard to try connecting.
    pub retry: RetryPolicy,

    /// Maximum rows per INSERT statement.
    pub batch_size: usize,

    /// Seed for reproducible data. `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            counts: RecordCounts::default(),
            database: DbSettings::default(),
            retry: RetryPolicy::default(),
            batch_size: 1000,
            rng_seed: None,
        }
    }
}

impl SeedConfig {
    /// Builds a configuration from the process environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup on top of the defaults.
    ///
    /// Recognised keys: `DATABASE_URL`, `PGHOST`, `PGPORT`, `PGDATABASE`,
    /// `PGUSER`, `PGPASSWORD`, `SEED_USERS`, `SEED_DNA_SAMPLES`,
    /// `SEED_TRANSACTIONS`, `SEED_QUERY_LOGS`, `SEED_BATCH_SIZE`,
    /// `SEED_RNG_SEED`, `SEED_CONNECT_ATTEMPTS`, `SEED_CONNECT_DELAY_SECS` and
    /// `SEED_CONNECT_TIMEOUT_SECS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let db = &mut config.database;
        db.url = lookup("DATABASE_URL").filter(|url| !url.is_empty());
        if let Some(host) = lookup("PGHOST") {
            db.host = host;
        }
        parse_into(&lookup, "PGPORT", &mut db.port)?;
        if let Some(dbname) = lookup("PGDATABASE") {
            db.dbname = dbname;
        }
        if let Some(user) = lookup("PGUSER") {
            db.user = user;
        }
        if let Some(password) = lookup("PGPASSWORD") {
            db.password = password;
        }

        let counts = &mut config.counts;
        parse_into(&lookup, "SEED_USERS", &mut counts.users)?;
        parse_into(&lookup, "SEED_DNA_SAMPLES", &mut counts.dna_samples)?;
        parse_into(&lookup, "SEED_TRANSACTIONS", &mut counts.transactions)?;
        parse_into(&lookup, "SEED_QUERY_LOGS", &mut counts.query_logs)?;

        parse_into(&lookup, "SEED_BATCH_SIZE", &mut config.batch_size)?;
        if config.batch_size == 0 {
            return Err(invalid("SEED_BATCH_SIZE", "0", "must be at least 1"));
        }

        if let Some(raw) = lookup("SEED_RNG_SEED") {
            let seed = raw
                .parse::<u64>()
                .map_err(|e| invalid("SEED_RNG_SEED", &raw, &e.to_string()))?;
            config.rng_seed = Some(seed);
        }

        parse_into(&lookup, "SEED_CONNECT_ATTEMPTS", &mut config.retry.max_attempts)?;
        if config.retry.max_attempts == 0 {
            return Err(invalid("SEED_CONNECT_ATTEMPTS", "0", "must be at least 1"));
        }

        let mut delay_secs = config.retry.delay.as_secs();
        parse_into(&lookup, "SEED_CONNECT_DELAY_SECS", &mut delay_secs)?;
        config.retry.delay = Duration::from_secs(delay_secs);

        let mut timeout_secs = config.retry.attempt_timeout.as_secs();
        parse_into(&lookup, "SEED_CONNECT_TIMEOUT_SECS", &mut timeout_secs)?;
        if timeout_secs == 0 {
            return Err(invalid("SEED_CONNECT_TIMEOUT_SECS", "0", "must be at least 1"));
        }
        config.retry.attempt_timeout = Duration::from_secs(timeout_secs);

        Ok(config)
    }
}

/// Overwrites `target` with the parsed value of `key`, if set.
fn parse_into<F, T>(lookup: &F, key: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &raw, &e.to_string()))?;
    }
    Ok(())
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
