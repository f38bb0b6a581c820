//! Connection acquisition with fixed-delay bounded retry.

use std::future::Future;
use std::io;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{DbSettings, RetryPolicy};

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Invalid connection settings: {0}")]
    Configuration(#[source] sqlx::Error),

    #[error("Unable to connect to database after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
}

/// Translates [`DbSettings`] into sqlx connect options.
pub fn connect_options(settings: &DbSettings) -> Result<PgConnectOptions, ConnectError> {
    match &settings.url {
        Some(url) => PgConnectOptions::from_str(url).map_err(ConnectError::Configuration),
        None => Ok(PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.dbname)
            .username(&settings.user)
            .password(&settings.password)),
    }
}

/// Opens a connection, retrying per `policy`.
pub async fn connect(
    settings: &DbSettings,
    policy: &RetryPolicy,
) -> Result<PgConnection, ConnectError> {
    let options = connect_options(settings)?;

    info!("Connecting to database at {}", settings.display_target());

    let conn = with_retries(policy, || connect_once(&options, policy.attempt_timeout)).await?;

    info!("Connected to database");
    Ok(conn)
}

/// Makes a single connection attempt, giving up after `timeout`.
async fn connect_once(
    options: &PgConnectOptions,
    timeout: Duration,
) -> Result<PgConnection, sqlx::Error> {
    match tokio::time::timeout(timeout, PgConnection::connect_with(options)).await {
        Ok(result) => result,
        Err(_) => Err(sqlx::Error::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("connection attempt timed out after {timeout:?}"),
        ))),
    }
}

/// Runs `connect` until it succeeds or `policy.max_attempts` attempts have failed,
/// sleeping `policy.delay` between attempts.
///
/// Configuration errors are returned immediately; retrying cannot fix them.
pub async fn with_retries<T, F, Fut>(policy: &RetryPolicy, mut connect: F) -> Result<T, ConnectError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match connect().await {
            Ok(conn) => {
                if attempt > 1 {
                    info!("Connected after {} attempts", attempt);
                }
                return Ok(conn);
            }
            Err(e @ sqlx::Error::Configuration(_)) => {
                return Err(ConnectError::Configuration(e));
            }
            Err(e) if attempt >= max_attempts => {
                return Err(ConnectError::Exhausted {
                    attempts: attempt,
                    source: e,
                });
            }
            Err(e) => {
                warn!(
                    "Connection failed (attempt {}/{}): {}. Retrying in {:?}...",
                    attempt, max_attempts, e, policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
