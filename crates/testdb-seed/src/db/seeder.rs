//! Database seeding utilities.

use std::fmt;

use rand::Rng;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};
use thiserror::Error;
use tracing::info;

use super::connect::{self, ConnectError};
use super::schema::{SCHEMA_SQL, truncate_sql};
use crate::config::{RecordCounts, SeedConfig};
use crate::generators::{
    DnaSampleGenerator, GeneratedDnaSample, GeneratedQueryLog, GeneratedTransaction,
    GeneratedUser, GenerationError, QueryLogGenerator, TransactionGenerator, UserGenerator,
    UserIds,
};
use crate::models::Table;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("Cannot seed {table}: no users to reference")]
    NoUsers { table: Table },
}

/// Row counts per seeded table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: u64,
    pub dna_samples: u64,
    pub transactions: u64,
    pub query_logs: u64,
}

impl SeedReport {
    fn set(&mut self, table: Table, rows: u64) {
        match table {
            Table::Users => self.users = rows,
            Table::DnaSamples => self.dna_samples = rows,
            Table::Transactions => self.transactions = rows,
            Table::QueryLogs => self.query_logs = rows,
        }
    }
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} users, {} DNA samples, {} transactions, {} logs",
            self.users, self.dna_samples, self.transactions, self.query_logs
        )
    }
}

/// Database seeder for the test schema.
///
/// Owns a single connection; every operation runs on it in sequence.
pub struct Seeder {
    conn: PgConnection,
    batch_size: usize,
}

impl Seeder {
    /// Creates a new seeder over an open connection.
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn,
            batch_size: 1000,
        }
    }

    /// Connects using `config`, retrying per its retry policy.
    pub async fn connect(config: &SeedConfig) -> Result<Self, ConnectError> {
        let conn = connect::connect(&config.database, &config.retry).await?;
        Ok(Self::new(conn).with_batch_size(config.batch_size))
    }

    /// Sets the maximum number of rows per INSERT statement.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Creates the tables if they don't exist yet.
    pub async fn create_tables(&mut self) -> Result<(), SeedError> {
        let mut tx = self.conn.begin().await?;
        sqlx::raw_sql(SCHEMA_SQL).execute(&mut *tx).await?;
        tx.commit().await?;

        info!("Tables created");
        Ok(())
    }

    /// Replaces the contents of every table with freshly generated rows.
    ///
    /// Runs in one transaction: the tables are truncated, users are inserted
    /// and read back, then dependent rows reference random inserted users.
    /// On any error nothing is committed. The report holds the rows the
    /// database acknowledged inserting.
    pub async fn seed(
        &mut self,
        counts: &RecordCounts,
        rng: &mut impl Rng,
    ) -> Result<SeedReport, SeedError> {
        if counts.users == 0 {
            if let Some(table) = first_dependent_with_rows(counts) {
                return Err(SeedError::NoUsers { table });
            }
        }

        let users = UserGenerator::new().generate_batch(counts.users, rng)?;

        let batch_size = self.batch_size;
        let mut report = SeedReport::default();
        let mut tx = self.conn.begin().await?;

        truncate_all(&mut tx).await?;
        report.users = insert_users(&mut tx, &users, batch_size).await?;

        let ids: Vec<i32> = sqlx::query_scalar("SELECT user_id FROM users ORDER BY user_id")
            .fetch_all(&mut *tx)
            .await?;

        if let Some(user_ids) = UserIds::new(ids) {
            let samples =
                DnaSampleGenerator::new().generate_batch(counts.dna_samples, &user_ids, rng);
            report.dna_samples = insert_dna_samples(&mut tx, &samples, batch_size).await?;

            let transactions =
                TransactionGenerator::new().generate_batch(counts.transactions, &user_ids, rng);
            report.transactions =
                insert_transactions(&mut tx, &transactions, batch_size).await?;

            let logs = QueryLogGenerator::new().generate_batch(counts.query_logs, &user_ids, rng);
            report.query_logs = insert_query_logs(&mut tx, &logs, batch_size).await?;
        }

        tx.commit().await?;

        info!("Test data seeded: {}", report);
        Ok(report)
    }

    /// Reads back the current row count of every table.
    pub async fn table_counts(&mut self) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();

        for table in Table::ALL {
            let count: i64 = sqlx::query_scalar(&format!("SELECT count(*) FROM {table}"))
                .fetch_one(&mut self.conn)
                .await?;
            // count(*) is never negative
            report.set(table, count as u64);
        }

        Ok(report)
    }

    /// Returns the underlying connection for advanced usage.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    /// Closes the connection, telling the server goodbye.
    pub async fn close(self) -> Result<(), SeedError> {
        self.conn.close().await?;
        Ok(())
    }
}

/// Seeds users in batches, returning the number of rows inserted.
async fn insert_users(
    conn: &mut PgConnection,
    users: &[GeneratedUser],
    batch_size: usize,
) -> Result<u64, SeedError> {
    info!("Seeding {} users...", users.len());

    let mut inserted = 0;
    for chunk in users.chunks(batch_size) {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO users (username, email, role) ");
        builder.push_values(chunk, |mut b, user| {
            b.push_bind(&user.username)
                .push_bind(&user.email)
                .push_bind(user.role.as_str());
        });
        inserted += builder.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(inserted)
}

/// Seeds DNA samples in batches.
async fn insert_dna_samples(
    conn: &mut PgConnection,
    samples: &[GeneratedDnaSample],
    batch_size: usize,
) -> Result<u64, SeedError> {
    info!("Seeding {} DNA samples...", samples.len());

    let mut inserted = 0;
    for chunk in samples.chunks(batch_size) {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO dna_samples (user_id, sequence) ");
        builder.push_values(chunk, |mut b, sample| {
            b.push_bind(sample.user_id).push_bind(&sample.sequence);
        });
        inserted += builder.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(inserted)
}

/// Seeds transactions in batches.
async fn insert_transactions(
    conn: &mut PgConnection,
    transactions: &[GeneratedTransaction],
    batch_size: usize,
) -> Result<u64, SeedError> {
    info!("Seeding {} transactions...", transactions.len());

    let mut inserted = 0;
    for chunk in transactions.chunks(batch_size) {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO transactions (user_id, amount) ");
        builder.push_values(chunk, |mut b, tx| {
            b.push_bind(tx.user_id).push_bind(tx.amount);
        });
        inserted += builder.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(inserted)
}

/// Seeds query logs in batches.
async fn insert_query_logs(
    conn: &mut PgConnection,
    logs: &[GeneratedQueryLog],
    batch_size: usize,
) -> Result<u64, SeedError> {
    info!("Seeding {} query logs...", logs.len());

    let mut inserted = 0;
    for chunk in logs.chunks(batch_size) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO query_logs (user_id, query_text, execution_time) ",
        );
        builder.push_values(chunk, |mut b, log| {
            b.push_bind(log.user_id)
                .push_bind(&log.query_text)
                .push_bind(log.execution_time);
        });
        inserted += builder.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(inserted)
}

/// Truncates every seeded table.
///
/// **WARNING**: This deletes all data from the tables.
async fn truncate_all(conn: &mut PgConnection) -> Result<(), SeedError> {
    info!("Truncating tables...");

    for table in Table::ALL {
        sqlx::query(&truncate_sql(table)).execute(&mut *conn).await?;
    }

    Ok(())
}

/// The first dependent table that is asked to hold rows, if any.
fn first_dependent_with_rows(counts: &RecordCounts) -> Option<Table> {
    [
        (Table::DnaSamples, counts.dna_samples),
        (Table::Transactions, counts.transactions),
        (Table::QueryLogs, counts.query_logs),
    ]
    .into_iter()
    .find(|&(_, rows)| rows > 0)
    .map(|(table, _)| table)
}
