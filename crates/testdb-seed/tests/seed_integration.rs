//! Integration tests for schema creation and seeding.
//!
//! These tests verify end-to-end behaviour including:
//! - Row counts match the configured counts after every run
//! - Usernames and emails are unique, roles stay within the enumeration
//! - Dependent rows only reference inserted users
//! - Re-running the seed resets identities and keeps counts stable
//! - A failed insert rolls back the truncate as well
//! - Connection retries give up after the configured attempts
//!
//! To run the database tests, you need:
//! 1. A PostgreSQL database
//! 2. DATABASE_URL environment variable set
//!
//! Run with: `DATABASE_URL=postgres://... cargo nextest run -p testdb-seed`
//!
//! Note: These tests TRUNCATE the seeded tables. Do not point them at a
//! database whose contents you want to keep.

use std::collections::HashSet;
use std::env;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use serial_test::serial;
use sqlx::{Connection, PgConnection};
use testdb_seed::config::{DbSettings, RecordCounts, RetryPolicy};
use testdb_seed::db::connect::connect;
use testdb_seed::db::{ConnectError, SeedError, SeedReport, Seeder};
use testdb_seed::models::{Role, Table};

/// Get a database connection, skipping tests if DATABASE_URL is not set.
async fn get_test_connection() -> Option<PgConnection> {
    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    match PgConnection::connect(&database_url).await {
        Ok(conn) => Some(conn),
        Err(e) => {
            eprintln!("Skipping test: Failed to connect to database: {e}");
            None
        }
    }
}

/// Connects and makes sure the tables exist. A small batch size forces
/// multi-statement inserts.
async fn setup() -> Option<Seeder> {
    let conn = get_test_connection().await?;
    let mut seeder = Seeder::new(conn).with_batch_size(7);
    seeder
        .create_tables()
        .await
        .expect("Failed to create tables");
    // Left behind if the rollback test panicked midway
    sqlx::query(&format!(
        "ALTER TABLE query_logs DROP CONSTRAINT IF EXISTS {REJECT_LOGS}"
    ))
    .execute(seeder.connection())
    .await
    .expect("Failed to drop leftover constraint");
    Some(seeder)
}

const REJECT_LOGS: &str = "reject_all_query_logs";

fn small_counts() -> RecordCounts {
    RecordCounts {
        users: 25,
        dna_samples: 40,
        transactions: 30,
        query_logs: 50,
    }
}

fn expected(counts: RecordCounts) -> SeedReport {
    SeedReport {
        users: counts.users as u64,
        dna_samples: counts.dna_samples as u64,
        transactions: counts.transactions as u64,
        query_logs: counts.query_logs as u64,
    }
}

async fn scalar_i64(conn: &mut PgConnection, sql: &str) -> i64 {
    sqlx::query_scalar(sql)
        .fetch_one(conn)
        .await
        .unwrap_or_else(|e| panic!("query failed: {sql}: {e}"))
}

#[tokio::test]
#[serial]
async fn test_create_tables_is_idempotent() {
    let Some(mut seeder) = setup().await else {
        return;
    };

    seeder
        .create_tables()
        .await
        .expect("Second create_tables should succeed");

    for table in Table::ALL {
        let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(table.as_str())
            .fetch_one(seeder.connection())
            .await
            .unwrap();
        assert!(exists, "{table} should exist");
    }
}

#[tokio::test]
#[serial]
async fn test_seed_populates_configured_counts() {
    let Some(mut seeder) = setup().await else {
        return;
    };
    let counts = small_counts();
    let mut rng = StdRng::seed_from_u64(12345);

    let report = seeder.seed(&counts, &mut rng).await.unwrap();

    assert_eq!(report, expected(counts));
    // The report is what the database acknowledged, so it matches a read-back
    assert_eq!(seeder.table_counts().await.unwrap(), report);
}

#[tokio::test]
#[serial]
async fn test_seed_twice_resets_state() {
    let Some(mut seeder) = setup().await else {
        return;
    };
    let counts = small_counts();
    let mut rng = rand::thread_rng();

    seeder.seed(&counts, &mut rng).await.unwrap();
    let first = seeder.table_counts().await.unwrap();

    seeder.seed(&counts, &mut rng).await.unwrap();
    let second = seeder.table_counts().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second, expected(counts));

    // Identities restart with every run
    let conn = seeder.connection();
    assert_eq!(scalar_i64(conn, "SELECT min(user_id)::int8 FROM users").await, 1);
    assert_eq!(
        scalar_i64(conn, "SELECT max(user_id)::int8 FROM users").await,
        counts.users as i64
    );
    assert_eq!(
        scalar_i64(conn, "SELECT min(log_id)::int8 FROM query_logs").await,
        1
    );
}

#[tokio::test]
#[serial]
async fn test_usernames_and_emails_are_unique() {
    let Some(mut seeder) = setup().await else {
        return;
    };
    let counts = small_counts();

    seeder
        .seed(&counts, &mut StdRng::seed_from_u64(7))
        .await
        .unwrap();

    let conn = seeder.connection();
    assert_eq!(
        scalar_i64(conn, "SELECT count(DISTINCT username) FROM users").await,
        counts.users as i64
    );
    assert_eq!(
        scalar_i64(conn, "SELECT count(DISTINCT email) FROM users").await,
        counts.users as i64
    );
}

#[tokio::test]
#[serial]
async fn test_dependent_rows_reference_inserted_users() {
    let Some(mut seeder) = setup().await else {
        return;
    };

    seeder
        .seed(&small_counts(), &mut StdRng::seed_from_u64(99))
        .await
        .unwrap();

    for table in [Table::DnaSamples, Table::Transactions, Table::QueryLogs] {
        let orphans = scalar_i64(
            seeder.connection(),
            &format!(
                "SELECT count(*) FROM {table} t \
                 LEFT JOIN users u ON u.user_id = t.user_id \
                 WHERE u.user_id IS NULL"
            ),
        )
        .await;
        assert_eq!(orphans, 0, "{table} has rows without a user");
    }
}

#[tokio::test]
#[serial]
async fn test_three_user_example() {
    let Some(mut seeder) = setup().await else {
        return;
    };
    let counts = RecordCounts {
        users: 3,
        dna_samples: 2,
        transactions: 2,
        query_logs: 2,
    };

    seeder
        .seed(&counts, &mut StdRng::seed_from_u64(3))
        .await
        .unwrap();

    let rows: Vec<(String, Option<String>)> =
        sqlx::query_as("SELECT username, role FROM users ORDER BY user_id")
            .fetch_all(seeder.connection())
            .await
            .unwrap();

    assert_eq!(rows.len(), 3);
    let usernames: HashSet<&str> = rows.iter().map(|(u, _)| u.as_str()).collect();
    assert_eq!(usernames.len(), 3);
    for (_, role) in &rows {
        let role = role.as_deref().expect("role should be set");
        assert!(role.parse::<Role>().is_ok(), "unexpected role {role}");
    }
}

#[tokio::test]
#[serial]
async fn test_generated_values_fit_their_columns() {
    let Some(mut seeder) = setup().await else {
        return;
    };

    seeder
        .seed(&small_counts(), &mut StdRng::seed_from_u64(21))
        .await
        .unwrap();
    let conn = seeder.connection();

    let (min_amount, max_amount): (Option<Decimal>, Option<Decimal>) =
        sqlx::query_as("SELECT min(amount), max(amount) FROM transactions")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
    assert!(min_amount.unwrap() >= Decimal::new(10, 0));
    assert!(max_amount.unwrap() <= Decimal::new(500, 0));

    let (min_time, max_time): (Option<Decimal>, Option<Decimal>) =
        sqlx::query_as("SELECT min(execution_time), max(execution_time) FROM query_logs")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
    assert!(min_time.unwrap() >= Decimal::new(5, 0));
    assert!(max_time.unwrap() <= Decimal::new(100, 0));

    let dated_today: Option<bool> =
        sqlx::query_scalar("SELECT bool_and(analysis_date = CURRENT_DATE) FROM dna_samples")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
    assert_eq!(dated_today, Some(true));

    assert_eq!(
        scalar_i64(
            conn,
            "SELECT count(*) FROM users WHERE created_at IS NULL",
        )
        .await,
        0
    );
}

#[tokio::test]
#[serial]
async fn test_dependents_without_users_write_nothing() {
    let Some(mut seeder) = setup().await else {
        return;
    };
    let mut rng = StdRng::seed_from_u64(1);

    seeder.seed(&small_counts(), &mut rng).await.unwrap();
    let before = seeder.table_counts().await.unwrap();

    let counts = RecordCounts {
        users: 0,
        dna_samples: 0,
        transactions: 5,
        query_logs: 0,
    };
    let err = seeder.seed(&counts, &mut rng).await.unwrap_err();

    assert!(matches!(
        err,
        SeedError::NoUsers {
            table: Table::Transactions
        }
    ));
    assert_eq!(seeder.table_counts().await.unwrap(), before);
}

#[tokio::test]
#[serial]
async fn test_failed_insert_rolls_back_truncate() {
    let Some(mut seeder) = setup().await else {
        return;
    };
    let counts = RecordCounts {
        users: 10,
        dna_samples: 5,
        transactions: 5,
        query_logs: 5,
    };
    let mut rng = StdRng::seed_from_u64(5);

    seeder.seed(&counts, &mut rng).await.unwrap();
    let before = seeder.table_counts().await.unwrap();
    assert_eq!(before, expected(counts));

    // NOT VALID leaves existing rows alone but rejects every new query log,
    // so the next run fails on its last insert, after the truncate.
    sqlx::query(&format!(
        "ALTER TABLE query_logs ADD CONSTRAINT {REJECT_LOGS} \
         CHECK (execution_time < 0) NOT VALID"
    ))
    .execute(seeder.connection())
    .await
    .unwrap();

    let result = seeder.seed(&counts, &mut rng).await;

    sqlx::query(&format!(
        "ALTER TABLE query_logs DROP CONSTRAINT {REJECT_LOGS}"
    ))
    .execute(seeder.connection())
    .await
    .unwrap();

    assert!(
        matches!(result, Err(SeedError::Database(_))),
        "expected a database error, got {result:?}"
    );
    assert_eq!(seeder.table_counts().await.unwrap(), before);
}

#[tokio::test]
async fn test_connect_gives_up_after_max_attempts() {
    // Nothing listens on port 1.
    let settings = DbSettings {
        host: "127.0.0.1".to_string(),
        port: 1,
        ..Default::default()
    };
    let policy = RetryPolicy {
        max_attempts: 2,
        delay: Duration::ZERO,
        attempt_timeout: Duration::from_secs(1),
    };

    let err = connect(&settings, &policy).await.unwrap_err();

    assert!(
        matches!(err, ConnectError::Exhausted { attempts: 2, .. }),
        "unexpected error: {err}"
    );
}
