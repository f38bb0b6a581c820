//! DDL for the seeded tables.

use crate::models::Table;

/// Creates every table if it does not exist yet. Safe to run repeatedly.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Empties `table`, restarts its identity sequence and cascades to dependents.
pub fn truncate_sql(table: Table) -> String {
    format!("TRUNCATE TABLE {table} RESTART IDENTITY CASCADE")
}
