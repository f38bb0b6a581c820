//! Database integration for schema bootstrap and seeding.
//!
//! [`connect`] opens a connection with bounded retry, and the [`Seeder`] creates
//! the tables and replaces their contents with generated rows.

pub mod connect;
pub mod schema;
mod seeder;

pub use connect::ConnectError;
pub use seeder::{SeedError, SeedReport, Seeder};
