//! Row generators for test data.
//!
//! This module provides generators for each seeded table:
//! - [`UserGenerator`]: Users with unique usernames and emails and a random role
//! - [`DnaSampleGenerator`]: Free-text DNA samples owned by existing users
//! - [`TransactionGenerator`]: Monetary transactions with 2-decimal amounts
//! - [`QueryLogGenerator`]: Query log entries with 3-decimal execution times
//!
//! Generators never touch the database. Dependent rows draw their owner from a
//! [`UserIds`] pool read back after the users are inserted.

pub mod dna_sample;
pub mod query_log;
pub mod transaction;
pub mod user;

use rand::Rng;

pub use dna_sample::{DnaSampleGenConfig, DnaSampleGenerator, GeneratedDnaSample};
pub use query_log::{GeneratedQueryLog, QueryLogGenConfig, QueryLogGenerator};
pub use transaction::{GeneratedTransaction, TransactionGenConfig, TransactionGenerator};
pub use user::{GeneratedUser, GenerationError, UserGenConfig, UserGenerator};

/// Non-empty set of user ids that dependent rows may reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIds(Vec<i32>);

impl UserIds {
    /// Wraps the ids, or returns `None` when there are none to pick from.
    pub fn new(ids: Vec<i32>) -> Option<Self> {
        if ids.is_empty() {
            None
        } else {
            Some(Self(ids))
        }
    }

    /// Picks an id uniformly at random.
    pub fn pick(&self, rng: &mut impl Rng) -> i32 {
        self.0[rng.gen_range(0..self.0.len())]
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}
