//! Query log generation.

use fake::Fake;
use fake::faker::lorem::en::Sentence;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use rust_decimal::Decimal;

use super::UserIds;

/// Generated query log entry ready for database insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQueryLog {
    pub user_id: i32,
    pub query_text: String,
    /// Seconds, always with exactly three decimal places.
    pub execution_time: Decimal,
}

/// Configuration for query log generation.
#[derive(Debug, Clone)]
pub struct QueryLogGenConfig {
    /// Fastest execution time, in milliseconds.
    pub min_execution_ms: i64,
    /// Slowest execution time, in milliseconds (inclusive).
    pub max_execution_ms: i64,
    /// Word count range for the query text.
    pub words: std::ops::Range<usize>,
}

impl Default for QueryLogGenConfig {
    fn default() -> Self {
        Self {
            min_execution_ms: 5_000,
            max_execution_ms: 100_000,
            words: 4..10,
        }
    }
}

/// Generates query log entries owned by existing users.
pub struct QueryLogGenerator {
    execution_ms: Uniform<i64>,
    words: std::ops::Range<usize>,
}

impl QueryLogGenerator {
    pub fn new() -> Self {
        Self::with_config(QueryLogGenConfig::default())
    }

    /// Creates a generator with custom configuration.
    ///
    /// Panics if `min_execution_ms > max_execution_ms`.
    pub fn with_config(config: QueryLogGenConfig) -> Self {
        Self {
            execution_ms: Uniform::new_inclusive(config.min_execution_ms, config.max_execution_ms),
            words: config.words,
        }
    }

    /// Generates a single log entry for a random user.
    pub fn generate(&self, users: &UserIds, rng: &mut impl Rng) -> GeneratedQueryLog {
        let user_id = users.pick(rng);
        let query_text: String = Sentence(self.words.clone()).fake_with_rng(rng);

        GeneratedQueryLog {
            user_id,
            query_text,
            execution_time: Decimal::new(self.execution_ms.sample(rng), 3),
        }
    }

    /// Generates `count` log entries.
    pub fn generate_batch(
        &self,
        count: usize,
        users: &UserIds,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedQueryLog> {
        (0..count).map(|_| self.generate(users, rng)).collect()
    }
}

impl Default for QueryLogGenerator {
    fn default() -> Self {
        Self::new()
    }
}
