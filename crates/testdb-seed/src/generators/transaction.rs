//! Transaction generation.

use rand::Rng;
use rand_distr::{Distribution, Uniform};
use rust_decimal::Decimal;

use super::UserIds;

/// Generated transaction ready for database insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTransaction {
    pub user_id: i32,
    /// Always carries exactly two decimal places.
    pub amount: Decimal,
}

/// Configuration for transaction generation.
#[derive(Debug, Clone)]
pub struct TransactionGenConfig {
    /// Smallest amount, in cents.
    pub min_amount_cents: i64,
    /// Largest amount, in cents (inclusive).
    pub max_amount_cents: i64,
}

impl Default for TransactionGenConfig {
    fn default() -> Self {
        Self {
            min_amount_cents: 10_00,
            max_amount_cents: 500_00,
        }
    }
}

/// Generates transactions owned by existing users.
pub struct TransactionGenerator {
    amount_cents: Uniform<i64>,
}

impl TransactionGenerator {
    pub fn new() -> Self {
        Self::with_config(TransactionGenConfig::default())
    }

    /// Creates a generator with custom configuration.
    ///
    /// Panics if `min_amount_cents > max_amount_cents`.
    pub fn with_config(config: TransactionGenConfig) -> Self {
        Self {
            amount_cents: Uniform::new_inclusive(config.min_amount_cents, config.max_amount_cents),
        }
    }

    /// Generates a single transaction for a random user.
    pub fn generate(&self, users: &UserIds, rng: &mut impl Rng) -> GeneratedTransaction {
        GeneratedTransaction {
            user_id: users.pick(rng),
            amount: Decimal::new(self.amount_cents.sample(rng), 2),
        }
    }

    /// Generates `count` transactions.
    pub fn generate_batch(
        &self,
        count: usize,
        users: &UserIds,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedTransaction> {
        (0..count).map(|_| self.generate(users, rng)).collect()
    }
}

impl Default for TransactionGenerator {
    fn default() -> Self {
        Self::new()
    }
}
