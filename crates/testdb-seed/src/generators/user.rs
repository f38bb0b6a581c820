//! User generation with unique usernames and emails.

use std::collections::HashSet;

use fake::Fake;
use fake::faker::internet::en::{SafeEmail, Username};
use rand::Rng;
use thiserror::Error;

use crate::models::Role;

/// Generated user data ready for database insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUser {
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error(
        "Generated only {generated} of {requested} unique users after {attempts} attempts"
    )]
    UniqueExhausted {
        requested: usize,
        generated: usize,
        attempts: usize,
    },
}

/// Configuration for user generation.
#[derive(Debug, Clone)]
pub struct UserGenConfig {
    /// Draw budget per requested user before giving up on uniqueness.
    pub max_attempts_per_user: usize,
    /// Longest username the `users.username` column accepts.
    pub max_username_len: usize,
    /// Longest email the `users.email` column accepts.
    pub max_email_len: usize,
}

impl Default for UserGenConfig {
    fn default() -> Self {
        Self {
            max_attempts_per_user: 100,
            max_username_len: 50,
            max_email_len: 100,
        }
    }
}

/// Generates users for seeding.
pub struct UserGenerator {
    config: UserGenConfig,
}

impl UserGenerator {
    /// Creates a new user generator with default configuration.
    pub fn new() -> Self {
        Self {
            config: UserGenConfig::default(),
        }
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(config: UserGenConfig) -> Self {
        Self { config }
    }

    /// Generates a single user. Uniqueness is not checked.
    pub fn generate(&self, rng: &mut impl Rng) -> GeneratedUser {
        let username: String = Username().fake_with_rng(rng);
        let email: String = SafeEmail().fake_with_rng(rng);

        GeneratedUser {
            username,
            email,
            role: Role::random(rng),
        }
    }

    /// Generates `count` users whose usernames and emails are pairwise distinct.
    ///
    /// Candidates are drawn until the target is met. A candidate is rejected
    /// when its username or email was already taken, or when either is longer
    /// than its column allows. After `count * max_attempts_per_user` draws the
    /// generator gives up with [`GenerationError::UniqueExhausted`].
    pub fn generate_batch(
        &self,
        count: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<GeneratedUser>, GenerationError> {
        let max_attempts = count.saturating_mul(self.config.max_attempts_per_user);

        let mut users = Vec::with_capacity(count);
        let mut usernames = HashSet::with_capacity(count);
        let mut emails = HashSet::with_capacity(count);
        let mut attempts = 0;

        while users.len() < count {
            if attempts >= max_attempts {
                return Err(GenerationError::UniqueExhausted {
                    requested: count,
                    generated: users.len(),
                    attempts,
                });
            }
            attempts += 1;

            let user = self.generate(rng);
            if !self.fits_columns(&user)
                || usernames.contains(&user.username)
                || emails.contains(&user.email)
            {
                continue;
            }

            usernames.insert(user.username.clone());
            emails.insert(user.email.clone());
            users.push(user);
        }

        Ok(users)
    }

    fn fits_columns(&self, user: &GeneratedUser) -> bool {
        user.username.chars().count() <= self.config.max_username_len
            && user.email.chars().count() <= self.config.max_email_len
    }
}

impl Default for UserGenerator {
    fn default() -> Self {
        Self::new()
    }
}
