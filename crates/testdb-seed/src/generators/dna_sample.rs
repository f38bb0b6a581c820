//! DNA sample generation.

use fake::Fake;
use fake::faker::lorem::en::Paragraph;
use rand::Rng;

use super::UserIds;

/// Generated DNA sample ready for database insertion.
///
/// `analysis_date` is left to the column default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDnaSample {
    pub user_id: i32,
    pub sequence: String,
}

/// Configuration for DNA sample generation.
#[derive(Debug, Clone)]
pub struct DnaSampleGenConfig {
    /// Upper bound on the length of the sequence text, in characters.
    pub max_sequence_chars: usize,
}

impl Default for DnaSampleGenConfig {
    fn default() -> Self {
        Self {
            max_sequence_chars: 100,
        }
    }
}

/// Generates DNA samples owned by existing users.
pub struct DnaSampleGenerator {
    config: DnaSampleGenConfig,
}

impl DnaSampleGenerator {
    pub fn new() -> Self {
        Self {
            config: DnaSampleGenConfig::default(),
        }
    }

    pub fn with_config(config: DnaSampleGenConfig) -> Self {
        Self { config }
    }

    /// Generates a single sample for a random user.
    pub fn generate(&self, users: &UserIds, rng: &mut impl Rng) -> GeneratedDnaSample {
        let user_id = users.pick(rng);
        let text: String = Paragraph(1..3).fake_with_rng(rng);

        GeneratedDnaSample {
            user_id,
            sequence: truncate_chars(&text, self.config.max_sequence_chars),
        }
    }

    /// Generates `count` samples.
    pub fn generate_batch(
        &self,
        count: usize,
        users: &UserIds,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedDnaSample> {
        (0..count).map(|_| self.generate(users, rng)).collect()
    }
}

impl Default for DnaSampleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Cuts `text` to at most `max` characters, dropping trailing whitespace.
fn truncate_chars(text: &str, max: usize) -> String {
    let truncated: String = text.chars().take(max).collect();
    truncated.trim_end().to_string()
}
