//! Seeding stage of the search pipeline
//!
//! Word indexing of sequences, seed matching between a query index and a
//! database index, and pairing of same-diagonal seed occurrences into
//! anchors that the extender grows into local alignments.

pub mod index;
pub mod matcher;
pub mod pairs;

#[cfg(test)]
pub mod tests;

pub use index::{index_sequences, IndexedSequenceMap, WordIndex};
pub use matcher::{match_indices, SeedHit};
pub use pairs::{pair_hit, pair_hits, Anchor, SeedOccurrence};

/// Parameters for the seeding stage
#[derive(Debug, Clone)]
pub struct SeedParams {
    /// Word (k-mer) length used as index key
    pub word_length: usize,
    /// Maximum separation between the two seeds of an anchor, on either sequence
    pub max_distance: usize,
    /// Maximum difference between the diagonals of the two seeds
    pub diagonal_tolerance: usize,
    /// Pool occurrences of all shared words before pairing; when unset only
    /// two occurrences of the same word can form an anchor
    pub cross_word: bool,
    /// Skip words with more occurrence pairs than this
    pub max_word_frequency: Option<usize>,
}

impl Default for SeedParams {
    fn default() -> Self {
        Self {
            word_length: 11,
            max_distance: 64,
            diagonal_tolerance: 0,
            cross_word: true,
            max_word_frequency: Some(1000),
        }
    }
}

impl SeedParams {
    pub fn validate(&self) -> SeedResult<()> {
        if self.word_length == 0 {
            return Err(SeedError::InvalidParams(
                "word length must be at least 1".to_string(),
            ));
        }
        if self.max_distance < self.word_length {
            return Err(SeedError::InvalidParams(format!(
                "max distance {} is shorter than the word length {}",
                self.max_distance, self.word_length
            )));
        }
        Ok(())
    }
}

/// Result type for seeding operations
pub type SeedResult<T> = Result<T, SeedError>;

/// Errors that can occur during seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid anchor: {0}")]
    InvalidAnchor(String),
}
