//! Word indexing
//!
//! Splits a sequence into overlapping words of fixed length and records,
//! per distinct word, the ascending list of start positions.

use std::collections::HashMap;

use super::{SeedError, SeedResult};
use crate::types::{SeqPos, SequenceMap};

/// Word to start positions within one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordIndex {
    word_length: usize,
    words: HashMap<Vec<u8>, Vec<SeqPos>>,
}

/// Sequence name mapped to the word index built from it.
pub type IndexedSequenceMap = HashMap<String, WordIndex>;

impl WordIndex {
    /// Index every overlapping window of `word_length` bases.
    ///
    /// A zero word length is rejected. A sequence shorter than the word
    /// length produces an empty index.
    pub fn build(sequence: &[u8], word_length: usize) -> SeedResult<Self> {
        if word_length == 0 {
            return Err(SeedError::InvalidParams(
                "word length must be at least 1".to_string(),
            ));
        }

        let mut words: HashMap<Vec<u8>, Vec<SeqPos>> = HashMap::new();
        if sequence.len() >= word_length {
            for (pos, window) in sequence.windows(word_length).enumerate() {
                words.entry(window.to_vec()).or_default().push(pos);
            }
        }

        Ok(Self { word_length, words })
    }

    pub fn word_length(&self) -> usize {
        self.word_length
    }

    /// Start positions of `word`, ascending
    pub fn positions(&self, word: &[u8]) -> Option<&[SeqPos]> {
        self.words.get(word).map(Vec::as_slice)
    }

    pub fn contains(&self, word: &[u8]) -> bool {
        self.words.contains_key(word)
    }

    pub fn words(&self) -> impl Iterator<Item = &[u8]> {
        self.words.keys().map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[SeqPos])> {
        self.words.iter().map(|(w, p)| (w.as_slice(), p.as_slice()))
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of (word, position) entries
    pub fn total_positions(&self) -> usize {
        self.words.values().map(Vec::len).sum()
    }
}

/// Build one word index per named sequence.
pub fn index_sequences(
    sequences: &SequenceMap,
    word_length: usize,
) -> SeedResult<IndexedSequenceMap> {
    sequences
        .iter()
        .map(|(name, seq)| -> SeedResult<(String, WordIndex)> {
            Ok((name.clone(), WordIndex::build(seq.as_bytes(), word_length)?))
        })
        .collect()
}
