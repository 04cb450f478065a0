use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Zero-based offset into a sequence.
pub type SeqPos = usize;

/// Symbol inserted into an aligned string opposite an unmatched base.
pub const GAP: u8 = b'-';

/// A named nucleotide sequence, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub data: Vec<u8>,
}

impl Sequence {
    pub fn new<S: Into<String>>(name: S, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Build from text, upper-casing bases so word keys compare exactly
    pub fn from_text<S: Into<String>>(name: S, text: &str) -> Self {
        Self::new(name, text.trim().as_bytes().to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Sequence name mapped to its sequence.
pub type SequenceMap = HashMap<String, Sequence>;

/// Names of a sequence map in sorted order, for reproducible iteration.
pub fn sorted_names(sequences: &SequenceMap) -> Vec<&str> {
    let mut names: Vec<&str> = sequences.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

/// Check if a nucleotide is valid (A, C, G, T)
pub fn is_valid_nucleotide(nucleotide: u8) -> bool {
    matches!(nucleotide.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T')
}
