//! Seed matching between a query index and a database index

use super::index::WordIndex;
use crate::types::SeqPos;

/// A word shared by the query and a database sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedHit {
    pub word: Vec<u8>,
    pub query_positions: Vec<SeqPos>,
    pub db_positions: Vec<SeqPos>,
}

impl SeedHit {
    /// Number of (query, database) occurrence combinations
    pub fn occurrence_count(&self) -> usize {
        self.query_positions.len() * self.db_positions.len()
    }
}

/// Intersect two word indices.
///
/// Only words present in both indices are returned, sorted by word. Indices
/// built with different word lengths share no words.
pub fn match_indices(query_index: &WordIndex, db_index: &WordIndex) -> Vec<SeedHit> {
    if query_index.word_length() != db_index.word_length() {
        return Vec::new();
    }

    // Probe from the smaller side
    let (scan, other, scan_is_query) = if query_index.len() <= db_index.len() {
        (query_index, db_index, true)
    } else {
        (db_index, query_index, false)
    };

    let mut hits: Vec<SeedHit> = scan
        .iter()
        .filter_map(|(word, scan_positions)| {
            let other_positions = other.positions(word)?;
            let (query_positions, db_positions) = if scan_is_query {
                (scan_positions, other_positions)
            } else {
                (other_positions, scan_positions)
            };
            Some(SeedHit {
                word: word.to_vec(),
                query_positions: query_positions.to_vec(),
                db_positions: db_positions.to_vec(),
            })
        })
        .collect();

    hits.sort_by(|a, b| a.word.cmp(&b.word));
    hits
}
