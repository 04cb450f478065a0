//! Anchor pairing (two-hit seeding)
//!
//! Two seed occurrences on the same diagonal, or on diagonals within a
//! tolerance, are far more likely to belong to one real alignment than a
//! single short word match. Only such pairs are handed to the extender.

use serde::Serialize;

use super::matcher::SeedHit;
use super::{SeedError, SeedParams, SeedResult};
use crate::types::SeqPos;

/// One place where a word occurs in both the query and a database sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SeedOccurrence {
    pub query_pos: SeqPos,
    pub db_pos: SeqPos,
}

impl SeedOccurrence {
    pub fn new(query_pos: SeqPos, db_pos: SeqPos) -> Self {
        Self { query_pos, db_pos }
    }

    /// Database offset minus query offset
    pub fn diagonal(&self) -> i64 {
        self.db_pos as i64 - self.query_pos as i64
    }
}

/// Two non-overlapping seeds believed to belong to the same alignment.
///
/// `left` holds the smaller query and database offsets, `right` the larger,
/// whatever order the seeds were discovered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Anchor {
    left: SeedOccurrence,
    right: SeedOccurrence,
    word_length: usize,
}

impl Anchor {
    /// Build an anchor from two seed words and their positions.
    ///
    /// Fails when the words differ in length, when both seeds are the same
    /// occurrence, when their query and database orders disagree, or when
    /// the seeds overlap on either sequence.
    pub fn new(
        word1: &[u8],
        word2: &[u8],
        qindex1: SeqPos,
        dindex1: SeqPos,
        qindex2: SeqPos,
        dindex2: SeqPos,
    ) -> SeedResult<Self> {
        if word1.len() != word2.len() {
            return Err(SeedError::InvalidAnchor(format!(
                "seed words have different lengths ({} and {})",
                word1.len(),
                word2.len()
            )));
        }

        Self::from_occurrences(
            SeedOccurrence::new(qindex1, dindex1),
            SeedOccurrence::new(qindex2, dindex2),
            word1.len(),
        )
    }

    pub fn from_occurrences(
        first: SeedOccurrence,
        second: SeedOccurrence,
        word_length: usize,
    ) -> SeedResult<Self> {
        if word_length == 0 {
            return Err(SeedError::InvalidAnchor("empty seed word".to_string()));
        }
        if first == second {
            return Err(SeedError::InvalidAnchor(format!(
                "seed at query {} / database {} paired with itself",
                first.query_pos, first.db_pos
            )));
        }

        let same_order = (first.query_pos < second.query_pos && first.db_pos < second.db_pos)
            || (first.query_pos > second.query_pos && first.db_pos > second.db_pos);
        if !same_order {
            return Err(SeedError::InvalidAnchor(format!(
                "seeds cross: query {} -> {}, database {} -> {}",
                first.query_pos, second.query_pos, first.db_pos, second.db_pos
            )));
        }

        let left = SeedOccurrence::new(
            first.query_pos.min(second.query_pos),
            first.db_pos.min(second.db_pos),
        );
        let right = SeedOccurrence::new(
            first.query_pos.max(second.query_pos),
            first.db_pos.max(second.db_pos),
        );

        if right.query_pos - left.query_pos < word_length
            || right.db_pos - left.db_pos < word_length
        {
            return Err(SeedError::InvalidAnchor(format!(
                "seeds at query {}/{} and database {}/{} overlap",
                left.query_pos, right.query_pos, left.db_pos, right.db_pos
            )));
        }

        Ok(Self {
            left,
            right,
            word_length,
        })
    }

    pub fn left(&self) -> SeedOccurrence {
        self.left
    }

    pub fn right(&self) -> SeedOccurrence {
        self.right
    }

    pub fn word_length(&self) -> usize {
        self.word_length
    }

    /// Bases between the two seeds on the query
    pub fn query_interior(&self) -> usize {
        self.right.query_pos - self.left.query_pos - self.word_length
    }

    /// Bases between the two seeds on the database sequence
    pub fn db_interior(&self) -> usize {
        self.right.db_pos - self.left.db_pos - self.word_length
    }

    /// Database interior minus query interior; zero on a single diagonal
    pub fn diagonal_shift(&self) -> i64 {
        self.right.diagonal() - self.left.diagonal()
    }

    /// Left seed word, read from the query
    pub fn left_word<'a>(&self, query: &'a [u8]) -> &'a [u8] {
        &query[self.left.query_pos..self.left.query_pos + self.word_length]
    }

    /// Right seed word, read from the query
    pub fn right_word<'a>(&self, query: &'a [u8]) -> &'a [u8] {
        &query[self.right.query_pos..self.right.query_pos + self.word_length]
    }
}

/// Enumerate anchors for a single shared word.
pub fn pair_hit(hit: &SeedHit, params: &SeedParams) -> Vec<Anchor> {
    if exceeds_frequency(hit, params) {
        return Vec::new();
    }

    let mut occurrences = occurrences_of(hit);
    let mut anchors = pair_occurrences(&mut occurrences, hit.word.len(), params);
    anchors.sort_unstable();
    anchors.dedup();
    anchors
}

/// Enumerate anchors for every shared word of a query/database pair.
///
/// With `cross_word` set (the default), occurrences of different words are
/// pooled so that two different words on one diagonal can form an anchor.
/// Otherwise each word is paired on its own, which finds nothing in a region
/// that holds no repeated word.
pub fn pair_hits(hits: &[SeedHit], params: &SeedParams) -> Vec<Anchor> {
    let mut anchors = if params.cross_word {
        let mut pooled: Vec<SeedOccurrence> = hits
            .iter()
            .filter(|hit| hit.word.len() == params.word_length && !exceeds_frequency(hit, params))
            .flat_map(occurrences_of)
            .collect();
        pair_occurrences(&mut pooled, params.word_length, params)
    } else {
        hits.iter()
            .filter(|hit| !exceeds_frequency(hit, params))
            .flat_map(|hit| {
                let mut occurrences = occurrences_of(hit);
                pair_occurrences(&mut occurrences, hit.word.len(), params)
            })
            .collect()
    };

    anchors.sort_unstable();
    anchors.dedup();
    anchors
}

fn exceeds_frequency(hit: &SeedHit, params: &SeedParams) -> bool {
    match params.max_word_frequency {
        Some(max) if hit.occurrence_count() > max => {
            log::debug!(
                "Skipping high-frequency word {} ({} occurrences)",
                String::from_utf8_lossy(&hit.word),
                hit.occurrence_count()
            );
            true
        }
        _ => false,
    }
}

fn occurrences_of(hit: &SeedHit) -> Vec<SeedOccurrence> {
    hit.query_positions
        .iter()
        .flat_map(|&q| hit.db_positions.iter().map(move |&d| SeedOccurrence::new(q, d)))
        .collect()
}

fn pair_occurrences(
    occurrences: &mut Vec<SeedOccurrence>,
    word_length: usize,
    params: &SeedParams,
) -> Vec<Anchor> {
    occurrences.sort_unstable_by_key(|o| (o.diagonal(), o.query_pos));
    occurrences.dedup();

    let tolerance = params.diagonal_tolerance as i64;
    let mut anchors = Vec::new();

    for (i, &first) in occurrences.iter().enumerate() {
        for &second in &occurrences[i + 1..] {
            if second.diagonal() - first.diagonal() > tolerance {
                break;
            }
            if !within_distance(first, second, word_length, params.max_distance) {
                continue;
            }
            if let Ok(anchor) = Anchor::from_occurrences(first, second, word_length) {
                anchors.push(anchor);
            }
        }
    }

    anchors
}

fn within_distance(
    a: SeedOccurrence,
    b: SeedOccurrence,
    word_length: usize,
    max_distance: usize,
) -> bool {
    let query_sep = a.query_pos.abs_diff(b.query_pos);
    let db_sep = a.db_pos.abs_diff(b.db_pos);
    (word_length..=max_distance).contains(&query_sep)
        && (word_length..=max_distance).contains(&db_sep)
}
