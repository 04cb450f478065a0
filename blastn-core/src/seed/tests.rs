//! Scenario tests for the seeding stage with small example sequences

use super::*;
use crate::extend::{ExtendParams, Extended, Extender, GapSide};
use crate::smith_waterman::{ScoringParams, SmithWaterman};
use crate::types::GAP;

/// Test sequences for scenario testing
pub struct TestSequences;

impl TestSequences {
    /// A 40 bp sequence without repeated 8-mers
    pub const UNIQUE: &'static [u8] = b"GATTACAGGCATTCCGTAGCTTAGCACGTTGACCAAGTCG";

    /// Query and database sharing ACGT twice on diagonal 2
    pub fn shared_repeat() -> (&'static [u8], &'static [u8]) {
        (b"ACGTACGT", b"TTACGTACGTTT")
    }

    /// Identical sequences
    pub fn identical() -> (Vec<u8>, Vec<u8>) {
        (Self::UNIQUE.to_vec(), Self::UNIQUE.to_vec())
    }

    /// Sequences with a single substitution at position 20
    pub fn single_mutation() -> (Vec<u8>, Vec<u8>) {
        let query = Self::UNIQUE.to_vec();
        let mut target = query.clone();
        target[20] = b'A';
        (query, target)
    }

    /// Database carries two extra bases after position 20
    pub fn insertion() -> (Vec<u8>, Vec<u8>) {
        let query = Self::UNIQUE.to_vec();
        let mut target = query[..20].to_vec();
        target.extend_from_slice(b"GG");
        target.extend_from_slice(&query[20..]);
        (query, target)
    }

    /// Database lacks the two bases at positions 20 and 21
    pub fn deletion() -> (Vec<u8>, Vec<u8>) {
        let query = Self::UNIQUE.to_vec();
        let mut target = query[..20].to_vec();
        target.extend_from_slice(&query[22..]);
        (query, target)
    }

    /// Sequences with an ambiguous base in the query
    pub fn ambiguous_nucleotides() -> (Vec<u8>, Vec<u8>) {
        let target = Self::UNIQUE.to_vec();
        let mut query = target.clone();
        query[10] = b'N';
        (query, target)
    }
}

fn params(word_length: usize) -> SeedParams {
    SeedParams {
        word_length,
        max_distance: 64,
        diagonal_tolerance: 0,
        cross_word: true,
        max_word_frequency: None,
    }
}

fn anchors_for(query: &[u8], target: &[u8], params: &SeedParams) -> Vec<Anchor> {
    let query_index = WordIndex::build(query, params.word_length).unwrap();
    let target_index = WordIndex::build(target, params.word_length).unwrap();
    pair_hits(&match_indices(&query_index, &target_index), params)
}

fn extender(min_score: i32) -> Extender {
    Extender::new(
        ScoringParams::default(),
        ExtendParams {
            min_score,
            ..Default::default()
        },
    )
}

#[cfg(test)]
mod seeding_tests {
    use super::*;

    #[test]
    fn test_index_entry_count_and_content() {
        let seq = TestSequences::UNIQUE;
        for k in [1, 4, 8, seq.len()] {
            let index = WordIndex::build(seq, k).unwrap();
            assert_eq!(index.total_positions(), seq.len() - k + 1, "k = {}", k);
            for (word, positions) in index.iter() {
                for &pos in positions {
                    assert_eq!(&seq[pos..pos + k], word);
                }
            }
        }
    }

    #[test]
    fn test_index_is_deterministic() {
        let first = WordIndex::build(TestSequences::UNIQUE, 8).unwrap();
        let second = WordIndex::build(TestSequences::UNIQUE, 8).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_matched_words_exist_in_both_indices() {
        let (query, target) = TestSequences::single_mutation();
        let query_index = WordIndex::build(&query, 6).unwrap();
        let target_index = WordIndex::build(&target, 6).unwrap();

        let hits = match_indices(&query_index, &target_index);
        assert!(!hits.is_empty());
        for hit in &hits {
            assert!(query_index.contains(&hit.word));
            assert!(target_index.contains(&hit.word));
        }

        // Words spanning the substitution are missing from the target
        let spanning = &query[18..24];
        assert!(hits.iter().all(|hit| hit.word != spanning));
    }

    #[test]
    fn test_shared_repeat_pairs_into_one_anchor() {
        let (query, target) = TestSequences::shared_repeat();
        let anchors = anchors_for(query, target, &params(4));

        assert_eq!(anchors.len(), 1);
        let anchor = anchors[0];
        assert_eq!(anchor.left(), SeedOccurrence::new(0, 2));
        assert_eq!(anchor.right(), SeedOccurrence::new(4, 6));
        assert_eq!(anchor.left().diagonal(), 2);
        assert_eq!(anchor.right().diagonal(), 2);
        assert_eq!(anchor.left_word(query), b"ACGT");
    }

    #[test]
    fn test_anchors_are_well_formed() {
        let (query, target) = TestSequences::insertion();
        let tolerant = SeedParams {
            diagonal_tolerance: 2,
            ..params(8)
        };

        let anchors = anchors_for(&query, &target, &tolerant);
        assert!(!anchors.is_empty());
        for anchor in &anchors {
            let (left, right) = (anchor.left(), anchor.right());
            assert!(right.query_pos - left.query_pos >= anchor.word_length());
            assert!(right.db_pos - left.db_pos >= anchor.word_length());
            assert!(anchor.diagonal_shift().abs() <= 2);
            assert!(right.query_pos + anchor.word_length() <= query.len());
            assert!(right.db_pos + anchor.word_length() <= target.len());
        }
    }

    #[test]
    fn test_unrepeated_region_needs_pooled_words() {
        let (query, target) = TestSequences::identical();
        let per_word = SeedParams {
            cross_word: false,
            ..params(8)
        };

        assert!(anchors_for(&query, &target, &per_word).is_empty());
        // Any two of the 33 shared words at least one word apart
        let anchors = anchors_for(&query, &target, &params(8));
        assert_eq!(anchors.len(), 325);
        assert!(anchors.iter().all(|anchor| anchor.diagonal_shift() == 0));
    }

    #[test]
    fn test_pairing_is_deterministic() {
        let (query, target) = TestSequences::identical();
        let first = anchors_for(&query, &target, &params(8));
        let second = anchors_for(&query, &target, &params(8));
        assert_eq!(first, second);
    }

    #[test]
    fn test_ambiguous_bases_break_words() {
        let (query, target) = TestSequences::ambiguous_nucleotides();
        let query_index = WordIndex::build(&query, 8).unwrap();
        let target_index = WordIndex::build(&target, 8).unwrap();

        let hits = match_indices(&query_index, &target_index);
        assert!(hits.iter().all(|hit| !hit.word.contains(&b'N')));
        // 33 query words, of which the 8 covering position 10 hold the N
        assert_eq!(hits.len(), 33 - 8);
    }
}

/// Seeding followed by extension
#[cfg(test)]
mod extension_scenarios {
    use super::*;

    #[test]
    fn test_shared_repeat_extends_to_score_16() {
        let (query, target) = TestSequences::shared_repeat();
        let anchors = anchors_for(query, target, &params(4));

        let extension = extender(8)
            .extend(&anchors[0], query, target)
            .into_extension()
            .expect("anchor should be accepted");
        assert_eq!(extension.query_str(), "ACGTACGT");
        assert_eq!(extension.db_str(), "ACGTACGT");
        assert_eq!(extension.score, 16);
    }

    #[test]
    fn test_shared_repeat_rejected_at_min_score_100() {
        let (query, target) = TestSequences::shared_repeat();
        let anchors = anchors_for(query, target, &params(4));
        assert_eq!(extender(100).extend(&anchors[0], query, target), Extended::Invalid);
    }

    #[test]
    fn test_same_diagonal_anchor_needs_no_gaps() {
        let (query, target) = TestSequences::single_mutation();
        let anchors = anchors_for(&query, &target, &params(8));
        assert!(!anchors.is_empty());

        for anchor in &anchors {
            assert_eq!(anchor.diagonal_shift(), 0);
            let extension = extender(16)
                .extend(anchor, &query, &target)
                .into_extension()
                .expect("diagonal anchor should be accepted");
            assert_eq!(extension.gap, None);
            assert!(!extension.query_aligned.contains(&GAP));
            assert!(!extension.db_aligned.contains(&GAP));
            // 39 matches, one mismatch
            assert_eq!(extension.score, 39 * 2 - 1);
        }
    }

    #[test]
    fn test_longer_database_spacing_gaps_the_query() {
        let (query, target) = TestSequences::insertion();
        let tolerant = SeedParams {
            diagonal_tolerance: 2,
            ..params(8)
        };

        let shifted: Vec<Anchor> = anchors_for(&query, &target, &tolerant)
            .into_iter()
            .filter(|anchor| anchor.diagonal_shift() == 2)
            .collect();
        assert!(!shifted.is_empty());

        for anchor in &shifted {
            let extension = extender(16)
                .extend(anchor, &query, &target)
                .into_extension()
                .expect("shifted anchor should be accepted");
            let gap = extension.gap.expect("spacing differs, gaps expected");
            assert_eq!(gap.side, GapSide::Query);
            assert_eq!(gap.length, 2);
            assert_eq!(extension.query_aligned.iter().filter(|&&b| b == GAP).count(), 2);
            assert!(!extension.db_aligned.contains(&GAP));

            let ungapped: Vec<u8> = extension
                .query_aligned
                .iter()
                .copied()
                .filter(|&b| b != GAP)
                .collect();
            assert_eq!(ungapped, &query[extension.query_range.clone()]);
            assert_eq!(extension.db_aligned, &target[extension.db_range.clone()]);
        }
    }

    #[test]
    fn test_longer_query_spacing_gaps_the_database() {
        let (query, target) = TestSequences::deletion();
        let tolerant = SeedParams {
            diagonal_tolerance: 2,
            ..params(8)
        };

        let shifted: Vec<Anchor> = anchors_for(&query, &target, &tolerant)
            .into_iter()
            .filter(|anchor| anchor.diagonal_shift() == -2)
            .collect();
        assert!(!shifted.is_empty());

        for anchor in &shifted {
            let extension = extender(16)
                .extend(anchor, &query, &target)
                .into_extension()
                .expect("shifted anchor should be accepted");
            assert_eq!(extension.gap.map(|g| (g.side, g.length)), Some((GapSide::Database, 2)));
            assert_eq!(extension.query_aligned, &query[extension.query_range.clone()]);
        }
    }

    #[test]
    fn test_guarded_extensions_meet_min_score() {
        let (query, target) = TestSequences::single_mutation();
        let scorer = SmithWaterman::default();
        let min_score = 60;

        for anchor in anchors_for(&query, &target, &params(4)) {
            if let Extended::Valid(extension) = extender(min_score).extend(&anchor, &query, &target) {
                assert!(extension.score >= min_score);
                assert_eq!(
                    extension.score,
                    scorer.score(&extension.query_aligned, &extension.db_aligned)
                );
            }
        }
    }

    #[test]
    fn test_self_score_is_twice_length() {
        let scorer = SmithWaterman::default();
        let seq = TestSequences::UNIQUE;
        assert_eq!(scorer.score(seq, seq), 2 * seq.len() as i32);
    }
}
