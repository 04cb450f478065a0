//! Alignment extension
//!
//! Grows an anchor into a candidate local alignment in four phases: the
//! left seed, a walk to the left, a bridge across the anchor interior
//! (padding the shorter side with gaps) and a walk to the right. The walks
//! check the running Smith-Waterman score and abandon the anchor as soon as
//! it falls below the minimum.
//!
//! ```text
//! query  TACGTTT--CATGA
//! data   TACGTTTGGCATGA
//!         ^^^^    ^^^^   seeds
//! ```

use std::borrow::Cow;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::seed::Anchor;
use crate::smith_waterman::{ScoringParams, SmithWaterman};
use crate::types::GAP;

/// Parameters for the extension stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendParams {
    /// Minimum Smith-Waterman score an extension must keep
    pub min_score: i32,
    /// Abort extensions whose running score falls below `min_score`
    pub score_guard: bool,
    /// Log both aligned strings of every accepted extension
    pub print_extensions: bool,
}

impl Default for ExtendParams {
    fn default() -> Self {
        Self {
            min_score: 8,
            score_guard: true,
            print_extensions: false,
        }
    }
}

/// Which aligned string received the gap symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GapSide {
    Query,
    Database,
}

/// A run of gap symbols inserted at the anchor junction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GapRun {
    pub side: GapSide,
    /// Column of the first gap symbol in the aligned strings
    pub offset: usize,
    pub length: usize,
}

/// A candidate local alignment grown from an anchor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extension {
    pub anchor: Anchor,
    pub query_aligned: Vec<u8>,
    pub db_aligned: Vec<u8>,
    /// Query bases covered by the alignment
    pub query_range: Range<usize>,
    /// Database bases covered by the alignment
    pub db_range: Range<usize>,
    pub gap: Option<GapRun>,
    pub score: i32,
}

impl Extension {
    pub fn query_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.query_aligned)
    }

    pub fn db_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.db_aligned)
    }

    /// Alignment columns
    pub fn len(&self) -> usize {
        self.query_aligned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.query_aligned.is_empty()
    }

    pub fn gap_count(&self) -> usize {
        self.gap.map_or(0, |gap| gap.length)
    }

    /// Percentage of columns holding identical bases
    pub fn identity(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let matches = self
            .query_aligned
            .iter()
            .zip(&self.db_aligned)
            .filter(|(q, d)| q == d && **q != GAP)
            .count();
        matches as f64 / self.len() as f64 * 100.0
    }
}

/// Outcome of extending one anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extended {
    Valid(Extension),
    Invalid,
}

impl Extended {
    pub fn is_valid(&self) -> bool {
        matches!(self, Extended::Valid(_))
    }

    pub fn into_extension(self) -> Option<Extension> {
        match self {
            Extended::Valid(extension) => Some(extension),
            Extended::Invalid => None,
        }
    }
}

/// Extension engine
#[derive(Debug, Clone)]
pub struct Extender {
    scorer: SmithWaterman,
    params: ExtendParams,
}

impl Extender {
    pub fn new(scoring: ScoringParams, params: ExtendParams) -> Self {
        Self {
            scorer: SmithWaterman::new(scoring),
            params,
        }
    }

    pub fn params(&self) -> &ExtendParams {
        &self.params
    }

    /// Extend `anchor` over `query` and `data`.
    ///
    /// # Panics
    ///
    /// Panics if either seed of the anchor lies outside its sequence; anchors
    /// must come from indices built over these same sequences.
    pub fn extend(&self, anchor: &Anchor, query: &[u8], data: &[u8]) -> Extended {
        let k = anchor.word_length();
        let left = anchor.left();
        let right = anchor.right();
        assert!(
            right.query_pos + k <= query.len() && right.db_pos + k <= data.len(),
            "anchor {:?} lies outside query ({} bp) or database ({} bp)",
            anchor,
            query.len(),
            data.len()
        );

        // Local score never decreases as both strings grow, so once a check
        // passes every later check on a longer pair passes too.
        let mut cleared = !self.params.score_guard;

        // Extend left over borrowed slices
        let q_seed_end = left.query_pos + k;
        let d_seed_end = left.db_pos + k;
        let mut q_start = left.query_pos;
        let mut d_start = left.db_pos;
        while q_start > 0 && d_start > 0 {
            q_start -= 1;
            d_start -= 1;
            if !self.check(
                &mut cleared,
                &query[q_start..q_seed_end],
                &data[d_start..d_seed_end],
            ) {
                log::trace!("Anchor {:?} rejected extending left at query {}", anchor, q_start);
                return Extended::Invalid;
            }
        }

        let capacity = (query.len() - q_start).max(data.len() - d_start) + k;
        let mut q_aln = Vec::with_capacity(capacity);
        let mut d_aln = Vec::with_capacity(capacity);
        q_aln.extend_from_slice(&query[q_start..q_seed_end]);
        d_aln.extend_from_slice(&data[d_start..d_seed_end]);

        // Bridge the interior; the longer side's surplus faces gaps
        let q_interior = anchor.query_interior();
        let d_interior = anchor.db_interior();
        let shared = q_interior.min(d_interior);
        q_aln.extend_from_slice(&query[q_seed_end..q_seed_end + shared]);
        d_aln.extend_from_slice(&data[d_seed_end..d_seed_end + shared]);

        let gap = if d_interior > q_interior {
            let offset = q_aln.len();
            let length = d_interior - q_interior;
            q_aln.resize(offset + length, GAP);
            d_aln.extend_from_slice(&data[d_seed_end + shared..right.db_pos]);
            Some(GapRun {
                side: GapSide::Query,
                offset,
                length,
            })
        } else if q_interior > d_interior {
            let offset = d_aln.len();
            let length = q_interior - d_interior;
            d_aln.resize(offset + length, GAP);
            q_aln.extend_from_slice(&query[q_seed_end + shared..right.query_pos]);
            Some(GapRun {
                side: GapSide::Database,
                offset,
                length,
            })
        } else {
            None
        };

        q_aln.extend_from_slice(&query[right.query_pos..right.query_pos + k]);
        d_aln.extend_from_slice(&data[right.db_pos..right.db_pos + k]);

        // Extend right
        let mut q_end = right.query_pos + k;
        let mut d_end = right.db_pos + k;
        while q_end < query.len() && d_end < data.len() {
            q_aln.push(query[q_end]);
            d_aln.push(data[d_end]);
            q_end += 1;
            d_end += 1;
            if !self.check(&mut cleared, &q_aln, &d_aln) {
                log::trace!("Anchor {:?} rejected extending right at query {}", anchor, q_end);
                return Extended::Invalid;
            }
        }

        let score = self.scorer.score(&q_aln, &d_aln);
        if self.params.score_guard && score < self.params.min_score {
            log::trace!("Anchor {:?} rejected with final score {}", anchor, score);
            return Extended::Invalid;
        }

        let extension = Extension {
            anchor: *anchor,
            query_aligned: q_aln,
            db_aligned: d_aln,
            query_range: q_start..q_end,
            db_range: d_start..d_end,
            gap,
            score,
        };

        if self.params.print_extensions {
            log::info!("Data Ext:\t{}", extension.db_str());
            log::info!("Quer Ext:\t{}", extension.query_str());
        }

        Extended::Valid(extension)
    }

    fn check(&self, cleared: &mut bool, query: &[u8], data: &[u8]) -> bool {
        if *cleared {
            return true;
        }
        *cleared = self.scorer.score(query, data) >= self.params.min_score;
        *cleared
    }
}
