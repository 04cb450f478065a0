//! Seed-and-extend search
//!
//! Runs one query against a set of named database sequences: the query is
//! indexed once, then every database sequence is indexed, prefiltered,
//! matched, paired and extended independently on the rayon pool.
//!
//! All parameters live in one [`SearchConfig`], validated when the
//! [`Searcher`] is built and never changed afterwards.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extend::{ExtendParams, Extender, Extension};
use crate::mask::{DustMasker, LowComplexity, MaskError, MaskParams, NoMask};
use crate::seed::{
    index_sequences, match_indices, pair_hits, IndexedSequenceMap, SeedError, SeedParams, WordIndex,
};
use crate::smith_waterman::{smith_waterman_filter, ScoringParams};
use crate::types::{Sequence, SequenceMap};

/// Errors that can occur while setting up or running a search
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    Mask(#[from] MaskError),

    #[error("Query {name} is {len} bp, shorter than the word length {word_length}")]
    QueryTooShort {
        name: String,
        len: usize,
        word_length: usize,
    },
}

pub type SearchResult<T> = Result<T, SearchError>;

/// Every tunable of a search run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Word length used for indexing and seed matching
    pub word_length: usize,
    pub match_score: i32,
    pub mismatch_score: i32,
    /// Score per gap symbol (linear penalty)
    pub gap_score: i32,
    /// Minimum Smith-Waterman score of a reported extension
    pub min_score: i32,
    pub dust_threshold: f64,
    pub dust_pattern_length: usize,
    /// Maximum seed separation within an anchor
    pub max_distance: usize,
    pub diagonal_tolerance: usize,
    /// Pair occurrences of different shared words
    pub cross_word: bool,
    /// Skip words with more occurrence pairs than this
    pub max_word_frequency: Option<usize>,
    /// Abort extensions as soon as their score drops below `min_score`
    pub score_guard: bool,
    /// Drop seed words the DUST filter marks as low complexity
    pub mask_low_complexity: bool,
    /// Collapse identical extensions grown from different anchors
    pub deduplicate: bool,
    /// Log every accepted extension
    pub print_extensions: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let seed = SeedParams::default();
        let scoring = ScoringParams::default();
        let mask = MaskParams::default();
        Self {
            word_length: seed.word_length,
            match_score: scoring.match_score,
            mismatch_score: scoring.mismatch_score,
            gap_score: scoring.gap_score,
            min_score: 22,
            dust_threshold: mask.dust_threshold,
            dust_pattern_length: mask.dust_pattern_length,
            max_distance: seed.max_distance,
            diagonal_tolerance: seed.diagonal_tolerance,
            cross_word: seed.cross_word,
            max_word_frequency: seed.max_word_frequency,
            score_guard: true,
            mask_low_complexity: mask.enabled,
            deduplicate: true,
            print_extensions: false,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> SearchResult<()> {
        self.seed_params().validate()?;
        if self.match_score <= 0 {
            return Err(SearchError::InvalidConfig(format!(
                "match score must be positive, got {}",
                self.match_score
            )));
        }
        if self.mismatch_score > 0 || self.gap_score > 0 {
            return Err(SearchError::InvalidConfig(format!(
                "mismatch ({}) and gap ({}) scores must not be positive",
                self.mismatch_score, self.gap_score
            )));
        }
        if self.min_score < 0 {
            return Err(SearchError::InvalidConfig(format!(
                "minimum score must not be negative, got {}",
                self.min_score
            )));
        }
        DustMasker::new(self.mask_params())?;

        let first_step = self.first_step_ceiling();
        if self.score_guard && self.min_score > first_step {
            log::warn!(
                "Minimum score {} exceeds {}, the best score of a seed grown by one base; \
                 anchors not starting at a sequence edge are rejected on their first step",
                self.min_score,
                first_step
            );
        }
        Ok(())
    }

    /// Highest score the guarded extension can see at its first step: one
    /// seed word plus one matching base.
    pub fn first_step_ceiling(&self) -> i32 {
        i32::try_from(self.word_length.saturating_add(1))
            .unwrap_or(i32::MAX)
            .saturating_mul(self.match_score)
    }

    pub fn seed_params(&self) -> SeedParams {
        SeedParams {
            word_length: self.word_length,
            max_distance: self.max_distance,
            diagonal_tolerance: self.diagonal_tolerance,
            cross_word: self.cross_word,
            max_word_frequency: self.max_word_frequency,
        }
    }

    pub fn scoring(&self) -> ScoringParams {
        ScoringParams {
            match_score: self.match_score,
            mismatch_score: self.mismatch_score,
            gap_score: self.gap_score,
        }
    }

    pub fn extend_params(&self) -> ExtendParams {
        ExtendParams {
            min_score: self.min_score,
            score_guard: self.score_guard,
            print_extensions: self.print_extensions,
        }
    }

    pub fn mask_params(&self) -> MaskParams {
        MaskParams {
            enabled: self.mask_low_complexity,
            dust_threshold: self.dust_threshold,
            dust_pattern_length: self.dust_pattern_length,
            ..MaskParams::default()
        }
    }
}

/// Progress hooks called from the worker threads.
///
/// Observers only watch; they cannot alter the search.
pub trait SearchObserver: Sync {
    fn on_database_start(&self, _name: &str, _anchors: usize) {}
    fn on_anchor(&self, _accepted: bool) {}
    fn on_database_done(&self, _name: &str, _accepted: usize) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Accepted extensions for one database sequence
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseHits {
    pub name: String,
    pub extensions: Vec<Extension>,
}

/// Outcome of searching one query
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub query_name: String,
    /// One entry per searched database sequence, sorted by name
    pub results: Vec<DatabaseHits>,
    pub anchors_processed: usize,
    pub elapsed: Duration,
}

impl SearchReport {
    pub fn total_extensions(&self) -> usize {
        self.results.iter().map(|hits| hits.extensions.len()).sum()
    }

    /// Database entries with at least one extension
    pub fn hits(&self) -> impl Iterator<Item = &DatabaseHits> {
        self.results.iter().filter(|hits| !hits.extensions.is_empty())
    }
}

/// Search engine holding a validated configuration
pub struct Searcher {
    config: SearchConfig,
    seed_params: SeedParams,
    scoring: ScoringParams,
    extender: Extender,
    filter: Box<dyn LowComplexity>,
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Searcher {
    /// Validate `config` and build a searcher using the DUST filter.
    pub fn new(config: SearchConfig) -> SearchResult<Self> {
        let filter: Box<dyn LowComplexity> = if config.mask_low_complexity {
            Box::new(DustMasker::new(config.mask_params())?)
        } else {
            Box::new(NoMask)
        };
        Self::with_filter(config, filter)
    }

    /// Validate `config` and build a searcher with a caller-supplied
    /// low-complexity predicate.
    pub fn with_filter(config: SearchConfig, filter: Box<dyn LowComplexity>) -> SearchResult<Self> {
        config.validate()?;
        Ok(Self {
            seed_params: config.seed_params(),
            scoring: config.scoring(),
            extender: Extender::new(config.scoring(), config.extend_params()),
            filter,
            config,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search `query` against every sequence of `database`.
    pub fn search(
        &self,
        query: &Sequence,
        database: &SequenceMap,
        observer: &dyn SearchObserver,
    ) -> SearchResult<SearchReport> {
        let start = Instant::now();
        let query_index = self.index_query(query)?;

        let indexed = self.prefilter(index_sequences(database, self.config.word_length)?, database);
        let mut names: Vec<&String> = indexed.keys().collect();
        names.sort_unstable();
        log::debug!(
            "Searching {} against {} of {} database sequences",
            query.name,
            names.len(),
            database.len()
        );

        let outcomes: Vec<(DatabaseHits, usize)> = names
            .par_iter()
            .map(|&name| {
                self.search_indexed(query, &query_index, &database[name], &indexed[name], observer)
            })
            .collect();

        let anchors_processed: usize = outcomes.iter().map(|(_, anchors)| anchors).sum();
        let results: Vec<DatabaseHits> = outcomes.into_iter().map(|(hits, _)| hits).collect();
        let report = SearchReport {
            query_name: query.name.clone(),
            results,
            anchors_processed,
            elapsed: start.elapsed(),
        };

        log::info!(
            "{}: {} extensions from {} anchors in {:.2?}",
            report.query_name,
            report.total_extensions(),
            report.anchors_processed,
            report.elapsed
        );
        Ok(report)
    }

    /// Search `query` against a single database sequence.
    pub fn search_sequence(&self, query: &Sequence, database: &Sequence) -> SearchResult<DatabaseHits> {
        let query_index = self.index_query(query)?;
        let db_index = WordIndex::build(database.as_bytes(), self.config.word_length)?;

        let mut indexed = IndexedSequenceMap::new();
        indexed.insert(database.name.clone(), db_index);
        let single = SequenceMap::from([(database.name.clone(), database.clone())]);
        let mut indexed = self.prefilter(indexed, &single);

        match indexed.remove(&database.name) {
            Some(db_index) => {
                let (hits, _) =
                    self.search_indexed(query, &query_index, database, &db_index, &NoopObserver);
                Ok(hits)
            }
            None => Ok(DatabaseHits {
                name: database.name.clone(),
                extensions: Vec::new(),
            }),
        }
    }

    fn index_query(&self, query: &Sequence) -> SearchResult<WordIndex> {
        let word_length = self.config.word_length;
        if query.len() < word_length {
            return Err(SearchError::QueryTooShort {
                name: query.name.clone(),
                len: query.len(),
                word_length,
            });
        }
        Ok(WordIndex::build(query.as_bytes(), word_length)?)
    }

    /// Drop database sequences that cannot reach the minimum score.
    fn prefilter(&self, indexed: IndexedSequenceMap, database: &SequenceMap) -> IndexedSequenceMap {
        if !self.config.score_guard {
            return indexed;
        }
        let before = indexed.len();
        let kept = smith_waterman_filter(indexed, database, self.config.min_score, &self.scoring);
        if kept.len() < before {
            log::debug!(
                "Self-score prefilter removed {} database sequences",
                before - kept.len()
            );
        }
        kept
    }

    fn search_indexed(
        &self,
        query: &Sequence,
        query_index: &WordIndex,
        database: &Sequence,
        db_index: &WordIndex,
        observer: &dyn SearchObserver,
    ) -> (DatabaseHits, usize) {
        let mut hits = match_indices(query_index, db_index);
        let shared_words = hits.len();
        hits.retain(|hit| !self.filter.is_low_complexity(&hit.word));

        let anchors = pair_hits(&hits, &self.seed_params);
        observer.on_database_start(&database.name, anchors.len());
        log::debug!(
            "{}: {} shared words, {} after low-complexity filter, {} anchors",
            database.name,
            shared_words,
            hits.len(),
            anchors.len()
        );

        let mut extensions: Vec<Extension> = anchors
            .iter()
            .filter_map(|anchor| {
                let extended = self
                    .extender
                    .extend(anchor, query.as_bytes(), database.as_bytes());
                observer.on_anchor(extended.is_valid());
                extended.into_extension()
            })
            .collect();

        if self.config.deduplicate {
            // Anchors arrive sorted, so the first of each group has the leftmost seeds
            extensions.sort_by(|a, b| {
                (a.query_range.start, a.db_range.start, a.query_range.end, a.db_range.end)
                    .cmp(&(b.query_range.start, b.db_range.start, b.query_range.end, b.db_range.end))
                    .then_with(|| a.query_aligned.cmp(&b.query_aligned))
                    .then_with(|| a.db_aligned.cmp(&b.db_aligned))
                    .then_with(|| a.anchor.cmp(&b.anchor))
            });
            extensions.dedup_by(|next, kept| {
                next.query_range == kept.query_range
                    && next.db_range == kept.db_range
                    && next.query_aligned == kept.query_aligned
                    && next.db_aligned == kept.db_aligned
            });
        }

        extensions.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.query_range.start.cmp(&b.query_range.start))
                .then_with(|| a.db_range.start.cmp(&b.db_range.start))
                .then_with(|| a.anchor.cmp(&b.anchor))
        });

        observer.on_database_done(&database.name, extensions.len());
        let processed = anchors.len();
        (
            DatabaseHits {
                name: database.name.clone(),
                extensions,
            },
            processed,
        )
    }
}
