//! blastn core library
//!
//! Seed-and-extend nucleotide search: word indexing, seed matching, anchor
//! pairing, alignment extension and Smith-Waterman scoring, plus DUST
//! low-complexity filtering and FASTA input.

pub mod types;
pub mod io;
pub mod seed;
pub mod smith_waterman;
pub mod extend;
pub mod mask;
pub mod search;

// Re-export commonly used types and functions
pub use types::{Sequence, SequenceMap, SeqPos};
pub use seed::{Anchor, SeedError, SeedParams, SeedResult, WordIndex};
pub use smith_waterman::{smith_waterman, ScoringParams, SmithWaterman};
pub use extend::{Extended, ExtendParams, Extender, Extension};
pub use mask::{DustMasker, LowComplexity, MaskParams};
pub use search::{SearchConfig, SearchError, SearchObserver, SearchReport, Searcher};
pub use io as formats;

/// Version information for the blastn core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
