//! Sequence file input
//!
//! Query and database sequences are read from FASTA/FASTQ files, plain or
//! gzip-compressed, and handed to the search as name-keyed maps.

pub mod fasta;

pub use fasta::{into_sequence_map, FastaError, FastaParser, FastaResult};
