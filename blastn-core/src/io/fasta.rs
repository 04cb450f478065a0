//! FASTA/FASTQ sequence file parser
//!
//! Parsing is delegated to needletail, which joins wrapped sequence lines.
//! Record names are cut at the first whitespace of the header and bases are
//! upper-cased so that word keys compare exactly.

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use needletail::errors::{ParseError, ParseErrorKind};
use needletail::parse_fastx_reader;
use thiserror::Error;

use crate::types::{is_valid_nucleotide, Sequence, SequenceMap};

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Empty file or no sequences found")]
    EmptyFile,
    #[error("Duplicate sequence name: {0}")]
    DuplicateName(String),
}

pub type FastaResult<T> = Result<T, FastaError>;

impl From<ParseError> for FastaError {
    fn from(err: ParseError) -> Self {
        match err.kind {
            ParseErrorKind::EmptyFile => FastaError::EmptyFile,
            _ => FastaError::Parse(err.to_string()),
        }
    }
}

/// FASTA/FASTQ parser for reading sequence data
pub struct FastaParser;

impl FastaParser {
    /// Parse a FASTA/FASTQ file; names ending in `.gz` are decompressed.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> FastaResult<Vec<Sequence>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::debug!("Reading sequences from {}", path.display());

        if path.to_string_lossy().ends_with(".gz") {
            Self::parse_reader(BufReader::new(GzDecoder::new(file)))
        } else {
            Self::parse_reader(BufReader::new(file))
        }
    }

    /// Parse FASTA/FASTQ data from any readable source
    pub fn parse_reader<R: Read + Send>(reader: R) -> FastaResult<Vec<Sequence>> {
        let mut fastx_reader = parse_fastx_reader(reader)?;
        let mut sequences = Vec::new();

        while let Some(record) = fastx_reader.next() {
            let record = record?;
            sequences.push(Self::record_to_sequence(record.id(), &record.seq()));
        }

        if sequences.is_empty() {
            return Err(FastaError::EmptyFile);
        }
        Ok(sequences)
    }

    pub fn parse_str(text: &str) -> FastaResult<Vec<Sequence>> {
        Self::parse_reader(Cursor::new(text.as_bytes().to_vec()))
    }

    fn record_to_sequence(header: &[u8], bases: &[u8]) -> Sequence {
        let header = String::from_utf8_lossy(header);
        let name = header.split_whitespace().next().unwrap_or_default().to_string();

        let data = bases.to_ascii_uppercase();
        let ambiguous = data.iter().filter(|&&b| !is_valid_nucleotide(b)).count();
        if ambiguous > 0 {
            log::debug!("Sequence {} has {} non-ACGT bases", name, ambiguous);
        }

        Sequence::new(name, data)
    }
}

/// Key sequences by name, rejecting duplicate names.
pub fn into_sequence_map(sequences: Vec<Sequence>) -> FastaResult<SequenceMap> {
    let mut map = SequenceMap::with_capacity(sequences.len());
    for sequence in sequences {
        if map.contains_key(&sequence.name) {
            return Err(FastaError::DuplicateName(sequence.name));
        }
        map.insert(sequence.name.clone(), sequence);
    }
    Ok(map)
}
