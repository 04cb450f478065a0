//! Command implementations for the blastn CLI

pub mod index;
pub mod mask;
pub mod score;
pub mod search;

use anyhow::{Context, Result};
use blastn_core::io::{FastaError, FastaParser};
use blastn_core::Sequence;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{require_file, CliError};

/// Read every record of a FASTA/FASTQ file.
pub fn load_sequences(path: &Path) -> Result<Vec<Sequence>> {
    require_file(path)?;
    match FastaParser::parse_file(path) {
        Ok(sequences) => {
            log::info!("Loaded {} sequences from {}", sequences.len(), path.display());
            Ok(sequences)
        }
        Err(FastaError::EmptyFile) => Err(CliError::empty_input(path.to_path_buf()).into()),
        Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Buffered writer over `path`, or stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|err| {
                CliError::io(format!("cannot create {}: {}", path.display(), err))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}
