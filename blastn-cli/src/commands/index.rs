//! Index command implementation - dump the word index of each sequence in a file

use anyhow::{Context, Result};
use blastn_core::{DustMasker, LowComplexity, Sequence, WordIndex};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::CliError;

#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// Sequence file (FASTA/FASTQ, optionally gzipped)
    pub input: PathBuf,

    /// Only index the record with this name
    #[arg(long)]
    pub name: Option<String>,

    /// Word length
    #[arg(short = 'k', long)]
    pub word_length: Option<usize>,

    /// Only list words occurring at least this often
    #[arg(long, default_value = "1")]
    pub min_count: usize,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Write one line per distinct word: sequence, word, count, DUST flag, positions.
///
/// Words are listed in byte order so the dump is stable between runs.
pub fn write_index<W: Write>(
    out: &mut W,
    sequence: &Sequence,
    index: &WordIndex,
    masker: &DustMasker,
    min_count: usize,
) -> Result<usize> {
    let mut entries: Vec<(&[u8], &[usize])> = index
        .iter()
        .filter(|(_, positions)| positions.len() >= min_count)
        .collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

    for (word, positions) in &entries {
        let positions: Vec<String> = positions.iter().map(|p| p.to_string()).collect();
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            sequence.name,
            String::from_utf8_lossy(word),
            positions.len(),
            if masker.is_low_complexity(word) { "low" } else { "-" },
            positions.join(",")
        )?;
    }
    Ok(entries.len())
}

pub fn execute(config: &Config, args: IndexArgs) -> Result<()> {
    let word_length = args.word_length.unwrap_or(config.search.word_length);
    let masker = DustMasker::new(config.search.mask_params())
        .map_err(|err| CliError::config(err.to_string()))?;

    let sequences: Vec<Sequence> = super::load_sequences(&args.input)?
        .into_iter()
        .filter(|seq| args.name.as_deref().map_or(true, |name| seq.name == name))
        .collect();
    if sequences.is_empty() {
        if let Some(name) = &args.name {
            return Err(CliError::invalid_sequence(format!(
                "no record named {} in {}",
                name,
                args.input.display()
            ))
            .into());
        }
    }

    let mut out = super::open_output(args.out.as_deref())?;
    writeln!(out, "#sequence\tword\tcount\tdust\tpositions")?;
    for sequence in &sequences {
        let index = WordIndex::build(&sequence.data, word_length)
            .map_err(|err| CliError::config(err.to_string()))?;
        let listed = write_index(&mut out, sequence, &index, &masker, args.min_count)?;
        log::info!(
            "{}: {} distinct words, {} positions, {} listed",
            sequence.name,
            index.len(),
            index.total_positions(),
            listed
        );
    }
    out.flush().context("Failed to flush output")?;
    Ok(())
}
