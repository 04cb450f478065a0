//! Mask command implementation - write DUST-masked copies of sequences as FASTA

use anyhow::{Context, Result};
use blastn_core::{DustMasker, MaskParams, Sequence};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::CliError;

const LINE_WIDTH: usize = 60;

#[derive(Args, Debug, Clone)]
pub struct MaskArgs {
    /// Sequence file (FASTA/FASTQ, optionally gzipped)
    pub input: PathBuf,

    /// Output FASTA file (stdout if omitted)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// DUST score above which a window is masked
    #[arg(long)]
    pub dust_threshold: Option<f64>,

    /// Window length scored by DUST
    #[arg(long)]
    pub window_size: Option<usize>,
}

pub fn write_fasta<W: Write>(out: &mut W, sequence: &Sequence) -> Result<()> {
    writeln!(out, ">{}", sequence.name)?;
    for line in sequence.data.chunks(LINE_WIDTH) {
        out.write_all(line)?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn execute(config: &Config, args: MaskArgs) -> Result<()> {
    let base = config.search.mask_params();
    let params = MaskParams {
        enabled: true,
        dust_threshold: args.dust_threshold.unwrap_or(base.dust_threshold),
        window_size: args.window_size.unwrap_or(base.window_size),
        ..base
    };
    let masker = DustMasker::new(params).map_err(|err| CliError::config(err.to_string()))?;

    let mut out = super::open_output(args.out.as_deref())?;
    let mut total = 0;
    for mut sequence in super::load_sequences(&args.input)? {
        let masked = masker.mask_sequence(&mut sequence.data);
        log::debug!("{}: masked {} of {} bases", sequence.name, masked, sequence.len());
        total += masked;
        write_fasta(&mut out, &sequence)?;
    }
    out.flush().context("Failed to flush output")?;

    log::info!("Masked {} low-complexity bases", total);
    Ok(())
}
