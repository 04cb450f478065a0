//! Search command implementation - seed-and-extend a query set against a database

use anyhow::{Context, Result};
use blastn_core::io::into_sequence_map;
use blastn_core::search::{SearchError, SearchObserver, SearchReport, Searcher};
use blastn_core::{Extension, SearchConfig};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{Config, OutputFormat};
use crate::error::CliError;

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Query sequence file (FASTA/FASTQ, optionally gzipped)
    #[arg(long, required = true)]
    pub query: PathBuf,

    /// Database sequence file (FASTA/FASTQ, optionally gzipped)
    #[arg(long, required = true)]
    pub db: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Output format
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Word length for indexing and seeding
    #[arg(short = 'k', long)]
    pub word_length: Option<usize>,

    /// Minimum Smith-Waterman score of a reported alignment
    #[arg(long)]
    pub min_score: Option<i32>,

    /// Score for identical bases
    #[arg(long)]
    pub match_score: Option<i32>,

    /// Score for differing bases
    #[arg(long, allow_hyphen_values = true)]
    pub mismatch_score: Option<i32>,

    /// Score per gap symbol
    #[arg(long, allow_hyphen_values = true)]
    pub gap_score: Option<i32>,

    /// Maximum separation between the two seeds of an anchor
    #[arg(long)]
    pub max_distance: Option<usize>,

    /// Maximum diagonal difference between paired seeds
    #[arg(long)]
    pub diagonal_tolerance: Option<usize>,

    /// Only pair two occurrences of the same word
    #[arg(long)]
    pub per_word: bool,

    /// DUST score above which a seed word is discarded
    #[arg(long)]
    pub dust_threshold: Option<f64>,

    /// Disable low-complexity filtering of seed words
    #[arg(long)]
    pub no_dust: bool,

    /// Extend every anchor to full length without early rejection
    #[arg(long)]
    pub no_score_guard: bool,

    /// Report identical alignments grown from different anchors separately
    #[arg(long)]
    pub keep_duplicates: bool,

    /// Log the aligned strings of every accepted extension
    #[arg(long)]
    pub print_extensions: bool,
}

impl SearchArgs {
    /// Apply command-line overrides on top of the configured values
    pub fn search_config(&self, base: &SearchConfig) -> SearchConfig {
        let mut config = base.clone();
        if let Some(k) = self.word_length {
            config.word_length = k;
        }
        if let Some(score) = self.min_score {
            config.min_score = score;
        }
        if let Some(score) = self.match_score {
            config.match_score = score;
        }
        if let Some(score) = self.mismatch_score {
            config.mismatch_score = score;
        }
        if let Some(score) = self.gap_score {
            config.gap_score = score;
        }
        if let Some(distance) = self.max_distance {
            config.max_distance = distance;
        }
        if let Some(tolerance) = self.diagonal_tolerance {
            config.diagonal_tolerance = tolerance;
        }
        if let Some(threshold) = self.dust_threshold {
            config.dust_threshold = threshold;
        }
        config.cross_word &= !self.per_word;
        config.mask_low_complexity &= !self.no_dust;
        config.score_guard &= !self.no_score_guard;
        config.deduplicate &= !self.keep_duplicates;
        config.print_extensions |= self.print_extensions;
        config
    }
}

/// Progress bar advanced once per finished database sequence
struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    fn new(total: u64, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            bar
        };
        Self { bar }
    }
}

impl SearchObserver for ProgressObserver {
    fn on_database_done(&self, name: &str, _accepted: usize) {
        self.bar.set_message(name.to_string());
        self.bar.inc(1);
    }
}

/// One reported alignment; coordinates are 1-based and inclusive
#[derive(Debug, Serialize)]
pub struct HitRecord<'a> {
    pub query: &'a str,
    pub subject: &'a str,
    pub q_start: usize,
    pub q_end: usize,
    pub s_start: usize,
    pub s_end: usize,
    pub score: i32,
    pub identity: f64,
    pub gaps: usize,
    pub query_aligned: String,
    pub subject_aligned: String,
}

impl<'a> HitRecord<'a> {
    pub fn new(query: &'a str, subject: &'a str, extension: &Extension) -> Self {
        Self {
            query,
            subject,
            q_start: extension.query_range.start + 1,
            q_end: extension.query_range.end,
            s_start: extension.db_range.start + 1,
            s_end: extension.db_range.end,
            score: extension.score,
            identity: extension.identity(),
            gaps: extension.gap_count(),
            query_aligned: extension.query_str().into_owned(),
            subject_aligned: extension.db_str().into_owned(),
        }
    }
}

pub fn execute(config: &Config, args: SearchArgs, quiet: bool) -> Result<()> {
    let started = Instant::now();
    log::info!("Query: {}", args.query.display());
    log::info!("Database: {}", args.db.display());

    let queries = super::load_sequences(&args.query).context("Failed to load query sequences")?;
    let database = into_sequence_map(
        super::load_sequences(&args.db).context("Failed to load database sequences")?,
    )
    .context("Database names must be unique")?;

    let search_config = args.search_config(&config.search);
    let searcher = Searcher::new(search_config)
        .map_err(|err| CliError::config(err.to_string()))?;
    log::debug!("Search configuration: {:?}", searcher.config());

    let observer = ProgressObserver::new((queries.len() * database.len()) as u64, quiet);
    let mut reports = Vec::with_capacity(queries.len());
    for query in &queries {
        match searcher.search(query, &database, &observer) {
            Ok(report) => {
                // records dropped by the self-score prefilter never report progress
                observer.bar.inc(database.len().saturating_sub(report.results.len()) as u64);
                reports.push(report);
            }
            Err(err @ SearchError::QueryTooShort { .. }) => {
                log::warn!("Skipping query: {}", err);
                observer.bar.inc(database.len() as u64);
            }
            Err(err) => return Err(err).context(format!("Search failed for {}", query.name)),
        }
    }
    observer.bar.finish_and_clear();

    let format = args.format.unwrap_or(config.output.format);
    let mut out = super::open_output(args.out.as_deref())?;
    let written = match format {
        OutputFormat::Tsv => write_tsv(&mut out, &reports, config.output.header)?,
        OutputFormat::Json => write_json(&mut out, &reports)?,
    };
    out.flush().context("Failed to flush output")?;

    let anchors: usize = reports.iter().map(|r| r.anchors_processed).sum();
    log::info!(
        "Reported {} alignments from {} anchors for {} queries in {:.2?}",
        written,
        anchors,
        reports.len(),
        started.elapsed()
    );
    Ok(())
}

fn records(reports: &[SearchReport]) -> impl Iterator<Item = HitRecord<'_>> {
    reports.iter().flat_map(|report| {
        report.hits().flat_map(move |hits| {
            hits.extensions
                .iter()
                .map(move |extension| HitRecord::new(&report.query_name, &hits.name, extension))
        })
    })
}

pub fn write_tsv<W: Write>(out: &mut W, reports: &[SearchReport], header: bool) -> Result<usize> {
    if header {
        writeln!(
            out,
            "#query\tsubject\tq_start\tq_end\ts_start\ts_end\tscore\tidentity\tgaps\tquery_aligned\tsubject_aligned"
        )?;
    }

    let mut count = 0;
    for record in records(reports) {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.2}\t{}\t{}\t{}",
            record.query,
            record.subject,
            record.q_start,
            record.q_end,
            record.s_start,
            record.s_end,
            record.score,
            record.identity,
            record.gaps,
            record.query_aligned,
            record.subject_aligned
        )?;
        count += 1;
    }
    Ok(count)
}

pub fn write_json<W: Write>(out: &mut W, reports: &[SearchReport]) -> Result<usize> {
    let all: Vec<HitRecord<'_>> = records(reports).collect();
    serde_json::to_writer_pretty(&mut *out, &all).context("Failed to serialize results")?;
    writeln!(out)?;
    Ok(all.len())
}
