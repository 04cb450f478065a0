use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use commands::index::IndexArgs;
use commands::mask::MaskArgs;
use commands::score::ScoreArgs;
use commands::search::SearchArgs;
use config::Config;
use error::CliError;

#[derive(Parser)]
#[command(name = "blastn")]
#[command(about = "Seed-and-extend nucleotide local similarity search")]
#[command(version)]
#[command(long_about = "
blastn finds local similarities between a query and a set of database sequences.
Shared words seed candidate anchors, which are extended in both directions and
accepted by Smith-Waterman score.

Examples:
  blastn search --query query.fa --db genomes.fa.gz --out hits.tsv
  blastn search --query query.fa --db genomes.fa -k 8 --min-score 40 --format json
  blastn score ACGTTTCATGA ACGTTTGGCATGA --matrix
  blastn index genome.fa --name chr1 --min-count 3
  blastn mask genome.fa --out genome.masked.fa
  blastn config --example > blastn.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search query sequences against a database of sequences
    Search(SearchArgs),

    /// Smith-Waterman score of two sequences given on the command line
    Score(ScoreArgs),

    /// Dump the word index of the sequences in a file
    Index(IndexArgs),

    /// Replace low-complexity regions with N
    Mask(MaskArgs),

    /// Print the effective configuration
    Config {
        /// Print an example configuration instead
        #[arg(long)]
        example: bool,
    },
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let threads = cli.threads.unwrap_or(config.general.threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to set thread count")?;
    log::debug!("Using {} worker threads", threads);

    match cli.command {
        Commands::Search(args) => commands::search::execute(&config, args, cli.quiet)?,
        Commands::Score(args) => commands::score::execute(&config, args)?,
        Commands::Index(args) => commands::index::execute(&config, args)?,
        Commands::Mask(args) => commands::mask::execute(&config, args)?,
        Commands::Config { example } => {
            let text = if example {
                Config::example_toml()?
            } else {
                config.to_toml()?
            };
            print!("{}", text);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet)?;

    if let Err(err) = run(cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            error::print_error_and_exit(cli_err);
        }
        return Err(err);
    }

    Ok(())
}
