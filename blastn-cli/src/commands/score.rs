//! Score command implementation - Smith-Waterman score of two literal sequences

use anyhow::Result;
use blastn_core::smith_waterman::{smith_waterman, SwOutput};
use blastn_core::types::is_valid_nucleotide;
use blastn_core::{ScoringParams, Sequence};
use clap::Args;

use crate::config::Config;
use crate::error::CliError;

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// First sequence
    pub first: String,

    /// Second sequence
    pub second: String,

    /// Print the full score matrix
    #[arg(long)]
    pub matrix: bool,

    /// Score for identical bases
    #[arg(long)]
    pub match_score: Option<i32>,

    /// Score for differing bases
    #[arg(long, allow_hyphen_values = true)]
    pub mismatch_score: Option<i32>,

    /// Score per gap symbol
    #[arg(long, allow_hyphen_values = true)]
    pub gap_score: Option<i32>,
}

impl ScoreArgs {
    fn scoring(&self, base: ScoringParams) -> ScoringParams {
        ScoringParams {
            match_score: self.match_score.unwrap_or(base.match_score),
            mismatch_score: self.mismatch_score.unwrap_or(base.mismatch_score),
            gap_score: self.gap_score.unwrap_or(base.gap_score),
        }
    }
}

fn parse_sequence(name: &str, text: &str) -> Result<Sequence, CliError> {
    let sequence = Sequence::from_text(name, text);
    match sequence.data.iter().position(|&b| !is_valid_nucleotide(b)) {
        Some(pos) => Err(CliError::invalid_sequence(format!(
            "{} sequence has '{}' at position {}",
            name,
            sequence.data[pos] as char,
            pos + 1
        ))),
        None => Ok(sequence),
    }
}

/// Render the score, plus the matrix and its best cell when requested
pub fn render(first: &Sequence, second: &Sequence, params: &ScoringParams, matrix: bool) -> String {
    match smith_waterman(&first.data, &second.data, params, !matrix) {
        SwOutput::Score(score) => format!("{}\n", score),
        SwOutput::Matrix(grid) => {
            let (row, col) = grid.best_cell();
            format!(
                "{}score\t{}\nbest_cell\t{}\t{}\n",
                grid,
                grid.max_score(),
                row,
                col
            )
        }
    }
}

pub fn execute(config: &Config, args: ScoreArgs) -> Result<()> {
    let first = parse_sequence("first", &args.first)?;
    let second = parse_sequence("second", &args.second)?;
    let params = args.scoring(config.search.scoring());
    log::debug!("Scoring {} bp against {} bp with {:?}", first.len(), second.len(), params);

    print!("{}", render(&first, &second, &params, args.matrix));
    Ok(())
}
