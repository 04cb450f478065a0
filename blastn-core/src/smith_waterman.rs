//! Smith-Waterman local alignment scoring
//!
//! Linear gap penalty, match/mismatch substitution. Used standalone and by
//! the extender as its per-step acceptance test, where only the score is
//! needed and the two-row mode avoids allocating the full matrix.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::seed::IndexedSequenceMap;
use crate::types::SequenceMap;

/// Substitution and gap weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringParams {
    /// Score for identical characters
    pub match_score: i32,
    /// Score for differing characters
    pub mismatch_score: i32,
    /// Score per gap character
    pub gap_score: i32,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -1,
            gap_score: -2,
        }
    }
}

impl ScoringParams {
    #[inline]
    fn substitution(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.match_score
        } else {
            self.mismatch_score
        }
    }
}

/// Full dynamic-programming grid of (|seq1|+1) x (|seq2|+1) cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<i32>,
}

impl ScoreMatrix {
    fn zeroed(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.cells[row * self.cols + col]
    }

    fn set(&mut self, row: usize, col: usize, value: i32) {
        self.cells[row * self.cols + col] = value;
    }

    /// Highest cell value; the local alignment score
    pub fn max_score(&self) -> i32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// First (row, col) holding the highest value, scanning row by row
    pub fn best_cell(&self) -> (usize, usize) {
        let mut best = (0, 0);
        let mut best_score = i32::MIN;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let value = self.get(row, col);
                if value > best_score {
                    best_score = value;
                    best = (row, col);
                }
            }
        }
        best
    }
}

impl fmt::Display for ScoreMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if col > 0 {
                    write!(f, "\t")?;
                }
                write!(f, "{}", self.get(row, col))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Output of the two-mode scoring entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwOutput {
    Score(i32),
    Matrix(ScoreMatrix),
}

impl SwOutput {
    pub fn score(&self) -> i32 {
        match self {
            SwOutput::Score(score) => *score,
            SwOutput::Matrix(matrix) => matrix.max_score(),
        }
    }

    pub fn matrix(&self) -> Option<&ScoreMatrix> {
        match self {
            SwOutput::Score(_) => None,
            SwOutput::Matrix(matrix) => Some(matrix),
        }
    }
}

/// Smith-Waterman scorer bound to a set of weights
#[derive(Debug, Clone, Copy, Default)]
pub struct SmithWaterman {
    params: ScoringParams,
}

impl SmithWaterman {
    pub fn new(params: ScoringParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ScoringParams {
        &self.params
    }

    /// Best local alignment score, keeping only two rows of the matrix.
    pub fn score(&self, seq1: &[u8], seq2: &[u8]) -> i32 {
        let cols = seq2.len() + 1;
        let mut prev = vec![0i32; cols];
        let mut curr = vec![0i32; cols];
        let mut best = 0i32;

        for &a in seq1 {
            curr[0] = 0;
            for j in 1..cols {
                let cell = self.cell(prev[j - 1], prev[j], curr[j - 1], a, seq2[j - 1]);
                curr[j] = cell;
                best = best.max(cell);
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        best
    }

    /// Score of `seq` against itself.
    ///
    /// With non-positive gap and mismatch weights no path can beat the main
    /// diagonal, so the score is read off directly instead of filling a
    /// quadratic grid.
    pub fn self_score(&self, seq: &[u8]) -> i32 {
        let p = &self.params;
        if p.gap_score <= 0 && p.mismatch_score <= p.match_score {
            diagonal_score(seq.len(), p.match_score)
        } else {
            self.score(seq, seq)
        }
    }

    /// Fill and return the full score matrix.
    pub fn matrix(&self, seq1: &[u8], seq2: &[u8]) -> ScoreMatrix {
        let mut matrix = ScoreMatrix::zeroed(seq1.len() + 1, seq2.len() + 1);

        for i in 1..matrix.rows() {
            for j in 1..matrix.cols() {
                let cell = self.cell(
                    matrix.get(i - 1, j - 1),
                    matrix.get(i - 1, j),
                    matrix.get(i, j - 1),
                    seq1[i - 1],
                    seq2[j - 1],
                );
                matrix.set(i, j, cell);
            }
        }

        matrix
    }

    #[inline]
    fn cell(&self, diag: i32, up: i32, left: i32, a: u8, b: u8) -> i32 {
        let substitution = diag + self.params.substitution(a, b);
        let from_up = up + self.params.gap_score;
        let from_left = left + self.params.gap_score;
        0i32.max(substitution).max(from_up).max(from_left)
    }
}

/// Score of `len` consecutive matches, saturating at `i32::MAX`
fn diagonal_score(len: usize, match_score: i32) -> i32 {
    i32::try_from(len)
        .unwrap_or(i32::MAX)
        .saturating_mul(match_score)
        .max(0)
}

/// Score `seq1` against `seq2`, returning either the score alone or the
/// score together with the full matrix.
pub fn smith_waterman(
    seq1: &[u8],
    seq2: &[u8],
    params: &ScoringParams,
    score_only: bool,
) -> SwOutput {
    let scorer = SmithWaterman::new(*params);
    if score_only {
        SwOutput::Score(scorer.score(seq1, seq2))
    } else {
        SwOutput::Matrix(scorer.matrix(seq1, seq2))
    }
}

/// Drop indexed sequences whose self-score is below `min_score`.
///
/// No local alignment against a sequence can score above the sequence's
/// score against itself, so a dropped entry could never yield an accepted
/// extension. Entries without a matching sequence are dropped as well.
pub fn smith_waterman_filter(
    indexed: IndexedSequenceMap,
    sequences: &SequenceMap,
    min_score: i32,
    params: &ScoringParams,
) -> IndexedSequenceMap {
    let scorer = SmithWaterman::new(*params);
    indexed
        .into_iter()
        .filter(|(name, _)| match sequences.get(name) {
            Some(seq) => scorer.self_score(seq.as_bytes()) >= min_score,
            None => {
                log::warn!("Indexed sequence {} has no source sequence", name);
                false
            }
        })
        .collect()
}
