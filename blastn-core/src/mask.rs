//! Low-complexity masking
//!
//! DUST scoring of sequence regions. The search pipeline asks a
//! [`LowComplexity`] predicate about every shared seed word and drops words
//! that sit in repeat-driven, low-information sequence before pairing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::is_valid_nucleotide;

/// Errors that can occur during masking
#[derive(Debug, Error)]
pub enum MaskError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

pub type MaskResult<T> = Result<T, MaskError>;

/// Parameters for DUST masking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskParams {
    /// Enable low-complexity filtering
    pub enabled: bool,
    /// Regions scoring above this are low complexity
    pub dust_threshold: f64,
    /// Length of the patterns counted by the score
    pub dust_pattern_length: usize,
    /// Window size used when masking whole sequences
    pub window_size: usize,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            enabled: true,
            dust_threshold: 2.0,
            dust_pattern_length: 3,
            window_size: 64,
        }
    }
}

/// Predicate deciding whether a sequence region is low complexity
pub trait LowComplexity: Sync {
    fn is_low_complexity(&self, region: &[u8]) -> bool;
}

/// Filter that never reports low complexity
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMask;

impl LowComplexity for NoMask {
    fn is_low_complexity(&self, _region: &[u8]) -> bool {
        false
    }
}

/// DUST scorer and masker
#[derive(Debug, Clone)]
pub struct DustMasker {
    params: MaskParams,
}

impl DustMasker {
    pub fn new(params: MaskParams) -> MaskResult<Self> {
        if params.dust_pattern_length == 0 {
            return Err(MaskError::InvalidParams(
                "DUST pattern length must be at least 1".to_string(),
            ));
        }
        if !params.dust_threshold.is_finite() || params.dust_threshold < 0.0 {
            return Err(MaskError::InvalidParams(format!(
                "DUST threshold must be a non-negative number, got {}",
                params.dust_threshold
            )));
        }
        if params.window_size < params.dust_pattern_length {
            return Err(MaskError::InvalidParams(format!(
                "window size {} is shorter than the pattern length {}",
                params.window_size, params.dust_pattern_length
            )));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &MaskParams {
        &self.params
    }

    /// DUST score of `region`.
    ///
    /// Each pattern occurring `c` times contributes `c * (c - 1) / 2`; the sum
    /// is normalised by the number of patterns minus one. Patterns holding
    /// anything other than A, C, G or T are not counted.
    pub fn dust_score(&self, region: &[u8]) -> f64 {
        dust_score(region, self.params.dust_pattern_length)
    }

    /// Replace every low-complexity window of `sequence` with `N`.
    ///
    /// Windows are scored on the unmasked input so earlier masking does not
    /// influence later windows. Returns the number of bases masked.
    pub fn mask_sequence(&self, sequence: &mut [u8]) -> usize {
        let window = self.params.window_size;
        if !self.params.enabled || sequence.len() < window {
            return 0;
        }

        let original = sequence.to_vec();
        let mut masked = 0;
        for (start, region) in original.windows(window).enumerate() {
            if !self.is_low_complexity(region) {
                continue;
            }
            for base in &mut sequence[start..start + window] {
                if *base != b'N' {
                    *base = b'N';
                    masked += 1;
                }
            }
        }

        if masked > 0 {
            log::debug!("Masked {} low-complexity bases", masked);
        }
        masked
    }
}

impl LowComplexity for DustMasker {
    fn is_low_complexity(&self, region: &[u8]) -> bool {
        self.params.enabled && self.dust_score(region) > self.params.dust_threshold
    }
}

/// Stand-alone DUST predicate
pub fn is_low_complexity(region: &[u8], dust_threshold: f64, dust_pattern_length: usize) -> bool {
    dust_pattern_length > 0 && dust_score(region, dust_pattern_length) > dust_threshold
}

fn dust_score(region: &[u8], pattern_length: usize) -> f64 {
    if pattern_length == 0 || region.len() < pattern_length {
        return 0.0;
    }

    let mut counts: HashMap<&[u8], u32> = HashMap::new();
    for pattern in region.windows(pattern_length) {
        if pattern.iter().all(|&b| is_valid_nucleotide(b)) {
            *counts.entry(pattern).or_insert(0) += 1;
        }
    }

    let total: u32 = counts.values().sum();
    if total < 2 {
        return 0.0;
    }

    let sum: u64 = counts
        .values()
        .map(|&c| u64::from(c) * u64::from(c - 1) / 2)
        .sum();
    sum as f64 / f64::from(total - 1)
}
