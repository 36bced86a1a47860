//! Fee engine parameters.

use serde::{Deserialize, Serialize};

use gale_types::{BPS_DENOMINATOR, DEFAULT_BASE_FEE, DEFAULT_MAX_FEE, FEE_DENOMINATOR};

use crate::buffer::DEFAULT_WINDOW_SIZE;
use crate::{FeeError, Result};

/// Default cooldown between recomputations, in height units.
pub const DEFAULT_UPDATE_THRESHOLD: u64 = 20;

/// Coefficient of variation (in basis points) that maps to a full variance term.
pub const DEFAULT_REFERENCE_CV_BPS: u32 = 500;

/// Multiplier applied to the mean per-step move (in basis points).
pub const DEFAULT_INTENSITY_MULTIPLIER: u32 = 10;

/// Tunable fee engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Fee applied at low volatility, in hundredths of a basis point.
    #[serde(default = "default_base_fee")]
    pub base_fee: u32,
    /// Fee applied at high volatility, in hundredths of a basis point.
    #[serde(default = "default_max_fee")]
    pub max_fee: u32,
    /// Number of samples kept per pool.
    #[serde(default = "default_window_size")]
    pub price_window_size: usize,
    /// Height units that must elapse between recomputations.
    #[serde(default = "default_update_threshold")]
    pub update_threshold: u64,
    /// Scorer weights in basis points.
    #[serde(default)]
    pub weights: ScorerWeights,
    #[serde(default = "default_reference_cv_bps")]
    pub reference_cv_bps: u32,
    #[serde(default = "default_intensity_multiplier")]
    pub intensity_multiplier: u32,
}

/// Relative weights of the three volatility sub-scores, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerWeights {
    pub variance: u32,
    pub range: u32,
    pub intensity: u32,
}

impl ScorerWeights {
    pub fn total(&self) -> u64 {
        u64::from(self.variance) + u64::from(self.range) + u64::from(self.intensity)
    }

    /// Weights must sum to exactly 10000 (100%).
    pub fn validate(&self) -> Result<()> {
        if self.total() != u64::from(BPS_DENOMINATOR) {
            return Err(FeeError::InvalidConfig(format!(
                "scorer weights sum to {}, expected {BPS_DENOMINATOR}",
                self.total()
            )));
        }
        Ok(())
    }
}

impl Default for ScorerWeights {
    fn default() -> Self {
        Self {
            variance: 4_000,
            range: 3_000,
            intensity: 3_000,
        }
    }
}

fn default_base_fee() -> u32 {
    DEFAULT_BASE_FEE
}

fn default_max_fee() -> u32 {
    DEFAULT_MAX_FEE
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_update_threshold() -> u64 {
    DEFAULT_UPDATE_THRESHOLD
}

fn default_reference_cv_bps() -> u32 {
    DEFAULT_REFERENCE_CV_BPS
}

fn default_intensity_multiplier() -> u32 {
    DEFAULT_INTENSITY_MULTIPLIER
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            base_fee: default_base_fee(),
            max_fee: default_max_fee(),
            price_window_size: default_window_size(),
            update_threshold: default_update_threshold(),
            weights: ScorerWeights::default(),
            reference_cv_bps: default_reference_cv_bps(),
            intensity_multiplier: default_intensity_multiplier(),
        }
    }
}

impl FeeConfig {
    /// Check every parameter against its allowed range.
    ///
    /// # Errors
    ///
    /// - [`FeeError::InvalidConfig`] naming the first offending parameter
    pub fn validate(&self) -> Result<()> {
        if self.base_fee > self.max_fee {
            return Err(FeeError::InvalidConfig(format!(
                "base_fee {} exceeds max_fee {}",
                self.base_fee, self.max_fee
            )));
        }
        if self.max_fee > FEE_DENOMINATOR {
            return Err(FeeError::InvalidConfig(format!(
                "max_fee {} exceeds 100% ({FEE_DENOMINATOR})",
                self.max_fee
            )));
        }
        if self.price_window_size < 2 {
            return Err(FeeError::InvalidConfig(format!(
                "price_window_size {} must be at least 2",
                self.price_window_size
            )));
        }
        if self.reference_cv_bps == 0 {
            return Err(FeeError::InvalidConfig(
                "reference_cv_bps must be non-zero".to_string(),
            ));
        }
        self.weights.validate()
    }
}
