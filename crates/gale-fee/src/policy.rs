//! Score → fee mapping.
//!
//! ```text
//! score <  1000          => base_fee
//! 1000 <= score <= 9000  => base_fee + (score - 1000) * (max_fee - base_fee) / 8000
//! score >  9000          => max_fee
//! ```
//!
//! Interpolation truncates toward zero in the fee's native unit. The mapping
//! is continuous at both knots and non-decreasing in the score.

use serde::{Deserialize, Serialize};

use gale_types::FEE_DENOMINATOR;

use crate::config::FeeConfig;
use crate::{FeeError, Result};

/// Scores below this charge the base fee.
pub const LOW_VOLATILITY_SCORE: u32 = 1_000;

/// Scores above this charge the maximum fee.
pub const HIGH_VOLATILITY_SCORE: u32 = 9_000;

/// Fee bounds for a pool, in hundredths of a basis point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    base_fee: u32,
    max_fee: u32,
}

impl FeePolicy {
    /// # Errors
    ///
    /// - [`FeeError::InvalidConfig`] if `base_fee > max_fee` or `max_fee` exceeds 100%
    pub fn new(base_fee: u32, max_fee: u32) -> Result<Self> {
        if base_fee > max_fee || max_fee > FEE_DENOMINATOR {
            return Err(FeeError::InvalidConfig(format!(
                "fee bounds [{base_fee}, {max_fee}] out of range"
            )));
        }
        Ok(Self { base_fee, max_fee })
    }

    pub fn from_config(config: &FeeConfig) -> Result<Self> {
        Self::new(config.base_fee, config.max_fee)
    }

    pub fn base_fee(&self) -> u32 {
        self.base_fee
    }

    pub fn max_fee(&self) -> u32 {
        self.max_fee
    }

    /// The fee for a volatility score.
    pub fn fee_for(&self, score: u32) -> u32 {
        if score < LOW_VOLATILITY_SCORE {
            return self.base_fee;
        }
        if score > HIGH_VOLATILITY_SCORE {
            return self.max_fee;
        }
        let span = u64::from(HIGH_VOLATILITY_SCORE - LOW_VOLATILITY_SCORE);
        let progress = u64::from(score - LOW_VOLATILITY_SCORE);
        let fee_range = u64::from(self.max_fee - self.base_fee);
        // progress <= span, so the increase never exceeds fee_range.
        self.base_fee + (progress * fee_range / span) as u32
    }

    /// Clamp an externally computed fee into this policy's bounds.
    pub fn clamp(&self, fee: u32) -> u32 {
        fee.clamp(self.base_fee, self.max_fee)
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            base_fee: gale_types::DEFAULT_BASE_FEE,
            max_fee: gale_types::DEFAULT_MAX_FEE,
        }
    }
}
