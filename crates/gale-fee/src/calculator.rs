//! Swappable fee calculation strategy.
//!
//! The controller delegates scoring and score → fee mapping to a
//! [`FeeCalculator`] that can be replaced at runtime. Replacing it only
//! affects future recomputations; committed pool state is left untouched.

use gale_types::Price;

use crate::policy::FeePolicy;
use crate::scorer::VolatilityScorer;
use crate::{FeeError, Result};

/// Strategy that turns a price window into a fee.
pub trait FeeCalculator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Volatility score of `prices` (oldest first), in `[0, 10000]`.
    fn volatility_score(&self, prices: &[Price]) -> u32;

    /// Fee recommended for `score` under `policy`.
    ///
    /// The controller clamps the result into the policy bounds.
    fn recommended_fee(&self, score: u32, policy: &FeePolicy) -> u32 {
        policy.fee_for(score)
    }

    /// Check the calculator's own parameters before it is installed.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// The default calculator: weighted variance / range / intensity scoring
/// with the piecewise-linear fee policy.
#[derive(Debug, Clone, Default)]
pub struct WeightedVolatilityCalculator {
    scorer: VolatilityScorer,
}

impl WeightedVolatilityCalculator {
    pub fn new(scorer: VolatilityScorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &VolatilityScorer {
        &self.scorer
    }
}

impl FeeCalculator for WeightedVolatilityCalculator {
    fn name(&self) -> &str {
        "weighted-volatility"
    }

    fn volatility_score(&self, prices: &[Price]) -> u32 {
        self.scorer.score(prices)
    }

    fn validate(&self) -> Result<()> {
        self.scorer
            .weights()
            .validate()
            .map_err(|e| FeeError::InvalidCalculator(e.to_string()))?;
        if self.scorer.reference_cv_bps() == 0 {
            return Err(FeeError::InvalidCalculator(
                "reference coefficient of variation is zero".to_string(),
            ));
        }
        Ok(())
    }
}
