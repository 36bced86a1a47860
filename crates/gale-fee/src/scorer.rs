//! Volatility scoring.
//!
//! The score is a weighted sum of three sub-scores, each clamped to
//! `[0, 10000]` before weighting:
//!
//! ```text
//! variance  = (var / mean^2) / reference_cv^2 * 10000
//! range     = (max - min) / min * 10000
//! intensity = mean(|p_i - p_{i-1}| / p_{i-1}) in bps * multiplier
//! score     = clamp(round(sum(w_k * term_k) / 10000), 0, 10000)
//! ```
//!
//! All arithmetic is integer. Deviations are taken relative to the mean
//! before squaring so that large fixed-point prices cannot overflow.

use gale_types::{Price, BPS_DENOMINATOR, MAX_VOLATILITY_SCORE};

use crate::config::{FeeConfig, ScorerWeights};

const PPM: u128 = 1_000_000;
const BPS: u128 = BPS_DENOMINATOR as u128;
const TERM_CAP: u128 = MAX_VOLATILITY_SCORE as u128;

/// Weighted volatility scorer over a price window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolatilityScorer {
    weights: ScorerWeights,
    reference_cv_bps: u32,
    intensity_multiplier: u32,
}

impl VolatilityScorer {
    pub fn new(weights: ScorerWeights, reference_cv_bps: u32, intensity_multiplier: u32) -> Self {
        Self {
            weights,
            reference_cv_bps,
            intensity_multiplier,
        }
    }

    pub fn from_config(config: &FeeConfig) -> Self {
        Self::new(
            config.weights,
            config.reference_cv_bps,
            config.intensity_multiplier,
        )
    }

    pub fn weights(&self) -> &ScorerWeights {
        &self.weights
    }

    pub fn reference_cv_bps(&self) -> u32 {
        self.reference_cv_bps
    }

    /// Score `prices` (oldest first) in `[0, 10000]`.
    ///
    /// Fewer than two samples carry no volatility information and score 0.
    pub fn score(&self, prices: &[Price]) -> u32 {
        if prices.len() < 2 {
            return 0;
        }
        let weighted = u128::from(self.weights.variance) * self.variance_term(prices)
            + u128::from(self.weights.range) * range_term(prices)
            + u128::from(self.weights.intensity) * self.intensity_term(prices);
        let rounded = (weighted + BPS / 2) / BPS;
        rounded.min(TERM_CAP) as u32
    }

    /// Population variance relative to the squared mean, normalized so that
    /// the reference coefficient of variation scores 10000.
    pub fn variance_term(&self, prices: &[Price]) -> u128 {
        let mean = mean(prices);
        if mean == 0 || self.reference_cv_bps == 0 {
            return 0;
        }
        let n = prices.len() as u128;
        // Squared relative deviation in ppm^2, i.e. units of 1e-12.
        let sum_sq = prices.iter().fold(0u128, |acc, p| {
            let dev_ppm = scaled_ratio(p.abs_diff(mean), mean, PPM);
            acc.saturating_add(dev_ppm.saturating_mul(dev_ppm))
        });
        let relative_variance = sum_sq / n;
        let reference_ppm = u128::from(self.reference_cv_bps) * (PPM / BPS);
        let reference_sq = reference_ppm * reference_ppm;
        (relative_variance.saturating_mul(BPS) / reference_sq).min(TERM_CAP)
    }

    /// Mean absolute step-to-step move in basis points, scaled by the
    /// intensity multiplier. Order sensitive.
    pub fn intensity_term(&self, prices: &[Price]) -> u128 {
        if prices.len() < 2 {
            return 0;
        }
        let total_bps = prices.windows(2).fold(0u128, |acc, pair| {
            acc.saturating_add(scaled_ratio(pair[1].abs_diff(pair[0]), pair[0], BPS))
        });
        let mean_bps = total_bps / (prices.len() as u128 - 1);
        mean_bps
            .saturating_mul(u128::from(self.intensity_multiplier))
            .min(TERM_CAP)
    }
}

impl Default for VolatilityScorer {
    fn default() -> Self {
        Self::from_config(&FeeConfig::default())
    }
}

/// Spread between the highest and lowest sample relative to the lowest.
pub fn range_term(prices: &[Price]) -> u128 {
    let (Some(min), Some(max)) = (prices.iter().min(), prices.iter().max()) else {
        return 0;
    };
    scaled_ratio(max - min, *min, BPS).min(TERM_CAP)
}

/// Arithmetic mean without intermediate overflow.
pub fn mean(prices: &[Price]) -> Price {
    if prices.is_empty() {
        return 0;
    }
    let n = prices.len() as u128;
    let (quotients, remainders) = prices
        .iter()
        .fold((0u128, 0u128), |(q, r), p| (q.saturating_add(p / n), r + p % n));
    quotients.saturating_add(remainders / n)
}

/// `num * scale / den`, saturating. A zero denominator with a non-zero
/// numerator is treated as unbounded.
fn scaled_ratio(num: u128, den: u128, scale: u128) -> u128 {
    if num == 0 {
        return 0;
    }
    if den == 0 {
        return u128::MAX;
    }
    match num.checked_mul(scale) {
        Some(scaled) => scaled / den,
        None => match den / scale {
            0 => u128::MAX,
            coarse => num / coarse,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_only() -> VolatilityScorer {
        VolatilityScorer::new(
            ScorerWeights {
                variance: 0,
                range: 10_000,
                intensity: 0,
            },
            500,
            10,
        )
    }

    #[test]
    fn test_degenerate_inputs_score_zero() {
        let scorer = VolatilityScorer::default();
        assert_eq!(scorer.score(&[]), 0);
        assert_eq!(scorer.score(&[1_000]), 0);
    }

    #[test]
    fn test_flat_prices_score_zero() {
        let scorer = VolatilityScorer::default();
        assert_eq!(scorer.score(&[1_000; 10]), 0);
    }

    #[test]
    fn test_range_term() {
        // (180 - 100) / 100 = 80% = 8000 bps
        assert_eq!(range_term(&[100, 180, 100, 180]), 8_000);
        assert_eq!(range_term(&[100, 500]), 10_000);
        assert_eq!(range_only().score(&[100, 180]), 8_000);
    }

    #[test]
    fn test_variance_term_at_reference_cv() {
        // mean 100, deviations +-5 => cv = 5% = 500 bps, the reference.
        let scorer = VolatilityScorer::default();
        assert_eq!(scorer.variance_term(&[95, 105, 95, 105]), 10_000);
        // cv = 2.5% => (0.025 / 0.05)^2 = 0.25
        assert_eq!(scorer.variance_term(&[9_750, 10_250]), 2_500);
    }

    #[test]
    fn test_intensity_term_is_order_sensitive() {
        let scorer = VolatilityScorer::default();
        // Steps: 100->101 (100 bps), 101->100 (99 bps), 100->101 (100 bps)
        let choppy = scorer.intensity_term(&[100, 101, 100, 101]);
        // Steps: 100->100, 100->101, 101->101
        let calm = scorer.intensity_term(&[100, 100, 101, 101]);
        assert_eq!(choppy, 990);
        assert_eq!(calm, 330);
    }

    #[test]
    fn test_weighted_sum_and_rounding() {
        let scorer = VolatilityScorer::default();
        let prices = [95, 105, 95, 105];
        let variance = scorer.variance_term(&prices);
        let range = range_term(&prices);
        let intensity = scorer.intensity_term(&prices);
        let expected = (4_000 * variance + 3_000 * range + 3_000 * intensity + 5_000) / 10_000;
        assert_eq!(u128::from(scorer.score(&prices)), expected.min(10_000));
    }

    #[test]
    fn test_score_bounded_for_varied_windows() {
        let windows: [&[Price]; 10] = [
            &[1, u128::MAX],
            &[u128::MAX, 1],
            &[u128::MAX, u128::MAX - 1, u128::MAX],
            &[0, 5, 0, 5],
            &[0, 0],
            &[1, 1],
            &[7, 7_000_000, 7, 7_000_000, 7],
            &[1_000, 1_001, 999, 1_000, 1_002, 998, 1_000, 1_000],
            &[10u128.pow(30), 1, 10u128.pow(30), 1],
            &[3, 1_000_000_000_000, 2, 50, u128::MAX / 2, 9],
        ];
        for scorer in [VolatilityScorer::default(), range_only()] {
            for window in windows {
                let score = scorer.score(window);
                assert!(score <= 10_000, "{window:?} scored {score}");
            }
        }
        let scorer = VolatilityScorer::default();
        assert_eq!(scorer.score(&[1, u128::MAX]), 10_000);
        assert_eq!(scorer.score(&[u128::MAX, u128::MAX - 1, u128::MAX]), 0);
    }

    #[test]
    fn test_monotone_under_dispersion_scaling() {
        let scorer = VolatilityScorer::default();
        // Each deviation vector sums to zero so the window mean stays fixed
        // while its dispersion grows with the factor.
        let cases: [(i128, &[i128]); 5] = [
            (1_000_000, &[-3_000, 1_000, 4_000, -2_000, 500, -500]),
            (1_000_000, &[-5_000, 5_000]),
            (1_000_000, &[-20_000, 5_000, 5_000, 5_000, 5_000]),
            (10_000, &[1, -1, 1, -1, 1, -1, 1, -1]),
            (10i128.pow(30), &[-2 * 10i128.pow(25), 3 * 10i128.pow(25), -10i128.pow(25)]),
        ];
        for (mean, deviations) in cases {
            let mut first = None;
            let mut last = 0;
            for factor in 1..=40 {
                let prices: Vec<Price> = deviations
                    .iter()
                    .map(|d| (mean + d * factor) as Price)
                    .collect();
                let score = scorer.score(&prices);
                assert!(
                    score >= last,
                    "mean {mean}, factor {factor}: {score} < {last}"
                );
                assert!(score <= 10_000);
                first.get_or_insert(score);
                last = score;
            }
            assert!(last > first.unwrap_or_default(), "mean {mean}: flat at {last}");
        }
    }

    #[test]
    fn test_mean_without_overflow() {
        assert_eq!(mean(&[u128::MAX, u128::MAX]), u128::MAX);
        assert_eq!(mean(&[1, 2]), 1);
        assert_eq!(mean(&[3, 3, 4]), 3);
    }
}
