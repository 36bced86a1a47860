//! Per-pool throttled fee state machine.
//!
//! Every price observation is pushed into the pool's window. The fee is
//! recomputed only once `update_threshold` height units have passed since the
//! last recomputation; otherwise the committed fee applies unchanged.
//!
//! `last_update_height` moves forward on every recomputation, whether or not
//! the fee changed, so the cooldown restarts each time the window is scored.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use gale_types::events::FeeChanged;
use gale_types::oracle::PriceCommit;
use gale_types::{Height, PoolId, Price, MAX_VOLATILITY_SCORE};

use crate::buffer::PriceSampleBuffer;
use crate::calculator::{FeeCalculator, WeightedVolatilityCalculator};
use crate::config::FeeConfig;
use crate::host::FeeHost;
use crate::policy::FeePolicy;
use crate::scorer::VolatilityScorer;
use crate::{pool_label, FeeError, Result};

/// Fee state for one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolState {
    samples: PriceSampleBuffer,
    last_update_height: Height,
    current_fee: u32,
    volatility_accumulator: u64,
    update_count: u64,
}

impl PoolState {
    fn new(window_size: usize, initial_price: Price, height: Height, fee: u32) -> Self {
        Self {
            samples: PriceSampleBuffer::new(window_size, initial_price),
            last_update_height: height,
            current_fee: fee,
            volatility_accumulator: 0,
            update_count: 0,
        }
    }

    pub fn samples(&self) -> &PriceSampleBuffer {
        &self.samples
    }

    pub fn last_update_height(&self) -> Height {
        self.last_update_height
    }

    pub fn current_fee(&self) -> u32 {
        self.current_fee
    }

    pub fn volatility_accumulator(&self) -> u64 {
        self.volatility_accumulator
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Mean of all scores since the last tracking reset, or 0 if none.
    pub fn average_volatility(&self) -> u32 {
        if self.update_count == 0 {
            return 0;
        }
        (self.volatility_accumulator / self.update_count) as u32
    }
}

/// Result of feeding one observation through the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Fee that applies to the in-flight operation.
    pub fee: u32,
    /// Score computed by this observation, if the cooldown had elapsed.
    pub volatility_score: Option<u32>,
    /// Set when the recomputation committed a different fee.
    pub fee_changed: Option<FeeChanged>,
}

impl Observation {
    pub fn recomputed(&self) -> bool {
        self.volatility_score.is_some()
    }
}

/// Owns the fee state of every pool it has initialized.
pub struct PoolFeeController {
    policy: FeePolicy,
    window_size: usize,
    update_threshold: u64,
    calculator: Arc<dyn FeeCalculator>,
    pools: HashMap<PoolId, PoolState>,
}

impl PoolFeeController {
    /// Build a controller using the default weighted calculator.
    ///
    /// # Errors
    ///
    /// - [`FeeError::InvalidConfig`] if `config` fails validation
    pub fn new(config: &FeeConfig) -> Result<Self> {
        config.validate()?;
        let calculator = WeightedVolatilityCalculator::new(VolatilityScorer::from_config(config));
        Ok(Self {
            policy: FeePolicy::from_config(config)?,
            window_size: config.price_window_size,
            update_threshold: config.update_threshold,
            calculator: Arc::new(calculator),
            pools: HashMap::new(),
        })
    }

    pub fn policy(&self) -> &FeePolicy {
        &self.policy
    }

    pub fn update_threshold(&self) -> u64 {
        self.update_threshold
    }

    pub fn calculator_name(&self) -> &str {
        self.calculator.name()
    }

    /// Replace the fee calculator used by future recomputations.
    ///
    /// # Errors
    ///
    /// - [`FeeError::InvalidCalculator`] if the calculator rejects its own
    ///   parameters; the current calculator stays installed
    pub fn set_calculator(&mut self, calculator: Arc<dyn FeeCalculator>) -> Result<()> {
        calculator.validate()?;
        tracing::info!(
            from = self.calculator.name(),
            to = calculator.name(),
            "fee calculator replaced"
        );
        self.calculator = calculator;
        Ok(())
    }

    /// Start tracking a pool at `initial_price` with the base fee.
    ///
    /// # Errors
    ///
    /// - [`FeeError::NotDynamicFee`] if the host pool has a fixed fee
    /// - [`FeeError::AlreadyInitialized`] if the pool is already tracked
    /// - [`FeeError::InvalidPrice`] if `initial_price` is zero
    pub fn initialize<H: FeeHost + ?Sized>(
        &mut self,
        host: &mut H,
        pool_id: PoolId,
        height: Height,
        initial_price: Price,
    ) -> Result<()> {
        if !host.is_dynamic_fee(&pool_id) {
            return Err(FeeError::NotDynamicFee(pool_label(&pool_id)));
        }
        if self.pools.contains_key(&pool_id) {
            return Err(FeeError::AlreadyInitialized(pool_label(&pool_id)));
        }
        if initial_price == 0 {
            return Err(FeeError::InvalidPrice(initial_price));
        }

        let fee = self.policy.base_fee();
        self.pools.insert(
            pool_id,
            PoolState::new(self.window_size, initial_price, height, fee),
        );
        host.set_dynamic_fee(&pool_id, fee);

        tracing::info!(
            pool = %pool_label(&pool_id),
            height,
            initial_price,
            fee,
            "pool fee tracking initialized"
        );
        Ok(())
    }

    /// Record a price observed before a trade and recompute the fee if the
    /// cooldown has elapsed. Returns the fee for the in-flight trade.
    ///
    /// # Errors
    ///
    /// - [`FeeError::PoolNotFound`] if the pool was never initialized
    /// - [`FeeError::InvalidPrice`] if `price` is zero
    pub fn before_swap<H: FeeHost + ?Sized>(
        &mut self,
        host: &mut H,
        pool_id: &PoolId,
        height: Height,
        price: Price,
    ) -> Result<Observation> {
        if price == 0 {
            return Err(FeeError::InvalidPrice(price));
        }
        let state = self
            .pools
            .get_mut(pool_id)
            .ok_or_else(|| FeeError::PoolNotFound(pool_label(pool_id)))?;

        state.samples.push(price);

        if height < state.last_update_height.saturating_add(self.update_threshold) {
            tracing::debug!(
                pool = %pool_label(pool_id),
                height,
                last_update = state.last_update_height,
                "fee recomputation throttled"
            );
            return Ok(Observation {
                fee: state.current_fee,
                volatility_score: None,
                fee_changed: None,
            });
        }

        let window = state.samples.snapshot();
        let score = self
            .calculator
            .volatility_score(&window)
            .min(MAX_VOLATILITY_SCORE);
        let new_fee = self
            .policy
            .clamp(self.calculator.recommended_fee(score, &self.policy));

        state.volatility_accumulator = state.volatility_accumulator.saturating_add(u64::from(score));
        state.update_count += 1;
        state.last_update_height = height;

        let mut fee_changed = None;
        if new_fee != state.current_fee {
            let event = FeeChanged {
                pool_id: *pool_id,
                old_fee: state.current_fee,
                new_fee,
                volatility_score: score,
                height,
            };
            state.current_fee = new_fee;
            host.set_dynamic_fee(pool_id, new_fee);
            tracing::info!(
                pool = %pool_label(pool_id),
                old_fee = event.old_fee,
                new_fee,
                score,
                height,
                "pool fee updated"
            );
            fee_changed = Some(event);
        } else {
            tracing::debug!(pool = %pool_label(pool_id), score, fee = new_fee, "fee unchanged");
        }

        Ok(Observation {
            fee: state.current_fee,
            volatility_score: Some(score),
            fee_changed,
        })
    }

    /// Feed the newest price of a verified oracle commit into a pool, through
    /// the same throttled transition as a trade observation.
    ///
    /// # Errors
    ///
    /// - [`FeeError::EmptyCommit`] if the commit has no prices
    /// - any error of [`before_swap`](Self::before_swap)
    pub fn ingest_commit<H: FeeHost + ?Sized>(
        &mut self,
        host: &mut H,
        pool_id: &PoolId,
        height: Height,
        commit: &PriceCommit,
    ) -> Result<Observation> {
        let price = commit.latest_price().ok_or(FeeError::EmptyCommit)?;
        self.before_swap(host, pool_id, height, price)
    }

    /// Zero the volatility accumulator and update count. The fee, window and
    /// cooldown are left untouched.
    ///
    /// # Errors
    ///
    /// - [`FeeError::PoolNotFound`] if the pool was never initialized
    pub fn reset_tracking(&mut self, pool_id: &PoolId) -> Result<()> {
        let state = self
            .pools
            .get_mut(pool_id)
            .ok_or_else(|| FeeError::PoolNotFound(pool_label(pool_id)))?;
        state.volatility_accumulator = 0;
        state.update_count = 0;
        tracing::info!(pool = %pool_label(pool_id), "volatility tracking reset");
        Ok(())
    }

    /// Read-only view of a pool's fee state.
    pub fn pool_state(&self, pool_id: &PoolId) -> Option<&PoolState> {
        self.pools.get(pool_id)
    }

    /// The committed fee of a pool.
    pub fn current_fee(&self, pool_id: &PoolId) -> Result<u32> {
        self.state(pool_id).map(PoolState::current_fee)
    }

    /// Time-averaged volatility score of a pool since its last reset.
    pub fn average_volatility(&self, pool_id: &PoolId) -> Result<u32> {
        self.state(pool_id).map(PoolState::average_volatility)
    }

    fn state(&self, pool_id: &PoolId) -> Result<&PoolState> {
        self.pools
            .get(pool_id)
            .ok_or_else(|| FeeError::PoolNotFound(pool_label(pool_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScorerWeights;
    use crate::host::InMemoryHost;

    const POOL: PoolId = [7u8; 32];

    /// Always reports the same score.
    struct FixedScore(u32);

    impl FeeCalculator for FixedScore {
        fn name(&self) -> &str {
            "fixed"
        }

        fn volatility_score(&self, _prices: &[Price]) -> u32 {
            self.0
        }
    }

    struct Rejecting;

    impl FeeCalculator for Rejecting {
        fn name(&self) -> &str {
            "rejecting"
        }

        fn volatility_score(&self, _prices: &[Price]) -> u32 {
            0
        }

        fn validate(&self) -> Result<()> {
            Err(FeeError::InvalidCalculator("unusable".to_string()))
        }
    }

    /// Returns a fee far outside any policy.
    struct Runaway;

    impl FeeCalculator for Runaway {
        fn name(&self) -> &str {
            "runaway"
        }

        fn volatility_score(&self, _prices: &[Price]) -> u32 {
            10_000
        }

        fn recommended_fee(&self, _score: u32, _policy: &FeePolicy) -> u32 {
            u32::MAX
        }
    }

    fn setup() -> (PoolFeeController, InMemoryHost) {
        let mut host = InMemoryHost::new();
        host.register_pool(POOL, true, 0);
        let mut controller = PoolFeeController::new(&FeeConfig::default()).expect("controller");
        controller
            .initialize(&mut host, POOL, 100, 1_000)
            .expect("initialize");
        (controller, host)
    }

    #[test]
    fn test_initialize_sets_base_fee() {
        let (controller, host) = setup();
        let state = controller.pool_state(&POOL).expect("state");
        assert_eq!(state.current_fee(), 3_000);
        assert_eq!(state.last_update_height(), 100);
        assert_eq!(state.samples().snapshot(), vec![1_000; 10]);
        assert_eq!(host.fee(&POOL), Some(3_000));
        assert_eq!(controller.average_volatility(&POOL), Ok(0));
    }

    #[test]
    fn test_initialize_rejects_fixed_fee_pool() {
        let mut host = InMemoryHost::new();
        host.register_pool(POOL, false, 3_000);
        let mut controller = PoolFeeController::new(&FeeConfig::default()).expect("controller");
        let err = controller
            .initialize(&mut host, POOL, 1, 1_000)
            .expect_err("fixed fee");
        assert!(matches!(err, FeeError::NotDynamicFee(_)));
        assert!(controller.pool_state(&POOL).is_none());
    }

    #[test]
    fn test_initialize_twice_rejected() {
        let (mut controller, mut host) = setup();
        let err = controller
            .initialize(&mut host, POOL, 200, 5)
            .expect_err("second init");
        assert!(matches!(err, FeeError::AlreadyInitialized(_)));
        assert_eq!(controller.pool_state(&POOL).map(|s| s.last_update_height()), Some(100));
    }

    #[test]
    fn test_zero_price_rejected_without_mutation() {
        let (mut controller, mut host) = setup();
        let before = controller.pool_state(&POOL).cloned();
        let err = controller
            .before_swap(&mut host, &POOL, 500, 0)
            .expect_err("zero price");
        assert_eq!(err, FeeError::InvalidPrice(0));
        assert_eq!(controller.pool_state(&POOL).cloned(), before);
    }

    #[test]
    fn test_unknown_pool() {
        let (mut controller, mut host) = setup();
        let err = controller
            .before_swap(&mut host, &[9u8; 32], 500, 10)
            .expect_err("unknown");
        assert!(matches!(err, FeeError::PoolNotFound(_)));
    }

    #[test]
    fn test_throttled_observations_only_sample() {
        let (mut controller, mut host) = setup();
        controller
            .set_calculator(Arc::new(FixedScore(10_000)))
            .expect("calculator");
        for (i, height) in (101..120).enumerate() {
            let obs = controller
                .before_swap(&mut host, &POOL, height, 2_000 + i as u128)
                .expect("observe");
            assert!(!obs.recomputed());
            assert_eq!(obs.fee, 3_000);
        }
        let state = controller.pool_state(&POOL).expect("state");
        assert_eq!(state.current_fee(), 3_000);
        assert_eq!(state.update_count(), 0);
        assert_eq!(state.last_update_height(), 100);
        assert_eq!(state.samples().latest(), 2_018);
    }

    #[test]
    fn test_recompute_at_threshold_commits_fee() {
        let (mut controller, mut host) = setup();
        controller
            .set_calculator(Arc::new(FixedScore(8_000)))
            .expect("calculator");
        let obs = controller
            .before_swap(&mut host, &POOL, 120, 1_000)
            .expect("observe");
        assert_eq!(obs.volatility_score, Some(8_000));
        assert_eq!(obs.fee, 9_125);
        let event = obs.fee_changed.expect("fee changed");
        assert_eq!(event.old_fee, 3_000);
        assert_eq!(event.new_fee, 9_125);
        assert_eq!(host.fee(&POOL), Some(9_125));
        assert_eq!(controller.average_volatility(&POOL), Ok(8_000));
    }

    #[test]
    fn test_unchanged_fee_still_restarts_cooldown() {
        let (mut controller, mut host) = setup();
        let obs = controller
            .before_swap(&mut host, &POOL, 130, 1_000)
            .expect("observe");
        assert!(obs.recomputed());
        assert!(obs.fee_changed.is_none());
        let state = controller.pool_state(&POOL).expect("state");
        assert_eq!(state.last_update_height(), 130);
        assert_eq!(state.update_count(), 1);

        let obs = controller
            .before_swap(&mut host, &POOL, 149, 1_000)
            .expect("observe");
        assert!(!obs.recomputed());
    }

    #[test]
    fn test_height_regression_never_recomputes() {
        let (mut controller, mut host) = setup();
        let obs = controller
            .before_swap(&mut host, &POOL, 5, 1_000)
            .expect("observe");
        assert!(!obs.recomputed());
        assert_eq!(controller.pool_state(&POOL).map(|s| s.last_update_height()), Some(100));
    }

    #[test]
    fn test_reset_tracking_preserves_fee_and_window() {
        let (mut controller, mut host) = setup();
        controller
            .set_calculator(Arc::new(FixedScore(5_000)))
            .expect("calculator");
        controller
            .before_swap(&mut host, &POOL, 120, 1_100)
            .expect("observe");
        let before = controller.pool_state(&POOL).cloned().expect("state");
        assert_eq!(before.average_volatility(), 5_000);

        controller.reset_tracking(&POOL).expect("reset");
        let after = controller.pool_state(&POOL).expect("state");
        assert_eq!(after.average_volatility(), 0);
        assert_eq!(after.update_count(), 0);
        assert_eq!(after.volatility_accumulator(), 0);
        assert_eq!(after.current_fee(), before.current_fee());
        assert_eq!(after.samples(), before.samples());
        assert_eq!(after.last_update_height(), before.last_update_height());
    }

    #[test]
    fn test_average_volatility_over_updates() {
        let (mut controller, mut host) = setup();
        controller
            .set_calculator(Arc::new(FixedScore(2_000)))
            .expect("calculator");
        controller.before_swap(&mut host, &POOL, 120, 1_000).expect("first");
        controller
            .set_calculator(Arc::new(FixedScore(5_000)))
            .expect("calculator");
        controller.before_swap(&mut host, &POOL, 140, 1_000).expect("second");
        assert_eq!(controller.average_volatility(&POOL), Ok(3_500));
    }

    #[test]
    fn test_invalid_calculator_keeps_previous() {
        let (mut controller, _host) = setup();
        let err = controller
            .set_calculator(Arc::new(Rejecting))
            .expect_err("rejected");
        assert!(matches!(err, FeeError::InvalidCalculator(_)));
        assert_eq!(controller.calculator_name(), "weighted-volatility");
    }

    #[test]
    fn test_calculator_swap_leaves_state_untouched() {
        let (mut controller, _host) = setup();
        let before = controller.pool_state(&POOL).cloned();
        controller
            .set_calculator(Arc::new(FixedScore(9_999)))
            .expect("calculator");
        assert_eq!(controller.pool_state(&POOL).cloned(), before);
    }

    #[test]
    fn test_calculator_output_clamped_to_policy() {
        let (mut controller, mut host) = setup();
        controller
            .set_calculator(Arc::new(Runaway))
            .expect("calculator");
        let obs = controller
            .before_swap(&mut host, &POOL, 120, 1_000)
            .expect("observe");
        assert_eq!(obs.fee, 10_000);
    }

    #[test]
    fn test_calculator_score_clamped_to_scale() {
        let (mut controller, mut host) = setup();
        controller
            .set_calculator(Arc::new(FixedScore(u32::MAX)))
            .expect("calculator");
        let obs = controller
            .before_swap(&mut host, &POOL, 120, 1_000)
            .expect("observe");
        assert_eq!(obs.volatility_score, Some(MAX_VOLATILITY_SCORE));
        let event = obs.fee_changed.expect("fee changed");
        assert_eq!(event.volatility_score, MAX_VOLATILITY_SCORE);
        assert_eq!(controller.average_volatility(&POOL), Ok(MAX_VOLATILITY_SCORE));
    }

    #[test]
    fn test_real_scorer_drives_fee_up() {
        let config = FeeConfig {
            weights: ScorerWeights {
                variance: 0,
                range: 10_000,
                intensity: 0,
            },
            ..FeeConfig::default()
        };
        let mut host = InMemoryHost::new();
        host.register_pool(POOL, true, 0);
        let mut controller = PoolFeeController::new(&config).expect("controller");
        controller.initialize(&mut host, POOL, 0, 100).expect("init");
        for height in 1..=20u64 {
            let price = if height % 2 == 0 { 180 } else { 100 };
            controller
                .before_swap(&mut host, &POOL, height, price)
                .expect("observe");
        }
        assert_eq!(controller.current_fee(&POOL), Ok(9_125));
    }

    #[test]
    fn test_ingest_commit_samples_latest_price() {
        let (mut controller, mut host) = setup();
        let commit = PriceCommit {
            pair: gale_types::TokenPair::new([1u8; 32], [2u8; 32]).expect("pair"),
            prices: vec![900, 950, 1_250],
            observed_at: 10,
        };
        controller
            .ingest_commit(&mut host, &POOL, 101, &commit)
            .expect("ingest");
        assert_eq!(
            controller.pool_state(&POOL).map(|s| s.samples().latest()),
            Some(1_250)
        );

        let empty = PriceCommit {
            prices: Vec::new(),
            ..commit
        };
        assert_eq!(
            controller.ingest_commit(&mut host, &POOL, 102, &empty),
            Err(FeeError::EmptyCommit)
        );
    }
}
