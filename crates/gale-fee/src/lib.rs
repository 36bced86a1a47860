//! # gale-fee
//!
//! Volatility-adaptive fee engine.
//!
//! Each pool keeps a rolling window of recent prices. Every observation is
//! pushed into the window; once the cooldown (measured in caller-supplied
//! height units) has elapsed, the window is scored for volatility and the
//! score is mapped to a fee between the configured base and maximum.
//!
//! ## Modules
//!
//! - [`buffer`]: fixed-capacity circular price window
//! - [`scorer`]: bounded volatility score in `[0, 10000]`
//! - [`policy`]: piecewise-linear score → fee mapping
//! - [`calculator`]: swappable scoring strategy
//! - [`controller`]: per-pool throttled fee state machine
//! - [`host`]: capability supplied by the hosting pool
//! - [`config`]: tunable parameters

pub mod buffer;
pub mod calculator;
pub mod config;
pub mod controller;
pub mod host;
pub mod policy;
pub mod scorer;

pub use config::FeeConfig;
pub use controller::{Observation, PoolFeeController, PoolState};
pub use host::FeeHost;

/// Error types for fee engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeeError {
    /// The host pool has a fixed fee and cannot be driven by this engine.
    #[error("pool {0} is not configured for dynamic fees")]
    NotDynamicFee(String),

    /// The pool already has fee state.
    #[error("pool {0} is already initialized")]
    AlreadyInitialized(String),

    /// No fee state exists for the pool.
    #[error("pool {0} not found")]
    PoolNotFound(String),

    /// Prices must be strictly positive.
    #[error("invalid price: {0}")]
    InvalidPrice(u128),

    /// A price commit carried no prices to ingest.
    #[error("price commit contains no prices")]
    EmptyCommit,

    /// A configuration value is out of range.
    #[error("invalid fee configuration: {0}")]
    InvalidConfig(String),

    /// The fee calculator rejected its own parameters.
    #[error("invalid fee calculator: {0}")]
    InvalidCalculator(String),
}

/// Convenience result type for fee engine operations.
pub type Result<T> = std::result::Result<T, FeeError>;

pub(crate) fn pool_label(pool_id: &gale_types::PoolId) -> String {
    hex::encode(pool_id)
}
