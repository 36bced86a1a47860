//! # gale-oracle
//!
//! Stake-weighted attestation protocol for price data.
//!
//! A task is opened for a token pair; independent attestors sign the price
//! series they observed; a submission carrying those signatures is accepted
//! only if the signing attestors hold at least the configured fraction of
//! registered stake when the task was created. Accepted series become the
//! canonical price data for the pair.
//!
//! All state-mutating operations take `&mut self` and either apply fully or
//! leave every component unchanged.
//!
//! ## Modules
//!
//! - [`registry`]: task creation and lookup
//! - [`stake`]: attestor stake capability and an in-memory stake table
//! - [`quorum`]: submission verification
//! - [`store`]: latest verified commit per pair
//! - [`hub`]: atomic application of verified submissions
//! - [`config`]: quorum and attestor configuration

pub mod config;
pub mod hub;
pub mod quorum;
pub mod registry;
pub mod stake;
pub mod store;

pub use hub::OracleHub;
pub use quorum::{Attestation, QuorumFraction, QuorumVerifier, Submission};
pub use registry::OracleTaskRegistry;
pub use stake::{AttestorRegistry, StakeTable};
pub use store::PriceCommitStore;

use gale_types::{Height, TaskId, TokenPair, TypesError};

/// Error types for oracle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// The token pair could not be formed.
    #[error(transparent)]
    Pair(#[from] TypesError),

    /// Task identifiers are exhausted.
    #[error("task identifier space exhausted")]
    TaskIdsExhausted,

    /// No task with this identifier exists.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// The task has already been completed by an earlier submission.
    #[error("task {0} already completed")]
    TaskAlreadyCompleted(TaskId),

    /// The commit names a different pair than the task.
    #[error("pair mismatch: task is for {expected}, commit is for {actual}")]
    PairMismatch {
        /// Pair of the task.
        expected: TokenPair,
        /// Pair claimed by the commit.
        actual: TokenPair,
    },

    /// The commit carries no prices.
    #[error("price commit contains no prices")]
    EmptyPrices,

    /// The commit's observation height is zero.
    #[error("price commit observation height must be non-zero")]
    InvalidObservedAt,

    /// A signature in the bundle does not verify for its claimed attestor.
    #[error("invalid signature from attestor {attestor}")]
    InvalidSignature {
        /// Hex identity of the attestor.
        attestor: String,
    },

    /// Registered signing stake is below the quorum threshold.
    #[error("insufficient quorum: {signed} of {total} stake signed, need {numerator}/{denominator}")]
    InsufficientQuorum {
        /// Stake of registered attestors with valid signatures.
        signed: u64,
        /// Total registered stake at the task's creation height.
        total: u64,
        /// Quorum fraction numerator.
        numerator: u64,
        /// Quorum fraction denominator.
        denominator: u64,
    },

    /// The quorum fraction is not in `(0, 1]`.
    #[error("invalid quorum fraction: {0}")]
    InvalidQuorum(String),

    /// No verified commit exists for the pair.
    #[error("no price data for {0}")]
    NoData(TokenPair),

    /// The stored commit is older than the allowed age.
    #[error("stale price data: observed at {observed_at}, current {current}, max age {max_age}")]
    StaleCommit {
        /// Observation height of the stored commit.
        observed_at: Height,
        /// Height of the query.
        current: Height,
        /// Allowed age in height units.
        max_age: u64,
    },

    /// The stored commit claims an observation height after the query height.
    #[error("price data observed at {observed_at} is ahead of current height {current}")]
    FutureCommit {
        /// Observation height of the stored commit.
        observed_at: Height,
        /// Height of the query.
        current: Height,
    },
}

/// Convenience result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;
