//! Event records emitted by state transitions.
//!
//! These are returned to the caller of the transition that produced them;
//! delivery to subscribers is the host's concern.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{Height, PoolId, TaskId, TokenPair};

/// Emitted when a recomputation commits a new pool fee.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeChanged {
    #[serde_as(as = "serde_with::hex::Hex")]
    pub pool_id: PoolId,
    pub old_fee: u32,
    pub new_fee: u32,
    pub volatility_score: u32,
    pub height: Height,
}

/// Emitted when an oracle task is opened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCreated {
    pub task_id: TaskId,
    pub pair: TokenPair,
    pub height: Height,
}

/// Emitted when a quorum-backed submission completes a task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompleted {
    pub task_id: TaskId,
    pub pair: TokenPair,
    /// Stake that signed the accepted commit, at the task's creation height.
    pub signed_stake: u64,
    /// Total registered stake at the task's creation height.
    pub total_stake: u64,
}
