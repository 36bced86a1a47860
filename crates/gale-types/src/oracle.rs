//! Oracle request and attestation payload types.

use serde::{Deserialize, Serialize};

use crate::{Height, Price, TaskId, TokenPair};

/// Lifecycle of an oracle task. Only these two states exist in the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Completed,
}

/// A single outstanding request for price data on one token pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub pair: TokenPair,
    pub status: TaskStatus,
    pub created_at_height: Height,
}

impl Task {
    pub fn is_open(&self) -> bool {
        self.status == TaskStatus::Open
    }
}

/// A price series claimed by attestors for one token pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCommit {
    pub pair: TokenPair,
    /// Ordered oldest to newest; must be non-empty to be accepted.
    pub prices: Vec<Price>,
    /// Observation height reported by the attestors; must be non-zero.
    pub observed_at: Height,
}

impl PriceCommit {
    /// The most recent price in the series, if any.
    pub fn latest_price(&self) -> Option<Price> {
        self.prices.last().copied()
    }
}
