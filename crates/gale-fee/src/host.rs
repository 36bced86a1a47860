//! Capability supplied by the hosting pool mechanism.

use std::collections::HashMap;

use gale_types::PoolId;

/// What the fee engine needs from the pool it controls.
pub trait FeeHost {
    /// Whether the pool accepts externally set fees.
    fn is_dynamic_fee(&self, pool_id: &PoolId) -> bool;

    /// Install `fee` as the pool's active fee.
    fn set_dynamic_fee(&mut self, pool_id: &PoolId, fee: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HostPool {
    dynamic_fee: bool,
    fee: u32,
}

/// In-process host that records the fee installed for each pool.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    pools: HashMap<PoolId, HostPool>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pool. Fixed-fee pools keep `fee` forever.
    pub fn register_pool(&mut self, pool_id: PoolId, dynamic_fee: bool, fee: u32) {
        self.pools.insert(pool_id, HostPool { dynamic_fee, fee });
    }

    /// The fee currently installed for `pool_id`.
    pub fn fee(&self, pool_id: &PoolId) -> Option<u32> {
        self.pools.get(pool_id).map(|p| p.fee)
    }
}

impl FeeHost for InMemoryHost {
    fn is_dynamic_fee(&self, pool_id: &PoolId) -> bool {
        self.pools.get(pool_id).is_some_and(|p| p.dynamic_fee)
    }

    fn set_dynamic_fee(&mut self, pool_id: &PoolId, fee: u32) {
        match self.pools.get_mut(pool_id) {
            Some(pool) if pool.dynamic_fee => pool.fee = fee,
            _ => tracing::warn!(
                pool = %hex::encode(pool_id),
                fee,
                "ignoring fee update for fixed-fee or unknown pool"
            ),
        }
    }
}
