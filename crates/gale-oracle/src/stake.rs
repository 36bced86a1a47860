//! Attestor stake and signature capability.
//!
//! The quorum verifier never reads stake directly; it goes through an
//! [`AttestorRegistry`] so the backing registry can be swapped without
//! touching protocol logic. [`StakeTable`] is the in-process implementation.

use std::collections::BTreeMap;

use gale_crypto::ed25519::{self, Signature};
use gale_types::{AttestorId, Height};

use crate::config::AttestorEntry;

/// Stake lookups and signature checks for attestors.
pub trait AttestorRegistry {
    /// Stake of `attestor` at `height`, or `None` if it is not registered then.
    fn stake_at(&self, attestor: &AttestorId, height: Height) -> Option<u64>;

    /// Sum of all registered stake at `height`.
    fn total_stake_at(&self, height: Height) -> u64;

    /// Whether `signature` over `message` verifies for `attestor`.
    fn verify(&self, attestor: &AttestorId, message: &[u8], signature: &Signature) -> bool {
        ed25519::verify_attestor(attestor, message, signature).is_ok()
    }
}

/// Height-versioned stake table.
///
/// Each attestor has a list of `(from_height, stake)` entries sorted by
/// height; the stake at a height is the last entry at or below it.
#[derive(Debug, Clone, Default)]
pub struct StakeTable {
    history: BTreeMap<AttestorId, Vec<(Height, u64)>>,
}

impl StakeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from configured entries.
    pub fn from_entries(entries: &[AttestorEntry]) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.set_stake(entry.id, entry.stake, entry.from_height);
        }
        table
    }

    /// Set `attestor`'s stake to `stake` from `from_height` onwards.
    ///
    /// Replaces any entry recorded for the same height.
    pub fn set_stake(&mut self, attestor: AttestorId, stake: u64, from_height: Height) {
        let entries = self.history.entry(attestor).or_default();
        match entries.binary_search_by_key(&from_height, |(h, _)| *h) {
            Ok(idx) => entries[idx].1 = stake,
            Err(idx) => entries.insert(idx, (from_height, stake)),
        }
        tracing::debug!(
            attestor = %hex::encode(attestor),
            stake,
            from_height,
            "attestor stake recorded"
        );
    }

    /// Number of attestors that have ever been registered.
    pub fn attestor_count(&self) -> usize {
        self.history.len()
    }
}

impl AttestorRegistry for StakeTable {
    fn stake_at(&self, attestor: &AttestorId, height: Height) -> Option<u64> {
        let entries = self.history.get(attestor)?;
        let idx = entries.partition_point(|(h, _)| *h <= height);
        idx.checked_sub(1).map(|i| entries[i].1)
    }

    fn total_stake_at(&self, height: Height) -> u64 {
        self.history
            .keys()
            .filter_map(|id| self.stake_at(id, height))
            .fold(0u64, u64::saturating_add)
    }
}
