//! Oracle configuration.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use gale_types::{AttestorId, Height};

use crate::quorum::QuorumFraction;
use crate::Result;

/// Quorum and attestor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_quorum_numerator")]
    pub quorum_numerator: u64,
    #[serde(default = "default_quorum_denominator")]
    pub quorum_denominator: u64,
    /// Maximum age of a commit for fresh reads, in height units. 0 = no limit.
    #[serde(default)]
    pub max_commit_age: u64,
    /// Initial stake table.
    #[serde(default)]
    pub attestors: Vec<AttestorEntry>,
}

/// One configured attestor.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestorEntry {
    /// Hex-encoded Ed25519 public key.
    #[serde_as(as = "serde_with::hex::Hex")]
    pub id: AttestorId,
    pub stake: u64,
    #[serde(default)]
    pub from_height: Height,
}

fn default_quorum_numerator() -> u64 {
    2
}

fn default_quorum_denominator() -> u64 {
    3
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            quorum_numerator: default_quorum_numerator(),
            quorum_denominator: default_quorum_denominator(),
            max_commit_age: 0,
            attestors: Vec::new(),
        }
    }
}

impl OracleConfig {
    /// The validated quorum fraction.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidQuorum`](crate::OracleError::InvalidQuorum) if the fraction is not in `(0, 1]`
    pub fn quorum(&self) -> Result<QuorumFraction> {
        QuorumFraction::new(self.quorum_numerator, self.quorum_denominator)
    }
}
