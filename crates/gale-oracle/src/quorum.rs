//! Quorum verification of attestation bundles.
//!
//! A submission is checked in a fixed order, each failure a distinct error:
//!
//! 1. the task exists and is open
//! 2. the commit's pair is the task's pair
//! 3. the commit has prices and a non-zero observation height
//! 4. every signature verifies for its claimed attestor
//! 5. registered signers hold at least the quorum fraction of total stake
//!
//! Verification reads state only. Stake is evaluated at the height the task
//! was created, never at a height chosen by the submitter. Signatures from
//! attestors that are not registered at that height verify but carry no
//! weight, and an attestor listed more than once is counted once.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use gale_crypto::commit;
use gale_crypto::ed25519::{KeyPair, Signature};
use gale_types::oracle::PriceCommit;
use gale_types::{AttestorId, TaskId};

use crate::registry::OracleTaskRegistry;
use crate::stake::AttestorRegistry;
use crate::{OracleError, Result};

/// Fraction of total stake that must sign, in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumFraction {
    numerator: u64,
    denominator: u64,
}

impl QuorumFraction {
    /// # Errors
    ///
    /// - [`OracleError::InvalidQuorum`] unless `0 < numerator <= denominator`
    pub fn new(numerator: u64, denominator: u64) -> Result<Self> {
        if numerator == 0 || denominator == 0 || numerator > denominator {
            return Err(OracleError::InvalidQuorum(format!(
                "{numerator}/{denominator}"
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn two_thirds() -> Self {
        Self {
            numerator: 2,
            denominator: 3,
        }
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// `signed / total >= numerator / denominator`, with no stake never meeting it.
    pub fn is_met(&self, signed: u64, total: u64) -> bool {
        total > 0
            && u128::from(signed) * u128::from(self.denominator)
                >= u128::from(total) * u128::from(self.numerator)
    }
}

/// One attestor's signature over a commit digest.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    #[serde_as(as = "serde_with::hex::Hex")]
    pub attestor: AttestorId,
    #[serde_as(as = "serde_with::hex::Hex")]
    pub signature: [u8; 64],
}

impl Attestation {
    /// Sign `price_commit` for `task_id` with `keypair`.
    pub fn sign(keypair: &KeyPair, task_id: TaskId, price_commit: &PriceCommit) -> Self {
        Self {
            attestor: keypair.attestor_id(),
            signature: commit::sign(&keypair.signing_key, task_id, price_commit).to_bytes(),
        }
    }
}

/// A candidate commit and the signatures backing it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub task_id: TaskId,
    pub commit: PriceCommit,
    pub attestations: Vec<Attestation>,
}

/// Stake tally of an accepted submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuorumReport {
    pub signed_stake: u64,
    pub total_stake: u64,
    /// Registered attestors whose stake was counted.
    pub signers: Vec<AttestorId>,
    /// Valid signatures from attestors with no registration at the task's height.
    pub unregistered: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuorumVerifier {
    quorum: QuorumFraction,
}

impl QuorumVerifier {
    pub fn new(quorum: QuorumFraction) -> Self {
        Self { quorum }
    }

    pub fn quorum(&self) -> QuorumFraction {
        self.quorum
    }

    /// Run every check against `submission` with stake evaluated at the
    /// task's creation height.
    pub fn verify<R: AttestorRegistry + ?Sized>(
        &self,
        tasks: &OracleTaskRegistry,
        attestors: &R,
        submission: &Submission,
    ) -> Result<QuorumReport> {
        let task_id = submission.task_id;
        let candidate = &submission.commit;

        let task = tasks
            .get_task(task_id)
            .ok_or(OracleError::TaskNotFound(task_id))?;
        if !task.is_open() {
            return Err(OracleError::TaskAlreadyCompleted(task_id));
        }

        if candidate.pair != task.pair {
            return Err(OracleError::PairMismatch {
                expected: task.pair,
                actual: candidate.pair,
            });
        }

        if candidate.prices.is_empty() {
            return Err(OracleError::EmptyPrices);
        }
        if candidate.observed_at == 0 {
            return Err(OracleError::InvalidObservedAt);
        }

        let reference_height = task.created_at_height;
        let digest = commit::digest(task_id, candidate);
        for attestation in &submission.attestations {
            let signature = Signature::from_bytes(&attestation.signature);
            if !attestors.verify(&attestation.attestor, &digest, &signature) {
                return Err(OracleError::InvalidSignature {
                    attestor: hex::encode(attestation.attestor),
                });
            }
        }

        let unique: BTreeSet<AttestorId> = submission
            .attestations
            .iter()
            .map(|a| a.attestor)
            .collect();
        let mut signed_stake = 0u64;
        let mut signers = Vec::with_capacity(unique.len());
        let mut unregistered = 0usize;
        for attestor in unique {
            match attestors.stake_at(&attestor, reference_height) {
                Some(stake) => {
                    signed_stake = signed_stake.saturating_add(stake);
                    signers.push(attestor);
                }
                None => unregistered += 1,
            }
        }
        let total_stake = attestors.total_stake_at(reference_height);

        tracing::debug!(
            task_id,
            signed_stake,
            total_stake,
            signers = signers.len(),
            unregistered,
            reference_height,
            "quorum tally"
        );

        if !self.quorum.is_met(signed_stake, total_stake) {
            return Err(OracleError::InsufficientQuorum {
                signed: signed_stake,
                total: total_stake,
                numerator: self.quorum.numerator,
                denominator: self.quorum.denominator,
            });
        }

        Ok(QuorumReport {
            signed_stake,
            total_stake,
            signers,
            unregistered,
        })
    }
}
