//! Oracle hub: owns the task registry and commit store and applies
//! verified submissions.
//!
//! A submission is verified against a read-only view of the hub first; only
//! if every check passes is the task completed and the commit stored. Any
//! failure leaves the task open and the store unchanged. Racing submissions
//! for the same task are ordered by the caller, and the first accepted one
//! wins.

use gale_types::events::{TaskCompleted, TaskCreated};
use gale_types::oracle::Task;
use gale_types::{AssetId, Height, TaskId, TokenPair};

use crate::config::OracleConfig;
use crate::quorum::{QuorumFraction, QuorumVerifier, Submission};
use crate::registry::OracleTaskRegistry;
use crate::stake::{AttestorRegistry, StakeTable};
use crate::store::{PriceCommitStore, StoredCommit};
use crate::Result;

pub struct OracleHub<R: AttestorRegistry> {
    tasks: OracleTaskRegistry,
    store: PriceCommitStore,
    verifier: QuorumVerifier,
    attestors: R,
    max_commit_age: u64,
}

impl OracleHub<StakeTable> {
    /// Build a hub whose stake table is seeded from configuration.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidQuorum`](crate::OracleError::InvalidQuorum) if the configured fraction is invalid
    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        let mut hub = Self::new(config.quorum()?, StakeTable::from_entries(&config.attestors));
        hub.max_commit_age = config.max_commit_age;
        Ok(hub)
    }
}

impl<R: AttestorRegistry> OracleHub<R> {
    pub fn new(quorum: QuorumFraction, attestors: R) -> Self {
        Self {
            tasks: OracleTaskRegistry::new(),
            store: PriceCommitStore::new(),
            verifier: QuorumVerifier::new(quorum),
            attestors,
            max_commit_age: 0,
        }
    }

    /// Open a price-data task for `(a, b)`, given in either order.
    pub fn create_task(&mut self, a: AssetId, b: AssetId, height: Height) -> Result<TaskCreated> {
        self.tasks.create_task(a, b, height)
    }

    /// Verify `submission` with stake at the task's creation height; on
    /// success store the commit and complete the task.
    ///
    /// # Errors
    ///
    /// Any verification failure from [`QuorumVerifier::verify`]; state is
    /// unchanged in that case.
    pub fn submit(&mut self, submission: Submission) -> Result<TaskCompleted> {
        let report = match self.verifier.verify(&self.tasks, &self.attestors, &submission) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(task_id = submission.task_id, error = %e, "submission rejected");
                return Err(e);
            }
        };

        let Submission {
            task_id, commit, ..
        } = submission;
        let pair = commit.pair;
        self.tasks.complete(task_id)?;
        self.store.insert(task_id, commit);

        tracing::info!(
            task_id,
            %pair,
            signed_stake = report.signed_stake,
            total_stake = report.total_stake,
            "oracle task completed"
        );
        Ok(TaskCompleted {
            task_id,
            pair,
            signed_stake: report.signed_stake,
            total_stake: report.total_stake,
        })
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get_task(id)
    }

    /// Tasks still waiting for a submission, in identifier order.
    pub fn open_tasks(&self) -> Vec<&Task> {
        self.tasks.open_tasks().collect()
    }

    pub fn latest_task_for(&self, pair: &TokenPair) -> Option<&Task> {
        self.tasks.latest_task_for(pair)
    }

    /// Last verified commit for `(a, b)`, in either order.
    pub fn price(&self, a: AssetId, b: AssetId) -> Result<Option<&StoredCommit>> {
        self.store.get_by_assets(a, b)
    }

    /// Last verified commit for `pair`, subject to the configured age limit.
    pub fn fresh_price(&self, pair: &TokenPair, current: Height) -> Result<&StoredCommit> {
        self.store.get_fresh(pair, current, self.max_commit_age)
    }

    pub fn store(&self) -> &PriceCommitStore {
        &self.store
    }

    pub fn tasks(&self) -> &OracleTaskRegistry {
        &self.tasks
    }

    pub fn attestors(&self) -> &R {
        &self.attestors
    }

    /// Mutable access to the attestor registry, e.g. to record stake changes.
    pub fn attestors_mut(&mut self) -> &mut R {
        &mut self.attestors
    }
}
