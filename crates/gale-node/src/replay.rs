//! JSON-lines replay driver.
//!
//! Each non-blank line is one event object with a `kind` field:
//!
//! ```text
//! {"kind":"init_pool","pool":"eth-usdc","height":1,"price":2000}
//! {"kind":"observe","pool":"eth-usdc","height":21,"price":2100}
//! {"kind":"create_task","token_a":"<hex>","token_b":"<hex>","height":30}
//! {"kind":"submit","submission":{...}}
//! {"kind":"ingest","pool":"eth-usdc","token_a":"<hex>","token_b":"<hex>","height":41}
//! {"kind":"reset_tracking","pool":"eth-usdc"}
//! ```
//!
//! Pool names are mapped to pool identifiers with the pool-id derivation
//! context. Lines starting with `#` are skipped. A rejected event is logged
//! and the replay continues with the next line.

use std::io::BufRead;

use serde::Deserialize;
use serde_with::serde_as;
use tracing::{info, warn};

use gale_crypto::blake3::derive_pool_id;
use gale_fee::host::InMemoryHost;
use gale_fee::{Observation, PoolFeeController};
use gale_oracle::{OracleHub, StakeTable, Submission};
use gale_types::events::{TaskCompleted, TaskCreated};
use gale_types::{AssetId, Height, PoolId, Price, TokenPair};

use crate::config::NodeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum EventKind {
    InitPool,
    Observe,
    Ingest,
    CreateTask,
    Submit,
    ResetTracking,
}

/// Only the discriminant; the body is parsed again into the matching struct.
#[derive(Deserialize)]
struct Envelope {
    kind: EventKind,
}

#[derive(Deserialize)]
struct InitPool {
    pool: String,
    height: Height,
    price: Price,
    #[serde(default = "default_true")]
    dynamic_fee: bool,
}

#[derive(Deserialize)]
struct Observe {
    pool: String,
    height: Height,
    price: Price,
}

#[serde_as]
#[derive(Deserialize)]
struct Ingest {
    pool: String,
    #[serde_as(as = "serde_with::hex::Hex")]
    token_a: AssetId,
    #[serde_as(as = "serde_with::hex::Hex")]
    token_b: AssetId,
    height: Height,
}

#[serde_as]
#[derive(Deserialize)]
struct CreateTask {
    #[serde_as(as = "serde_with::hex::Hex")]
    token_a: AssetId,
    #[serde_as(as = "serde_with::hex::Hex")]
    token_b: AssetId,
    height: Height,
}

#[derive(Deserialize)]
struct Submit {
    submission: Submission,
}

#[derive(Deserialize)]
struct ResetTracking {
    pool: String,
}

fn default_true() -> bool {
    true
}

/// What an applied event produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    PoolInitialized { pool_id: PoolId, fee: u32 },
    Observed(Observation),
    TaskCreated(TaskCreated),
    TaskCompleted(TaskCompleted),
    TrackingReset { pool_id: PoolId },
}

/// Counts of a finished replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub rejected: usize,
}

/// Fee engine, host and oracle hub driven by replayed events.
pub struct Node {
    fees: PoolFeeController,
    host: InMemoryHost,
    oracle: OracleHub<StakeTable>,
}

impl Node {
    pub fn new(config: &NodeConfig) -> anyhow::Result<Self> {
        Ok(Self {
            fees: PoolFeeController::new(&config.fee)?,
            host: InMemoryHost::new(),
            oracle: OracleHub::from_config(&config.oracle)?,
        })
    }

    /// Identifier of the pool registered under `name`.
    pub fn pool_id(name: &str) -> PoolId {
        derive_pool_id(name.as_bytes())
    }

    pub fn fees(&self) -> &PoolFeeController {
        &self.fees
    }

    pub fn oracle(&self) -> &OracleHub<StakeTable> {
        &self.oracle
    }

    /// Apply every event in `reader`, logging each outcome or rejection.
    pub fn run<R: BufRead>(&mut self, reader: R) -> anyhow::Result<ReplaySummary> {
        let mut summary = ReplaySummary::default();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let line_no = idx + 1;
            match self.apply(trimmed) {
                Ok(outcome) => {
                    summary.applied += 1;
                    log_outcome(line_no, &outcome);
                }
                Err(e) => {
                    summary.rejected += 1;
                    warn!(line = line_no, error = %e, "event rejected");
                }
            }
        }
        Ok(summary)
    }

    /// Parse and apply a single event line.
    pub fn apply(&mut self, line: &str) -> anyhow::Result<Outcome> {
        let Envelope { kind } = serde_json::from_str(line)?;
        match kind {
            EventKind::InitPool => {
                let event: InitPool = serde_json::from_str(line)?;
                let pool_id = Self::pool_id(&event.pool);
                if self.host.fee(&pool_id).is_none() {
                    self.host
                        .register_pool(pool_id, event.dynamic_fee, self.fees.policy().base_fee());
                }
                self.fees
                    .initialize(&mut self.host, pool_id, event.height, event.price)?;
                let fee = self.fees.current_fee(&pool_id)?;
                Ok(Outcome::PoolInitialized { pool_id, fee })
            }
            EventKind::Observe => {
                let event: Observe = serde_json::from_str(line)?;
                let pool_id = Self::pool_id(&event.pool);
                let observation =
                    self.fees
                        .before_swap(&mut self.host, &pool_id, event.height, event.price)?;
                Ok(Outcome::Observed(observation))
            }
            EventKind::Ingest => {
                let event: Ingest = serde_json::from_str(line)?;
                let pool_id = Self::pool_id(&event.pool);
                let pair = TokenPair::new(event.token_a, event.token_b)?;
                let stored = self.oracle.fresh_price(&pair, event.height)?;
                let observation = self.fees.ingest_commit(
                    &mut self.host,
                    &pool_id,
                    event.height,
                    &stored.commit,
                )?;
                Ok(Outcome::Observed(observation))
            }
            EventKind::CreateTask => {
                let event: CreateTask = serde_json::from_str(line)?;
                let created = self
                    .oracle
                    .create_task(event.token_a, event.token_b, event.height)?;
                Ok(Outcome::TaskCreated(created))
            }
            EventKind::Submit => {
                let event: Submit = serde_json::from_str(line)?;
                let completed = self.oracle.submit(event.submission)?;
                Ok(Outcome::TaskCompleted(completed))
            }
            EventKind::ResetTracking => {
                let event: ResetTracking = serde_json::from_str(line)?;
                let pool_id = Self::pool_id(&event.pool);
                self.fees.reset_tracking(&pool_id)?;
                Ok(Outcome::TrackingReset { pool_id })
            }
        }
    }
}

fn log_outcome(line: usize, outcome: &Outcome) {
    match outcome {
        Outcome::PoolInitialized { pool_id, fee } => {
            info!(line, pool = %hex::encode(pool_id), fee, "pool initialized");
        }
        Outcome::Observed(observation) => {
            info!(
                line,
                fee = observation.fee,
                score = ?observation.volatility_score,
                changed = observation.fee_changed.is_some(),
                "observation applied"
            );
        }
        Outcome::TaskCreated(created) => {
            info!(line, task_id = created.task_id, pair = %created.pair, "task created");
        }
        Outcome::TaskCompleted(done) => {
            info!(
                line,
                task_id = done.task_id,
                signed_stake = done.signed_stake,
                total_stake = done.total_stake,
                "submission accepted"
            );
        }
        Outcome::TrackingReset { pool_id } => {
            info!(line, pool = %hex::encode(pool_id), "tracking reset");
        }
    }
}
