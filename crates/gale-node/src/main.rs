//! gale-node: replays pool observations and oracle submissions through the
//! fee engine and the attestation protocol.
//!
//! Usage: `gale-node [--config <path>] [events.jsonl | -]`
//!
//! Events are read from the named file, or from stdin when the file is
//! omitted or `-`.

mod config;
mod replay;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::NodeConfig;
use crate::replay::Node;

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    events: Option<PathBuf>,
}

impl Args {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut parsed = Self::default();
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => {
                    let path = iter.next().context("--config requires a path")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "-" => parsed.events = None,
                other if other.starts_with("--") => bail!("unknown option {other}"),
                other => {
                    if parsed.events.is_some() {
                        bail!("more than one events file given");
                    }
                    parsed.events = Some(PathBuf::from(other));
                }
            }
        }
        Ok(parsed)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;
    let config = NodeConfig::load(args.config.as_deref())?;

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        base_fee = config.fee.base_fee,
        max_fee = config.fee.max_fee,
        attestors = config.oracle.attestors.len(),
        "gale node starting"
    );

    let mut node = Node::new(&config)?;
    info!(calculator = node.fees().calculator_name(), "fee engine ready");
    let reader: Box<dyn BufRead> = match &args.events {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening events file {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let summary = node.run(reader)?;
    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        open_tasks = node.oracle().open_tasks().len(),
        committed_pairs = node.oracle().store().len(),
        "replay finished"
    );
    Ok(())
}
