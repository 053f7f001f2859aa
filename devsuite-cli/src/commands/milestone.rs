//! `devsuite milestone emit|wait`: the spool side of the gate for
//! installers running in other processes.

use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use console::style;

use devsuite::component::ComponentKey;
use devsuite::gate::{Milestone, MilestoneGate};

use super::common::load_config;
use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum MilestoneCommands {
    /// Record that a component finished installing
    Emit {
        /// Component key (e.g., jdk)
        key: String,

        /// Record the component as skipped instead of installed
        #[arg(long)]
        skipped: bool,
    },

    /// Block until a component reaches a completion milestone
    Wait {
        /// Component key (e.g., jdk)
        key: String,

        /// Give up after this many seconds (default: gate.milestone_timeout_secs)
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,
    },
}

pub async fn run(command: MilestoneCommands) -> Result<(), CliError> {
    let gate_config = load_config().gate_config();
    let gate = MilestoneGate::new(Arc::new(gate_config.spool_channel()))
        .with_default_timeout(gate_config.milestone_timeout);

    match command {
        MilestoneCommands::Emit { key, skipped } => {
            let milestone = if skipped {
                Milestone::skipped(key.as_str())
            } else {
                Milestone::installed(key.as_str())
            };
            gate.emit(milestone).await?;
            println!("{} {}", style("emitted").green(), key);
        }
        MilestoneCommands::Wait { key, timeout_secs } => {
            wait_for(&gate, &key, timeout_secs.map(Duration::from_secs)).await?;
            println!("{} {}", style("ready").green(), key);
        }
    }
    Ok(())
}

/// No local registry here; earlier milestones come from the spool history.
async fn wait_for(
    gate: &MilestoneGate,
    key: &str,
    timeout: Option<Duration>,
) -> Result<(), CliError> {
    gate.await_milestone(&ComponentKey::new(key), || false, timeout)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use devsuite::gate::{GateError, SpoolChannel, SPOOL_FILE};
    use tempfile::TempDir;

    const POLL: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_wait_returns_for_milestone_from_earlier_run() {
        let dir = TempDir::new().unwrap();
        let emitter = MilestoneGate::new(Arc::new(SpoolChannel::new(dir.path(), POLL)));
        emitter.emit(Milestone::installed("jdk")).await.unwrap();

        let gate = MilestoneGate::new(Arc::new(SpoolChannel::new(dir.path(), POLL)));
        wait_for(&gate, "jdk", Some(Duration::from_secs(2)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_reports_unreadable_spool() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(SPOOL_FILE)).unwrap();

        let gate = MilestoneGate::new(Arc::new(SpoolChannel::new(dir.path(), POLL)));
        let err = wait_for(&gate, "jdk", Some(Duration::from_secs(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Gate(GateError::Io { .. })));
    }
}
