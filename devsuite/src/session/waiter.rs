//! Milestone waits backed by the registry state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::component::ComponentKey;
use crate::gate::{GateResult, MilestoneGate};
use crate::orchestrator::Orchestrator;

/// A [`MilestoneGate`] whose "already satisfied" check reads the registry.
#[derive(Clone)]
pub struct MilestoneWaiter {
    gate: MilestoneGate,
    orchestrator: Arc<Mutex<Orchestrator>>,
}

impl MilestoneWaiter {
    pub fn new(gate: MilestoneGate, orchestrator: Arc<Mutex<Orchestrator>>) -> Self {
        Self { gate, orchestrator }
    }

    /// Whether `key` is installed or skipped in this session's registry.
    pub fn is_satisfied(&self, key: &ComponentKey) -> bool {
        self.orchestrator.lock().is_satisfied(key.as_str())
    }

    /// Wait until `key` is installed or skipped, here or in another process.
    pub async fn wait(&self, key: &ComponentKey, timeout: Option<Duration>) -> GateResult<()> {
        let orchestrator = Arc::clone(&self.orchestrator);
        let target = key.clone();
        self.gate
            .await_milestone(
                key,
                move || orchestrator.lock().is_satisfied(target.as_str()),
                timeout,
            )
            .await
    }

    pub fn gate(&self) -> &MilestoneGate {
        &self.gate
    }
}

impl std::fmt::Debug for MilestoneWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MilestoneWaiter")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
