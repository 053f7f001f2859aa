//! Installation orchestration.
//!
//! The [`Orchestrator`] owns every [`InstallableItem`] of a session together
//! with the two global activity sets (downloading, installing). It wires
//! items to each other from the resolved [`DependencyGraph`](crate::graph::DependencyGraph)
//! and exposes the download and install transitions. Long-running work is
//! not done here; the [`session`](crate::session) drives it and reports back.

mod error;
mod item;
mod registry;
mod types;

pub use error::{OrchestratorError, OrchestratorResult};
pub use item::{DownloadState, InstallState, InstallableItem, TransitionError, TransitionResult};
pub use registry::Orchestrator;
pub use types::{DeferReason, InstallJob, InstallReadiness, ItemSnapshot, OrchestratorSnapshot};
