//! Install session: the async driver over the orchestrator.
//!
//! An [`InstallSession`] owns the shared [`Orchestrator`](crate::orchestrator::Orchestrator)
//! and the collaborators that do real work:
//!
//! - [`Downloader`] fetches installer files,
//! - [`ProcessRunner`] runs installers and unpackers,
//! - [`MilestoneGate`](crate::gate::MilestoneGate) announces and awaits
//!   completion across processes,
//! - [`Navigator`], [`FailureReporter`] and [`ProgressSink`] are the UI seams.
//!
//! Download completion starts the install, and install completion triggers
//! the wired dependents in graph order. Failures are returned to the caller
//! and also handed to the [`FailureReporter`]; nothing is retried
//! automatically.

mod collaborators;
mod driver;
mod error;
mod waiter;

pub use collaborators::{
    CredentialProvider, FailureReporter, InstallStage, LogNavigator, Navigator, NoCredentials,
    ProgressSink, SilentProgress, StaticCredentials, TracingFailureReporter, COMPLETE_ROUTE,
};
pub use driver::{InstallOutcome, InstallSession, Outcomes, SessionBuilder};
pub use error::{SessionError, SessionResult};
pub use waiter::MilestoneWaiter;

pub use crate::manager::{Downloader, ProcessRunner};
