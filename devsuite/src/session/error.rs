//! Session errors.

use thiserror::Error;

use crate::component::{ComponentKey, InstallError};
use crate::gate::GateError;
use crate::manager::ManagerError;
use crate::orchestrator::{OrchestratorError, TransitionError};

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Every failure an install session can surface.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Registration or wiring failed.
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    /// A state transition was illegal or named an unknown component.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Emitting or awaiting a milestone failed.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// An adapter could not be set up.
    #[error(transparent)]
    Adapter(#[from] ManagerError),

    /// The transport failed. The item stays `Downloading` until retried.
    #[error("download of '{key}' failed: {source}")]
    Download {
        key: ComponentKey,
        source: ManagerError,
    },

    /// The install step failed. The item stays `Installing`.
    #[error("install of '{key}' failed: {source}")]
    Install {
        key: ComponentKey,
        source: InstallError,
    },
}

impl SessionError {
    /// The component a download or install failure belongs to.
    pub fn component(&self) -> Option<&ComponentKey> {
        match self {
            SessionError::Download { key, .. } | SessionError::Install { key, .. } => Some(key),
            SessionError::Transition(
                TransitionError::UnknownComponent { key }
                | TransitionError::IllegalDownload { key, .. }
                | TransitionError::IllegalInstall { key, .. },
            ) => Some(key),
            _ => None,
        }
    }
}
