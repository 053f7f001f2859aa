//! Milestone gate errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::component::ComponentKey;

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;

#[derive(Debug, Error)]
pub enum GateError {
    /// Reading or appending the milestone spool failed.
    #[error("milestone spool I/O failed at {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    /// A milestone could not be encoded for the spool.
    #[error("failed to encode milestone: {0}")]
    Encode(#[from] serde_json::Error),

    /// An explicit wait timeout elapsed.
    #[error("timed out after {waited_secs}s waiting for '{component}' to finish installation")]
    Timeout {
        component: ComponentKey,
        waited_secs: u64,
    },

    /// The channel stopped delivering milestones.
    #[error("milestone channel closed while waiting for '{component}'")]
    ChannelClosed { component: ComponentKey },
}
