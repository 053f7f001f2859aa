//! Error types for the transport and process adapters.

use std::io;
use std::path::PathBuf;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors raised while downloading installers or running external processes.
#[derive(Debug)]
pub enum ManagerError {
    /// Failed to read a file or directory.
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file or directory.
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to download an installer.
    DownloadFailed { url: String, reason: String },

    /// Checksum verification failed.
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    /// HTTP client could not be built or used.
    HttpError(String),

    /// Network timeout.
    Timeout { url: String, timeout_secs: u64 },

    /// The external program could not be started.
    ProcessSpawn { program: PathBuf, source: io::Error },

    /// The external program exited unsuccessfully.
    ProcessFailed {
        program: PathBuf,
        status: String,
        stderr: String,
    },
}

impl std::fmt::Display for ManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadFailed { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Self::WriteFailed { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            Self::CreateDirFailed { path, source } => {
                write!(
                    f,
                    "failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::DownloadFailed { url, reason } => {
                write!(f, "failed to download {}: {}", url, reason)
            }
            Self::ChecksumMismatch {
                filename,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "checksum mismatch for {}: expected {}, got {}",
                    filename, expected, actual
                )
            }
            Self::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            Self::Timeout { url, timeout_secs } => {
                write!(f, "request to {} timed out after {}s", url, timeout_secs)
            }
            Self::ProcessSpawn { program, source } => {
                write!(f, "failed to start {}: {}", program.display(), source)
            }
            Self::ProcessFailed {
                program,
                status,
                stderr,
            } => {
                if stderr.is_empty() {
                    write!(f, "{} failed with {}", program.display(), status)
                } else {
                    write!(f, "{} failed with {}: {}", program.display(), status, stderr)
                }
            }
        }
    }
}

impl std::error::Error for ManagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFailed { source, .. } => Some(source),
            Self::WriteFailed { source, .. } => Some(source),
            Self::CreateDirFailed { source, .. } => Some(source),
            Self::ProcessSpawn { source, .. } => Some(source),
            _ => None,
        }
    }
}
