//! Error types for component construction and install steps.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::descriptor::ComponentKey;
use crate::gate::GateError;
use crate::manager::ManagerError;

/// Result type for descriptor validation and manifest loading.
pub type ComponentResult<T> = Result<T, ComponentError>;

/// Result type for component install steps.
pub type InstallResult<T> = Result<T, InstallError>;

/// Configuration errors. A descriptor that fails here never enters the registry.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// Neither a download URL nor a pre-existing installer file is set.
    #[error("No download URL set for component '{key}'")]
    NoDownloadUrl { key: ComponentKey },

    /// The downloaded file name is empty.
    #[error("No installer file name set for component '{key}'")]
    MissingFileName { key: ComponentKey },

    /// No explicit variant and the key is not in the built-in table.
    #[error("No installer variant known for component '{key}'")]
    UnknownVariant { key: ComponentKey },

    /// A headless installer has no component to wait for.
    #[error("Headless installer for '{key}' does not name a required component")]
    MissingRequirement { key: ComponentKey },

    /// Failed to read the manifest file.
    #[error("failed to read manifest {}: {source}", path.display())]
    ManifestRead { path: PathBuf, source: io::Error },

    /// Failed to parse the manifest contents.
    #[error("failed to parse manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),
}

/// Failure of a component-specific install step.
#[derive(Debug, Error)]
pub enum InstallError {
    /// A filesystem step (directory creation, copy) failed.
    #[error("install step failed at {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    /// The external installer process failed.
    #[error(transparent)]
    Process(#[from] ManagerError),

    /// Waiting for a prerequisite milestone failed.
    #[error(transparent)]
    Milestone(#[from] GateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_download_url_message() {
        let err = ComponentError::NoDownloadUrl {
            key: ComponentKey::new("jbossfuse"),
        };
        assert_eq!(
            err.to_string(),
            "No download URL set for component 'jbossfuse'"
        );
    }

    #[test]
    fn test_install_io_error_display() {
        let err = InstallError::Io {
            path: PathBuf::from("/opt/dp/JDK8"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/opt/dp/JDK8"));
        assert!(err.to_string().contains("denied"));
    }
}
