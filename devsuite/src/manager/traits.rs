//! Collaborator traits for downloads and external processes.
//!
//! Both traits are dyn-compatible (`Arc<dyn Downloader>`,
//! `Arc<dyn ProcessRunner>`) so a session can swap the real adapters for
//! in-memory fakes in tests.

use std::ffi::OsString;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use super::error::ManagerResult;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Progress callback: `(bytes_downloaded, total_bytes)`.
///
/// `total_bytes` is `None` when the server did not report a length.
pub type ProgressCallback = Arc<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// Username and password for the authenticated download manager.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One installer download.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub destination: PathBuf,
    pub credentials: Option<Credentials>,
    /// Expected SHA-256 (lowercase hex).
    pub checksum: Option<String>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            credentials: None,
            checksum: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_checksum(mut self, checksum: Option<String>) -> Self {
        self.checksum = checksum;
        self
    }
}

/// Fetches an installer to a local file.
pub trait Downloader: Send + Sync {
    /// Download `request.url` to `request.destination`.
    ///
    /// Returns the number of bytes written. Verifies the checksum when one
    /// is given.
    fn download<'a>(
        &'a self,
        request: &'a DownloadRequest,
        progress: Option<ProgressCallback>,
    ) -> BoxFuture<'a, ManagerResult<u64>>;
}

/// Runs an external program to completion.
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args`. A non-zero exit status is an error
    /// carrying the program's stderr.
    fn run<'a>(&'a self, program: &'a Path, args: &'a [OsString])
        -> BoxFuture<'a, ManagerResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("developer", "s3cret");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("developer"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_download_request_builder() {
        let request = DownloadRequest::new("https://example.com/jdk.zip", "/tmp/jdk.zip")
            .with_checksum(Some("abc".to_string()))
            .with_credentials(Some(Credentials::new("u", "p")));
        assert_eq!(request.checksum.as_deref(), Some("abc"));
        assert_eq!(request.credentials.unwrap().username, "u");
    }
}
