//! HTTP-based installer downloader.
//!
//! Streams the response body to `<destination>.part`, reporting progress per
//! chunk, verifies the checksum if one is given, then renames the part file
//! into place. A failed download never leaves a file at the destination, so
//! the "file already exists" shortcut in the session only sees complete
//! installers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::checksum::verify_checksum;
use crate::manager::config::{DownloadConfig, DEFAULT_TIMEOUT_SECS};
use crate::manager::error::{ManagerError, ManagerResult};
use crate::manager::traits::{BoxFuture, DownloadRequest, Downloader, ProgressCallback};

/// Downloader backed by an async `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    pub(crate) timeout: Duration,
}

impl HttpDownloader {
    /// Create a downloader with the default timeout.
    pub fn new() -> ManagerResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a downloader with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> ManagerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("devsuite/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ManagerError::HttpError(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Create a downloader from a download configuration.
    pub fn from_config(config: &DownloadConfig) -> ManagerResult<Self> {
        Self::with_timeout(config.timeout)
    }

    async fn fetch(
        &self,
        request: &DownloadRequest,
        progress: Option<ProgressCallback>,
    ) -> ManagerResult<u64> {
        let url = request.url.as_str();
        let dest = request.destination.as_path();

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ManagerError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let mut builder = self.client.get(url);
        if let Some(credentials) = &request.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let mut response = builder.send().await.map_err(|e| self.map_error(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: format!("GET request failed with status {}", status),
            });
        }

        let total = response.content_length();
        let part = part_path(dest);
        let mut file = tokio::fs::File::create(&part)
            .await
            .map_err(|e| ManagerError::WriteFailed {
                path: part.clone(),
                source: e,
            })?;

        debug!(url, dest = %dest.display(), total = ?total, "Streaming download");
        let mut downloaded = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(|e| self.map_error(url, e))? {
            file.write_all(&chunk)
                .await
                .map_err(|e| ManagerError::WriteFailed {
                    path: part.clone(),
                    source: e,
                })?;
            downloaded += chunk.len() as u64;
            if let Some(cb) = &progress {
                cb(downloaded, total);
            }
        }

        file.flush().await.map_err(|e| ManagerError::WriteFailed {
            path: part.clone(),
            source: e,
        })?;
        drop(file);

        if let Some(expected) = request.checksum.clone() {
            let check_path = part.clone();
            let verified =
                tokio::task::spawn_blocking(move || verify_checksum(&check_path, &expected))
                    .await
                    .map_err(|e| ManagerError::DownloadFailed {
                        url: url.to_string(),
                        reason: format!("checksum task failed: {}", e),
                    })?;
            if let Err(e) = verified {
                let _ = tokio::fs::remove_file(&part).await;
                return Err(e);
            }
        }

        tokio::fs::rename(&part, dest)
            .await
            .map_err(|e| ManagerError::WriteFailed {
                path: dest.to_path_buf(),
                source: e,
            })?;

        info!(url, dest = %dest.display(), bytes = downloaded, "Download complete");
        Ok(downloaded)
    }

    fn map_error(&self, url: &str, e: reqwest::Error) -> ManagerError {
        if e.is_timeout() {
            ManagerError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ManagerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

impl Downloader for HttpDownloader {
    fn download<'a>(
        &'a self,
        request: &'a DownloadRequest,
        progress: Option<ProgressCallback>,
    ) -> BoxFuture<'a, ManagerResult<u64>> {
        Box::pin(async move {
            let result = self.fetch(request, progress).await;
            if result.is_err() {
                let _ = tokio::fs::remove_file(part_path(&request.destination)).await;
            }
            result
        })
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_downloader_default_timeout() {
        let downloader = HttpDownloader::new().unwrap();
        assert_eq!(downloader.timeout.as_secs(), DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_http_downloader_from_config() {
        let config = DownloadConfig::default().with_timeout(Duration::from_secs(60));
        let downloader = HttpDownloader::from_config(&config).unwrap();
        assert_eq!(downloader.timeout.as_secs(), 60);
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/tmp/dl/jdk.zip")),
            PathBuf::from("/tmp/dl/jdk.zip.part")
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_without_leaving_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let dest = temp.path().join("jdk.zip");
        let downloader = HttpDownloader::with_timeout(Duration::from_secs(2)).unwrap();
        let request = DownloadRequest::new("http://127.0.0.1:9/jdk.zip", &dest);

        let result = downloader.download(&request, None).await;
        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }
}
