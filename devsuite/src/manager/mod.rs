//! Transport and process adapters.
//!
//! Everything here talks to the outside world: HTTP downloads of installer
//! files and external installer/unpacker processes. The orchestration layers
//! only see the [`Downloader`] and [`ProcessRunner`] traits.

mod config;
pub mod download;
mod error;
mod process;
mod traits;

pub use config::{DownloadConfig, DEFAULT_PARALLEL_DOWNLOADS, DEFAULT_TIMEOUT_SECS};
pub use download::{calculate_file_checksum, verify_checksum, HttpDownloader};
pub use error::{ManagerError, ManagerResult};
pub use process::TokioProcessRunner;
pub use traits::{
    BoxFuture, Credentials, DownloadRequest, Downloader, ProcessRunner, ProgressCallback,
};
