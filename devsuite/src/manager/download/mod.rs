//! Installer downloads over HTTP.
//!
//! - [`HttpDownloader`]: the reference [`Downloader`](super::Downloader),
//!   streaming a response body to a `.part` file and renaming it into place
//! - [`checksum`]: SHA-256 verification of the finished file

pub mod checksum;
mod http;

pub use checksum::{calculate_file_checksum, verify_checksum};
pub use http::HttpDownloader;
