//! SHA-256 verification of downloaded installers.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::manager::error::{ManagerError, ManagerResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Lowercase hex SHA-256 of a file's contents.
pub fn calculate_file_checksum(path: &Path) -> ManagerResult<String> {
    let read_failed = |e| ManagerError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = File::open(path).map_err(read_failed)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(read_failed)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Check a file against an expected checksum. Comparison ignores case.
pub fn verify_checksum(path: &Path, expected: &str) -> ManagerResult<()> {
    let actual = calculate_file_checksum(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ManagerError::ChecksumMismatch {
            filename: path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
