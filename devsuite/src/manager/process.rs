//! External process runner.

use std::ffi::OsString;
use std::path::Path;

use tokio::process::Command;
use tracing::{debug, warn};

use super::error::{ManagerError, ManagerResult};
use super::traits::{BoxFuture, ProcessRunner};

/// Runs installers and unpackers with `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for TokioProcessRunner {
    fn run<'a>(
        &'a self,
        program: &'a Path,
        args: &'a [OsString],
    ) -> BoxFuture<'a, ManagerResult<()>> {
        Box::pin(async move {
            debug!(program = %program.display(), args = ?args, "Running process");

            let output = Command::new(program)
                .args(args)
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|e| ManagerError::ProcessSpawn {
                    program: program.to_path_buf(),
                    source: e,
                })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                warn!(program = %program.display(), status = %output.status, "Process failed");
                return Err(ManagerError::ProcessFailed {
                    program: program.to_path_buf(),
                    status: output.status.to_string(),
                    stderr,
                });
            }

            Ok(())
        })
    }
}
