//! CLI error type.

use thiserror::Error;

use devsuite::component::ComponentError;
use devsuite::config::ConfigError;
use devsuite::gate::GateError;
use devsuite::logging::LoggingError;
use devsuite::orchestrator::OrchestratorError;
use devsuite::session::SessionError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid arguments or settings.
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Settings(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ComponentError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Some components failed; details were already printed.
    #[error("{count} component(s) failed")]
    Failed { count: usize },
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Settings(_) | CliError::Manifest(_) => 2,
            _ => 1,
        }
    }
}
