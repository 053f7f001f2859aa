//! Devsuite CLI - command-line interface
//!
//! Installs a developer platform from a component manifest and exposes the
//! cross-process milestone gate to external installer processes.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::milestone::MilestoneCommands;
use commands::{install, plan};
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "devsuite")]
#[command(version, about = "Install a developer platform in dependency order")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory for log files
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download and install components from a manifest
    Install(install::InstallArgs),

    /// Show the resolved install order without installing anything
    Plan(plan::PlanArgs),

    /// Emit or wait for cross-process milestones
    #[command(subcommand)]
    Milestone(MilestoneCommands),

    /// View or change configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_dir = cli
        .log_dir
        .clone()
        .unwrap_or_else(devsuite::logging::default_log_dir);
    let _guard = match devsuite::logging::init_logging(&log_dir, cli.verbose) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{} {}", style("warning:").yellow().bold(), e);
            None
        }
    };

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Install(args) => install::run(args).await,
        Commands::Plan(args) => plan::run(args),
        Commands::Milestone(command) => commands::milestone::run(command).await,
        Commands::Config(command) => commands::config::run(command),
    }
}
