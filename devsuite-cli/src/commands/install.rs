//! `devsuite install`: download and install the selected components.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use dialoguer::console::Term;
use dialoguer::{MultiSelect, Password};
use tracing::info;

use devsuite::component::ComponentDescriptor;
use devsuite::gate::MilestoneGate;
use devsuite::orchestrator::Orchestrator;
use devsuite::session::{
    CredentialProvider, NoCredentials, SessionBuilder, StaticCredentials,
};

use super::common::{layout, load_config, load_descriptors, ManifestArgs};
use super::progress::{BarProgress, ConsoleNavigator, FailureLog};
use crate::error::CliError;

/// Environment variable holding the download-manager password.
pub const PASSWORD_ENV: &str = "DEVSUITE_PASSWORD";

#[derive(Debug, Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Install root (overrides install.root)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Pick components from a list
    #[arg(short, long)]
    pub interactive: bool,

    /// Download-manager username (overrides download.username)
    #[arg(long)]
    pub username: Option<String>,
}

pub async fn run(args: InstallArgs) -> Result<(), CliError> {
    let config = load_config();

    let mut descriptors = load_descriptors(&args.manifest)?;
    descriptors.retain(|d| !d.bundle.is_tools());
    if args.interactive {
        descriptors = choose(descriptors)?;
    }
    if descriptors.is_empty() {
        println!("Nothing to install.");
        return Ok(());
    }

    let layout = Arc::new(layout(&config, args.root.as_deref()));
    let mut orchestrator = Orchestrator::new(Arc::clone(&layout), Arc::new(ConsoleNavigator));
    let keys = orchestrator.register_all(&descriptors)?;

    let progress = Arc::new(BarProgress::new());
    for descriptor in &descriptors {
        progress.add(&descriptor.key, &descriptor.name);
    }
    let failures = Arc::new(FailureLog::default());

    let username = args.username.or_else(|| config.download.username.clone());
    let credentials = credentials(username, &descriptors)?;

    let gate_config = config.gate_config();
    let gate = MilestoneGate::new(Arc::new(gate_config.spool_channel()))
        .with_default_timeout(gate_config.milestone_timeout);

    let session = SessionBuilder::new(orchestrator)
        .with_progress(progress.clone())
        .with_failure_reporter(failures.clone())
        .with_credentials(credentials)
        .with_gate(gate)
        .with_download_config(config.download_config())
        .build()?;

    info!(
        components = keys.len(),
        root = %layout.install_dir().display(),
        "Starting install"
    );
    let results = session.download_all(keys).await;

    let mut failed = failures.take();
    for (key, result) in results {
        if let Err(e) = result {
            if e.component().is_none() {
                failed.push((key, e.to_string()));
            }
        }
    }

    println!();
    let snapshot = session.snapshot();
    for item in &snapshot.items {
        println!("  {:<40} {}", item.name, item.install);
    }

    if !failed.is_empty() {
        println!();
        for (key, message) in &failed {
            println!("  {} {}: {}", style("✗").red(), key, message);
        }
        return Err(CliError::Failed {
            count: failed.len(),
        });
    }

    if snapshot.is_complete() {
        println!();
        println!("{}", style("All components installed.").green().bold());
    }
    Ok(())
}

/// Let the user tick the components to install; all start ticked.
fn choose(descriptors: Vec<ComponentDescriptor>) -> Result<Vec<ComponentDescriptor>, CliError> {
    let items: Vec<String> = descriptors
        .iter()
        .map(|d| match &d.version {
            Some(version) => format!("{} {} ({})", d.name, version, d.key),
            None => format!("{} ({})", d.name, d.key),
        })
        .collect();
    let defaults = vec![true; items.len()];

    let selection = MultiSelect::new()
        .with_prompt("Select components to install (SPACE to toggle, ENTER to confirm)")
        .items(&items)
        .defaults(&defaults)
        .interact_on_opt(&Term::stderr())?;

    let Some(selection) = selection else {
        return Ok(Vec::new());
    };
    Ok(descriptors
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| selection.contains(idx))
        .map(|(_, d)| d)
        .collect())
}

/// Credentials for authenticated downloads, prompting for the password
/// when it is not in the environment.
fn credentials(
    username: Option<String>,
    descriptors: &[ComponentDescriptor],
) -> Result<Arc<dyn CredentialProvider>, CliError> {
    if !descriptors.iter().any(ComponentDescriptor::is_authenticated) {
        return Ok(Arc::new(NoCredentials));
    }
    let Some(username) = username else {
        return Ok(Arc::new(NoCredentials));
    };

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => Password::new()
            .with_prompt(format!("Download manager password for {}", username))
            .interact()?,
    };
    Ok(Arc::new(StaticCredentials::new(username, password)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_credentials_without_authenticated_downloads() {
        let descriptors =
            vec![ComponentDescriptor::new("jdk", "jdk.zip").with_url("https://example.com/jdk.zip")];
        let provider = credentials(Some("developer".to_string()), &descriptors).unwrap();
        assert!(provider.credentials().is_none());
    }

    #[test]
    fn test_no_credentials_without_username() {
        let descriptors = vec![ComponentDescriptor::new("devstudio", "devstudio.jar")
            .with_dm_url("https://dm.example.com/devstudio.jar")];
        let provider = credentials(None, &descriptors).unwrap();
        assert!(provider.credentials().is_none());
    }
}
