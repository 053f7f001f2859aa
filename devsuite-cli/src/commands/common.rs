//! Helpers shared across CLI commands.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::warn;

use devsuite::component::{load_manifest, ComponentDescriptor, InstallLayout};
use devsuite::config::ConfigFile;

use crate::error::CliError;

/// Manifest location and component selection.
#[derive(Debug, Clone, Args)]
pub struct ManifestArgs {
    /// Component manifest (JSON map of key to requirement)
    #[arg(short, long, value_name = "FILE")]
    pub manifest: PathBuf,

    /// Only these components (repeatable); all non-tools components by default
    #[arg(short, long = "select", value_name = "KEY")]
    pub select: Vec<String>,
}

/// Load the config file, falling back to defaults when it cannot be read.
pub fn load_config() -> ConfigFile {
    ConfigFile::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config file");
        ConfigFile::default()
    })
}

/// Install layout from config, with an optional root override.
pub fn layout(config: &ConfigFile, root: Option<&Path>) -> InstallLayout {
    let layout = config.to_layout();
    match root {
        Some(root) => InstallLayout::new(root).with_temp_dir(layout.temp_dir()),
        None => layout,
    }
}

/// Load the manifest and keep the selected descriptors.
pub fn load_descriptors(args: &ManifestArgs) -> Result<Vec<ComponentDescriptor>, CliError> {
    let descriptors = load_manifest(&args.manifest)?;
    select(descriptors, &args.select)
}

/// Keep descriptors named in `selection`; an empty selection keeps all.
pub fn select(
    descriptors: Vec<ComponentDescriptor>,
    selection: &[String],
) -> Result<Vec<ComponentDescriptor>, CliError> {
    if selection.is_empty() {
        return Ok(descriptors);
    }

    let wanted: BTreeSet<&str> = selection.iter().map(String::as_str).collect();
    if let Some(missing) = wanted
        .iter()
        .find(|key| !descriptors.iter().any(|d| d.key.as_str() == **key))
    {
        return Err(CliError::Config(format!(
            "component '{}' is not in the manifest",
            missing
        )));
    }

    Ok(descriptors
        .into_iter()
        .filter(|d| wanted.contains(d.key.as_str()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors() -> Vec<ComponentDescriptor> {
        vec![
            ComponentDescriptor::new("jdk", "jdk.zip"),
            ComponentDescriptor::new("cdk", "cdk.zip"),
        ]
    }

    #[test]
    fn test_empty_selection_keeps_all() {
        assert_eq!(select(descriptors(), &[]).unwrap().len(), 2);
    }

    #[test]
    fn test_selection_filters() {
        let selected = select(descriptors(), &["cdk".to_string()]).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].key.as_str(), "cdk");
    }

    #[test]
    fn test_unknown_selection_is_rejected() {
        let err = select(descriptors(), &["vagrant".to_string()]).unwrap_err();
        assert!(err.to_string().contains("vagrant"));
    }

    #[test]
    fn test_root_override_keeps_temp_dir() {
        let mut config = ConfigFile::default();
        config.install.temp_dir = Some(PathBuf::from("/var/tmp/dl"));
        let layout = layout(&config, Some(Path::new("/opt/dp")));
        assert_eq!(layout.install_dir(), Path::new("/opt/dp"));
        assert_eq!(layout.temp_dir(), Path::new("/var/tmp/dl"));
    }
}
