//! `devsuite plan`: print the wired install order.

use std::collections::BTreeSet;
use std::sync::Arc;

use clap::Args;

use devsuite::component::ComponentKey;
use devsuite::orchestrator::{Orchestrator, OrchestratorError, OrchestratorSnapshot};
use devsuite::session::LogNavigator;

use super::common::{layout, load_config, load_descriptors, ManifestArgs};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

pub fn run(args: PlanArgs) -> Result<(), CliError> {
    let config = load_config();
    let descriptors = load_descriptors(&args.manifest)?;

    let mut orchestrator = Orchestrator::new(Arc::new(layout(&config, None)), Arc::new(LogNavigator));
    let keys = orchestrator.register_all(&descriptors)?;
    let resolution = orchestrator
        .graph()
        .resolve(keys.iter())
        .map_err(OrchestratorError::from)?;

    print!("{}", render_tree(&orchestrator.snapshot()));
    println!();
    println!(
        "{} component(s), resolved in {} pass(es)",
        keys.len(),
        resolution.passes()
    );
    Ok(())
}

/// Components with no prerequisite at the left margin, each dependent
/// indented under the component that unblocks it.
fn render_tree(snapshot: &OrchestratorSnapshot) -> String {
    let dependents: BTreeSet<&ComponentKey> = snapshot
        .items
        .iter()
        .flat_map(|item| item.dependents.iter())
        .collect();

    let mut out = String::new();
    for root in snapshot.items.iter().filter(|item| !dependents.contains(&item.key)) {
        render_node(snapshot, &root.key, 0, &mut out);
    }
    out
}

fn render_node(snapshot: &OrchestratorSnapshot, key: &ComponentKey, depth: usize, out: &mut String) {
    let Some(item) = snapshot.item(key.as_str()) else {
        return;
    };
    out.push_str(&format!(
        "{:indent$}{} ({})\n",
        "",
        item.name,
        item.key,
        indent = depth * 2
    ));
    for child in &item.dependents {
        render_node(snapshot, child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devsuite::orchestrator::{DownloadState, InstallState, ItemSnapshot};

    fn item(key: &str, name: &str, dependents: &[&str]) -> ItemSnapshot {
        ItemSnapshot {
            key: ComponentKey::new(key),
            name: name.to_string(),
            download: DownloadState::NotStarted,
            install: InstallState::NotStarted,
            dependents: dependents.iter().map(|k| ComponentKey::new(*k)).collect(),
        }
    }

    #[test]
    fn test_tree_indents_dependents() {
        let snapshot = OrchestratorSnapshot {
            items: vec![
                item("devstudio", "Developer Studio", &[]),
                item("jdk", "OpenJDK", &["devstudio"]),
                item("cygwin", "Cygwin", &[]),
            ],
            any_downloading: false,
            any_installing: false,
            navigation_fired: false,
        };

        assert_eq!(
            render_tree(&snapshot),
            "OpenJDK (jdk)\n  Developer Studio (devstudio)\nCygwin (cygwin)\n"
        );
    }
}
