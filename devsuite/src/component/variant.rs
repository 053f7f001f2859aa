//! Installer variants.
//!
//! Each component family installs differently. The set of families is closed
//! and known at compile time; the factory picks one per descriptor.
//!
//! | Variant      | Install step                                              |
//! |--------------|-----------------------------------------------------------|
//! | `Executable` | run the downloaded vendor installer                       |
//! | `Archive`    | unpack the downloaded archive into the target folder      |
//! | `Copy`       | copy the downloaded file into the target folder           |
//! | `Headless`   | copy, await the required component, then `java -jar` it   |

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::descriptor::ComponentKey;
use super::error::{InstallError, InstallResult};
use super::layout::InstallLayout;
use crate::manager::ProcessRunner;
use crate::session::{InstallStage, MilestoneWaiter, ProgressSink};

/// Placeholder replaced by the target directory in executable arguments.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Variant selector as written in a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    Executable,
    Archive,
    Copy,
    Headless,
}

/// Concrete install behavior of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerVariant {
    /// Run the downloaded installer with these arguments.
    Executable { args: Vec<String> },
    /// Unpack a `.zip` or `.tar.gz` archive.
    Archive,
    /// Copy the downloaded file as-is.
    Copy,
    /// Run a jar installer with the JDK of `requires`, once it is installed.
    Headless { requires: ComponentKey },
}

/// Everything an install step needs, owned so it can outlive the registry lock.
#[derive(Clone)]
pub struct InstallContext {
    pub key: ComponentKey,
    pub name: String,
    pub downloaded_file: PathBuf,
    pub target_dir: PathBuf,
    pub layout: Arc<InstallLayout>,
    pub runner: Arc<dyn ProcessRunner>,
    pub milestones: MilestoneWaiter,
    pub progress: Arc<dyn ProgressSink>,
}

impl InstallerVariant {
    pub fn kind(&self) -> VariantKind {
        match self {
            Self::Executable { .. } => VariantKind::Executable,
            Self::Archive => VariantKind::Archive,
            Self::Copy => VariantKind::Copy,
            Self::Headless { .. } => VariantKind::Headless,
        }
    }

    /// The component this variant blocks on before running, if any.
    pub fn requirement(&self) -> Option<&ComponentKey> {
        match self {
            Self::Headless { requires } => Some(requires),
            _ => None,
        }
    }

    /// Perform the install step.
    pub async fn install(&self, ctx: &InstallContext) -> InstallResult<()> {
        create_dir(&ctx.target_dir).await?;

        match self {
            Self::Executable { args } => {
                let args: Vec<OsString> = args
                    .iter()
                    .map(|arg| expand_target(arg, &ctx.target_dir))
                    .collect();
                ctx.runner.run(&ctx.downloaded_file, &args).await?;
            }
            Self::Archive => unpack(ctx).await?,
            Self::Copy => {
                copy_into_target(ctx).await?;
            }
            Self::Headless { requires } => install_headless(ctx, requires).await?,
        }

        debug!(component = %ctx.key, target = %ctx.target_dir.display(), "Install step finished");
        Ok(())
    }
}

async fn create_dir(path: &Path) -> InstallResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| InstallError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn expand_target(arg: &str, target: &Path) -> OsString {
    if arg.contains(TARGET_PLACEHOLDER) {
        OsString::from(arg.replace(TARGET_PLACEHOLDER, &target.to_string_lossy()))
    } else {
        OsString::from(arg)
    }
}

async fn copy_into_target(ctx: &InstallContext) -> InstallResult<PathBuf> {
    let file_name = ctx
        .downloaded_file
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(ctx.key.as_str()));
    let dest = ctx.target_dir.join(file_name);

    tokio::fs::copy(&ctx.downloaded_file, &dest)
        .await
        .map_err(|source| InstallError::Io {
            path: ctx.downloaded_file.clone(),
            source,
        })?;

    Ok(dest)
}

async fn unpack(ctx: &InstallContext) -> InstallResult<()> {
    let archive = ctx.downloaded_file.as_os_str().to_os_string();
    let target = ctx.target_dir.as_os_str().to_os_string();
    let is_zip = ctx
        .downloaded_file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));

    if is_zip {
        let args = vec![OsString::from("-o"), archive, OsString::from("-d"), target];
        ctx.runner.run(Path::new("unzip"), &args).await?;
    } else {
        let args = vec![OsString::from("-xzf"), archive, OsString::from("-C"), target];
        ctx.runner.run(Path::new("tar"), &args).await?;
    }
    Ok(())
}

async fn install_headless(ctx: &InstallContext, requires: &ComponentKey) -> InstallResult<()> {
    copy_into_target(ctx).await?;

    if !ctx.milestones.is_satisfied(requires) {
        ctx.progress.update(
            &ctx.key,
            InstallStage::Waiting,
            &format!("Waiting for {} to finish installation", requires),
        );
    }
    ctx.milestones.wait(requires, None).await?;

    info!(component = %ctx.key, requires = %requires, "Requirement installed, running headless installer");
    ctx.progress
        .update(&ctx.key, InstallStage::Installing, "Installing");

    let java = ctx.layout.component_dir(requires).join("bin").join("java");
    let args = vec![
        OsString::from("-DTRACE=true"),
        OsString::from("-jar"),
        ctx.downloaded_file.as_os_str().to_os_string(),
        ctx.target_dir.as_os_str().to_os_string(),
    ];
    ctx.runner.run(&java, &args).await?;
    Ok(())
}
