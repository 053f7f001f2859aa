//! Component factory.
//!
//! Turns a [`ComponentDescriptor`] into an [`InstallableItem`] with the right
//! [`InstallerVariant`]. The variant is taken from the descriptor's explicit
//! `installer` field when present, otherwise from the built-in table keyed by
//! component.

use std::sync::Arc;

use super::descriptor::{ComponentDescriptor, ComponentKey};
use super::error::{ComponentError, ComponentResult};
use super::layout::InstallLayout;
use super::variant::{InstallerVariant, VariantKind};
use crate::orchestrator::InstallableItem;

/// Built-in installer variant for a known component key.
pub fn default_variant(key: &ComponentKey) -> Option<InstallerVariant> {
    let executable = |args: &[&str]| InstallerVariant::Executable {
        args: args.iter().map(|a| a.to_string()).collect(),
    };
    let headless_on_jdk = || InstallerVariant::Headless {
        requires: ComponentKey::new("jdk"),
    };

    let variant = match key.as_str() {
        "jdk" | "cdk" => InstallerVariant::Archive,
        "virtualbox" => executable(&["--silent", "--msiparams", "INSTALLDIR={target}"]),
        "vagrant" => executable(&["/quiet", "/norestart", "INSTALLDIR={target}"]),
        "cygwin" => executable(&["--quiet-mode", "--root", "{target}"]),
        "hyperv" => executable(&[]),
        "devstudio" | "jbosseap" | "jbossfuse" => headless_on_jdk(),
        "fusetools" | "kompose" => InstallerVariant::Copy,
        _ => return None,
    };
    Some(variant)
}

/// Instantiates installable items from descriptors.
#[derive(Debug, Clone)]
pub struct ComponentFactory {
    layout: Arc<InstallLayout>,
}

impl ComponentFactory {
    pub fn new(layout: Arc<InstallLayout>) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &Arc<InstallLayout> {
        &self.layout
    }

    /// Validate a descriptor and build its item.
    ///
    /// # Errors
    ///
    /// Returns a [`ComponentError`] when the descriptor has no download source,
    /// no file name, or no resolvable installer variant.
    pub fn create(&self, descriptor: &ComponentDescriptor) -> ComponentResult<InstallableItem> {
        let key = &descriptor.key;

        if descriptor.download_url().is_none() && descriptor.existing_installer().is_none() {
            return Err(ComponentError::NoDownloadUrl { key: key.clone() });
        }
        if descriptor.file_name.trim().is_empty() && descriptor.existing_installer().is_none() {
            return Err(ComponentError::MissingFileName { key: key.clone() });
        }

        let variant = select_variant(descriptor)?;
        let downloaded_file = match descriptor.existing_installer() {
            Some(path) => path.clone(),
            None => self.layout.download_path(descriptor),
        };

        Ok(InstallableItem::new(
            descriptor,
            variant,
            downloaded_file,
            self.layout.target_dir(descriptor),
        ))
    }
}

fn select_variant(descriptor: &ComponentDescriptor) -> ComponentResult<InstallerVariant> {
    let key = &descriptor.key;
    let builtin = default_variant(key);

    let Some(kind) = descriptor.installer else {
        let variant = builtin.ok_or_else(|| ComponentError::UnknownVariant { key: key.clone() })?;
        return Ok(apply_requirement(variant, descriptor));
    };

    let variant = match kind {
        VariantKind::Archive => InstallerVariant::Archive,
        VariantKind::Copy => InstallerVariant::Copy,
        VariantKind::Executable => match builtin {
            Some(variant @ InstallerVariant::Executable { .. }) => variant,
            _ => InstallerVariant::Executable { args: Vec::new() },
        },
        VariantKind::Headless => {
            let requires = descriptor
                .requires
                .clone()
                .or_else(|| builtin.as_ref().and_then(|v| v.requirement().cloned()))
                .ok_or_else(|| ComponentError::MissingRequirement { key: key.clone() })?;
            InstallerVariant::Headless { requires }
        }
    };
    Ok(variant)
}

/// A descriptor's `requires` overrides the built-in requirement of a headless variant.
fn apply_requirement(
    variant: InstallerVariant,
    descriptor: &ComponentDescriptor,
) -> InstallerVariant {
    match (variant, &descriptor.requires) {
        (InstallerVariant::Headless { .. }, Some(requires)) => InstallerVariant::Headless {
            requires: requires.clone(),
        },
        (variant, _) => variant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn factory() -> ComponentFactory {
        ComponentFactory::new(Arc::new(
            InstallLayout::new("/dp").with_temp_dir("/tmp/dl"),
        ))
    }

    #[test]
    fn test_fails_without_url_and_installed_file() {
        let descriptor = ComponentDescriptor::new("jbossfuse", "jbossfuse.jar");
        let err = factory().create(&descriptor).unwrap_err();
        assert!(matches!(err, ComponentError::NoDownloadUrl { .. }));
        assert!(err.to_string().contains("No download URL set"));
    }

    #[test]
    fn test_fails_with_empty_installed_file() {
        let descriptor =
            ComponentDescriptor::new("jbossfuse", "jbossfuse.jar").with_installed_file("");
        let err = factory().create(&descriptor).unwrap_err();
        assert!(matches!(err, ComponentError::NoDownloadUrl { .. }));
    }

    #[test]
    fn test_installed_file_replaces_url() {
        let descriptor = ComponentDescriptor::new("jbossfuse", "jbossfuse.jar")
            .with_installed_file("/cache/jbossfuse.jar");
        let item = factory().create(&descriptor).unwrap();
        assert_eq!(item.downloaded_file(), PathBuf::from("/cache/jbossfuse.jar"));
        assert_eq!(item.download_url(), None);
    }

    #[test]
    fn test_download_goes_to_temp_with_configured_filename() {
        let descriptor =
            ComponentDescriptor::new("jbossfuse", "jbossfuse.jar").with_url("http://x/fuse.jar");
        let item = factory().create(&descriptor).unwrap();
        assert_eq!(item.downloaded_file(), PathBuf::from("/tmp/dl/jbossfuse.jar"));
        assert_eq!(item.target_dir(), PathBuf::from("/dp/jbossfuse"));
    }

    #[test]
    fn test_builtin_variants() {
        let jdk = ComponentDescriptor::new("jdk", "jdk.zip").with_url("http://x/jdk.zip");
        assert_eq!(
            factory().create(&jdk).unwrap().variant(),
            &InstallerVariant::Archive
        );

        let studio =
            ComponentDescriptor::new("devstudio", "studio.jar").with_url("http://x/studio.jar");
        assert_eq!(
            factory().create(&studio).unwrap().variant(),
            &InstallerVariant::Headless {
                requires: ComponentKey::new("jdk")
            }
        );
    }

    #[test]
    fn test_unknown_key_without_variant_is_rejected() {
        let descriptor = ComponentDescriptor::new("mystery", "m.bin").with_url("http://x/m.bin");
        let err = factory().create(&descriptor).unwrap_err();
        assert!(matches!(err, ComponentError::UnknownVariant { .. }));
    }

    #[test]
    fn test_explicit_variant_overrides_table() {
        let descriptor = ComponentDescriptor::new("jdk", "jdk.msi")
            .with_url("http://x/jdk.msi")
            .with_installer(VariantKind::Copy);
        assert_eq!(
            factory().create(&descriptor).unwrap().variant(),
            &InstallerVariant::Copy
        );
    }

    #[test]
    fn test_headless_needs_requirement() {
        let descriptor = ComponentDescriptor::new("mystery", "m.jar")
            .with_url("http://x/m.jar")
            .with_installer(VariantKind::Headless);
        let err = factory().create(&descriptor).unwrap_err();
        assert!(matches!(err, ComponentError::MissingRequirement { .. }));

        let descriptor = descriptor.with_requires("jdk");
        assert!(factory().create(&descriptor).is_ok());
    }

    #[test]
    fn test_requires_overrides_builtin_headless_requirement() {
        let descriptor = ComponentDescriptor::new("jbosseap", "eap.jar")
            .with_url("http://x/eap.jar")
            .with_requires("devstudio");
        assert_eq!(
            factory().create(&descriptor).unwrap().variant(),
            &InstallerVariant::Headless {
                requires: ComponentKey::new("devstudio")
            }
        );
    }
}
