//! Component descriptions and the factory that instantiates them.
//!
//! A [`ComponentDescriptor`] is the immutable, declarative definition of one
//! installable component. The [`ComponentFactory`] validates descriptors and
//! turns them into [`InstallableItem`](crate::orchestrator::InstallableItem)s
//! carrying one of the closed set of [`InstallerVariant`]s.

mod descriptor;
mod error;
mod factory;
mod layout;
mod manifest;
mod variant;

pub use descriptor::{Bundle, ComponentDescriptor, ComponentKey};
pub use error::{ComponentError, ComponentResult, InstallError, InstallResult};
pub use factory::{default_variant, ComponentFactory};
pub use layout::{default_folder, InstallLayout};
pub use manifest::{load_manifest, parse_manifest};
pub use variant::{InstallContext, InstallerVariant, VariantKind};
