//! Devsuite - developer platform installation orchestrator
//!
//! This library installs a set of interdependent developer-platform components
//! (JDK, virtualization tooling, IDE, middleware runtimes). Every component is
//! downloaded and then installed, and some installs may only start once other
//! components have finished.
//!
//! # Architecture
//!
//! ```text
//! manifest ──► ComponentFactory ──► Orchestrator (registry + global sets)
//!                                        │
//!                                        ├── DependencyGraph::resolve (wiring)
//!                                        │
//!                 InstallSession ────────┤
//!                   ├── Downloader       │
//!                   ├── ProcessRunner    └── Navigator ("start" once done)
//!                   └── MilestoneGate (cross-process milestones)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use devsuite::component::{load_manifest, InstallLayout};
//! use devsuite::orchestrator::Orchestrator;
//! use devsuite::session::{LogNavigator, SessionBuilder};
//!
//! let layout = Arc::new(InstallLayout::platform_default());
//! let mut orchestrator = Orchestrator::new(Arc::clone(&layout), Arc::new(LogNavigator));
//! orchestrator.register_all(&load_manifest("requirements.json".as_ref())?)?;
//!
//! let session = SessionBuilder::new(orchestrator).build()?;
//! let results = session.download_all(session.registered_keys()).await;
//! ```

pub mod component;
pub mod config;
pub mod gate;
pub mod graph;
pub mod logging;
pub mod manager;
pub mod orchestrator;
pub mod session;
