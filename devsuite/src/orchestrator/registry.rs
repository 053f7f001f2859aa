//! The component registry and its global activity sets.
//!
//! Every transition updates an item and the matching set in one call, so
//! while the orchestrator is behind its session lock no caller can observe an
//! item whose state disagrees with the sets.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::{OrchestratorError, OrchestratorResult};
use super::item::{InstallState, InstallableItem, TransitionError, TransitionResult};
use super::types::{DeferReason, InstallJob, InstallReadiness, ItemSnapshot, OrchestratorSnapshot};
use crate::component::{ComponentDescriptor, ComponentFactory, ComponentKey, InstallLayout};
use crate::graph::{DependencyGraph, GraphResult};
use crate::session::{Navigator, COMPLETE_ROUTE};

/// Owner of all installable items for one orchestration session.
pub struct Orchestrator {
    graph: DependencyGraph,
    factory: ComponentFactory,
    items: BTreeMap<ComponentKey, InstallableItem>,
    downloading: BTreeSet<ComponentKey>,
    installing: BTreeSet<ComponentKey>,
    navigator: Arc<dyn Navigator>,
    navigation_fired: bool,
}

impl Orchestrator {
    /// Create an empty registry over the built-in graph.
    pub fn new(layout: Arc<InstallLayout>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            graph: DependencyGraph::builtin(),
            factory: ComponentFactory::new(layout),
            items: BTreeMap::new(),
            downloading: BTreeSet::new(),
            installing: BTreeSet::new(),
            navigator,
            navigation_fired: false,
        }
    }

    /// Replace the dependency graph. Intended for use before registration.
    pub fn with_graph(mut self, graph: DependencyGraph) -> Self {
        self.graph = graph;
        self
    }

    pub fn layout(&self) -> &Arc<InstallLayout> {
        self.factory.layout()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register every descriptor outside the `tools` bundle, then re-wire.
    ///
    /// All descriptors are validated before any is inserted; on error the
    /// registry is left unchanged. Returns the registered keys.
    pub fn register_all(
        &mut self,
        descriptors: &[ComponentDescriptor],
    ) -> OrchestratorResult<Vec<ComponentKey>> {
        let mut created: Vec<InstallableItem> = Vec::new();
        for descriptor in descriptors.iter().filter(|d| !d.bundle.is_tools()) {
            if self.items.contains_key(&descriptor.key)
                || created.iter().any(|item| item.key() == &descriptor.key)
            {
                return Err(OrchestratorError::AlreadyRegistered {
                    key: descriptor.key.clone(),
                });
            }
            created.push(self.factory.create(descriptor)?);
        }

        let keys: Vec<ComponentKey> = created.iter().map(|item| item.key().clone()).collect();
        for item in created {
            self.items.insert(item.key().clone(), item);
        }

        if let Err(e) = self.wire() {
            for key in &keys {
                self.items.remove(key);
            }
            self.wire()?;
            return Err(e.into());
        }

        info!(count = keys.len(), "Registered components");
        Ok(keys)
    }

    /// Register a single descriptor, then re-wire.
    ///
    /// Returns `false` when the descriptor is in the `tools` bundle.
    pub fn register_one(&mut self, descriptor: &ComponentDescriptor) -> OrchestratorResult<bool> {
        if descriptor.bundle.is_tools() {
            debug!(component = %descriptor.key, "Skipping tools-bundle component");
            return Ok(false);
        }
        if self.items.contains_key(&descriptor.key) {
            return Err(OrchestratorError::AlreadyRegistered {
                key: descriptor.key.clone(),
            });
        }

        let item = self.factory.create(descriptor)?;
        self.items.insert(descriptor.key.clone(), item);

        if let Err(e) = self.wire() {
            self.items.remove(&descriptor.key);
            self.wire()?;
            return Err(e.into());
        }

        info!(component = %descriptor.key, "Registered component");
        Ok(true)
    }

    /// Remove a component from the registry and both sets, then re-wire.
    ///
    /// Removing a prerequisite can leave parked dependents ready; see
    /// [`unblocked`](Self::unblocked).
    pub fn unregister(&mut self, key: &str) -> OrchestratorResult<Option<InstallableItem>> {
        let removed = self.items.remove(key);
        let was_active = self.downloading.remove(key) | self.installing.remove(key);
        self.wire()?;

        if removed.is_some() {
            info!(component = key, "Unregistered component");
        }
        if was_active {
            self.check_complete();
        }
        Ok(removed)
    }

    /// Recompute every item's dependents and prerequisites from the graph.
    ///
    /// Idempotent for the same registry membership.
    pub fn wire(&mut self) -> GraphResult<()> {
        let resolution = self.graph.resolve(self.items.keys())?;

        for item in self.items.values_mut() {
            item.clear_edges();
        }

        for (parent, children) in resolution.iter() {
            for child in children {
                if let Some(item) = self.items.get_mut(parent) {
                    item.then_install(child.clone());
                }
                if let Some(item) = self.items.get_mut(child) {
                    item.add_prerequisite(parent.clone());
                }
            }
            debug!(component = %parent, dependents = ?children, "Wired component");
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Download transitions
    // ------------------------------------------------------------------

    /// Mark a download as started. Returns `false` if it already was.
    pub fn begin_download(&mut self, key: &str) -> TransitionResult<bool> {
        let item = item_mut(&mut self.items, key)?;
        let started = item.start_download()?;
        if started {
            self.downloading.insert(item.key().clone());
            info!(component = key, "Download started");
        }
        Ok(started)
    }

    /// Mark a download as finished and queue the item for installation.
    pub fn download_finished(&mut self, key: &str) -> TransitionResult<()> {
        let item = item_mut(&mut self.items, key)?;
        item.finish_download()?;
        self.downloading.remove(key);
        info!(component = key, "Download finished");
        self.begin_install(key)
    }

    // ------------------------------------------------------------------
    // Install transitions
    // ------------------------------------------------------------------

    /// Enter the install set, parking the item in `Waiting` if it has not
    /// started installing.
    pub fn begin_install(&mut self, key: &str) -> TransitionResult<()> {
        let item = item_mut(&mut self.items, key)?;
        item.park();
        if matches!(
            item.install_state(),
            InstallState::Waiting | InstallState::Installing
        ) {
            self.installing.insert(item.key().clone());
        }
        Ok(())
    }

    /// Decide whether an item can start installing now.
    ///
    /// An item is ready once it is downloaded and every prerequisite is
    /// installed or skipped. A ready item moves to `Installing`; otherwise it
    /// is parked in `Waiting`.
    pub fn try_start_install(&mut self, key: &str) -> TransitionResult<InstallReadiness> {
        let item = get(&self.items, key)?;
        if !matches!(
            item.install_state(),
            InstallState::NotStarted | InstallState::Waiting
        ) {
            return Ok(InstallReadiness::AlreadyHandled);
        }

        if !item.is_downloaded() {
            let status = format!("Waiting for {} to finish downloading", item.name());
            item_mut(&mut self.items, key)?.park();
            debug!(component = key, "Install deferred until download completes");
            return Ok(InstallReadiness::Deferred {
                reason: DeferReason::PendingDownload,
                status,
            });
        }

        let pending: Vec<ComponentKey> = item
            .prerequisites()
            .iter()
            .filter(|p| !self.is_satisfied(p.as_str()))
            .cloned()
            .collect();
        if !pending.is_empty() {
            let names: Vec<&str> = pending
                .iter()
                .map(|p| {
                    self.items
                        .get(p)
                        .map(InstallableItem::name)
                        .unwrap_or(p.as_str())
                })
                .collect();
            let status = format!("Waiting for {} to finish installation", names.join(", "));
            self.begin_install(key)?;
            debug!(component = key, pending = ?pending, "Install deferred until prerequisites finish");
            return Ok(InstallReadiness::Deferred {
                reason: DeferReason::PendingPrerequisites(pending),
                status,
            });
        }

        let item = item_mut(&mut self.items, key)?;
        item.start_install()?;
        let job = InstallJob {
            key: item.key().clone(),
            name: item.name().to_string(),
            variant: item.variant().clone(),
            downloaded_file: item.downloaded_file().to_path_buf(),
            target_dir: item.target_dir().to_path_buf(),
        };
        self.installing.insert(job.key.clone());
        info!(component = key, "Install started");
        Ok(InstallReadiness::Ready(job))
    }

    /// Mark an install as finished.
    ///
    /// Returns the wired dependents, in order, for the caller to invoke.
    /// Fires completion navigation once both sets drain.
    pub fn install_finished(&mut self, key: &str) -> TransitionResult<Vec<ComponentKey>> {
        let item = item_mut(&mut self.items, key)?;
        item.finish_install()?;
        let dependents = item.dependents().to_vec();
        self.installing.remove(key);
        info!(component = key, "Install finished");

        self.check_complete();
        Ok(dependents)
    }

    /// Mark an item skipped and drop it from both sets.
    ///
    /// Dependents are not triggered. Returns the parked items the skip left
    /// ready, in graph order, for the caller to install.
    pub fn skip(&mut self, key: &str) -> TransitionResult<Vec<ComponentKey>> {
        let item = item_mut(&mut self.items, key)?;
        item.skip()?;
        self.downloading.remove(key);
        let was_queued = self.installing.remove(key);
        info!(component = key, "Install skipped");

        let unblocked = self.unblocked();
        if was_queued {
            self.check_complete();
        }
        Ok(unblocked)
    }

    /// Downloaded items parked in `Waiting` whose prerequisites are all
    /// installed or skipped, in graph order.
    pub fn unblocked(&self) -> Vec<ComponentKey> {
        let mut ready: Vec<&ComponentKey> = self
            .installing
            .iter()
            .filter(|key| {
                self.items.get(*key).is_some_and(|item| {
                    item.install_state() == InstallState::Waiting
                        && item.is_downloaded()
                        && item
                            .prerequisites()
                            .iter()
                            .all(|p| self.is_satisfied(p.as_str()))
                })
            })
            .collect();
        ready.sort_by_key(|key| self.graph.position(key.as_str()));
        ready.into_iter().cloned().collect()
    }

    fn check_complete(&mut self) {
        if !self.downloading.is_empty() || !self.installing.is_empty() {
            return;
        }
        if self.navigation_fired {
            warn!("All work finished again after completion was already signalled");
            return;
        }
        self.navigation_fired = true;
        info!("All downloads and installs finished");
        self.navigator.go_to(COMPLETE_ROUTE);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn item(&self, key: &str) -> Option<&InstallableItem> {
        self.items.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ComponentKey> {
        self.items.keys()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Installed or skipped. Unknown keys are not satisfied.
    pub fn is_satisfied(&self, key: &str) -> bool {
        self.items
            .get(key)
            .is_some_and(|item| item.install_state().is_settled())
    }

    pub fn any_downloading(&self) -> bool {
        !self.downloading.is_empty()
    }

    pub fn any_installing(&self) -> bool {
        !self.installing.is_empty()
    }

    pub fn downloading(&self) -> &BTreeSet<ComponentKey> {
        &self.downloading
    }

    pub fn installing(&self) -> &BTreeSet<ComponentKey> {
        &self.installing
    }

    pub fn navigation_fired(&self) -> bool {
        self.navigation_fired
    }

    /// Drop every item and re-arm completion navigation.
    pub fn reset(&mut self) {
        self.items.clear();
        self.downloading.clear();
        self.installing.clear();
        self.navigation_fired = false;
        info!("Orchestrator reset");
    }

    pub fn snapshot(&self) -> OrchestratorSnapshot {
        OrchestratorSnapshot {
            items: self
                .items
                .values()
                .map(|item| ItemSnapshot {
                    key: item.key().clone(),
                    name: item.name().to_string(),
                    download: item.download_state(),
                    install: item.install_state(),
                    dependents: item.dependents().to_vec(),
                })
                .collect(),
            any_downloading: self.any_downloading(),
            any_installing: self.any_installing(),
            navigation_fired: self.navigation_fired,
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("items", &self.items.len())
            .field("downloading", &self.downloading)
            .field("installing", &self.installing)
            .field("navigation_fired", &self.navigation_fired)
            .finish()
    }
}

fn get<'a>(
    items: &'a BTreeMap<ComponentKey, InstallableItem>,
    key: &str,
) -> TransitionResult<&'a InstallableItem> {
    items.get(key).ok_or_else(|| TransitionError::UnknownComponent {
        key: ComponentKey::new(key),
    })
}

fn item_mut<'a>(
    items: &'a mut BTreeMap<ComponentKey, InstallableItem>,
    key: &str,
) -> TransitionResult<&'a mut InstallableItem> {
    items
        .get_mut(key)
        .ok_or_else(|| TransitionError::UnknownComponent {
            key: ComponentKey::new(key),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingNavigator {
        routes: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn go_to(&self, route: &str) {
            self.routes.lock().push(route.to_string());
        }
    }

    fn descriptor(key: &str) -> ComponentDescriptor {
        ComponentDescriptor::new(key, format!("{key}.zip"))
            .with_url(format!("http://example.com/{key}.zip"))
    }

    fn orchestrator() -> (Orchestrator, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::default());
        let layout = Arc::new(InstallLayout::new("/dp").with_temp_dir("/tmp/dl"));
        let orchestrator = Orchestrator::new(layout, navigator.clone());
        (orchestrator, navigator)
    }

    fn dependents<'a>(orchestrator: &'a Orchestrator, key: &str) -> Vec<&'a str> {
        orchestrator
            .item(key)
            .unwrap()
            .dependents()
            .iter()
            .map(ComponentKey::as_str)
            .collect()
    }

    #[test]
    fn test_register_all_skips_tools_and_wires() {
        let (mut orch, _) = orchestrator();
        let descriptors = vec![
            descriptor("jdk"),
            descriptor("devstudio"),
            descriptor("cdk"),
            descriptor("7zip").with_bundle(crate::component::Bundle::Tools),
        ];

        let keys = orch.register_all(&descriptors).unwrap();
        assert_eq!(keys.len(), 3);
        assert!(orch.item("7zip").is_none());
        assert_eq!(dependents(&orch, "jdk"), vec!["cdk", "devstudio"]);
        assert_eq!(
            orch.item("cdk").unwrap().prerequisites(),
            &[ComponentKey::new("jdk")]
        );
    }

    #[test]
    fn test_invalid_descriptor_leaves_registry_unchanged() {
        let (mut orch, _) = orchestrator();
        let descriptors = vec![descriptor("jdk"), ComponentDescriptor::new("cdk", "cdk.zip")];
        assert!(matches!(
            orch.register_all(&descriptors),
            Err(OrchestratorError::Component(_))
        ));
        assert!(orch.is_empty());
    }

    #[test]
    fn test_unknown_vertex_rolls_back_registration() {
        let (mut orch, _) = orchestrator();
        orch.register_one(&descriptor("jdk")).unwrap();

        let stray = descriptor("mystery").with_installer(crate::component::VariantKind::Copy);
        let err = orch.register_one(&stray).unwrap_err();
        assert!(matches!(err, OrchestratorError::Graph(_)));
        assert!(orch.item("mystery").is_none());
        assert_eq!(orch.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let (mut orch, _) = orchestrator();
        orch.register_one(&descriptor("jdk")).unwrap();
        let err = orch.register_one(&descriptor("jdk")).unwrap_err();
        assert!(matches!(err, OrchestratorError::AlreadyRegistered { .. }));
    }

    #[test]
    fn test_unregister_rewires_as_if_never_present() {
        let chain = ["jdk", "virtualbox", "hyperv", "cygwin", "cdk"];
        let (mut with_all, _) = orchestrator();
        with_all
            .register_all(&chain.map(descriptor))
            .unwrap();
        with_all.unregister("hyperv").unwrap();

        let (mut never, _) = orchestrator();
        never
            .register_all(&["jdk", "virtualbox", "cygwin", "cdk"].map(descriptor))
            .unwrap();

        for key in ["jdk", "virtualbox", "cygwin", "cdk"] {
            assert_eq!(dependents(&with_all, key), dependents(&never, key));
            assert_eq!(
                with_all.item(key).unwrap().prerequisites(),
                never.item(key).unwrap().prerequisites()
            );
        }
        assert_eq!(dependents(&with_all, "virtualbox"), vec!["cygwin"]);
    }

    #[test]
    fn test_wire_is_idempotent() {
        let (mut orch, _) = orchestrator();
        orch.register_all(&[descriptor("jdk"), descriptor("jbosseap")])
            .unwrap();
        orch.wire().unwrap();
        orch.wire().unwrap();
        assert_eq!(dependents(&orch, "jdk"), vec!["jbosseap"]);
        assert_eq!(orch.item("jbosseap").unwrap().prerequisites().len(), 1);
    }

    #[test]
    fn test_download_flag_tracks_set() {
        let (mut orch, _) = orchestrator();
        orch.register_all(&[descriptor("jdk"), descriptor("cdk")])
            .unwrap();
        assert!(!orch.any_downloading());

        assert!(orch.begin_download("jdk").unwrap());
        assert!(!orch.begin_download("jdk").unwrap());
        assert!(orch.begin_download("cdk").unwrap());
        assert!(orch.any_downloading());

        orch.download_finished("jdk").unwrap();
        assert!(orch.any_downloading());
        assert!(orch.installing().contains("jdk"));
        assert_eq!(
            orch.item("jdk").unwrap().install_state(),
            InstallState::Waiting
        );

        orch.download_finished("cdk").unwrap();
        assert!(!orch.any_downloading());
    }

    #[test]
    fn test_download_finished_without_start_is_illegal() {
        let (mut orch, _) = orchestrator();
        orch.register_one(&descriptor("jdk")).unwrap();
        assert!(matches!(
            orch.download_finished("jdk"),
            Err(TransitionError::IllegalDownload { .. })
        ));
        assert!(matches!(
            orch.begin_download("nope"),
            Err(TransitionError::UnknownComponent { .. })
        ));
    }

    #[test]
    fn test_readiness_waits_for_download_then_prerequisites() {
        let (mut orch, _) = orchestrator();
        orch.register_all(&[descriptor("jdk"), descriptor("cdk")])
            .unwrap();

        let readiness = orch.try_start_install("cdk").unwrap();
        assert!(matches!(
            readiness,
            InstallReadiness::Deferred {
                reason: DeferReason::PendingDownload,
                ..
            }
        ));
        assert!(!orch.installing().contains("cdk"));

        orch.begin_download("cdk").unwrap();
        orch.download_finished("cdk").unwrap();
        match orch.try_start_install("cdk").unwrap() {
            InstallReadiness::Deferred { reason, status } => {
                assert_eq!(
                    reason,
                    DeferReason::PendingPrerequisites(vec![ComponentKey::new("jdk")])
                );
                assert_eq!(status, "Waiting for jdk to finish installation");
            }
            other => panic!("expected deferral, got {other:?}"),
        }
        assert!(orch.installing().contains("cdk"));
    }

    #[test]
    fn test_ready_install_and_completion_navigation() {
        let (mut orch, navigator) = orchestrator();
        orch.register_all(&[descriptor("jdk"), descriptor("cdk")])
            .unwrap();

        orch.begin_download("jdk").unwrap();
        orch.begin_download("cdk").unwrap();
        orch.download_finished("jdk").unwrap();
        assert!(matches!(
            orch.try_start_install("jdk").unwrap(),
            InstallReadiness::Ready(_)
        ));
        assert!(matches!(
            orch.try_start_install("jdk").unwrap(),
            InstallReadiness::AlreadyHandled
        ));

        let next = orch.install_finished("jdk").unwrap();
        assert_eq!(next, vec![ComponentKey::new("cdk")]);
        assert!(navigator.routes.lock().is_empty());

        orch.download_finished("cdk").unwrap();
        assert!(matches!(
            orch.try_start_install("cdk").unwrap(),
            InstallReadiness::Ready(_)
        ));
        orch.install_finished("cdk").unwrap();

        assert_eq!(*navigator.routes.lock(), vec!["start".to_string()]);
        assert!(orch.navigation_fired());
        assert!(orch.snapshot().is_complete());
    }

    #[test]
    fn test_skip_satisfies_without_notifying() {
        let (mut orch, _) = orchestrator();
        orch.register_all(&[descriptor("jdk"), descriptor("cdk")])
            .unwrap();
        orch.skip("jdk").unwrap();

        assert!(orch.is_satisfied("jdk"));
        assert!(orch.item("jdk").unwrap().is_skipped());
        assert!(!orch.any_installing());
        assert!(orch.skip("jdk").is_err());
    }

    fn park_downloaded(orch: &mut Orchestrator, key: &str) {
        orch.begin_download(key).unwrap();
        orch.download_finished(key).unwrap();
        assert!(matches!(
            orch.try_start_install(key).unwrap(),
            InstallReadiness::Deferred { .. }
        ));
    }

    #[test]
    fn test_skip_returns_parked_dependents_in_graph_order() {
        let (mut orch, navigator) = orchestrator();
        orch.register_all(&[descriptor("jdk"), descriptor("cdk"), descriptor("jbosseap")])
            .unwrap();
        park_downloaded(&mut orch, "cdk");
        park_downloaded(&mut orch, "jbosseap");

        let unblocked = orch.skip("jdk").unwrap();
        assert_eq!(
            unblocked,
            vec![ComponentKey::new("jbosseap"), ComponentKey::new("cdk")]
        );
        assert!(orch.any_installing());
        assert!(navigator.routes.lock().is_empty());

        for key in &unblocked {
            assert!(matches!(
                orch.try_start_install(key.as_str()).unwrap(),
                InstallReadiness::Ready(_)
            ));
            orch.install_finished(key.as_str()).unwrap();
        }
        assert_eq!(*navigator.routes.lock(), vec!["start".to_string()]);
    }

    #[test]
    fn test_unblocked_ignores_items_still_downloading() {
        let (mut orch, _) = orchestrator();
        orch.register_all(&[descriptor("jdk"), descriptor("cdk")])
            .unwrap();
        orch.begin_download("cdk").unwrap();

        assert!(orch.skip("jdk").unwrap().is_empty());
    }

    #[test]
    fn test_unregister_leaves_parked_dependent_ready() {
        let (mut orch, _) = orchestrator();
        orch.register_all(&[descriptor("jdk"), descriptor("cdk")])
            .unwrap();
        park_downloaded(&mut orch, "cdk");
        assert!(orch.unblocked().is_empty());

        orch.unregister("jdk").unwrap();
        assert!(orch.item("cdk").unwrap().prerequisites().is_empty());
        assert_eq!(orch.unblocked(), vec![ComponentKey::new("cdk")]);
    }

    #[test]
    fn test_reset_rearms_navigation() {
        let (mut orch, navigator) = orchestrator();
        orch.register_one(&descriptor("jdk")).unwrap();
        orch.begin_download("jdk").unwrap();
        orch.download_finished("jdk").unwrap();
        orch.try_start_install("jdk").unwrap();
        orch.install_finished("jdk").unwrap();
        assert!(orch.navigation_fired());

        orch.reset();
        assert!(orch.is_empty());
        assert!(!orch.navigation_fired());

        orch.register_one(&descriptor("jdk")).unwrap();
        orch.begin_download("jdk").unwrap();
        orch.download_finished("jdk").unwrap();
        orch.try_start_install("jdk").unwrap();
        orch.install_finished("jdk").unwrap();
        assert_eq!(navigator.routes.lock().len(), 2);
    }

    #[test]
    fn test_snapshot_reflects_states() {
        let (mut orch, _) = orchestrator();
        orch.register_all(&[descriptor("jdk"), descriptor("cdk")])
            .unwrap();
        orch.begin_download("cdk").unwrap();

        let snapshot = orch.snapshot();
        assert!(snapshot.any_downloading);
        assert!(!snapshot.any_installing);
        let cdk = snapshot.item("cdk").unwrap();
        assert_eq!(cdk.download, crate::orchestrator::DownloadState::Downloading);
        assert_eq!(snapshot.item("jdk").unwrap().dependents.len(), 1);
    }
}
