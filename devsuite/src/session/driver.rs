//! The async install driver.
//!
//! [`InstallSession`] runs downloads and installs against the collaborators
//! and records every step in the shared [`Orchestrator`]. The orchestrator
//! lock is only taken for single transitions and always released before the
//! next `.await`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::{stream, StreamExt};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use super::collaborators::{
    CredentialProvider, FailureReporter, InstallStage, NoCredentials, ProgressSink,
    SilentProgress, TracingFailureReporter,
};
use super::error::{SessionError, SessionResult};
use super::waiter::MilestoneWaiter;
use crate::component::{ComponentDescriptor, ComponentKey, InstallContext, InstallLayout};
use crate::gate::{Milestone, MilestoneGate};
use crate::manager::{
    BoxFuture, DownloadConfig, DownloadRequest, Downloader, HttpDownloader, ManagerError,
    ProcessRunner, ProgressCallback, TokioProcessRunner,
};
use crate::orchestrator::{
    DeferReason, DownloadState, InstallReadiness, Orchestrator, OrchestratorSnapshot,
    TransitionError,
};

/// Result of asking a component to install.
#[derive(Debug)]
pub enum InstallOutcome {
    /// The install ran. `chained` holds the outcome of every wired dependent
    /// that was triggered, in graph order.
    Installed {
        chained: Outcomes,
    },
    /// Parked in `Waiting`; a later download or prerequisite completion
    /// resumes it.
    Deferred(DeferReason),
    /// Already installing, installed, or skipped.
    AlreadyHandled,
}

/// Per-component results of an operation that starts several installs.
pub type Outcomes = Vec<(ComponentKey, SessionResult<InstallOutcome>)>;

impl InstallOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, InstallOutcome::Installed { .. })
    }
}

/// What a download needs once the lock is released.
struct DownloadPlan {
    key: ComponentKey,
    request: Option<DownloadRequest>,
    destination: PathBuf,
    preinstalled: bool,
}

struct Inner {
    orchestrator: Arc<Mutex<Orchestrator>>,
    layout: Arc<InstallLayout>,
    downloader: Arc<dyn Downloader>,
    runner: Arc<dyn ProcessRunner>,
    credentials: Arc<dyn CredentialProvider>,
    failures: Arc<dyn FailureReporter>,
    progress: Arc<dyn ProgressSink>,
    gate: MilestoneGate,
    download_config: DownloadConfig,
}

/// Drives one orchestration session. Cheap to clone.
#[derive(Clone)]
pub struct InstallSession {
    inner: Arc<Inner>,
}

impl InstallSession {
    /// Shared registry handle.
    pub fn orchestrator(&self) -> &Arc<Mutex<Orchestrator>> {
        &self.inner.orchestrator
    }

    pub fn layout(&self) -> &Arc<InstallLayout> {
        &self.inner.layout
    }

    pub fn gate(&self) -> &MilestoneGate {
        &self.inner.gate
    }

    /// A waiter whose satisfied check reads this session's registry.
    pub fn milestones(&self) -> MilestoneWaiter {
        MilestoneWaiter::new(self.inner.gate.clone(), Arc::clone(&self.inner.orchestrator))
    }

    fn lock(&self) -> MutexGuard<'_, Orchestrator> {
        self.inner.orchestrator.lock()
    }

    pub fn registered_keys(&self) -> Vec<ComponentKey> {
        self.lock().keys().cloned().collect()
    }

    pub fn snapshot(&self) -> OrchestratorSnapshot {
        self.lock().snapshot()
    }

    /// Drop every item and register `descriptors` afresh.
    pub fn reload(&self, descriptors: &[ComponentDescriptor]) -> SessionResult<Vec<ComponentKey>> {
        let mut orchestrator = self.lock();
        orchestrator.reset();
        Ok(orchestrator.register_all(descriptors)?)
    }

    // ------------------------------------------------------------------
    // Downloads
    // ------------------------------------------------------------------

    /// Download a component, then start its install.
    ///
    /// A second call while the download is in flight is a no-op, as is a
    /// call after the download finished. A transport failure leaves the item
    /// `Downloading`; use [`retry_download`](Self::retry_download).
    pub async fn download(&self, key: &str) -> SessionResult<InstallOutcome> {
        let plan = {
            let mut orchestrator = self.lock();
            self.reserve(&mut orchestrator, key)?
        };

        match plan {
            Some(plan) => self.run_download(plan).await,
            None => Ok(InstallOutcome::AlreadyHandled),
        }
    }

    /// Re-run the transport for an item left `Downloading` by a failure.
    pub async fn retry_download(&self, key: &str) -> SessionResult<InstallOutcome> {
        let plan = {
            let orchestrator = self.lock();
            let state = orchestrator
                .item(key)
                .ok_or_else(|| unknown(key))?
                .download_state();
            match state {
                DownloadState::Downloading => Some(self.plan_download(&orchestrator, key)?),
                DownloadState::NotStarted => None,
                DownloadState::Downloaded => return Ok(InstallOutcome::AlreadyHandled),
            }
        };

        match plan {
            Some(plan) => {
                info!(component = key, "Retrying download");
                self.run_download(plan).await
            }
            None => self.download(key).await,
        }
    }

    /// Download every key, up to `parallel_downloads` transfers at once.
    ///
    /// Every key enters the downloading set before the first transfer
    /// starts, so completion cannot be signalled while some are still
    /// queued. Keys that need no download come first; the rest follow in
    /// completion order.
    pub async fn download_all<I>(&self, keys: I) -> Outcomes
    where
        I: IntoIterator<Item = ComponentKey>,
    {
        let mut results = Vec::new();
        let mut plans = Vec::new();
        {
            let mut orchestrator = self.lock();
            for key in keys {
                match self.reserve(&mut orchestrator, key.as_str()) {
                    Ok(Some(plan)) => plans.push(plan),
                    Ok(None) => results.push((key, Ok(InstallOutcome::AlreadyHandled))),
                    Err(e) => results.push((key, Err(e))),
                }
            }
        }

        let limit = self.inner.download_config.parallel_downloads.max(1);
        debug!(queued = plans.len(), limit, "Starting downloads");
        let finished: Vec<_> = stream::iter(plans)
            .map(|plan| async move {
                let key = plan.key.clone();
                let result = self.run_download(plan).await;
                (key, result)
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        results.extend(finished);
        results
    }

    /// Move `key` into the downloading set. `None` when it is already
    /// downloading or downloaded.
    fn reserve(
        &self,
        orchestrator: &mut Orchestrator,
        key: &str,
    ) -> SessionResult<Option<DownloadPlan>> {
        let item = orchestrator.item(key).ok_or_else(|| unknown(key))?;
        if item.is_downloaded() {
            debug!(component = key, "Already downloaded");
            return Ok(None);
        }
        if !orchestrator.begin_download(key)? {
            debug!(component = key, "Download already in progress");
            return Ok(None);
        }
        self.plan_download(orchestrator, key).map(Some)
    }

    fn plan_download(&self, orchestrator: &Orchestrator, key: &str) -> SessionResult<DownloadPlan> {
        let item = orchestrator.item(key).ok_or_else(|| unknown(key))?;
        let destination = item.downloaded_file().to_path_buf();

        let request = item.download_url().map(|url| {
            let credentials = if item.is_authenticated() {
                let credentials = self.inner.credentials.credentials();
                if credentials.is_none() {
                    warn!(component = key, "No credentials for authenticated download");
                }
                credentials
            } else {
                None
            };
            DownloadRequest::new(url, &destination)
                .with_credentials(credentials)
                .with_checksum(item.checksum().map(str::to_string))
        });

        Ok(DownloadPlan {
            key: item.key().clone(),
            request,
            destination,
            preinstalled: item.is_preinstalled(),
        })
    }

    async fn run_download(&self, plan: DownloadPlan) -> SessionResult<InstallOutcome> {
        let key = plan.key;
        let exists = tokio::fs::try_exists(&plan.destination)
            .await
            .unwrap_or(false);

        if plan.preinstalled || exists {
            info!(component = %key, file = %plan.destination.display(), "Installer already present, skipping download");
        } else if let Some(request) = plan.request {
            self.inner
                .progress
                .update(&key, InstallStage::Downloading, "Downloading");

            let sink = Arc::clone(&self.inner.progress);
            let progress_key = key.clone();
            let callback: ProgressCallback =
                Arc::new(move |done, total| sink.bytes(&progress_key, done, total));

            if let Err(source) = self.inner.downloader.download(&request, Some(callback)).await {
                return Err(self.fail(SessionError::Download {
                    key: key.clone(),
                    source,
                }));
            }
        } else {
            let source = ManagerError::DownloadFailed {
                url: String::new(),
                reason: format!("no download URL and no file at {}", plan.destination.display()),
            };
            return Err(self.fail(SessionError::Download {
                key: key.clone(),
                source,
            }));
        }

        self.lock().download_finished(key.as_str())?;
        self.install(key.as_str()).await
    }

    // ------------------------------------------------------------------
    // Installs
    // ------------------------------------------------------------------

    /// Install a component if it is ready, then chain its dependents.
    ///
    /// Safe to call from several paths: real work runs once per item. An
    /// item that is not downloaded, or whose prerequisites have not
    /// finished, is parked in `Waiting` and resumed later.
    pub fn install<'a>(&'a self, key: &'a str) -> BoxFuture<'a, SessionResult<InstallOutcome>> {
        Box::pin(async move {
            let readiness = self.lock().try_start_install(key)?;
            let job = match readiness {
                InstallReadiness::AlreadyHandled => return Ok(InstallOutcome::AlreadyHandled),
                InstallReadiness::Deferred { reason, status } => {
                    self.inner.progress.update(
                        &ComponentKey::new(key),
                        InstallStage::Waiting,
                        &status,
                    );
                    return Ok(InstallOutcome::Deferred(reason));
                }
                InstallReadiness::Ready(job) => job,
            };

            self.inner
                .progress
                .update(&job.key, InstallStage::Installing, "Installing");

            let ctx = InstallContext {
                key: job.key.clone(),
                name: job.name.clone(),
                downloaded_file: job.downloaded_file.clone(),
                target_dir: job.target_dir.clone(),
                layout: Arc::clone(&self.inner.layout),
                runner: Arc::clone(&self.inner.runner),
                milestones: self.milestones(),
                progress: Arc::clone(&self.inner.progress),
            };

            if let Err(source) = job.variant.install(&ctx).await {
                self.inner.progress.update(
                    &job.key,
                    InstallStage::Failed,
                    &format!("{} failed to install", job.name),
                );
                return Err(self.fail(SessionError::Install {
                    key: job.key,
                    source,
                }));
            }

            let dependents = self.lock().install_finished(key)?;
            self.inner
                .progress
                .update(&job.key, InstallStage::Complete, "Install complete");

            if let Err(e) = self.inner.gate.emit(Milestone::installed(job.key.clone())).await {
                warn!(component = %job.key, error = %e, "Failed to emit install milestone");
                self.inner.failures.report(&job.key, &SessionError::Gate(e));
            }

            if !dependents.is_empty() {
                debug!(component = %job.key, dependents = ?dependents, "Triggering dependents");
            }
            let results = join_all(dependents.iter().map(|d| self.install(d.as_str()))).await;
            let chained = dependents.into_iter().zip(results).collect();

            Ok(InstallOutcome::Installed { chained })
        })
    }

    /// Mark a component skipped and announce it.
    ///
    /// Dependents are not triggered, but parked installs the skip left ready
    /// are resumed; their outcomes are returned.
    pub async fn skip(&self, key: &str) -> SessionResult<Outcomes> {
        let unblocked = self.lock().skip(key)?;
        let key = ComponentKey::new(key);
        self.inner
            .progress
            .update(&key, InstallStage::Skipped, "Skipped");
        self.inner.gate.emit(Milestone::skipped(key)).await?;
        Ok(self.resume(unblocked).await)
    }

    /// Remove a component and re-wire, resuming parked installs that were
    /// only waiting on it.
    pub async fn unregister(&self, key: &str) -> SessionResult<Outcomes> {
        let unblocked = {
            let mut orchestrator = self.lock();
            orchestrator.unregister(key)?;
            orchestrator.unblocked()
        };
        Ok(self.resume(unblocked).await)
    }

    async fn resume(&self, keys: Vec<ComponentKey>) -> Outcomes {
        if !keys.is_empty() {
            info!(components = ?keys, "Resuming unblocked installs");
        }
        let results = join_all(keys.iter().map(|k| self.install(k.as_str()))).await;
        keys.into_iter().zip(results).collect()
    }

    // ------------------------------------------------------------------
    // Milestones
    // ------------------------------------------------------------------

    /// Wait until `key` is installed or skipped, here or in another process.
    pub async fn await_milestone(&self, key: &str, timeout: Option<Duration>) -> SessionResult<()> {
        self.milestones()
            .wait(&ComponentKey::new(key), timeout)
            .await?;
        Ok(())
    }

    /// Announce that `key` finished installing.
    pub async fn emit_milestone(&self, key: &str) -> SessionResult<()> {
        self.inner.gate.emit(Milestone::installed(key)).await?;
        Ok(())
    }

    fn fail(&self, err: SessionError) -> SessionError {
        if let Some(key) = err.component() {
            error!(component = %key, error = %err, "Operation failed");
            self.inner.failures.report(key, &err);
        }
        err
    }
}

impl std::fmt::Debug for InstallSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallSession")
            .field("orchestrator", &*self.inner.orchestrator.lock())
            .field("gate", &self.inner.gate)
            .finish_non_exhaustive()
    }
}

fn unknown(key: &str) -> TransitionError {
    TransitionError::UnknownComponent {
        key: ComponentKey::new(key),
    }
}

/// Builder for [`InstallSession`].
///
/// Unset collaborators fall back to the real adapters: an HTTP downloader
/// from the download config, a tokio process runner, no credentials, a
/// logging failure reporter, and an in-process milestone gate.
pub struct SessionBuilder {
    orchestrator: Orchestrator,
    downloader: Option<Arc<dyn Downloader>>,
    runner: Arc<dyn ProcessRunner>,
    credentials: Arc<dyn CredentialProvider>,
    failures: Arc<dyn FailureReporter>,
    progress: Arc<dyn ProgressSink>,
    gate: MilestoneGate,
    download_config: DownloadConfig,
}

impl SessionBuilder {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            downloader: None,
            runner: Arc::new(TokioProcessRunner::new()),
            credentials: Arc::new(NoCredentials),
            failures: Arc::new(TracingFailureReporter),
            progress: Arc::new(SilentProgress),
            gate: MilestoneGate::local(),
            download_config: DownloadConfig::default(),
        }
    }

    pub fn with_downloader(mut self, downloader: Arc<dyn Downloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_failure_reporter(mut self, failures: Arc<dyn FailureReporter>) -> Self {
        self.failures = failures;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_gate(mut self, gate: MilestoneGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_download_config(mut self, config: DownloadConfig) -> Self {
        self.download_config = config;
        self
    }

    /// Build the session.
    ///
    /// # Errors
    ///
    /// Fails only when the default HTTP downloader cannot be created.
    pub fn build(self) -> SessionResult<InstallSession> {
        let downloader = match self.downloader {
            Some(downloader) => downloader,
            None => Arc::new(HttpDownloader::from_config(&self.download_config)?),
        };
        let layout = Arc::clone(self.orchestrator.layout());

        Ok(InstallSession {
            inner: Arc::new(Inner {
                orchestrator: Arc::new(Mutex::new(self.orchestrator)),
                layout,
                downloader,
                runner: self.runner,
                credentials: self.credentials,
                failures: self.failures,
                progress: self.progress,
                gate: self.gate,
                download_config: self.download_config,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::LogNavigator;

    fn session() -> InstallSession {
        let layout = Arc::new(InstallLayout::new("/tmp/devsuite-test"));
        let mut orchestrator = Orchestrator::new(layout, Arc::new(LogNavigator));
        orchestrator
            .register_all(&[
                ComponentDescriptor::new("jdk", "jdk.zip").with_url("https://example.com/jdk.zip"),
                ComponentDescriptor::new("cdk", "cdk.zip").with_url("https://example.com/cdk.zip"),
            ])
            .unwrap();
        SessionBuilder::new(orchestrator).build().unwrap()
    }

    #[test]
    fn test_registered_keys_sorted() {
        let session = session();
        let keys: Vec<String> = session
            .registered_keys()
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(keys, vec!["cdk", "jdk"]);
    }

    #[tokio::test]
    async fn test_install_before_download_is_deferred() {
        let session = session();
        let outcome = session.install("cdk").await.unwrap();
        assert!(matches!(
            outcome,
            InstallOutcome::Deferred(DeferReason::PendingDownload)
        ));
        // Not downloaded yet, so nothing holds up completion.
        assert!(!session.snapshot().any_installing);
    }

    #[tokio::test]
    async fn test_unknown_component() {
        let session = session();
        let err = session.download("nope").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Transition(TransitionError::UnknownComponent { .. })
        ));
    }

    #[tokio::test]
    async fn test_skip_emits_milestone_and_satisfies_waiters() {
        let session = session();
        session.skip("jdk").await.unwrap();
        session
            .await_milestone("jdk", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(session.milestones().is_satisfied(&ComponentKey::new("jdk")));
    }

    #[test]
    fn test_reload_replaces_registry() {
        let session = session();
        let keys = session
            .reload(&[ComponentDescriptor::new("kompose", "kompose")
                .with_url("https://example.com/kompose")])
            .unwrap();
        assert_eq!(keys, vec![ComponentKey::new("kompose")]);
        assert_eq!(session.registered_keys().len(), 1);
    }
}
