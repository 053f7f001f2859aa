//! Cross-process install gate.
//!
//! Some installers must not start until another component has finished, even
//! when that component is installed by a different process, or finished in an
//! earlier run. The gate combines a synchronous state check with a
//! subscription to a [`MilestoneChannel`]:
//!
//! 1. If the caller's state check already reports the target installed or
//!    skipped, or the channel's history holds a milestone for it, return
//!    immediately without subscribing.
//! 2. Otherwise subscribe, check both once more (the milestone may have fired
//!    in between), then wait for the first milestone naming the target.
//!
//! A subscriber only sees milestones emitted after it subscribed; anything
//! older is reached through [`MilestoneChannel::in_history`]. Milestones for
//! other components are ignored by the waiter but still delivered to every
//! other subscriber.
//!
//! Two channels exist:
//!
//! | Channel          | Scope         | Transport                              |
//! |------------------|---------------|----------------------------------------|
//! | [`LocalChannel`] | one process   | `tokio::sync::broadcast`               |
//! | [`SpoolChannel`] | many processes | append-only JSON-lines file, polled   |

mod config;
mod error;
mod local;
mod spool;

pub use config::{default_spool_dir, GateConfig};
pub use error::{GateError, GateResult};
pub use local::LocalChannel;
pub use spool::{SpoolChannel, SPOOL_FILE};

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::component::ComponentKey;
use crate::manager::BoxFuture;

/// Lifecycle event carried by a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneEvent {
    Installed,
    Skipped,
}

/// A completion signal for one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub component: ComponentKey,
    pub event: MilestoneEvent,
    /// Process that emitted the milestone.
    pub pid: u32,
    pub emitted_at: DateTime<Utc>,
}

impl Milestone {
    pub fn new(component: impl Into<ComponentKey>, event: MilestoneEvent) -> Self {
        Self {
            component: component.into(),
            event,
            pid: std::process::id(),
            emitted_at: Utc::now(),
        }
    }

    pub fn installed(component: impl Into<ComponentKey>) -> Self {
        Self::new(component, MilestoneEvent::Installed)
    }

    pub fn skipped(component: impl Into<ComponentKey>) -> Self {
        Self::new(component, MilestoneEvent::Skipped)
    }
}

/// Stream of milestones seen by one subscriber.
pub type MilestoneStream = BoxStream<'static, GateResult<Milestone>>;

/// Transport that delivers milestones to every active subscriber.
pub trait MilestoneChannel: Send + Sync {
    /// Broadcast a milestone to every current subscriber.
    fn publish(&self, milestone: Milestone) -> BoxFuture<'_, GateResult<()>>;

    /// Start receiving milestones emitted from now on.
    fn subscribe(&self) -> BoxFuture<'_, GateResult<MilestoneStream>>;

    /// Whether a milestone for `component` was published before now, possibly
    /// by an earlier process. Channels without durable history report `false`.
    fn in_history<'a>(&'a self, _component: &'a ComponentKey) -> BoxFuture<'a, GateResult<bool>> {
        Box::pin(async { Ok(false) })
    }
}

/// Emits milestones and waits for them.
#[derive(Clone)]
pub struct MilestoneGate {
    channel: Arc<dyn MilestoneChannel>,
    default_timeout: Option<Duration>,
}

impl MilestoneGate {
    pub fn new(channel: Arc<dyn MilestoneChannel>) -> Self {
        Self {
            channel,
            default_timeout: None,
        }
    }

    /// A gate over a fresh in-process channel.
    pub fn local() -> Self {
        Self::new(Arc::new(LocalChannel::default()))
    }

    /// Timeout used when a wait does not pass one. `None` waits forever.
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    pub fn channel(&self) -> &Arc<dyn MilestoneChannel> {
        &self.channel
    }

    /// Broadcast a milestone.
    pub async fn emit(&self, milestone: Milestone) -> GateResult<()> {
        info!(
            component = %milestone.component,
            event = ?milestone.event,
            "Emitting milestone"
        );
        self.channel.publish(milestone).await
    }

    /// Wait until `target` reaches a completion milestone.
    ///
    /// `satisfied` is the synchronous state check; when it returns `true`, or
    /// the channel's history already names `target`, the wait resolves
    /// without subscribing. A `timeout` of `None` falls back
    /// to the gate's default; if that is also `None` the wait is unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Timeout`] when a timeout elapses, or a channel
    /// error if the history query or the subscription fails.
    pub async fn await_milestone<F>(
        &self,
        target: &ComponentKey,
        satisfied: F,
        timeout: Option<Duration>,
    ) -> GateResult<()>
    where
        F: Fn() -> bool + Send + Sync,
    {
        if satisfied() || self.channel.in_history(target).await? {
            debug!(component = %target, "Milestone already satisfied");
            return Ok(());
        }

        let mut stream = self.channel.subscribe().await?;
        if satisfied() || self.channel.in_history(target).await? {
            debug!(component = %target, "Milestone satisfied while subscribing");
            return Ok(());
        }

        info!(component = %target, "Waiting for milestone");
        let wait = async {
            while let Some(milestone) = stream.next().await {
                let milestone = milestone?;
                if milestone.component == *target {
                    info!(component = %target, event = ?milestone.event, "Milestone received");
                    return Ok(());
                }
                trace!(
                    component = %milestone.component,
                    waiting_for = %target,
                    "Ignoring milestone for another component"
                );
            }
            Err(GateError::ChannelClosed {
                component: target.clone(),
            })
        };

        match timeout.or(self.default_timeout) {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| GateError::Timeout {
                    component: target.clone(),
                    waited_secs: limit.as_secs(),
                })?,
            None => wait.await,
        }
    }
}

impl std::fmt::Debug for MilestoneGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MilestoneGate")
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counts subscriptions on top of a local channel.
    #[derive(Default)]
    struct CountingChannel {
        inner: LocalChannel,
        subscriptions: AtomicUsize,
    }

    impl MilestoneChannel for CountingChannel {
        fn publish(&self, milestone: Milestone) -> BoxFuture<'_, GateResult<()>> {
            self.inner.publish(milestone)
        }

        fn subscribe(&self) -> BoxFuture<'_, GateResult<MilestoneStream>> {
            self.subscriptions.fetch_add(1, Ordering::SeqCst);
            self.inner.subscribe()
        }
    }

    fn key(name: &str) -> ComponentKey {
        ComponentKey::new(name)
    }

    #[tokio::test]
    async fn test_satisfied_target_resolves_without_subscribing() {
        let channel = Arc::new(CountingChannel::default());
        let gate = MilestoneGate::new(channel.clone());

        gate.await_milestone(&key("jdk"), || true, None)
            .await
            .unwrap();

        assert_eq!(channel.subscriptions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolves_after_matching_milestone() {
        let gate = MilestoneGate::local();
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.await_milestone(&key("jdk"), || false, None).await })
        };

        // Let the waiter subscribe before emitting.
        while !waiter.is_finished() {
            tokio::task::yield_now().await;
            gate.emit(Milestone::installed("jdk")).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        waiter.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_component_milestone_is_ignored() {
        let gate = MilestoneGate::local();
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.await_milestone(&key("jdk"), || false, Some(Duration::from_secs(30)))
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        gate.emit(Milestone::installed("virtualbox")).await.unwrap();

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(GateError::Timeout { waited_secs: 30, .. })));
    }

    #[tokio::test]
    async fn test_other_waiters_still_see_ignored_milestones() {
        let gate = MilestoneGate::local();
        let jdk_waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                gate.await_milestone(&key("jdk"), || false, Some(Duration::from_millis(200)))
                    .await
            })
        };
        let vbox_waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.await_milestone(&key("virtualbox"), || false, None).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        gate.emit(Milestone::installed("virtualbox")).await.unwrap();

        vbox_waiter.await.unwrap().unwrap();
        assert!(jdk_waiter.await.unwrap().is_err());
    }

    /// Local channel whose history already holds one component.
    struct RememberingChannel {
        inner: LocalChannel,
        remembered: ComponentKey,
        subscriptions: AtomicUsize,
    }

    impl MilestoneChannel for RememberingChannel {
        fn publish(&self, milestone: Milestone) -> BoxFuture<'_, GateResult<()>> {
            self.inner.publish(milestone)
        }

        fn subscribe(&self) -> BoxFuture<'_, GateResult<MilestoneStream>> {
            self.subscriptions.fetch_add(1, Ordering::SeqCst);
            self.inner.subscribe()
        }

        fn in_history<'a>(
            &'a self,
            component: &'a ComponentKey,
        ) -> BoxFuture<'a, GateResult<bool>> {
            Box::pin(async move { Ok(*component == self.remembered) })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_milestone_in_history_resolves_wait() {
        let channel = Arc::new(RememberingChannel {
            inner: LocalChannel::default(),
            remembered: key("jdk"),
            subscriptions: AtomicUsize::new(0),
        });
        let gate = MilestoneGate::new(channel.clone());

        gate.await_milestone(&key("jdk"), || false, Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert_eq!(channel.subscriptions.load(Ordering::SeqCst), 0);

        let err = gate
            .await_milestone(&key("cdk"), || false, Some(Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_recheck_after_subscribe() {
        let gate = MilestoneGate::local();
        let calls = AtomicUsize::new(0);

        // First check fails, the re-check after subscribing succeeds.
        gate.await_milestone(
            &key("jdk"),
            || calls.fetch_add(1, Ordering::SeqCst) >= 1,
            None,
        )
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_timeout_applies() {
        let gate = MilestoneGate::local().with_default_timeout(Some(Duration::from_secs(5)));
        let flag = AtomicBool::new(false);
        let err = gate
            .await_milestone(&key("jdk"), || flag.load(Ordering::SeqCst), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out after 5s"));
    }

    #[test]
    fn test_milestone_json_shape() {
        let milestone = Milestone::skipped("cdk");
        let json = serde_json::to_value(&milestone).unwrap();
        assert_eq!(json["component"], "cdk");
        assert_eq!(json["event"], "skipped");
        assert_eq!(json["pid"], std::process::id());
    }
}
