//! In-process milestone channel.

use tokio::sync::broadcast;
use tracing::trace;

use super::{GateResult, Milestone, MilestoneChannel, MilestoneStream};
use crate::manager::BoxFuture;

/// Default number of buffered milestones per subscriber.
const DEFAULT_CAPACITY: usize = 64;

/// Broadcast channel shared by every waiter in this process.
#[derive(Debug, Clone)]
pub struct LocalChannel {
    sender: broadcast::Sender<Milestone>,
}

impl LocalChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LocalChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MilestoneChannel for LocalChannel {
    fn publish(&self, milestone: Milestone) -> BoxFuture<'_, GateResult<()>> {
        Box::pin(async move {
            // No subscribers is not an error: milestones are fire-and-forget.
            let delivered = self.sender.send(milestone).unwrap_or(0);
            trace!(delivered, "Published local milestone");
            Ok(())
        })
    }

    fn subscribe(&self) -> BoxFuture<'_, GateResult<MilestoneStream>> {
        let receiver = self.sender.subscribe();
        Box::pin(async move {
            let stream = futures::stream::unfold(receiver, |mut receiver| async move {
                loop {
                    match receiver.recv().await {
                        Ok(milestone) => return Some((Ok(milestone), receiver)),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            trace!("Milestone subscriber lagged by {} messages", n);
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            });
            Ok(Box::pin(stream) as MilestoneStream)
        })
    }
}
