//! Best-effort analytics emitter
//!
//! Deliveries run on their own tasks and never report back to the caller that
//! triggered them. The only trace of a delivery is the event appended to the
//! log with its final [`DeliveryStatus`]. Nothing is retried.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::{bounded, StoreChange};
use crate::domain::events::{AnalyticsEvent, DeliveryStatus};
use crate::services::AnalyticsSink;

#[derive(Clone)]
pub struct AnalyticsEmitter {
    sink: Arc<dyn AnalyticsSink>,
    log: Arc<RwLock<Vec<AnalyticsEvent>>>,
    tracker: TaskTracker,
    settling: Arc<Mutex<()>>,
    runtime: Handle,
    timeout: Duration,
    shutdown: CancellationToken,
    changes: broadcast::Sender<StoreChange>,
}

impl std::fmt::Debug for AnalyticsEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsEmitter")
            .field("recorded", &self.log.read().len())
            .field("in_flight", &self.tracker.len())
            .finish()
    }
}

impl AnalyticsEmitter {
    pub(crate) fn new(
        sink: Arc<dyn AnalyticsSink>,
        runtime: Handle,
        timeout: Duration,
        shutdown: CancellationToken,
        changes: broadcast::Sender<StoreChange>,
    ) -> Self {
        Self { sink, log: Arc::default(), tracker: TaskTracker::new(), settling: Arc::default(), runtime, timeout, shutdown, changes }
    }

    /// Schedules delivery and returns immediately.
    pub fn emit(&self, event: AnalyticsEvent) {
        let emitter = self.clone();
        self.tracker.spawn_on(async move { emitter.deliver(event).await; }, &self.runtime);
    }

    /// Delivers one event and appends it to the log. Returns `None` if the store shut down first.
    pub async fn deliver(&self, event: AnalyticsEvent) -> Option<DeliveryStatus> {
        let status = match bounded(self.timeout, &self.shutdown, self.sink.send(&event)).await {
            Ok(true) => DeliveryStatus::Sent,
            Ok(false) => DeliveryStatus::Failed,
            Err(e) if self.shutdown.is_cancelled() => {
                tracing::debug!(event_id = %event.id, "Dropping analytics event on shutdown: {}", e);
                return None;
            }
            Err(e) => {
                tracing::debug!(event_id = %event.id, "Analytics delivery failed: {}", e);
                DeliveryStatus::Failed
            }
        };
        tracing::debug!(event_id = %event.id, kind = ?event.kind, ?status, "Analytics event recorded");
        self.log.write().push(event.resolved(status));
        let _ = self.changes.send(StoreChange::Analytics);
        Some(status)
    }

    /// Waits until every delivery scheduled so far has been recorded or dropped.
    ///
    /// Overlapping callers are queued so the tracker is never reopened under a waiter.
    pub async fn settle(&self) {
        let _settling = self.settling.lock().await;
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> { self.log.read().clone() }
    pub fn recorded(&self) -> usize { self.log.read().len() }
    pub fn in_flight(&self) -> usize { self.tracker.len() }
}
