use std::sync::Arc;

use tokio_util::sync::{CancellationToken, DropGuard};

use crate::children::{ChildRef, PendingConfig, PendingCounter};
use crate::events::Bus;
use crate::slot::Personality;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::config::SlotConfig;
use super::controller::SlotController;
use super::shared::Shared;

/// Builder for constructing a [`SlotController`].
pub struct SlotControllerBuilder {
    cfg: SlotConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    children: Vec<(Personality, ChildRef)>,
    pending: Option<Arc<dyn PendingConfig>>,
}

impl SlotControllerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SlotConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            children: Vec::new(),
            pending: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Installs the child bus for `p` (weakly referenced; keep your `Arc`).
    pub fn with_child(mut self, p: Personality, child: &ChildRef) -> Self {
        self.children.push((p, Arc::clone(child)));
        self
    }

    /// Sets the pending-configuration hook. Defaults to a private [`PendingCounter`].
    pub fn with_pending(mut self, pending: Arc<dyn PendingConfig>) -> Self {
        self.pending = Some(pending);
        self
    }

    /// Builds the controller (worker not started).
    ///
    /// With subscribers configured this spawns their workers and a bus listener, so it
    /// must then be called from within a tokio runtime.
    pub fn build(self) -> Arc<SlotController> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let shared = Arc::new(Shared::new(&self.cfg.name, bus.clone()));

        let listener = if self.subscribers.is_empty() {
            None
        } else {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            Some(subscriber_listener(&bus, set))
        };

        let pending = self
            .pending
            .unwrap_or_else(|| Arc::new(PendingCounter::new()));

        let ctrl = Arc::new(SlotController::new_internal(self.cfg, shared, pending, listener));
        for (p, child) in &self.children {
            ctrl.install_child(*p, child);
        }
        ctrl
    }
}

/// Forwards bus events to the subscriber set until the returned guard is dropped.
///
/// On exit the set is shut down, so subscribers drain what they already queued.
fn subscriber_listener(bus: &Bus, set: SubscriberSet) -> DropGuard {
    let mut rx = bus.subscribe();
    let token = CancellationToken::new();
    let stop = token.clone();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "subscriber listener lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
        set.shutdown().await;
    });
    token.drop_guard()
}
