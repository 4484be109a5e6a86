//! # Runtime event bus.
//!
//! One [`Bus`] per slot controller. Raisers, the worker and `stop` publish; the
//! subscriber listener and every receiver returned by `SlotController::subscribe`
//! observe.
//!
//! Publishing is a plain `broadcast::Sender::send`, so it is safe from probe
//! callbacks that must not wait. The channel is a ring buffer: a receiver that falls
//! more than `capacity` events behind gets `RecvError::Lagged` and resumes at the
//! oldest retained event. Nothing is stored when no receiver exists.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable publish handle plus receiver factory.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Bus retaining up to `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Sends to current receivers; dropped silently if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn subscriber_sees_events_published_after_subscribe() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::WorkerStarted));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::Settled));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::Settled);
    }

    #[tokio::test]
    async fn slow_receiver_lags() {
        let bus = Bus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..4 {
            bus.publish(Event::new(EventKind::EventRaised));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(2))
        ));
    }

    #[test]
    fn publish_without_receivers_does_not_fail() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::WorkerStopped));
    }
}
