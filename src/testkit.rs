//! Test doubles shared by unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, broadcast};

use crate::children::{ChildBus, ChildRef};
use crate::error::ChildError;
use crate::events::{Event, EventKind};

/// Operation recorded by [`MockChild`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Attach,
    Deactivate,
    Disable,
    Detach { force: bool },
}

/// Child bus that records every call.
pub struct MockChild {
    name: String,
    units: AtomicUsize,
    present: AtomicBool,
    fail_detach: AtomicBool,
    panic_attach: AtomicBool,
    calls: Mutex<Vec<Call>>,
    gate: Option<Gate>,
}

/// Holds `attach` until released.
struct Gate {
    entered: Notify,
    release: Notify,
}

impl MockChild {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            units: AtomicUsize::new(1),
            present: AtomicBool::new(false),
            fail_detach: AtomicBool::new(false),
            panic_attach: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn arc(name: &str) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    pub fn with_units(self, units: usize) -> Self {
        self.units.store(units, Ordering::SeqCst);
        self
    }

    pub fn with_card_present(self) -> Self {
        self.present.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_failing_detach(self) -> Self {
        self.fail_detach.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_panicking_attach(self) -> Self {
        self.panic_attach.store(true, Ordering::SeqCst);
        self
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Gate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    /// Waits until a gated `attach` is in progress.
    pub async fn attach_entered(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notified().await;
        }
    }

    /// Lets one gated `attach` finish.
    pub fn release_attach(&self) {
        if let Some(gate) = &self.gate {
            gate.release.notify_one();
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl ChildBus for MockChild {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_card_present(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    async fn attach(&self) -> usize {
        self.record(Call::Attach);
        if self.panic_attach.load(Ordering::SeqCst) {
            panic!("attach blew up");
        }
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.units.load(Ordering::SeqCst)
    }

    async fn deactivate(&self) {
        self.record(Call::Deactivate);
    }

    async fn disable(&self) {
        self.record(Call::Disable);
    }

    async fn detach(&self, force: bool) -> Result<(), ChildError> {
        self.record(Call::Detach { force });
        if self.fail_detach.load(Ordering::SeqCst) {
            return Err(ChildError::DetachFailed {
                reason: "device busy".into(),
            });
        }
        Ok(())
    }
}

/// Erases the concrete type while keeping the caller's `Arc` for assertions.
pub fn child_ref(child: &Arc<MockChild>) -> ChildRef {
    Arc::clone(child) as ChildRef
}

/// Collects events until `n` of them satisfy `pred`; returns all collected events.
pub async fn collect_until(
    rx: &mut broadcast::Receiver<Event>,
    n: usize,
    pred: impl Fn(&Event) -> bool,
) -> Vec<Event> {
    let mut seen = Vec::new();
    let mut hits = 0;
    let fut = async {
        while hits < n {
            match rx.recv().await {
                Ok(ev) => {
                    if pred(&ev) {
                        hits += 1;
                    }
                    seen.push(ev);
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("timed out waiting for events");
    seen
}

/// Waits for `n` outcome events.
pub async fn outcomes(rx: &mut broadcast::Receiver<Event>, n: usize) -> Vec<EventKind> {
    collect_until(rx, n, Event::is_outcome)
        .await
        .into_iter()
        .filter(Event::is_outcome)
        .map(|ev| ev.kind)
        .collect()
}
