//! # Example: Simulated Hot-Plug Socket
//!
//! A socket with a 32-bit and a 16-bit bus driver. A card is seated at start, then
//! the contacts bounce and a 16-bit card is swapped in.
//!
//! Run with:
//! ```text
//! RUST_LOG=cardslot=debug cargo run --example hotplug --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

use cardslot::{
    ChildBus, ChildError, ChildRef, LogWriter, PendingCounter, Personality, SlotConfig,
    SlotController, SlotEvent, Subscribe,
};

/// Bus driver that pretends to configure `units` functions.
struct SimBus {
    name: &'static str,
    units: usize,
    seated: AtomicBool,
}

impl SimBus {
    fn arc(name: &'static str, units: usize, seated: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            units,
            seated: AtomicBool::new(seated),
        })
    }
}

#[async_trait]
impl ChildBus for SimBus {
    fn name(&self) -> &str {
        self.name
    }

    fn is_card_present(&self) -> bool {
        self.seated.load(Ordering::SeqCst)
    }

    async fn attach(&self) -> usize {
        println!("[{}] attach: probing functions", self.name);
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.units
    }

    async fn deactivate(&self) {
        println!("[{}] deactivate", self.name);
    }

    async fn disable(&self) {
        println!("[{}] disable socket power", self.name);
    }

    async fn detach(&self, force: bool) -> Result<(), ChildError> {
        println!("[{}] detach (force={force})", self.name);
        self.seated.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cardslot=info")),
        )
        .init();

    let cardbus = SimBus::arc("cardbus0", 2, true);
    let pcmcia = SimBus::arc("pcmcia0", 1, false);
    let a: ChildRef = cardbus.clone();
    let b: ChildRef = pcmcia.clone();

    let pending = Arc::new(PendingCounter::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let slot = SlotController::builder(SlotConfig::named("cardslot0"))
        .with_subscribers(subs)
        .with_child(Personality::TypeA, &a)
        .with_child(Personality::TypeB, &b)
        .with_pending(pending.clone())
        .build();

    slot.start()?;
    pending.wait_settled().await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("[main] after probe: {:?}", slot.state());

    // Flaky contacts: the trailing remove wins, the insert in between never attaches.
    slot.raise_event(SlotEvent::RemoveCardTypeA);
    slot.raise_event(SlotEvent::InsertCardTypeA);
    slot.raise_event(SlotEvent::RemoveCardTypeA);
    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("[main] after bounce: {:?}", slot.state());

    pcmcia.seated.store(true, Ordering::SeqCst);
    slot.raise_event(SlotEvent::InsertCardTypeB);
    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("[main] after 16-bit insert: {:?}", slot.state());

    slot.raise_event(SlotEvent::RemoveCardTypeB);
    slot.stop().await;
    println!("[main] stopped: {:?}", slot.lifecycle());

    // Let the log subscriber flush before the runtime goes away.
    drop(slot);
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
