//! Topology Change Notifier
//!
//! The platform bridge (a window procedure on the UI thread, or a test)
//! calls [`TopologyNotifier::notify`] when the display settings or DPI
//! change. Registered callbacks run synchronously on that calling thread;
//! channel subscribers receive the change without blocking the caller.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

use crate::placement::PlacementTracker;

/// What changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyChange {
    /// Outputs attached/detached, resolution or arrangement changed
    DisplaySettings,
    /// DPI of a window's output changed
    Dpi {
        /// New DPI (96 = 100%)
        dpi: u32,
    },
}

/// Handle of a registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

type Callback = Arc<dyn Fn(TopologyChange) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    callbacks: Vec<(RegistrationId, Callback)>,
    subscribers: Vec<Sender<TopologyChange>>,
}

/// Fan-out of topology changes to callbacks and channels
#[derive(Default)]
pub struct TopologyNotifier {
    registry: Mutex<Registry>,
}

impl TopologyNotifier {
    /// Create a notifier with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback run on the notifying thread
    pub fn register<F>(&self, callback: F) -> RegistrationId
    where
        F: Fn(TopologyChange) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        registry.next_id += 1;
        let id = RegistrationId(registry.next_id);
        registry.callbacks.push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback; returns whether it was registered
    pub fn unregister(&self, id: RegistrationId) -> bool {
        let mut registry = self.registry.lock();
        let before = registry.callbacks.len();
        registry.callbacks.retain(|(rid, _)| *rid != id);
        registry.callbacks.len() != before
    }

    /// Receive every subsequent change on a channel
    pub fn subscribe(&self) -> Receiver<TopologyChange> {
        let (tx, rx) = unbounded();
        self.registry.lock().subscribers.push(tx);
        rx
    }

    /// Deliver `change` to every listener
    ///
    /// Callbacks are copied out before they run, so a callback may register
    /// or unregister without deadlocking.
    pub fn notify(&self, change: TopologyChange) {
        let callbacks: Vec<Callback> = {
            let mut registry = self.registry.lock();
            registry.subscribers.retain(|tx| tx.send(change).is_ok());
            registry.callbacks.iter().map(|(_, cb)| cb.clone()).collect()
        };

        debug!("Topology change {:?} -> {} callback(s)", change, callbacks.len());
        for callback in callbacks {
            callback(change);
        }
    }
}

/// Reconcile `tracker` whenever the topology changes
///
/// DPI changes trigger a reconcile only when `include_dpi` is set. The
/// registration holds the tracker weakly and becomes a no-op once it is
/// dropped.
pub fn reconcile_on_change(
    notifier: &TopologyNotifier,
    tracker: &Arc<PlacementTracker>,
    include_dpi: bool,
) -> RegistrationId {
    let weak: Weak<PlacementTracker> = Arc::downgrade(tracker);

    notifier.register(move |change| {
        if matches!(change, TopologyChange::Dpi { .. }) && !include_dpi {
            return;
        }
        let Some(tracker) = weak.upgrade() else {
            return;
        };

        if let Err(e) = tracker.reconcile() {
            warn!("Reconcile after {:?} failed: {}", change, e);
        }
    })
}
