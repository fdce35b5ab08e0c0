//! Window Placement Tracker
//!
//! Remembers which window was placed on which output and replays those
//! placements after the display topology changes.
//!
//! # Locking
//!
//! A single mutex guards the entry arena. It is held only to mutate or copy
//! entries: liveness queries, window moves, closed-watch registration and
//! change notifications all happen after it is released, so a host that calls
//! back into the tracker cannot deadlock it.
//!
//! # Lifetime
//!
//! Entries never own their window. Liveness is asked of the [`WindowHost`] on
//! every access and dead entries are purged lazily. Closed-window callbacks
//! hold only a weak reference to the tracker state plus a generational key,
//! so a callback arriving after its slot was reused is ignored.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PlacementConfig;
use crate::display::{resolve_in, DisplayService, OutputIdentity, OutputInfo, ResolvedBy};
use crate::placement::arena::{Arena, ArenaKey};
use crate::placement::geometry::{placement_rect, PlacementOptions};
use crate::placement::host::{MoveFlag, WatchId, WindowHandle, WindowHost};
use crate::placement::{PlacementError, Result};

/// Emitted whenever the set of tracked windows changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedSetChanged {
    /// Number of tracked windows after the change
    pub count: usize,
}

/// Immutable view of one tracked window
#[derive(Debug, Clone, Serialize)]
pub struct TrackedWindowSnapshot {
    /// Entry id
    pub id: Uuid,

    /// Tracked window
    pub window: WindowHandle,

    /// Window title, or the handle when the title is unavailable
    pub display_name: String,

    /// Liveness at the time of the snapshot
    pub is_alive: bool,

    /// Output the window was last placed on
    pub identity: OutputIdentity,

    /// Friendly name of that output when it was last seen
    pub last_known_name: String,

    /// Placement options replayed on reconcile
    pub options: PlacementOptions,
}

/// One successful re-placement
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledWindow {
    /// Entry id
    pub id: Uuid,
    /// Window that was moved
    pub window: WindowHandle,
    /// Output it now sits on
    pub output: OutputIdentity,
    /// How that output was chosen
    pub resolved_by: ResolvedBy,
}

/// Outcome of [`PlacementTracker::reconcile`]
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Windows moved back into place
    pub placements: Vec<ReconciledWindow>,
    /// Entries with no resolvable output
    pub skipped: Vec<Uuid>,
    /// Entries whose move failed
    pub failed: Vec<Uuid>,
}

#[derive(Debug)]
struct TrackedWindowEntry {
    id: Uuid,
    window: WindowHandle,
    identity: OutputIdentity,
    last_known_name: String,
    options: PlacementOptions,
    watch: Option<WatchId>,
}

#[derive(Default)]
struct TrackerState {
    entries: Mutex<Arena<TrackedWindowEntry>>,
    subscribers: Mutex<Vec<Sender<TrackedSetChanged>>>,
}

impl TrackerState {
    fn publish(&self, count: usize) {
        debug!("Tracked window set changed, {} entries", count);
        self.subscribers
            .lock()
            .retain(|tx| tx.send(TrackedSetChanged { count }).is_ok());
    }

    /// Closed-window callback target
    fn remove_closed(&self, key: ArenaKey) {
        let removed = {
            let mut entries = self.entries.lock();
            entries.remove(key).map(|entry| (entry, entries.len()))
        };

        if let Some((entry, count)) = removed {
            debug!("Window {} closed, dropping entry {}", entry.window, entry.id);
            self.publish(count);
        }
    }
}

/// Records window placements and replays them on topology change
pub struct PlacementTracker {
    state: Arc<TrackerState>,
    display: Arc<DisplayService>,
    host: Arc<dyn WindowHost>,
    activate: bool,
}

impl PlacementTracker {
    /// Create an empty tracker
    pub fn new(display: Arc<DisplayService>, host: Arc<dyn WindowHost>) -> Self {
        Self {
            state: Arc::new(TrackerState::default()),
            display,
            host,
            activate: false,
        }
    }

    /// Tracker set up from the `[placement]` configuration section
    pub fn from_config(
        display: Arc<DisplayService>,
        host: Arc<dyn WindowHost>,
        config: &PlacementConfig,
    ) -> Self {
        Self::new(display, host).with_activation(config.activate)
    }

    /// Whether moved windows are activated (default: false)
    pub fn with_activation(mut self, activate: bool) -> Self {
        self.activate = activate;
        self
    }

    /// Display service used for enumeration
    pub fn display(&self) -> &Arc<DisplayService> {
        &self.display
    }

    /// Channel of membership changes
    pub fn subscribe(&self) -> Receiver<TrackedSetChanged> {
        let (tx, rx) = unbounded();
        self.state.subscribers.lock().push(tx);
        rx
    }

    /// Remember that `window` belongs on `output`
    ///
    /// Recording an already tracked window updates its entry in place and
    /// returns the existing id.
    pub fn record(&self, window: WindowHandle, output: &OutputInfo, options: PlacementOptions) -> Uuid {
        let dead = self.reap();

        let (id, new_key, count) = {
            let mut entries = self.state.entries.lock();

            match entries.find_key(|e| e.window == window) {
                Some(key) => {
                    let mut id = Uuid::nil();
                    if let Some(entry) = entries.get_mut(key) {
                        entry.identity = output.identity;
                        entry.last_known_name = output.friendly_name.clone();
                        entry.options = options;
                        id = entry.id;
                    }
                    (id, None, entries.len())
                }
                None => {
                    let id = Uuid::new_v4();
                    let key = entries.insert(TrackedWindowEntry {
                        id,
                        window,
                        identity: output.identity,
                        last_known_name: output.friendly_name.clone(),
                        options,
                        watch: None,
                    });
                    (id, Some(key), entries.len())
                }
            }
        };

        let changed = new_key.is_some() || !dead.is_empty();
        self.release(dead);

        // Published before watching: a synchronous closed callback publishes after us
        if changed {
            self.state.publish(count);
        }

        match new_key {
            Some(key) => {
                info!("Tracking window {} on {} ({})", window, output.identity, output.label());
                self.watch(window, key);
            }
            None => debug!("Updated tracked window {} -> {}", window, output.identity),
        }
        id
    }

    /// Stop tracking `window`; returns whether it was tracked
    ///
    /// The entry and its closed-watch are taken in one step, so a callback
    /// racing with this call finds nothing left to remove.
    pub fn forget(&self, window: WindowHandle) -> bool {
        let dead = self.reap();
        self.settle(dead);

        let removed = {
            let mut entries = self.state.entries.lock();
            entries
                .find_key(|e| e.window == window)
                .and_then(|key| entries.remove(key))
                .map(|entry| (entry, entries.len()))
        };

        let Some((entry, count)) = removed else {
            return false;
        };

        if let Some(watch) = entry.watch {
            self.host.unwatch(watch);
        }
        info!("Forgot window {}", window);
        self.state.publish(count);
        true
    }

    /// Snapshot of every live tracked window
    pub fn tracked(&self) -> Vec<TrackedWindowSnapshot> {
        let dead = self.reap();
        self.settle(dead);

        let rows: Vec<_> = self
            .state
            .entries
            .lock()
            .iter()
            .map(|(_, e)| (e.id, e.window, e.identity, e.last_known_name.clone(), e.options))
            .collect();

        rows.into_iter()
            .map(|(id, window, identity, last_known_name, options)| TrackedWindowSnapshot {
                id,
                window,
                display_name: self
                    .host
                    .window_title(window)
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| window.to_string()),
                is_alive: self.host.is_window_alive(window),
                identity,
                last_known_name,
                options,
            })
            .collect()
    }

    /// Window of a tracked entry, if it is still alive
    ///
    /// Entries whose window has died are removed as a side effect.
    pub fn try_get_window(&self, id: Uuid) -> Option<WindowHandle> {
        let dead = self.reap();
        self.settle(dead);

        let (key, window) = {
            let entries = self.state.entries.lock();
            let key = entries.find_key(|e| e.id == id)?;
            (key, entries.get(key)?.window)
        };

        if self.host.is_window_alive(window) {
            return Some(window);
        }

        // Died since the reap; the key's generation guards against slot reuse
        let removed = self.state.entries.lock().remove(key);
        if let Some(entry) = removed {
            debug!("Entry {} refers to dead window {}", id, entry.window);
            self.settle(vec![entry]);
        }
        None
    }

    /// Move `window` onto `output` and start tracking it
    ///
    /// # Errors
    ///
    /// [`PlacementError::WindowGone`] or [`PlacementError::MoveFailed`]; the
    /// window is not tracked in that case.
    pub fn place(&self, window: WindowHandle, output: &OutputInfo, options: PlacementOptions) -> Result<Uuid> {
        self.apply(window, output, &options)?;
        Ok(self.record(window, output, options))
    }

    /// Re-apply every tracked placement against the current topology
    ///
    /// Enumerates once. Each window is resolved by its last-known identity,
    /// then by its last-known output name, then to the best available
    /// output. A window that cannot be resolved or moved is logged and
    /// skipped without affecting the rest.
    ///
    /// # Errors
    ///
    /// Only when enumeration itself fails.
    pub fn reconcile(&self) -> Result<ReconcileReport> {
        let dead = self.reap();
        self.settle(dead);

        let rows: Vec<_> = self
            .state
            .entries
            .lock()
            .iter()
            .map(|(key, e)| (key, e.id, e.window, e.identity, e.last_known_name.clone(), e.options))
            .collect();

        if rows.is_empty() {
            return Ok(ReconcileReport::default());
        }

        let outputs = self.display.enumerate()?;
        let mut report = ReconcileReport::default();

        for (key, id, window, identity, last_known_name, options) in rows {
            let hint = Some(last_known_name.as_str()).filter(|n| !n.trim().is_empty());
            let (output, resolved_by) = match resolve_in(&outputs, identity, hint) {
                Ok(found) => found,
                Err(e) => {
                    warn!("Skipping window {}: {}", window, e);
                    report.skipped.push(id);
                    continue;
                }
            };

            if let Err(e) = self.apply(window, output, &options) {
                warn!("Failed to re-place window {} on {}: {}", window, output.identity, e);
                report.failed.push(id);
                continue;
            }

            {
                let mut entries = self.state.entries.lock();
                if let Some(entry) = entries.get_mut(key).filter(|e| e.id == id) {
                    entry.identity = output.identity;
                    if !output.friendly_name.is_empty() {
                        entry.last_known_name = output.friendly_name.clone();
                    }
                }
            }

            report.placements.push(ReconciledWindow {
                id,
                window,
                output: output.identity,
                resolved_by,
            });
        }

        info!(
            "Reconciled {} window(s), {} skipped, {} failed",
            report.placements.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn apply(&self, window: WindowHandle, output: &OutputInfo, options: &PlacementOptions) -> Result<()> {
        if !self.host.is_window_alive(window) {
            return Err(PlacementError::WindowGone(window));
        }

        let scale = self.host.scale_factor(window);
        let (rect, mut flags) = placement_rect(&output.bounds, options, scale);
        flags |= MoveFlag::NoZOrder;
        if !self.activate {
            flags |= MoveFlag::NoActivate;
        }

        self.host
            .move_window(window, rect, flags)
            .map_err(|e| PlacementError::MoveFailed { window, code: e.0 })?;

        info!("Placed window {} on {} at {:?}", window, output.label(), rect);
        Ok(())
    }

    /// Remove entries whose window is gone
    ///
    /// Liveness is queried with the lock released because a host may run a
    /// closed callback from inside `is_window_alive`.
    fn reap(&self) -> Vec<TrackedWindowEntry> {
        let windows: Vec<(ArenaKey, WindowHandle)> = self
            .state
            .entries
            .lock()
            .iter()
            .map(|(key, e)| (key, e.window))
            .collect();

        let gone: Vec<ArenaKey> = windows
            .into_iter()
            .filter(|(_, window)| !self.host.is_window_alive(*window))
            .map(|(key, _)| key)
            .collect();
        if gone.is_empty() {
            return Vec::new();
        }

        let mut entries = self.state.entries.lock();
        let dead: Vec<_> = gone.into_iter().filter_map(|key| entries.remove(key)).collect();
        for entry in &dead {
            debug!("Reaped entry {} for dead window {}", entry.id, entry.window);
        }
        dead
    }

    /// Detach closed-watches of removed entries; lock must be released
    fn release(&self, dead: Vec<TrackedWindowEntry>) {
        for watch in dead.into_iter().filter_map(|e| e.watch) {
            self.host.unwatch(watch);
        }
    }

    /// [`Self::release`] plus the change notification when anything was removed
    fn settle(&self, dead: Vec<TrackedWindowEntry>) {
        if dead.is_empty() {
            return;
        }
        self.release(dead);
        let count = self.state.entries.lock().len();
        self.state.publish(count);
    }

    fn watch(&self, window: WindowHandle, key: ArenaKey) {
        let weak: Weak<TrackerState> = Arc::downgrade(&self.state);
        let callback = Box::new(move || {
            if let Some(state) = weak.upgrade() {
                state.remove_closed(key);
            }
        });

        let Some(watch) = self.host.watch_closed(window, callback) else {
            return;
        };

        let attached = {
            let mut entries = self.state.entries.lock();
            match entries.get_mut(key) {
                Some(entry) => {
                    entry.watch = Some(watch);
                    true
                }
                None => false,
            }
        };

        if !attached {
            self.host.unwatch(watch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{
        ApplyCode, BufferSizes, DisplayConfigBackend, LegacyDevice, LegacyDisplayBackend,
        LegacyMode, ModeUpdate, NativeError, PixelRect, QueryStrategy, RawTopology,
        TargetDeviceName,
    };
    use crate::placement::host::{ClosedCallback, MoveFlags};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct NoDisplays;

    impl DisplayConfigBackend for NoDisplays {
        fn buffer_sizes(&self, _: QueryStrategy) -> std::result::Result<BufferSizes, NativeError> {
            Ok(BufferSizes::default())
        }
        fn query(&self, _: QueryStrategy, _: BufferSizes) -> std::result::Result<RawTopology, NativeError> {
            Ok(RawTopology::default())
        }
        fn source_name(&self, _: crate::display::PathEndpoint) -> std::result::Result<String, NativeError> {
            Err(NativeError::GEN_FAILURE)
        }
        fn target_name(&self, _: crate::display::PathEndpoint) -> std::result::Result<TargetDeviceName, NativeError> {
            Err(NativeError::GEN_FAILURE)
        }
    }

    impl LegacyDisplayBackend for NoDisplays {
        fn devices(&self) -> Vec<LegacyDevice> {
            vec![]
        }
        fn current_mode(&self, _: &str) -> std::result::Result<LegacyMode, NativeError> {
            Err(NativeError::GEN_FAILURE)
        }
        fn apply_mode(&self, _: &str, _: &ModeUpdate, _: bool) -> ApplyCode {
            ApplyCode::FAILED
        }
    }

    #[derive(Default)]
    struct Host {
        alive: Mutex<HashSet<u64>>,
        watches: Mutex<HashMap<u64, (u64, ClosedCallback)>>,
        unwatched: Mutex<Vec<WatchId>>,
        moves: Mutex<Vec<(WindowHandle, PixelRect, MoveFlags)>>,
        /// Liveness queries deliver pending closed callbacks of dead windows
        notify_on_query: AtomicBool,
        /// Closed callbacks run inside `watch_closed`
        notify_on_watch: AtomicBool,
    }

    impl Host {
        fn open(&self, window: u64) {
            self.alive.lock().insert(window);
        }

        fn close(&self, window: u64) {
            self.alive.lock().remove(&window);
        }

        /// Close and fire the closed-watch outside of any host lock
        fn close_and_notify(&self, window: u64) {
            self.close(window);
            self.fire(window);
        }

        fn fire(&self, window: u64) {
            let callbacks: Vec<ClosedCallback> = {
                let mut watches = self.watches.lock();
                let ids: Vec<u64> = watches
                    .iter()
                    .filter(|(_, (w, _))| *w == window)
                    .map(|(id, _)| *id)
                    .collect();
                ids.into_iter()
                    .filter_map(|id| watches.remove(&id).map(|(_, cb)| cb))
                    .collect()
            };
            for callback in callbacks {
                callback();
            }
        }
    }

    impl WindowHost for Host {
        fn is_window_alive(&self, window: WindowHandle) -> bool {
            let alive = self.alive.lock().contains(&window.0);
            if !alive && self.notify_on_query.load(Ordering::SeqCst) {
                self.fire(window.0);
            }
            alive
        }

        fn window_title(&self, window: WindowHandle) -> Option<String> {
            (window.0 == 1).then(|| "Editor".to_string())
        }

        fn move_window(&self, window: WindowHandle, rect: PixelRect, flags: MoveFlags) -> std::result::Result<(), NativeError> {
            self.moves.lock().push((window, rect, flags));
            Ok(())
        }

        fn watch_closed(&self, window: WindowHandle, callback: ClosedCallback) -> Option<WatchId> {
            if self.notify_on_watch.load(Ordering::SeqCst) {
                callback();
            }
            let mut watches = self.watches.lock();
            let id = watches.len() as u64 + 100;
            watches.insert(id, (window.0, callback));
            Some(WatchId(id))
        }

        fn unwatch(&self, id: WatchId) {
            self.watches.lock().remove(&id.0);
            self.unwatched.lock().push(id);
        }
    }

    fn tracker(host: &Arc<Host>) -> PlacementTracker {
        let backend = Arc::new(NoDisplays);
        let display = Arc::new(DisplayService::new(backend.clone(), backend));
        PlacementTracker::new(display, host.clone())
    }

    fn output(id: u32, name: &str) -> OutputInfo {
        OutputInfo {
            identity: OutputIdentity::new(7, id),
            gdi_name: String::new(),
            device_path: String::new(),
            friendly_name: name.to_string(),
            edid_manufacturer: None,
            edid_product_code: None,
            bounds: PixelRect::from_origin_size(0, 0, 1920, 1080),
            is_primary: true,
        }
    }

    #[test]
    fn test_record_is_idempotent_per_window() {
        let host = Arc::new(Host::default());
        host.open(1);
        let tracker = tracker(&host);
        let changes = tracker.subscribe();

        let first = tracker.record(WindowHandle(1), &output(1, "A"), PlacementOptions::default());
        let second = tracker.record(WindowHandle(1), &output(2, "B"), PlacementOptions::maximized());

        assert_eq!(first, second);
        let tracked = tracker.tracked();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].identity, OutputIdentity::new(7, 2));
        assert_eq!(tracked[0].last_known_name, "B");
        assert!(tracked[0].options.maximize);
        assert_eq!(tracked[0].display_name, "Editor");

        assert_eq!(changes.try_recv(), Ok(TrackedSetChanged { count: 1 }));
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn test_dead_windows_are_reaped() {
        let host = Arc::new(Host::default());
        host.open(1);
        host.open(2);
        let tracker = tracker(&host);

        let id = tracker.record(WindowHandle(1), &output(1, "A"), PlacementOptions::default());
        tracker.record(WindowHandle(2), &output(1, "A"), PlacementOptions::default());

        host.close(1);
        assert_eq!(tracker.try_get_window(id), None);

        let tracked = tracker.tracked();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].display_name, "0x00000002");
        assert_eq!(host.unwatched.lock().len(), 1);
    }

    #[test]
    fn test_closed_callback_removes_entry() {
        let host = Arc::new(Host::default());
        host.open(1);
        let tracker = tracker(&host);
        let changes = tracker.subscribe();

        tracker.record(WindowHandle(1), &output(1, "A"), PlacementOptions::default());
        host.close_and_notify(1);

        assert_eq!(changes.try_recv(), Ok(TrackedSetChanged { count: 1 }));
        assert_eq!(changes.try_recv(), Ok(TrackedSetChanged { count: 0 }));
        assert!(tracker.tracked().is_empty());
    }

    #[test]
    fn test_stale_callback_ignored_after_slot_reuse() {
        let host = Arc::new(Host::default());
        host.open(1);
        host.open(2);
        let tracker = tracker(&host);

        tracker.record(WindowHandle(1), &output(1, "A"), PlacementOptions::default());
        let stale: ClosedCallback = {
            let mut watches = host.watches.lock();
            let id = *watches.keys().next().unwrap();
            watches.remove(&id).unwrap().1
        };

        assert!(tracker.forget(WindowHandle(1)));
        tracker.record(WindowHandle(2), &output(1, "A"), PlacementOptions::default());

        stale();
        assert_eq!(tracker.tracked().len(), 1);
    }

    #[test]
    fn test_forget_detaches_watch() {
        let host = Arc::new(Host::default());
        host.open(1);
        let tracker = tracker(&host);

        tracker.record(WindowHandle(1), &output(1, "A"), PlacementOptions::default());
        assert!(tracker.forget(WindowHandle(1)));
        assert!(!tracker.forget(WindowHandle(1)));
        assert_eq!(host.unwatched.lock().as_slice(), &[WatchId(100)]);
        assert!(host.watches.lock().is_empty());
    }

    #[test]
    fn test_place_dead_window() {
        let host = Arc::new(Host::default());
        let tracker = tracker(&host);
        assert!(matches!(
            tracker.place(WindowHandle(9), &output(1, "A"), PlacementOptions::default()),
            Err(PlacementError::WindowGone(_))
        ));
        assert!(tracker.tracked().is_empty());
    }

    #[test]
    fn test_place_moves_without_activation() {
        let host = Arc::new(Host::default());
        host.open(1);
        let tracker = tracker(&host);

        tracker
            .place(WindowHandle(1), &output(1, "A"), PlacementOptions::sized(800.0, 600.0))
            .unwrap();

        let moves = host.moves.lock();
        let (_, rect, flags) = moves[0];
        assert_eq!(rect, PixelRect::from_origin_size(560, 240, 800, 600));
        assert!(flags.contains(MoveFlag::NoActivate | MoveFlag::NoZOrder));
    }

    #[test]
    fn test_reconcile_empty_tracker_skips_enumeration() {
        let host = Arc::new(Host::default());
        let report = tracker(&host).reconcile().unwrap();
        assert!(report.placements.is_empty());
    }

    #[test]
    fn test_reconcile_without_outputs_skips() {
        let host = Arc::new(Host::default());
        host.open(1);
        let tracker = tracker(&host);
        let id = tracker.record(WindowHandle(1), &output(1, "A"), PlacementOptions::default());

        let report = tracker.reconcile().unwrap();
        assert_eq!(report.skipped, vec![id]);
        assert!(host.moves.lock().is_empty());
    }

    #[test]
    fn test_liveness_query_may_deliver_closed_callback() {
        let host = Arc::new(Host::default());
        host.notify_on_query.store(true, Ordering::SeqCst);
        host.open(1);
        host.open(2);
        let tracker = Arc::new(tracker(&host));
        tracker.record(WindowHandle(1), &output(1, "A"), PlacementOptions::default());
        tracker.record(WindowHandle(2), &output(1, "A"), PlacementOptions::default());
        host.close(1);

        let (tx, rx) = crossbeam_channel::bounded(1);
        let worker = {
            let tracker = tracker.clone();
            std::thread::spawn(move || {
                let _ = tx.send(tracker.tracked().len());
            })
        };

        let remaining = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("tracked() must not block on its own lock");
        worker.join().unwrap();
        assert_eq!(remaining, 1);
        assert_eq!(tracker.tracked()[0].window, WindowHandle(2));
    }

    #[test]
    fn test_synchronous_watch_callback_publishes_last() {
        let host = Arc::new(Host::default());
        host.notify_on_watch.store(true, Ordering::SeqCst);
        host.open(1);
        let tracker = tracker(&host);
        let changes = tracker.subscribe();

        tracker.record(WindowHandle(1), &output(1, "A"), PlacementOptions::default());

        let events: Vec<_> = changes.try_iter().collect();
        assert_eq!(
            events,
            vec![TrackedSetChanged { count: 1 }, TrackedSetChanged { count: 0 }]
        );
        assert!(tracker.tracked().is_empty());
        // The watch id came back after the entry was gone, so it was detached
        assert_eq!(host.unwatched.lock().len(), 1);
    }

    #[test]
    fn test_unrelated_record_reaps_dead_windows() {
        let host = Arc::new(Host::default());
        host.open(1);
        host.open(2);
        let tracker = tracker(&host);
        tracker.record(WindowHandle(1), &output(1, "A"), PlacementOptions::default());
        let changes = tracker.subscribe();

        host.close(1);
        tracker.record(WindowHandle(2), &output(1, "A"), PlacementOptions::default());

        assert_eq!(changes.try_recv(), Ok(TrackedSetChanged { count: 1 }));
        assert!(changes.try_recv().is_err());
        let tracked = tracker.tracked();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].window, WindowHandle(2));
        assert_eq!(host.unwatched.lock().len(), 1);
    }

    #[test]
    fn test_forget_reaps_and_reports_removal() {
        let host = Arc::new(Host::default());
        host.open(1);
        host.open(2);
        let tracker = tracker(&host);
        tracker.record(WindowHandle(1), &output(1, "A"), PlacementOptions::default());
        tracker.record(WindowHandle(2), &output(1, "A"), PlacementOptions::default());
        let changes = tracker.subscribe();

        host.close(1);
        assert!(tracker.forget(WindowHandle(2)));

        assert_eq!(changes.try_recv(), Ok(TrackedSetChanged { count: 1 }));
        assert_eq!(changes.try_recv(), Ok(TrackedSetChanged { count: 0 }));
        assert!(host.watches.lock().is_empty());
        assert!(!tracker.forget(WindowHandle(1)));
    }
}
