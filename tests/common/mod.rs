//! Shared fixtures for integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use display_anchor::display::{DisplayService, NativeError, PixelRect};
use display_anchor::placement::{ClosedCallback, MoveFlags, WatchId, WindowHandle, WindowHost};
use display_anchor::platform::fixture::{FixtureBackend, FixtureTopology};

pub const LAPTOP_AND_STUDIO: &str = r#"
[[output]]
adapter_id = 0xA
output_id = 1
gdi_name = '\\.\DISPLAY1'
friendly_name = "Laptop Panel"
width = 1920
height = 1080

[[output]]
adapter_id = 0xA
output_id = 2
gdi_name = '\\.\DISPLAY2'
friendly_name = "LG Studio"
x = 1920
width = 2560
height = 1440
"#;

/// Studio re-enumerated under a new adapter id after a driver reinstall
pub const STUDIO_NEW_ADAPTER: &str = r#"
[[output]]
adapter_id = 0xA
output_id = 1
gdi_name = '\\.\DISPLAY1'
friendly_name = "Laptop Panel"
width = 1920
height = 1080

[[output]]
adapter_id = 0xB
output_id = 7
gdi_name = '\\.\DISPLAY3'
friendly_name = "LG Studio"
x = -2560
width = 2560
height = 1440
"#;

pub const LAPTOP_ONLY: &str = r#"
[[output]]
adapter_id = 0xA
output_id = 1
gdi_name = '\\.\DISPLAY1'
friendly_name = "Laptop Panel"
width = 1920
height = 1080
"#;

pub fn topology(toml: &str) -> FixtureTopology {
    FixtureTopology::from_toml(toml).expect("fixture parses")
}

pub fn fixture(toml: &str) -> Arc<FixtureBackend> {
    Arc::new(FixtureBackend::from_topology(topology(toml)))
}

pub fn service(backend: &Arc<FixtureBackend>) -> Arc<DisplayService> {
    Arc::new(DisplayService::new(backend.clone(), backend.clone()))
}

/// In-memory window host
#[derive(Default)]
pub struct FakeWindowHost {
    alive: Mutex<HashSet<u64>>,
    titles: Mutex<HashMap<u64, String>>,
    failing: Mutex<HashSet<u64>>,
    scale: Mutex<HashMap<u64, f64>>,
    watches: Mutex<HashMap<u64, (u64, ClosedCallback)>>,
    next_watch: Mutex<u64>,
    pub moves: Mutex<Vec<(WindowHandle, PixelRect, MoveFlags)>>,
    pub unwatched: Mutex<Vec<WatchId>>,
}

impl FakeWindowHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open(&self, window: u64, title: &str) -> WindowHandle {
        self.alive.lock().insert(window);
        self.titles.lock().insert(window, title.to_string());
        WindowHandle(window)
    }

    /// Destroy without delivering the closed callback
    pub fn close_silently(&self, window: u64) {
        self.alive.lock().remove(&window);
    }

    /// Destroy and deliver the closed callback
    pub fn close(&self, window: u64) {
        self.close_silently(window);
        let callbacks: Vec<ClosedCallback> = {
            let mut watches = self.watches.lock();
            let ids: Vec<u64> = watches
                .iter()
                .filter(|(_, (w, _))| *w == window)
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| watches.remove(id)).map(|(_, cb)| cb).collect()
        };
        for callback in callbacks {
            callback();
        }
    }

    pub fn fail_moves(&self, window: u64) {
        self.failing.lock().insert(window);
    }

    pub fn set_scale(&self, window: u64, scale: f64) {
        self.scale.lock().insert(window, scale);
    }

    pub fn last_move(&self, window: u64) -> Option<(PixelRect, MoveFlags)> {
        self.moves
            .lock()
            .iter()
            .rev()
            .find(|(w, _, _)| w.0 == window)
            .map(|(_, rect, flags)| (*rect, *flags))
    }

    pub fn watch_count(&self) -> usize {
        self.watches.lock().len()
    }
}

impl WindowHost for FakeWindowHost {
    fn is_window_alive(&self, window: WindowHandle) -> bool {
        self.alive.lock().contains(&window.0)
    }

    fn window_title(&self, window: WindowHandle) -> Option<String> {
        self.titles.lock().get(&window.0).cloned()
    }

    fn scale_factor(&self, window: WindowHandle) -> f64 {
        self.scale.lock().get(&window.0).copied().unwrap_or(1.0)
    }

    fn move_window(
        &self,
        window: WindowHandle,
        rect: PixelRect,
        flags: MoveFlags,
    ) -> Result<(), NativeError> {
        if self.failing.lock().contains(&window.0) {
            return Err(NativeError(1400));
        }
        self.moves.lock().push((window, rect, flags));
        Ok(())
    }

    fn watch_closed(&self, window: WindowHandle, callback: ClosedCallback) -> Option<WatchId> {
        let id = {
            let mut next = self.next_watch.lock();
            *next += 1;
            *next
        };
        self.watches.lock().insert(id, (window.0, callback));
        Some(WatchId(id))
    }

    fn unwatch(&self, id: WatchId) {
        self.watches.lock().remove(&id.0);
        self.unwatched.lock().push(id);
    }
}
