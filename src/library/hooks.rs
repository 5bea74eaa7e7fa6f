//! Change events and listener registry. Search indexers, push transports and audit
//! sinks subscribe here; the library never depends on them.

use std::io::Write;
use std::path::PathBuf;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::visibility::Visibility;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LibraryEvent {
    Inserted { namespace: String, owner: String, resource_id: String, rank: u64 },
    Removed { namespace: String, owner: String, resource_id: String },
    VisibilityUpdated { namespace: String, resource_id: String, visibility: Visibility, libraries: usize },
    Purged { namespace: String, owner: String },
    Rebuilt { namespace: String, owner: String, entries: usize, skipped: usize },
    DanglingReference { namespace: String, owner: String, resource_id: String, cleaned: bool },
}

pub trait LibraryListener: Send + Sync {
    fn on_event(&self, _ev: &LibraryEvent) {}
}

#[derive(Default)]
pub struct HookRegistry {
    listeners: RwLock<Vec<Box<dyn LibraryListener>>>,
}

impl HookRegistry {
    pub fn register(&self, listener: Box<dyn LibraryListener>) {
        self.listeners.write().push(listener);
    }

    pub fn emit(&self, ev: &LibraryEvent) {
        for l in self.listeners.read().iter() {
            // Listeners handle their own errors
            l.on_event(ev);
        }
    }

    pub fn len(&self) -> usize { self.listeners.read().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Appends one JSON object per event to a file.
pub struct JsonLinesSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into(), lock: Mutex::new(()) } }
}

impl LibraryListener for JsonLinesSink {
    fn on_event(&self, ev: &LibraryEvent) {
        let ts = chrono::Utc::now().timestamp_millis();
        let mut obj = match serde_json::to_value(ev) {
            Ok(v) => v,
            Err(e) => { tracing::warn!(target: "meeting_library", "audit: cannot serialize event: {}", e); return; }
        };
        if let Some(map) = obj.as_object_mut() { map.insert("ts".into(), serde_json::json!(ts)); }
        let _guard = self.lock.lock();
        let res = std::fs::OpenOptions::new().create(true).append(true).open(&self.path)
            .and_then(|mut f| writeln!(&mut f, "{}", obj));
        if let Err(e) = res {
            tracing::warn!(target: "meeting_library", "audit: write to {} failed: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod hooks_tests;
