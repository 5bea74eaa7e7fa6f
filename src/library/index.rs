//! Per-owner library slots. Each (namespace, owner) slot sits behind its own mutex so
//! rebuilds, mutations and purges on one owner serialize while different owners run
//! in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::visibility::Visibility;

use super::entry::{IndexKey, LibraryEntry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    /// Never built.
    #[default]
    Absent,
    Built,
    /// Purged; entries are kept only as ordering hints for the next rebuild.
    Stale,
}

#[derive(Debug, Default)]
pub struct OwnerIndex {
    state: IndexState,
    /// Sorted by rank, highest first.
    entries: Vec<LibraryEntry>,
    /// Highest rank ever handed out by this slot.
    last_rank: u64,
    builds: u64,
}

impl OwnerIndex {
    pub fn state(&self) -> IndexState { self.state }

    pub fn entries(&self) -> &[LibraryEntry] { &self.entries }

    pub fn last_rank(&self) -> u64 { self.last_rank }

    /// Number of completed rebuilds.
    pub fn builds(&self) -> u64 { self.builds }

    pub fn needs_rebuild(&self) -> bool { self.state != IndexState::Built }

    /// Insert or bump `entry` to the top. Returns the assigned rank, or `None` when the
    /// slot is not built (the next rebuild reads ground truth anyway).
    pub(crate) fn insert(&mut self, mut entry: LibraryEntry) -> Option<u64> {
        if self.state != IndexState::Built { return None; }
        self.entries.retain(|e| e.resource_id != entry.resource_id);
        self.last_rank += 1;
        entry.rank = self.last_rank;
        self.entries.insert(0, entry);
        Some(self.last_rank)
    }

    pub(crate) fn remove(&mut self, resource_id: &str) -> bool {
        if self.state != IndexState::Built { return false; }
        let before = self.entries.len();
        self.entries.retain(|e| e.resource_id != resource_id);
        before != self.entries.len()
    }

    /// Refresh the denormalized visibility without touching rank.
    pub(crate) fn update_visibility(&mut self, resource_id: &str, visibility: Visibility) -> bool {
        let mut hit = false;
        for e in self.entries.iter_mut().filter(|e| e.resource_id == resource_id) {
            e.visibility = visibility;
            hit = true;
        }
        hit
    }

    pub(crate) fn purge(&mut self) {
        if self.state == IndexState::Built { self.state = IndexState::Stale; }
    }

    /// Replace all entries with a freshly built set. `entries` must already carry
    /// ranks above `last_rank`, highest first.
    pub(crate) fn replace(&mut self, entries: Vec<LibraryEntry>) {
        if let Some(top) = entries.first() { self.last_rank = self.last_rank.max(top.rank); }
        self.entries = entries;
        self.state = IndexState::Built;
        self.builds += 1;
    }
}

/// All library slots for the process.
#[derive(Default)]
pub struct LibraryIndex {
    slots: RwLock<HashMap<IndexKey, Arc<Mutex<OwnerIndex>>>>,
}

impl LibraryIndex {
    pub fn new() -> Self { Self::default() }

    /// Get or create the slot for `key`.
    pub fn slot(&self, key: &IndexKey) -> Arc<Mutex<OwnerIndex>> {
        if let Some(s) = self.slots.read().get(key) { return s.clone(); }
        self.slots.write().entry(key.clone()).or_default().clone()
    }

    pub fn existing(&self, key: &IndexKey) -> Option<Arc<Mutex<OwnerIndex>>> {
        self.slots.read().get(key).cloned()
    }

    pub fn state(&self, key: &IndexKey) -> IndexState {
        self.existing(key).map(|s| s.lock().state()).unwrap_or(IndexState::Absent)
    }

    /// Every slot of a namespace, for changes that fan out across owners.
    pub fn slots_for_namespace(&self, namespace: &str) -> Vec<(IndexKey, Arc<Mutex<OwnerIndex>>)> {
        let mut out: Vec<_> = self.slots.read().iter()
            .filter(|(k, _)| k.namespace == namespace)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn len(&self) -> usize { self.slots.read().len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod index_tests;
