//! Rebuild of one owner's library from the authorization store.
//!
//! The authorization store may reference resources that no longer exist (deleted
//! without their ACL being cleaned up). Those are skipped, never surfaced. Store
//! outages abort the rebuild before anything is written, so the caller's slot keeps
//! whatever it had. Ranks already handed out are never reassigned.

use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::EffectiveConfig;
use crate::error::LibraryResult;
use crate::storage::{AuthzStore, ResourceStore, StoreError};

use super::entry::LibraryEntry;
use super::index::OwnerIndex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildOutcome {
    /// Ranked entries, highest rank first, ready for `OwnerIndex::replace`.
    pub entries: Vec<LibraryEntry>,
    /// Dangling resource ids that were skipped.
    pub dangling: Vec<String>,
    /// Dangling ids whose access record was removed.
    pub cleaned: Vec<String>,
}

/// Compute the new contents of `prior`'s slot for `owner_id`. Does not modify the slot.
pub fn rebuild_entries(
    cfg: &EffectiveConfig,
    owner_id: &str,
    prior: &OwnerIndex,
    authz: &dyn AuthzStore,
    resources: &dyn ResourceStore,
) -> LibraryResult<RebuildOutcome> {
    let resource_ids = authz.list_access_records_for_principal(owner_id)?;

    // Entries that survive keep their (inserted_at, rank) so outstanding tokens stay valid
    let prior_ranks: HashMap<&str, (i64, u64)> = prior.entries().iter()
        .map(|e| (e.resource_id.as_str(), (e.inserted_at, e.rank)))
        .collect();

    let mut entries: Vec<LibraryEntry> = Vec::with_capacity(resource_ids.len());
    let mut fresh: Vec<LibraryEntry> = Vec::new();
    let mut dangling: Vec<String> = Vec::new();
    for id in resource_ids.iter() {
        let resource = match resources.load_resource(id) {
            Ok(r) => r,
            Err(StoreError::NotFound(_)) => {
                warn!(target: "meeting_library", "rebuild: skipping dangling reference owner={} resource={}", owner_id, id);
                dangling.push(id.clone());
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if resource.resource_type != cfg.resource_type { continue; }
        match prior_ranks.get(id.as_str()) {
            Some(&(ts, rank)) => {
                let mut e = LibraryEntry::from_resource(&resource, ts);
                e.rank = rank;
                entries.push(e);
            }
            None => fresh.push(LibraryEntry::from_resource(&resource, resource.created_at)),
        }
    }

    // Newly discovered resources rank above everything already handed out, oldest
    // first; equal timestamps put the lower id on top
    fresh.sort_by(|a, b| (a.inserted_at, Reverse(&a.resource_id)).cmp(&(b.inserted_at, Reverse(&b.resource_id))));
    let base = prior.last_rank();
    entries.extend(fresh.into_iter().enumerate().map(|(i, mut e)| { e.rank = base + i as u64 + 1; e }));
    entries.sort_by(|a, b| b.rank.cmp(&a.rank));

    let mut cleaned = Vec::new();
    if cfg.cleanup_dangling_references {
        for id in dangling.iter() {
            match authz.remove_access(id, owner_id) {
                Ok(true) => cleaned.push(id.clone()),
                Ok(false) => {}
                Err(e) => warn!(target: "meeting_library", "rebuild: cleanup of dangling record failed owner={} resource={} err={}", owner_id, id, e),
            }
        }
    }

    debug!(target: "meeting_library", "rebuild: owner={} namespace={} entries={} dangling={} cleaned={}",
        owner_id, cfg.namespace, entries.len(), dangling.len(), cleaned.len());
    Ok(RebuildOutcome { entries, dangling, cleaned })
}

#[cfg(test)]
#[path = "rebuild_tests.rs"]
mod rebuild_tests;
