//! Library façade: visibility-filtered, paginated reads over lazily rebuilt slots,
//! plus the idempotent mutations the platform calls when access changes.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{EffectiveConfig, GlobalLibraryConfig};
use crate::error::{LibraryError, LibraryResult};
use crate::identity::RequestContext;
use crate::ident::{parse_principal_id, parse_resource_id};
use crate::storage::{AuthzStore, MemoryStore, PrincipalRecord, PrincipalStore, Resource, ResourceStore};
use crate::visibility::{can_view, can_view_library, Visibility};

use super::entry::{IndexKey, LibraryEntry, LibraryPage};
use super::hooks::{HookRegistry, JsonLinesSink, LibraryEvent};
use super::index::{IndexState, LibraryIndex, OwnerIndex};
use super::paging::{decode_token, encode_token};
use super::rebuild::rebuild_entries;

pub struct LibraryService {
    config: GlobalLibraryConfig,
    index: LibraryIndex,
    authz: Arc<dyn AuthzStore>,
    resources: Arc<dyn ResourceStore>,
    principals: Arc<dyn PrincipalStore>,
    hooks: HookRegistry,
}

impl LibraryService {
    pub fn new(
        config: GlobalLibraryConfig,
        authz: Arc<dyn AuthzStore>,
        resources: Arc<dyn ResourceStore>,
        principals: Arc<dyn PrincipalStore>,
    ) -> Self {
        let hooks = HookRegistry::default();
        if let Some(path) = config.audit_log_path.as_deref() {
            hooks.register(Box::new(JsonLinesSink::new(path)));
        }
        Self { config, index: LibraryIndex::new(), authz, resources, principals, hooks }
    }

    /// Service backed entirely by one in-memory platform.
    pub fn with_memory_store(config: GlobalLibraryConfig, store: &MemoryStore) -> Self {
        let s = Arc::new(store.clone());
        Self::new(config, s.clone(), s.clone(), s)
    }

    pub fn hooks(&self) -> &HookRegistry { &self.hooks }

    pub fn config(&self) -> &GlobalLibraryConfig { &self.config }

    pub fn effective(&self, namespace: &str) -> EffectiveConfig { self.config.effective(namespace) }

    /// Namespace whose libraries list `resource_type`.
    pub fn namespace_for(&self, resource_type: &str) -> String {
        let mut names: Vec<&String> = self.config.namespaces.keys().collect();
        names.sort();
        names.into_iter()
            .find(|ns| self.config.effective(ns).resource_type == resource_type)
            .cloned()
            .unwrap_or_else(|| format!("{}s", resource_type))
    }

    pub fn state(&self, namespace: &str, owner_id: &str) -> IndexState {
        self.index.state(&IndexKey::new(namespace, owner_id))
    }

    pub(crate) fn authz(&self) -> &dyn AuthzStore { self.authz.as_ref() }

    pub(crate) fn resources(&self) -> &dyn ResourceStore { self.resources.as_ref() }

    fn load_owner(&self, owner_id: &str) -> LibraryResult<PrincipalRecord> {
        self.principals.get_principal(owner_id)?
            .ok_or_else(|| LibraryError::not_found("principal_not_found".to_string(), format!("principal {} does not exist", owner_id)))
    }

    /// Rebuild under the caller's lock if the slot is absent or stale. Returns the
    /// events to emit once that lock is released.
    fn ensure_built(&self, cfg: &EffectiveConfig, owner_id: &str, slot: &mut OwnerIndex) -> LibraryResult<Vec<LibraryEvent>> {
        if !slot.needs_rebuild() { return Ok(Vec::new()); }
        let was = slot.state();
        let outcome = rebuild_entries(cfg, owner_id, slot, self.authz.as_ref(), self.resources.as_ref())?;
        let (n, skipped) = (outcome.entries.len(), outcome.dangling.len());
        slot.replace(outcome.entries);
        info!(target: "meeting_library", "library rebuilt namespace={} owner={} from={:?} entries={} skipped={}",
            cfg.namespace, owner_id, was, n, skipped);
        let mut events: Vec<LibraryEvent> = outcome.dangling.into_iter().map(|id| {
            let cleaned = outcome.cleaned.contains(&id);
            LibraryEvent::DanglingReference { namespace: cfg.namespace.clone(), owner: owner_id.to_string(), resource_id: id, cleaned }
        }).collect();
        events.push(LibraryEvent::Rebuilt { namespace: cfg.namespace.clone(), owner: owner_id.to_string(), entries: n, skipped });
        Ok(events)
    }

    fn visible_to(&self, ctx: &RequestContext, entry: &LibraryEntry, owner: &PrincipalRecord) -> LibraryResult<bool> {
        let view = entry.view();
        if can_view(ctx, &view, Some(owner)).allow { return Ok(true); }
        // Only an authenticated viewer can be a direct member
        if !ctx.is_authenticated() { return Ok(false); }
        let Some(acl) = self.authz.get_access_record(&entry.resource_id)? else { return Ok(false); };
        Ok(can_view(ctx, &view.with_acl(&acl), Some(owner)).allow)
    }

    /// One page of `owner_id`'s library as seen by `ctx`, most recent first.
    pub fn get_library(
        &self,
        namespace: &str,
        owner_id: &str,
        ctx: &RequestContext,
        paging_token: Option<&str>,
        limit: Option<usize>,
    ) -> LibraryResult<LibraryPage> {
        parse_principal_id(owner_id)?;
        let cfg = self.effective(namespace);
        let limit = match limit {
            Some(0) => return Err(LibraryError::invalid("invalid_limit", "limit must be at least 1")),
            Some(n) => n.min(cfg.max_page_size),
            None => cfg.default_page_size,
        };
        let after = paging_token.map(decode_token).transpose()?;

        let owner = self.load_owner(owner_id)?;
        let gate = can_view_library(ctx, &owner);
        if !gate.allow {
            debug!(target: "meeting_library", "library denied owner={} viewer={:?} reason={}", owner_id, ctx.user_id(), gate.reason);
            return Err(LibraryError::auth("unauthorized".to_string(), format!("not allowed to view the library of {}", owner_id)));
        }

        let (entries, events): (Vec<LibraryEntry>, Vec<LibraryEvent>) = {
            let slot = self.index.slot(&IndexKey::new(namespace, owner_id));
            let mut guard = slot.lock();
            let events = self.ensure_built(&cfg, owner_id, &mut guard)?;
            let entries = guard.entries().iter()
                .filter(|e| after.map(|r| e.rank < r).unwrap_or(true))
                .cloned()
                .collect();
            (entries, events)
        };
        for ev in events.iter() { self.hooks.emit(ev); }

        let mut page = LibraryPage::default();
        let mut more = false;
        for e in entries.into_iter() {
            if !self.visible_to(ctx, &e, &owner)? { continue; }
            if page.entries.len() == limit { more = true; break; }
            page.entries.push(e);
        }
        if more {
            page.next_token = page.entries.last().map(|e| encode_token(e.rank));
        }
        Ok(page)
    }

    /// Add or bump `resource` in `owner_id`'s library. Returns the new rank, or `None`
    /// when the library is not built yet.
    pub fn insert(&self, namespace: &str, owner_id: &str, resource: &Resource) -> LibraryResult<Option<u64>> {
        parse_principal_id(owner_id)?;
        parse_resource_id(&resource.id)?;
        let rank = match self.index.existing(&IndexKey::new(namespace, owner_id)) {
            Some(slot) => {
                let mut guard = slot.lock();
                guard.insert(LibraryEntry::from_resource(resource, chrono::Utc::now().timestamp_millis()))
            }
            None => None,
        };
        match rank {
            Some(rank) => {
                debug!(target: "meeting_library", "library insert namespace={} owner={} resource={} rank={}", namespace, owner_id, resource.id, rank);
                self.hooks.emit(&LibraryEvent::Inserted { namespace: namespace.to_string(), owner: owner_id.to_string(), resource_id: resource.id.clone(), rank });
            }
            None => debug!(target: "meeting_library", "library insert deferred to rebuild namespace={} owner={} resource={}", namespace, owner_id, resource.id),
        }
        Ok(rank)
    }

    pub fn remove(&self, namespace: &str, owner_id: &str, resource_id: &str) -> LibraryResult<bool> {
        parse_principal_id(owner_id)?;
        parse_resource_id(resource_id)?;
        let Some(slot) = self.index.existing(&IndexKey::new(namespace, owner_id)) else { return Ok(false); };
        let removed = slot.lock().remove(resource_id);
        if removed {
            debug!(target: "meeting_library", "library remove namespace={} owner={} resource={}", namespace, owner_id, resource_id);
            self.hooks.emit(&LibraryEvent::Removed { namespace: namespace.to_string(), owner: owner_id.to_string(), resource_id: resource_id.to_string() });
        }
        Ok(removed)
    }

    /// Refresh the denormalized visibility of `resource_id` in every library of the
    /// namespace. Returns how many libraries held it.
    pub fn update_visibility(&self, namespace: &str, resource_id: &str, visibility: Visibility) -> LibraryResult<usize> {
        parse_resource_id(resource_id)?;
        let mut touched = 0usize;
        for (_key, slot) in self.index.slots_for_namespace(namespace) {
            if slot.lock().update_visibility(resource_id, visibility) { touched += 1; }
        }
        self.hooks.emit(&LibraryEvent::VisibilityUpdated { namespace: namespace.to_string(), resource_id: resource_id.to_string(), visibility, libraries: touched });
        Ok(touched)
    }

    /// Mark `owner_id`'s library stale; the next read rebuilds it.
    pub fn purge(&self, namespace: &str, owner_id: &str) -> LibraryResult<()> {
        parse_principal_id(owner_id)?;
        if let Some(slot) = self.index.existing(&IndexKey::new(namespace, owner_id)) {
            slot.lock().purge();
        }
        info!(target: "meeting_library", "library purged namespace={} owner={}", namespace, owner_id);
        self.hooks.emit(&LibraryEvent::Purged { namespace: namespace.to_string(), owner: owner_id.to_string() });
        Ok(())
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
