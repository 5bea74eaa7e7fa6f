//! In-process platform stand-in: principals, resources and ACLs behind one lock.
//! Cheap to clone; clones share state.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{AccessRecord, AuthzStore, PrincipalRecord, PrincipalStore, Resource, ResourceStore, ResourceWriter, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    principals: HashMap<String, PrincipalRecord>,
    resources: HashMap<String, Resource>,
    acls: BTreeMap<String, AccessRecord>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    authz_down: Arc<AtomicBool>,
    resources_down: Arc<AtomicBool>,
    acl_scans: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn put_principal(&self, principal: PrincipalRecord) {
        self.inner.write().principals.insert(principal.id.clone(), principal);
    }

    /// Remove the resource but leave its ACL behind, producing dangling references.
    pub fn delete_resource_out_of_band(&self, resource_id: &str) -> bool {
        self.inner.write().resources.remove(resource_id).is_some()
    }

    pub fn set_authz_available(&self, up: bool) { self.authz_down.store(!up, Ordering::SeqCst); }

    pub fn set_resources_available(&self, up: bool) { self.resources_down.store(!up, Ordering::SeqCst); }

    /// Number of `list_access_records_for_principal` calls served so far.
    pub fn acl_scans(&self) -> usize { self.acl_scans.load(Ordering::SeqCst) }

    fn check_authz(&self) -> StoreResult<()> {
        if self.authz_down.load(Ordering::SeqCst) { return Err(StoreError::Unavailable("authorization store offline".into())); }
        Ok(())
    }

    fn check_resources(&self) -> StoreResult<()> {
        if self.resources_down.load(Ordering::SeqCst) { return Err(StoreError::Unavailable("resource store offline".into())); }
        Ok(())
    }
}

impl AuthzStore for MemoryStore {
    fn list_access_records_for_principal(&self, principal_id: &str) -> StoreResult<Vec<String>> {
        self.check_authz()?;
        self.acl_scans.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.read();
        Ok(inner.acls.values()
            .filter(|acl| acl.role_of(principal_id).is_some())
            .map(|acl| acl.resource_id.clone())
            .collect())
    }

    fn get_access_record(&self, resource_id: &str) -> StoreResult<Option<AccessRecord>> {
        self.check_authz()?;
        Ok(self.inner.read().acls.get(resource_id).cloned())
    }

    fn remove_access(&self, resource_id: &str, principal_id: &str) -> StoreResult<bool> {
        self.check_authz()?;
        let mut inner = self.inner.write();
        let Some(acl) = inner.acls.get_mut(resource_id) else { return Ok(false); };
        if acl.role_of(principal_id).is_none() { return Ok(false); }
        acl.set_role(principal_id, None);
        if acl.managers.is_empty() && acl.members.is_empty() {
            inner.acls.remove(resource_id);
        }
        Ok(true)
    }
}

impl ResourceStore for MemoryStore {
    fn load_resource(&self, resource_id: &str) -> StoreResult<Resource> {
        self.check_resources()?;
        self.inner.read().resources.get(resource_id).cloned().ok_or_else(|| StoreError::NotFound(resource_id.to_string()))
    }
}

impl PrincipalStore for MemoryStore {
    fn get_principal(&self, principal_id: &str) -> StoreResult<Option<PrincipalRecord>> {
        self.check_authz()?;
        Ok(self.inner.read().principals.get(principal_id).cloned())
    }
}

impl ResourceWriter for MemoryStore {
    fn put_resource(&self, resource: Resource) -> StoreResult<()> {
        self.check_resources()?;
        self.inner.write().resources.insert(resource.id.clone(), resource);
        Ok(())
    }

    fn put_access_record(&self, record: AccessRecord) -> StoreResult<()> {
        self.check_authz()?;
        self.inner.write().acls.insert(record.resource_id.clone(), record);
        Ok(())
    }

    fn delete_resource(&self, resource_id: &str) -> StoreResult<bool> {
        self.check_authz()?;
        self.check_resources()?;
        let mut inner = self.inner.write();
        let a = inner.resources.remove(resource_id).is_some();
        let b = inner.acls.remove(resource_id).is_some();
        Ok(a || b)
    }
}
