//! Resource lifecycle: create, change visibility, change members, delete. Each
//! operation writes ground truth first, then brings the affected libraries in line.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::error::{LibraryError, LibraryResult};
use crate::identity::RequestContext;
use crate::ident::{parse_principal_id, parse_resource_id};
use crate::storage::{AccessRecord, Resource, ResourceWriter, Role};
use crate::visibility::Visibility;

use super::service::LibraryService;

/// One membership change; `role: None` revokes access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberChange {
    pub principal_id: String,
    pub role: Option<Role>,
}

impl MemberChange {
    pub fn grant(principal_id: &str, role: Role) -> Self { Self { principal_id: principal_id.to_string(), role: Some(role) } }
    pub fn revoke(principal_id: &str) -> Self { Self { principal_id: principal_id.to_string(), role: None } }
}

pub struct ResourceLifecycle {
    service: Arc<LibraryService>,
    writer: Arc<dyn ResourceWriter>,
}

impl ResourceLifecycle {
    pub fn new(service: Arc<LibraryService>, writer: Arc<dyn ResourceWriter>) -> Self {
        Self { service, writer }
    }

    pub fn service(&self) -> &Arc<LibraryService> { &self.service }

    fn require_user<'a>(&self, ctx: &'a RequestContext) -> LibraryResult<&'a str> {
        ctx.user_id().ok_or_else(|| LibraryError::auth("unauthorized", "anonymous users cannot modify resources"))
    }

    /// Load the resource and its ACL, requiring the viewer to manage it.
    fn load_managed(&self, ctx: &RequestContext, resource_id: &str) -> LibraryResult<(Resource, AccessRecord)> {
        parse_resource_id(resource_id)?;
        let uid = self.require_user(ctx)?;
        let resource = self.service.resources().load_resource(resource_id)?;
        let acl = self.service.authz().get_access_record(resource_id)?
            .unwrap_or_else(|| AccessRecord::for_resource(&resource));
        let manages = ctx.is_admin_of(&resource.tenant) || acl.role_of(uid) == Some(Role::Manager);
        if !manages {
            return Err(LibraryError::auth("unauthorized".to_string(), format!("{} does not manage {}", uid, resource_id)));
        }
        Ok((resource, acl))
    }

    /// Store a new resource. The creator becomes a manager; every listed principal
    /// gets it in their library.
    pub fn create_resource(&self, ctx: &RequestContext, resource: Resource, managers: &[String], members: &[String]) -> LibraryResult<Resource> {
        let creator = self.require_user(ctx)?.to_string();
        parse_resource_id(&resource.id)?;
        for p in managers.iter().chain(members.iter()) { parse_principal_id(p)?; }

        let mut acl = AccessRecord::for_resource(&resource);
        for m in members { acl.set_role(m, Some(Role::Member)); }
        for m in managers { acl.set_role(m, Some(Role::Manager)); }
        acl.set_role(&creator, Some(Role::Manager));

        self.writer.put_resource(resource.clone())?;
        self.writer.put_access_record(acl.clone())?;

        let ns = self.service.namespace_for(&resource.resource_type);
        for p in acl.principals() {
            self.service.insert(&ns, p, &resource)?;
        }
        info!(target: "meeting_library", "resource created id={} type={} by={} principals={}", resource.id, resource.resource_type, creator, acl.principals().count());
        Ok(resource)
    }

    pub fn set_visibility(&self, ctx: &RequestContext, resource_id: &str, visibility: Visibility) -> LibraryResult<Resource> {
        let (mut resource, mut acl) = self.load_managed(ctx, resource_id)?;
        resource.visibility = visibility;
        acl.visibility = Some(visibility);
        self.writer.put_resource(resource.clone())?;
        self.writer.put_access_record(acl)?;
        let ns = self.service.namespace_for(&resource.resource_type);
        self.service.update_visibility(&ns, resource_id, visibility)?;
        Ok(resource)
    }

    /// Apply membership changes. A resource must always keep at least one manager.
    pub fn update_members(&self, ctx: &RequestContext, resource_id: &str, changes: &[MemberChange]) -> LibraryResult<AccessRecord> {
        for c in changes { parse_principal_id(&c.principal_id)?; }
        let (resource, mut acl) = self.load_managed(ctx, resource_id)?;
        let before: BTreeSet<String> = acl.principals().cloned().collect();
        for c in changes { acl.set_role(&c.principal_id, c.role); }
        if acl.managers.is_empty() {
            return Err(LibraryError::invalid("last_manager".to_string(), format!("{} must keep at least one manager", resource_id)));
        }
        self.writer.put_access_record(acl.clone())?;

        let after: BTreeSet<String> = acl.principals().cloned().collect();
        let ns = self.service.namespace_for(&resource.resource_type);
        for p in after.difference(&before) { self.service.insert(&ns, p, &resource)?; }
        for p in before.difference(&after) { self.service.remove(&ns, p, resource_id)?; }
        Ok(acl)
    }

    /// Delete a resource, its ACL and every library entry pointing at it.
    pub fn delete_resource(&self, ctx: &RequestContext, resource_id: &str) -> LibraryResult<()> {
        let (resource, acl) = self.load_managed(ctx, resource_id)?;
        self.writer.delete_resource(resource_id)?;
        let ns = self.service.namespace_for(&resource.resource_type);
        for p in acl.principals() { self.service.remove(&ns, p, resource_id)?; }
        info!(target: "meeting_library", "resource deleted id={}", resource_id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod lifecycle_tests;
