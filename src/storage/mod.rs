//! Collaborator interfaces consumed by the library core.
//! The authorization store is the source of truth for who can access what; libraries
//! are a derived cache over it. `MemoryStore` implements every trait in-process.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::visibility::Visibility;

pub mod memory;
pub mod seed;

pub use memory::MemoryStore;
pub use seed::{Seed, SeedResource};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    User,
    Group,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Manager,
}

/// A stored user or group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrincipalRecord {
    pub id: String,
    pub kind: PrincipalKind,
    pub tenant: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Group membership; always empty for users.
    #[serde(default)]
    pub members: BTreeMap<String, Role>,
}

impl PrincipalRecord {
    pub fn user(id: &str, visibility: Visibility) -> Self {
        Self::new(id, PrincipalKind::User, visibility)
    }

    pub fn group(id: &str, visibility: Visibility) -> Self {
        Self::new(id, PrincipalKind::Group, visibility)
    }

    fn new(id: &str, kind: PrincipalKind, visibility: Visibility) -> Self {
        let tenant = crate::ident::tenant_of(id).unwrap_or_default();
        Self { id: id.to_string(), kind, tenant, visibility, display_name: None, members: BTreeMap::new() }
    }

    pub fn with_member(mut self, principal_id: &str, role: Role) -> Self {
        self.members.insert(principal_id.to_string(), role);
        self
    }

    pub fn is_group(&self) -> bool { self.kind == PrincipalKind::Group }

    pub fn role_of(&self, principal_id: &str) -> Option<Role> { self.members.get(principal_id).copied() }
}

/// A library-listable resource such as a meeting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    pub id: String,
    pub resource_type: String,
    pub tenant: String,
    pub visibility: Visibility,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

impl Resource {
    pub fn new(id: &str, resource_type: &str, visibility: Visibility, display_name: &str, created_at: i64) -> Self {
        Self {
            id: id.to_string(),
            resource_type: resource_type.to_string(),
            tenant: crate::ident::tenant_of(id).unwrap_or_default(),
            visibility,
            display_name: display_name.to_string(),
            description: None,
            created_at,
        }
    }
}

/// Access control list of one resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessRecord {
    pub resource_id: String,
    pub tenant: String,
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub managers: BTreeSet<String>,
    #[serde(default)]
    pub members: BTreeSet<String>,
}

impl AccessRecord {
    pub fn for_resource(resource: &Resource) -> Self {
        Self {
            resource_id: resource.id.clone(),
            tenant: resource.tenant.clone(),
            visibility: Some(resource.visibility),
            managers: BTreeSet::new(),
            members: BTreeSet::new(),
        }
    }

    /// Manager wins when a principal is listed in both sets.
    pub fn role_of(&self, principal_id: &str) -> Option<Role> {
        if self.managers.contains(principal_id) { Some(Role::Manager) }
        else if self.members.contains(principal_id) { Some(Role::Member) }
        else { None }
    }

    pub fn set_role(&mut self, principal_id: &str, role: Option<Role>) {
        self.managers.remove(principal_id);
        self.members.remove(principal_id);
        match role {
            Some(Role::Manager) => { self.managers.insert(principal_id.to_string()); }
            Some(Role::Member) => { self.members.insert(principal_id.to_string()); }
            None => {}
        }
    }

    pub fn principals(&self) -> impl Iterator<Item = &String> {
        self.managers.iter().chain(self.members.iter().filter(move |m| !self.managers.contains(*m)))
    }
}

pub trait AuthzStore: Send + Sync {
    /// Every resource id whose ACL names `principal_id` as manager or member.
    fn list_access_records_for_principal(&self, principal_id: &str) -> StoreResult<Vec<String>>;
    fn get_access_record(&self, resource_id: &str) -> StoreResult<Option<AccessRecord>>;
    /// Drop `principal_id` from the ACL of `resource_id`. Used to clean up dangling records.
    fn remove_access(&self, resource_id: &str, principal_id: &str) -> StoreResult<bool>;
}

pub trait ResourceStore: Send + Sync {
    /// Fails with `StoreError::NotFound` when the resource no longer exists.
    fn load_resource(&self, resource_id: &str) -> StoreResult<Resource>;
}

pub trait PrincipalStore: Send + Sync {
    fn get_principal(&self, principal_id: &str) -> StoreResult<Option<PrincipalRecord>>;
}

/// Write side used by the resource lifecycle helpers.
pub trait ResourceWriter: Send + Sync {
    fn put_resource(&self, resource: Resource) -> StoreResult<()>;
    fn put_access_record(&self, record: AccessRecord) -> StoreResult<()>;
    /// Remove a resource together with its access record.
    fn delete_resource(&self, resource_id: &str) -> StoreResult<bool>;
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod storage_tests;
