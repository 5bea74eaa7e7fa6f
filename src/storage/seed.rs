//! JSON fixtures for populating a `MemoryStore` (demo binary, benches, tests).

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{AccessRecord, MemoryStore, PrincipalRecord, Resource, ResourceWriter, Role};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedResource {
    #[serde(flatten)]
    pub resource: Resource,
    #[serde(default)]
    pub managers: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
    /// Keep the ACL but drop the resource, as an out-of-band delete would.
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Seed {
    #[serde(default)]
    pub principals: Vec<PrincipalRecord>,
    #[serde(default)]
    pub resources: Vec<SeedResource>,
}

impl Seed {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("reading seed {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing seed {}", path.display()))
    }
}

impl MemoryStore {
    pub fn from_seed(seed: &Seed) -> Result<Self> {
        let store = MemoryStore::new();
        for p in seed.principals.iter() {
            crate::ident::parse_principal_id(&p.id)?;
            store.put_principal(p.clone());
        }
        for s in seed.resources.iter() {
            crate::ident::parse_resource_id(&s.resource.id)?;
            let mut acl = AccessRecord::for_resource(&s.resource);
            for m in s.members.iter() { acl.set_role(m, Some(Role::Member)); }
            for m in s.managers.iter() { acl.set_role(m, Some(Role::Manager)); }
            store.put_resource(s.resource.clone())?;
            store.put_access_record(acl)?;
            if s.deleted { store.delete_resource_out_of_band(&s.resource.id); }
        }
        Ok(store)
    }
}
