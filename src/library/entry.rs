use serde::{Deserialize, Serialize};

use crate::storage::Resource;
use crate::visibility::{ResourceView, Visibility};

/// Identifies one owner's library within a namespace (e.g. "meetings").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexKey {
    pub namespace: String,
    pub owner: String,
}

impl IndexKey {
    pub fn new(namespace: &str, owner: &str) -> Self {
        Self { namespace: namespace.to_string(), owner: owner.to_string() }
    }
}

/// One resource in one owner's library, with fields denormalized at indexing time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryEntry {
    pub resource_id: String,
    pub resource_type: String,
    pub tenant: String,
    pub visibility: Visibility,
    pub display_name: String,
    /// Unique per owner; larger is more recent.
    pub rank: u64,
    /// Epoch milliseconds of the insert (or of resource creation for rebuilt entries).
    pub inserted_at: i64,
}

impl LibraryEntry {
    /// Unranked entry; the index assigns `rank` when the entry is stored.
    pub fn from_resource(resource: &Resource, inserted_at: i64) -> Self {
        Self {
            resource_id: resource.id.clone(),
            resource_type: resource.resource_type.clone(),
            tenant: resource.tenant.clone(),
            visibility: resource.visibility,
            display_name: resource.display_name.clone(),
            rank: 0,
            inserted_at,
        }
    }

    pub fn view(&self) -> ResourceView<'_> {
        ResourceView::new(&self.resource_id, &self.tenant, self.visibility)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryPage {
    pub entries: Vec<LibraryEntry>,
    /// Opaque continuation token; `None` on the last page.
    pub next_token: Option<String>,
}
