use serde::{Deserialize, Serialize};

use crate::storage::AccessRecord;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    #[serde(rename = "loggedin")]
    LoggedIn,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::LoggedIn => "loggedin",
            Visibility::Public => "public",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" => Some(Visibility::Private),
            "loggedin" => Some(Visibility::LoggedIn),
            "public" => Some(Visibility::Public),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allow: bool,
    pub reason: &'static str,
}

impl Decision {
    pub(crate) fn allow(reason: &'static str) -> Self { Self { allow: true, reason } }
    pub(crate) fn deny(reason: &'static str) -> Self { Self { allow: false, reason } }
}

/// What the evaluator needs to know about a resource. `acl` is optional: without it
/// direct membership of the viewer cannot be established and rule 2 only applies
/// through the library owner.
#[derive(Debug, Clone, Copy)]
pub struct ResourceView<'a> {
    pub id: &'a str,
    pub tenant: &'a str,
    pub visibility: Visibility,
    pub acl: Option<&'a AccessRecord>,
}

impl<'a> ResourceView<'a> {
    pub fn new(id: &'a str, tenant: &'a str, visibility: Visibility) -> Self {
        Self { id, tenant, visibility, acl: None }
    }

    pub fn with_acl(mut self, acl: &'a AccessRecord) -> Self {
        self.acl = Some(acl);
        self
    }
}
