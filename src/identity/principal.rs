use serde::{Deserialize, Serialize};

/// Administrator of the tenant named in `Attrs::tenant_id`.
pub const ROLE_ADMIN: &str = "admin";
/// Administrator of every tenant.
pub const ROLE_GLOBAL_ADMIN: &str = "global_admin";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attrs {
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

/// An authenticated viewer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub attrs: Attrs,
}

impl Principal {
    /// Regular user; the tenant is taken from the id when it is well-formed.
    pub fn user(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let tenant_id = crate::ident::tenant_of(&user_id);
        Self { user_id, roles: Vec::new(), attrs: Attrs { tenant_id, ip: None } }
    }

    pub fn with_role(mut self, role: &str) -> Self {
        if !self.has_role(role) { self.roles.push(role.to_string()); }
        self
    }

    pub fn has_role(&self, role: &str) -> bool { self.roles.iter().any(|r| r.eq_ignore_ascii_case(role)) }

    pub fn tenant(&self) -> Option<&str> { self.attrs.tenant_id.as_deref() }

    pub fn is_global_admin(&self) -> bool { self.has_role(ROLE_GLOBAL_ADMIN) }

    /// Global admins administer every tenant; tenant admins only their own.
    pub fn is_admin_of(&self, tenant: &str) -> bool {
        if self.is_global_admin() { return true; }
        self.has_role(ROLE_ADMIN) && self.tenant() == Some(tenant)
    }
}
