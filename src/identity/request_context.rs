use super::Principal;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub principal: Option<Principal>,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self { Self::default() }

    pub fn for_principal(principal: Principal) -> Self {
        Self { principal: Some(principal), request_id: None }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn is_authenticated(&self) -> bool { self.principal.is_some() }

    pub fn user_id(&self) -> Option<&str> { self.principal.as_ref().map(|p| p.user_id.as_str()) }

    pub fn tenant(&self) -> Option<&str> { self.principal.as_ref().and_then(|p| p.tenant()) }

    pub fn is_admin_of(&self, tenant: &str) -> bool {
        self.principal.as_ref().map(|p| p.is_admin_of(tenant)).unwrap_or(false)
    }
}
