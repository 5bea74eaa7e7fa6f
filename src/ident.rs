//! Identifier parsing
//! -----------------
//! Principal and resource identifiers share one shape: `<type>:<tenant>:<id>`,
//! e.g. `u:cam:alice`, `g:cam:oae-team`, `m:gt:weekly-sync`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{LibraryError, LibraryResult};

static ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<kind>[a-z]):(?P<tenant>[a-z0-9._-]+):(?P<local>[^:\s]+)$").expect("static id regex")
});

pub const USER_PREFIX: char = 'u';
pub const GROUP_PREFIX: char = 'g';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedId {
    pub kind: char,
    pub tenant: String,
    pub local: String,
}

impl ParsedId {
    pub fn is_user(&self) -> bool { self.kind == USER_PREFIX }
    pub fn is_group(&self) -> bool { self.kind == GROUP_PREFIX }
    pub fn is_principal(&self) -> bool { self.is_user() || self.is_group() }
}

/// Parse an identifier, rejecting anything that does not match `<type>:<tenant>:<id>`.
pub fn parse_id(id: &str) -> LibraryResult<ParsedId> {
    let caps = ID_RE.captures(id).ok_or_else(|| {
        LibraryError::invalid("invalid_id".to_string(), format!("malformed identifier '{}'", id))
    })?;
    let kind = caps["kind"].chars().next().unwrap_or_default();
    Ok(ParsedId { kind, tenant: caps["tenant"].to_string(), local: caps["local"].to_string() })
}

/// Validate an identifier that must name a user or group.
pub fn parse_principal_id(id: &str) -> LibraryResult<ParsedId> {
    let parsed = parse_id(id)?;
    if !parsed.is_principal() {
        return Err(LibraryError::invalid("invalid_principal_id".to_string(), format!("'{}' is not a user or group id", id)));
    }
    Ok(parsed)
}

/// Validate an identifier that must name a resource (anything but a principal).
pub fn parse_resource_id(id: &str) -> LibraryResult<ParsedId> {
    let parsed = parse_id(id)?;
    if parsed.is_principal() {
        return Err(LibraryError::invalid("invalid_resource_id".to_string(), format!("'{}' is not a resource id", id)));
    }
    Ok(parsed)
}

/// Tenant alias embedded in an identifier, if well-formed.
pub fn tenant_of(id: &str) -> Option<String> {
    parse_id(id).ok().map(|p| p.tenant)
}

#[cfg(test)]
#[path = "ident_tests.rs"]
mod ident_tests;
