//! Visibility evaluator: pure predicates over (viewer, resource, library owner).
//! Rules are checked in precedence order; the first one that decides wins.

use crate::identity::RequestContext;
use crate::storage::PrincipalRecord;

use super::model::{Decision, ResourceView, Visibility};

/// The viewer reaches the library through its owner: they are the owner, or they
/// belong to the owning group.
fn has_owner_access(ctx: &RequestContext, owner: &PrincipalRecord) -> bool {
    let Some(uid) = ctx.user_id() else { return false; };
    owner.id == uid || (owner.is_group() && owner.role_of(uid).is_some())
}

fn by_visibility(ctx: &RequestContext, tenant: &str, visibility: Visibility) -> Decision {
    match visibility {
        Visibility::Public => Decision::allow("public"),
        Visibility::LoggedIn => {
            if ctx.tenant() == Some(tenant) { Decision::allow("loggedin_same_tenant") }
            else if ctx.is_authenticated() { Decision::deny("loggedin_other_tenant") }
            else { Decision::deny("anonymous") }
        }
        Visibility::Private => Decision::deny("private"),
    }
}

/// Decide whether `ctx` may see `resource` inside `owner`'s library.
pub fn can_view(ctx: &RequestContext, resource: &ResourceView<'_>, owner: Option<&PrincipalRecord>) -> Decision {
    if ctx.is_admin_of(resource.tenant) { return Decision::allow("admin"); }
    if let Some(uid) = ctx.user_id() {
        if resource.acl.map(|acl| acl.role_of(uid).is_some()).unwrap_or(false) {
            return Decision::allow("member");
        }
    }
    if owner.map(|o| has_owner_access(ctx, o)).unwrap_or(false) {
        return Decision::allow("owner_access");
    }
    by_visibility(ctx, resource.tenant, resource.visibility)
}

/// Gate for the whole library request, judged against the owner's own visibility.
pub fn can_view_library(ctx: &RequestContext, owner: &PrincipalRecord) -> Decision {
    if ctx.is_admin_of(&owner.tenant) { return Decision::allow("admin"); }
    if has_owner_access(ctx, owner) { return Decision::allow("owner_access"); }
    by_visibility(ctx, &owner.tenant, owner.visibility)
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod evaluator_tests;
