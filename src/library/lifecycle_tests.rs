use super::*;
use crate::config::GlobalLibraryConfig;
use crate::identity::{Principal, ROLE_ADMIN};
use crate::library::IndexState;
use crate::storage::{AuthzStore, MemoryStore, PrincipalRecord, ResourceStore};

const NS: &str = "meetings";

struct Fixture {
    store: MemoryStore,
    lifecycle: ResourceLifecycle,
}

fn fixture() -> Fixture {
    let store = MemoryStore::new();
    for u in ["u:cam:alice", "u:cam:bob", "u:cam:carol"] {
        store.put_principal(PrincipalRecord::user(u, Visibility::Public));
    }
    let svc = Arc::new(LibraryService::with_memory_store(GlobalLibraryConfig::default(), &store));
    let lifecycle = ResourceLifecycle::new(svc, Arc::new(store.clone()));
    Fixture { store, lifecycle }
}

fn as_user(id: &str) -> RequestContext { RequestContext::for_principal(Principal::user(id)) }

fn library_ids(f: &Fixture, owner: &str) -> Vec<String> {
    f.lifecycle.service().get_library(NS, owner, &as_user(owner), None, None).unwrap()
        .entries.into_iter().map(|e| e.resource_id).collect()
}

fn meeting(id: &str, vis: Visibility) -> Resource { Resource::new(id, "meeting", vis, "weekly", 1) }

#[test]
fn create_adds_to_every_member_library() {
    let f = fixture();
    // Build alice's library first so the create is applied incrementally
    assert!(library_ids(&f, "u:cam:alice").is_empty());

    f.lifecycle.create_resource(&as_user("u:cam:alice"), meeting("m:cam:one", Visibility::Private), &[], &["u:cam:bob".to_string()]).unwrap();
    assert_eq!(f.lifecycle.service().state(NS, "u:cam:alice"), IndexState::Built);
    assert_eq!(library_ids(&f, "u:cam:alice"), vec!["m:cam:one"]);
    assert_eq!(library_ids(&f, "u:cam:bob"), vec!["m:cam:one"]);
    assert!(library_ids(&f, "u:cam:carol").is_empty());

    let acl = f.store.get_access_record("m:cam:one").unwrap().unwrap();
    assert_eq!(acl.role_of("u:cam:alice"), Some(Role::Manager));
    assert_eq!(acl.role_of("u:cam:bob"), Some(Role::Member));
}

#[test]
fn anonymous_cannot_create() {
    let f = fixture();
    let err = f.lifecycle.create_resource(&RequestContext::anonymous(), meeting("m:cam:x", Visibility::Public), &[], &[]).unwrap_err();
    assert_eq!(err.http_status(), 401);
}

#[test]
fn create_rejects_malformed_member_ids() {
    let f = fixture();
    let err = f.lifecycle.create_resource(&as_user("u:cam:alice"), meeting("m:cam:x", Visibility::Public), &[], &["bob".to_string()]).unwrap_err();
    assert_eq!(err.code_str(), "invalid_id");
    assert!(f.store.load_resource("m:cam:x").is_err());
}

#[test]
fn visibility_change_requires_manager_and_updates_entries() {
    let f = fixture();
    f.lifecycle.create_resource(&as_user("u:cam:alice"), meeting("m:cam:one", Visibility::Public), &[], &["u:cam:bob".to_string()]).unwrap();
    library_ids(&f, "u:cam:alice");

    let err = f.lifecycle.set_visibility(&as_user("u:cam:bob"), "m:cam:one", Visibility::Private).unwrap_err();
    assert_eq!(err.code_str(), "unauthorized");

    f.lifecycle.set_visibility(&as_user("u:cam:alice"), "m:cam:one", Visibility::Private).unwrap();
    let page = f.lifecycle.service().get_library(NS, "u:cam:alice", &as_user("u:cam:alice"), None, None).unwrap();
    assert_eq!(page.entries[0].visibility, Visibility::Private);
    // Carol can see alice's public library but no longer the meeting
    let carol = f.lifecycle.service().get_library(NS, "u:cam:alice", &as_user("u:cam:carol"), None, None).unwrap();
    assert!(carol.entries.is_empty());
    assert_eq!(f.store.load_resource("m:cam:one").unwrap().visibility, Visibility::Private);
}

#[test]
fn tenant_admin_can_manage_any_resource() {
    let f = fixture();
    f.lifecycle.create_resource(&as_user("u:cam:alice"), meeting("m:cam:one", Visibility::Public), &[], &[]).unwrap();
    let admin = RequestContext::for_principal(Principal::user("u:cam:admin").with_role(ROLE_ADMIN));
    f.lifecycle.set_visibility(&admin, "m:cam:one", Visibility::LoggedIn).unwrap();

    let foreign_admin = RequestContext::for_principal(Principal::user("u:gt:admin").with_role(ROLE_ADMIN));
    assert!(f.lifecycle.delete_resource(&foreign_admin, "m:cam:one").is_err());
}

#[test]
fn member_changes_insert_and_remove() {
    let f = fixture();
    f.lifecycle.create_resource(&as_user("u:cam:alice"), meeting("m:cam:one", Visibility::Public), &[], &["u:cam:bob".to_string()]).unwrap();
    assert_eq!(library_ids(&f, "u:cam:bob"), vec!["m:cam:one"]);
    assert!(library_ids(&f, "u:cam:carol").is_empty());

    f.lifecycle.update_members(&as_user("u:cam:alice"), "m:cam:one", &[
        MemberChange::revoke("u:cam:bob"),
        MemberChange::grant("u:cam:carol", Role::Manager),
    ]).unwrap();
    assert!(library_ids(&f, "u:cam:bob").is_empty());
    assert_eq!(library_ids(&f, "u:cam:carol"), vec!["m:cam:one"]);
}

#[test]
fn last_manager_cannot_be_removed() {
    let f = fixture();
    f.lifecycle.create_resource(&as_user("u:cam:alice"), meeting("m:cam:one", Visibility::Public), &[], &[]).unwrap();
    let err = f.lifecycle.update_members(&as_user("u:cam:alice"), "m:cam:one", &[MemberChange::revoke("u:cam:alice")]).unwrap_err();
    assert_eq!(err.code_str(), "last_manager");
    assert!(f.store.get_access_record("m:cam:one").unwrap().unwrap().managers.contains("u:cam:alice"));
}

#[test]
fn delete_clears_every_library() {
    let f = fixture();
    f.lifecycle.create_resource(&as_user("u:cam:alice"), meeting("m:cam:one", Visibility::Public), &[], &["u:cam:bob".to_string()]).unwrap();
    library_ids(&f, "u:cam:alice");
    library_ids(&f, "u:cam:bob");

    f.lifecycle.delete_resource(&as_user("u:cam:alice"), "m:cam:one").unwrap();
    assert!(library_ids(&f, "u:cam:alice").is_empty());
    assert!(library_ids(&f, "u:cam:bob").is_empty());
    assert!(f.store.get_access_record("m:cam:one").unwrap().is_none());
}
