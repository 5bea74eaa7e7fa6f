use super::*;
use crate::visibility::Visibility;

fn meeting(id: &str) -> Resource {
    Resource::new(id, "meeting", Visibility::Public, "standup", 1_000)
}

#[test]
fn acl_scan_finds_managers_and_members() {
    let store = MemoryStore::new();
    for id in ["m:cam:a", "m:cam:b", "m:cam:c"] {
        store.put_resource(meeting(id)).unwrap();
    }
    let mut a = AccessRecord::for_resource(&meeting("m:cam:a"));
    a.set_role("u:cam:alice", Some(Role::Manager));
    let mut b = AccessRecord::for_resource(&meeting("m:cam:b"));
    b.set_role("u:cam:alice", Some(Role::Member));
    let mut c = AccessRecord::for_resource(&meeting("m:cam:c"));
    c.set_role("u:cam:bob", Some(Role::Manager));
    for acl in [a, b, c] { store.put_access_record(acl).unwrap(); }

    let ids = store.list_access_records_for_principal("u:cam:alice").unwrap();
    assert_eq!(ids, vec!["m:cam:a".to_string(), "m:cam:b".to_string()]);
    assert_eq!(store.acl_scans(), 1);
}

#[test]
fn out_of_band_delete_leaves_dangling_acl() {
    let store = MemoryStore::new();
    let m = meeting("m:cam:gone");
    store.put_resource(m.clone()).unwrap();
    let mut acl = AccessRecord::for_resource(&m);
    acl.set_role("u:cam:alice", Some(Role::Manager));
    store.put_access_record(acl).unwrap();

    assert!(store.delete_resource_out_of_band("m:cam:gone"));
    assert_eq!(store.load_resource("m:cam:gone"), Err(StoreError::NotFound("m:cam:gone".into())));
    assert_eq!(store.list_access_records_for_principal("u:cam:alice").unwrap(), vec!["m:cam:gone".to_string()]);

    assert!(store.remove_access("m:cam:gone", "u:cam:alice").unwrap());
    assert!(store.get_access_record("m:cam:gone").unwrap().is_none());
}

#[test]
fn availability_switches_fail_with_unavailable() {
    let store = MemoryStore::new();
    store.set_authz_available(false);
    assert!(matches!(store.list_access_records_for_principal("u:cam:alice"), Err(StoreError::Unavailable(_))));
    store.set_authz_available(true);
    store.set_resources_available(false);
    assert!(matches!(store.load_resource("m:cam:x"), Err(StoreError::Unavailable(_))));
}

#[test]
fn manager_role_takes_precedence() {
    let mut acl = AccessRecord::default();
    acl.members.insert("u:cam:alice".into());
    acl.managers.insert("u:cam:alice".into());
    assert_eq!(acl.role_of("u:cam:alice"), Some(Role::Manager));
    assert_eq!(acl.principals().count(), 1);
}

#[test]
fn seed_json_populates_store_with_dangling_entries() {
    let json = r#"{
        "principals": [
            { "id": "u:cam:alice", "kind": "user", "tenant": "cam", "visibility": "private" },
            { "id": "g:cam:team", "kind": "group", "tenant": "cam", "visibility": "public",
              "members": { "u:cam:alice": "manager" } }
        ],
        "resources": [
            { "id": "m:cam:a", "resource_type": "meeting", "tenant": "cam", "visibility": "loggedin",
              "display_name": "A", "created_at": 1, "managers": ["u:cam:alice"], "members": ["g:cam:team"] },
            { "id": "m:cam:b", "resource_type": "meeting", "tenant": "cam", "visibility": "public",
              "display_name": "B", "created_at": 2, "managers": ["u:cam:alice"], "deleted": true }
        ]
    }"#;
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("seed.json");
    std::fs::write(&path, json).unwrap();

    let seed = Seed::load(&path).unwrap();
    let store = MemoryStore::from_seed(&seed).unwrap();
    let team = store.get_principal("g:cam:team").unwrap().unwrap();
    assert_eq!(team.role_of("u:cam:alice"), Some(Role::Manager));
    assert_eq!(store.load_resource("m:cam:a").unwrap().visibility, Visibility::LoggedIn);
    assert!(store.load_resource("m:cam:b").is_err());
    assert_eq!(store.list_access_records_for_principal("u:cam:alice").unwrap().len(), 2);
    assert_eq!(store.list_access_records_for_principal("g:cam:team").unwrap(), vec!["m:cam:a".to_string()]);
}

#[test]
fn seed_rejects_malformed_ids() {
    let seed = Seed { principals: vec![PrincipalRecord::user("alice", Visibility::Public)], resources: vec![] };
    assert!(MemoryStore::from_seed(&seed).is_err());
}
