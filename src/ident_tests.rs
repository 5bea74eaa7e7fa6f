use super::*;

#[test]
fn parses_well_formed_ids() {
    let p = parse_id("u:cam:alice").unwrap();
    assert_eq!(p.kind, 'u');
    assert_eq!(p.tenant, "cam");
    assert_eq!(p.local, "alice");
    assert!(p.is_user());

    let g = parse_principal_id("g:gt.edu:oae-team").unwrap();
    assert!(g.is_group());
    assert_eq!(g.tenant, "gt.edu");

    let m = parse_resource_id("m:cam:Weekly_Sync-1").unwrap();
    assert_eq!(m.kind, 'm');
}

#[test]
fn rejects_malformed_ids() {
    for bad in ["", "alice", "u:cam", "u::alice", "U:cam:alice", "u:cam:a b", "u:cam:a:b", "uu:cam:alice"] {
        let err = parse_id(bad).unwrap_err();
        assert_eq!(err.code_str(), "invalid_id", "expected '{}' to be rejected", bad);
    }
}

#[test]
fn principal_and_resource_kinds_are_enforced() {
    assert_eq!(parse_principal_id("m:cam:x").unwrap_err().code_str(), "invalid_principal_id");
    assert_eq!(parse_resource_id("u:cam:x").unwrap_err().code_str(), "invalid_resource_id");
    assert_eq!(parse_resource_id("g:cam:x").unwrap_err().code_str(), "invalid_resource_id");
}

#[test]
fn tenant_of_extracts_alias() {
    assert_eq!(tenant_of("m:gt:abc").as_deref(), Some("gt"));
    assert_eq!(tenant_of("nope"), None);
}
