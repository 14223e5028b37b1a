// tests/schema_tests.rs

use tagql::schema::{
    FieldMeta, FieldType, ResolveMode, Resolver, SchemaError, SchemaSnapshot, TagMeta,
};

fn tag(tag_id: &str, name: &str) -> TagMeta {
    TagMeta {
        tag_id: tag_id.to_string(),
        name: name.to_string(),
        normalized_name: tagql::normalize_name(name),
    }
}

fn field(tag_id: &str, name: &str, position: i64) -> FieldMeta {
    FieldMeta {
        tag_id: tag_id.to_string(),
        name: name.to_string(),
        normalized_name: tagql::normalize_name(name),
        position,
        type_override: None,
    }
}

fn edge(child: &str, parent: &str) -> (String, String) {
    (child.to_string(), parent.to_string())
}

/// contact <- employee <- manager: contact declares Email and Phone,
/// employee Department and StartDate, manager Team.
fn chain_snapshot() -> SchemaSnapshot {
    SchemaSnapshot {
        tags: vec![
            tag("t_contact", "contact"),
            tag("t_employee", "employee"),
            tag("t_manager", "manager"),
        ],
        fields: vec![
            field("t_contact", "Email", 0),
            field("t_contact", "Phone", 1),
            field("t_employee", "Department", 0),
            field("t_employee", "StartDate", 1),
            field("t_manager", "Team", 0),
        ],
        parents: vec![edge("t_manager", "t_employee"), edge("t_employee", "t_contact")],
    }
}

// ============================================================================
// Tag resolution and inheritance
// ============================================================================

#[test]
fn test_effective_field_order() {
    let snapshot = chain_snapshot();
    let resolver = Resolver::new(&snapshot);
    let manager = resolver.resolve_tag("manager").unwrap();

    let names: Vec<&str> = manager.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Team", "Department", "StartDate", "Email", "Phone"]);
}

#[test]
fn test_own_vs_inherited_split() {
    let snapshot = chain_snapshot();
    let resolver = Resolver::new(&snapshot);
    let manager = resolver.resolve_tag("manager").unwrap();

    let own: Vec<&str> = manager.own_fields().map(|f| f.name.as_str()).collect();
    assert_eq!(own, vec!["Team"]);

    let inherited: Vec<&str> = manager.inherited_fields().map(|f| f.name.as_str()).collect();
    assert_eq!(inherited, vec!["Department", "StartDate", "Email", "Phone"]);
}

#[test]
fn test_inherited_from_records_declaring_ancestor() {
    let snapshot = chain_snapshot();
    let resolver = Resolver::new(&snapshot);
    let manager = resolver.resolve_tag("manager").unwrap();

    let email = manager.field("email").unwrap();
    assert_eq!(email.inherited_from.as_deref(), Some("t_contact"));
    assert_eq!(email.owner_tag_id, "t_manager");

    let team = manager.field("team").unwrap();
    assert_eq!(team.inherited_from, None);
}

#[test]
fn test_own_field_shadows_inherited() {
    let mut snapshot = chain_snapshot();
    // manager redeclares Email with its own position
    snapshot.fields.push(field("t_manager", "Email", 1));
    let resolver = Resolver::new(&snapshot);
    let manager = resolver.resolve_tag("manager").unwrap();

    let email = manager.field("email").unwrap();
    assert_eq!(email.inherited_from, None, "own field must win");
    assert_eq!(
        manager.fields.iter().filter(|f| f.normalized == "email").count(),
        1
    );
}

#[test]
fn test_closer_ancestor_shadows_farther() {
    let mut snapshot = chain_snapshot();
    // employee also declares Phone; manager must see employee's copy
    snapshot.fields.push(field("t_employee", "Phone", 2));
    let resolver = Resolver::new(&snapshot);
    let manager = resolver.resolve_tag("manager").unwrap();

    let phone = manager.field("phone").unwrap();
    assert_eq!(phone.inherited_from.as_deref(), Some("t_employee"));
}

#[test]
fn test_tag_name_matching_is_normalized() {
    let snapshot = chain_snapshot();
    let resolver = Resolver::new(&snapshot);
    assert!(resolver.resolve_tag("Manager").is_ok());
    assert!(resolver.resolve_tag("MANAGER").is_ok());
}

#[test]
fn test_tag_not_found() {
    let snapshot = chain_snapshot();
    let resolver = Resolver::new(&snapshot);
    assert_eq!(
        resolver.resolve_tag("nope").unwrap_err(),
        SchemaError::TagNotFound("nope".to_string())
    );
}

// ============================================================================
// Cycle detection
// ============================================================================

#[test]
fn test_two_tag_cycle_fails() {
    let snapshot = SchemaSnapshot {
        tags: vec![tag("a", "alpha"), tag("b", "beta")],
        fields: vec![field("a", "Name", 0)],
        parents: vec![edge("a", "b"), edge("b", "a")],
    };
    let resolver = Resolver::new(&snapshot);
    assert!(matches!(
        resolver.resolve_tag("alpha"),
        Err(SchemaError::InheritanceCycle { .. })
    ));
}

#[test]
fn test_self_loop_fails() {
    let snapshot = SchemaSnapshot {
        tags: vec![tag("a", "alpha")],
        fields: vec![],
        parents: vec![edge("a", "a")],
    };
    let resolver = Resolver::new(&snapshot);
    assert!(matches!(
        resolver.resolve_tag("alpha"),
        Err(SchemaError::InheritanceCycle { .. })
    ));
}

// ============================================================================
// Field resolution
// ============================================================================

#[test]
fn test_field_identifier_spelling_variants() {
    let snapshot = chain_snapshot();
    let resolver = Resolver::new(&snapshot);
    let manager = resolver.resolve_tag("manager").unwrap();

    for spelling in ["StartDate", "start_date", "START-DATE", "Start Date"] {
        let resolved = resolver
            .resolve_field(&manager, spelling, ResolveMode::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.name, "StartDate", "spelling: {}", spelling);
    }
}

#[test]
fn test_strict_miss_is_error() {
    let snapshot = chain_snapshot();
    let resolver = Resolver::new(&snapshot);
    let manager = resolver.resolve_tag("manager").unwrap();

    assert_eq!(
        resolver
            .resolve_field(&manager, "Salary", ResolveMode::Strict)
            .unwrap_err(),
        SchemaError::FieldNotFound {
            tag: "manager".to_string(),
            field: "Salary".to_string(),
        }
    );
}

#[test]
fn test_lenient_miss_is_skip() {
    let snapshot = chain_snapshot();
    let resolver = Resolver::new(&snapshot);
    let manager = resolver.resolve_tag("manager").unwrap();

    assert_eq!(
        resolver
            .resolve_field(&manager, "Salary", ResolveMode::Lenient)
            .unwrap(),
        None
    );
}

// ============================================================================
// Type inference and overrides
// ============================================================================

#[test]
fn test_types_inferred_from_names() {
    let snapshot = chain_snapshot();
    let resolver = Resolver::new(&snapshot);
    let manager = resolver.resolve_tag("manager").unwrap();

    assert_eq!(manager.field("startdate").unwrap().field_type, FieldType::Date);
    assert_eq!(manager.field("email").unwrap().field_type, FieldType::Text);
    // "phone" alone has no number marker
    assert_eq!(manager.field("phone").unwrap().field_type, FieldType::Text);
}

#[test]
fn test_type_override_beats_inference() {
    let mut snapshot = chain_snapshot();
    snapshot.fields.push(FieldMeta {
        tag_id: "t_manager".to_string(),
        name: "Headcount".to_string(),
        normalized_name: "headcount".to_string(),
        position: 5,
        type_override: Some(FieldType::Text),
    });
    let resolver = Resolver::new(&snapshot);
    let manager = resolver.resolve_tag("manager").unwrap();

    // "headcount" would infer Number; the stored override wins.
    assert_eq!(manager.field("headcount").unwrap().field_type, FieldType::Text);
}

// ============================================================================
// Wildcard support
// ============================================================================

#[test]
fn test_field_names_matching_across_tags() {
    let mut snapshot = chain_snapshot();
    snapshot.fields.push(field("t_contact", "Notes", 2));
    snapshot.fields.push(field("t_employee", "notes", 3));
    let resolver = Resolver::new(&snapshot);

    let names = resolver.field_names_matching("notes");
    assert_eq!(names, vec!["Notes".to_string(), "notes".to_string()]);
    assert!(resolver.field_names_matching("missing").is_empty());
}
