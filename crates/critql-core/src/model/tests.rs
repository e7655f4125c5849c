use super::*;
use crate::catalog::CatalogError;

fn person() -> EntityDescriptorBuilder {
    EntityDescriptor::builder("Person", "people")
        .primary_key(FieldDescriptor::new("id", SqlType::Integer).generated())
        .field(FieldDescriptor::new("emailAddress", SqlType::Text))
}

#[test]
fn columns_default_to_snake_case() {
    let entity = person()
        .relation(RelationDescriptor::many_to_one("homeTown", "Town").nullable())
        .build()
        .unwrap();

    assert_eq!(entity.field("emailAddress").unwrap().column, "email_address");
    assert_eq!(entity.relation("homeTown").unwrap().fk_column, "home_town_id");
    assert_eq!(entity.primary_key().name, "id");
}

#[test]
fn members_resolve_fields_before_relations() {
    let entity = person()
        .relation(RelationDescriptor::many_to_one("manager", "Person").nullable())
        .build()
        .unwrap();

    let names: Vec<_> = entity.members().map(Member::name).collect();
    assert_eq!(names, ["id", "emailAddress", "manager"]);
    assert!(entity.member("manager").unwrap().is_relation());
    assert_eq!(entity.member("manager").unwrap().column(), "manager_id");
    assert!(entity.member("nickname").is_none());
}

#[test]
fn duplicate_member_names_are_rejected() {
    let err = person()
        .relation(RelationDescriptor::many_to_one("emailAddress", "Person"))
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        CatalogError::DuplicateMember { ref member, .. } if member == "emailAddress"
    ));
}

#[test]
fn duplicate_columns_are_rejected() {
    let err = person()
        .field(FieldDescriptor::new("mail", SqlType::Text).column("email_address"))
        .build()
        .unwrap_err();

    assert!(matches!(err, CatalogError::DuplicateMember { .. }));
}

#[test]
fn missing_primary_key_is_rejected() {
    let err = EntityDescriptor::builder("Person", "people")
        .field(FieldDescriptor::new("name", SqlType::Text))
        .build()
        .unwrap_err();

    assert!(matches!(err, CatalogError::MissingPrimaryKey { .. }));
}

#[test]
fn non_identifier_tables_are_rejected() {
    let err = EntityDescriptor::builder("Person", "people; drop table x")
        .primary_key(FieldDescriptor::new("id", SqlType::Integer))
        .build()
        .unwrap_err();

    assert!(matches!(err, CatalogError::InvalidIdentifier { .. }));
    assert!(is_identifier("_t0"));
    assert!(!is_identifier("0t"));
    assert!(!is_identifier(""));
}

#[test]
fn reserved_words_are_rejected_in_any_case() {
    let err = EntityDescriptor::builder("Order", "order")
        .primary_key(FieldDescriptor::new("id", SqlType::Integer))
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        CatalogError::ReservedIdentifier {
            entity: "Order".to_string(),
            identifier: "order".to_string(),
        }
    );

    let err = person()
        .field(FieldDescriptor::new("group", SqlType::Text))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::ReservedIdentifier { ref identifier, .. } if identifier == "group"
    ));

    let err = EntityDescriptor::builder("User", "USER")
        .primary_key(FieldDescriptor::new("id", SqlType::Integer))
        .build()
        .unwrap_err();
    assert!(matches!(err, CatalogError::ReservedIdentifier { .. }));

    assert!(is_reserved_word("Select"));
    assert!(!is_reserved_word("users"));
    assert!(!is_reserved_word("ordered"));
}
