use super::*;
use crate::test_fixtures;

#[test]
fn new_query_has_root_alias_only() {
    let catalog = test_fixtures::catalog();
    let query = CriteriaBuilder::new(&catalog).new_query("Person").unwrap();

    assert_eq!(query.root().to_string(), "t0");
    assert!(query.root().is_root());
    assert_eq!(query.entity().name(), "Person");
    assert!(query.joins().is_empty());
    assert!(query.predicates().is_empty());
}

#[test]
fn unknown_entity_is_rejected() {
    let catalog = test_fixtures::catalog();
    let err = CriteriaBuilder::new(&catalog)
        .new_query("Ghost")
        .unwrap_err();

    assert!(matches!(err, QueryError::UnknownEntity { entity } if entity == "Ghost"));
}

#[test]
fn join_declares_fresh_alias_with_kind() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();

    let manager = cb
        .join(&mut query, root, "manager", JoinKind::LeftOuter)
        .unwrap();
    let dept = cb
        .join(&mut query, manager, "department", JoinKind::Inner)
        .unwrap();

    assert_eq!(manager.to_string(), "t1");
    assert_eq!(dept.to_string(), "t2");
    assert_eq!(query.alias_entity(dept).unwrap().name(), "Department");
    assert_eq!(
        query.joins()[0],
        JoinClause {
            source: root,
            relation: "manager".to_string(),
            target: manager,
            kind: JoinKind::LeftOuter,
        }
    );
    assert_eq!(query.joins()[1].kind, JoinKind::Inner);
}

#[test]
fn join_rejects_unknown_relation() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();

    let err = cb
        .join(&mut query, root, "mentor", JoinKind::LeftOuter)
        .unwrap_err();

    assert_eq!(
        err,
        QueryError::UnknownRelation {
            entity: "Person".to_string(),
            relation: "mentor".to_string(),
        }
    );
    assert!(query.joins().is_empty());
}

#[test]
fn scalar_field_is_not_a_joinable_relation() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();

    let err = cb
        .join(&mut query, root, "firstname", JoinKind::Inner)
        .unwrap_err();

    assert!(matches!(err, QueryError::UnknownRelation { .. }));
}

#[test]
fn aliases_from_another_query_are_unknown() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let other = cb.new_query("Person").unwrap();
    let mut query = cb.new_query("Person").unwrap();

    let err = cb
        .join(&mut query, other.root(), "manager", JoinKind::LeftOuter)
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::UnknownAlias {
            alias: "t0".to_string()
        }
    );

    let err = cb.where_null(&mut query, other.root(), "age").unwrap_err();
    assert!(matches!(err, QueryError::UnknownAlias { .. }));
}

#[test]
fn where_in_requires_known_field() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();
    let param = cb.declare_parameter(&mut query);

    let err = cb
        .where_in(&mut query, root, "nickname", param)
        .unwrap_err();

    assert_eq!(
        err,
        QueryError::UnknownField {
            entity: "Person".to_string(),
            field: "nickname".to_string(),
        }
    );
}

#[test]
fn where_in_rejects_foreign_parameter() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut other = cb.new_query("Person").unwrap();
    let foreign = cb.declare_parameter(&mut other);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();

    let err = cb
        .where_in(&mut query, root, "firstname", foreign)
        .unwrap_err();

    assert!(matches!(err, QueryError::UnknownParameter { .. }));
}

#[test]
fn relation_path_access_never_declares_a_join() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();

    let path = query.path(root, "manager").unwrap();
    cb.where_not_null(&mut query, root, "manager").unwrap();

    assert!(path.relation);
    assert_eq!(path.column, "manager_id");
    assert!(query.joins().is_empty());
    assert_eq!(query.aliases().count(), 1);
}

#[test]
fn ordering_by_relation_is_an_invalid_target() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();

    let err = cb
        .order_by(&mut query, root, "manager", OrderDirection::Asc)
        .unwrap_err();

    assert_eq!(
        err,
        QueryError::InvalidOrderingTarget {
            alias: "t0".to_string(),
            member: "manager".to_string(),
        }
    );
}

#[test]
fn ordering_clauses_accumulate_in_call_order() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();

    cb.order_by(&mut query, root, "age", OrderDirection::Desc)
        .unwrap();
    cb.order_by(&mut query, root, "firstname", OrderDirection::Asc)
        .unwrap();

    let order: Vec<_> = query
        .order()
        .iter()
        .map(|c| (c.path.member.as_str(), c.direction))
        .collect();
    assert_eq!(
        order,
        [("age", OrderDirection::Desc), ("firstname", OrderDirection::Asc)]
    );
}

#[test]
fn single_parameter_rejects_multiple_values() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let param = cb.declare_scalar_parameter(&mut query);

    let err = query.bind(param, ["a", "b"]).unwrap_err();

    assert_eq!(
        err,
        QueryError::ParameterArityMismatch {
            parameter: "?1".to_string(),
            expected: 1,
            found: 2,
        }
    );
    assert!(!query.is_fully_bound());
}

#[test]
fn variable_parameter_accepts_any_count() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let param = cb.declare_parameter(&mut query);

    query.bind(param, Vec::<Value>::new()).unwrap();
    assert_eq!(query.bindings().get(param), Some(&[][..]));

    query.bind(param, ["Dave", "Carter"]).unwrap();
    assert_eq!(query.bindings().get(param).map(<[Value]>::len), Some(2));
    assert!(query.is_fully_bound());
}

#[test]
fn named_parameters_bind_by_name_and_must_be_unique() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();

    let names = cb
        .declare_named_parameter(&mut query, "names", Arity::Variable)
        .unwrap();
    let err = cb
        .declare_named_parameter(&mut query, "names", Arity::Single)
        .unwrap_err();
    assert!(matches!(err, QueryError::DuplicateParameter { .. }));

    query.bind_named("names", ["Dave"]).unwrap();
    assert_eq!(query.parameter(names).unwrap().label(), ":names");
    assert!(query.bindings().contains(names));

    let err = query.bind_named("missing", ["x"]).unwrap_err();
    assert!(matches!(err, QueryError::UnknownParameter { parameter } if parameter == ":missing"));
}
