use super::*;
use crate::{
    db::query::{CompareOp, CriteriaBuilder, JoinKind, OrderDirection},
    test_fixtures,
    value::Value,
};
use proptest::prelude::*;

fn person_columns(alias: &str) -> String {
    ["id", "firstname", "age", "active", "manager_id", "department_id"]
        .iter()
        .map(|c| format!("{alias}.{c} AS {alias}_{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[test]
fn bare_query_selects_root_columns() {
    let catalog = test_fixtures::catalog();
    let query = CriteriaBuilder::new(&catalog).new_query("Person").unwrap();

    let translated = translate(&query).unwrap();

    assert_eq!(
        translated.sql(),
        format!("SELECT {} FROM people AS t0", person_columns("t0"))
    );
    assert_eq!(translated.placeholder_count(), 0);
    assert_eq!(translated.layout().aliases.len(), 1);
}

#[test]
fn membership_emits_one_placeholder_per_value() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();
    let names = cb.declare_parameter(&mut query);
    cb.where_in(&mut query, root, "firstname", names).unwrap();
    query.bind(names, ["Dave", "Carter"]).unwrap();

    let translated = translate(&query).unwrap();

    assert!(translated.sql().ends_with(" WHERE t0.firstname IN (?, ?)"));
    assert!(!translated.sql().contains("(("));
    assert_eq!(count_placeholders(translated.sql()), 2);
    assert_eq!(
        translated.parameter_order(),
        [ParameterSlot {
            parameter: names,
            label: "?1".to_string(),
            placeholders: 2,
        }]
    );
}

#[test]
fn empty_membership_matches_nothing() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();
    let names = cb.declare_parameter(&mut query);
    let excluded = cb.declare_parameter(&mut query);
    cb.where_in(&mut query, root, "firstname", names).unwrap();
    cb.where_not_in(&mut query, root, "age", excluded).unwrap();
    query.bind(names, Vec::<Value>::new()).unwrap();
    query.bind(excluded, Vec::<Value>::new()).unwrap();

    let translated = translate(&query).unwrap();

    assert!(translated.sql().ends_with(" WHERE 1 = 0 AND 1 = 1"));
    assert_eq!(translated.placeholder_count(), 0);
    assert_eq!(translated.parameter_order().len(), 2);
}

#[test]
fn left_outer_join_and_ordering_render_verbatim() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();
    let manager = cb
        .join(&mut query, root, "manager", JoinKind::LeftOuter)
        .unwrap();
    cb.order_by(&mut query, manager, "firstname", OrderDirection::Asc)
        .unwrap();
    cb.order_by(&mut query, root, "id", OrderDirection::Desc)
        .unwrap();

    let translated = translate(&query).unwrap();

    assert_eq!(
        translated.sql(),
        format!(
            "SELECT {}, {} FROM people AS t0 LEFT OUTER JOIN people AS t1 ON t0.manager_id = t1.id \
             ORDER BY t1.firstname ASC, t0.id DESC",
            person_columns("t0"),
            person_columns("t1"),
        )
    );
    assert!(translated.layout().aliases[1].optional);
    assert_eq!(
        translated.layout().links,
        [LinkLayout {
            source: 0,
            relation: "manager".to_string(),
            target: 1,
        }]
    );
}

#[test]
fn relation_path_access_keeps_left_outer_join() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();

    // Touch the relation as a path before and after declaring the join.
    query.path(root, "manager").unwrap();
    let manager = cb
        .join(&mut query, root, "manager", JoinKind::LeftOuter)
        .unwrap();
    cb.where_null(&mut query, root, "manager").unwrap();
    cb.order_by(&mut query, manager, "firstname", OrderDirection::Asc)
        .unwrap();

    let sql = translate(&query).unwrap().sql().to_string();

    assert!(sql.contains("FROM people AS t0 LEFT OUTER JOIN people AS t1 ON t0.manager_id = t1.id"));
    assert!(!sql.contains("people AS t0,"));
    assert!(!sql.contains(" JOIN people AS t1 ON t1"));
    assert!(sql.contains("WHERE t0.manager_id IS NULL"));
    assert_eq!(sql.matches("JOIN").count(), 1);
}

#[test]
fn inner_join_renders_plain_join_and_propagates_optionality() {
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
    let own_dept = cb
        .join(&mut query, root, "department", JoinKind::Inner)
        .unwrap();

    let translated = translate(&query).unwrap();

    assert!(translated.sql().contains(
        " JOIN departments AS t2 ON t1.department_id = t2.id JOIN departments AS t3 ON t0.department_id = t3.id"
    ));
    let layout = translated.layout();
    assert!(layout.aliases[dept.index()].optional);
    assert!(!layout.aliases[own_dept.index()].optional);
}

#[test]
fn compare_requires_exactly_one_value() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();
    let age = cb.declare_parameter(&mut query);
    cb.where_compare(&mut query, root, "age", CompareOp::Gte, age)
        .unwrap();

    query.bind(age, [30, 40]).unwrap();
    let err = translate(&query).unwrap_err();
    assert_eq!(
        err,
        QueryError::ParameterArityMismatch {
            parameter: "?1".to_string(),
            expected: 1,
            found: 2,
        }
    );

    query.bind(age, [30]).unwrap();
    assert!(translate(&query).unwrap().sql().ends_with(" WHERE t0.age >= ?"));
}

#[test]
fn unbound_parameter_fails_translation() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();
    let names = cb.declare_parameter(&mut query);
    cb.where_in(&mut query, root, "firstname", names).unwrap();

    let err = translate(&query).unwrap_err();

    assert_eq!(
        err,
        QueryError::UnboundParameter {
            parameter: "?1".to_string()
        }
    );
}

#[test]
fn page_window_renders_limit_and_offset() {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    cb.page(&mut query, 10, 0);
    assert!(translate(&query).unwrap().sql().ends_with(" LIMIT 10"));

    cb.page(&mut query, 10, 20);
    assert!(translate(&query).unwrap().sql().ends_with(" LIMIT 10 OFFSET 20"));
}

#[test]
fn insert_lists_columns_and_placeholders() {
    let catalog = test_fixtures::catalog();
    let person = catalog.describe("Person").unwrap();

    assert_eq!(
        translate_insert(&person, &["firstname", "age"]),
        "INSERT INTO people (firstname, age) VALUES (?, ?)"
    );
    assert_eq!(
        translate_insert(&person, &[]),
        "INSERT INTO people DEFAULT VALUES"
    );
}

#[test]
fn placeholder_count_skips_literals() {
    assert_eq!(count_placeholders("SELECT '?' FROM t WHERE a = ? AND b IN (?, ?)"), 3);
}

fn membership_query(names: &[String]) -> CriteriaQuery {
    let catalog = test_fixtures::catalog();
    let cb = CriteriaBuilder::new(&catalog);
    let mut query = cb.new_query("Person").unwrap();
    let root = query.root();
    let manager = cb
        .join(&mut query, root, "manager", JoinKind::LeftOuter)
        .unwrap();
    let param = cb.declare_parameter(&mut query);
    cb.where_in(&mut query, manager, "firstname", param).unwrap();
    cb.order_by(&mut query, manager, "firstname", OrderDirection::Asc)
        .unwrap();
    query.bind(param, names.iter().cloned()).unwrap();

    query
}

proptest! {
    #[test]
    fn membership_placeholders_match_bound_values(names in prop::collection::vec("[a-z]{1,8}", 0..12)) {
        let query = membership_query(&names);
        let translated = translate(&query).unwrap();

        prop_assert_eq!(count_placeholders(translated.sql()), names.len());
        prop_assert_eq!(translated.placeholder_count(), names.len());
        prop_assert!(translated.sql().contains("LEFT OUTER JOIN"));
    }

    #[test]
    fn translation_is_idempotent(names in prop::collection::vec("[a-z]{1,8}", 0..6)) {
        let query = membership_query(&names);

        let first = translate(&query).unwrap();
        let second = translate(&query).unwrap();

        prop_assert_eq!(first.sql(), second.sql());
        prop_assert_eq!(first, second);
    }
}
