use super::*;

fn users() -> StatementBuilder {
    StatementBuilder::new("users").unwrap()
}

#[test]
fn insert_quotes_identifiers_and_binds_values_in_order() {
    let data = FieldMap::new().with("name", "alice").with("age", 30i64);
    let stmt = users().insert(&data).unwrap();
    assert_eq!(
        stmt.sql(),
        r#"INSERT INTO "users" ("name","age") VALUES ($1,$2)"#
    );
    assert_eq!(stmt.args(), &[Value::from("alice"), Value::Int(30)]);
}

#[test]
fn insert_drops_absent_fields() {
    let data = FieldMap::new()
        .with("name", "alice")
        .with("nick", "")
        .with("age", 0i64)
        .with("team", "-")
        .with("email", Value::Null)
        .with("active", true);
    let stmt = users().insert(&data).unwrap();
    assert_eq!(
        stmt.sql(),
        r#"INSERT INTO "users" ("name","active") VALUES ($1,$2)"#
    );
    assert_eq!(stmt.args(), &[Value::from("alice"), Value::Bool(true)]);
}

#[test]
fn insert_with_nothing_to_write_is_a_build_error() {
    let err = users().insert(&FieldMap::new()).unwrap_err();
    assert!(err.is_build());

    let only_absent = FieldMap::new().with("age", 0i64).with("name", "");
    assert!(users().insert(&only_absent).unwrap_err().is_build());
}

#[test]
fn insert_under_null_only_policy_keeps_zero() {
    let builder = users().absence_policy(AbsencePolicy::NullIsAbsent);
    let stmt = builder
        .insert(&FieldMap::new().with("score", 0i64).with("bio", ""))
        .unwrap();
    assert_eq!(
        stmt.sql(),
        r#"INSERT INTO "users" ("score","bio") VALUES ($1,$2)"#
    );
}

#[test]
fn insert_returning_id() {
    let stmt = users()
        .insert_returning_id(&FieldMap::new().with("name", "alice"))
        .unwrap();
    assert_eq!(
        stmt.sql(),
        r#"INSERT INTO "users" ("name") VALUES ($1) RETURNING id"#
    );
}

#[test]
fn column_names_with_quotes_are_escaped() {
    let stmt = users()
        .insert(&FieldMap::new().with(r#"we"ird"#, 1i64))
        .unwrap();
    assert_eq!(
        stmt.sql(),
        r#"INSERT INTO "users" ("we""ird") VALUES ($1)"#
    );
}

#[test]
fn update_binds_every_value_including_id() {
    let data = FieldMap::new()
        .with("name", "o'brien")
        .with("age", 31i64);
    let stmt = users().update_by_id(7i64, &data).unwrap();
    assert_eq!(
        stmt.sql(),
        r#"UPDATE "users" SET "name" = $1, "age" = $2 WHERE id = $3"#
    );
    assert_eq!(
        stmt.args(),
        &[Value::from("o'brien"), Value::Int(31), Value::Int(7)]
    );
    assert!(!stmt.sql().contains("o'brien"));
}

#[test]
fn update_with_empty_set_is_a_build_error() {
    let err = users()
        .update_by_id(1i64, &FieldMap::new().with("age", 0i64))
        .unwrap_err();
    assert!(err.is_build());
}

#[test]
fn null_identifier_is_rejected() {
    assert!(users().delete_by_id(Value::Null).unwrap_err().is_build());
    assert!(users().select_by_id(None::<i64>).unwrap_err().is_build());
}

#[test]
fn delete_and_select_by_id() {
    let del = users().delete_by_id(3i64).unwrap();
    assert_eq!(del.sql(), r#"DELETE FROM "users" WHERE id = $1"#);
    assert_eq!(del.args(), &[Value::Int(3)]);

    let sel = users().select_by_id(3i64).unwrap();
    assert_eq!(sel.sql(), r#"SELECT * FROM "users" WHERE id = $1"#);
}

#[test]
fn custom_id_column() {
    let stmt = StatementBuilder::new("accounts")
        .unwrap()
        .id_column("account_id")
        .unwrap()
        .delete_by_id(9i64)
        .unwrap();
    assert_eq!(stmt.sql(), r#"DELETE FROM "accounts" WHERE account_id = $1"#);
}

#[test]
fn select_all_has_no_arguments() {
    let stmt = users().select_all();
    assert_eq!(stmt.sql(), r#"SELECT * FROM "users""#);
    assert!(stmt.args().is_empty());
}

#[test]
fn filter_drops_zero_sentinel() {
    let filter = FieldMap::new().with("status", "active").with("age", 0i64);
    let stmt = users().select_by_filter(&filter).unwrap();
    assert_eq!(stmt.sql(), r#"SELECT * FROM "users" WHERE status = $1"#);
    assert_eq!(stmt.args(), &[Value::from("active")]);
}

#[test]
fn filter_conditions_follow_argument_order() {
    let filter = FieldMap::new()
        .with("status", "active")
        .with("role", "admin")
        .with("team_id", 4i64);
    let stmt = users().select_by_filter(&filter).unwrap();
    assert_eq!(
        stmt.sql(),
        r#"SELECT * FROM "users" WHERE status = $1 AND role = $2 AND team_id = $3"#
    );
    assert_eq!(
        stmt.args(),
        &[Value::from("active"), Value::from("admin"), Value::Int(4)]
    );
}

#[test]
fn empty_filter_is_a_build_error() {
    assert!(users().select_by_filter(&FieldMap::new()).unwrap_err().is_build());
    assert!(users().exists_by_filter(&FieldMap::new()).unwrap_err().is_build());
    let all_absent = FieldMap::new().with("status", "-");
    assert!(users().exists_by_filter(&all_absent).unwrap_err().is_build());
}

#[test]
fn filter_field_names_cannot_inject() {
    let filter = FieldMap::new().with("status = status OR 1", "x");
    let stmt = users().select_by_filter(&filter).unwrap();
    assert_eq!(
        stmt.sql(),
        r#"SELECT * FROM "users" WHERE "status = status OR 1" = $1"#
    );
}

#[test]
fn exists_wraps_the_select() {
    let stmt = users().exists_by_id(5i64).unwrap();
    assert_eq!(
        stmt.sql(),
        r#"SELECT EXISTS (SELECT * FROM "users" WHERE id = $1)"#
    );

    let filter = FieldMap::new().with("email", "a@b.c");
    let stmt = users().exists_by_filter(&filter).unwrap();
    assert_eq!(
        stmt.sql(),
        r#"SELECT EXISTS (SELECT * FROM "users" WHERE email = $1)"#
    );
    assert_eq!(stmt.args(), &[Value::from("a@b.c")]);
}

#[test]
fn select_id_by_filter() {
    let filter = FieldMap::new().with("email", "a@b.c");
    let stmt = users().select_id_by_filter(&filter).unwrap();
    assert_eq!(stmt.sql(), r#"SELECT id FROM "users" WHERE email = $1"#);
}

#[test]
fn schema_qualified_table_is_quoted_per_part() {
    let stmt = StatementBuilder::new("app.users").unwrap().select_all();
    assert_eq!(stmt.sql(), r#"SELECT * FROM "app"."users""#);
}

#[test]
fn placeholder_count_matches_arguments() {
    let maps = [
        FieldMap::new().with("a", 1i64),
        FieldMap::new().with("a", 1i64).with("b", "x").with("c", 2.5f64),
        FieldMap::new()
            .with("a", 0i64)
            .with("b", "y")
            .with("c", Value::Null)
            .with("d", false),
    ];
    for map in &maps {
        for stmt in [
            users().insert(map).unwrap(),
            users().update_by_id(1i64, map).unwrap(),
            users().select_by_filter(map).unwrap(),
            users().exists_by_filter(map).unwrap(),
        ] {
            assert_eq!(stmt.placeholder_count(), stmt.args().len(), "{}", stmt.sql());
        }
    }
}
