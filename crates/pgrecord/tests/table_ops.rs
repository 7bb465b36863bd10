mod common;

use common::{MockProvider, Reply};
use pgrecord::{AbsencePolicy, FieldMap, OrmError, Record, SqlLogger, Table, Value};

#[derive(Record, Debug, Clone, PartialEq)]
struct User {
    id: i64,
    name: String,
    age: i32,
    email: Option<String>,
}

fn users(provider: &MockProvider) -> Table<MockProvider> {
    Table::new(provider.clone(), "app", "users")
        .unwrap()
        .logger(SqlLogger::quiet())
}

fn user_row(id: i64, name: &str, age: i64, email: Option<&str>) -> Vec<Value> {
    vec![
        Value::Int(id),
        Value::from(name),
        Value::Int(age),
        Value::from(email),
    ]
}

const USER_COLUMNS: &[&str] = &["id", "name", "age", "email"];

#[tokio::test]
async fn insert_binds_values_in_column_order() {
    let provider = MockProvider::new();
    provider.reply(Reply::Affected(1));

    users(&provider)
        .insert(&FieldMap::new().with("name", "alice").with("age", 30))
        .await
        .unwrap();

    let stmt = provider.last();
    assert_eq!(
        stmt.sql(),
        r#"INSERT INTO "users" ("name","age") VALUES ($1,$2)"#
    );
    assert_eq!(stmt.args(), &[Value::from("alice"), Value::Int(30)]);
    assert_eq!(provider.databases(), vec!["app"]);
    assert!(provider.all_released());
}

#[tokio::test]
async fn update_by_id_binds_every_value() {
    let provider = MockProvider::new();
    provider.reply(Reply::Affected(1));

    let updated = users(&provider)
        .update_by_id(7, &FieldMap::new().with("name", "o'brien").with("age", 0))
        .await
        .unwrap();

    assert_eq!(updated, 1);
    let stmt = provider.last();
    assert_eq!(stmt.sql(), r#"UPDATE "users" SET "name" = $1 WHERE id = $2"#);
    assert_eq!(stmt.args(), &[Value::from("o'brien"), Value::Int(7)]);
}

#[tokio::test]
async fn delete_by_id() {
    let provider = MockProvider::new();
    provider.reply(Reply::Affected(1));

    users(&provider).delete_by_id(3).await.unwrap();

    let stmt = provider.last();
    assert_eq!(stmt.sql(), r#"DELETE FROM "users" WHERE id = $1"#);
    assert_eq!(stmt.args(), &[Value::Int(3)]);
}

#[tokio::test]
async fn exists_by_id_and_filter_return_the_scalar() {
    let provider = MockProvider::new();
    provider.reply_bool(true).reply_bool(false);
    let table = users(&provider);

    assert!(table.exists_by_id(1).await.unwrap());
    assert!(
        !table
            .exists_by_filter(&FieldMap::new().with("status", "active"))
            .await
            .unwrap()
    );

    assert_eq!(
        provider.sql(),
        vec![
            r#"SELECT EXISTS (SELECT * FROM "users" WHERE id = $1)"#,
            r#"SELECT EXISTS (SELECT * FROM "users" WHERE status = $1)"#,
        ]
    );
}

#[tokio::test]
async fn exists_by_empty_filter_is_a_build_error_without_connecting() {
    let provider = MockProvider::new();
    let table = users(&provider);

    let err = table.exists_by_filter(&FieldMap::new()).await.unwrap_err();
    assert!(err.is_build());

    let only_absent = FieldMap::new().with("age", 0).with("name", "-");
    assert!(table.exists_by_filter(&only_absent).await.unwrap_err().is_build());

    assert_eq!(provider.state().connects, 0);
    assert!(provider.sql().is_empty());
}

#[tokio::test]
async fn filter_drops_zero_values() {
    let provider = MockProvider::new();
    provider.reply_rows(USER_COLUMNS, vec![user_row(1, "alice", 30, None)]);

    let found: Vec<User> = users(&provider)
        .get_all_by_filter(&FieldMap::new().with("status", "active").with("age", 0))
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    let stmt = provider.last();
    assert_eq!(stmt.sql(), r#"SELECT * FROM "users" WHERE status = $1"#);
    assert_eq!(stmt.args(), &[Value::from("active")]);
}

#[tokio::test]
async fn get_by_id_maps_the_row() {
    let provider = MockProvider::new();
    provider.reply_rows(
        USER_COLUMNS,
        vec![user_row(5, "bob", 41, Some("bob@example.com"))],
    );

    let user: User = users(&provider).get_by_id(5).await.unwrap();
    assert_eq!(
        user,
        User {
            id: 5,
            name: "bob".into(),
            age: 41,
            email: Some("bob@example.com".into()),
        }
    );
    assert_eq!(
        provider.last().sql(),
        r#"SELECT * FROM "users" WHERE id = $1"#
    );
    assert!(provider.all_released());
}

#[tokio::test]
async fn get_by_missing_id_is_not_found() {
    let provider = MockProvider::new();
    provider.reply(Reply::Rows(Vec::new()));

    let err = users(&provider).get_by_id::<User>(404).await.unwrap_err();
    assert!(err.is_not_found(), "{err}");
    assert!(provider.all_released());
}

#[tokio::test]
async fn get_by_filter_takes_the_first_match() {
    let provider = MockProvider::new();
    provider.reply_rows(
        USER_COLUMNS,
        vec![user_row(2, "carol", 25, None), user_row(9, "carol", 52, None)],
    );

    let user: User = users(&provider)
        .get_by_filter(&FieldMap::new().with("name", "carol"))
        .await
        .unwrap();
    assert_eq!(user.id, 2);

    provider.reply(Reply::Rows(Vec::new()));
    let err = users(&provider)
        .get_by_filter::<User>(&FieldMap::new().with("name", "nobody"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn get_all_preserves_order_and_allows_empty_results() {
    let provider = MockProvider::new();
    provider.reply_rows(
        USER_COLUMNS,
        vec![
            user_row(3, "c", 3, None),
            user_row(1, "a", 1, None),
            user_row(2, "b", 2, None),
        ],
    );
    provider.reply(Reply::Rows(Vec::new()));
    let table = users(&provider);

    let all: Vec<User> = table.get_all().await.unwrap();
    assert_eq!(all.iter().map(|u| u.id).collect::<Vec<_>>(), vec![3, 1, 2]);
    assert_eq!(provider.last().sql(), r#"SELECT * FROM "users""#);

    let none: Vec<User> = table.get_all().await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn type_mismatch_is_a_mapping_error() {
    let provider = MockProvider::new();
    provider.reply_rows(&["id", "age"], vec![vec![Value::Int(1), Value::from("thirty")]]);

    let err = users(&provider).get_by_id::<User>(1).await.unwrap_err();
    match err {
        OrmError::Mapping { column, .. } => assert_eq!(column, "age"),
        other => panic!("expected a mapping error, got {other}"),
    }
    assert!(provider.all_released());
}

#[tokio::test]
async fn get_id_by_filter_returns_first_identifier() {
    let provider = MockProvider::new();
    provider.reply_rows(&["id"], vec![vec![Value::Int(11)], vec![Value::Int(12)]]);

    let id = users(&provider)
        .get_id_by_filter(&FieldMap::new().with("name", "dup"))
        .await
        .unwrap();
    assert_eq!(id, Value::Int(11));
    assert_eq!(
        provider.last().sql(),
        r#"SELECT id FROM "users" WHERE name = $1"#
    );
}

#[tokio::test]
async fn connection_failures_are_returned() {
    let provider = MockProvider::new();
    provider.state().refuse_connections = true;

    let err = users(&provider).get_all::<User>().await.unwrap_err();
    assert!(matches!(err, OrmError::Connection(_)), "{err}");
}

#[tokio::test]
async fn execution_failures_release_the_connection() {
    let provider = MockProvider::new();
    provider.reply(Reply::Fail("relation \"users\" does not exist".into()));

    let err = users(&provider)
        .insert(&FieldMap::new().with("name", "x"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("does not exist"));
    assert_eq!(provider.state().connects, 1);
    assert!(provider.all_released());
}

#[tokio::test]
async fn custom_id_column_and_null_policy() {
    let provider = MockProvider::new();
    provider.reply(Reply::Affected(1));
    let table = users(&provider)
        .id_column("user_id")
        .unwrap()
        .absence_policy(AbsencePolicy::NullIsAbsent);

    table
        .update_by_id(1, &FieldMap::new().with("age", 0).with("email", Value::Null))
        .await
        .unwrap();

    let stmt = provider.last();
    assert_eq!(stmt.sql(), r#"UPDATE "users" SET "age" = $1 WHERE user_id = $2"#);
    assert_eq!(stmt.args(), &[Value::Int(0), Value::Int(1)]);
}

#[tokio::test]
async fn flatten_insert_get_round_trip() {
    let provider = MockProvider::new();
    let original = User {
        id: 21,
        name: "dora".into(),
        age: 33,
        email: Some("dora@example.com".into()),
    };

    provider.reply(Reply::Affected(1));
    let table = users(&provider);
    table.insert(&original.to_field_map()).await.unwrap();

    // Echo the inserted columns and values back as the stored row.
    let inserted = provider.last();
    let sql = inserted.sql().to_string();
    let columns: Vec<String> = sql
        .split('(')
        .nth(1)
        .and_then(|cols| cols.split(')').next())
        .unwrap()
        .split(',')
        .map(|c| c.trim_matches('"').to_string())
        .collect();
    let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    provider.reply_rows(&column_refs, vec![inserted.args().to_vec()]);

    let fetched: User = table.get_by_id(original.id).await.unwrap();
    assert_eq!(fetched, original);
}
