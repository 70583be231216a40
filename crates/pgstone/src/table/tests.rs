use super::*;
use crate::constraints::{PRIMARY_KEY, UNIQUE};
use crate::statement::Statement;

fn mock_db(name: &str) -> Database {
    let db = Database::new(name);
    db.disable_execution();
    db
}

#[test]
fn test_table_names() {
    let db = mock_db("table_names");
    let table = db.table("test_table_a");
    assert_eq!(table.name(), "test_table_a");
    assert_eq!(table.schema(), Some(db.public_schema()));
    assert_eq!(table.full_name(), "public.test_table_a");
    assert_eq!(table.to_string(), "public.test_table_a");
    assert_eq!(table, db.table("test_table_a"));
    assert_ne!(table, db.schema("other").table("test_table_a"));
    assert_eq!(db.schema("other").table("t").full_name(), "other.t");
}

#[test]
fn test_debug_lists_columns() {
    let db = mock_db("table_debug");
    let table = db.table("t");
    table.add_column("col_a", SqlType::Text, []);
    let rendered = format!("{table:?}");
    assert!(rendered.contains("public.t"));
    assert!(rendered.contains("col_a"));
}

#[test]
fn test_add_columns_binds_and_overwrites_in_place() {
    let db = mock_db("table_columns");
    let table = db.table("t");
    table.add_columns([
        Column::new("col_a", SqlType::Text),
        Column::new("col_b", SqlType::Integer),
    ]);
    assert_eq!(table.column_names(), vec!["col_a", "col_b"]);
    assert_eq!(table.column("col_b").unwrap().sql_type(), &SqlType::Integer);
    assert_eq!(table.column("col_a").unwrap().table(), Some(table.clone()));

    table.add_columns([Column::new("col_a", SqlType::BigInteger)]);
    assert_eq!(table.column_names(), vec!["col_a", "col_b"]);
    assert_eq!(table.column("col_a").unwrap().sql_type(), &SqlType::BigInteger);
}

#[test]
fn test_unknown_column_is_not_found() {
    let db = mock_db("table_lookup");
    let table = db.table("t");
    table.add_column("col_a", SqlType::Text, []);
    assert!(table.has_column("col_a"));
    assert!(!table.has_column("col_nonexisting"));
    let err = table.column("col_nonexisting").unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_create_requires_columns() {
    let db = mock_db("table_create_empty");
    let table = db.table("test_table_a");

    let (result, statements) = db.track_statements(table.create(false)).await;
    assert!(result.unwrap_err().is_schema());
    assert!(statements.is_empty());
}

#[tokio::test]
async fn test_create_preserves_column_order() {
    let db = mock_db("table_create");
    let table = db.table("test_table_a");
    table.add_column("col_a", SqlType::Text, []);
    table.add_columns([Column::new("col_b", SqlType::Integer)]);

    let response = table.create(false).await.unwrap();
    assert_eq!(
        response.sql(),
        Some("CREATE TABLE test_table_a (col_a TEXT, col_b INTEGER);")
    );

    let (result, statements) = db.track_statements(table.prepare()).await;
    result.unwrap();
    assert_eq!(
        statements,
        vec![Statement::new(
            "CREATE TABLE IF NOT EXISTS test_table_a (col_a TEXT, col_b INTEGER);",
            Vec::new()
        )]
    );
}

#[test]
fn test_table_constraints_follow_columns() {
    let db = mock_db("table_constraints");
    let table = db.table("test_table_a");
    let a = table.add_column("col_a", SqlType::Text, []);
    let b = table.add_column("col_b", SqlType::Integer, []);
    table.add_constraints([PRIMARY_KEY.composite([&a, &b])]);
    table.add_constraints([PRIMARY_KEY.composite(["col_a", "col_b"]), UNIQUE.composite([&b])]);
    assert_eq!(table.constraints().len(), 2);

    assert_eq!(
        table.create_sql(false).unwrap(),
        "CREATE TABLE test_table_a (col_a TEXT, col_b INTEGER, PRIMARY KEY (col_a, col_b), UNIQUE (col_b));"
    );
}

#[tokio::test]
async fn test_drop() {
    let db = mock_db("table_drop");
    let table = db.table("test_table_a");
    assert_eq!(
        table.drop(false, false).await.unwrap().sql(),
        Some("DROP TABLE test_table_a;")
    );
    assert_eq!(
        table.drop(true, true).await.unwrap().sql(),
        Some("DROP TABLE IF EXISTS test_table_a CASCADE;")
    );
}

#[test]
fn test_references_bound_column() {
    let db = mock_db("table_references");
    let users = db.table("users");
    let id = users.add_column("id", SqlType::Serial, [PRIMARY_KEY]);

    let orders = db.table("orders");
    let fk = Constraint::references(&id).unwrap();
    let user_id = orders.add_column("user_id", SqlType::Integer, [fk]);
    assert_eq!(user_id.definition(), "user_id INTEGER REFERENCES public.users (id)");
}

#[test]
fn test_count_and_select() {
    let db = mock_db("table_queries");
    let table = db.table("test_table_a");
    assert_eq!(table.count().sql(), "count(public.test_table_a.*)");

    let a = table.add_column("col_a", SqlType::Text, []);
    let select = table.select([&a]).unwrap();
    assert_eq!(select.database(), &db);
    assert_eq!(select.projections().len(), 1);
}

#[test]
fn test_orphaned_table_cannot_execute() {
    let table = {
        let db = mock_db("table_orphan");
        db.table("t")
    };
    assert_eq!(table.full_name(), "t");
    assert!(table.database().unwrap_err().is_configuration());
}
