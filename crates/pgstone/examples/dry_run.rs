//! Print the statements a schema would run, without a database.
//!
//! Run with: cargo run --example dry_run -p pgstone

use pgstone::{Column, Comparable, DbError, NOT_NULL, PRIMARY_KEY, Registry, SqlType};

#[tokio::main]
async fn main() -> Result<(), DbError> {
    let registry = Registry::new();
    let db = registry.default_database()?;
    db.disable_execution();

    let users = db.table("users");
    users.add_columns([
        Column::new("id", SqlType::BigSerial).constraint(PRIMARY_KEY),
        Column::new("username", SqlType::Text).constraint(NOT_NULL),
        Column::new("created_at", SqlType::TimestampTz(None)),
    ]);

    let (result, statements) = db.track_statements(db.prepare()).await;
    result?;
    for statement in &statements {
        println!("{statement}");
    }

    let username = users.column("username")?;
    let mut query = users.select([&username])?;
    query.filter(username.ilike("a%")).distinct();
    println!("{query}");

    Ok(())
}
