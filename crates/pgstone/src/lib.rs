//! # pgstone
//!
//! Build PostgreSQL schemas and statements from typed Rust values.
//!
//! ## Features
//!
//! - **Typed schema objects**: databases own schemas, schemas own tables,
//!   tables own columns; every object renders its own DDL
//! - **Condition algebra**: comparisons on columns, aggregates and values,
//!   combined with `&` / `|` and always safely parenthesized
//! - **Derived SELECTs**: the FROM clause follows from what is selected
//! - **Dry runs**: disable execution to get statements back instead of
//!   running them, and collect them in task-local tracking scopes
//! - **Pluggable execution**: anything implementing [`Executor`] can run
//!   statements; a `deadpool-postgres` pool is built from the connection URL
//!   by default
//!
//! ## Example
//!
//! ```ignore
//! use pgstone::{Column, Comparable, ConnectOptions, Registry, SqlType, NOT_NULL, PRIMARY_KEY};
//!
//! let mut registry = Registry::new();
//! let db = registry.connect("shop", &ConnectOptions::new("shop", "secret"));
//!
//! let items = db.table("items");
//! items.add_columns([
//!     Column::new("id", SqlType::Serial).constraint(PRIMARY_KEY),
//!     Column::new("name", SqlType::Text).constraint(NOT_NULL),
//!     Column::new("price", SqlType::numeric(10, 2)),
//! ]);
//! db.prepare().await?;
//!
//! let price = items.column("price")?;
//! let mut query = items.select([items.column("name")?])?;
//! query.filter(price.between(10, 20));
//! query.execute().await?;
//! ```

pub mod aggregate;
pub mod column;
pub mod condition;
pub mod constraints;
pub mod database;
pub mod error;
pub mod executor;
pub mod schema;
pub mod select;
pub mod statement;
pub mod table;
pub mod types;
pub mod value;

pub use aggregate::{Aggregate, AggregateFunction, AggregateTarget};
pub use column::{Column, SortDirection};
pub use condition::{Comparable, Condition};
pub use constraints::{ColumnName, Constraint, NOT_NULL, PRIMARY_KEY, UNIQUE};
pub use database::{ConnectOptions, DEFAULT_DATABASE, Database, Registry, Response};
pub use error::{DbError, DbResult};
pub use executor::Executor;
pub use schema::Schema;
pub use select::{Distinct, Projection, Select, Where};
pub use statement::{Statement, StatementKind};
pub use table::Table;
pub use types::{NativeKind, NativeValue, Precision, SpecialValue, SqlType};
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
