//! Tables: an ordered set of columns plus table-level constraints.
//!
//! A [`Table`] is a cheap, cloneable handle. Tables are created through
//! [`Schema::table`](crate::Schema::table) (or
//! [`Database::table`](crate::Database::table) for the public schema) and are
//! owned by their schema; the table only refers back to it weakly.

use crate::aggregate::Aggregate;
use crate::column::Column;
use crate::constraints::Constraint;
use crate::database::{Database, Response};
use crate::error::{DbError, DbResult};
use crate::schema::{Schema, SchemaInner};
use crate::select::{Projection, Select};
use crate::types::SqlType;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

pub(crate) struct TableInner {
    name: String,
    schema: Weak<SchemaInner>,
    state: RwLock<TableState>,
}

#[derive(Default)]
struct TableState {
    columns: Vec<Column>,
    constraints: Vec<Constraint>,
}

/// Handle to a table definition.
#[derive(Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

impl Table {
    pub(crate) fn new(name: impl Into<String>, schema: Weak<SchemaInner>) -> Self {
        Self {
            inner: Arc::new(TableInner {
                name: name.into(),
                schema,
                state: RwLock::new(TableState::default()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<TableInner>) -> Self {
        Self { inner }
    }

    fn read(&self) -> RwLockReadGuard<'_, TableState> {
        self.inner.state.read().expect("table state poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableState> {
        self.inner.state.write().expect("table state poisoned")
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The owning schema, while it is alive.
    pub fn schema(&self) -> Option<Schema> {
        self.inner.schema.upgrade().map(Schema::from_inner)
    }

    /// The database this table executes against.
    pub fn database(&self) -> DbResult<Database> {
        self.schema()
            .ok_or_else(|| {
                DbError::configuration(format!("Table '{}' is not attached to a schema.", self.name()))
            })?
            .database()
    }

    /// `schema.table`
    pub fn full_name(&self) -> String {
        match self.schema() {
            Some(schema) => format!("{}.{}", schema.name(), self.name()),
            None => self.name().to_string(),
        }
    }

    // ── Columns ──────────────────────────────────────────────────────────────

    /// Bind columns to this table. A column replaces any existing column of
    /// the same name in place; new names are appended.
    pub fn add_columns<I>(&self, columns: I) -> &Self
    where
        I: IntoIterator<Item = Column>,
    {
        let mut state = self.write();
        for mut column in columns {
            column.bind(Arc::downgrade(&self.inner));
            match state.columns.iter_mut().find(|c| c.name() == column.name()) {
                Some(existing) => *existing = column,
                None => state.columns.push(column),
            }
        }
        self
    }

    /// Define and bind a column in one step, returning a copy of it.
    pub fn add_column<I>(&self, name: impl Into<String>, sql_type: SqlType, constraints: I) -> Column
    where
        I: IntoIterator<Item = Constraint>,
    {
        let mut column = Column::new(name, sql_type).constraints(constraints);
        column.bind(Arc::downgrade(&self.inner));
        self.add_columns([column.clone()]);
        column
    }

    /// A copy of the named column.
    pub fn column(&self, name: &str) -> DbResult<Column> {
        self.read()
            .columns
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .ok_or_else(|| {
                DbError::not_found(format!("Column '{name}' not found on '{}'.", self.full_name()))
            })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.read().columns.iter().any(|c| c.name() == name)
    }

    /// Copies of all columns in insertion order.
    pub fn columns(&self) -> Vec<Column> {
        self.read().columns.clone()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.read().columns.iter().map(|c| c.name().to_string()).collect()
    }

    // ── Constraints ──────────────────────────────────────────────────────────

    /// Add table-level constraints. Constraints equal by SQL collapse to one.
    pub fn add_constraints<I>(&self, constraints: I) -> &Self
    where
        I: IntoIterator<Item = Constraint>,
    {
        let mut state = self.write();
        for constraint in constraints {
            if !state.constraints.contains(&constraint) {
                state.constraints.push(constraint);
            }
        }
        self
    }

    pub fn constraints(&self) -> Vec<Constraint> {
        self.read().constraints.clone()
    }

    // ── DDL ──────────────────────────────────────────────────────────────────

    /// `CREATE TABLE [IF NOT EXISTS] name (columns..., constraints...);`
    ///
    /// Fails with [`DbError::Schema`] when the table has no columns.
    pub fn create_sql(&self, if_not_exists: bool) -> DbResult<String> {
        let state = self.read();
        if state.columns.is_empty() {
            return Err(DbError::schema(format!(
                "Table creation failed for '{}': No columns.",
                self.name()
            )));
        }

        let exists = if if_not_exists { "IF NOT EXISTS " } else { "" };
        let body: Vec<String> = state
            .columns
            .iter()
            .map(Column::definition)
            .chain(state.constraints.iter().map(Constraint::sql))
            .collect();
        Ok(format!("CREATE TABLE {exists}{} ({});", self.name(), body.join(", ")))
    }

    /// `DROP TABLE [IF EXISTS] name[ CASCADE];`
    pub fn drop_sql(&self, if_exists: bool, cascade: bool) -> String {
        let exists = if if_exists { "IF EXISTS " } else { "" };
        let cascade = if cascade { " CASCADE" } else { "" };
        format!("DROP TABLE {exists}{}{cascade};", self.name())
    }

    pub async fn create(&self, if_not_exists: bool) -> DbResult<Response> {
        let sql = self.create_sql(if_not_exists)?;
        let db = self.database()?;
        tracing::debug!(target: "pgstone.ddl", table = %self.full_name(), if_not_exists, "create table");
        db.execute(&sql, &[], None).await
    }

    pub async fn drop(&self, if_exists: bool, cascade: bool) -> DbResult<Response> {
        let sql = self.drop_sql(if_exists, cascade);
        let db = self.database()?;
        tracing::debug!(target: "pgstone.ddl", table = %self.full_name(), if_exists, cascade, "drop table");
        db.execute(&sql, &[], None).await
    }

    /// Ensure the table exists: `create(true)`.
    pub async fn prepare(&self) -> DbResult<Response> {
        self.create(true).await
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// `count(schema.table.*)`
    pub fn count(&self) -> Aggregate {
        Aggregate::count(self)
    }

    /// Start a select against this table's database.
    pub fn select<I, P>(&self, items: I) -> DbResult<Select>
    where
        I: IntoIterator<Item = P>,
        P: Into<Projection>,
    {
        let mut select = Select::new(self.database()?);
        select.select(items);
        Ok(select)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.full_name())
            .field("columns", &self.column_names())
            .finish()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.full_name() == other.full_name()
    }
}

impl Eq for Table {}

impl Hash for Table {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.full_name().hash(state);
    }
}

#[cfg(test)]
mod tests;
