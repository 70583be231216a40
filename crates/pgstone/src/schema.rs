//! Schemas: named groups of tables inside a database.

use crate::database::{Database, DatabaseInner, Response};
use crate::error::{DbError, DbResult};
use crate::table::Table;
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

pub(crate) struct SchemaInner {
    database: Weak<DatabaseInner>,
    state: RwLock<SchemaState>,
}

struct SchemaState {
    name: String,
    tables: Vec<Table>,
    exists: Option<bool>,
}

/// Handle to a schema.
///
/// Two handles with the same name obtained from the same database refer to
/// the same schema.
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

impl Schema {
    pub(crate) fn new(name: impl Into<String>, database: Weak<DatabaseInner>) -> Self {
        Self {
            inner: Arc::new(SchemaInner {
                database,
                state: RwLock::new(SchemaState {
                    name: name.into(),
                    tables: Vec::new(),
                    exists: None,
                }),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<SchemaInner>) -> Self {
        Self { inner }
    }

    fn read(&self) -> RwLockReadGuard<'_, SchemaState> {
        self.inner.state.read().expect("schema state poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, SchemaState> {
        self.inner.state.write().expect("schema state poisoned")
    }

    pub fn name(&self) -> String {
        self.read().name.clone()
    }

    /// `Some(true)` after [`create`](Self::create), `Some(false)` after
    /// [`drop`](Self::drop), `None` before either.
    pub fn exists(&self) -> Option<bool> {
        self.read().exists
    }

    pub fn database(&self) -> DbResult<Database> {
        self.inner
            .database
            .upgrade()
            .map(Database::from_inner)
            .ok_or_else(|| {
                DbError::configuration(format!(
                    "Schema '{}' is not attached to a database.",
                    self.name()
                ))
            })
    }

    /// Get or create the named table in this schema.
    pub fn table(&self, name: &str) -> Table {
        let mut state = self.write();
        if let Some(table) = state.tables.iter().find(|t| t.name() == name) {
            return table.clone();
        }
        let table = Table::new(name, Arc::downgrade(&self.inner));
        state.tables.push(table.clone());
        table
    }

    /// Look up an existing table.
    pub fn get_table(&self, name: &str) -> DbResult<Table> {
        let state = self.read();
        state
            .tables
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| {
                DbError::not_found(format!(
                    "Table '{name}' not found in schema '{}'.",
                    state.name
                ))
            })
    }

    pub fn tables(&self) -> Vec<Table> {
        self.read().tables.clone()
    }

    // ── DDL ──────────────────────────────────────────────────────────────────

    /// `CREATE SCHEMA [IF NOT EXISTS] name;`
    pub fn create_sql(&self, if_not_exists: bool) -> String {
        let exists = if if_not_exists { "IF NOT EXISTS " } else { "" };
        format!("CREATE SCHEMA {exists}{};", self.name())
    }

    /// `DROP SCHEMA [IF EXISTS] name[ CASCADE];`
    pub fn drop_sql(&self, if_exists: bool, cascade: bool) -> String {
        let exists = if if_exists { "IF EXISTS " } else { "" };
        let cascade = if cascade { " CASCADE" } else { "" };
        format!("DROP SCHEMA {exists}{}{cascade};", self.name())
    }

    /// `ALTER SCHEMA old RENAME TO $1;`, the new name being the sole argument.
    pub fn rename_sql(&self) -> String {
        format!("ALTER SCHEMA {} RENAME TO $1;", self.name())
    }

    pub async fn create(&self, if_not_exists: bool) -> DbResult<Response> {
        let db = self.database()?;
        let sql = self.create_sql(if_not_exists);
        tracing::debug!(target: "pgstone.ddl", schema = %self.name(), if_not_exists, "create schema");
        let response = db.execute(&sql, &[], None).await?;
        self.write().exists = Some(true);
        Ok(response)
    }

    pub async fn drop(&self, if_exists: bool, cascade: bool) -> DbResult<Response> {
        let db = self.database()?;
        let sql = self.drop_sql(if_exists, cascade);
        tracing::debug!(target: "pgstone.ddl", schema = %self.name(), if_exists, cascade, "drop schema");
        let response = db.execute(&sql, &[], None).await?;
        self.write().exists = Some(false);
        Ok(response)
    }

    /// Rename the schema on the database, then re-key it locally.
    ///
    /// A different schema already registered under `new_name` is replaced.
    pub async fn rename(&self, new_name: impl Into<String>) -> DbResult<Response> {
        let new_name = new_name.into();
        let db = self.database()?;
        let sql = self.rename_sql();
        tracing::debug!(target: "pgstone.ddl", schema = %self.name(), new_name = %new_name, "rename schema");
        let response = db.execute(&sql, &[Value::Text(new_name.clone())], None).await?;
        db.forget_schema(&new_name, self);
        self.write().name = new_name;
        Ok(response)
    }

    /// Create the schema if missing, then prepare every table in it.
    pub async fn prepare(&self) -> DbResult<()> {
        self.create(true).await?;
        for table in self.tables() {
            table.prepare().await?;
        }
        Ok(())
    }

    pub(crate) fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let database = self
            .inner
            .database
            .upgrade()
            .map(|db| Database::from_inner(db).name());
        f.debug_struct("Schema")
            .field("name", &self.name())
            .field("database", &database)
            .finish()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Schema {}
