//! Databases, the name registry, and statement execution.
//!
//! A [`Database`] owns its schemas and decides what happens to a rendered
//! statement: with execution enabled it goes to the configured [`Executor`];
//! with execution disabled it is returned unexecuted as a [`Response`] and
//! appended to the active tracking scope, if any.
//!
//! # Example
//! ```ignore
//! use pgstone::{Registry, ConnectOptions};
//!
//! let mut registry = Registry::new();
//! let db = registry.connect("app", &ConnectOptions::new("app", "secret"));
//! db.disable_execution();
//!
//! let (result, statements) = db.track_statements(db.prepare()).await;
//! result?;
//! for statement in statements {
//!     println!("{statement}");
//! }
//! ```

mod config;
mod registry;
mod tracking;

pub use config::ConnectOptions;
pub use registry::{DEFAULT_DATABASE, Registry};

use crate::error::{DbError, DbResult};
use crate::executor::Executor;
use crate::schema::Schema;
use crate::select::{Projection, Select};
use crate::statement::{MAX_LOGGED_SQL_BYTES, Statement, StatementKind, truncate_sql_bytes};
use crate::table::Table;
use crate::value::Value;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

static NEXT_DATABASE_ID: AtomicU64 = AtomicU64::new(1);

/// Outcome of [`Database::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Rows affected by an executed statement.
    Executed(u64),
    /// Execution is disabled; the statement that would have run.
    Unexecuted(Statement),
}

impl Response {
    pub fn statement(&self) -> Option<&Statement> {
        match self {
            Response::Unexecuted(statement) => Some(statement),
            Response::Executed(_) => None,
        }
    }

    pub fn sql(&self) -> Option<&str> {
        self.statement().map(|s| s.sql.as_str())
    }

    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            Response::Executed(rows) => Some(*rows),
            Response::Unexecuted(_) => None,
        }
    }
}

pub(crate) struct DatabaseInner {
    id: u64,
    mock: AtomicBool,
    state: RwLock<DatabaseState>,
    executor: RwLock<Option<Arc<dyn Executor>>>,
}

struct DatabaseState {
    name: String,
    user: Option<String>,
    url: Option<String>,
    pool_max_size: usize,
    query_timeout: Option<Duration>,
    schemas: Vec<Schema>,
    prepared: bool,
}

/// Handle to a database. Clones share the same underlying instance.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// A standalone database, not registered anywhere.
    ///
    /// Most code gets databases from a [`Registry`] instead.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(DatabaseInner {
                id: NEXT_DATABASE_ID.fetch_add(1, Ordering::Relaxed),
                mock: AtomicBool::new(false),
                state: RwLock::new(DatabaseState {
                    name: name.into(),
                    user: None,
                    url: None,
                    pool_max_size: 16,
                    query_timeout: None,
                    schemas: Vec::new(),
                    prepared: false,
                }),
                executor: RwLock::new(None),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<DatabaseInner>) -> Self {
        Self { inner }
    }

    fn read(&self) -> RwLockReadGuard<'_, DatabaseState> {
        self.inner.state.read().expect("database state poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, DatabaseState> {
        self.inner.state.write().expect("database state poisoned")
    }

    pub fn name(&self) -> String {
        self.read().name.clone()
    }

    pub fn user(&self) -> Option<String> {
        self.read().user.clone()
    }

    pub fn url(&self) -> Option<String> {
        self.read().url.clone()
    }

    pub(crate) fn set_name(&self, name: impl Into<String>) {
        self.write().name = name.into();
    }

    /// Apply connection settings under `name`.
    pub(crate) fn configure(&self, name: &str, options: &ConnectOptions) {
        let mut state = self.write();
        state.name = name.to_string();
        state.user = Some(options.user.clone());
        state.url = Some(options.url(name));
        state.pool_max_size = options.pool_max_size;
        state.query_timeout = options.query_timeout;
    }

    pub fn ptr_eq(&self, other: &Database) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ── Schemas & tables ─────────────────────────────────────────────────────

    /// Get or create the named schema.
    pub fn schema(&self, name: &str) -> Schema {
        let mut state = self.write();
        if let Some(schema) = state.schemas.iter().find(|s| s.name() == name) {
            return schema.clone();
        }
        let schema = Schema::new(name, Arc::downgrade(&self.inner));
        state.schemas.push(schema.clone());
        schema
    }

    /// The `public` schema.
    pub fn public_schema(&self) -> Schema {
        self.schema("public")
    }

    /// Get or create a table in the `public` schema.
    pub fn table(&self, name: &str) -> Table {
        self.public_schema().table(name)
    }

    pub fn schemas(&self) -> Vec<Schema> {
        self.read().schemas.clone()
    }

    /// Drop every schema named `name` other than `keep`.
    pub(crate) fn forget_schema(&self, name: &str, keep: &Schema) {
        self.write()
            .schemas
            .retain(|s| s.ptr_eq(keep) || s.name() != name);
    }

    /// Start a select on this database.
    pub fn select<I, P>(&self, items: I) -> Select
    where
        I: IntoIterator<Item = P>,
        P: Into<Projection>,
    {
        let mut select = Select::new(self.clone());
        select.select(items);
        select
    }

    /// Create every schema (and its tables) if missing.
    pub async fn prepare(&self) -> DbResult<()> {
        for schema in self.schemas() {
            schema.prepare().await?;
        }
        self.write().prepared = true;
        Ok(())
    }

    pub fn is_prepared(&self) -> bool {
        self.read().prepared
    }

    // ── Execution ────────────────────────────────────────────────────────────

    /// Return statements unexecuted instead of sending them to the executor.
    pub fn disable_execution(&self) {
        self.inner.mock.store(true, Ordering::SeqCst);
    }

    pub fn enable_execution(&self) {
        self.inner.mock.store(false, Ordering::SeqCst);
    }

    pub fn is_execution_enabled(&self) -> bool {
        !self.inner.mock.load(Ordering::SeqCst)
    }

    /// Use `executor` for statements, replacing (and closing) any previous one.
    pub fn set_executor(&self, executor: impl Executor + 'static) {
        self.replace_executor(Arc::new(executor));
    }

    fn replace_executor(&self, executor: Arc<dyn Executor>) {
        let previous = self
            .inner
            .executor
            .write()
            .expect("executor slot poisoned")
            .replace(executor);
        if let Some(previous) = previous {
            previous.close();
        }
    }

    /// Build a connection pool from the configured URL and use it as executor.
    ///
    /// Fails with [`DbError::Configuration`] when no connection was configured.
    #[cfg(feature = "pool")]
    pub fn create_pool(&self) -> DbResult<Arc<dyn Executor>> {
        let (url, max_size) = {
            let state = self.read();
            (state.url.clone(), state.pool_max_size)
        };
        let url = url.ok_or_else(|| {
            DbError::configuration("Please define a connection with Registry::connect.")
        })?;
        let pool = crate::pool::create_pool_with_config(&url, max_size)?;
        let executor: Arc<dyn Executor> = Arc::new(pool);
        self.replace_executor(executor.clone());
        tracing::info!(target: "pgstone.sql", database = %self.name(), max_size, "connection pool created");
        Ok(executor)
    }

    /// Close and forget the current executor.
    pub fn close(&self) {
        let previous = self.inner.executor.write().expect("executor slot poisoned").take();
        if let Some(previous) = previous {
            previous.close();
        }
    }

    fn executor(&self) -> DbResult<Arc<dyn Executor>> {
        let current = self.inner.executor.read().expect("executor slot poisoned").clone();
        match current {
            Some(executor) => Ok(executor),
            None => self.connect_executor(),
        }
    }

    #[cfg(feature = "pool")]
    fn connect_executor(&self) -> DbResult<Arc<dyn Executor>> {
        self.create_pool()
    }

    #[cfg(not(feature = "pool"))]
    fn connect_executor(&self) -> DbResult<Arc<dyn Executor>> {
        Err(DbError::configuration(
            "No executor configured; call Database::set_executor.",
        ))
    }

    /// Execute a statement with positional arguments.
    ///
    /// With execution disabled, the statement is recorded in the active
    /// tracking scope and returned as [`Response::Unexecuted`]. Otherwise it
    /// runs on the executor (creating a pool on first use), bounded by
    /// `timeout` or the configured query timeout.
    pub async fn execute(
        &self,
        sql: &str,
        args: &[Value],
        timeout: Option<Duration>,
    ) -> DbResult<Response> {
        let kind = StatementKind::from_sql(sql);
        let logged_sql = truncate_sql_bytes(sql, MAX_LOGGED_SQL_BYTES);

        if !self.is_execution_enabled() {
            tracing::debug!(
                target: "pgstone.sql",
                database = %self.name(),
                kind = %kind,
                params = args.len(),
                sql = %logged_sql,
                "execution disabled, statement not sent"
            );
            let statement = Statement::new(sql, args.to_vec());
            tracking::record(self.inner.id, &statement);
            return Ok(Response::Unexecuted(statement));
        }

        let executor = self.executor()?;
        let timeout = timeout.or(self.read().query_timeout);
        let started = Instant::now();
        let result = executor.execute(sql, args, timeout).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(rows) => tracing::debug!(
                target: "pgstone.sql",
                database = %self.name(),
                kind = %kind,
                params = args.len(),
                rows,
                elapsed_ms,
                sql = %logged_sql,
                "statement executed"
            ),
            Err(err) => tracing::warn!(
                target: "pgstone.sql",
                database = %self.name(),
                kind = %kind,
                params = args.len(),
                elapsed_ms,
                error = %err,
                sql = %logged_sql,
                "statement failed"
            ),
        }

        result.map(Response::Executed)
    }

    // ── Statement tracking ───────────────────────────────────────────────────

    /// Run `future` inside a fresh tracking scope for this database and
    /// return its output with the statements recorded meanwhile.
    ///
    /// Scopes nest: an inner scope collects its own statements and the outer
    /// scope resumes collecting once it ends.
    pub async fn track_statements<F>(&self, future: F) -> (F::Output, Vec<Statement>)
    where
        F: Future,
    {
        tracking::track(self.inner.id, future).await
    }

    /// Synchronous variant of [`track_statements`](Self::track_statements).
    pub fn track_statements_sync<R>(&self, f: impl FnOnce() -> R) -> (R, Vec<Statement>) {
        tracking::track_sync(self.inner.id, f)
    }

    /// Statements recorded so far in the innermost active scope, or `None`
    /// outside any scope.
    pub fn tracked_statements(&self) -> Option<Vec<Statement>> {
        tracking::current(self.inner.id)
    }
}

/// The connection URL when connected, the name otherwise.
impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.write_str(state.url.as_deref().unwrap_or(&state.name))
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Database")
            .field("name", &state.name)
            .field("user", &state.user)
            .field("execution_enabled", &self.is_execution_enabled())
            .finish()
    }
}

impl PartialEq for Database {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Database {}
