use super::{ConnectOptions, Database};
use crate::error::{DbError, DbResult};
use std::collections::HashMap;

/// Name of the database every registry starts with.
pub const DEFAULT_DATABASE: &str = "__default__";

/// Databases by name, deduplicated: asking twice for a name yields the same
/// instance.
///
/// A registry starts out holding a single database under
/// [`DEFAULT_DATABASE`]. While that is still the only entry,
/// [`connect`](Self::connect) adopts it under the new name instead of creating
/// a second instance, so code holding the default keeps working against the
/// connected database.
#[derive(Debug)]
pub struct Registry {
    databases: HashMap<String, Database>,
}

impl Registry {
    pub fn new() -> Self {
        let mut databases = HashMap::new();
        databases.insert(DEFAULT_DATABASE.to_string(), Database::new(DEFAULT_DATABASE));
        Self { databases }
    }

    /// The database registered under [`DEFAULT_DATABASE`].
    pub fn default_database(&self) -> DbResult<Database> {
        self.databases
            .get(DEFAULT_DATABASE)
            .cloned()
            .ok_or_else(|| DbError::configuration("No default database is set."))
    }

    pub fn get(&self, name: &str) -> DbResult<Database> {
        self.databases
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::not_found(format!("Database '{name}' is not registered.")))
    }

    /// The database registered under `name`, creating it if needed.
    pub fn get_or_create(&mut self, name: &str) -> Database {
        self.databases
            .entry(name.to_string())
            .or_insert_with(|| Database::new(name))
            .clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.databases.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.databases.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn remove(&mut self, name: &str) -> Option<Database> {
        self.databases.remove(name)
    }

    /// Move the entry at `old` to `new` and rename the database itself.
    pub fn rename(&mut self, old: &str, new: &str) -> DbResult<Database> {
        let database = self
            .databases
            .remove(old)
            .ok_or_else(|| DbError::not_found(format!("Database '{old}' is not registered.")))?;
        database.set_name(new);
        self.databases.insert(new.to_string(), database.clone());
        Ok(database)
    }

    /// Configure the connection for `name` and return its database.
    ///
    /// If the default database is the only entry, it is registered under
    /// `name` as well (keeping its default entry) and renamed. Otherwise the
    /// database for `name` is looked up or created.
    pub fn connect(&mut self, name: &str, options: &ConnectOptions) -> Database {
        let database = match self.databases.get(DEFAULT_DATABASE) {
            Some(default) if self.databases.len() == 1 => {
                let default = default.clone();
                self.databases.insert(name.to_string(), default.clone());
                default
            }
            _ => self.get_or_create(name),
        };
        database.configure(name, options);
        tracing::info!(
            target: "pgstone.sql",
            database = %name,
            host = %options.host,
            port = options.port,
            user = %options.user,
            "database connection configured"
        );
        database
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
