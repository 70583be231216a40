//! Task-local statement tracking for databases with execution disabled.
//!
//! Each active scope maps a database id to the log collecting that database's
//! statements. Entering a scope copies the enclosing map and installs a fresh
//! log for one database, so nested scopes shadow the outer log and the outer
//! one is back in place when the inner scope ends (including on panic or
//! cancellation, since the task-local guard handles restoration).

use crate::statement::Statement;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

tokio::task_local! {
    static SCOPES: HashMap<u64, StatementLog>;
}

#[derive(Clone, Default)]
struct StatementLog(Arc<Mutex<Vec<Statement>>>);

impl StatementLog {
    fn push(&self, statement: Statement) {
        self.0.lock().expect("statement log poisoned").push(statement);
    }

    fn snapshot(&self) -> Vec<Statement> {
        self.0.lock().expect("statement log poisoned").clone()
    }

    fn take(&self) -> Vec<Statement> {
        std::mem::take(&mut *self.0.lock().expect("statement log poisoned"))
    }
}

fn scopes_with(database: u64, log: StatementLog) -> HashMap<u64, StatementLog> {
    let mut scopes = SCOPES.try_with(Clone::clone).unwrap_or_default();
    scopes.insert(database, log);
    scopes
}

pub(crate) async fn track<F>(database: u64, future: F) -> (F::Output, Vec<Statement>)
where
    F: Future,
{
    let log = StatementLog::default();
    let output = SCOPES.scope(scopes_with(database, log.clone()), future).await;
    (output, log.take())
}

pub(crate) fn track_sync<R>(database: u64, f: impl FnOnce() -> R) -> (R, Vec<Statement>) {
    let log = StatementLog::default();
    let output = SCOPES.sync_scope(scopes_with(database, log.clone()), f);
    (output, log.take())
}

/// Append to the innermost scope for `database`. Without one, nothing happens.
pub(crate) fn record(database: u64, statement: &Statement) {
    let _ = SCOPES.try_with(|scopes| {
        if let Some(log) = scopes.get(&database) {
            log.push(statement.clone());
        }
    });
}

pub(crate) fn current(database: u64) -> Option<Vec<Statement>> {
    SCOPES
        .try_with(|scopes| scopes.get(&database).map(StatementLog::snapshot))
        .ok()
        .flatten()
}
