//! The statement execution boundary.
//!
//! [`Database::execute`](crate::Database::execute) hands statements to an
//! [`Executor`] when execution is enabled. Implementations are provided for a
//! plain `tokio_postgres::Client` and, with the `pool` feature, for a
//! `deadpool_postgres::Pool`. Anything else (a recording fake in tests, a
//! transaction wrapper) can be plugged in with
//! [`Database::set_executor`](crate::Database::set_executor).

use crate::error::{DbError, DbResult};
use crate::value::Value;
use std::future::Future;
#[cfg(feature = "pool")]
use std::time::Instant;
use std::time::Duration;
use tokio_postgres::types::ToSql;

/// Runs a statement and reports the number of affected rows.
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    /// Execute `sql` with positional `args`, giving up after `timeout`.
    async fn execute(&self, sql: &str, args: &[Value], timeout: Option<Duration>) -> DbResult<u64>;

    /// Release held connections. Called when the database replaces or closes
    /// its executor.
    fn close(&self) {}
}

fn params(args: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    args.iter().map(|arg| arg as &(dyn ToSql + Sync)).collect()
}

/// Await `future`, failing with [`DbError::Timeout`] once `timeout` elapses.
///
/// When a cancel token is supplied the server-side query is cancelled too.
async fn with_timeout<T, F>(
    timeout: Option<Duration>,
    cancel_token: Option<tokio_postgres::CancelToken>,
    future: F,
) -> DbResult<T>
where
    F: Future<Output = DbResult<T>> + Send,
{
    match timeout {
        Some(timeout) => {
            tokio::pin!(future);
            tokio::select! {
                result = &mut future => result,
                _ = tokio::time::sleep(timeout) => {
                    if let Some(cancel_token) = cancel_token {
                        tokio::spawn(async move {
                            let _ = cancel_token.cancel_query(tokio_postgres::NoTls).await;
                        });
                    }
                    Err(DbError::Timeout(timeout))
                }
            }
        }
        None => future.await,
    }
}

/// What is left of `timeout` since `started`, failing once nothing is.
#[cfg(feature = "pool")]
fn remaining(timeout: Option<Duration>, started: Instant) -> DbResult<Option<Duration>> {
    match timeout {
        Some(timeout) => match timeout.checked_sub(started.elapsed()) {
            Some(left) if !left.is_zero() => Ok(Some(left)),
            _ => Err(DbError::Timeout(timeout)),
        },
        None => Ok(None),
    }
}

#[async_trait::async_trait]
impl Executor for tokio_postgres::Client {
    async fn execute(&self, sql: &str, args: &[Value], timeout: Option<Duration>) -> DbResult<u64> {
        let params = params(args);
        let cancel_token = timeout.map(|_| self.cancel_token());
        with_timeout(timeout, cancel_token, async {
            tokio_postgres::Client::execute(self, sql, &params)
                .await
                .map_err(DbError::from)
        })
        .await
    }
}

#[cfg(feature = "pool")]
#[async_trait::async_trait]
impl Executor for deadpool_postgres::Pool {
    async fn execute(&self, sql: &str, args: &[Value], timeout: Option<Duration>) -> DbResult<u64> {
        let started = Instant::now();
        let client = with_timeout(timeout, None, async { self.get().await.map_err(DbError::from) }).await?;
        let client: &tokio_postgres::Client = &client;
        Executor::execute(client, sql, args, remaining(timeout, started)?).await
    }

    fn close(&self) {
        deadpool_postgres::Pool::close(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_elapses() {
        let err = with_timeout::<u64, _>(Some(Duration::from_millis(10)), None, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(1)
        })
        .await
        .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_fast_future_wins() {
        let rows = with_timeout(Some(Duration::from_secs(5)), None, async { Ok(3u64) })
            .await
            .unwrap();
        assert_eq!(rows, 3);
        assert_eq!(with_timeout(None, None, async { Ok(7u64) }).await.unwrap(), 7);
    }

    #[test]
    fn test_params_keep_argument_order() {
        let args = vec![Value::from("a"), Value::from(2)];
        assert_eq!(params(&args).len(), 2);
    }

    #[cfg(feature = "pool")]
    #[test]
    fn test_remaining_shares_one_deadline() {
        let started = Instant::now();
        assert_eq!(remaining(None, started).unwrap(), None);

        let left = remaining(Some(Duration::from_secs(60)), started).unwrap().unwrap();
        assert!(left <= Duration::from_secs(60));

        std::thread::sleep(Duration::from_millis(20));
        let err = remaining(Some(Duration::from_millis(5)), started).unwrap_err();
        assert!(err.is_timeout());
        let left = remaining(Some(Duration::from_secs(60)), started).unwrap().unwrap();
        assert!(left <= Duration::from_secs(60) - Duration::from_millis(20));
    }
}
