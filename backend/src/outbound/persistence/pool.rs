//! bb8 pool of `diesel-async` Postgres connections.
//!
//! Every checkout is bounded by [`PoolLimits::checkout_timeout`]; a pool that
//! cannot hand out a connection in time reports [`PoolError::Exhausted`],
//! which the repository turns into a connection failure.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Pool construction or checkout failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The initial idle connections could not be opened.
    #[error("could not open enrollment database pool: {0}")]
    Connect(String),
    /// No connection became free before the checkout timeout.
    #[error("no database connection available: {0}")]
    Exhausted(String),
}

/// Sizing and checkout bound for [`DbPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    pub max_size: u32,
    pub min_idle: u32,
    pub checkout_timeout: Duration,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_idle: 2,
            checkout_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared connection pool. Clones share connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open a pool against `database_url`, eagerly filling `min_idle` slots.
    ///
    /// # Errors
    ///
    /// [`PoolError::Connect`] when the server rejects or cannot be reached
    /// for the initial connections.
    pub async fn connect(database_url: &str, limits: PoolLimits) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let inner = Pool::builder()
            .max_size(limits.max_size)
            .min_idle(Some(limits.min_idle.min(limits.max_size)))
            .connection_timeout(limits.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::Connect(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Borrow a connection until the guard drops.
    ///
    /// # Errors
    ///
    /// [`PoolError::Exhausted`] when the checkout timeout elapses first.
    pub async fn checkout(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::Exhausted(err.to_string()))
    }

    /// Connections currently open, idle or checked out.
    pub fn open_connections(&self) -> u32 {
        self.inner.state().connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_limits_match_documented_values() {
        let limits = PoolLimits::default();

        assert_eq!(limits.max_size, 10);
        assert_eq!(limits.min_idle, 2);
        assert_eq!(limits.checkout_timeout, Duration::from_secs(30));
    }

    #[rstest]
    #[case(PoolError::Connect("bad host".into()), "could not open")]
    #[case(PoolError::Exhausted("timed out".into()), "no database connection")]
    fn pool_errors_say_which_stage_failed(#[case] error: PoolError, #[case] prefix: &str) {
        assert!(error.to_string().starts_with(prefix));
    }
}
