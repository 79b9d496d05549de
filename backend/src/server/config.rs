//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use enrollments::middleware::ApiKey;
use enrollments::outbound::persistence::{DEFAULT_STATEMENT_TIMEOUT, DbPool};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) api_key: ApiKey,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) statement_timeout: Duration,
}

impl ServerConfig {
    /// Construct a server configuration guarded by `api_key`.
    #[must_use]
    pub fn new(api_key: ApiKey, bind_addr: SocketAddr) -> Self {
        Self {
            api_key,
            bind_addr,
            db_pool: None,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
        }
    }

    /// Attach a database connection pool for the enrollment repository.
    ///
    /// Without one enrollments are kept in memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Override the per-call storage deadline.
    #[must_use]
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }
}
