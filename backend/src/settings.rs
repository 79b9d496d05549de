//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `INSCRIPTION_*` environment variables, an optional
//! configuration file and command-line flags, in OrthoConfig's usual
//! precedence. Unset values fall back to the defaults exposed by the
//! accessors below.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::middleware::{ApiKey, ApiKeyError};
use crate::outbound::persistence::{DEFAULT_STATEMENT_TIMEOUT, PoolLimits};

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 8000;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `host` is not an IP address.
    #[error("invalid host address {value:?}")]
    InvalidHost { value: String },
    /// No usable API key was configured.
    #[error("INSCRIPTION_API_KEY must be set: {0}")]
    ApiKey(#[from] ApiKeyError),
}

/// Runtime settings for the enrollment service.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "INSCRIPTION")]
pub struct AppSettings {
    /// Address to bind the HTTP listener to.
    pub host: Option<String>,
    /// Port to bind the HTTP listener to.
    pub port: Option<u16>,
    /// PostgreSQL connection URL. Without it enrollments are kept in memory.
    pub database_url: Option<String>,
    /// Shared secret expected in the `Authorization` header.
    pub api_key: Option<String>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// Idle connections kept warm.
    pub pool_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_connection_timeout_secs: Option<u64>,
    /// Per-call storage deadline in milliseconds.
    pub statement_timeout_ms: Option<u64>,
    /// Apply embedded migrations at startup.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl AppSettings {
    /// Socket address for the listener.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let ip = match self.host.as_deref() {
            None => DEFAULT_HOST,
            Some(raw) => raw.parse().map_err(|_| SettingsError::InvalidHost {
                value: raw.to_owned(),
            })?,
        };
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// The configured shared secret.
    pub fn api_key(&self) -> Result<ApiKey, SettingsError> {
        let raw = self.api_key.clone().unwrap_or_default();
        Ok(ApiKey::new(raw)?)
    }

    /// Connection URL when persistence is configured.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    /// Pool sizing, with unset fields taken from [`PoolLimits::default`].
    pub fn pool_limits(&self) -> PoolLimits {
        let defaults = PoolLimits::default();
        PoolLimits {
            max_size: self.pool_max_size.unwrap_or(defaults.max_size),
            min_idle: self.pool_min_idle.unwrap_or(defaults.min_idle),
            checkout_timeout: self
                .pool_connection_timeout_secs
                .map_or(defaults.checkout_timeout, Duration::from_secs),
        }
    }

    pub fn statement_timeout(&self) -> Duration {
        self.statement_timeout_ms
            .map_or(DEFAULT_STATEMENT_TIMEOUT, Duration::from_millis)
    }
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("pool_max_size", &self.pool_max_size)
            .field("pool_min_idle", &self.pool_min_idle)
            .field(
                "pool_connection_timeout_secs",
                &self.pool_connection_timeout_secs,
            )
            .field("statement_timeout_ms", &self.statement_timeout_ms)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}
