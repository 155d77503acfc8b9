//! HTTP server configuration object and helpers.

use std::time::Duration;

use intake_backend::outbound::persistence::PoolConfig;

use super::IntakeSettings;

/// Database wiring derived from settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub(crate) pool: PoolConfig,
    pub(crate) database_name: Option<String>,
    pub(crate) run_migrations: bool,
}

/// Configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) database: Option<DatabaseConfig>,
}

impl ServerConfig {
    /// Construct a server configuration bound to `host:port` with the
    /// in-memory store.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            database: None,
        }
    }

    /// Derive the server configuration from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &IntakeSettings) -> Self {
        let config = Self::new(settings.host(), settings.port());
        match settings.database_url() {
            Some(url) => config.with_database(DatabaseConfig {
                pool: PoolConfig::new(url)
                    .with_max_size(settings.pool_max_size())
                    .with_connection_timeout(Duration::from_secs(settings.pool_timeout_secs())),
                database_name: settings.database_name.clone(),
                run_migrations: settings.run_migrations,
            }),
            None => config,
        }
    }

    /// Attach a PostgreSQL store.
    #[must_use]
    pub fn with_database(mut self, database: DatabaseConfig) -> Self {
        self.database = Some(database);
        self
    }
}
