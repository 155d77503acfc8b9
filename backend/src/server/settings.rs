//! Process settings loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_TIMEOUT_SECS: u64 = 30;

/// Configuration values for the intake server.
///
/// Every field can be set from the command line, an `INTAKE_*` environment
/// variable or a configuration file.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "INTAKE")]
pub struct IntakeSettings {
    /// PostgreSQL connection URL. When absent the in-memory store is used.
    pub database_url: Option<String>,
    /// Database name reported by the listing; defaults to the URL path.
    pub database_name: Option<String>,
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Maximum pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub pool_timeout_secs: Option<u64>,
    /// Apply embedded migrations at startup.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl IntakeSettings {
    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Return the configured host, falling back to all interfaces.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Return the configured port, falling back to 8080.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Return the pool size, falling back to the default.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Return the pool checkout timeout in seconds.
    pub fn pool_timeout_secs(&self) -> u64 {
        self.pool_timeout_secs.unwrap_or(DEFAULT_POOL_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for intake settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "INTAKE_DATABASE_URL",
        "INTAKE_DATABASE_NAME",
        "INTAKE_HOST",
        "INTAKE_PORT",
        "INTAKE_POOL_MAX_SIZE",
        "INTAKE_POOL_TIMEOUT_SECS",
        "INTAKE_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> IntakeSettings {
        IntakeSettings::load_from_iter([OsString::from("intake-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert!(settings.database_url().is_none());
        assert!(settings.database_name.is_none());
        assert_eq!(settings.host(), DEFAULT_HOST);
        assert_eq!(settings.port(), DEFAULT_PORT);
        assert_eq!(settings.pool_max_size(), DEFAULT_POOL_MAX_SIZE);
        assert_eq!(settings.pool_timeout_secs(), DEFAULT_POOL_TIMEOUT_SECS);
        assert!(settings.run_migrations);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "INTAKE_DATABASE_URL",
                Some("postgres://intake@db/club".to_owned()),
            ),
            ("INTAKE_DATABASE_NAME", Some("membership".to_owned())),
            ("INTAKE_HOST", Some("127.0.0.1".to_owned())),
            ("INTAKE_PORT", Some("9090".to_owned())),
            ("INTAKE_POOL_MAX_SIZE", Some("4".to_owned())),
            ("INTAKE_POOL_TIMEOUT_SECS", Some("5".to_owned())),
            ("INTAKE_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.database_url(), Some("postgres://intake@db/club"));
        assert_eq!(settings.database_name.as_deref(), Some("membership"));
        assert_eq!(settings.host(), "127.0.0.1");
        assert_eq!(settings.port(), 9090);
        assert_eq!(settings.pool_max_size(), 4);
        assert_eq!(settings.pool_timeout_secs(), 5);
        assert!(!settings.run_migrations);
    }

    #[rstest]
    fn blank_database_url_selects_memory_store() {
        let mut guard_vars = VARS.map(|name| (name, None::<String>));
        guard_vars[0].1 = Some("   ".to_owned());
        let _guard = lock_env(guard_vars);

        let settings = load_from_empty_args();
        assert!(settings.database_url().is_none());
    }
}
