//! For reading application configuration.
//!
//! Values are layered: built-in defaults, then an optional `config.toml`,
//! then environment variables such as `APP__SERVER__PORT=3000`.

use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Which item store to use.
    pub storage: StorageConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Server address.
    pub address: String,
    /// Server http port.
    pub port: u16,
    /// How long a request may take before it is aborted.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// The address to bind to, as `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// Storage configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct StorageConfig {
    /// The storage backend.
    pub kind: StorageKind,
}

/// The available storage backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// PostgreSQL, see [`DatabaseConfig`].
    Postgres,
    /// A process-local store that forgets everything on restart.
    Memory,
}

/// Database configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    /// The database username.
    pub username: String,
    /// The database password.
    pub password: String,
    /// The database port.
    pub port: u16,
    /// The database name.
    pub database_name: String,
    /// The database host.
    pub host: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

/// Logging configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    /// An [`EnvFilter`](tracing_subscriber::EnvFilter) directive. `RUST_LOG` takes precedence.
    pub filter: String,
    /// Log to stdout as JSON instead of human-readable lines.
    pub json: bool,
    /// If set, also write hourly rolling JSON logs to this directory.
    pub directory: Option<String>,
}

/// Retrieve [`Config`] from defaults, the configuration file and the environment.
#[tracing::instrument]
pub fn load_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .set_default("server.address", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.request_timeout", "10s")?
        .set_default("storage.kind", "postgres")?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "postgres")?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432)?
        .set_default("database.database_name", "inventory")?
        .set_default("database.max_connections", 20)?
        .set_default(
            "logging.filter",
            "info,tower_http=debug,inventory_service=debug",
        )?
        .set_default("logging.json", false)?
        .add_source(config::File::with_name("config").required(false))
        .add_source(
            config::Environment::with_prefix("app")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = load_config().unwrap();
        assert!(!config.server.address.is_empty());
        assert!(config.server.request_timeout > Duration::ZERO);
        assert!(config.database.max_connections > 0);
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let server = ServerConfig {
            address: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout: Duration::from_secs(1),
        };
        assert_eq!("0.0.0.0:3000", server.bind_address());
    }

    #[test]
    fn storage_kind_is_lowercase() {
        let kind: StorageKind = serde_json::from_str(r#""memory""#).unwrap();
        assert_eq!(StorageKind::Memory, kind);
        assert!(serde_json::from_str::<StorageKind>(r#""Memory""#).is_err());
    }
}
