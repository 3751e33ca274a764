//! Database driver trait definition

use crate::{Connection, DialectInfo, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Capabilities that a driver may support
///
/// Callers branch on these instead of matching on driver ids. A driver that
/// reports `false` for a capability returns empty results or
/// [`BackendAttr::Unsupported`](crate::BackendAttr) markers for the
/// corresponding surface rather than erroring.
#[derive(Debug, Clone, Default)]
pub struct DriverCapabilities {
    /// Supports schemas (namespaces)
    pub supports_schemas: bool,
    /// Supports multiple databases per server
    pub supports_multiple_databases: bool,
    /// Exposes pluggable storage engines
    pub supports_storage_engines: bool,
    /// Exposes a user/role catalog
    pub supports_users: bool,
    /// Exposes server variables/settings
    pub supports_variables: bool,
    /// Exposes a process/session list
    pub supports_processes: bool,
    /// Supports sequences
    pub supports_sequences: bool,
    /// Supports stored procedures and functions
    pub supports_routines: bool,
    /// Supports triggers
    pub supports_triggers: bool,
    /// Trigger bodies live in separate trigger functions
    pub supports_trigger_functions: bool,
    /// Supports views
    pub supports_views: bool,
    /// Supports materialized views
    pub supports_materialized_views: bool,
    /// Supports foreign keys
    pub supports_foreign_keys: bool,
    /// Supports multiple statements in one query
    pub supports_multiple_statements: bool,
    /// Supports query cancellation
    pub supports_cancellation: bool,
    /// Supports SSL/TLS
    pub supports_ssl: bool,
    /// Maximum identifier length (None = no limit)
    pub max_identifier_length: Option<usize>,
    /// Maximum parameters per query (None = no limit)
    pub max_parameters: Option<usize>,
}

/// Core driver trait that all database drivers must implement
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Unique identifier for this driver (e.g., "postgres", "mysql")
    fn id(&self) -> &'static str {
        self.name()
    }

    /// Human-readable name (e.g., "PostgreSQL", "MySQL")
    fn name(&self) -> &'static str;

    /// Display name for logs and diagnostics
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Driver version
    fn version(&self) -> &'static str {
        "0.1.0"
    }

    /// Supported features/capabilities
    fn capabilities(&self) -> DriverCapabilities;

    /// Default connection port (None for file-based databases)
    fn default_port(&self) -> Option<u16> {
        None
    }

    /// Get SQL dialect information
    ///
    /// Returns metadata about the SQL dialect this driver uses, including
    /// data types, quoting rules, and the catalog's array type encoding.
    ///
    /// This is the primary extension point for driver-specific behavior.
    /// The rest of the codebase should use this metadata instead of
    /// hardcoding per-driver logic.
    fn dialect_info(&self) -> DialectInfo {
        DialectInfo::default()
    }

    /// Create a new connection
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;

    /// Test connection without keeping it open
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()>;

    /// Parse a connection string into a configuration
    fn parse_connection_string(&self, _conn_str: &str) -> Result<ConnectionConfig> {
        Err(crate::GlotError::NotSupported(
            "connection string parsing not implemented for this driver".into(),
        ))
    }

    /// Build a connection string from configuration
    fn build_connection_string(&self, config: &ConnectionConfig) -> String;

    /// Get default connection parameters
    fn default_params(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// Connection configuration
///
/// The default schema and pool size are fixed here, at creation time. A
/// connection never switches schema after it has been established; callers
/// that need another schema pass it explicitly to the introspection calls.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Unique identifier
    pub id: uuid::Uuid,
    /// Display name
    pub name: String,
    /// Driver ID (e.g., "postgres", "mysql")
    pub driver: String,
    /// Host address
    pub host: String,
    /// Port number (0 for driver default)
    pub port: u16,
    /// Database name
    pub database: Option<String>,
    /// Username
    pub username: Option<String>,
    /// Password (should be encrypted in storage)
    pub password: Option<String>,
    /// Schema applied to every session of this connection
    pub default_schema: Option<String>,
    /// Pool size; 0 opens a single dedicated session instead of a pool
    pub pool_size: u32,
    /// Additional connection parameters
    pub params: HashMap<String, String>,
}

impl ConnectionConfig {
    /// Create a new configuration with default values
    pub fn new(driver: &str, name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: name.to_string(),
            driver: driver.to_string(),
            host: String::new(),
            port: 0,
            database: None,
            username: None,
            password: None,
            default_schema: None,
            pool_size: 0,
            params: HashMap::new(),
        }
    }

    /// Create a PostgreSQL configuration
    pub fn new_postgres(host: &str, port: u16, database: &str, username: &str) -> Self {
        let mut config = Self::new("postgres", "PostgreSQL");
        config.host = host.to_string();
        config.port = port;
        config.database = Some(database.to_string());
        config.username = Some(username.to_string());
        config
    }

    /// Set the schema every session of this connection starts in
    pub fn with_default_schema(mut self, schema: &str) -> Self {
        self.default_schema = Some(schema.to_string());
        self
    }

    /// Set the pool size (0 keeps the connection single-session)
    pub fn with_pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    /// Set a connection parameter
    pub fn with_param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        let val = value.into();
        let str_val = match val {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        self.params.insert(key.to_string(), str_val);
        self
    }

    /// Get a string parameter
    pub fn get_string(&self, key: &str) -> Option<String> {
        // First check params
        if let Some(val) = self.params.get(key) {
            return Some(val.clone());
        }
        // Check known fields
        match key {
            "host" => Some(self.host.clone()),
            "database" => self.database.clone(),
            "username" | "user" => self.username.clone(),
            "password" => self.password.clone(),
            "schema" => self.default_schema.clone(),
            _ => None,
        }
    }

    /// Get port, falling back to `default` when unset
    pub fn get_port(&self, default: u16) -> u16 {
        if self.port == 0 { default } else { self.port }
    }

    /// Whether this configuration asks for a pooled connection
    pub fn is_pooled(&self) -> bool {
        self.pool_size > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_shadow_known_fields() {
        let config = ConnectionConfig::new_postgres("localhost", 5432, "app", "admin")
            .with_param("host", "proxy.internal");
        assert_eq!(config.get_string("host"), Some("proxy.internal".into()));
        assert_eq!(config.get_string("database"), Some("app".into()));
        assert_eq!(config.get_string("sslmode"), None);
    }

    #[test]
    fn test_pool_and_port_defaults() {
        let config = ConnectionConfig::new("postgres", "test");
        assert!(!config.is_pooled());
        assert_eq!(config.get_port(5432), 5432);

        let pooled = config.with_pool_size(8).with_param("port_hint", 5433);
        assert!(pooled.is_pooled());
    }
}
