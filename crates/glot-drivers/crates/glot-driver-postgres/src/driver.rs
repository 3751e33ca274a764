//! PostgreSQL driver implementation

use std::sync::Arc;

use async_trait::async_trait;

use glot_core::{
    Connection, ConnectionConfig, DatabaseDriver, DialectInfo, DriverCapabilities, Result,
};

use crate::PostgresConnection;

/// PostgreSQL database driver
pub struct PostgresDriver;

impl PostgresDriver {
    /// Create a new PostgreSQL driver instance
    pub fn new() -> Self {
        tracing::debug!("PostgreSQL driver initialized");
        Self
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn display_name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn default_port(&self) -> Option<u16> {
        Some(5432)
    }

    fn dialect_info(&self) -> DialectInfo {
        crate::postgres_dialect()
    }

    fn capabilities(&self) -> DriverCapabilities {
        DriverCapabilities {
            supports_schemas: true,
            supports_multiple_databases: true,
            supports_storage_engines: false,
            supports_users: true,
            supports_variables: true,
            supports_processes: true,
            supports_sequences: true,
            supports_routines: true,
            supports_triggers: true,
            supports_trigger_functions: true,
            supports_views: true,
            supports_materialized_views: true,
            supports_foreign_keys: true,
            supports_multiple_statements: true,
            supports_cancellation: true,
            supports_ssl: true,
            max_identifier_length: Some(63),
            max_parameters: Some(65535),
        }
    }

    #[tracing::instrument(skip(self, config), fields(host = config.get_string("host").as_deref(), database = config.get_string("database").as_deref()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let conn = PostgresConnection::connect(config).await.map_err(|e| {
            tracing::error!(error = %e, "failed to connect to PostgreSQL database");
            e
        })?;

        Ok(Arc::new(conn))
    }

    #[tracing::instrument(skip(self, config))]
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        tracing::debug!("testing PostgreSQL connection");
        let conn = self.connect(config).await?;
        conn.query("SELECT 1", &[]).await?;
        conn.close().await?;
        Ok(())
    }

    fn build_connection_string(&self, config: &ConnectionConfig) -> String {
        let host = config
            .get_string("host")
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| "localhost".to_string());
        let port = config.get_port(5432);
        let database = config
            .get_string("database")
            .filter(|database| !database.is_empty())
            .unwrap_or_else(|| "postgres".to_string());

        let mut conn_str = "postgresql://".to_string();

        if let Some(user) = config.get_string("user") {
            conn_str.push_str(&user);
            if let Some(password) = config.get_string("password") {
                conn_str.push(':');
                conn_str.push_str(&password);
            }
            conn_str.push('@');
        }

        conn_str.push_str(&format!("{}:{}/{}", host, port, database));

        conn_str
    }
}
