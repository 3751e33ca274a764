//! Client hub for tracking active connections

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use glot_core::{Connection, ConnectionConfig, GlotError, Result};

use crate::DriverRegistry;

/// Tracks live connections by id and resolves drivers through the registry
///
/// Connections are stored under the id carried in their configuration, so a
/// caller that owns the config can always find the session it opened.
pub struct ClientHub {
    /// Driver registry
    drivers: DriverRegistry,

    /// Active connections
    active: RwLock<HashMap<Uuid, Arc<dyn Connection>>>,
}

impl ClientHub {
    /// Create a new hub with all built-in drivers
    pub fn new() -> Self {
        Self {
            drivers: DriverRegistry::with_defaults(),
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new hub backed by a specific registry
    pub fn with_registry(drivers: DriverRegistry) -> Self {
        Self {
            drivers,
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Get the driver registry
    pub fn drivers(&self) -> &DriverRegistry {
        &self.drivers
    }

    /// Open a connection and start tracking it
    ///
    /// The connection is registered under `config.id`; connecting again with
    /// the same id replaces the previous handle without closing it.
    #[tracing::instrument(skip(self, config), fields(connection_id = %config.id, connection_name = %config.name, driver = %config.driver))]
    pub async fn connect(&self, config: &ConnectionConfig) -> Result<Uuid> {
        tracing::info!("opening connection");
        let driver = self
            .drivers
            .get(&config.driver)
            .ok_or_else(|| GlotError::Driver(format!("Unknown driver: {}", config.driver)))?;

        let conn = driver.connect(config).await.map_err(|e| {
            tracing::error!(error = %e, "failed to connect");
            e
        })?;

        self.active.write().insert(config.id, conn);

        tracing::info!("connection established");
        Ok(config.id)
    }

    /// Test a configuration without keeping a connection open
    #[tracing::instrument(skip(self, config), fields(connection_name = %config.name, driver = %config.driver))]
    pub async fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        tracing::debug!("testing connection");
        let driver = self
            .drivers
            .get(&config.driver)
            .ok_or_else(|| GlotError::Driver(format!("Unknown driver: {}", config.driver)))?;

        driver.test_connection(config).await
    }

    /// Verify that a tracked connection still answers queries
    #[tracing::instrument(skip(self), fields(connection_id = %id))]
    pub async fn check_connection(&self, id: Uuid) -> Result<()> {
        tracing::debug!("checking connection liveness");
        let conn = self.get(id).ok_or(GlotError::NotConnected)?;
        conn.execute("SELECT 1", &[]).await?;
        Ok(())
    }

    /// Disconnect a connection
    ///
    /// Unknown ids are ignored, so disconnecting twice is harmless.
    #[tracing::instrument(skip(self), fields(connection_id = %id))]
    pub async fn disconnect(&self, id: Uuid) -> Result<()> {
        tracing::info!("disconnecting connection");
        let conn = self.active.write().remove(&id);
        if let Some(conn) = conn {
            conn.close().await?;
        }
        Ok(())
    }

    /// Get an active connection
    pub fn get(&self, id: Uuid) -> Option<Arc<dyn Connection>> {
        let conn = self.active.read().get(&id).cloned();
        if conn.is_none() {
            tracing::debug!(connection_id = %id, "connection not found in active pool");
        }
        conn
    }

    /// Check if a connection is active
    pub fn is_connected(&self, id: Uuid) -> bool {
        self.active.read().contains_key(&id)
    }
}

impl Default for ClientHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use glot_core::{
        DatabaseDriver, DriverCapabilities, QueryResult, StatementResult, Value,
    };
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockConnection {
        closed: AtomicBool,
        executed: Mutex<Vec<String>>,
    }

    impl MockConnection {
        fn new() -> Self {
            Self {
                closed: AtomicBool::new(false),
                executed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Connection for MockConnection {
        fn driver_name(&self) -> &str {
            "mock"
        }

        async fn execute(&self, sql: &str, _params: &[Value]) -> Result<StatementResult> {
            self.executed.lock().push(sql.to_string());
            Ok(StatementResult {
                is_query: false,
                result: None,
                affected_rows: 0,
                error: None,
            })
        }

        async fn query(&self, _sql: &str, _params: &[Value]) -> Result<QueryResult> {
            Err(GlotError::NotSupported("mock".to_string()))
        }

        async fn close(&self) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn is_closed(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    struct MockDriver {
        refuse: bool,
        last: Mutex<Option<Arc<MockConnection>>>,
    }

    impl MockDriver {
        fn new() -> Self {
            Self {
                refuse: false,
                last: Mutex::new(None),
            }
        }

        fn refusing() -> Self {
            Self {
                refuse: true,
                last: Mutex::new(None),
            }
        }

        fn last_connection(&self) -> Option<Arc<MockConnection>> {
            self.last.lock().clone()
        }
    }

    #[async_trait]
    impl DatabaseDriver for MockDriver {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn capabilities(&self) -> DriverCapabilities {
            DriverCapabilities::default()
        }

        async fn connect(&self, _config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
            if self.refuse {
                return Err(GlotError::Connection("refused".to_string()));
            }
            let conn = Arc::new(MockConnection::new());
            *self.last.lock() = Some(conn.clone());
            Ok(conn)
        }

        async fn test_connection(&self, _config: &ConnectionConfig) -> Result<()> {
            if self.refuse {
                return Err(GlotError::Connection("refused".to_string()));
            }
            Ok(())
        }

        fn build_connection_string(&self, _config: &ConnectionConfig) -> String {
            "mock://".to_string()
        }
    }

    fn hub_with_driver(driver: Arc<MockDriver>) -> ClientHub {
        let mut registry = DriverRegistry::new();
        registry.register(driver);
        ClientHub::with_registry(registry)
    }

    #[tokio::test]
    async fn test_connect_tracks_by_config_id() {
        let driver = Arc::new(MockDriver::new());
        let hub = hub_with_driver(driver.clone());
        let config = ConnectionConfig::new("mock", "test");

        let id = hub.connect(&config).await.unwrap();
        assert_eq!(id, config.id);
        assert!(hub.is_connected(id));
        assert!(hub.get(id).is_some());
    }

    #[tokio::test]
    async fn test_connect_unknown_driver_fails() {
        let hub = ClientHub::with_registry(DriverRegistry::new());
        let config = ConnectionConfig::new("goose", "test");

        let err = hub.connect(&config).await.unwrap_err();
        assert!(matches!(err, GlotError::Driver(_)));
        assert!(!hub.is_connected(config.id));
    }

    #[tokio::test]
    async fn test_connect_failure_is_not_tracked() {
        let driver = Arc::new(MockDriver::refusing());
        let hub = hub_with_driver(driver);
        let config = ConnectionConfig::new("mock", "test");

        let err = hub.connect(&config).await.unwrap_err();
        assert!(matches!(err, GlotError::Connection(_)));
        assert!(!hub.is_connected(config.id));
    }

    #[tokio::test]
    async fn test_check_connection_pings() {
        let driver = Arc::new(MockDriver::new());
        let hub = hub_with_driver(driver.clone());
        let config = ConnectionConfig::new("mock", "test");

        let id = hub.connect(&config).await.unwrap();
        hub.check_connection(id).await.unwrap();

        let conn = driver.last_connection().unwrap();
        assert_eq!(*conn.executed.lock(), vec!["SELECT 1".to_string()]);
    }

    #[tokio::test]
    async fn test_check_connection_unknown_id() {
        let hub = ClientHub::with_registry(DriverRegistry::new());
        let err = hub.check_connection(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, GlotError::NotConnected));
    }

    #[tokio::test]
    async fn test_disconnect_closes_and_forgets() {
        let driver = Arc::new(MockDriver::new());
        let hub = hub_with_driver(driver.clone());
        let config = ConnectionConfig::new("mock", "test");

        let id = hub.connect(&config).await.unwrap();
        hub.disconnect(id).await.unwrap();

        let conn = driver.last_connection().unwrap();
        assert!(conn.is_closed());
        assert!(!hub.is_connected(id));

        // Second disconnect of the same id is a no-op
        hub.disconnect(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_test_connection_does_not_track() {
        let driver = Arc::new(MockDriver::new());
        let hub = hub_with_driver(driver);
        let config = ConnectionConfig::new("mock", "test");

        hub.test_connection(&config).await.unwrap();
        assert!(!hub.is_connected(config.id));
    }
}
