pub mod models;
pub mod repository;
pub mod schema;

pub use models::{NewUser, User};
pub use repository::UserRepository;
pub use schema::{ensure_schema, EntityDescriptor, SchemaReport};

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::{ConnectOptions, Connection};
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::{Result, ServiceError};

const MAX_CONNECTIONS: u32 = 10;

/// Session settings applied to every store connection.
///
/// Temporal columns are always decoded into `chrono` values by the driver, so
/// only the character set and the session time zone need to be pinned here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionPolicy {
    pub charset: &'static str,
    pub time_zone: &'static str,
}

/// Multibyte UTF-8 and the server's local time.
pub const CONNECTION_POLICY: ConnectionPolicy = ConnectionPolicy {
    charset: "utf8mb4",
    time_zone: "SYSTEM",
};

pub fn connect_options(config: &StoreConfig) -> Result<MySqlConnectOptions> {
    let port: u16 = config.port.parse().map_err(|_| {
        ServiceError::Config(format!("DB_PORT `{}` is not a valid port", config.port))
    })?;

    Ok(MySqlConnectOptions::new()
        .host(&config.host)
        .port(port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
        .charset(CONNECTION_POLICY.charset)
        .timezone(Some(CONNECTION_POLICY.time_zone.to_string())))
}

/// Connection target without the password, safe to log.
pub fn connection_target(config: &StoreConfig) -> String {
    format!(
        "{}@{}:{}/{}?charset={}&time_zone={}",
        config.user,
        config.host,
        config.port,
        config.name,
        CONNECTION_POLICY.charset,
        CONNECTION_POLICY.time_zone
    )
}

/// Shared handle to the store. Cloning is cheap and every clone uses the same
/// pool.
#[derive(Clone)]
pub struct Store {
    pool: MySqlPool,
    target: Arc<str>,
}

impl Store {
    /// Builds the pool without opening a connection.
    pub fn connect_lazy(config: &StoreConfig) -> Result<Self> {
        let options = connect_options(config)?;
        Ok(Self::from_options(options, connection_target(config)))
    }

    fn from_options(options: MySqlConnectOptions, target: String) -> Self {
        let pool = MySqlPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_lazy_with(options);

        Self {
            pool,
            target: target.into(),
        }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }
}

/// Opens exactly one connection to check the store is reachable and accepts
/// the credentials, then hands out a pooled handle. There is no retry.
pub async fn connect(config: &StoreConfig) -> Result<Store> {
    let options = connect_options(config)?;
    let target = connection_target(config);

    log::info!("Connecting to MySQL at {}...", target);
    let conn = options.connect().await.map_err(ServiceError::Connect)?;
    if let Err(err) = conn.close().await {
        log::debug!("Closing probe connection failed: {}", err);
    }
    log::info!("Connected to MySQL");

    Ok(Store::from_options(options, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(port: &str) -> StoreConfig {
        StoreConfig {
            host: "db.internal".to_string(),
            port: port.to_string(),
            name: "app".to_string(),
            user: "svc".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_connection_target_applies_policy() {
        assert_eq!(
            connection_target(&config("3306")),
            "svc@db.internal:3306/app?charset=utf8mb4&time_zone=SYSTEM"
        );
    }

    #[test]
    fn test_connection_target_omits_password() {
        assert!(!connection_target(&config("3306")).contains("hunter2"));
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        for port in ["mysql", "-1", "70000", " 3306"] {
            let err = connect_options(&config(port)).unwrap_err();
            assert!(matches!(err, ServiceError::Config(_)), "port {:?}", port);
        }
    }

    #[test]
    fn test_valid_port_builds_options() {
        assert!(connect_options(&config("3306")).is_ok());
    }
}
