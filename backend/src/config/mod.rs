use serde::Deserialize;
use std::env;
use std::fmt;

use crate::error::{Result, ServiceError};

pub const DB_CONFIG_ENV: &str = "DB_CONFIG";
pub const SIGNUP_SECRET_ENV: &str = "SIGNUP_SECRET";
pub const SCHEMA_MIGRATION_FATAL_ENV: &str = "SCHEMA_MIGRATION_FATAL";

/// Address the HTTP listener binds to. Not configurable.
pub const LISTEN_ADDR: (&str, u16) = ("0.0.0.0", 8080);

/// Connection parameters for the relational store, read from `DB_CONFIG`.
///
/// Every field is a non-empty string; the port is only interpreted when the
/// connection is opened.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    #[serde(rename = "DB_HOST")]
    pub host: String,
    #[serde(rename = "DB_PORT")]
    pub port: String,
    #[serde(rename = "DB_NAME")]
    pub name: String,
    #[serde(rename = "DB_USER")]
    pub user: String,
    #[serde(rename = "DB_PASSWORD")]
    pub password: String,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self> {
        let raw = env::var(DB_CONFIG_ENV).map_err(|e| {
            ServiceError::Config(format!("{} is not available: {}", DB_CONFIG_ENV, e))
        })?;

        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: StoreConfig = serde_json::from_str(raw).map_err(|e| {
            ServiceError::Config(format!("Failed to parse {} JSON: {}", DB_CONFIG_ENV, e))
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("DB_HOST", &self.host),
            ("DB_PORT", &self.port),
            ("DB_NAME", &self.name),
            ("DB_USER", &self.user),
            ("DB_PASSWORD", &self.password),
        ];

        for (field, value) in fields {
            if value.is_empty() {
                return Err(ServiceError::Config(format!(
                    "{} field {} must not be empty",
                    DB_CONFIG_ENV, field
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Value the signup gate compares the request header against.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(ServiceError::Config(format!(
                "{} must not be empty",
                SIGNUP_SECRET_ENV
            )));
        }
        Ok(Self(value))
    }

    pub fn from_env() -> Result<Self> {
        let value = env::var(SIGNUP_SECRET_ENV).map_err(|e| {
            ServiceError::Config(format!("{} is not available: {}", SIGNUP_SECRET_ENV, e))
        })?;
        Self::new(value)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// What startup does when the schema cannot be brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrationPolicy {
    /// Abort before the listener binds.
    Fatal,
    /// Log the failure and keep starting.
    #[default]
    LogOnly,
}

impl MigrationPolicy {
    pub fn from_env() -> Self {
        env::var(SCHEMA_MIGRATION_FATAL_ENV)
            .ok()
            .map(|v| Self::from_flag(&v))
            .unwrap_or_default()
    }

    fn from_flag(value: &str) -> Self {
        if matches!(
            value.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ) {
            MigrationPolicy::Fatal
        } else {
            MigrationPolicy::LogOnly
        }
    }
}

/// Everything startup needs, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub signup_secret: SharedSecret,
    pub migration_policy: MigrationPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let store = StoreConfig::from_env()?;
        let signup_secret = SharedSecret::from_env()?;
        let migration_policy = MigrationPolicy::from_env();

        Ok(Self {
            store,
            signup_secret,
            migration_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"DB_HOST":"db.internal","DB_NAME":"app","DB_PASSWORD":"p@ss:word","DB_PORT":"3306","DB_USER":"svc"}"#;

    #[test]
    fn test_parse_valid_store_config() {
        let config = StoreConfig::from_json(VALID).unwrap();
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, "3306");
        assert_eq!(config.name, "app");
        assert_eq!(config.user, "svc");
        assert_eq!(config.password, "p@ss:word");
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let raw = r#"{"DB_HOST":"h","DB_NAME":"n","DB_PASSWORD":"p","DB_PORT":"1","DB_USER":"u","REGION":"x"}"#;
        assert!(StoreConfig::from_json(raw).is_ok());
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let raw = r#"{"DB_HOST":"h","DB_NAME":"n","DB_PASSWORD":"p","DB_USER":"u"}"#;
        let err = StoreConfig::from_json(raw).unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
        assert!(err.to_string().contains("DB_PORT"));
    }

    #[test]
    fn test_field_names_are_case_sensitive() {
        let raw = r#"{"db_host":"h","DB_NAME":"n","DB_PASSWORD":"p","DB_PORT":"1","DB_USER":"u"}"#;
        assert!(StoreConfig::from_json(raw).is_err());
    }

    #[test]
    fn test_non_string_field_is_rejected() {
        let raw = r#"{"DB_HOST":"h","DB_NAME":"n","DB_PASSWORD":"p","DB_PORT":3306,"DB_USER":"u"}"#;
        assert!(StoreConfig::from_json(raw).is_err());
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let raw = r#"{"DB_HOST":"","DB_NAME":"n","DB_PASSWORD":"p","DB_PORT":"1","DB_USER":"u"}"#;
        let err = StoreConfig::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("DB_HOST"));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(StoreConfig::from_json("{not json").is_err());
        assert!(StoreConfig::from_json("").is_err());
        assert!(StoreConfig::from_json("[]").is_err());
    }

    #[test]
    fn test_debug_output_hides_password() {
        let config = StoreConfig::from_json(VALID).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("p@ss:word"));
        assert!(debug.contains("db.internal"));
    }

    #[test]
    fn test_shared_secret_rejects_empty() {
        assert!(SharedSecret::new("").is_err());
        assert!(SharedSecret::new("s3cret").is_ok());
    }

    #[test]
    fn test_shared_secret_debug_is_redacted() {
        let secret = SharedSecret::new("s3cret").unwrap();
        assert_eq!(format!("{:?}", secret), "SharedSecret(<redacted>)");
    }

    #[test]
    fn test_migration_policy_flags() {
        assert_eq!(MigrationPolicy::from_flag("true"), MigrationPolicy::Fatal);
        assert_eq!(MigrationPolicy::from_flag("ON"), MigrationPolicy::Fatal);
        assert_eq!(MigrationPolicy::from_flag("1"), MigrationPolicy::Fatal);
        assert_eq!(MigrationPolicy::from_flag("0"), MigrationPolicy::LogOnly);
        assert_eq!(MigrationPolicy::from_flag("no"), MigrationPolicy::LogOnly);
        assert_eq!(MigrationPolicy::default(), MigrationPolicy::LogOnly);
    }
}
