use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Environment variable missing: {name}")]
    MissingEnvironmentVariable { name: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(rename = "db_user", default)]
    pub user: Option<String>,
    #[serde(rename = "db_pass", default)]
    pub password: Option<String>,
    #[serde(rename = "db_cluster", default = "default_cluster")]
    pub cluster: String,
    #[serde(rename = "db_name", default = "default_database_name")]
    pub name: String,
    #[serde(rename = "mongodb_uri", default)]
    pub uri: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(rename = "access_token_secret", default)]
    pub secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(rename = "cors_allowed_origins", default = "default_allowed_origins")]
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

// Credentials must never reach the logs
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("cluster", &self.cluster)
            .field("name", &self.name)
            .field("uri", &self.uri.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

impl Config {
    pub fn from_environment() -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");

        let server = ServerConfig::from_env()?;
        let database = DatabaseConfig::from_env()?;
        let auth = AuthConfig::from_env()?;
        let cors = CorsConfig::from_env()?;
        let observability = ObservabilityConfig::from_env()?;

        let config = Config {
            server,
            database,
            auth,
            cors,
            observability,
        };

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!("Configuration: {:?}", config);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.auth.secret.is_empty() {
            return Err(ConfigError::MissingEnvironmentVariable {
                name: "ACCESS_TOKEN_SECRET".to_string(),
            });
        }

        if self.auth.token_ttl_hours == 0 {
            return Err(ConfigError::ValidationError {
                message: "Token lifetime cannot be 0".to_string(),
            });
        }

        if self.auth.ttl_seconds().is_none() {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Token lifetime of {} hours is out of range",
                    self.auth.token_ttl_hours
                ),
            });
        }

        if self.database.uri.is_none() {
            for (name, value) in [
                ("DB_USER", &self.database.user),
                ("DB_PASS", &self.database.password),
            ] {
                if value.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::MissingEnvironmentVariable {
                        name: name.to_string(),
                    });
                }
            }
        }

        if self.database.name.is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Database name cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Read one section from the unprefixed process environment
fn load_section<T: serde::de::DeserializeOwned>(
    section: &str,
    source: config::Environment,
) -> Result<T, ConfigError> {
    let settings = config::Config::builder()
        .add_source(source)
        .build()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to load {} config: {}", section, e),
        })?;

    settings
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", section, e),
        })
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_section("server", config::Environment::default())
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_section("database", config::Environment::default())
    }

    /// `MONGODB_URI` when set, otherwise the Atlas SRV string built from the parts
    pub fn connection_uri(&self) -> String {
        if let Some(uri) = self.uri.as_deref().filter(|uri| !uri.is_empty()) {
            return uri.to_string();
        }

        format!(
            "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
            self.user.as_deref().unwrap_or_default(),
            self.password.as_deref().unwrap_or_default(),
            self.cluster
        )
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_section("auth", config::Environment::default())
    }

    /// Saturates on lifetimes [`Config::validate`] rejects
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds().unwrap_or(i64::MAX as u64))
    }

    /// Lifetime in seconds, if it fits a signed JWT timestamp
    fn ttl_seconds(&self) -> Option<u64> {
        self.token_ttl_hours
            .checked_mul(60 * 60)
            .filter(|secs| i64::try_from(*secs).is_ok())
    }
}

impl CorsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_section("cors", config::Environment::default())
    }

    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_section("observability", config::Environment::with_prefix("HUNGRY"))
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    5000
}

pub(crate) fn default_cluster() -> String {
    "cluster0.7mrpr8s.mongodb.net".to_string()
}

pub(crate) fn default_database_name() -> String {
    "foodsData".to_string()
}

pub(crate) fn default_token_ttl_hours() -> u64 {
    5
}

pub(crate) fn default_allowed_origins() -> String {
    "http://localhost:5173".to_string()
}

pub(crate) fn default_service_name() -> String {
    "hungryharmony-rs".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}
