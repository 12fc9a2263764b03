//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every section falls back to its defaults so the relay can
//! start without any file present.

pub mod app;
pub mod auth;
pub mod broker;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::{AuthConfig, PeerRecord, RestAuthConfig, RestAuthMode, SimpleAuthConfig};
pub use self::broker::{BrokerConfig, EventAccessConfig};
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP / WebSocket server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Broker protocol settings.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Authorization provider settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Tenant document settings.
    #[serde(default)]
    pub tenants: TenantStoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Location of the tenant document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantStoreConfig {
    /// Path to the JSON document keyed by tenant id.
    #[serde(default = "default_tenants_path")]
    pub path: String,
}

impl Default for TenantStoreConfig {
    fn default() -> Self {
        Self {
            path: default_tenants_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `RELAY__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("RELAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

fn default_tenants_path() -> String {
    "config/tenants.json".to_string()
}
