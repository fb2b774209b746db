//! Server configuration module.
//!
//! Layers, later wins:
//!
//! ```text
//! built-in defaults ──► shopfront.toml (optional) ──► SHOPFRONT__SECTION__KEY env
//! ```
//!
//! `SHOPFRONT__SERVER__PORT=9000` overrides `[server] port`.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use shopfront_core::validation::validate_tax_rate_bps;
use shopfront_core::TaxRate;

/// Full server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server: HttpSettings,
    pub database: DatabaseSettings,
    pub session: SessionSettings,
    pub sales: SalesSettings,
    pub feedback: FeedbackSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path, or `:memory:`
    pub path: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// HMAC secret for session tokens
    pub secret: String,
    pub lifetime_secs: i64,
    pub cookie_name: String,
    /// Mark the cookie `Secure` (HTTPS deployments)
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesSettings {
    /// Tax rate applied by the browser cart, in basis points
    pub tax_rate_bps: u32,
    pub currency_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSettings {
    /// Address feedback is mailed to; unset disables mailing
    pub recipient: Option<String>,
}

const DEV_SECRET: &str = "shopfront-dev-secret-change-in-production";

impl ServerConfig {
    /// Load configuration from `shopfront.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("shopfront")
    }

    /// Load with an explicit config file stem (extension optional).
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("database.path", "shopfront.db")?
            .set_default("database.max_connections", 5_i64)?
            .set_default("session.secret", DEV_SECRET)?
            .set_default("session.lifetime_secs", 12_i64 * 3600)?
            .set_default("session.cookie_name", "shopfront_session")?
            .set_default("session.secure_cookie", false)?
            .set_default("sales.tax_rate_bps", 0_i64)?
            .set_default("sales.currency_symbol", "$")?
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("SHOPFRONT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.len() < 16 {
            return Err(ConfigError::InvalidValue(
                "session.secret must be at least 16 characters".to_string(),
            ));
        }
        if self.session.lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "session.lifetime_secs must be positive".to_string(),
            ));
        }
        validate_tax_rate_bps(self.sales.tax_rate_bps)
            .map_err(|e| ConfigError::InvalidValue(format!("sales.{}", e)))?;
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.session.secret == DEV_SECRET
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.sales.tax_rate_bps)
    }

    /// Configuration for tests: in-memory database, fixed secret.
    pub fn for_tests() -> Self {
        ServerConfig {
            server: HttpSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseSettings {
                path: ":memory:".to_string(),
                max_connections: 1,
            },
            session: SessionSettings {
                secret: "test-secret-with-enough-length".to_string(),
                lifetime_secs: 3600,
                cookie_name: "shopfront_session".to_string(),
                secure_cookie: false,
            },
            sales: SalesSettings {
                tax_rate_bps: 800,
                currency_symbol: "$".to_string(),
            },
            feedback: FeedbackSettings { recipient: None },
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}
