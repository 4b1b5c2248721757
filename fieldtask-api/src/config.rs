/// Configuration management for the API server
///
/// Configuration is layered, lowest precedence first:
///
/// 1. Built-in defaults
/// 2. An optional `config.{toml,yml,json}` file in the working directory
/// 3. Environment variables prefixed `FIELDTASK__`, nested with `__`
///
/// A `.env` file is loaded into the environment first when present.
///
/// # Environment Variables
///
/// - `FIELDTASK__DATABASE__URL`: PostgreSQL connection string (required)
/// - `FIELDTASK__SECURITY__HASH_KEY`: Password hashing key (required)
/// - `FIELDTASK__SECURITY__JWT_KEY`: Session signing key, at least 32
///   characters (required)
/// - `FIELDTASK__SECURITY__JWT_EXPIRES_IN_MS`: Session lifetime (default:
///   900000)
/// - `FIELDTASK__SERVER__HOST` / `FIELDTASK__SERVER__PORT`: Bind address
///   (default: 0.0.0.0:8080)
/// - `FIELDTASK__SERVER__CORS_ORIGINS`: Comma separated origins (default: `*`)
/// - `FIELDTASK__NOTIFICATION__SUMMARY_MAX_LEN`: Summary truncation length
///   (default: 30)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use fieldtask_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::fmt;

/// Minimum accepted length of the session signing key
pub const MIN_JWT_KEY_LEN: usize = 32;

/// Longest accepted session lifetime (one year)
pub const MAX_JWT_EXPIRES_IN_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// Complete application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub notification: NotificationConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Keys and session settings
#[derive(Clone, Deserialize)]
pub struct SecurityConfig {
    /// Key for the password HMAC
    pub hash_key: String,

    /// Symmetric session signing key
    ///
    /// Generate with: `openssl rand -hex 32`
    pub jwt_key: String,

    /// Session lifetime in milliseconds
    pub jwt_expires_in_ms: i64,
}

/// Manager notification settings
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Summaries longer than this many characters are truncated
    pub summary_max_len: usize,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("hash_key", &"<redacted>")
            .field("jwt_key", &"<redacted>")
            .field("jwt_expires_in_ms", &self.jwt_expires_in_ms)
            .finish()
    }
}

impl Config {
    /// Loads configuration from defaults, `config.*` and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A source cannot be read or parsed
    /// - A required value is missing
    /// - A value fails validation
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = Self::defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("FIELDTASK")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    /// Builder preloaded with the built-in defaults
    pub fn defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
        let builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.cors_origins", vec!["*"])?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("security.hash_key", "")?
            .set_default("security.jwt_key", "")?
            .set_default("security.jwt_expires_in_ms", 900_000)?
            .set_default("notification.summary_max_len", 30)?;

        Ok(builder)
    }

    /// Builds, deserializes and validates a configuration
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks required values and constraints
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("database.url is required");
        }

        if self.security.hash_key.is_empty() {
            anyhow::bail!("security.hash_key is required");
        }

        if self.security.jwt_key.len() < MIN_JWT_KEY_LEN {
            anyhow::bail!("security.jwt_key must be at least {MIN_JWT_KEY_LEN} characters long");
        }

        if !(0..=MAX_JWT_EXPIRES_IN_MS).contains(&self.security.jwt_expires_in_ms) {
            anyhow::bail!(
                "security.jwt_expires_in_ms must be between 0 and {MAX_JWT_EXPIRES_IN_MS}"
            );
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
