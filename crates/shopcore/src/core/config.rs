//! Process-wide settings and tuning constants.
//!
//! Settings are read once at startup and then passed explicitly to the
//! commerce client, the session store and the Telegram handlers. Nothing in
//! the crate reads the environment after [`Settings::from_env`] returns.

use log::LevelFilter;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::core::error::ConfigError;

/// Telegram bot token
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
/// Elasticpath store client ID
pub const ELASTICPATH_CLIENT_ID: &str = "ELASTICPATH_CLIENT_ID";
/// Elasticpath client secret (optional, enables `client_credentials` grant)
pub const ELASTICPATH_CLIENT_SECRET: &str = "ELASTICPATH_CLIENT_SECRET";
/// Elasticpath API base URL (optional)
pub const ELASTICPATH_API_URL: &str = "ELASTICPATH_API_URL";
/// Redis host
pub const REDIS_HOST: &str = "REDIS_HOST";
/// Redis port
pub const REDIS_PORT: &str = "REDIS_PORT";
/// Redis password (may be empty for servers without AUTH)
pub const REDIS_PASSWORD: &str = "REDIS_PASSWORD";
/// Redis logical database (optional)
pub const REDIS_DB: &str = "REDIS_DB";
/// Session expiry in seconds (optional)
pub const SESSION_TTL_SECS: &str = "SESSION_TTL_SECS";
/// Log file path (optional)
pub const LOG_FILE_PATH: &str = "LOG_FILE_PATH";
/// Log level for terminal and file output (optional)
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Custom Telegram Bot API server (optional)
pub const BOT_API_URL: &str = "BOT_API_URL";

/// Default Elasticpath API host
pub const DEFAULT_ELASTICPATH_API_URL: &str = "https://api.moltin.com";

/// Default log file
pub const DEFAULT_LOG_FILE_PATH: &str = "shopbot.log";

/// Default log level
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// All settings the bot needs at runtime.
#[derive(Debug)]
pub struct Settings {
    pub telegram_bot_token: SecretString,
    pub bot_api_url: Option<Url>,
    pub elasticpath: ElasticpathSettings,
    pub redis: RedisSettings,
    pub logging: LoggingSettings,
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub file_path: String,
    pub level: LevelFilter,
}

/// Elasticpath API credentials and endpoint.
#[derive(Debug)]
pub struct ElasticpathSettings {
    pub api_url: Url,
    pub client_id: String,
    pub client_secret: Option<SecretString>,
}

/// Redis connection parameters.
#[derive(Debug)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: SecretString,
    pub db: i64,
    pub session_ttl: Option<Duration>,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// A `.env` file is only honored if the caller loaded it beforehand.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup.
    ///
    /// # Errors
    /// * `ConfigError::Missing` - a required variable is absent
    /// * `ConfigError::Invalid` - a variable is present but malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let telegram_bot_token = SecretString::from(vars.required(TELEGRAM_BOT_TOKEN)?);
        let elasticpath = ElasticpathSettings::read(&vars)?;
        let redis = RedisSettings::read(&vars)?;
        let logging = LoggingSettings::read(&vars)?;
        let bot_api_url = vars
            .optional(BOT_API_URL)
            .map(|raw| parse_url(BOT_API_URL, &raw))
            .transpose()?;

        Ok(Self {
            telegram_bot_token,
            bot_api_url,
            elasticpath,
            redis,
            logging,
        })
    }
}

impl LoggingSettings {
    /// Reads `LOG_FILE_PATH` and `LOG_LEVEL` from the process environment.
    ///
    /// Readable before the rest of the settings so the logger can be up
    /// before configuration errors are reported.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::read(&Vars(&lookup))
    }

    fn read<F>(vars: &Vars<'_, F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = vars
            .optional(LOG_LEVEL)
            .map(|raw| parse_var::<LevelFilter>(LOG_LEVEL, &raw))
            .transpose()?
            .unwrap_or(DEFAULT_LOG_LEVEL);

        Ok(Self {
            file_path: vars
                .optional(LOG_FILE_PATH)
                .unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string()),
            level,
        })
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_path: DEFAULT_LOG_FILE_PATH.to_string(),
            level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl ElasticpathSettings {
    /// Reads only the Elasticpath part of the environment (used by the
    /// catalog upload tools, which need neither Telegram nor Redis).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::read(&Vars(&lookup))
    }

    fn read<F>(vars: &Vars<'_, F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = vars.required(ELASTICPATH_CLIENT_ID)?;
        let api_url = parse_url(
            ELASTICPATH_API_URL,
            &vars
                .optional(ELASTICPATH_API_URL)
                .unwrap_or_else(|| DEFAULT_ELASTICPATH_API_URL.to_string()),
        )?;

        Ok(Self {
            api_url,
            client_id,
            client_secret: vars.optional(ELASTICPATH_CLIENT_SECRET).map(SecretString::from),
        })
    }
}

impl RedisSettings {
    fn read<F>(vars: &Vars<'_, F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = vars.required(REDIS_HOST)?;
        let port_raw = vars.required(REDIS_PORT)?;
        // An empty password is allowed: it means "no AUTH".
        let password = vars.raw(REDIS_PASSWORD).ok_or(ConfigError::Missing(REDIS_PASSWORD))?;

        let port: u16 = parse_var(REDIS_PORT, &port_raw)?;
        if port == 0 {
            return Err(ConfigError::Invalid {
                name: REDIS_PORT,
                value: port_raw,
                reason: "port must be between 1 and 65535".to_string(),
            });
        }

        let db = vars
            .optional(REDIS_DB)
            .map(|raw| parse_var::<i64>(REDIS_DB, &raw))
            .transpose()?
            .unwrap_or(0);
        let session_ttl = match vars.optional(SESSION_TTL_SECS) {
            Some(raw) => match parse_var::<u64>(SESSION_TTL_SECS, &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        let redis = Self {
            host,
            port,
            password: SecretString::from(password),
            db,
            session_ttl,
        };

        // Fail at startup, not on the first message, if the host is unusable.
        redis.connection_url()?;

        Ok(redis)
    }

    /// Builds the `redis://` URL for the client, password included.
    ///
    /// The returned URL carries the password; never log it.
    pub fn connection_url(&self) -> Result<Url, ConfigError> {
        let invalid_host = |reason: String| ConfigError::Invalid {
            name: REDIS_HOST,
            value: self.host.clone(),
            reason,
        };

        let mut url = Url::parse(&format!("redis://{}:{}/{}", self.host, self.port, self.db))
            .map_err(|e| invalid_host(e.to_string()))?;

        let password = self.password.expose_secret();
        if !password.is_empty() {
            url.set_password(Some(password))
                .map_err(|()| invalid_host("host cannot carry credentials".to_string()))?;
        }

        Ok(url)
    }
}

fn parse_var<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        name,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Borrowed variable lookup with the blank-means-missing rule.
struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, name: &str) -> Option<String> {
        (self.0)(name)
    }

    fn optional(&self, name: &str) -> Option<String> {
        self.raw(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }
}

/// Catalog presentation
pub mod catalog {
    /// Number of products shown on one catalog page
    pub const PAGE_SIZE: u32 = 8;

    /// Quantities offered as "Add N" buttons on a product card
    pub const ADD_AMOUNTS: &[u32] = &[1];
}

/// Session storage configuration
pub mod session {
    /// Prefix of every session key in Redis
    pub const KEY_PREFIX: &str = "shopbot:session";
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for HTTP requests (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Retry configuration
pub mod retry {
    use super::Duration;

    /// Maximum number of retries for dispatcher reconnection
    pub const MAX_DISPATCHER_RETRIES: u32 = 5;

    /// Delay between dispatcher retry attempts (in seconds)
    pub const DISPATCHER_RETRY_DELAY_SECS: u64 = 5;

    /// Dispatcher retry delay duration
    pub fn dispatcher_delay() -> Duration {
        Duration::from_secs(DISPATCHER_RETRY_DELAY_SECS)
    }

    /// Base for exponential backoff calculation
    pub const EXPONENTIAL_BACKOFF_BASE: u64 = 2;
}
