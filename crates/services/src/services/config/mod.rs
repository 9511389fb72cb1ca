//! Runtime configuration, read once from the environment at startup.

use std::{str::FromStr, time::Duration};

use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3001";
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 15 * 60 * 1000;
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin.
    pub frontend_url: String,
}

/// Requests allowed per client IP within one window.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(DEFAULT_RATE_LIMIT_WINDOW_MS),
            max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
        }
    }
}

#[derive(Clone)]
pub struct AssistConfig {
    /// `None` leaves the assist endpoint unconfigured.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            model: DEFAULT_AI_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
        }
    }
}

// Hand-written so the key never reaches the logs.
impl std::fmt::Debug for AssistConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub assist: AssistConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
                frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            },
            rate_limit: RateLimitConfig::default(),
            assist: AssistConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("BACKEND_PORT") {
            Some(value) => parse_var("BACKEND_PORT", value)?,
            None => match get("PORT") {
                Some(value) => parse_var("PORT", value)?,
                None => DEFAULT_PORT,
            },
        };

        let window_ms: u64 = get("RATE_LIMIT_WINDOW_MS")
            .map(|v| parse_positive("RATE_LIMIT_WINDOW_MS", v))
            .transpose()?
            .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_MS);
        let max_requests: u32 = get("RATE_LIMIT_MAX_REQUESTS")
            .map(|v| parse_positive("RATE_LIMIT_MAX_REQUESTS", v))
            .transpose()?
            .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS);
        let timeout_secs: u64 = get("TILES_AI_TIMEOUT_SECS")
            .map(|v| parse_positive("TILES_AI_TIMEOUT_SECS", v))
            .transpose()?
            .unwrap_or(DEFAULT_AI_TIMEOUT_SECS);

        Ok(Self {
            server: ServerConfig {
                host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
                frontend_url: get("FRONTEND_URL")
                    .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            },
            rate_limit: RateLimitConfig {
                window: Duration::from_millis(window_ms),
                max_requests,
            },
            assist: AssistConfig {
                api_key: get("TILES_AI_API_KEY"),
                base_url: get("TILES_AI_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_string()),
                model: get("TILES_AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_var<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        name,
        reason: e.to_string(),
        value,
    })
}

fn parse_positive<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
    T::Err: std::fmt::Display,
{
    let parsed: T = parse_var(name, value.clone())?;
    if parsed == T::default() {
        return Err(ConfigError::InvalidValue {
            name,
            value,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(parsed)
}
