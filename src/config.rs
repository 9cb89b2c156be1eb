/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, APP_ENV, HTTP 制限値, 認証スキームの prefix)
 * - 設定値のバリデーション (不正なら起動失敗)
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::auth::{OTT_PREFIX, PRIMARY_PREFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Transport-level limits applied by `middleware::http`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLimits {
    pub body_limit_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            body_limit_bytes: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub http: HttpLimits,

    // Scheme A is always tried before scheme B
    pub primary_prefix: String,
    pub ott_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading keys through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let defaults = HttpLimits::default();
        let http = HttpLimits {
            body_limit_bytes: positive(&lookup, "HTTP_BODY_LIMIT_BYTES")?
                .unwrap_or(defaults.body_limit_bytes),
            request_timeout: positive(&lookup, "HTTP_TIMEOUT_SECONDS")?
                .map(|secs| Duration::from_secs(secs as u64))
                .unwrap_or(defaults.request_timeout),
        };

        let primary_prefix = prefix(&lookup, "AUTH_PRIMARY_PREFIX", PRIMARY_PREFIX)?;
        let ott_prefix = prefix(&lookup, "AUTH_OTT_PREFIX", OTT_PREFIX)?;

        Ok(Self {
            addr,
            app_env,
            http,
            primary_prefix,
            ott_prefix,
        })
    }
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<usize>, ConfigError> {
    match lookup(key) {
        Some(v) => match v.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(ConfigError::Invalid(key)),
        },
        None => Ok(None),
    }
}

fn prefix(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<String, ConfigError> {
    match lookup(key) {
        // an empty prefix would accept every credential
        Some(v) if v.trim().is_empty() => Err(ConfigError::Invalid(key)),
        Some(v) => Ok(v),
        None => Ok(default.to_string()),
    }
}
