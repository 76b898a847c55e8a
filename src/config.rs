use std::{env, fmt::Display, str::FromStr};

use dotenvy::dotenv;

use crate::error::AppError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data.sqlite3";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub host: String,
    pub port: u16,
    /// Session lifetime in seconds.
    pub session_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,

    // Logging
    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            session_secret: "hiqode-secret-key-change-me".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            session_ttl: 8 * 60 * 60,
            rate_login_per_min: 60,
            log_dir: "logs".to_string(),
            log_level: tracing::Level::INFO,
        }
    }
}

impl Config {
    /// Every variable is optional; missing ones fall back to [`Config::default`].
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            session_secret: env::var("SESSION_SECRET").unwrap_or(defaults.session_secret),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            session_ttl: parse_var("SESSION_TTL", defaults.session_ttl)?,
            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", defaults.rate_login_per_min)?,
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: parse_var("LOG_LEVEL", defaults.log_level)?,
        })
    }

    pub fn server_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("invalid {key} value {raw:?}: {e}"))),
        _ => Ok(default),
    }
}
