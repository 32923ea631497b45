use chrono::Duration;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Signing secret used when `JWT_SECRET_KEY` is unset. Never deploy with it.
pub const DEFAULT_JWT_SECRET: &str = "super_jwt_secret";

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

#[derive(Debug, Error)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Process-wide settings, read once at startup and handed to constructors.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let ttl_minutes = parse_var(&lookup, "TOKEN_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?;
        let bcrypt_cost = parse_var(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("users.db")),
            jwt_secret: lookup("JWT_SECRET_KEY").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            token_ttl: Duration::minutes(ttl_minutes),
            bcrypt_cost,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError { var, value }),
        None => Ok(default),
    }
}
