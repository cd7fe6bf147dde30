use anyhow::{bail, Context, Result};

use crate::quiz::gate::DEFAULT_UNLOCK_INTERVAL_HOURS;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub db_max_connections: u32,
    /// Delay between quiz unlocks in the progression chain.
    pub unlock_interval_hours: i64,
    pub leaderboard_limit: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            unlock_interval_hours: check_unlock_interval(parse_env(
                "UNLOCK_INTERVAL_HOURS",
                DEFAULT_UNLOCK_INTERVAL_HOURS,
            )?)?,
            leaderboard_limit: parse_env("LEADERBOARD_LIMIT", 20)?,
        })
    }
}

/// One year. Keeps `chrono::Duration::hours` well inside its range.
const MAX_UNLOCK_INTERVAL_HOURS: i64 = 24 * 365;

fn check_unlock_interval(hours: i64) -> Result<i64> {
    if !(0..=MAX_UNLOCK_INTERVAL_HOURS).contains(&hours) {
        bail!("UNLOCK_INTERVAL_HOURS must be between 0 and {MAX_UNLOCK_INTERVAL_HOURS}, got {hours}");
    }
    Ok(hours)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
