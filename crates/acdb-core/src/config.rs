use crate::app_config::{AppConfig, Environment, ScraperConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load only the scraper settings, so a dry-run collect works without
/// `DATABASE_URL`.
///
/// # Errors
///
/// Returns `ConfigError` if a scraper env var is set to an invalid value.
pub fn load_scraper_config() -> Result<ScraperConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_scraper_config(|key| std::env::var(key))
}

fn build_scraper_config<F>(lookup: F) -> Result<ScraperConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let var = "ACDB_SCRAPER_REQUEST_TIMEOUT_SECS";
    let request_timeout_secs = lookup(var)
        .unwrap_or_else(|_| "30".to_string())
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
    let user_agent = lookup("ACDB_SCRAPER_USER_AGENT")
        .unwrap_or_else(|_| "acdb/0.1 (+price-monitor)".to_string());

    Ok(ScraperConfig {
        request_timeout_secs,
        user_agent,
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("ACDB_ENV", "development"))?;

    let bind_addr = parse_addr("ACDB_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("ACDB_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("ACDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("ACDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("ACDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper = build_scraper_config(&lookup)?;

    let scrape_cron = or_default("ACDB_SCRAPE_CRON", "0 0 * * * *");
    if scrape_cron.split_whitespace().count() != 6 {
        return Err(invalid(
            "ACDB_SCRAPE_CRON",
            "expected six space-separated fields (sec min hour day month weekday)".to_string(),
        ));
    }
    let scrape_on_startup = parse_bool("ACDB_SCRAPE_ON_STARTUP", "true")?;
    let status_push_interval_secs = parse_u64("ACDB_STATUS_PUSH_INTERVAL_SECS", "2")?;
    if status_push_interval_secs == 0 {
        return Err(invalid(
            "ACDB_STATUS_PUSH_INTERVAL_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs: scraper.request_timeout_secs,
        scraper_user_agent: scraper.user_agent,
        scrape_cron,
        scrape_on_startup,
        status_push_interval_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ACDB_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
