use crate::app_config::{AppConfig, Environment};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

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
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("BRANDPULSE_ENV", "development"));

    let bind_addr = parse_addr("BRANDPULSE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("BRANDPULSE_LOG_LEVEL", "info");

    let classifier_base_url = or_default("CLASSIFIER_BASE_URL", "https://api.x.ai/v1");
    let classifier_api_key = lookup("CLASSIFIER_API_KEY").ok();
    let classifier_model = or_default("CLASSIFIER_MODEL", "grok-beta");
    let classifier_timeout_secs = parse_u64("CLASSIFIER_TIMEOUT_SECS", "30")?;

    let news_api_key = lookup("NEWS_API_KEY").ok();
    let youtube_api_key = lookup("YOUTUBE_API_KEY").ok();
    let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN").ok();
    let telegram_base_url = or_default("TELEGRAM_BASE_URL", "https://api.telegram.org");
    let email_api_key = lookup("EMAIL_API_KEY").ok();
    let email_base_url = or_default("EMAIL_BASE_URL", "https://api.resend.com");
    let email_from = or_default(
        "EMAIL_FROM",
        "BrandPulse <alerts@brandpulse.app>",
    );

    let db_max_connections = parse_u32("BRANDPULSE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BRANDPULSE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BRANDPULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let collector_request_timeout_secs = parse_u64("BRANDPULSE_COLLECTOR_TIMEOUT_SECS", "30")?;
    let collector_user_agent = or_default(
        "BRANDPULSE_COLLECTOR_USER_AGENT",
        "brandpulse/0.1 (brand-monitoring)",
    );

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        classifier_base_url,
        classifier_api_key,
        classifier_model,
        classifier_timeout_secs,
        news_api_key,
        youtube_api_key,
        telegram_bot_token,
        telegram_base_url,
        email_api_key,
        email_base_url,
        email_from,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        collector_request_timeout_secs,
        collector_user_agent,
    })
}

fn parse_environment(raw: &str) -> Environment {
    match raw.to_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
