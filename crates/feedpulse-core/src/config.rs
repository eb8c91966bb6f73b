use thiserror::Error;

use crate::app_config::{AppConfig, Environment};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let value = parse_num(var, default)?;
        u32::try_from(value).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("FEEDPULSE_ENV", "development"))?;
    let log_level = or_default("FEEDPULSE_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("FEEDPULSE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("FEEDPULSE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_num("FEEDPULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let mistral_api_key = lookup("MISTRAL_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let classifier_base_url = or_default("FEEDPULSE_CLASSIFIER_BASE_URL", "https://api.mistral.ai");
    let classifier_model = or_default("FEEDPULSE_CLASSIFIER_MODEL", "mistral-large-latest");
    let classifier_timeout_secs = parse_num("FEEDPULSE_CLASSIFIER_TIMEOUT_SECS", "30")?;

    let max_upload_items = usize::try_from(parse_num("FEEDPULSE_MAX_UPLOAD_ITEMS", "10")?)
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "FEEDPULSE_MAX_UPLOAD_ITEMS".to_string(),
            reason: e.to_string(),
        })?;
    if max_upload_items == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FEEDPULSE_MAX_UPLOAD_ITEMS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let fetch_url = or_default(
        "FEEDPULSE_FETCH_URL",
        "https://jsonplaceholder.typicode.com/comments",
    );
    let fetch_timeout_secs = parse_num("FEEDPULSE_FETCH_TIMEOUT_SECS", "15")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        mistral_api_key,
        classifier_base_url,
        classifier_model,
        classifier_timeout_secs,
        max_upload_items,
        fetch_url,
        fetch_timeout_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FEEDPULSE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}
