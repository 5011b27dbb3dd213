use crate::app_config::AppConfig;
use crate::ConfigError;

pub(crate) const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
pub(crate) const DEFAULT_USER_AGENT: &str = "courtwatch/0.1 (availability-check)";

/// Load application configuration from environment variables already in the process.
///
/// `.env` files are not read here; the binary loads them once at startup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let request_timeout_secs = match lookup("COURTWATCH_REQUEST_TIMEOUT_SECS") {
        Ok(raw) => Some(
            raw.parse::<u64>()
                .map_err(|e| invalid("COURTWATCH_REQUEST_TIMEOUT_SECS", e.to_string()))?,
        ),
        Err(_) => None,
    };

    let max_concurrent_requests = or_default("COURTWATCH_MAX_CONCURRENT_REQUESTS", "1")
        .parse::<usize>()
        .map_err(|e| invalid("COURTWATCH_MAX_CONCURRENT_REQUESTS", e.to_string()))?;
    if max_concurrent_requests == 0 {
        return Err(invalid(
            "COURTWATCH_MAX_CONCURRENT_REQUESTS",
            "must be at least 1".to_string(),
        ));
    }

    let config_path = PathBuf::from(or_default("COURTWATCH_CONFIG_PATH", DEFAULT_CONFIG_PATH));
    let log_level = or_default("COURTWATCH_LOG_LEVEL", "info");
    let user_agent = or_default("COURTWATCH_USER_AGENT", DEFAULT_USER_AGENT);

    Ok(AppConfig {
        config_path,
        log_level,
        request_timeout_secs,
        user_agent,
        max_concurrent_requests,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
