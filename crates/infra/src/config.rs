//! Environment-based configuration loading.
//!
//! Invalid values are logged and replaced by defaults; configuration problems
//! never stop the process.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use jobguard_core::UniqueJobsConfig;

pub const ENV_DEFAULT_EXPIRATION_SECS: &str = "JOBGUARD_DEFAULT_EXPIRATION_SECS";
pub const ENV_CHECKS_RETRY_QUEUE: &str = "JOBGUARD_CHECKS_RETRY_QUEUE";
pub const ENV_KEY_PREFIX: &str = "JOBGUARD_KEY_PREFIX";
pub const ENV_UNIQUE_ARGS_ENABLED: &str = "JOBGUARD_UNIQUE_ARGS_ENABLED";
pub const ENV_REDIS_URL: &str = "REDIS_URL";

const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Load global defaults from the process environment.
pub fn from_env() -> UniqueJobsConfig {
    from_lookup(|key| std::env::var(key).ok())
}

/// Load global defaults through `lookup`.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> UniqueJobsConfig {
    let mut config = UniqueJobsConfig::default();

    if let Some(secs) = parse::<u64>(&lookup, ENV_DEFAULT_EXPIRATION_SECS) {
        config.default_expiration = Duration::from_secs(secs);
    }
    if let Some(checks) = parse_bool(&lookup, ENV_CHECKS_RETRY_QUEUE) {
        config.checks_retry_queue = checks;
    }
    if let Some(prefix) = lookup(ENV_KEY_PREFIX) {
        config.key_prefix = prefix;
    }
    if let Some(enabled) = parse_bool(&lookup, ENV_UNIQUE_ARGS_ENABLED) {
        config.unique_args_enabled = enabled;
    }

    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!(error = %e, "invalid uniqueness configuration; using defaults");
            UniqueJobsConfig::default()
        }
    }
}

/// Redis URL from `REDIS_URL`, defaulting to localhost.
pub fn redis_url() -> String {
    std::env::var(ENV_REDIS_URL).unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string())
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key = key, value = %raw, "ignoring unparsable configuration value");
            None
        }
    }
}

fn parse_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = lookup(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(key = key, value = %raw, "ignoring unparsable configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> UniqueJobsConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(load(&[]), UniqueJobsConfig::default());
    }

    #[test]
    fn reads_all_settings() {
        let config = load(&[
            (ENV_DEFAULT_EXPIRATION_SECS, "3600"),
            (ENV_CHECKS_RETRY_QUEUE, "true"),
            (ENV_KEY_PREFIX, "myapp_unique"),
            (ENV_UNIQUE_ARGS_ENABLED, "off"),
        ]);

        assert_eq!(config.default_expiration, Duration::from_secs(3600));
        assert!(config.checks_retry_queue);
        assert_eq!(config.key_prefix, "myapp_unique");
        assert!(!config.unique_args_enabled);
    }

    #[test]
    fn unparsable_values_fall_back() {
        let config = load(&[
            (ENV_DEFAULT_EXPIRATION_SECS, "soon"),
            (ENV_CHECKS_RETRY_QUEUE, "maybe"),
        ]);
        assert_eq!(config, UniqueJobsConfig::default());
    }

    #[test]
    fn invalid_combination_resets_to_defaults() {
        let config = load(&[
            (ENV_DEFAULT_EXPIRATION_SECS, "0"),
            (ENV_CHECKS_RETRY_QUEUE, "true"),
        ]);
        assert_eq!(config, UniqueJobsConfig::default());
    }
}
