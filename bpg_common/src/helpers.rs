use std::{env, time::Duration};

use log::*;

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Reads a boolean flag from the environment variable `name`.
pub fn env_flag(name: &str, default: bool) -> bool {
    parse_boolean_flag(env::var(name).ok(), default)
}

/// Reads a duration, expressed in whole seconds, from the environment variable `name`.
///
/// Missing or invalid values fall back to `default` and are logged.
pub fn env_duration_secs(name: &str, default: Duration) -> Duration {
    match env::var(name) {
        Ok(s) => s.trim().parse::<u64>().map(Duration::from_secs).unwrap_or_else(|e| {
            warn!("🪛️ Invalid configuration value for {name} ({s}). {e}. Using {} s instead.", default.as_secs());
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default value of {} s.", default.as_secs());
            default
        },
    }
}

/// Splits a comma-separated list, dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}
