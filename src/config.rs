//! Environment configuration helpers.
//!
//! Every config struct has a `Default` and a `from_env()`; a variable that is
//! set but unparsable falls back to the default with a warning.

use std::str::FromStr;

use tracing::warn;

/// Parse `key` as `T`. `None` if unset or invalid.
pub(crate) fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}, using default", key, raw);
            None
        }
    }
}

/// Read `key` as a boolean flag (`1`/`true`/`yes`, `0`/`false`/`no`).
pub(crate) fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => {
            warn!("Ignoring invalid {}={:?}, using default", key, raw);
            None
        }
    }
}
