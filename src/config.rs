//! Server configuration from environment variables: HOST, PORT, INACTIVITY_TIMEOUT_HOURS,
//! CLEANUP_INTERVAL_MINUTES. Missing or unparsable values fall back to defaults.

use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tournaments untouched for this long are dropped from memory.
    pub inactivity_timeout: Duration,
    pub cleanup_interval: Duration,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_inactivity_hours() -> u64 {
    12
}

fn default_cleanup_minutes() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            inactivity_timeout: Duration::from_secs(default_inactivity_hours() * 3600),
            cleanup_interval: Duration::from_secs(default_cleanup_minutes() * 60),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(default_host);
        let port = parse_or(&lookup, "PORT", default_port());
        let hours = parse_or(&lookup, "INACTIVITY_TIMEOUT_HOURS", default_inactivity_hours());
        let minutes =
            parse_or(&lookup, "CLEANUP_INTERVAL_MINUTES", default_cleanup_minutes()).max(1);
        Self {
            host,
            port,
            inactivity_timeout: scaled_secs(
                "INACTIVITY_TIMEOUT_HOURS",
                hours,
                3600,
                default_inactivity_hours(),
            ),
            cleanup_interval: scaled_secs(
                "CLEANUP_INTERVAL_MINUTES",
                minutes,
                60,
                default_cleanup_minutes(),
            ),
        }
    }
}

/// `value * unit` seconds, or the default when that does not fit in a u64.
fn scaled_secs(key: &str, value: u64, unit: u64, default: u64) -> Duration {
    let secs = value.checked_mul(unit).unwrap_or_else(|| {
        log::warn!("Ignoring {}={}: too large, using {}", key, value, default);
        default * unit
    });
    Duration::from_secs(secs)
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring {}={:?}: not a valid value, using {}", key, raw, default);
            default
        }),
    }
}
