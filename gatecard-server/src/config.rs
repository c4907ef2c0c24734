//! Relay configuration loaded from the environment.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use gatecard_core::CardOptions;

/// Destination Feishu bot webhook.
pub const WEBHOOK_ENV: &str = "FEISHU_WEBHOOK";
/// Listen address.
pub const HOST_ENV: &str = "HOST";
/// Listen port.
pub const PORT_ENV: &str = "PORT";
/// Outbound request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "FEISHU_TIMEOUT_SECS";
/// Offset used to render analysis timestamps, e.g. `+08:00`.
pub const UTC_OFFSET_ENV: &str = "CARD_UTC_OFFSET";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    key: &'static str,
    value: String,
    reason: &'static str,
}

impl ConfigError {
    fn new(key: &'static str, value: &str, reason: &'static str) -> Self {
        Self {
            key,
            value: value.to_string(),
            reason,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}: {}", self.key, self.value, self.reason)
    }
}

impl std::error::Error for ConfigError {}

/// Runtime configuration for the relay.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Feishu webhook; `None` disables delivery.
    pub webhook_url: Option<String>,
    /// Bound on each outbound delivery.
    pub timeout: Duration,
    /// Card formatting options.
    pub card_options: CardOptions,
}

impl RelayConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match present(PORT_ENV) {
            Some(raw) => u16::from_str(&raw)
                .map_err(|_| ConfigError::new(PORT_ENV, &raw, "must be a u16 number"))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match present(TIMEOUT_ENV) {
            Some(raw) => u64::from_str(&raw)
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ConfigError::new(TIMEOUT_ENV, &raw, "must be a positive number of seconds")
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let mut card_options = CardOptions::default();
        if let Some(raw) = present(UTC_OFFSET_ENV) {
            card_options.utc_offset = parse_utc_offset(&raw)
                .ok_or_else(|| ConfigError::new(UTC_OFFSET_ENV, &raw, "must look like +08:00"))?;
        }

        Ok(Self {
            host: present(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            webhook_url: present(WEBHOOK_ENV),
            timeout: Duration::from_secs(timeout_secs),
            card_options,
        })
    }
}

/// Parse `+HH:MM`, `-HHMM` or `+HH` into a fixed offset.
fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|ch| *ch != ':').collect();
    if !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.as_str(), "00"),
        4 => digits.split_at(2),
        _ => return None,
    };
    let hours = i32::from_str(hours).ok()?;
    let minutes = i32::from_str(minutes).ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
