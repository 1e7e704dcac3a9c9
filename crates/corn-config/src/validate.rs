//! Parsing helpers for configuration values.

use std::net::IpAddr;

use crate::error::{ConfigError, ConfigResult};

/// Parse a boolean flag, accepting the common textual spellings.
///
/// Returns `None` when the value is not recognised so callers can fall back
/// to their default.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a TCP port in the range `1..=65535`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a valid port.
pub fn parse_port(field: &'static str, value: &str) -> ConfigResult<u16> {
    let port = value
        .trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidField {
            field,
            reason: "not_a_port",
            value: Some(value.to_string()),
        })?;
    if port == 0 {
        return Err(ConfigError::InvalidField {
            field,
            reason: "zero",
            value: Some(value.to_string()),
        });
    }
    Ok(port)
}

/// Parse an IP address used for the HTTP listener.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an IP address.
pub fn parse_bind_addr(field: &'static str, value: &str) -> ConfigResult<IpAddr> {
    value
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| ConfigError::InvalidField {
            field,
            reason: "not_an_ip_address",
            value: Some(value.to_string()),
        })
}

/// Split a whitespace-separated argument list.
#[must_use]
pub fn parse_args(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}
