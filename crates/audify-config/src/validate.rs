//! Parsing helpers shared by the loader.

use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::LinkPolicy;

/// Parse an absolute `http`/`https` URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a URL, uses a
/// different scheme, or has no host.
pub fn parse_http_url(key: &'static str, value: &str) -> ConfigResult<Url> {
    let url = Url::parse(value.trim())
        .map_err(|err| ConfigError::invalid(key, value, format!("not a valid URL: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(key, value, "scheme must be http or https"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::invalid(key, value, "URL must include a host"));
    }
    Ok(url)
}

/// Parse a strictly positive number of seconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric or zero values.
pub fn parse_seconds(key: &'static str, value: &str) -> ConfigResult<Duration> {
    parse_positive(key, value).map(Duration::from_secs)
}

/// Parse a strictly positive number of milliseconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-numeric or zero values.
pub fn parse_millis(key: &'static str, value: &str) -> ConfigResult<Duration> {
    parse_positive(key, value).map(Duration::from_millis)
}

/// Parse a link validation policy.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for unknown policy names.
pub fn parse_link_policy(key: &'static str, value: &str) -> ConfigResult<LinkPolicy> {
    value
        .parse::<LinkPolicy>()
        .map_err(|reason| ConfigError::invalid(key, value, reason))
}

fn parse_positive(key: &'static str, value: &str) -> ConfigResult<u64> {
    let parsed = value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(key, value, "must be a positive integer"))?;
    if parsed == 0 {
        return Err(ConfigError::invalid(key, value, "must be greater than zero"));
    }
    Ok(parsed)
}
