//! CLI argument validation utilities
//!
//! Value parsers shared by clap and the TOML loader, so a value is checked
//! the same way whichever source supplied it.

use reqwest::Url;
use std::time::Duration;

/// Validate positive integer value
pub fn validate_positive_int(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

/// Parse a duration such as `90s`, `5m`, `1h`, `250ms`; a bare number is seconds
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim().to_ascii_lowercase();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("'{}' is not a valid duration (try 90s, 5m or 1h)", value))?;
    let scaled = |factor: u64| {
        amount
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("'{}' is too large a duration", value))
    };
    let duration = match unit.trim() {
        "ms" => Duration::from_millis(amount),
        "" | "s" | "sec" | "secs" => Duration::from_secs(amount),
        "m" | "min" | "mins" => scaled(60)?,
        "h" | "hr" | "hrs" => scaled(3600)?,
        other => {
            return Err(format!(
                "unknown duration unit '{}' in '{}' (use ms, s, m or h)",
                other, value
            ))
        }
    };

    if duration.is_zero() {
        return Err("Duration must be greater than 0".to_string());
    }
    Ok(duration)
}

/// Validate glob pattern syntax
pub fn validate_glob_pattern(pattern: &str) -> Result<glob::Pattern, String> {
    glob::Pattern::new(pattern).map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))
}

/// Validate the hosting base URL and drop any trailing slash
pub fn validate_base_url(value: &str) -> Result<String, String> {
    let url =
        Url::parse(value.trim()).map_err(|e| format!("'{}' is not a valid URL: {}", value, e))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!(
            "'{}' must use http or https (found '{}')",
            value,
            url.scheme()
        ));
    }
    if url.host_str().is_none() {
        return Err(format!("'{}' has no host", value));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Split comma-separated entries, trimming and dropping blanks and repeats
pub fn split_comma_separated(values: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for part in values.iter().flat_map(|v| v.split(',')) {
        let part = part.trim();
        if !part.is_empty() && !result.iter().any(|existing| existing == part) {
            result.push(part.to_string());
        }
    }
    result
}

/// Mask a credential for display, keeping at most the last four characters
pub fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count < 12 {
        return "****".to_string();
    }
    let tail: String = token.chars().skip(count - 4).collect();
    format!("****{}", tail)
}
