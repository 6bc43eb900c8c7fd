//! Shared configuration and input validation helpers.
//!
//! Notifier configs call these before any session is opened so that a blank
//! credential or malformed phone number fails the run up front.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// E.164: a leading `+`, a non-zero country digit, 8 to 15 digits in total.
const E164_PATTERN: &str = r"^\+[1-9]\d{7,14}$";

static E164_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(E164_PATTERN).expect("valid regex"));

/// Require a non-blank setting, returning it trimmed.
pub fn require_non_empty<'a>(value: &'a str, name: &str) -> Result<&'a str, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Config(format!("{name} must not be empty")));
    }
    Ok(trimmed)
}

/// Validate that a phone number is in E.164 form (e.g. `+966501234567`).
pub fn validate_e164(number: &str, name: &str) -> Result<(), CoreError> {
    let number = require_non_empty(number, name)?;
    if !E164_RE.is_match(number) {
        return Err(CoreError::Config(format!(
            "{name} must be an E.164 phone number like +966501234567, got '{number}'"
        )));
    }
    Ok(())
}

/// Validate that a numeric input is finite and not negative.
pub fn validate_non_negative(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}
