//! Invocation parameter validators.
//!
//! Pure functions only. They are wired into clap as value parsers, so a bad
//! value stops the process before any topology is built or torn down.

use std::num::IntErrorKind;
use std::sync::LazyLock;

use r8s_topology::synth::MAX_REPLICAS;
use regex::Regex;

use crate::domain::error::ParamError;

static PROJECT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("valid regex")
});

/// Parse a replica count: a whole number in `1..=MAX_REPLICAS`.
///
/// # Errors
///
/// Returns [`ParamError::NotANumber`] for non-numeric input,
/// [`ParamError::NotPositive`] for zero or negative values and
/// [`ParamError::TooLarge`] past the port range.
pub fn parse_replicas(raw: &str) -> Result<u16, ParamError> {
    let trimmed = raw.trim();
    let value = match trimmed.parse::<i64>() {
        Ok(v) => v,
        Err(e) => {
            return Err(match e.kind() {
                IntErrorKind::PosOverflow => ParamError::TooLarge {
                    got: trimmed.to_string(),
                    max: MAX_REPLICAS,
                },
                IntErrorKind::NegOverflow => ParamError::NotPositive(trimmed.to_string()),
                _ => ParamError::NotANumber(raw.to_string()),
            });
        }
    };
    if value < 1 {
        return Err(ParamError::NotPositive(trimmed.to_string()));
    }
    match u16::try_from(value) {
        Ok(n) if n <= MAX_REPLICAS => Ok(n),
        _ => Err(ParamError::TooLarge {
            got: trimmed.to_string(),
            max: MAX_REPLICAS,
        }),
    }
}

/// Validate a compose project name.
///
/// # Errors
///
/// Returns [`ParamError::InvalidProject`] unless the name is lowercase
/// alphanumerics, `-` and `_`, starting with an alphanumeric.
pub fn validate_project_name(raw: &str) -> Result<String, ParamError> {
    if PROJECT_NAME_RE.is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err(ParamError::InvalidProject(raw.to_string()))
    }
}
