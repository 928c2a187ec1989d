//! Environment configuration helpers

use std::str::FromStr;
use thiserror::Error;

/// Error raised when an environment variable is present but unusable
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value for {key}: '{value}' ({detail})")]
pub struct EnvError {
    pub key: String,
    pub value: String,
    pub detail: String,
}

/// Read a non-empty environment variable
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse an environment variable.
///
/// Returns `Ok(None)` when the variable is unset or blank, and an error when it
/// is set to something that does not parse.
pub fn env_parse<T>(key: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|e| EnvError {
            key: key.to_string(),
            value,
            detail: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable_is_none() {
        let parsed: Result<Option<f64>, _> = env_parse("PORTFOLIO_UTILS_TEST_UNSET_VARIABLE");
        assert_eq!(parsed, Ok(None));
    }

    #[test]
    fn test_error_display() {
        let err = EnvError {
            key: "PORTFOLIO_FX_RATE".to_string(),
            value: "abc".to_string(),
            detail: "invalid float literal".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for PORTFOLIO_FX_RATE: 'abc' (invalid float literal)"
        );
    }
}
