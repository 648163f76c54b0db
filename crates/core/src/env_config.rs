//! Environment variable helpers with warn-level logging for invalid values.

use std::time::Duration;

use crate::constants::{DEFAULT_QUERY_TIMEOUT_SECS, QUERY_TIMEOUT_ENV};

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Read a non-empty string variable. Empty values count as unset.
#[must_use]
pub fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

/// Per-window query timeout, overridable through the environment.
#[must_use]
pub fn query_timeout() -> Duration {
    let secs = env_parse_with_default(QUERY_TIMEOUT_ENV, DEFAULT_QUERY_TIMEOUT_SECS);
    if secs == 0 {
        tracing::warn!(var = QUERY_TIMEOUT_ENV, "zero query timeout, using default");
        return Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS);
    }
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns a distinct variable name so parallel tests never race.
    fn set(var: &str, value: &str) {
        unsafe { std::env::set_var(var, value) };
    }

    fn unset(var: &str) {
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn test_env_parse_valid_value() {
        let var_name = "TEST_P2I_ENV_PARSE_VALID_1201";
        set(var_name, "42");
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 42);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_invalid_value() {
        let var_name = "TEST_P2I_ENV_PARSE_INVALID_1202";
        set(var_name, "banana");
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_missing_var() {
        let var_name = "TEST_P2I_ENV_PARSE_MISSING_1203";
        unset(var_name);
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_env_non_empty_treats_empty_as_unset() {
        let var_name = "TEST_P2I_ENV_NON_EMPTY_1204";
        set(var_name, "");
        assert_eq!(env_non_empty(var_name), None);
        set(var_name, "admin");
        assert_eq!(env_non_empty(var_name).as_deref(), Some("admin"));
        unset(var_name);
    }
}
