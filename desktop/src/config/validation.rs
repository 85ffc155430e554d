//! Setting value validation.

use super::defaults::{
    DEFAULT_STALE_TIME_SECS, MAX_STALE_TIME_SECS, NOTIFICATIONS_ENABLED, PUSH_DEBUG,
    REDUCE_REFETCH,
};

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        DEFAULT_STALE_TIME_SECS => validate_int_range(value, 1, 24 * 60 * 60)?,
        MAX_STALE_TIME_SECS => validate_int_range(value, 60, 7 * 24 * 60 * 60)?,
        k if is_boolean_setting(k) => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: u64, max: u64) -> Result<(), String> {
    let v: u64 = value.parse().map_err(|_| "must be a non-negative integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn is_boolean_setting(key: &str) -> bool {
    matches!(key, NOTIFICATIONS_ENABLED | REDUCE_REFETCH | PUSH_DEBUG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_boolean() {
        assert!(validate_setting(REDUCE_REFETCH, "true").is_ok());
        assert!(validate_setting(REDUCE_REFETCH, "false").is_ok());
        assert!(validate_setting(REDUCE_REFETCH, "yes").is_err());
        assert!(validate_setting(NOTIFICATIONS_ENABLED, "").is_err());
    }

    #[test]
    fn test_valid_stale_times() {
        assert!(validate_setting(DEFAULT_STALE_TIME_SECS, "600").is_ok());
        assert!(validate_setting(DEFAULT_STALE_TIME_SECS, "0").is_err());
        assert!(validate_setting(DEFAULT_STALE_TIME_SECS, "-5").is_err());
        assert!(validate_setting(DEFAULT_STALE_TIME_SECS, "ten").is_err());
        assert!(validate_setting(MAX_STALE_TIME_SECS, "21600").is_ok());
        assert!(validate_setting(MAX_STALE_TIME_SECS, "30").is_err());
    }

    #[test]
    fn test_unknown_keys_pass() {
        assert!(validate_setting("SOMETHING_ELSE", "anything").is_ok());
    }
}
