//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

pub const NOTIFICATIONS_ENABLED: &str = "NOTIFICATIONS_ENABLED";
pub const REDUCE_REFETCH: &str = "REDUCE_REFETCH";
pub const DEFAULT_STALE_TIME_SECS: &str = "DEFAULT_STALE_TIME_SECS";
pub const MAX_STALE_TIME_SECS: &str = "MAX_STALE_TIME_SECS";
pub const PUSH_DEBUG: &str = "PUSH_DEBUG";

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    (
        NOTIFICATIONS_ENABLED,
        "true",
        "Receive push notifications for new entries",
    ),
    (
        REDUCE_REFETCH,
        "false",
        "Keep cached data for longer before refetching",
    ),
    (
        DEFAULT_STALE_TIME_SECS,
        "600",
        "Seconds out of sight before cached data is refetched",
    ),
    (
        MAX_STALE_TIME_SECS,
        "21600",
        "Stale time used when REDUCE_REFETCH is on",
    ),
    (PUSH_DEBUG, "false", "Verbose push session logging"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
