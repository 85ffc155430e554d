//! Runtime application configuration loaded from DB + environment overrides.

use std::time::Duration;

use query_freshness::StalenessPolicy;

use super::defaults::{
    DEFAULT_STALE_TIME_SECS, MAX_STALE_TIME_SECS, NOTIFICATIONS_ENABLED, PUSH_DEBUG,
    REDUCE_REFETCH,
};
use super::manager::SettingsManager;

/// Runtime configuration populated from the settings DB.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub notifications_enabled: bool,
    pub reduce_refetch: bool,
    pub default_stale_time_secs: u64,
    pub max_stale_time_secs: u64,
    pub push_debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            reduce_refetch: false,
            default_stale_time_secs: 600,
            max_stale_time_secs: 21_600,
            push_debug: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the settings manager (DB-first, env overrides).
    pub fn load(sm: &SettingsManager) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> String { sm.get_setting(key).unwrap_or_default() };
        let defaults = Self::default();

        // Environment variable overrides for troubleshooting a single run
        let notifications_enabled = std::env::var(NOTIFICATIONS_ENABLED)
            .map(|v| v == "true")
            .unwrap_or_else(|_| g(NOTIFICATIONS_ENABLED) == "true");
        let push_debug = std::env::var(PUSH_DEBUG)
            .map(|v| v == "true")
            .unwrap_or_else(|_| g(PUSH_DEBUG) == "true");

        let default_stale_time_secs =
            parse_u64(&g(DEFAULT_STALE_TIME_SECS), defaults.default_stale_time_secs);
        let mut max_stale_time_secs =
            parse_u64(&g(MAX_STALE_TIME_SECS), defaults.max_stale_time_secs);
        if max_stale_time_secs < default_stale_time_secs {
            tracing::warn!(
                "{MAX_STALE_TIME_SECS} ({max_stale_time_secs}) is below \
                 {DEFAULT_STALE_TIME_SECS} ({default_stale_time_secs}); using the latter"
            );
            max_stale_time_secs = default_stale_time_secs;
        }

        Ok(Self {
            notifications_enabled,
            reduce_refetch: g(REDUCE_REFETCH) == "true",
            default_stale_time_secs,
            max_stale_time_secs,
            push_debug,
        })
    }

    /// Reload config from the settings manager.
    pub fn reload(&mut self, sm: &SettingsManager) -> Result<(), anyhow::Error> {
        *self = Self::load(sm)?;
        Ok(())
    }

    pub fn staleness_policy(&self) -> StalenessPolicy {
        StalenessPolicy {
            default_stale_time: Duration::from_secs(self.default_stale_time_secs),
            max_stale_time: Duration::from_secs(self.max_stale_time_secs),
            reduce_refetch: self.reduce_refetch,
        }
    }
}

fn parse_u64(s: &str, default: u64) -> u64 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}
