//! SettingsManager: DB-backed settings with defaults and env migration.

use std::collections::HashMap;

use push_store::Database;

use super::SettingInfo;
use super::defaults::DEFAULT_SETTINGS;
use super::validation::validate_setting;

const SETTING_TYPE: &str = "normal";

/// Wraps [`Database`] to provide high-level settings operations.
pub struct SettingsManager {
    db: Database,
}

impl SettingsManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a setting value. Falls back to default if not in DB.
    pub fn get_setting(&self, key: &str) -> Result<String, anyhow::Error> {
        if let Some(val) = self.db.get_setting(key)? {
            return Ok(val);
        }
        if let Some(def) = DEFAULT_SETTINGS.get(key) {
            return Ok(def.default.to_string());
        }
        anyhow::bail!("setting not found: {key}");
    }

    /// Set a setting value with validation.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        if !DEFAULT_SETTINGS.contains_key(key) {
            anyhow::bail!("unknown setting key: {key}");
        }
        validate_setting(key, value)
            .map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))?;

        self.db.set_setting(key, value, SETTING_TYPE)?;
        Ok(())
    }

    /// Get all settings, filling in defaults for missing keys.
    pub fn get_all_settings(&self) -> Result<HashMap<String, SettingInfo>, anyhow::Error> {
        let db_settings = self.db.get_all_settings()?;
        let mut result = HashMap::new();

        for (key, def) in DEFAULT_SETTINGS.iter() {
            let value = db_settings
                .get(*key)
                .cloned()
                .unwrap_or_else(|| def.default.to_string());
            result.insert(
                key.to_string(),
                SettingInfo {
                    key: key.to_string(),
                    has_value: !value.is_empty(),
                    value,
                    description: def.description.to_string(),
                },
            );
        }

        // Keys written by an older build stay visible.
        for (key, value) in db_settings {
            result.entry(key.clone()).or_insert_with(|| SettingInfo {
                key,
                has_value: !value.is_empty(),
                value,
                description: String::new(),
            });
        }

        Ok(result)
    }

    /// Initialize default settings in DB (skip existing).
    pub fn initialize_defaults(&self) -> Result<(), anyhow::Error> {
        for (key, def) in DEFAULT_SETTINGS.iter() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            self.db.set_setting(key, def.default, SETTING_TYPE)?;
        }
        Ok(())
    }

    /// Migrate settings from environment variables to DB (one-time).
    pub fn migrate_from_env(&self) -> Result<u32, anyhow::Error> {
        self.migrate_from(|key| std::env::var(key).ok())
    }

    fn migrate_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<u32, anyhow::Error> {
        let mut migrated = 0u32;
        for key in DEFAULT_SETTINGS.keys() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            let Some(env_val) = lookup(*key).filter(|v| !v.is_empty()) else {
                continue;
            };
            if let Err(e) = validate_setting(key, &env_val) {
                tracing::warn!("Ignoring invalid env value for {key}: {e}");
                continue;
            }
            self.db.set_setting(key, &env_val, SETTING_TYPE)?;
            tracing::info!("Migrated setting from env: {key}");
            migrated += 1;
        }
        if migrated > 0 {
            tracing::info!("Migration completed: {migrated} settings migrated");
        }
        Ok(migrated)
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::{DEFAULT_STALE_TIME_SECS, REDUCE_REFETCH};

    fn manager() -> SettingsManager {
        SettingsManager::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn get_falls_back_to_default() {
        let sm = manager();
        assert_eq!(sm.get_setting(REDUCE_REFETCH).unwrap(), "false");
        assert!(sm.get_setting("NOPE").is_err());
    }

    #[test]
    fn set_validates() {
        let sm = manager();
        sm.set_setting(REDUCE_REFETCH, "true").unwrap();
        assert_eq!(sm.get_setting(REDUCE_REFETCH).unwrap(), "true");

        assert!(sm.set_setting(REDUCE_REFETCH, "maybe").is_err());
        assert!(sm.set_setting("UNKNOWN_KEY", "1").is_err());
        assert_eq!(sm.get_setting(REDUCE_REFETCH).unwrap(), "true");
    }

    #[test]
    fn initialize_defaults_keeps_existing() {
        let sm = manager();
        sm.set_setting(DEFAULT_STALE_TIME_SECS, "120").unwrap();
        sm.initialize_defaults().unwrap();

        assert_eq!(sm.get_setting(DEFAULT_STALE_TIME_SECS).unwrap(), "120");
        let stored = sm.db().get_all_settings().unwrap();
        assert_eq!(stored.len(), DEFAULT_SETTINGS.len());
    }

    #[test]
    fn get_all_settings_fills_defaults() {
        let sm = manager();
        sm.db().set_setting("LEGACY_KEY", "x", "normal").unwrap();
        let all = sm.get_all_settings().unwrap();
        assert_eq!(all.len(), DEFAULT_SETTINGS.len() + 1);
        assert_eq!(all[REDUCE_REFETCH].value, "false");
        assert!(!all[REDUCE_REFETCH].description.is_empty());
        assert_eq!(all["LEGACY_KEY"].value, "x");
    }

    #[test]
    fn migration_skips_stored_and_invalid_values() {
        let sm = manager();
        sm.set_setting(REDUCE_REFETCH, "false").unwrap();
        let env: HashMap<&str, &str> = [
            (REDUCE_REFETCH, "true"),
            (DEFAULT_STALE_TIME_SECS, "900"),
            ("PUSH_DEBUG", "loud"),
        ]
        .into_iter()
        .collect();

        let migrated = sm
            .migrate_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(migrated, 1);
        assert_eq!(sm.get_setting(REDUCE_REFETCH).unwrap(), "false");
        assert_eq!(sm.get_setting(DEFAULT_STALE_TIME_SECS).unwrap(), "900");
        assert_eq!(sm.db().get_setting("PUSH_DEBUG").unwrap(), None);
    }
}
