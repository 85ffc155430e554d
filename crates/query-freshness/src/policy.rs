use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(10 * 60);
pub const MAX_STALE_TIME: Duration = Duration::from_secs(6 * 60 * 60);

/// How long cached data stays fresh while the app is out of sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StalenessPolicy {
    pub default_stale_time: Duration,
    pub max_stale_time: Duration,
    /// Users on metered connections trade freshness for fewer refetches.
    pub reduce_refetch: bool,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self {
            default_stale_time: DEFAULT_STALE_TIME,
            max_stale_time: MAX_STALE_TIME,
            reduce_refetch: false,
        }
    }
}

impl StalenessPolicy {
    pub fn stale_time(&self) -> Duration {
        if self.reduce_refetch {
            self.max_stale_time
        } else {
            self.default_stale_time
        }
    }
}
