//! Events sent from Rust into the main window's UI.

use serde::{Deserialize, Serialize};

pub const NAVIGATE_ENTRY: &str = "navigateEntry";

/// Opens an entry in the main window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationPayload {
    pub feed_id: String,
    pub entry_id: String,
    pub view: i64,
}
