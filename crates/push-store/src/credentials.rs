//! Rotating push credentials.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kv::{read_json, write_json};
use crate::{CREDENTIALS_KEY, Database, StoreError};

/// Backend-issued credential blob, stored and replayed as-is.
///
/// The layout belongs to the push backend. The token is only looked up to
/// put a redacted prefix in logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(Map<String, Value>);

impl Credentials {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The registration token, at `fcm.token` or a top-level `token`.
    pub fn token(&self) -> Option<&str> {
        self.0
            .get("fcm")
            .and_then(|fcm| fcm.get("token"))
            .or_else(|| self.0.get("token"))
            .and_then(Value::as_str)
    }

    /// Token prefix that is safe to put in logs.
    pub fn redacted_token(&self) -> String {
        match self.token() {
            Some(token) => {
                let prefix: String = token.chars().take(8).collect();
                format!("{prefix}***")
            }
            None => "<no token>".to_string(),
        }
    }
}

impl TryFrom<Value> for Credentials {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(blob) => Ok(Self(blob)),
            other => Err(StoreError::InvalidData(format!(
                "credentials must be a JSON object, got {other}"
            ))),
        }
    }
}

impl Database {
    pub fn load_credentials(&self) -> Result<Option<Credentials>, StoreError> {
        self.with_conn(|conn| read_json(conn, CREDENTIALS_KEY))
    }

    /// Replace the stored credentials. Returns only after the row is
    /// committed.
    pub fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
        if credentials.as_map().is_empty() {
            return Err(StoreError::InvalidData("empty credentials".into()));
        }
        self.with_conn(|conn| write_json(conn, CREDENTIALS_KEY, credentials))
    }
}
