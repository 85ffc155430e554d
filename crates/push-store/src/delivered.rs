//! Delivered message id set.
//!
//! Append-only: ids are never evicted, so the set grows for the lifetime
//! of the installation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::kv::{read_json, write_json};
use crate::{Database, PERSISTENT_IDS_KEY, StoreError};

/// Insertion-ordered set of message ids that were fully processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DeliveredIdSet {
    ids: Vec<String>,
    index: HashSet<String>,
}

impl DeliveredIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Returns `false` when the id was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.index.contains(&id) {
            return false;
        }
        self.index.insert(id.clone());
        self.ids.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.clone()
    }
}

impl From<Vec<String>> for DeliveredIdSet {
    fn from(ids: Vec<String>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<DeliveredIdSet> for Vec<String> {
    fn from(set: DeliveredIdSet) -> Self {
        set.ids
    }
}

impl FromIterator<String> for DeliveredIdSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl Database {
    pub fn load_delivered_ids(&self) -> Result<DeliveredIdSet, StoreError> {
        self.with_conn(|conn| {
            Ok(read_json::<DeliveredIdSet>(conn, PERSISTENT_IDS_KEY)?.unwrap_or_default())
        })
    }

    pub fn is_delivered(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.load_delivered_ids()?.contains(id))
    }

    /// Append `id` to the persisted set.
    ///
    /// Read, insert and write happen in one transaction under the
    /// connection lock, so concurrent callers cannot drop each other's ids.
    /// Returns `false` when the id was already recorded.
    pub fn record_delivered(&self, id: &str) -> Result<bool, StoreError> {
        if id.is_empty() {
            return Err(StoreError::InvalidData("empty message id".into()));
        }
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut set = read_json::<DeliveredIdSet>(&tx, PERSISTENT_IDS_KEY)?.unwrap_or_default();
            let inserted = set.insert(id);
            if inserted {
                write_json(&tx, PERSISTENT_IDS_KEY, &set)?;
            }
            tx.commit()?;
            Ok(inserted)
        })
    }
}
