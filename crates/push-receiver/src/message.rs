//! Inbound push messages.

use std::collections::HashMap;

use serde::Deserialize;

use crate::PushError;

pub const TYPE_NEW_ENTRY: &str = "new-entry";

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: String,
    #[serde(default)]
    data: serde_json::Map<String, serde_json::Value>,
}

/// A message received from the push backend.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub id: String,
    pub kind: MessageKind,
    /// Every data field, stringified.
    pub payload: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    NewEntry(NewEntry),
    /// A `type` this client does not know. Carries the raw tag.
    Unrecognized(String),
}

/// Fields of a `new-entry` message, exactly as they arrived.
///
/// `view` stays a string here; turning it into a number is the
/// navigation step's job, where a bad value only costs the navigation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEntry {
    pub title: String,
    pub description: String,
    pub feed_id: Option<String>,
    pub entry_id: Option<String>,
    pub view: Option<String>,
}

impl InboundMessage {
    pub fn new(id: impl Into<String>, payload: HashMap<String, String>) -> Self {
        let kind = MessageKind::from_payload(&payload);
        Self {
            id: id.into(),
            kind,
            payload,
        }
    }

    /// Decode `{ "id": ..., "data": { "type": ..., ... } }`.
    pub fn from_wire(raw: &serde_json::Value) -> Result<Self, PushError> {
        let wire: WireMessage = serde_json::from_value(raw.clone())?;
        let payload = wire
            .data
            .into_iter()
            .map(|(key, value)| (key, stringify(value)))
            .collect();
        Ok(Self::new(wire.id, payload))
    }

    /// The raw `type` tag.
    pub fn type_tag(&self) -> &str {
        match &self.kind {
            MessageKind::NewEntry(_) => TYPE_NEW_ENTRY,
            MessageKind::Unrecognized(tag) => tag,
        }
    }
}

impl MessageKind {
    fn from_payload(payload: &HashMap<String, String>) -> Self {
        let tag = payload.get("type").map(String::as_str).unwrap_or_default();
        match tag {
            TYPE_NEW_ENTRY => MessageKind::NewEntry(NewEntry::from_payload(payload)),
            other => MessageKind::Unrecognized(other.to_string()),
        }
    }
}

impl NewEntry {
    fn from_payload(payload: &HashMap<String, String>) -> Self {
        let field = |key: &str| payload.get(key).cloned();
        Self {
            title: field("title").unwrap_or_default(),
            description: field("description").unwrap_or_default(),
            feed_id: field("feedId"),
            entry_id: field("entryId"),
            view: field("view"),
        }
    }
}

// The wire contract is all strings, but a misbehaving backend should not
// make a whole message undecodable.
fn stringify(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
