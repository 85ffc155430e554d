//! Client side of the push notification transport.
//!
//! Owns the long-lived session with the push backend, persists credential
//! rotations before anything else can observe them, and hands inbound
//! messages to the caller as a channel of [`PushEvent`]s.

pub mod client;
pub mod message;
pub mod transport;

pub use client::{ConnectionHandle, PushEvent, PushReceiverClient, ReceiverOptions};
pub use message::{InboundMessage, MessageKind, NewEntry};
pub use push_store::{Credentials, DeliveredIdSet};
pub use transport::{PushTransport, SessionBootstrap, TransportEvent, TransportSession};

/// Unified error type for the push-receiver crate.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Push connection failed: {0}")]
    Connection(String),

    #[error("Push backend rejected credentials: {0}")]
    AuthRejected(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Malformed transport message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] push_store::StoreError),
}

impl PushError {
    /// Auth failures are not retried: the backend will keep refusing the
    /// same credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, PushError::AuthRejected(_))
    }
}
