//! Seam between the client and the push backend's wire protocol.
//!
//! A [`PushTransport`] opens one session at a time. Reconnecting is the
//! client's job (see [`crate::client`]), which lets every reopen pick up
//! the credentials and delivered ids that were persisted in the meantime.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{Credentials, PushError};

/// Values presented to the backend when a session opens.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionBootstrap {
    /// `None` asks the backend to register a fresh installation.
    pub credentials: Option<Credentials>,
    /// Message ids the backend must not re-send.
    pub persistent_ids: Vec<String>,
    /// Verbose wire logging, for diagnosing a misbehaving backend.
    pub debug: bool,
}

/// What a live session reports.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The backend rotated the token.
    CredentialsChanged(Credentials),
    /// One inbound message: `{ "id": ..., "data": { "type": ..., ... } }`.
    Message(serde_json::Value),
    /// The session broke. A closed channel without this event is a clean
    /// server-side close.
    Failed(String),
}

/// A single open session.
pub struct TransportSession {
    pub events: mpsc::Receiver<TransportEvent>,
    pub shutdown: mpsc::Sender<()>,
}

pub trait PushTransport: Send + Sync + 'static {
    /// Open a session. Network failures map to [`PushError::Connection`],
    /// refused credentials to [`PushError::AuthRejected`].
    fn open(
        &self,
        bootstrap: SessionBootstrap,
    ) -> impl Future<Output = Result<TransportSession, PushError>> + Send;
}

impl<T: PushTransport> PushTransport for Arc<T> {
    fn open(
        &self,
        bootstrap: SessionBootstrap,
    ) -> impl Future<Output = Result<TransportSession, PushError>> + Send {
        (**self).open(bootstrap)
    }
}
