use push_store::Database;
use tokio::sync::mpsc;

use super::PushEvent;
use crate::transport::{TransportEvent, TransportSession};
use crate::{Credentials, InboundMessage};

pub(super) enum SessionOutcome {
    Shutdown,
    ConsumerGone,
    Ended(String),
}

/// Forward one session's events until it ends.
pub(super) async fn pump(
    mut session: TransportSession,
    store: &Database,
    event_tx: &mpsc::Sender<PushEvent>,
    shutdown_rx: &mut mpsc::Receiver<()>,
    unsaved: &mut Option<Credentials>,
) -> SessionOutcome {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("Push shutdown during listen");
                let _ = session.shutdown.send(()).await;
                return SessionOutcome::Shutdown;
            }
            incoming = session.events.recv() => {
                let event = match incoming {
                    Some(TransportEvent::CredentialsChanged(credentials)) => {
                        persist_rotation(store, &credentials, unsaved);
                        PushEvent::CredentialsChanged(credentials)
                    }
                    Some(TransportEvent::Message(raw)) => match InboundMessage::from_wire(&raw) {
                        Ok(message) => {
                            tracing::debug!(
                                message_id = %message.id,
                                kind = message.type_tag(),
                                "Push message received"
                            );
                            PushEvent::Notification(message)
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Dropping undecodable push message");
                            continue;
                        }
                    },
                    Some(TransportEvent::Failed(reason)) => {
                        let _ = session.shutdown.send(()).await;
                        return SessionOutcome::Ended(reason);
                    }
                    None => return SessionOutcome::Ended("Session closed by server".into()),
                };
                if event_tx.send(event).await.is_err() {
                    let _ = session.shutdown.send(()).await;
                    return SessionOutcome::ConsumerGone;
                }
            }
        }
    }
}

/// Write rotated credentials before the rotation is surfaced to anyone.
fn persist_rotation(store: &Database, credentials: &Credentials, unsaved: &mut Option<Credentials>) {
    match store.save_credentials(credentials) {
        Ok(()) => {
            *unsaved = None;
            tracing::info!(
                token = %credentials.redacted_token(),
                "Push credentials rotated"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to persist rotated push credentials");
            *unsaved = Some(credentials.clone());
        }
    }
}
