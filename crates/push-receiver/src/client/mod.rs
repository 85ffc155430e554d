//! Push receiver client with automatic session reopening.
//!
//! The first session is opened inside [`PushReceiverClient::connect`] so
//! the caller learns about an unusable backend immediately. Later sessions
//! are reopened from a background task with exponential backoff, and each
//! reopen reads the credentials and delivered ids back from the store.

mod session;

use std::sync::Arc;
use std::time::{Duration, Instant};

use push_store::Database;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::transport::{PushTransport, SessionBootstrap, TransportSession};
use crate::{Credentials, DeliveredIdSet, InboundMessage, PushError};

use session::SessionOutcome;

const EVENT_CAPACITY: usize = 256;
const BASE_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const FAILURE_RESET_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Events surfaced to the consumer, in arrival order.
#[derive(Debug, Clone)]
pub enum PushEvent {
    /// Already persisted when this is received.
    CredentialsChanged(Credentials),
    Notification(InboundMessage),
    /// A session ended or a reopen failed; the client keeps retrying.
    ConnectionLost { error: String, attempt: u32 },
}

#[derive(Debug, Clone)]
pub struct ReceiverOptions {
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub failure_reset_window: Duration,
    pub event_capacity: usize,
    /// Ask the transport for verbose wire logging on every session.
    pub debug: bool,
}

impl Default for ReceiverOptions {
    fn default() -> Self {
        Self {
            base_backoff: BASE_BACKOFF,
            max_backoff: MAX_BACKOFF,
            failure_reset_window: FAILURE_RESET_WINDOW,
            event_capacity: EVENT_CAPACITY,
            debug: false,
        }
    }
}

impl ReceiverOptions {
    fn backoff_duration(&self, failures: u32) -> Duration {
        let d = self.base_backoff * 2u32.saturating_pow(failures.saturating_sub(1).min(16));
        d.min(self.max_backoff)
    }
}

/// Handle to the background session loop.
pub struct ConnectionHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    /// Stop the session loop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Push session task ended abnormally");
        }
    }
}

pub struct PushReceiverClient<T: PushTransport> {
    transport: Arc<T>,
    store: Database,
    options: ReceiverOptions,
}

impl<T: PushTransport> PushReceiverClient<T> {
    pub fn new(transport: T, store: Database) -> Self {
        Self {
            transport: Arc::new(transport),
            store,
            options: ReceiverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReceiverOptions) -> Self {
        self.options = options;
        self
    }

    /// Open the first session and start the background loop.
    ///
    /// `delivered` is presented to the backend so it can skip messages
    /// this installation already processed.
    pub async fn connect(
        &self,
        credentials: Option<Credentials>,
        delivered: &DeliveredIdSet,
    ) -> Result<(ConnectionHandle, mpsc::Receiver<PushEvent>), PushError> {
        match &credentials {
            Some(c) => tracing::info!(token = %c.redacted_token(), "Opening push session"),
            None => tracing::info!("Opening push session without credentials"),
        }
        let bootstrap = SessionBootstrap {
            credentials,
            persistent_ids: delivered.to_vec(),
            debug: self.options.debug,
        };
        let first = self.transport.open(bootstrap).await.map_err(|e| {
            tracing::warn!(error = %e, "Push connection failed");
            e
        })?;
        tracing::info!(
            persistent_ids = delivered.len(),
            "Push session established"
        );

        let (event_tx, event_rx) = mpsc::channel::<PushEvent>(self.options.event_capacity);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let task = tokio::spawn(run_loop(
            self.transport.clone(),
            self.store.clone(),
            self.options.clone(),
            first,
            event_tx,
            shutdown_rx,
        ));
        Ok((ConnectionHandle { shutdown_tx, task }, event_rx))
    }
}

async fn run_loop<T: PushTransport>(
    transport: Arc<T>,
    store: Database,
    options: ReceiverOptions,
    first: TransportSession,
    event_tx: mpsc::Sender<PushEvent>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let mut next_session = Some(first);
    let mut failures: u32 = 0;
    let mut last_failure_at: Option<Instant> = None;
    // Rotated credentials that could not be written; retried before each reopen.
    let mut unsaved: Option<Credentials> = None;

    loop {
        if let Some(last_failure) = last_failure_at {
            if last_failure.elapsed() >= options.failure_reset_window {
                if failures > 0 {
                    tracing::info!(failures, "Push failures reset after stable interval");
                }
                failures = 0;
                last_failure_at = None;
            }
        }

        let reason = match next_session.take() {
            Some(current) => {
                match session::pump(current, &store, &event_tx, &mut shutdown_rx, &mut unsaved)
                    .await
                {
                    SessionOutcome::Shutdown => {
                        tracing::info!("Push session loop stopped");
                        return;
                    }
                    SessionOutcome::ConsumerGone => {
                        tracing::info!("Push event receiver dropped; stopping session loop");
                        return;
                    }
                    SessionOutcome::Ended(reason) => reason,
                }
            }
            None => {
                let bootstrap = bootstrap_from_store(&store, &mut unsaved, options.debug);
                match transport.open(bootstrap).await {
                    Ok(session) => {
                        tracing::info!("Push session reopened");
                        next_session = Some(session);
                        continue;
                    }
                    Err(e) if e.is_auth_error() => {
                        tracing::warn!(
                            error = %e,
                            "Push backend refused credentials; stopping session loop"
                        );
                        let _ = event_tx
                            .send(PushEvent::ConnectionLost {
                                error: e.to_string(),
                                attempt: failures + 1,
                            })
                            .await;
                        return;
                    }
                    Err(e) => e.to_string(),
                }
            }
        };

        failures += 1;
        last_failure_at = Some(Instant::now());
        let backoff = options.backoff_duration(failures);
        tracing::warn!(
            error = %reason, attempt = failures,
            backoff_ms = backoff.as_millis() as u64,
            "Push connection lost, will reconnect"
        );
        let lost = PushEvent::ConnectionLost {
            error: reason,
            attempt: failures,
        };
        if event_tx.send(lost).await.is_err() {
            tracing::info!("Push event receiver dropped; stopping session loop");
            return;
        }

        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("Push shutdown requested during reconnect backoff");
                return;
            }
            _ = tokio::time::sleep(backoff) => {}
        }
    }
}

fn bootstrap_from_store(
    store: &Database,
    unsaved: &mut Option<Credentials>,
    debug: bool,
) -> SessionBootstrap {
    if let Some(pending) = unsaved.take() {
        match store.save_credentials(&pending) {
            Ok(()) => tracing::info!("Persisted rotated push credentials on retry"),
            Err(e) => {
                tracing::error!(error = %e, "Rotated credentials still not persisted");
                *unsaved = Some(pending);
            }
        }
    }

    let credentials = match unsaved.clone() {
        Some(pending) => Some(pending),
        None => store.load_credentials().unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to load push credentials");
            None
        }),
    };
    let persistent_ids = store
        .load_delivered_ids()
        .map(|ids| ids.to_vec())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to load delivered ids");
            Vec::new()
        });

    SessionBootstrap {
        credentials,
        persistent_ids,
        debug,
    }
}
