//! Routes inbound push messages to OS notifications and, on click, to the
//! main window.


use std::sync::Arc;

use push_receiver::{InboundMessage, MessageKind, NewEntry, PushEvent};
use push_store::{Database, StoreError};
use tokio::sync::mpsc;

use crate::events::{NAVIGATE_ENTRY, NavigationPayload};
use crate::shell::{ClickHandler, DisplayNotification, NotificationDisplay, WindowHost};
use crate::window::WindowResolver;

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Malformed payload field {field}: {value:?}")]
    MalformedPayload { field: &'static str, value: String },

    #[error("Window error: {0}")]
    Window(String),

    #[error("Notification display failed: {0}")]
    Display(String),

    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// What [`NotificationRouter::dispatch`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Displayed,
    /// Type not handled by this client; recorded as delivered.
    Ignored,
    /// Already delivered earlier, possibly in a previous run.
    Duplicate,
}

/// Result of a notification click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Navigated(NavigationPayload),
    /// The payload could not be turned into a navigation; the window was
    /// still brought to the front.
    FocusedOnly,
}

pub struct NotificationRouter<H: WindowHost, D: NotificationDisplay> {
    store: Database,
    display: Arc<D>,
    windows: Arc<WindowResolver<H>>,
}

impl<H: WindowHost, D: NotificationDisplay> NotificationRouter<H, D> {
    pub fn new(store: Database, display: D, host: H) -> Self {
        Self {
            store,
            display: Arc::new(display),
            windows: Arc::new(WindowResolver::new(host)),
        }
    }

    /// Process one message and record its id once handled.
    ///
    /// A message whose notification could not be shown is not recorded, so
    /// the backend may deliver it again.
    pub fn dispatch(&self, message: &InboundMessage) -> Result<Dispatch, RouteError> {
        if self.store.is_delivered(&message.id)? {
            tracing::debug!(message_id = %message.id, "Skipping already delivered message");
            return Ok(Dispatch::Duplicate);
        }

        let outcome = match &message.kind {
            MessageKind::NewEntry(entry) => {
                self.show_entry(entry)?;
                Dispatch::Displayed
            }
            MessageKind::Unrecognized(tag) => {
                tracing::debug!(
                    message_id = %message.id,
                    kind = %tag,
                    "Ignoring unsupported push message type"
                );
                Dispatch::Ignored
            }
        };

        self.store.record_delivered(&message.id)?;
        Ok(outcome)
    }

    /// Same as a click on the notification for `entry`.
    pub fn open_entry(&self, entry: &NewEntry) -> Result<ClickOutcome, RouteError> {
        open_entry(&self.windows, entry)
    }

    /// Drive [`dispatch`](Self::dispatch) from a push event stream until it
    /// closes.
    pub async fn run(&self, mut events: mpsc::Receiver<PushEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                PushEvent::Notification(message) => match self.dispatch(&message) {
                    Ok(outcome) => {
                        tracing::debug!(message_id = %message.id, ?outcome, "Push message routed");
                    }
                    Err(e) => {
                        tracing::error!(message_id = %message.id, error = %e, "Failed to route push message");
                    }
                },
                PushEvent::CredentialsChanged(credentials) => {
                    tracing::info!(
                        token = %credentials.redacted_token(),
                        "Push credentials updated"
                    );
                }
                PushEvent::ConnectionLost { error, attempt } => {
                    tracing::warn!(%error, attempt, "Push connection lost");
                }
            }
        }
        tracing::info!("Push event stream closed");
    }

    fn show_entry(&self, entry: &NewEntry) -> Result<(), RouteError> {
        let notification = DisplayNotification {
            title: entry.title.clone(),
            body: entry.description.clone(),
        };
        let windows = self.windows.clone();
        let clicked = entry.clone();
        let on_click: ClickHandler = Box::new(move || {
            if let Err(e) = open_entry(&windows, &clicked) {
                tracing::error!(error = %e, "Failed to open entry from notification");
            }
        });

        self.display
            .show(notification, on_click)
            .map_err(|e| RouteError::Display(e.to_string()))
    }
}

/// Bring the main window up (creating it on a cold start) and navigate it
/// to `entry`.
pub fn open_entry<H: WindowHost>(
    windows: &WindowResolver<H>,
    entry: &NewEntry,
) -> Result<ClickOutcome, RouteError> {
    let window = windows
        .resolve_or_create()
        .map_err(|e| RouteError::Window(e.to_string()))?;
    if let Err(e) = windows.bring_to_front(&window) {
        tracing::warn!(error = %e, "Failed to focus main window");
    }

    let payload = match navigation_payload(entry) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping navigation for malformed notification");
            return Ok(ClickOutcome::FocusedOnly);
        }
    };

    let value = serde_json::to_value(&payload)?;
    windows
        .host()
        .send(&window, NAVIGATE_ENTRY, value)
        .map_err(|e| RouteError::Window(e.to_string()))?;
    Ok(ClickOutcome::Navigated(payload))
}

/// Build the navigation event for `entry`.
///
/// `view` must be a whole decimal integer (surrounding whitespace allowed).
/// Values such as `2abc` or `1.0` are rejected rather than truncated.
pub fn navigation_payload(entry: &NewEntry) -> Result<NavigationPayload, RouteError> {
    let feed_id = required("feedId", entry.feed_id.as_deref())?;
    let entry_id = required("entryId", entry.entry_id.as_deref())?;
    let raw_view = entry.view.as_deref().unwrap_or_default();
    let view = raw_view
        .trim()
        .parse::<i64>()
        .map_err(|_| RouteError::MalformedPayload {
            field: "view",
            value: raw_view.to_string(),
        })?;

    Ok(NavigationPayload {
        feed_id,
        entry_id,
        view,
    })
}

fn required(field: &'static str, value: Option<&str>) -> Result<String, RouteError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        other => Err(RouteError::MalformedPayload {
            field,
            value: other.unwrap_or_default().to_string(),
        }),
    }
}
