//! Desktop host for feedpush.
//!
//! Wires the push pipeline (store, receiver, router) and the cache
//! freshness coordinator into a host application. The host supplies the
//! platform pieces through the traits in [`shell`] and a
//! [`push_receiver::PushTransport`].

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod events;
pub mod freshness;
pub mod router;
pub mod shell;
pub mod shutdown;
pub mod window;

#[cfg(test)]
mod testing;

use tracing_subscriber::EnvFilter;

pub use app::SharedState;
pub use router::{ClickOutcome, Dispatch, NotificationRouter, RouteError};

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
