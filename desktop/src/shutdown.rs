use crate::app::SharedState;

/// Stop the push session, cancel background tasks and flush the store.
pub async fn graceful_shutdown(state: &SharedState) {
    tracing::info!("Shutdown sequence started");

    if let Some(handle) = state.take_push_connection().await {
        handle.shutdown().await;
        tracing::info!("Shutdown: push session stopped");
    }

    state.shutdown_token().cancel();
    tracing::info!("Shutdown: background tasks cancelled");

    match state.db().flush() {
        Ok(()) => tracing::info!("Shutdown: store flushed"),
        Err(e) => tracing::error!("Shutdown: failed to flush store: {e}"),
    }

    tracing::info!("Shutdown sequence completed");
}
