use std::path::{Path, PathBuf};

use push_receiver::{DeliveredIdSet, PushReceiverClient, PushTransport, ReceiverOptions};
use push_store::Database;
use tokio::task::JoinHandle;

use crate::app::SharedState;
use crate::config::{AppConfig, SettingsManager};
use crate::router::NotificationRouter;
use crate::shell::{NotificationDisplay, WindowHost};

/// Foundation init: env, data dir, database, settings (fatal on error).
pub fn init_foundation() -> Result<(Database, AppConfig), anyhow::Error> {
    load_dotenv();
    init_foundation_at(&data_dir())
}

/// Open the database under `dir` and load settings.
pub fn init_foundation_at(dir: &Path) -> Result<(Database, AppConfig), anyhow::Error> {
    std::fs::create_dir_all(dir)?;

    let db_path = dir.join("local.db");
    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let sm = SettingsManager::new(db.clone());
    if let Err(e) = sm.migrate_from_env() {
        tracing::error!("Failed to migrate from env: {e}");
    }
    sm.initialize_defaults()?;

    let config = AppConfig::load(&sm)?;
    tracing::info!(
        "Settings loaded (notifications={}, reduce_refetch={})",
        config.notifications_enabled,
        config.reduce_refetch
    );
    Ok((db, config))
}

/// Connect the push pipeline and start routing (non-fatal).
///
/// Returns the router task, or `None` when notifications are disabled or
/// the first connection failed. The connection handle is kept in `state`
/// for [`crate::shutdown::graceful_shutdown`].
pub async fn start_push_pipeline<T, H, D>(
    state: &SharedState,
    transport: T,
    host: H,
    display: D,
) -> Option<JoinHandle<()>>
where
    T: PushTransport,
    H: WindowHost,
    D: NotificationDisplay,
{
    let push_debug = {
        let config = state.config().await;
        if !config.notifications_enabled {
            tracing::info!("Notifications disabled, push pipeline not started");
            return None;
        }
        config.push_debug
    };

    let store = state.db().clone();
    let credentials = store.load_credentials().unwrap_or_else(|e| {
        tracing::error!("Failed to load push credentials: {e}");
        None
    });
    let delivered = store.load_delivered_ids().unwrap_or_else(|e| {
        tracing::error!("Failed to load delivered ids: {e}");
        DeliveredIdSet::new()
    });
    if push_debug {
        tracing::info!(
            registered = credentials.is_some(),
            persistent_ids = delivered.len(),
            "Push bootstrap values loaded"
        );
    }

    let client = PushReceiverClient::new(transport, store.clone()).with_options(ReceiverOptions {
        debug: push_debug,
        ..ReceiverOptions::default()
    });
    let (handle, events) = match client.connect(credentials, &delivered).await {
        Ok(connected) => connected,
        Err(e) => {
            tracing::error!("Push connection failed, notifications disabled: {e}");
            return None;
        }
    };
    state.set_push_connection(handle).await;

    let router = NotificationRouter::new(store, display, host);
    let token = state.shutdown_token().clone();
    Some(tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::info!("Notification router cancelled");
            }
            _ = router.run(events) => {}
        }
    }))
}

/// Determine the data directory for the application.
/// Priority: FEEDPUSH_DATA_DIR env var > ~/.feedpush
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FEEDPUSH_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".feedpush")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
