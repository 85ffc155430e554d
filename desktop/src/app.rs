use std::sync::Arc;

use push_receiver::ConnectionHandle;
use push_store::Database;
use query_freshness::StalenessPolicy;
use tokio::sync::{Mutex, RwLock, watch};
use tokio_util::sync::CancellationToken;

use crate::config::defaults::REDUCE_REFETCH;
use crate::config::{AppConfig, SettingsManager};

/// Application shared state handed to every host-side task.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Application configuration (reloadable)
    config: RwLock<AppConfig>,
    /// Staleness policy derived from `config`, watched by freshness coordinators
    policy_tx: watch::Sender<StalenessPolicy>,
    /// Database handle
    db: Database,
    shutdown_token: CancellationToken,
    push_connection: Mutex<Option<ConnectionHandle>>,
}

impl SharedState {
    /// Create shared state from an already-opened database and loaded config.
    pub fn new(db: Database, config: AppConfig) -> Self {
        let (policy_tx, _) = watch::channel(config.staleness_policy());

        Self {
            inner: Arc::new(SharedStateInner {
                config: RwLock::new(config),
                policy_tx,
                db,
                shutdown_token: CancellationToken::new(),
                push_connection: Mutex::new(None),
            }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// Get a read lock on the current config.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    /// Reload config from the database and publish the new staleness policy.
    pub async fn reload_config(&self) -> Result<(), anyhow::Error> {
        let sm = SettingsManager::new(self.inner.db.clone());
        let mut config = self.inner.config.write().await;
        config.reload(&sm)?;
        self.inner.policy_tx.send_replace(config.staleness_policy());
        Ok(())
    }

    pub fn policy(&self) -> StalenessPolicy {
        *self.inner.policy_tx.borrow()
    }

    pub fn subscribe_policy(&self) -> watch::Receiver<StalenessPolicy> {
        self.inner.policy_tx.subscribe()
    }

    /// Persist the user's refetch preference and apply it.
    pub async fn set_reduce_refetch(&self, enabled: bool) -> Result<(), anyhow::Error> {
        let sm = SettingsManager::new(self.inner.db.clone());
        sm.set_setting(REDUCE_REFETCH, if enabled { "true" } else { "false" })?;
        self.reload_config().await
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown_token
    }

    /// Store the live push connection. A previous one is shut down.
    pub async fn set_push_connection(&self, handle: ConnectionHandle) {
        let previous = self.inner.push_connection.lock().await.replace(handle);
        if let Some(previous) = previous {
            tracing::warn!("Replacing an active push connection");
            previous.shutdown().await;
        }
    }

    pub async fn take_push_connection(&self) -> Option<ConnectionHandle> {
        self.inner.push_connection.lock().await.take()
    }
}
