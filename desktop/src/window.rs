//! Main window resolution for notification clicks.

use std::sync::Mutex;

use crate::shell::{ShellError, WindowHost};

/// Finds the main window or creates it, at most once at a time.
///
/// Two clicks racing on a cold start must land in the same window, so the
/// lookup and the creation happen under one lock.
pub struct WindowResolver<H: WindowHost> {
    host: H,
    gate: Mutex<()>,
}

impl<H: WindowHost> WindowResolver<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            gate: Mutex::new(()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn resolve_or_create(&self) -> Result<H::Window, ShellError> {
        let _guard = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(window) = self.host.find_main_window() {
            return Ok(window);
        }
        tracing::info!("No main window, creating one");
        self.host.create_main_window()
    }

    /// Restore and focus. A failed restore is logged and focus is still tried.
    pub fn bring_to_front(&self, window: &H::Window) -> Result<(), ShellError> {
        if let Err(e) = self.host.restore(window) {
            tracing::warn!("Failed to restore main window: {e}");
        }
        self.host.focus(window)
    }
}
