//! Platform facilities the host application provides.

/// Failure reported by a platform facility.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ShellError(pub String);

/// Window management for the main application window.
pub trait WindowHost: Send + Sync + 'static {
    type Window: Clone + Send + Sync + 'static;

    fn find_main_window(&self) -> Option<Self::Window>;

    fn create_main_window(&self) -> Result<Self::Window, ShellError>;

    /// Show the window and bring it back from minimized or hidden.
    fn restore(&self, window: &Self::Window) -> Result<(), ShellError>;

    fn focus(&self, window: &Self::Window) -> Result<(), ShellError>;

    /// Deliver a typed event to the window's UI.
    fn send(
        &self,
        window: &Self::Window,
        channel: &str,
        payload: serde_json::Value,
    ) -> Result<(), ShellError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNotification {
    pub title: String,
    pub body: String,
}

/// Runs when the user clicks a notification. May run on any thread.
pub type ClickHandler = Box<dyn FnOnce() + Send + 'static>;

/// OS notification center.
pub trait NotificationDisplay: Send + Sync + 'static {
    fn show(&self, notification: DisplayNotification, on_click: ClickHandler)
    -> Result<(), ShellError>;
}
