//! Fakes for the platform and transport seams.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use push_receiver::{PushError, PushTransport, SessionBootstrap, TransportEvent, TransportSession};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::shell::{ClickHandler, DisplayNotification, NotificationDisplay, ShellError, WindowHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeWindow(pub u32);

#[derive(Default)]
struct HostLog {
    window: Option<FakeWindow>,
    created: u32,
    restored: u32,
    focused: u32,
    sent: Vec<(FakeWindow, String, Value)>,
}

#[derive(Clone, Default)]
pub struct FakeHost {
    log: Arc<Mutex<HostLog>>,
    create_delay: Duration,
    fail_restore: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window() -> Self {
        let host = Self::default();
        host.log.lock().unwrap().window = Some(FakeWindow(100));
        host
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    pub fn failing_restore(mut self) -> Self {
        self.fail_restore = true;
        self
    }

    pub fn created(&self) -> u32 {
        self.log.lock().unwrap().created
    }

    pub fn restored(&self) -> u32 {
        self.log.lock().unwrap().restored
    }

    pub fn focused(&self) -> u32 {
        self.log.lock().unwrap().focused
    }

    pub fn sent(&self) -> Vec<(FakeWindow, String, Value)> {
        self.log.lock().unwrap().sent.clone()
    }
}

impl WindowHost for FakeHost {
    type Window = FakeWindow;

    fn find_main_window(&self) -> Option<FakeWindow> {
        self.log.lock().unwrap().window
    }

    fn create_main_window(&self) -> Result<FakeWindow, ShellError> {
        std::thread::sleep(self.create_delay);
        let mut log = self.log.lock().unwrap();
        log.created += 1;
        let window = FakeWindow(log.created);
        log.window = Some(window);
        Ok(window)
    }

    fn restore(&self, _window: &FakeWindow) -> Result<(), ShellError> {
        if self.fail_restore {
            return Err(ShellError("restore not supported".into()));
        }
        self.log.lock().unwrap().restored += 1;
        Ok(())
    }

    fn focus(&self, _window: &FakeWindow) -> Result<(), ShellError> {
        self.log.lock().unwrap().focused += 1;
        Ok(())
    }

    fn send(&self, window: &FakeWindow, channel: &str, payload: Value) -> Result<(), ShellError> {
        self.log
            .lock()
            .unwrap()
            .sent
            .push((*window, channel.to_string(), payload));
        Ok(())
    }
}

#[derive(Default)]
struct DisplayLog {
    shown: Vec<DisplayNotification>,
    handlers: Vec<Option<ClickHandler>>,
    failing: bool,
}

#[derive(Clone, Default)]
pub struct FakeDisplay {
    log: Arc<Mutex<DisplayLog>>,
}

impl FakeDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.log.lock().unwrap().failing = failing;
    }

    pub fn shown(&self) -> Vec<DisplayNotification> {
        self.log.lock().unwrap().shown.clone()
    }

    /// Simulate a click on the `index`-th notification shown.
    pub fn click(&self, index: usize) {
        let handler = self.log.lock().unwrap().handlers[index]
            .take()
            .expect("notification already clicked");
        handler();
    }
}

impl NotificationDisplay for FakeDisplay {
    fn show(
        &self,
        notification: DisplayNotification,
        on_click: ClickHandler,
    ) -> Result<(), ShellError> {
        let mut log = self.log.lock().unwrap();
        if log.failing {
            return Err(ShellError("notification center unavailable".into()));
        }
        log.shown.push(notification);
        log.handlers.push(Some(on_click));
        Ok(())
    }
}

/// Transport that either refuses or opens sessions carrying canned messages.
#[derive(Default)]
pub struct FakeTransport {
    refuse: bool,
    sessions: Mutex<VecDeque<Vec<TransportEvent>>>,
    held: Mutex<Vec<mpsc::Sender<TransportEvent>>>,
    pub opens: Mutex<Vec<SessionBootstrap>>,
}

impl FakeTransport {
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn with_messages(messages: Vec<Value>) -> Self {
        let transport = Self::default();
        transport
            .sessions
            .lock()
            .unwrap()
            .push_back(messages.into_iter().map(TransportEvent::Message).collect());
        transport
    }
}

impl PushTransport for FakeTransport {
    async fn open(&self, bootstrap: SessionBootstrap) -> Result<TransportSession, PushError> {
        self.opens.lock().unwrap().push(bootstrap);
        if self.refuse {
            return Err(PushError::Connection("network unreachable".into()));
        }
        let events = self.sessions.lock().unwrap().pop_front().unwrap_or_default();
        let (tx, rx) = mpsc::channel(64);
        for event in events {
            tx.try_send(event).unwrap();
        }
        self.held.lock().unwrap().push(tx);
        let (shutdown, _) = mpsc::channel(1);
        Ok(TransportSession {
            events: rx,
            shutdown,
        })
    }
}

pub fn new_entry_message(id: &str, feed_id: &str, entry_id: &str, view: &str) -> Value {
    serde_json::json!({
        "id": id,
        "data": {
            "type": "new-entry",
            "title": "Feed",
            "description": "Entry",
            "feedId": feed_id,
            "entryId": entry_id,
            "view": view,
        }
    })
}
