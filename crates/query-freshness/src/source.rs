//! Visibility sources: per-host state machines that turn lifecycle signals
//! into "the app was hidden for this long" observations.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::elapsed;

/// A lifecycle signal from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// Embedded host: the main window is closing (hidden to tray).
    Closing,
    /// Embedded host: the main window is shown again.
    BecameVisible,
    /// Standalone host: page visibility changed.
    Visibility(bool),
}

/// Which cached queries a reveal may invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Everything except [`crate::PROTECTED_CATEGORY`].
    ExceptProtected,
    All,
}

impl Scope {
    pub fn includes(&self, category: &str) -> bool {
        match self {
            Scope::All => true,
            Scope::ExceptProtected => category != crate::PROTECTED_CATEGORY,
        }
    }
}

/// The app came back into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reveal {
    /// `None` when no hide was recorded before this reveal.
    pub hidden_for: Option<Duration>,
    pub scope: Scope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Not a signal this source reacts to, or a repeat of the current state.
    Ignored,
    /// State updated, nothing to invalidate.
    Recorded,
    Revealed(Reveal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityState {
    pub is_visible: bool,
    pub last_transition_at: Option<DateTime<Utc>>,
}

pub trait VisibilitySource: Send {
    fn observe(&mut self, signal: HostSignal, now: DateTime<Utc>) -> Observation;

    fn state(&self) -> VisibilityState;
}

/// Embedded host driven by window close/show events.
///
/// The close timestamp is consumed by the next reveal whatever the outcome,
/// so a reveal never measures against a hide that was already accounted for.
#[derive(Debug)]
pub struct EmbeddedLifecycle {
    state: VisibilityState,
    closed_at: Option<DateTime<Utc>>,
}

impl Default for EmbeddedLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddedLifecycle {
    pub fn new() -> Self {
        Self {
            state: VisibilityState {
                is_visible: true,
                last_transition_at: None,
            },
            closed_at: None,
        }
    }
}

impl VisibilitySource for EmbeddedLifecycle {
    fn observe(&mut self, signal: HostSignal, now: DateTime<Utc>) -> Observation {
        match signal {
            HostSignal::Closing => {
                self.closed_at = Some(now);
                self.state = VisibilityState {
                    is_visible: false,
                    last_transition_at: Some(now),
                };
                Observation::Recorded
            }
            HostSignal::BecameVisible => {
                let hidden_for = self.closed_at.take().map(|at| elapsed(at, now));
                self.state = VisibilityState {
                    is_visible: true,
                    last_transition_at: Some(now),
                };
                Observation::Revealed(Reveal {
                    hidden_for,
                    scope: Scope::ExceptProtected,
                })
            }
            HostSignal::Visibility(_) => Observation::Ignored,
        }
    }

    fn state(&self) -> VisibilityState {
        self.state
    }
}

/// Standalone host driven by page visibility changes.
///
/// Hosts fire visibility events more than once per change; repeats of the
/// current value are dropped. The page counts as having entered its initial
/// state at `now`, so a page that starts hidden measures from its creation.
#[derive(Debug)]
pub struct PageVisibility {
    state: VisibilityState,
}

impl PageVisibility {
    pub fn new(initially_visible: bool, now: DateTime<Utc>) -> Self {
        Self {
            state: VisibilityState {
                is_visible: initially_visible,
                last_transition_at: Some(now),
            },
        }
    }
}

impl VisibilitySource for PageVisibility {
    fn observe(&mut self, signal: HostSignal, now: DateTime<Utc>) -> Observation {
        let HostSignal::Visibility(visible) = signal else {
            return Observation::Ignored;
        };
        if visible == self.state.is_visible {
            return Observation::Ignored;
        }

        let previous = self.state.last_transition_at;
        self.state = VisibilityState {
            is_visible: visible,
            last_transition_at: Some(now),
        };
        if !visible {
            return Observation::Recorded;
        }
        Observation::Revealed(Reveal {
            hidden_for: previous.map(|at| elapsed(at, now)),
            scope: Scope::All,
        })
    }

    fn state(&self) -> VisibilityState {
        self.state
    }
}
