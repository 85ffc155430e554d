use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::cache::QueryCache;
use crate::clock::{Clock, SystemClock};
use crate::policy::StalenessPolicy;
use crate::source::{
    EmbeddedLifecycle, HostSignal, Observation, PageVisibility, Scope, VisibilitySource,
    VisibilityState,
};

/// Which visibility source a host uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Embedded,
    Standalone { initially_visible: bool },
}

impl HostKind {
    fn source(self, now: DateTime<Utc>) -> Box<dyn VisibilitySource> {
        match self {
            HostKind::Embedded => Box::new(EmbeddedLifecycle::new()),
            HostKind::Standalone { initially_visible } => {
                Box::new(PageVisibility::new(initially_visible, now))
            }
        }
    }
}

/// What one signal led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Recorded,
    /// Revealed, but the data is still fresh (or no hide was recorded).
    Skipped { hidden_for: Option<Duration> },
    Invalidated(Scope),
}

pub struct FreshnessCoordinator<C: QueryCache> {
    cache: C,
    source: Box<dyn VisibilitySource>,
    policy: watch::Receiver<StalenessPolicy>,
    clock: Arc<dyn Clock>,
}

impl<C: QueryCache> FreshnessCoordinator<C> {
    pub fn new(cache: C, host: HostKind, policy: watch::Receiver<StalenessPolicy>) -> Self {
        Self::with_clock(cache, host, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        cache: C,
        host: HostKind,
        policy: watch::Receiver<StalenessPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let source = host.source(clock.now());
        Self::with_source(cache, source, policy, clock)
    }

    pub fn with_source(
        cache: C,
        source: Box<dyn VisibilitySource>,
        policy: watch::Receiver<StalenessPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache,
            source,
            policy,
            clock,
        }
    }

    /// Feed one host signal through the state machine. Never blocks.
    pub fn handle(&mut self, signal: HostSignal) -> Outcome {
        let now = self.clock.now();
        let reveal = match self.source.observe(signal, now) {
            Observation::Ignored => {
                tracing::trace!(?signal, "Visibility signal ignored");
                return Outcome::Ignored;
            }
            Observation::Recorded => {
                tracing::debug!(?signal, "Visibility transition recorded");
                return Outcome::Recorded;
            }
            Observation::Revealed(reveal) => reveal,
        };

        // Read per transition so a settings change applies immediately.
        let stale_time = self.policy.borrow().stale_time();
        match reveal.hidden_for {
            Some(hidden_for) if hidden_for >= stale_time => {
                tracing::info!(
                    hidden_secs = hidden_for.as_secs(),
                    stale_secs = stale_time.as_secs(),
                    scope = ?reveal.scope,
                    "Cached queries are stale, invalidating"
                );
                self.invalidate(reveal.scope);
                Outcome::Invalidated(reveal.scope)
            }
            hidden_for => {
                tracing::debug!(
                    hidden_secs = hidden_for.map(|d| d.as_secs()),
                    stale_secs = stale_time.as_secs(),
                    "Cached queries still fresh"
                );
                Outcome::Skipped { hidden_for }
            }
        }
    }

    pub fn visibility(&self) -> VisibilityState {
        self.source.state()
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn invalidate(&self, scope: Scope) {
        match scope {
            Scope::All => self.cache.invalidate_all(),
            Scope::ExceptProtected => self
                .cache
                .invalidate_where(&|category| scope.includes(category)),
        }
    }
}
