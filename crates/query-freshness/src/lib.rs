//! Decides when cached query results must be refetched after the app was
//! out of sight.
//!
//! A [`FreshnessCoordinator`] turns host visibility signals into cache
//! invalidations. Embedded hosts report `Closing`/`BecameVisible`;
//! standalone hosts report raw visibility changes. Both go through the same
//! coordinator with a different [`VisibilitySource`].

pub mod cache;
pub mod clock;
pub mod coordinator;
pub mod policy;
pub mod source;

pub use cache::{MemoryQueryCache, PROTECTED_CATEGORY, QueryCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{FreshnessCoordinator, HostKind, Outcome};
pub use policy::StalenessPolicy;
pub use source::{
    EmbeddedLifecycle, HostSignal, Observation, PageVisibility, Reveal, Scope, VisibilitySource,
    VisibilityState,
};
