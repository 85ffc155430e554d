//! Freshness coordinators bound to the application's staleness policy.

use query_freshness::{FreshnessCoordinator, HostKind, QueryCache};

use crate::app::SharedState;

/// Build a coordinator that follows the policy published by `state`.
/// Later settings changes apply on the next visibility transition.
pub fn coordinator_for_host<C: QueryCache>(
    state: &SharedState,
    cache: C,
    host: HostKind,
) -> FreshnessCoordinator<C> {
    tracing::debug!(?host, "Creating freshness coordinator");
    FreshnessCoordinator::new(cache, host, state.subscribe_policy())
}
