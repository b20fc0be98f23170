//! State machine tables for the activity lifecycle.
//!
//! `state` follows draft → open → closed, with cancel reachable from any
//! non-terminal state. `status` is derived from state writes through a fixed
//! (new_state, old_status) lookup, never inferred.

use voluntry_db::models::{ActivityState, ActivityStatus};

/// Strict transition table. Closed and cancelled are terminal except that a
/// closed activity can still be cancelled; same-state writes are rejected.
pub fn can_transition(from: ActivityState, to: ActivityState) -> bool {
    use ActivityState::*;
    matches!(
        (from, to),
        (Draft, Open) | (Draft, Cancelled) | (Open, Closed) | (Open, Cancelled) | (Closed, Cancelled)
    )
}

/// Status derived from a state write, as a lookup on (new_state, old_status).
pub fn derived_status(new_state: ActivityState, old_status: ActivityStatus) -> ActivityStatus {
    use ActivityState as S;
    use ActivityStatus as T;
    match (new_state, old_status) {
        (S::Open, T::Upcoming) => T::Ongoing,
        (S::Open, other) => other,
        (S::Closed, _) => T::Completed,
        (S::Cancelled, _) => T::Cancelled,
        (S::Draft, other) => other,
    }
}
