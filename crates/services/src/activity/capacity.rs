//! Slot-capacity accounting for activity joins.
//!
//! Pure functions over the embedded participant list; the service layer
//! re-runs these checks inside its compare-and-swap loop so the capacity
//! invariant holds under concurrent joins.

use voluntry_db::models::Participant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityError {
    /// Requested participant count must be at least 1.
    InvalidCount,
    /// Occupancy plus the requested count would exceed the slot limit.
    Exceeded,
}

/// Sum of all participants' counts.
pub fn occupancy(participants: &[Participant]) -> u64 {
    participants.iter().map(|p| p.count as u64).sum()
}

/// Whether a join request for `requested` people fits. `slots == 0` means
/// unlimited capacity.
pub fn can_accept(
    slots: u32,
    participants: &[Participant],
    requested: u32,
) -> Result<(), CapacityError> {
    if requested == 0 {
        return Err(CapacityError::InvalidCount);
    }
    if slots == 0 {
        return Ok(());
    }
    if occupancy(participants) + requested as u64 <= slots as u64 {
        Ok(())
    } else {
        Err(CapacityError::Exceeded)
    }
}
