//! Occupancy rules
//!
//! Facility constants, the derived room count, and the bed transition table
//! used when a guest changes status or room.

use super::GuestStatus;

/// Beds per room. Fixed for every room in the facility.
pub const ROOM_CAPACITY: i32 = 3;

/// Maximum number of rooms the facility can hold.
pub const MAX_ROOMS: i32 = 24;

/// Projected number of occupied rooms for a given active guest count.
///
/// `clamp(floor(active / 3) + 1, 0, 24)`. This is a capacity heuristic, not a
/// count of rooms that actually hold guests, and it must always be recomputed
/// from `active_guests` rather than adjusted incrementally.
pub fn rooms_for_active_guests(active_guests: i64) -> i32 {
    let rooms = active_guests
        .div_euclid(i64::from(ROOM_CAPACITY))
        .saturating_add(1)
        .clamp(0, i64::from(MAX_ROOMS));
    i32::try_from(rooms).unwrap_or(MAX_ROOMS)
}

/// Room number `0` means "no room" and never touches bed counters.
pub fn has_room(room_no: i32) -> bool {
    room_no != 0
}

/// Bed counter changes implied by a guest update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BedPlan {
    /// Release the bed held in the old room
    pub free_old: bool,
    /// Take a bed in the new room
    pub occupy_new: bool,
}

impl BedPlan {
    /// Derive the bed transitions from the status table plus a same-status room move.
    ///
    /// | old      | new      | room changed | free old | occupy new |
    /// |----------|----------|--------------|----------|------------|
    /// | Active   | Inactive | any          | yes      | no         |
    /// | Inactive | Active   | any          | no       | yes        |
    /// | Active   | Active   | yes          | yes      | yes        |
    /// | Active   | Active   | no           | no       | no         |
    /// | Inactive | Inactive | any          | no       | no         |
    pub fn for_update(
        old_status: GuestStatus,
        old_room_no: i32,
        new_status: GuestStatus,
        new_room_no: i32,
    ) -> Self {
        use GuestStatus::{Active, Inactive};

        match (old_status, new_status) {
            (Active, Inactive) => Self {
                free_old: true,
                occupy_new: false,
            },
            (Inactive, Active) => Self {
                free_old: false,
                occupy_new: true,
            },
            (Active, Active) if old_room_no != new_room_no => Self {
                free_old: true,
                occupy_new: true,
            },
            _ => Self::default(),
        }
    }

    /// True when no bed counter changes
    pub fn is_noop(&self) -> bool {
        !self.free_old && !self.occupy_new
    }
}
