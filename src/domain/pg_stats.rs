//! Facility-wide counters (the PG aggregate)
//!
//! A single record per facility. Counters move by deltas; the room count is
//! derived from `active_guests` via [`rooms_for_active_guests`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::occupancy::{rooms_for_active_guests, MAX_ROOMS};
use super::{DomainError, GuestStatus};

/// Persisted facility counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgStats {
    pub total_rooms_occupied: i32,
    pub total_guests: i64,
    pub active_guests: i64,
    pub inactive_guests: i64,
    pub updated_at: DateTime<Utc>,
}

impl PgStats {
    /// Counters as they would be after applying `deltas`, validated.
    pub fn with_deltas(&self, deltas: CounterDeltas) -> Result<NewPgStats, DomainError> {
        let next = NewPgStats {
            total_rooms_occupied: self.total_rooms_occupied,
            total_guests: self.total_guests.saturating_add(deltas.total_guests),
            active_guests: self.active_guests.saturating_add(deltas.active_guests),
            inactive_guests: self.inactive_guests.saturating_add(deltas.inactive_guests),
        };
        next.validate()?;
        Ok(next)
    }

    /// True when the stored room count matches the derived value
    pub fn rooms_consistent(&self) -> bool {
        self.total_rooms_occupied == rooms_for_active_guests(self.active_guests)
    }
}

/// Counter values for a record being created or overwritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NewPgStats {
    pub total_rooms_occupied: i32,
    pub total_guests: i64,
    pub active_guests: i64,
    pub inactive_guests: i64,
}

impl NewPgStats {
    /// Initial record for the facility's first guest
    pub fn for_first_guest(status: GuestStatus) -> Self {
        let deltas = CounterDeltas::guest_added(status);
        Self {
            total_rooms_occupied: rooms_for_active_guests(deltas.active_guests),
            total_guests: deltas.total_guests,
            active_guests: deltas.active_guests,
            inactive_guests: deltas.inactive_guests,
        }
    }

    /// Zero-defaulted record with `deltas` applied (implicit upsert)
    pub fn from_deltas(deltas: CounterDeltas) -> Self {
        Self {
            total_rooms_occupied: 0,
            total_guests: deltas.total_guests,
            active_guests: deltas.active_guests,
            inactive_guests: deltas.inactive_guests,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0..=MAX_ROOMS).contains(&self.total_rooms_occupied) {
            return Err(DomainError::InvalidCounters(format!(
                "total_rooms_occupied {} outside 0..={}",
                self.total_rooms_occupied, MAX_ROOMS
            )));
        }
        if self.total_guests < 0 || self.active_guests < 0 || self.inactive_guests < 0 {
            return Err(DomainError::InvalidCounters(format!(
                "negative guest counter (total {}, active {}, inactive {})",
                self.total_guests, self.active_guests, self.inactive_guests
            )));
        }
        Ok(())
    }
}

/// Signed adjustments to the guest counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterDeltas {
    pub total_guests: i64,
    pub active_guests: i64,
    pub inactive_guests: i64,
}

impl CounterDeltas {
    fn by_status(status: GuestStatus, amount: i64) -> (i64, i64) {
        match status {
            GuestStatus::Active => (amount, 0),
            GuestStatus::Inactive => (0, amount),
        }
    }

    pub fn guest_added(status: GuestStatus) -> Self {
        let (active_guests, inactive_guests) = Self::by_status(status, 1);
        Self {
            total_guests: 1,
            active_guests,
            inactive_guests,
        }
    }

    pub fn guest_removed(status: GuestStatus) -> Self {
        let (active_guests, inactive_guests) = Self::by_status(status, -1);
        Self {
            total_guests: -1,
            active_guests,
            inactive_guests,
        }
    }

    /// Moves one guest between the active and inactive buckets.
    /// `None` when the status did not change.
    pub fn status_changed(old: GuestStatus, new: GuestStatus) -> Option<Self> {
        if old == new {
            return None;
        }
        let (active_in, inactive_in) = Self::by_status(new, 1);
        let (active_out, inactive_out) = Self::by_status(old, -1);
        Some(Self {
            total_guests: 0,
            active_guests: active_in + active_out,
            inactive_guests: inactive_in + inactive_out,
        })
    }
}
