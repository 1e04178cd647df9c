//! Room records and bed capacity checks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::occupancy::ROOM_CAPACITY;
use super::DomainError;

/// Persisted room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub room_no: i32,
    pub vacant_beds: i32,
    pub occupied_beds: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn total_beds(&self) -> i32 {
        self.vacant_beds + self.occupied_beds
    }

    pub fn has_vacancy(&self) -> bool {
        self.vacant_beds > 0
    }

    /// Bed counters after applying deltas, rejected if they break capacity.
    pub fn with_bed_deltas(&self, vacant_delta: i32, occupied_delta: i32) -> Result<(i32, i32), DomainError> {
        let vacant = self.vacant_beds.saturating_add(vacant_delta);
        let occupied = self.occupied_beds.saturating_add(occupied_delta);
        check_beds(self.room_no, vacant, occupied)?;
        Ok((vacant, occupied))
    }
}

/// Room about to be created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRoom {
    pub room_no: i32,
    pub vacant_beds: i32,
    pub occupied_beds: i32,
}

impl NewRoom {
    /// Empty room; `occupied_beds` defaults to 0.
    pub fn new(room_no: i32, vacant_beds: i32) -> Self {
        Self {
            room_no,
            vacant_beds,
            occupied_beds: 0,
        }
    }

    /// Full-capacity room with its first bed already taken
    pub fn with_first_occupant(room_no: i32) -> Self {
        Self {
            room_no,
            vacant_beds: (ROOM_CAPACITY - 1).max(0),
            occupied_beds: 1,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        check_beds(self.room_no, self.vacant_beds, self.occupied_beds)
    }
}

/// Both counters non-negative and their sum within capacity.
pub fn check_beds(room_no: i32, vacant: i32, occupied: i32) -> Result<(), DomainError> {
    let within_capacity = vacant
        .checked_add(occupied)
        .map(|total| total <= ROOM_CAPACITY)
        .unwrap_or(false);

    if vacant < 0 || occupied < 0 || !within_capacity {
        return Err(DomainError::InvalidBeds {
            room_no,
            vacant,
            occupied,
        });
    }
    Ok(())
}
