//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Domain-specific errors
///
/// These errors represent business rule violations and occupancy invariant failures.
/// They are independent of the web/storage layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A required field is missing or malformed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Creating another room would exceed the facility limit
    #[error("PG has reached the maximum rooms limit ({max_rooms})")]
    RoomLimitReached { max_rooms: i32 },

    /// Target room has no bed left
    #[error("Room {room_no} has no vacant beds available")]
    NoVacantBeds { room_no: i32 },

    /// Guest not found
    #[error("Guest not found: {0}")]
    GuestNotFound(String),

    /// Room not found
    #[error("Target room {0} does not exist")]
    RoomNotFound(i32),

    /// Another guest already uses this mobile number
    #[error("Mobile number already registered: {0}")]
    DuplicateMobileNumber(String),

    /// Bed counters outside the room capacity
    #[error("Invalid bed counts for room {room_no}: vacant {vacant}, occupied {occupied}")]
    InvalidBeds {
        room_no: i32,
        vacant: i32,
        occupied: i32,
    },

    /// Facility counters outside their allowed range
    #[error("Invalid PG counters: {0}")]
    InvalidCounters(String),

    /// Status code other than 0 or 1
    #[error("Invalid guest status: {0}")]
    InvalidStatus(i16),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
