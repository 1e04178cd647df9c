//! Command definitions
//!
//! Commands represent intentions to change the occupancy state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Address, AddressChanges, AddressInput, DomainError, Guest, GuestChanges, GuestStatus,
    GuestWithAddress, NewAddress, Payment, PaymentAmount, PaymentInput, Room,
};

// =========================================================================
// CreateGuestCommand
// =========================================================================

/// Command to register a guest with address, first payment and a bed.
///
/// Every field is optional at the type level so that a missing field is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateGuestCommand {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub room_no: Option<i32>,
    #[serde(default)]
    pub status: Option<GuestStatus>,
    #[serde(default)]
    pub address: Option<AddressInput>,
    #[serde(default)]
    pub payment: Option<PaymentInput>,
}

impl CreateGuestCommand {
    pub fn new(name: String, age: i32, mobile_number: String, room_no: i32) -> Self {
        Self {
            name: Some(name),
            age: Some(age),
            mobile_number: Some(mobile_number),
            room_no: Some(room_no),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: GuestStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_address(mut self, door_no: &str, street: &str, state: &str, pincode: &str) -> Self {
        self.address = Some(AddressInput {
            door_no: Some(door_no.to_string()),
            street: Some(street.to_string()),
            state: Some(state.to_string()),
            pincode: Some(pincode.to_string()),
        });
        self
    }

    pub fn with_payment(mut self, amount: PaymentAmount, date: Option<DateTime<Utc>>) -> Self {
        self.payment = Some(PaymentInput {
            amount: Some(amount),
            date,
        });
        self
    }

    /// Check the preconditions of guest creation.
    pub fn validate(self) -> Result<GuestRegistration, DomainError> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| DomainError::validation("name, age, and mobile_number are required"))?;
        let age = self
            .age
            .ok_or_else(|| DomainError::validation("name, age, and mobile_number are required"))?;
        let mobile_number = self
            .mobile_number
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| DomainError::validation("name, age, and mobile_number are required"))?;
        if age < 0 {
            return Err(DomainError::validation("age must not be negative"));
        }

        let address = self
            .address
            .ok_or_else(|| DomainError::validation("Address details are required"))?
            .validate()?;

        let payment = self
            .payment
            .ok_or_else(|| DomainError::validation("Payment amount is required"))?;
        let payment_amount = payment
            .amount
            .ok_or_else(|| DomainError::validation("Payment amount is required"))?;

        let room_no = self
            .room_no
            .filter(|r| *r != 0)
            .ok_or_else(|| DomainError::validation("Room number is required"))?;

        Ok(GuestRegistration {
            name,
            age,
            mobile_number,
            room_no,
            status: self.status.unwrap_or_default(),
            address,
            payment_amount,
            payment_date: payment.date,
        })
    }
}

/// A create command that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct GuestRegistration {
    pub name: String,
    pub age: i32,
    pub mobile_number: String,
    pub room_no: i32,
    pub status: GuestStatus,
    pub address: NewAddress,
    pub payment_amount: PaymentAmount,
    pub payment_date: Option<DateTime<Utc>>,
}

// =========================================================================
// UpdateGuestCommand
// =========================================================================

/// Fields an update may carry. Presence decides what is applied: a supplied
/// `age: 0` or empty `name` is written, an omitted field is left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestUpdate {
    #[serde(flatten)]
    pub fields: GuestChanges,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressChanges>,
}

/// Command to update a guest
#[derive(Debug, Clone)]
pub struct UpdateGuestCommand {
    pub guest_id: Uuid,
    pub update: GuestUpdate,
}

impl UpdateGuestCommand {
    pub fn new(guest_id: Uuid, update: GuestUpdate) -> Self {
        Self { guest_id, update }
    }

    pub fn status(guest_id: Uuid, status: GuestStatus) -> Self {
        Self::new(
            guest_id,
            GuestUpdate {
                fields: GuestChanges {
                    status: Some(status),
                    ..Default::default()
                },
                address: None,
            },
        )
    }

    pub fn room(guest_id: Uuid, room_no: i32) -> Self {
        Self::new(
            guest_id,
            GuestUpdate {
                fields: GuestChanges {
                    room_no: Some(room_no),
                    ..Default::default()
                },
                address: None,
            },
        )
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if matches!(self.update.fields.age, Some(age) if age < 0) {
            return Err(DomainError::validation("age must not be negative"));
        }
        Ok(())
    }
}

// =========================================================================
// Results
// =========================================================================

/// Result of a successful guest creation
#[derive(Debug, Clone, Serialize)]
pub struct CreateGuestResult {
    pub guest: GuestWithAddress,
    pub payment: Payment,
    pub room: Room,
    /// True when the room did not exist and was created for this guest
    pub created_room: bool,
}

/// Result of a successful guest deletion
#[derive(Debug, Clone, Serialize)]
pub struct DeleteGuestResult {
    pub deleted_guest: Guest,
    pub deleted_address: Option<Address>,
}
