//! Guest records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Address, DomainError, Payment};

/// Guest status, stored as a tiny integer (`0` inactive, `1` active)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum GuestStatus {
    Inactive,
    #[default]
    Active,
}

impl GuestStatus {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    /// Numeric code used in storage and on the wire
    pub fn code(self) -> i16 {
        match self {
            Self::Inactive => 0,
            Self::Active => 1,
        }
    }
}

impl TryFrom<i16> for GuestStatus {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Inactive),
            1 => Ok(Self::Active),
            other => Err(DomainError::InvalidStatus(other)),
        }
    }
}

impl From<GuestStatus> for i16 {
    fn from(status: GuestStatus) -> Self {
        status.code()
    }
}

/// Persisted guest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub mobile_number: String,
    pub address_id: Uuid,
    pub room_no: i32,
    pub status: GuestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a guest about to be created
#[derive(Debug, Clone, PartialEq)]
pub struct NewGuest {
    pub name: String,
    pub age: i32,
    pub mobile_number: String,
    pub address_id: Uuid,
    pub room_no: i32,
    pub status: GuestStatus,
}

/// Partial guest update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_no: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<GuestStatus>,
}

impl GuestChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.mobile_number.is_none()
            && self.room_no.is_none()
            && self.status.is_none()
    }

    /// Merge the supplied fields into `guest`.
    pub fn apply_to(&self, guest: &mut Guest) {
        if let Some(name) = &self.name {
            guest.name = name.clone();
        }
        if let Some(age) = self.age {
            guest.age = age;
        }
        if let Some(mobile_number) = &self.mobile_number {
            guest.mobile_number = mobile_number.clone();
        }
        if let Some(room_no) = self.room_no {
            guest.room_no = room_no;
        }
        if let Some(status) = self.status {
            guest.status = status;
        }
    }
}

/// Guest with its address populated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestWithAddress {
    #[serde(flatten)]
    pub guest: Guest,
    pub address: Option<Address>,
}

/// Guest with address and payment history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuestDetails {
    #[serde(flatten)]
    pub guest: GuestWithAddress,
    pub payments: Vec<Payment>,
}
