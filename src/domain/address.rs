//! Address records, one per guest

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

/// Persisted address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub door_no: String,
    pub street: String,
    pub state: String,
    pub pincode: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Address fields as supplied by a caller. Every field is required on create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    #[serde(default)]
    pub door_no: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
}

/// Validated address ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub door_no: String,
    pub street: String,
    pub state: String,
    pub pincode: String,
}

impl AddressInput {
    /// Require all four fields to be present and non-blank.
    pub fn validate(self) -> Result<NewAddress, DomainError> {
        fn required(value: Option<String>) -> Result<String, DomainError> {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| DomainError::validation("Address details are required"))
        }

        Ok(NewAddress {
            door_no: required(self.door_no)?,
            street: required(self.street)?,
            state: required(self.state)?,
            pincode: required(self.pincode)?,
        })
    }
}

/// Partial address update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

impl AddressChanges {
    pub fn apply_to(&self, address: &mut Address) {
        if let Some(door_no) = &self.door_no {
            address.door_no = door_no.clone();
        }
        if let Some(street) = &self.street {
            address.street = street.clone();
        }
        if let Some(state) = &self.state {
            address.state = state.clone();
        }
        if let Some(pincode) = &self.pincode {
            address.pincode = pincode.clone();
        }
    }
}
