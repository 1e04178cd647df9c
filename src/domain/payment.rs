//! Payment records (append-only)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PaymentAmount;

/// Persisted payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub guest_id: Uuid,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Payment fields as supplied by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInput {
    #[serde(default)]
    pub amount: Option<PaymentAmount>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Payment about to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub guest_id: Uuid,
    pub amount: PaymentAmount,
    pub date: DateTime<Utc>,
}

impl NewPayment {
    /// `date` defaults to the current time
    pub fn new(guest_id: Uuid, amount: PaymentAmount, date: Option<DateTime<Utc>>) -> Self {
        Self {
            guest_id,
            amount,
            date: date.unwrap_or_else(Utc::now),
        }
    }
}
