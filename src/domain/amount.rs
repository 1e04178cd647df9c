//! Payment amount type
//!
//! Domain primitive for payment amounts. Validated at construction time so
//! a negative amount can never reach the payment store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum decimal places (8)
const MAX_SCALE: u32 = 8;

/// A validated, non-negative payment amount.
///
/// # Invariants
/// - Value is never negative (zero is allowed)
/// - Maximum 8 decimal places
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use pg_occupancy::domain::PaymentAmount;
///
/// let amount = PaymentAmount::new(Decimal::new(4500, 0)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(4500, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct PaymentAmount(Decimal);

/// Errors that can occur when creating a PaymentAmount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must not be negative (got {0})")]
    Negative(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl PaymentAmount {
    /// Create a new PaymentAmount with validation.
    ///
    /// # Errors
    /// - `AmountError::Negative` if value < 0
    /// - `AmountError::TooManyDecimals` if more than 8 decimal places
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }

        if value.scale() > MAX_SCALE {
            return Err(AmountError::TooManyDecimals(value.scale()));
        }

        Ok(Self(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for PaymentAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PaymentAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s).map_err(|e| AmountError::ParseError(e.to_string()))?;
        PaymentAmount::new(decimal)
    }
}

impl TryFrom<Decimal> for PaymentAmount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        PaymentAmount::new(value)
    }
}

impl From<PaymentAmount> for Decimal {
    fn from(amount: PaymentAmount) -> Self {
        amount.0
    }
}
