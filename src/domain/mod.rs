//! Domain module
//!
//! Records, occupancy rules and business errors. Nothing here touches storage.

pub mod address;
pub mod amount;
pub mod context;
pub mod error;
pub mod guest;
pub mod occupancy;
pub mod payment;
pub mod pg_stats;
pub mod room;

pub use address::{Address, AddressChanges, AddressInput, NewAddress};
pub use amount::{AmountError, PaymentAmount};
pub use context::OperationContext;
pub use error::DomainError;
pub use guest::{Guest, GuestChanges, GuestDetails, GuestStatus, GuestWithAddress, NewGuest};
pub use occupancy::{has_room, rooms_for_active_guests, BedPlan, MAX_ROOMS, ROOM_CAPACITY};
pub use payment::{NewPayment, Payment, PaymentInput};
pub use pg_stats::{CounterDeltas, NewPgStats, PgStats};
pub use room::{NewRoom, Room};
