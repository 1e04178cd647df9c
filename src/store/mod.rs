//! Store module
//!
//! Narrow CRUD interfaces over the record stores the coordinator works with.
//! Every write is committed on its own; none of these traits offers a
//! transaction spanning more than one record.
//!
//! Two backends implement all five traits:
//! - [`PostgresStore`] for production
//! - [`MemoryStore`] for tests and the `memory` storage backend

mod error;
mod memory;
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Address, AddressChanges, CounterDeltas, Guest, GuestChanges, NewAddress, NewGuest, NewPayment,
    NewPgStats, NewRoom, Payment, PgStats, Room,
};

pub use error::StoreError;
pub use memory::{MemoryStore, StoreOp};
pub use postgres::PostgresStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Guest records
#[async_trait]
pub trait GuestStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Guest>>;

    async fn find_by_mobile_number(&self, mobile_number: &str) -> StoreResult<Option<Guest>>;

    /// All guests, oldest first
    async fn find_all(&self) -> StoreResult<Vec<Guest>>;

    /// Fails with [`StoreError::Duplicate`] when the mobile number is taken
    async fn create(&self, guest: NewGuest) -> StoreResult<Guest>;

    /// Merge `changes` into the record; `None` if it does not exist
    async fn update(&self, id: Uuid, changes: GuestChanges) -> StoreResult<Option<Guest>>;

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Guest>>;
}

/// Address records
#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Address>>;

    async fn create(&self, address: NewAddress) -> StoreResult<Address>;

    async fn update(&self, id: Uuid, changes: AddressChanges) -> StoreResult<Option<Address>>;

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Address>>;
}

/// Room records
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn find_by_room_no(&self, room_no: i32) -> StoreResult<Option<Room>>;

    /// All rooms ordered by room number
    async fn find_all(&self) -> StoreResult<Vec<Room>>;

    async fn create(&self, room: NewRoom) -> StoreResult<Room>;

    /// Atomically add the deltas to the bed counters.
    ///
    /// The write is rejected with [`StoreError::ConstraintViolation`] if the
    /// result would break the room capacity. `None` if the room does not exist.
    async fn increment_beds(
        &self,
        room_no: i32,
        vacant_delta: i32,
        occupied_delta: i32,
    ) -> StoreResult<Option<Room>>;
}

/// Payment records (append-only)
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create(&self, payment: NewPayment) -> StoreResult<Payment>;

    async fn find_by_guest_id(&self, guest_id: Uuid) -> StoreResult<Vec<Payment>>;

    async fn find_all(&self) -> StoreResult<Vec<Payment>>;
}

/// The facility counters singleton
#[async_trait]
pub trait PgStatsStore: Send + Sync {
    async fn find(&self) -> StoreResult<Option<PgStats>>;

    /// Fails with [`StoreError::Duplicate`] if the record already exists
    async fn create(&self, stats: NewPgStats) -> StoreResult<PgStats>;

    /// Atomically add `deltas`, creating a zero-defaulted record first if absent
    async fn increment_counters(&self, deltas: CounterDeltas) -> StoreResult<PgStats>;

    /// Overwrite the derived room count; `None` if the record does not exist
    async fn set_total_rooms_occupied(&self, total_rooms_occupied: i32) -> StoreResult<Option<PgStats>>;
}

/// The set of store collaborators handed to the coordinator
#[derive(Clone)]
pub struct Stores {
    pub guests: Arc<dyn GuestStore>,
    pub addresses: Arc<dyn AddressStore>,
    pub rooms: Arc<dyn RoomStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub pg_stats: Arc<dyn PgStatsStore>,
}

impl Stores {
    /// Use one backend for every store
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: GuestStore + AddressStore + RoomStore + PaymentStore + PgStatsStore + 'static,
    {
        Self {
            guests: backend.clone(),
            addresses: backend.clone(),
            rooms: backend.clone(),
            payments: backend.clone(),
            pg_stats: backend,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
