//! In-memory store
//!
//! Keeps every record in process memory behind a single lock, so each call is
//! atomic on its own, matching what the Postgres backend guarantees per
//! statement. Used by tests and by the `memory` storage backend.
//!
//! Failures can be injected per operation with [`MemoryStore::fail_next`] to
//! exercise the coordinator's behaviour when a store call fails midway.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::domain::{
    room::check_beds, Address, AddressChanges, CounterDeltas, Guest, GuestChanges, NewAddress, NewGuest,
    NewPayment, NewPgStats, NewRoom, Payment, PgStats, Room, MAX_ROOMS,
};

use super::{
    AddressStore, GuestStore, PaymentStore, PgStatsStore, RoomStore, StoreError, StoreResult,
};

/// Store operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    FindGuest,
    CreateGuest,
    UpdateGuest,
    DeleteGuest,
    CreateAddress,
    UpdateAddress,
    DeleteAddress,
    FindRoom,
    CreateRoom,
    IncrementBeds,
    CreatePayment,
    FindPgStats,
    CreatePgStats,
    IncrementCounters,
    SetTotalRoomsOccupied,
}

#[derive(Debug, Default)]
struct MemoryState {
    guests: HashMap<Uuid, Guest>,
    addresses: HashMap<Uuid, Address>,
    rooms: BTreeMap<i32, Room>,
    payments: Vec<Payment>,
    pg_stats: Option<PgStats>,
}

/// Process-local implementation of every store trait
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    failures: Mutex<HashSet<StoreOp>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with [`StoreError::Unavailable`]
    pub async fn fail_next(&self, op: StoreOp) {
        self.failures.lock().await.insert(op);
    }

    async fn check(&self, op: StoreOp) -> StoreResult<()> {
        if self.failures.lock().await.remove(&op) {
            return Err(StoreError::Unavailable(format!("injected failure on {:?}", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl GuestStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Guest>> {
        self.check(StoreOp::FindGuest).await?;
        Ok(self.state.read().await.guests.get(&id).cloned())
    }

    async fn find_by_mobile_number(&self, mobile_number: &str) -> StoreResult<Option<Guest>> {
        self.check(StoreOp::FindGuest).await?;
        let state = self.state.read().await;
        Ok(state
            .guests
            .values()
            .find(|g| g.mobile_number == mobile_number)
            .cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Guest>> {
        self.check(StoreOp::FindGuest).await?;
        let mut guests: Vec<Guest> = self.state.read().await.guests.values().cloned().collect();
        guests.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(guests)
    }

    async fn create(&self, guest: NewGuest) -> StoreResult<Guest> {
        self.check(StoreOp::CreateGuest).await?;
        let mut state = self.state.write().await;

        if state.guests.values().any(|g| g.mobile_number == guest.mobile_number) {
            return Err(StoreError::Duplicate(format!(
                "guests.mobile_number = {}",
                guest.mobile_number
            )));
        }
        if state.guests.values().any(|g| g.address_id == guest.address_id) {
            return Err(StoreError::Duplicate(format!(
                "guests.address_id = {}",
                guest.address_id
            )));
        }

        let now = Utc::now();
        let record = Guest {
            id: Uuid::new_v4(),
            name: guest.name,
            age: guest.age,
            mobile_number: guest.mobile_number,
            address_id: guest.address_id,
            room_no: guest.room_no,
            status: guest.status,
            created_at: now,
            updated_at: now,
        };
        state.guests.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, changes: GuestChanges) -> StoreResult<Option<Guest>> {
        self.check(StoreOp::UpdateGuest).await?;
        let mut state = self.state.write().await;

        if let Some(mobile_number) = &changes.mobile_number {
            let taken = state
                .guests
                .values()
                .any(|g| g.id != id && &g.mobile_number == mobile_number);
            if taken {
                return Err(StoreError::Duplicate(format!(
                    "guests.mobile_number = {}",
                    mobile_number
                )));
            }
        }

        Ok(state.guests.get_mut(&id).map(|guest| {
            changes.apply_to(guest);
            guest.updated_at = Utc::now();
            guest.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Guest>> {
        self.check(StoreOp::DeleteGuest).await?;
        Ok(self.state.write().await.guests.remove(&id))
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Address>> {
        Ok(self.state.read().await.addresses.get(&id).cloned())
    }

    async fn create(&self, address: NewAddress) -> StoreResult<Address> {
        self.check(StoreOp::CreateAddress).await?;
        let now = Utc::now();
        let record = Address {
            id: Uuid::new_v4(),
            door_no: address.door_no,
            street: address.street,
            state: address.state,
            pincode: address.pincode,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .addresses
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, changes: AddressChanges) -> StoreResult<Option<Address>> {
        self.check(StoreOp::UpdateAddress).await?;
        let mut state = self.state.write().await;
        Ok(state.addresses.get_mut(&id).map(|address| {
            changes.apply_to(address);
            address.updated_at = Utc::now();
            address.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Address>> {
        self.check(StoreOp::DeleteAddress).await?;
        Ok(self.state.write().await.addresses.remove(&id))
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn find_by_room_no(&self, room_no: i32) -> StoreResult<Option<Room>> {
        self.check(StoreOp::FindRoom).await?;
        Ok(self.state.read().await.rooms.get(&room_no).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Room>> {
        self.check(StoreOp::FindRoom).await?;
        Ok(self.state.read().await.rooms.values().cloned().collect())
    }

    async fn create(&self, room: NewRoom) -> StoreResult<Room> {
        self.check(StoreOp::CreateRoom).await?;
        room.validate()?;

        let mut state = self.state.write().await;
        if state.rooms.contains_key(&room.room_no) {
            return Err(StoreError::Duplicate(format!("rooms.room_no = {}", room.room_no)));
        }

        let now = Utc::now();
        let record = Room {
            room_no: room.room_no,
            vacant_beds: room.vacant_beds,
            occupied_beds: room.occupied_beds,
            created_at: now,
            updated_at: now,
        };
        state.rooms.insert(record.room_no, record.clone());
        Ok(record)
    }

    async fn increment_beds(
        &self,
        room_no: i32,
        vacant_delta: i32,
        occupied_delta: i32,
    ) -> StoreResult<Option<Room>> {
        self.check(StoreOp::IncrementBeds).await?;
        let mut state = self.state.write().await;

        let Some(room) = state.rooms.get_mut(&room_no) else {
            return Ok(None);
        };

        let (vacant, occupied) = room.with_bed_deltas(vacant_delta, occupied_delta)?;
        room.vacant_beds = vacant;
        room.occupied_beds = occupied;
        room.updated_at = Utc::now();
        Ok(Some(room.clone()))
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn create(&self, payment: NewPayment) -> StoreResult<Payment> {
        self.check(StoreOp::CreatePayment).await?;
        let record = Payment {
            id: Uuid::new_v4(),
            guest_id: payment.guest_id,
            amount: payment.amount.value(),
            date: payment.date,
            created_at: Utc::now(),
        };
        self.state.write().await.payments.push(record.clone());
        Ok(record)
    }

    async fn find_by_guest_id(&self, guest_id: Uuid) -> StoreResult<Vec<Payment>> {
        let state = self.state.read().await;
        Ok(state
            .payments
            .iter()
            .filter(|p| p.guest_id == guest_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> StoreResult<Vec<Payment>> {
        Ok(self.state.read().await.payments.clone())
    }
}

#[async_trait]
impl PgStatsStore for MemoryStore {
    async fn find(&self) -> StoreResult<Option<PgStats>> {
        self.check(StoreOp::FindPgStats).await?;
        Ok(self.state.read().await.pg_stats.clone())
    }

    async fn create(&self, stats: NewPgStats) -> StoreResult<PgStats> {
        self.check(StoreOp::CreatePgStats).await?;
        stats.validate()?;

        let mut state = self.state.write().await;
        if state.pg_stats.is_some() {
            return Err(StoreError::Duplicate("pg_stats singleton".to_string()));
        }

        let record = PgStats {
            total_rooms_occupied: stats.total_rooms_occupied,
            total_guests: stats.total_guests,
            active_guests: stats.active_guests,
            inactive_guests: stats.inactive_guests,
            updated_at: Utc::now(),
        };
        state.pg_stats = Some(record.clone());
        Ok(record)
    }

    async fn increment_counters(&self, deltas: CounterDeltas) -> StoreResult<PgStats> {
        self.check(StoreOp::IncrementCounters).await?;
        let mut state = self.state.write().await;

        let next = match &state.pg_stats {
            Some(current) => current.with_deltas(deltas)?,
            None => {
                let fresh = NewPgStats::from_deltas(deltas);
                fresh.validate()?;
                fresh
            }
        };

        let record = PgStats {
            total_rooms_occupied: next.total_rooms_occupied,
            total_guests: next.total_guests,
            active_guests: next.active_guests,
            inactive_guests: next.inactive_guests,
            updated_at: Utc::now(),
        };
        state.pg_stats = Some(record.clone());
        Ok(record)
    }

    async fn set_total_rooms_occupied(&self, total_rooms_occupied: i32) -> StoreResult<Option<PgStats>> {
        self.check(StoreOp::SetTotalRoomsOccupied).await?;
        if !(0..=MAX_ROOMS).contains(&total_rooms_occupied) {
            return Err(StoreError::ConstraintViolation(format!(
                "total_rooms_occupied {} outside 0..={}",
                total_rooms_occupied, MAX_ROOMS
            )));
        }

        let mut state = self.state.write().await;
        Ok(state.pg_stats.as_mut().map(|stats| {
            stats.total_rooms_occupied = total_rooms_occupied;
            stats.updated_at = Utc::now();
            stats.clone()
        }))
    }
}

/// Seed a room with arbitrary counters, bypassing the coordinator
impl MemoryStore {
    pub async fn insert_room(&self, room_no: i32, vacant_beds: i32, occupied_beds: i32) -> StoreResult<Room> {
        check_beds(room_no, vacant_beds, occupied_beds)?;
        RoomStore::create(
            self,
            NewRoom {
                room_no,
                vacant_beds,
                occupied_beds,
            },
        )
        .await
    }
}
