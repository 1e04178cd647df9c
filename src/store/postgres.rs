//! Postgres store
//!
//! sqlx implementation of every store trait over the tables created by
//! `migrations/001_initial_schema.sql`. Counter updates are single
//! `UPDATE ... SET x = x + $n` statements, so concurrent callers never lose an
//! increment. Table CHECK constraints reject writes that would break room
//! capacity or push a counter below zero.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::{
    Address, AddressChanges, CounterDeltas, Guest, GuestChanges, GuestStatus, NewAddress, NewGuest,
    NewPayment, NewPgStats, NewRoom, Payment, PgStats, Room,
};

use super::{
    AddressStore, GuestStore, PaymentStore, PgStatsStore, RoomStore, StoreError, StoreResult,
};

const GUEST_COLUMNS: &str =
    "id, name, age, mobile_number, address_id, room_no, status, created_at, updated_at";

const ADDRESS_COLUMNS: &str = "id, door_no, street, state, pincode, created_at, updated_at";

const ROOM_COLUMNS: &str = "room_no, vacant_beds, occupied_beds, created_at, updated_at";

const PAYMENT_COLUMNS: &str = "id, guest_id, amount, date, created_at";

const PG_STATS_COLUMNS: &str =
    "total_rooms_occupied, total_guests, active_guests, inactive_guests, updated_at";

/// Postgres-backed implementation of the record stores
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgresStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn add_counters(&self, deltas: CounterDeltas) -> StoreResult<Option<PgStats>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE pg_stats
            SET
                total_guests = total_guests + $1,
                active_guests = active_guests + $2,
                inactive_guests = inactive_guests + $3,
                updated_at = NOW()
            WHERE id
            RETURNING {PG_STATS_COLUMNS}
            "#
        ))
        .bind(deltas.total_guests)
        .bind(deltas.active_guests)
        .bind(deltas.inactive_guests)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(pg_stats_from_row).transpose()
    }
}

fn guest_from_row(row: &PgRow) -> StoreResult<Guest> {
    let status: i16 = row.try_get("status")?;
    let status =
        GuestStatus::try_from(status).map_err(|e| StoreError::InvalidData(e.to_string()))?;

    Ok(Guest {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        age: row.try_get("age")?,
        mobile_number: row.try_get("mobile_number")?,
        address_id: row.try_get("address_id")?,
        room_no: row.try_get("room_no")?,
        status,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn address_from_row(row: &PgRow) -> StoreResult<Address> {
    Ok(Address {
        id: row.try_get("id")?,
        door_no: row.try_get("door_no")?,
        street: row.try_get("street")?,
        state: row.try_get("state")?,
        pincode: row.try_get("pincode")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn room_from_row(row: &PgRow) -> StoreResult<Room> {
    Ok(Room {
        room_no: row.try_get("room_no")?,
        vacant_beds: row.try_get("vacant_beds")?,
        occupied_beds: row.try_get("occupied_beds")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn payment_from_row(row: &PgRow) -> StoreResult<Payment> {
    Ok(Payment {
        id: row.try_get("id")?,
        guest_id: row.try_get("guest_id")?,
        amount: row.try_get("amount")?,
        date: row.try_get("date")?,
        created_at: row.try_get("created_at")?,
    })
}

fn pg_stats_from_row(row: &PgRow) -> StoreResult<PgStats> {
    Ok(PgStats {
        total_rooms_occupied: row.try_get("total_rooms_occupied")?,
        total_guests: row.try_get("total_guests")?,
        active_guests: row.try_get("active_guests")?,
        inactive_guests: row.try_get("inactive_guests")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl GuestStore for PostgresStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Guest>> {
        let row = sqlx::query(&format!("SELECT {GUEST_COLUMNS} FROM guests WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(guest_from_row).transpose()
    }

    async fn find_by_mobile_number(&self, mobile_number: &str) -> StoreResult<Option<Guest>> {
        let row = sqlx::query(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests WHERE mobile_number = $1"
        ))
        .bind(mobile_number)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(guest_from_row).transpose()
    }

    async fn find_all(&self) -> StoreResult<Vec<Guest>> {
        let rows = sqlx::query(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(guest_from_row).collect()
    }

    async fn create(&self, guest: NewGuest) -> StoreResult<Guest> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO guests (id, name, age, mobile_number, address_id, room_no, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING {GUEST_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&guest.name)
        .bind(guest.age)
        .bind(&guest.mobile_number)
        .bind(guest.address_id)
        .bind(guest.room_no)
        .bind(guest.status.code())
        .fetch_one(&self.pool)
        .await?;
        guest_from_row(&row)
    }

    async fn update(&self, id: Uuid, changes: GuestChanges) -> StoreResult<Option<Guest>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE guests
            SET
                name = COALESCE($2, name),
                age = COALESCE($3, age),
                mobile_number = COALESCE($4, mobile_number),
                room_no = COALESCE($5, room_no),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {GUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.age)
        .bind(changes.mobile_number)
        .bind(changes.room_no)
        .bind(changes.status.map(GuestStatus::code))
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(guest_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Guest>> {
        let row = sqlx::query(&format!(
            "DELETE FROM guests WHERE id = $1 RETURNING {GUEST_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(guest_from_row).transpose()
    }
}

#[async_trait]
impl AddressStore for PostgresStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Address>> {
        let row = sqlx::query(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(address_from_row).transpose()
    }

    async fn create(&self, address: NewAddress) -> StoreResult<Address> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO addresses (id, door_no, street, state, pincode, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&address.door_no)
        .bind(&address.street)
        .bind(&address.state)
        .bind(&address.pincode)
        .fetch_one(&self.pool)
        .await?;
        address_from_row(&row)
    }

    async fn update(&self, id: Uuid, changes: AddressChanges) -> StoreResult<Option<Address>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE addresses
            SET
                door_no = COALESCE($2, door_no),
                street = COALESCE($3, street),
                state = COALESCE($4, state),
                pincode = COALESCE($5, pincode),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.door_no)
        .bind(changes.street)
        .bind(changes.state)
        .bind(changes.pincode)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(address_from_row).transpose()
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Option<Address>> {
        let row = sqlx::query(&format!(
            "DELETE FROM addresses WHERE id = $1 RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(address_from_row).transpose()
    }
}

#[async_trait]
impl RoomStore for PostgresStore {
    async fn find_by_room_no(&self, room_no: i32) -> StoreResult<Option<Room>> {
        let row = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE room_no = $1"
        ))
        .bind(room_no)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(room_from_row).transpose()
    }

    async fn find_all(&self) -> StoreResult<Vec<Room>> {
        let rows = sqlx::query(&format!("SELECT {ROOM_COLUMNS} FROM rooms ORDER BY room_no"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(room_from_row).collect()
    }

    async fn create(&self, room: NewRoom) -> StoreResult<Room> {
        room.validate()?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO rooms (room_no, vacant_beds, occupied_beds, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING {ROOM_COLUMNS}
            "#
        ))
        .bind(room.room_no)
        .bind(room.vacant_beds)
        .bind(room.occupied_beds)
        .fetch_one(&self.pool)
        .await?;
        room_from_row(&row)
    }

    async fn increment_beds(
        &self,
        room_no: i32,
        vacant_delta: i32,
        occupied_delta: i32,
    ) -> StoreResult<Option<Room>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE rooms
            SET
                vacant_beds = vacant_beds + $2,
                occupied_beds = occupied_beds + $3,
                updated_at = NOW()
            WHERE room_no = $1
            RETURNING {ROOM_COLUMNS}
            "#
        ))
        .bind(room_no)
        .bind(vacant_delta)
        .bind(occupied_delta)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(room_from_row).transpose()
    }
}

#[async_trait]
impl PaymentStore for PostgresStore {
    async fn create(&self, payment: NewPayment) -> StoreResult<Payment> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payments (id, guest_id, amount, date, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(payment.guest_id)
        .bind(payment.amount.value())
        .bind(payment.date)
        .fetch_one(&self.pool)
        .await?;
        payment_from_row(&row)
    }

    async fn find_by_guest_id(&self, guest_id: Uuid) -> StoreResult<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE guest_id = $1 ORDER BY date, id"
        ))
        .bind(guest_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(payment_from_row).collect()
    }

    async fn find_all(&self) -> StoreResult<Vec<Payment>> {
        let rows = sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY date, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(payment_from_row).collect()
    }
}

#[async_trait]
impl PgStatsStore for PostgresStore {
    async fn find(&self) -> StoreResult<Option<PgStats>> {
        let row = sqlx::query(&format!("SELECT {PG_STATS_COLUMNS} FROM pg_stats WHERE id"))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(pg_stats_from_row).transpose()
    }

    async fn create(&self, stats: NewPgStats) -> StoreResult<PgStats> {
        stats.validate()?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO pg_stats (id, total_rooms_occupied, total_guests, active_guests, inactive_guests, updated_at)
            VALUES (TRUE, $1, $2, $3, $4, NOW())
            RETURNING {PG_STATS_COLUMNS}
            "#
        ))
        .bind(stats.total_rooms_occupied)
        .bind(stats.total_guests)
        .bind(stats.active_guests)
        .bind(stats.inactive_guests)
        .fetch_one(&self.pool)
        .await?;
        pg_stats_from_row(&row)
    }

    async fn increment_counters(&self, deltas: CounterDeltas) -> StoreResult<PgStats> {
        if let Some(stats) = self.add_counters(deltas).await? {
            return Ok(stats);
        }

        // No row yet: insert the deltas over zero defaults. CHECK constraints
        // are evaluated on the proposed row even under ON CONFLICT DO UPDATE,
        // so the upsert is split into update / insert-or-nothing / update.
        let inserted = sqlx::query(&format!(
            r#"
            INSERT INTO pg_stats (id, total_rooms_occupied, total_guests, active_guests, inactive_guests, updated_at)
            VALUES (TRUE, 0, $1, $2, $3, NOW())
            ON CONFLICT (id) DO NOTHING
            RETURNING {PG_STATS_COLUMNS}
            "#
        ))
        .bind(deltas.total_guests)
        .bind(deltas.active_guests)
        .bind(deltas.inactive_guests)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return pg_stats_from_row(&row);
        }

        // A concurrent caller created the row between the two statements
        self.add_counters(deltas).await?.ok_or_else(|| {
            StoreError::InvalidData("pg_stats row vanished during upsert".to_string())
        })
    }

    async fn set_total_rooms_occupied(&self, total_rooms_occupied: i32) -> StoreResult<Option<PgStats>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE pg_stats
            SET total_rooms_occupied = $1, updated_at = NOW()
            WHERE id
            RETURNING {PG_STATS_COLUMNS}
            "#
        ))
        .bind(total_rooms_occupied)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(pg_stats_from_row).transpose()
    }
}
