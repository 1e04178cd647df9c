//! Read-side queries
//!
//! Guests are returned with their address and payment history populated.

use uuid::Uuid;

use crate::domain::{DomainError, Guest, GuestDetails, GuestWithAddress, Payment, PgStats, Room};
use crate::error::AppResult;
use crate::store::Stores;

/// Handler for read queries
pub struct QueryHandler {
    stores: Stores,
}

impl QueryHandler {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn get_guest(&self, guest_id: Uuid) -> AppResult<GuestDetails> {
        let guest = self
            .stores
            .guests
            .find_by_id(guest_id)
            .await?
            .ok_or_else(|| DomainError::GuestNotFound(guest_id.to_string()))?;

        self.populate(guest).await
    }

    pub async fn list_guests(&self) -> AppResult<Vec<GuestDetails>> {
        let guests = self.stores.guests.find_all().await?;

        let mut details = Vec::with_capacity(guests.len());
        for guest in guests {
            details.push(self.populate(guest).await?);
        }
        Ok(details)
    }

    pub async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        Ok(self.stores.rooms.find_all().await?)
    }

    /// Facility counters; `None` before the first guest is registered
    pub async fn pg_stats(&self) -> AppResult<Option<PgStats>> {
        Ok(self.stores.pg_stats.find().await?)
    }

    /// Payments, optionally restricted to one guest id. Payments of deleted
    /// guests stay listed.
    pub async fn list_payments(&self, guest_id: Option<Uuid>) -> AppResult<Vec<Payment>> {
        let payments = match guest_id {
            Some(id) => self.stores.payments.find_by_guest_id(id).await?,
            None => self.stores.payments.find_all().await?,
        };
        Ok(payments)
    }

    async fn populate(&self, guest: Guest) -> AppResult<GuestDetails> {
        let address = self.stores.addresses.find_by_id(guest.address_id).await?;
        let payments = self.stores.payments.find_by_guest_id(guest.id).await?;

        Ok(GuestDetails {
            guest: GuestWithAddress { guest, address },
            payments,
        })
    }
}
