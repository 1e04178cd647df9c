//! Delete Guest Handler
//!
//! Removes a guest and its address, releases the bed and decrements the
//! facility counters. Payments are kept.

use uuid::Uuid;

use crate::domain::{has_room, CounterDeltas, DomainError, OperationContext};
use crate::error::AppResult;
use crate::projection::OccupancyProjection;
use crate::saga::Saga;
use crate::store::Stores;

use super::beds;
use super::commands::DeleteGuestResult;

/// Command to delete a guest
#[derive(Debug, Clone, Copy)]
pub struct DeleteGuestCommand {
    pub guest_id: Uuid,
}

impl DeleteGuestCommand {
    pub fn new(guest_id: Uuid) -> Self {
        Self { guest_id }
    }
}

/// Handler for guest deletion
pub struct DeleteGuestHandler {
    stores: Stores,
    projection: OccupancyProjection,
}

impl DeleteGuestHandler {
    pub fn new(stores: Stores) -> Self {
        Self {
            projection: OccupancyProjection::new(stores.pg_stats.clone()),
            stores,
        }
    }

    /// Execute the delete guest command
    pub async fn execute(
        &self,
        command: DeleteGuestCommand,
        context: &OperationContext,
    ) -> AppResult<DeleteGuestResult> {
        let guest_id = command.guest_id;
        let mut saga = Saga::new("delete_guest");

        let guest = saga
            .required("load_guest", self.stores.guests.find_by_id(guest_id))
            .await?
            .ok_or_else(|| DomainError::GuestNotFound(guest_id.to_string()))?;

        // A concurrent delete may have won between the load and here
        let deleted_guest = saga
            .required("delete_guest", self.stores.guests.delete(guest_id))
            .await?
            .ok_or_else(|| DomainError::GuestNotFound(guest_id.to_string()))?;

        let deleted_address = saga
            .best_effort(
                "delete_address",
                self.stores.addresses.delete(guest.address_id),
            )
            .await
            .flatten();

        if has_room(guest.room_no) {
            saga.best_effort(
                "free_bed",
                beds::free_bed(self.stores.rooms.as_ref(), guest.room_no),
            )
            .await;
        }

        saga.required(
            "decrement_pg_counters",
            self.projection
                .apply_deltas(CounterDeltas::guest_removed(guest.status)),
        )
        .await?;
        saga.required("recompute_rooms_occupied", self.projection.recompute_rooms())
            .await?;

        tracing::info!(
            guest_id = %guest_id,
            room_no = guest.room_no,
            address_deleted = deleted_address.is_some(),
            correlation_id = ?context.correlation_id,
            "Guest deleted"
        );

        Ok(DeleteGuestResult {
            deleted_guest,
            deleted_address,
        })
    }
}
