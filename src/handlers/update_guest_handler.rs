//! Update Guest Handler
//!
//! Applies a partial guest update and keeps bed and facility counters in
//! step with status changes and room transfers.

use crate::domain::{
    has_room, BedPlan, CounterDeltas, DomainError, GuestWithAddress, OperationContext,
};
use crate::error::{AppError, AppResult};
use crate::projection::OccupancyProjection;
use crate::saga::Saga;
use crate::store::Stores;

use super::beds;
use super::commands::UpdateGuestCommand;

/// Handler for guest updates
pub struct UpdateGuestHandler {
    stores: Stores,
    projection: OccupancyProjection,
}

impl UpdateGuestHandler {
    pub fn new(stores: Stores) -> Self {
        Self {
            projection: OccupancyProjection::new(stores.pg_stats.clone()),
            stores,
        }
    }

    /// Execute the update guest command
    pub async fn execute(
        &self,
        command: UpdateGuestCommand,
        context: &OperationContext,
    ) -> AppResult<GuestWithAddress> {
        command.validate()?;
        let guest_id = command.guest_id;
        let fields = command.update.fields;
        let mut saga = Saga::new("update_guest");

        let guest = saga
            .required("load_guest", self.stores.guests.find_by_id(guest_id))
            .await?
            .ok_or_else(|| DomainError::GuestNotFound(guest_id.to_string()))?;

        if let Some(mobile_number) = fields.mobile_number.as_deref() {
            let holder = saga
                .required(
                    "check_mobile_number",
                    self.stores.guests.find_by_mobile_number(mobile_number),
                )
                .await?;
            if holder.is_some_and(|other| other.id != guest.id) {
                return Err(DomainError::DuplicateMobileNumber(mobile_number.to_string()).into());
            }
        }

        if let Some(address_changes) = command.update.address {
            saga.required(
                "update_address",
                self.stores.addresses.update(guest.address_id, address_changes),
            )
            .await?;
        }

        let old_status = guest.status;
        let old_room_no = guest.room_no;
        let new_status = fields.status.unwrap_or(old_status);
        let new_room_no = fields.room_no.unwrap_or(old_room_no);
        let plan = BedPlan::for_update(old_status, old_room_no, new_status, new_room_no);

        // The new bed is secured before the old one is released
        if plan.occupy_new {
            saga.required(
                "check_target_room",
                beds::vacant_room(self.stores.rooms.as_ref(), new_room_no),
            )
            .await?;
            saga.required(
                "occupy_bed",
                beds::occupy_bed(self.stores.rooms.as_ref(), new_room_no),
            )
            .await?;
        }

        if plan.free_old && has_room(old_room_no) {
            saga.best_effort(
                "free_old_bed",
                beds::free_bed(self.stores.rooms.as_ref(), old_room_no),
            )
            .await;
        }

        if let Some(deltas) = CounterDeltas::status_changed(old_status, new_status) {
            saga.required("adjust_pg_counters", self.projection.apply_deltas(deltas))
                .await?;
            saga.required("recompute_rooms_occupied", self.projection.recompute_rooms())
                .await?;
        }

        let updated = if fields.is_empty() {
            // No guest column changed, so the loaded row (and its updated_at) is current.
            // An address change is reported through `address` below.
            guest
        } else {
            let mobile_number = fields.mobile_number.clone();
            saga.required("update_guest", async {
                self.stores
                    .guests
                    .update(guest_id, fields)
                    .await
                    .map_err(|err| match mobile_number {
                        Some(mobile) if err.is_duplicate() => {
                            AppError::from(DomainError::DuplicateMobileNumber(mobile))
                        }
                        _ => AppError::from(err),
                    })
            })
            .await?
            .ok_or_else(|| DomainError::GuestNotFound(guest_id.to_string()))?
        };

        let address = saga
            .required("load_address", self.stores.addresses.find_by_id(updated.address_id))
            .await?;

        tracing::info!(
            guest_id = %guest_id,
            old_status = old_status.code(),
            new_status = new_status.code(),
            old_room_no,
            new_room_no,
            freed_bed = plan.free_old,
            occupied_bed = plan.occupy_new,
            correlation_id = ?context.correlation_id,
            "Guest updated"
        );

        Ok(GuestWithAddress {
            guest: updated,
            address,
        })
    }
}
