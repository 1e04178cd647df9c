//! Create Guest Handler
//!
//! Registers a guest: room, address, guest record, first payment, bed and
//! facility counters, in that order. Each step commits on its own.

use crate::domain::{
    CounterDeltas, DomainError, GuestWithAddress, NewGuest, NewPayment, NewRoom,
    OperationContext, MAX_ROOMS,
};
use crate::error::{AppError, AppResult};
use crate::projection::OccupancyProjection;
use crate::saga::Saga;
use crate::store::Stores;

use super::beds;
use super::commands::{CreateGuestCommand, CreateGuestResult};

/// Handler for guest creation
pub struct CreateGuestHandler {
    stores: Stores,
    projection: OccupancyProjection,
}

impl CreateGuestHandler {
    pub fn new(stores: Stores) -> Self {
        Self {
            projection: OccupancyProjection::new(stores.pg_stats.clone()),
            stores,
        }
    }

    /// Execute the create guest command
    pub async fn execute(
        &self,
        command: CreateGuestCommand,
        context: &OperationContext,
    ) -> AppResult<CreateGuestResult> {
        let registration = command.validate()?;
        let room_no = registration.room_no;
        let mut saga = Saga::new("create_guest");

        let taken = saga
            .required(
                "check_mobile_number",
                self.stores
                    .guests
                    .find_by_mobile_number(&registration.mobile_number),
            )
            .await?;
        if taken.is_some() {
            return Err(DomainError::DuplicateMobileNumber(registration.mobile_number).into());
        }

        // Room: reuse when it has a free bed, otherwise create it under the facility cap
        let existing_room = saga
            .required("lookup_room", self.stores.rooms.find_by_room_no(room_no))
            .await?;

        let (room, created_room) = match existing_room {
            Some(room) => {
                if !room.has_vacancy() {
                    return Err(DomainError::NoVacantBeds { room_no }.into());
                }
                (room, false)
            }
            None => {
                let stats = saga
                    .required("check_room_limit", self.projection.current())
                    .await?;
                if stats.is_some_and(|s| s.total_rooms_occupied >= MAX_ROOMS) {
                    return Err(DomainError::RoomLimitReached {
                        max_rooms: MAX_ROOMS,
                    }
                    .into());
                }

                let created = saga
                    .required("create_room", async {
                        match self
                            .stores
                            .rooms
                            .create(NewRoom::with_first_occupant(room_no))
                            .await
                        {
                            Ok(room) => Ok(Some(room)),
                            Err(err) if err.is_duplicate() => Ok(None),
                            Err(err) => Err(err),
                        }
                    })
                    .await?;

                match created {
                    Some(room) => (room, true),
                    // Lost a race to create the same room; join it as an existing room
                    None => {
                        let room = saga
                            .required("reload_room", self.stores.rooms.find_by_room_no(room_no))
                            .await?
                            .ok_or(DomainError::RoomNotFound(room_no))?;
                        if !room.has_vacancy() {
                            return Err(DomainError::NoVacantBeds { room_no }.into());
                        }
                        (room, false)
                    }
                }
            }
        };

        let address = saga
            .required(
                "create_address",
                self.stores.addresses.create(registration.address),
            )
            .await?;

        let mobile_number = registration.mobile_number.clone();
        let new_guest = NewGuest {
            name: registration.name,
            age: registration.age,
            mobile_number: registration.mobile_number,
            address_id: address.id,
            room_no,
            status: registration.status,
        };
        let guest = saga
            .required("create_guest", async {
                self.stores
                    .guests
                    .create(new_guest)
                    .await
                    .map_err(|err| {
                        if err.is_duplicate() {
                            AppError::from(DomainError::DuplicateMobileNumber(mobile_number))
                        } else {
                            AppError::from(err)
                        }
                    })
            })
            .await?;

        let payment = saga
            .required(
                "create_payment",
                self.stores.payments.create(NewPayment::new(
                    guest.id,
                    registration.payment_amount,
                    registration.payment_date,
                )),
            )
            .await?;

        // A newly created room already counts its first occupant
        let room = if created_room {
            room
        } else {
            saga.required("occupy_bed", beds::occupy_bed(self.stores.rooms.as_ref(), room_no))
                .await?
        };

        let existing_stats = saga
            .required("read_pg_stats", self.projection.current())
            .await?;
        let initialized = match existing_stats {
            Some(_) => None,
            None => {
                saga.required("create_pg_stats", self.projection.initialize(guest.status))
                    .await?
            }
        };
        if initialized.is_none() {
            saga.required(
                "increment_pg_counters",
                self.projection
                    .apply_deltas(CounterDeltas::guest_added(guest.status)),
            )
            .await?;
            saga.required("recompute_rooms_occupied", self.projection.recompute_rooms())
                .await?;
        }

        tracing::info!(
            guest_id = %guest.id,
            room_no,
            created_room,
            status = guest.status.code(),
            correlation_id = ?context.correlation_id,
            "Guest created"
        );

        Ok(CreateGuestResult {
            guest: GuestWithAddress {
                guest,
                address: Some(address),
            },
            payment,
            room,
            created_room,
        })
    }
}
