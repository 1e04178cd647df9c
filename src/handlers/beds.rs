//! Bed counter moves shared by the guest handlers

use crate::domain::{DomainError, Room};
use crate::error::{AppError, AppResult};
use crate::store::RoomStore;

/// Take one bed in `room_no` (`vacant - 1`, `occupied + 1`).
///
/// The store applies the delta atomically and refuses it when no bed is
/// vacant, so a room filled by a concurrent caller is reported as
/// [`DomainError::NoVacantBeds`].
pub(crate) async fn occupy_bed(rooms: &dyn RoomStore, room_no: i32) -> AppResult<Room> {
    match rooms.increment_beds(room_no, -1, 1).await {
        Ok(Some(room)) => Ok(room),
        Ok(None) => Err(DomainError::RoomNotFound(room_no).into()),
        Err(err) if err.is_constraint_violation() => {
            Err(DomainError::NoVacantBeds { room_no }.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Release one bed in `room_no` (`vacant + 1`, `occupied - 1`).
pub(crate) async fn free_bed(rooms: &dyn RoomStore, room_no: i32) -> AppResult<Room> {
    rooms
        .increment_beds(room_no, 1, -1)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| DomainError::RoomNotFound(room_no).into())
}

/// Load a room that must exist and have a free bed.
pub(crate) async fn vacant_room(rooms: &dyn RoomStore, room_no: i32) -> AppResult<Room> {
    let room = rooms
        .find_by_room_no(room_no)
        .await?
        .ok_or(DomainError::RoomNotFound(room_no))?;

    if !room.has_vacancy() {
        return Err(DomainError::NoVacantBeds { room_no }.into());
    }
    Ok(room)
}
