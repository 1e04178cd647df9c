//! Occupancy Projection
//!
//! Maintains the facility counters and the room count derived from them.
//! `total_rooms_occupied` is only ever written by [`OccupancyProjection::recompute_rooms`],
//! which recalculates it from the stored `active_guests`.

use std::sync::Arc;

use crate::domain::{rooms_for_active_guests, CounterDeltas, GuestStatus, NewPgStats, PgStats};
use crate::store::{PgStatsStore, StoreResult};

/// Projection service over the facility counters
#[derive(Clone)]
pub struct OccupancyProjection {
    pg_stats: Arc<dyn PgStatsStore>,
}

impl OccupancyProjection {
    /// Create a new OccupancyProjection
    pub fn new(pg_stats: Arc<dyn PgStatsStore>) -> Self {
        Self { pg_stats }
    }

    /// Current counters, if the facility has ever had a guest
    pub async fn current(&self) -> StoreResult<Option<PgStats>> {
        self.pg_stats.find().await
    }

    /// Create the counters for the facility's first guest.
    ///
    /// `None` when another caller created the record first; the caller then
    /// falls back to [`OccupancyProjection::apply_deltas`].
    pub async fn initialize(&self, status: GuestStatus) -> StoreResult<Option<PgStats>> {
        match self.pg_stats.create(NewPgStats::for_first_guest(status)).await {
            Ok(stats) => Ok(Some(stats)),
            Err(err) if err.is_duplicate() => {
                tracing::debug!("PG counters created concurrently; falling back to increment");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Atomically add `deltas` to the counters (upsert with zero defaults)
    pub async fn apply_deltas(&self, deltas: CounterDeltas) -> StoreResult<PgStats> {
        self.pg_stats.increment_counters(deltas).await
    }

    /// Recalculate `total_rooms_occupied` from the stored `active_guests`.
    ///
    /// Read-then-set: two concurrent recomputes may interleave and the last
    /// writer wins. Returns `None` when no counters exist yet.
    pub async fn recompute_rooms(&self) -> StoreResult<Option<i32>> {
        let Some(stats) = self.pg_stats.find().await? else {
            return Ok(None);
        };

        let total_rooms_occupied = rooms_for_active_guests(stats.active_guests);
        self.pg_stats
            .set_total_rooms_occupied(total_rooms_occupied)
            .await?;

        tracing::debug!(
            active_guests = stats.active_guests,
            total_rooms_occupied,
            "Recomputed occupied rooms"
        );

        Ok(Some(total_rooms_occupied))
    }
}
