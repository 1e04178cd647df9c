//! Projection module
//!
//! Keeps derived facility figures in line with the counters they come from.

mod occupancy;

pub use occupancy::OccupancyProjection;
