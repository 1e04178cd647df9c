//! pg_occupancy Library
//!
//! Guest lifecycle and bed/room bookkeeping for a paying-guest facility.
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod coordinator;
pub mod domain;
pub mod handlers;
pub mod projection;
pub mod saga;
pub mod store;

pub mod config;
pub mod db;
mod error;

pub use config::{Config, StorageBackend};
pub use coordinator::OccupancyCoordinator;
pub use domain::{DomainError, GuestStatus, OperationContext, PaymentAmount};
pub use error::{AppError, AppResult, ErrorResponse};
