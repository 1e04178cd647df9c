//! Command Handlers module
//!
//! Each handler runs one coordinator intent as a saga over the stores and
//! keeps the occupancy projection current.

mod beds;
mod commands;
mod create_guest_handler;
mod delete_guest_handler;
mod query_handler;
mod update_guest_handler;

#[cfg(test)]
mod tests;

pub use commands::*;
pub use create_guest_handler::CreateGuestHandler;
pub use delete_guest_handler::{DeleteGuestCommand, DeleteGuestHandler};
pub use query_handler::QueryHandler;
pub use update_guest_handler::UpdateGuestHandler;
