//! Occupancy Coordinator
//!
//! Entry point for the guest lifecycle. Holds only the injected stores; every
//! call builds the handler for its intent.

use uuid::Uuid;

use crate::domain::{GuestDetails, GuestWithAddress, OperationContext, Payment, PgStats, Room};
use crate::error::AppResult;
use crate::handlers::{
    CreateGuestCommand, CreateGuestHandler, CreateGuestResult, DeleteGuestCommand,
    DeleteGuestHandler, DeleteGuestResult, QueryHandler, UpdateGuestCommand, UpdateGuestHandler,
};
use crate::store::Stores;

#[derive(Clone, Debug)]
pub struct OccupancyCoordinator {
    stores: Stores,
}

impl OccupancyCoordinator {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub async fn create_guest(
        &self,
        command: CreateGuestCommand,
        context: &OperationContext,
    ) -> AppResult<CreateGuestResult> {
        CreateGuestHandler::new(self.stores.clone())
            .execute(command, context)
            .await
    }

    pub async fn update_guest(
        &self,
        command: UpdateGuestCommand,
        context: &OperationContext,
    ) -> AppResult<GuestWithAddress> {
        UpdateGuestHandler::new(self.stores.clone())
            .execute(command, context)
            .await
    }

    pub async fn delete_guest(
        &self,
        command: DeleteGuestCommand,
        context: &OperationContext,
    ) -> AppResult<DeleteGuestResult> {
        DeleteGuestHandler::new(self.stores.clone())
            .execute(command, context)
            .await
    }

    pub async fn get_guest(&self, guest_id: Uuid) -> AppResult<GuestDetails> {
        self.queries().get_guest(guest_id).await
    }

    pub async fn list_guests(&self) -> AppResult<Vec<GuestDetails>> {
        self.queries().list_guests().await
    }

    pub async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        self.queries().list_rooms().await
    }

    pub async fn pg_stats(&self) -> AppResult<Option<PgStats>> {
        self.queries().pg_stats().await
    }

    pub async fn list_payments(&self, guest_id: Option<Uuid>) -> AppResult<Vec<Payment>> {
        self.queries().list_payments(guest_id).await
    }

    fn queries(&self) -> QueryHandler {
        QueryHandler::new(self.stores.clone())
    }
}
