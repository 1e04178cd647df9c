//! API Routes
//!
//! HTTP endpoint definitions. Handlers only translate between JSON and
//! coordinator calls.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coordinator::OccupancyCoordinator;
use crate::domain::{
    DomainError, GuestDetails, GuestWithAddress, OperationContext, Payment, PgStats, Room,
};
use crate::error::AppError;
use crate::handlers::{
    CreateGuestCommand, CreateGuestResult, DeleteGuestCommand, DeleteGuestResult, GuestUpdate,
    UpdateGuestCommand,
};

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct PaymentsQuery {
    #[serde(default)]
    pub guest_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct GuestListResponse {
    pub guests: Vec<GuestDetails>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct PaymentListResponse {
    pub payments: Vec<Payment>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct RoomListResponse {
    pub rooms: Vec<Room>,
    pub total: usize,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<OccupancyCoordinator> {
    Router::new()
        .route("/guests", get(list_guests).post(create_guest))
        .route(
            "/guests/:guest_id",
            get(get_guest).put(update_guest).delete(delete_guest),
        )
        .route("/guests/:guest_id/payments", get(get_guest_payments))
        .route("/payments", get(list_payments))
        .route("/rooms", get(list_rooms))
        .route("/pg", get(get_pg_stats))
}

/// Unwrap a JSON body. Malformed bodies and out-of-range values (a negative
/// amount, an unknown status) are reported as validation errors.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(DomainError::validation(rejection.body_text()).into()),
    }
}

// =========================================================================
// Guests
// =========================================================================

/// Register a guest
async fn create_guest(
    State(coordinator): State<OccupancyCoordinator>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<CreateGuestCommand>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateGuestResult>), AppError> {
    let command = json_body(payload)?;
    let result = coordinator.create_guest(command, &context).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn list_guests(
    State(coordinator): State<OccupancyCoordinator>,
) -> Result<Json<GuestListResponse>, AppError> {
    let guests = coordinator.list_guests().await?;
    Ok(Json(GuestListResponse {
        total: guests.len(),
        guests,
    }))
}

async fn get_guest(
    State(coordinator): State<OccupancyCoordinator>,
    Path(guest_id): Path<Uuid>,
) -> Result<Json<GuestDetails>, AppError> {
    Ok(Json(coordinator.get_guest(guest_id).await?))
}

/// Partial update; omitted fields are left untouched
async fn update_guest(
    State(coordinator): State<OccupancyCoordinator>,
    Extension(context): Extension<OperationContext>,
    Path(guest_id): Path<Uuid>,
    payload: Result<Json<GuestUpdate>, JsonRejection>,
) -> Result<Json<GuestWithAddress>, AppError> {
    let command = UpdateGuestCommand::new(guest_id, json_body(payload)?);
    Ok(Json(coordinator.update_guest(command, &context).await?))
}

async fn delete_guest(
    State(coordinator): State<OccupancyCoordinator>,
    Extension(context): Extension<OperationContext>,
    Path(guest_id): Path<Uuid>,
) -> Result<Json<DeleteGuestResult>, AppError> {
    let command = DeleteGuestCommand::new(guest_id);
    Ok(Json(coordinator.delete_guest(command, &context).await?))
}

async fn get_guest_payments(
    State(coordinator): State<OccupancyCoordinator>,
    Path(guest_id): Path<Uuid>,
) -> Result<Json<PaymentListResponse>, AppError> {
    payments_response(&coordinator, Some(guest_id)).await
}

// =========================================================================
// Payments, rooms, facility counters
// =========================================================================

async fn list_payments(
    State(coordinator): State<OccupancyCoordinator>,
    Query(query): Query<PaymentsQuery>,
) -> Result<Json<PaymentListResponse>, AppError> {
    payments_response(&coordinator, query.guest_id).await
}

async fn payments_response(
    coordinator: &OccupancyCoordinator,
    guest_id: Option<Uuid>,
) -> Result<Json<PaymentListResponse>, AppError> {
    let payments = coordinator.list_payments(guest_id).await?;
    Ok(Json(PaymentListResponse {
        total: payments.len(),
        payments,
    }))
}

async fn list_rooms(
    State(coordinator): State<OccupancyCoordinator>,
) -> Result<Json<RoomListResponse>, AppError> {
    let rooms = coordinator.list_rooms().await?;
    Ok(Json(RoomListResponse {
        total: rooms.len(),
        rooms,
    }))
}

/// Facility counters; `null` before the first guest is registered
async fn get_pg_stats(
    State(coordinator): State<OccupancyCoordinator>,
) -> Result<Json<Option<PgStats>>, AppError> {
    Ok(Json(coordinator.pg_stats().await?))
}
