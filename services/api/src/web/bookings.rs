//! services/api/src/web/bookings.rs
//!
//! Handlers for the booking lifecycle: submission, "my bookings", and the
//! admin dashboard's list and status update.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use ozonxt_core::{notify, Booking, BookingRequest, Identity};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{booking_error_response, ErrorBody, HandlerError};
use crate::web::state::AppState;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The booking form. Every field is validated server-side.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[schema(example = "Installation")]
    pub service_type: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub preferred_date: String,
    #[schema(example = "10:00")]
    pub preferred_time: String,
}

impl From<BookingForm> for BookingRequest {
    fn from(form: BookingForm) -> Self {
        Self {
            name: form.name,
            email: form.email,
            phone: form.phone,
            service_type: form.service_type,
            preferred_date: form.preferred_date,
            preferred_time: form.preferred_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: Uuid,
    #[schema(example = "OZN0001")]
    pub display_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_type: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    pub status: String,
    pub user_email: String,
    pub booked_at: DateTime<Utc>,
}

impl From<Booking> for BookingView {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            display_id: booking.display_id.to_string(),
            name: booking.name,
            email: booking.email,
            phone: booking.phone,
            service_type: booking.service_type.to_string(),
            preferred_date: booking.preferred_date,
            preferred_time: booking.preferred_time,
            status: booking.status.to_string(),
            user_email: booking.owner_email,
            booked_at: booking.booked_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub display_id: String,
    pub message: String,
    /// Pre-filled message to the business, opened by the client.
    pub whatsapp_url: String,
    pub booking: BookingView,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[schema(example = "Scheduled")]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub status: String,
    pub message: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Submit a service booking for the signed-in user.
#[utoipa::path(
    post,
    path = "/bookings",
    request_body = BookingForm,
    responses(
        (status = 201, description = "Booking created", body = CreateBookingResponse),
        (status = 400, description = "Validation failed; `errors` maps field to messages", body = ErrorBody),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "Too many concurrent bookings; retry", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(form): Json<BookingForm>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), HandlerError> {
    let receipt = state
        .bookings
        .submit(&identity, form.into())
        .await
        .map_err(booking_error_response)?;

    let whatsapp_url = notify::whatsapp_link(
        &state.config.whatsapp_phone_number,
        &notify::booking_message(&receipt.booking),
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            display_id: receipt.booking.display_id.to_string(),
            message: receipt.message,
            whatsapp_url,
            booking: receipt.booking.into(),
        }),
    ))
}

/// List the signed-in user's bookings, newest first.
#[utoipa::path(
    get,
    path = "/bookings/mine",
    responses(
        (status = 200, description = "The caller's bookings", body = [BookingView]),
        (status = 401, description = "Not signed in"),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    )
)]
pub async fn list_my_bookings_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<BookingView>>, HandlerError> {
    let bookings = state
        .bookings
        .list_for_owner(&identity.email)
        .await
        .map_err(booking_error_response)?;
    Ok(Json(bookings.into_iter().map(BookingView::from).collect()))
}

/// List every booking, newest first. Admins only.
#[utoipa::path(
    get,
    path = "/admin/bookings",
    responses(
        (status = 200, description = "All bookings", body = [BookingView]),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Caller is not an admin", body = ErrorBody)
    )
)]
pub async fn list_all_bookings_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<BookingView>>, HandlerError> {
    let bookings = state
        .bookings
        .list_all(&identity)
        .await
        .map_err(booking_error_response)?;
    Ok(Json(bookings.into_iter().map(BookingView::from).collect()))
}

/// Set a booking's status. Admins only.
#[utoipa::path(
    patch,
    path = "/admin/bookings/{id}/status",
    request_body = UpdateStatusRequest,
    params(
        ("id" = Uuid, Path, description = "Internal booking id")
    ),
    responses(
        (status = 200, description = "Status updated", body = UpdateStatusResponse),
        (status = 401, description = "Not signed in"),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
        (status = 404, description = "Booking not found", body = ErrorBody),
        (status = 422, description = "Unknown status value", body = ErrorBody)
    )
)]
pub async fn update_booking_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, HandlerError> {
    let status = state
        .bookings
        .update_status(&identity, booking_id, &req.status)
        .await
        .map_err(booking_error_response)?;
    Ok(Json(UpdateStatusResponse {
        status: status.to_string(),
        message: format!("Booking status updated to {}.", status),
    }))
}
