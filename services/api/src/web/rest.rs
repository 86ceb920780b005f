//! services/api/src/web/rest.rs
//!
//! Assembles the REST router and the master definition for the OpenAPI
//! specification.

use crate::error::ErrorBody;
use crate::web::{
    auth::{self, AuthResponse, LoginRequest, SignupRequest},
    bookings::{
        self, BookingForm, BookingView, CreateBookingResponse, UpdateStatusRequest,
        UpdateStatusResponse,
    },
    catalog::{self, CheckoutLine, CheckoutRequest, CheckoutResponse, ProductView},
    contact::{self, ContactForm, ContactResponse},
    middleware::require_auth,
    state::AppState,
};
use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        bookings::create_booking_handler,
        bookings::list_my_bookings_handler,
        bookings::list_all_bookings_handler,
        bookings::update_booking_status_handler,
        contact::contact_handler,
        catalog::list_products_handler,
        catalog::list_service_types_handler,
        catalog::list_booking_statuses_handler,
        catalog::checkout_link_handler,
    ),
    components(
        schemas(
            SignupRequest, LoginRequest, AuthResponse,
            BookingForm, BookingView, CreateBookingResponse,
            UpdateStatusRequest, UpdateStatusResponse,
            ContactForm, ContactResponse,
            ProductView, CheckoutLine, CheckoutRequest, CheckoutResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "Ozonxt Storefront API", description = "Catalog, service bookings, and the admin dashboard.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router
//=========================================================================================

async fn health() -> &'static str {
    "ok"
}

/// Builds the API router. CORS and Swagger UI are layered on by the binary.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/products", get(catalog::list_products_handler))
        .route("/service-types", get(catalog::list_service_types_handler))
        .route("/booking-statuses", get(catalog::list_booking_statuses_handler))
        .route("/cart/checkout-link", post(catalog::checkout_link_handler));

    // Protected routes (auth required); admin checks happen in the booking service
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/bookings", post(bookings::create_booking_handler))
        .route("/bookings/mine", get(bookings::list_my_bookings_handler))
        .route("/admin/bookings", get(bookings::list_all_bookings_handler))
        .route(
            "/admin/bookings/{id}/status",
            patch(bookings::update_booking_status_handler),
        )
        .route("/contact", post(contact::contact_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
