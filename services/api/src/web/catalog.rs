//! services/api/src/web/catalog.rs
//!
//! Public, read-only endpoints: the product catalog, the fixed enums the
//! forms are built from, and the cart checkout link.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use ozonxt_core::{
    cart::{Cart, CartItem},
    catalog::{self, Product},
    notify, BookingStatus, ServiceType,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::error::{error_response, ErrorBody, HandlerError};
use crate::web::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub original_price: Option<u64>,
    pub image_url: String,
    pub category: String,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            original_price: p.original_price,
            image_url: p.image_url,
            category: p.category,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductQuery {
    /// Case-insensitive category filter.
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutLine>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub total: u64,
    pub item_count: u64,
    pub whatsapp_url: String,
}

/// List products, optionally filtered by category.
#[utoipa::path(
    get,
    path = "/products",
    params(ProductQuery),
    responses((status = 200, description = "The catalog", body = [ProductView]))
)]
pub async fn list_products_handler(Query(query): Query<ProductQuery>) -> Json<Vec<ProductView>> {
    let products = match query.category.as_deref() {
        Some(category) if !category.trim().is_empty() => {
            catalog::products_in_category(category.trim())
        }
        _ => catalog::products(),
    };
    Json(products.into_iter().map(ProductView::from).collect())
}

/// The bookable service types.
#[utoipa::path(
    get,
    path = "/service-types",
    responses((status = 200, description = "Service type labels", body = [String]))
)]
pub async fn list_service_types_handler() -> Json<Vec<&'static str>> {
    Json(ServiceType::ALL.iter().map(ServiceType::as_str).collect())
}

/// The booking status labels, initial state first.
#[utoipa::path(
    get,
    path = "/booking-statuses",
    responses((status = 200, description = "Status labels", body = [String]))
)]
pub async fn list_booking_statuses_handler() -> Json<Vec<&'static str>> {
    Json(BookingStatus::ALL.iter().map(BookingStatus::as_str).collect())
}

/// Build the pre-filled order message for a cart.
#[utoipa::path(
    post,
    path = "/cart/checkout-link",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order link", body = CheckoutResponse),
        (status = 400, description = "Empty cart, unknown product, or quantity too large", body = ErrorBody)
    )
)]
pub async fn checkout_link_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, HandlerError> {
    let mut items = Vec::with_capacity(req.items.len());
    for line in req.items {
        let product = catalog::find_product(&line.product_id).ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                format!("Unknown product '{}'.", line.product_id),
            )
        })?;
        items.push(CartItem {
            product,
            quantity: line.quantity,
        });
    }

    let cart = Cart::try_from(items).map_err(|e| {
        info!("Rejected checkout: {}", e);
        error_response(StatusCode::BAD_REQUEST, "Quantity too large.")
    })?;
    if cart.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "Your cart is empty."));
    }

    Ok(Json(CheckoutResponse {
        total: cart.total(),
        item_count: cart.item_count(),
        whatsapp_url: notify::whatsapp_link(
            &state.config.whatsapp_phone_number,
            &notify::cart_order_message(&cart),
        ),
    }))
}
