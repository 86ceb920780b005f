//! services/api/src/web/contact.rs
//!
//! The contact form endpoint.

use axum::{extract::State, http::StatusCode, Extension, Json};
use ozonxt_core::{notify, validation::validate_contact, ContactRequest, Identity};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::error::{error_response, validation_response, ErrorBody, HandlerError};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub message: String,
    pub whatsapp_url: String,
}

/// Store a contact form message from a signed-in user.
#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactForm,
    responses(
        (status = 201, description = "Message stored", body = ContactResponse),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<ContactResponse>), HandlerError> {
    let draft = validate_contact(&ContactRequest {
        name: form.name,
        email: form.email,
        subject: form.subject,
        message: form.message,
    })
    .map_err(|errors| {
        validation_response("Failed to send message. Please check the errors below.", errors)
    })?;

    let submission = state.db.save_contact_submission(draft).await.map_err(|e| {
        error!("Failed to save contact submission from {}: {:?}", identity.email, e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not send your message. Please try again later.",
        )
    })?;
    info!("Contact submission {} from {}", submission.id, identity.email);

    let whatsapp_url = notify::whatsapp_link(
        &state.config.whatsapp_phone_number,
        &notify::contact_message(&submission, &identity.email),
    );

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            message: "Your message has been submitted successfully.".to_string(),
            whatsapp_url,
        }),
    ))
}
