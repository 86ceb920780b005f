//! crates/ozonxt_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the storefront's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete backing store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Booking, BookingDraft, BookingStatus, ContactDraft, ContactSubmission, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// The store's own access rules rejected the operation.
    #[error("Permission denied by the store: {0}")]
    PermissionDenied(String),
    /// The store cannot serve the query without a supporting index or table.
    #[error("Store is missing a required index: {0}")]
    MissingIndex(String),
    /// A concurrent transaction won; the caller may retry.
    #[error("Transaction contention: {0}")]
    Contention(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users & Auth ---
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, uid: Uuid) -> PortResult<User>;

    /// Stamps `last_login_at` on the user's profile and returns the updated profile.
    async fn record_login(&self, uid: Uuid) -> PortResult<User>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        uid: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Bookings ---

    /// Allocates the next display number from the shared counter and inserts the
    /// booking with it, as one transaction. The new booking starts in
    /// `BookingStatus::initial()` and its `booked_at` is assigned by the store.
    ///
    /// Two concurrent calls never observe the same counter value.
    async fn create_booking(&self, display_prefix: &str, draft: BookingDraft) -> PortResult<Booking>;

    async fn get_booking(&self, booking_id: Uuid) -> PortResult<Booking>;

    /// Bookings whose owner email equals `owner_email`, newest first.
    async fn list_bookings_by_owner(&self, owner_email: &str) -> PortResult<Vec<Booking>>;

    /// Every booking, newest first.
    async fn list_all_bookings(&self) -> PortResult<Vec<Booking>>;

    /// Overwrites only the status field. Returns `NotFound` if no such booking exists.
    async fn update_booking_status(&self, booking_id: Uuid, status: BookingStatus)
        -> PortResult<()>;

    /// The last display number issued, or 0 if none has been.
    async fn current_display_number(&self) -> PortResult<u64>;

    // --- Contact ---
    async fn save_contact_submission(&self, draft: ContactDraft) -> PortResult<ContactSubmission>;
}
