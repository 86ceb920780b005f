//! crates/ozonxt_core/src/booking.rs
//!
//! The booking lifecycle: submission, owner and admin queries, and admin
//! status updates. Every operation returns `Result<_, BookingError>`.

use chrono::{NaiveDate, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{Booking, BookingRequest, BookingStatus, Identity};
use crate::ports::{DatabaseService, PortError};
use crate::validation::{validate_booking, FieldErrors};

pub const DEFAULT_DISPLAY_PREFIX: &str = "OZN";

//=========================================================================================
// Admin Policy
//=========================================================================================

/// The admin allow-list. One instance is built from configuration at startup
/// and shared by the route guards and the booking service.
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    emails: BTreeSet<String>,
}

impl AdminPolicy {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }

    /// Comparison is case-sensitive.
    pub fn is_admin(&self, email: &str) -> bool {
        !email.is_empty() && self.emails.contains(email)
    }

    pub fn identity(&self, uid: Uuid, email: &str) -> Identity {
        Identity {
            uid,
            email: email.to_string(),
            is_admin: self.is_admin(email),
        }
    }
}

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("Caller is not allowed to perform this operation")]
    Unauthorized,
    #[error("Booking not found")]
    NotFound,
    #[error("Invalid status value: {0}")]
    InvalidStatus(String),
    #[error("Store error: {0}")]
    Store(PortError),
}

impl BookingError {
    /// Text safe to show to an end user. Store diagnostics never leak through here.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation(_) => {
                "Failed to book service. Please check the errors below.".to_string()
            }
            BookingError::Unauthorized => {
                "Unauthorized: You do not have permission to perform this action.".to_string()
            }
            BookingError::NotFound => "Booking not found.".to_string(),
            BookingError::InvalidStatus(_) => "Invalid status value.".to_string(),
            BookingError::Store(PortError::PermissionDenied(_)) => {
                "The booking service refused this request. Please contact support.".to_string()
            }
            BookingError::Store(PortError::MissingIndex(_)) => {
                "Bookings are temporarily unavailable while the service is being set up. Please try again later.".to_string()
            }
            BookingError::Store(PortError::Contention(_)) => {
                "Many bookings are being placed right now. Please try again in a moment.".to_string()
            }
            BookingError::Store(_) => {
                "An unexpected error occurred. Please try again later.".to_string()
            }
        }
    }
}

impl From<PortError> for BookingError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(_) => BookingError::NotFound,
            PortError::Unauthorized => BookingError::Unauthorized,
            other => BookingError::Store(other),
        }
    }
}

//=========================================================================================
// Booking Service
//=========================================================================================

/// The result of a successful submission.
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub booking: Booking,
    pub message: String,
}

#[derive(Clone)]
pub struct BookingService {
    db: Arc<dyn DatabaseService>,
    policy: Arc<AdminPolicy>,
    display_prefix: String,
}

impl BookingService {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        policy: Arc<AdminPolicy>,
        display_prefix: impl Into<String>,
    ) -> Self {
        Self {
            db,
            policy,
            display_prefix: display_prefix.into(),
        }
    }

    pub fn policy(&self) -> &AdminPolicy {
        &self.policy
    }

    /// Validates and stores a booking for the signed-in `owner`.
    pub async fn submit(
        &self,
        owner: &Identity,
        request: BookingRequest,
    ) -> Result<BookingReceipt, BookingError> {
        self.submit_on(owner, request, Utc::now().date_naive()).await
    }

    /// Like `submit`, with an explicit "today" for the past-date check.
    pub async fn submit_on(
        &self,
        owner: &Identity,
        request: BookingRequest,
        today: NaiveDate,
    ) -> Result<BookingReceipt, BookingError> {
        let draft =
            validate_booking(&request, &owner.email, today).map_err(BookingError::Validation)?;

        let booking = self
            .db
            .create_booking(&self.display_prefix, draft)
            .await
            .map_err(|e| {
                error!("Failed to create booking for {}: {:?}", owner.email, e);
                BookingError::Store(e)
            })?;

        info!(
            "Booking {} created for {} ({})",
            booking.display_id, booking.owner_email, booking.service_type
        );

        let message = format!(
            "Service booked successfully! Your booking ID is {}. We will contact you shortly to confirm.",
            booking.display_id
        );
        Ok(BookingReceipt { booking, message })
    }

    /// Bookings owned by `owner_email`, newest first. An empty email yields an
    /// empty list without touching the store.
    pub async fn list_for_owner(&self, owner_email: &str) -> Result<Vec<Booking>, BookingError> {
        if owner_email.is_empty() {
            return Ok(Vec::new());
        }
        self.db
            .list_bookings_by_owner(owner_email)
            .await
            .map_err(|e| {
                error!("Failed to list bookings for {}: {:?}", owner_email, e);
                BookingError::from(e)
            })
    }

    /// All bookings, newest first. Admins only.
    pub async fn list_all(&self, caller: &Identity) -> Result<Vec<Booking>, BookingError> {
        if !self.policy.is_admin(&caller.email) {
            warn!("Non-admin {} requested all bookings", caller.email);
            return Err(BookingError::Unauthorized);
        }
        self.db.list_all_bookings().await.map_err(|e| {
            error!("Failed to list all bookings: {:?}", e);
            BookingError::from(e)
        })
    }

    /// Sets a booking's status. Admins only; any valid status may follow any other.
    pub async fn update_status(
        &self,
        caller: &Identity,
        booking_id: Uuid,
        new_status: &str,
    ) -> Result<BookingStatus, BookingError> {
        if !self.policy.is_admin(&caller.email) {
            warn!(
                "Non-admin {} tried to update booking {}",
                caller.email, booking_id
            );
            return Err(BookingError::Unauthorized);
        }

        let status = BookingStatus::from_label(new_status)
            .ok_or_else(|| BookingError::InvalidStatus(new_status.to_string()))?;

        self.db
            .update_booking_status(booking_id, status)
            .await
            .map_err(|e| {
                error!("Failed to update booking {}: {:?}", booking_id, e);
                BookingError::from(e)
            })?;

        info!("Admin {} set booking {} to {}", caller.email, booking_id, status);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DisplayId;
    use crate::memory::InMemoryDatabase;
    use chrono::Days;
    use std::collections::HashSet;
    use tracing_subscriber::EnvFilter;

    const ADMIN: &str = "admin@ozonxt.in";

    fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }

    fn service() -> (BookingService, Arc<InMemoryDatabase>) {
        init_test_tracing();
        let db = Arc::new(InMemoryDatabase::new());
        let policy = Arc::new(AdminPolicy::new([ADMIN]));
        (BookingService::new(db.clone(), policy, "OZN"), db)
    }

    fn user(email: &str) -> Identity {
        AdminPolicy::new([ADMIN]).identity(Uuid::new_v4(), email)
    }

    fn next_week() -> NaiveDate {
        Utc::now().date_naive().checked_add_days(Days::new(7)).unwrap()
    }

    fn jane_request() -> BookingRequest {
        BookingRequest {
            name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            phone: "9876543210".into(),
            service_type: "Installation".into(),
            preferred_date: next_week().to_string(),
            preferred_time: "10:00".into(),
        }
    }

    #[tokio::test]
    async fn submission_issues_a_prefixed_display_id() {
        let (service, _db) = service();
        let jane = user("jane@x.com");

        let receipt = service.submit(&jane, jane_request()).await.unwrap();
        let display = receipt.booking.display_id.to_string();
        assert_eq!(display, "OZN0001");
        assert!(receipt.message.contains(&display));

        let mine = service.list_for_owner("jane@x.com").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].status, BookingStatus::PendingConfirmation);
        assert_eq!(mine[0].preferred_date, next_week());
    }

    #[tokio::test]
    async fn invalid_phone_writes_nothing() {
        let (service, db) = service();
        let jane = user("jane@x.com");
        let request = BookingRequest {
            phone: "123".into(),
            ..jane_request()
        };

        let err = service.submit(&jane, request).await.unwrap_err();
        match err {
            BookingError::Validation(errors) => assert!(errors.get("phone").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(db.current_display_number().await.unwrap(), 0);
        assert!(service.list_for_owner("jane@x.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn display_ids_strictly_increase() {
        let (service, _db) = service();
        let jane = user("jane@x.com");

        let mut previous: Option<DisplayId> = None;
        for _ in 0..5 {
            let receipt = service.submit(&jane, jane_request()).await.unwrap();
            if let Some(prev) = previous {
                assert!(receipt.booking.display_id > prev);
            }
            previous = Some(receipt.booking.display_id);
        }
    }

    #[tokio::test]
    async fn concurrent_submissions_never_share_an_id() {
        let (service, _db) = service();

        let tasks = (0..50).map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                let owner = user(&format!("user{i}@x.com"));
                service.submit(&owner, jane_request()).await
            })
        });
        let results = futures::future::join_all(tasks).await;

        let ids: HashSet<u64> = results
            .into_iter()
            .map(|r| r.unwrap().unwrap().booking.display_id.number())
            .collect();
        assert_eq!(ids.len(), 50);
        assert_eq!(ids.iter().max(), Some(&50));
    }

    #[tokio::test]
    async fn owner_query_only_returns_own_bookings() {
        let (service, _db) = service();
        service.submit(&user("jane@x.com"), jane_request()).await.unwrap();
        service.submit(&user("ravi@x.com"), jane_request()).await.unwrap();
        service.submit(&user("jane@x.com"), jane_request()).await.unwrap();

        let mine = service.list_for_owner("jane@x.com").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|b| b.owner_email == "jane@x.com"));
        // newest first
        assert!(mine[0].display_id > mine[1].display_id);

        assert!(service.list_for_owner("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_admin_cannot_list_or_update() {
        let (service, _db) = service();
        let jane = user("jane@x.com");
        let receipt = service.submit(&jane, jane_request()).await.unwrap();

        assert_eq!(service.list_all(&jane).await, Err(BookingError::Unauthorized));
        assert_eq!(
            service
                .update_status(&jane, receipt.booking.id, "Completed")
                .await,
            Err(BookingError::Unauthorized)
        );
        let mine = service.list_for_owner("jane@x.com").await.unwrap();
        assert_eq!(mine[0].status, BookingStatus::PendingConfirmation);
    }

    #[tokio::test]
    async fn admin_check_is_case_sensitive() {
        let (service, _db) = service();
        let shouted = user("ADMIN@ozonxt.in");
        assert_eq!(service.list_all(&shouted).await, Err(BookingError::Unauthorized));
    }

    #[tokio::test]
    async fn admin_claim_on_identity_does_not_grant_access() {
        let (service, _db) = service();
        let jane = user("jane@x.com");
        let receipt = service.submit(&jane, jane_request()).await.unwrap();

        let forged = Identity {
            is_admin: true,
            ..jane
        };
        assert_eq!(service.list_all(&forged).await, Err(BookingError::Unauthorized));
        assert_eq!(
            service
                .update_status(&forged, receipt.booking.id, "Completed")
                .await,
            Err(BookingError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn admin_updates_are_last_write_wins() {
        let (service, _db) = service();
        let jane = user("jane@x.com");
        let admin = user(ADMIN);
        let receipt = service.submit(&jane, jane_request()).await.unwrap();

        service
            .update_status(&admin, receipt.booking.id, "Completed")
            .await
            .unwrap();
        let mine = service.list_for_owner("jane@x.com").await.unwrap();
        assert_eq!(mine[0].status, BookingStatus::Completed);

        service
            .update_status(&admin, receipt.booking.id, "Cancelled")
            .await
            .unwrap();
        let mine = service.list_for_owner("jane@x.com").await.unwrap();
        assert_eq!(mine[0].status, BookingStatus::Cancelled);

        // backwards moves are allowed
        service
            .update_status(&admin, receipt.booking.id, "Pending Confirmation")
            .await
            .unwrap();
        assert_eq!(service.list_all(&admin).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_rejects_unknown_status_and_missing_booking() {
        let (service, _db) = service();
        let admin = user(ADMIN);
        let receipt = service.submit(&user("jane@x.com"), jane_request()).await.unwrap();

        assert_eq!(
            service
                .update_status(&admin, receipt.booking.id, "Done")
                .await,
            Err(BookingError::InvalidStatus("Done".into()))
        );
        assert_eq!(
            service
                .update_status(&admin, Uuid::new_v4(), "Completed")
                .await,
            Err(BookingError::NotFound)
        );
    }

    #[tokio::test]
    async fn store_failures_are_distinguishable_and_sanitized() {
        let (service, db) = service();
        db.fail_next_booking(PortError::Contention("could not serialize access".into()))
            .await;

        let err = service
            .submit(&user("jane@x.com"), jane_request())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Store(PortError::Contention(_))));
        assert!(!err.user_message().contains("serialize"));
        assert_eq!(db.current_display_number().await.unwrap(), 0);

        // the failure is one-shot
        assert!(service.submit(&user("jane@x.com"), jane_request()).await.is_ok());
    }
}
