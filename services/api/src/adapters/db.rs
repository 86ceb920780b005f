//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ozonxt_core::domain::{
    Booking, BookingDraft, BookingStatus, ContactDraft, ContactSubmission, DisplayId,
    ServiceType, User, UserCredentials,
};
use ozonxt_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

/// Key of the single row in `counters` that drives booking display identifiers.
pub const BOOKING_COUNTER: &str = "serviceBookingCounter";

const BOOKING_COLUMNS: &str = "id, display_id, name, email, phone, service_type, preferred_date, \
     preferred_time, status, user_email, booked_at";

const USER_COLUMNS: &str =
    "uid, email, display_name, photo_url, email_verified, last_login_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Translates a sqlx error into a `PortError`, keeping Postgres' diagnostic text.
fn map_db_error(e: sqlx::Error, context: &str) -> PortError {
    match &e {
        sqlx::Error::RowNotFound => PortError::NotFound(context.to_string()),
        sqlx::Error::Database(db_err) => {
            let detail = format!("{}: {}", context, db_err.message());
            match db_err.code().as_deref() {
                // insufficient_privilege
                Some("42501") => PortError::PermissionDenied(detail),
                // serialization_failure, deadlock_detected, lock_not_available
                Some("40001") | Some("40P01") | Some("55P03") => PortError::Contention(detail),
                // undefined_table, undefined_column
                Some("42P01") | Some("42703") => PortError::MissingIndex(detail),
                // unique_violation
                Some("23505") => PortError::Conflict(detail),
                _ => PortError::Unexpected(detail),
            }
        }
        _ => PortError::Unexpected(format!("{}: {}", context, e)),
    }
}

//=========================================================================================
// Date Encoding
//=========================================================================================

/// Preferred dates are stored as midnight UTC timestamps.
fn date_to_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn timestamp_to_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    uid: Uuid,
    email: String,
    display_name: Option<String>,
    photo_url: Option<String>,
    email_verified: bool,
    last_login_at: Option<DateTime<Utc>>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            uid: self.uid,
            email: self.email,
            display_name: self.display_name,
            photo_url: self.photo_url,
            email_verified: self.email_verified,
            last_login_at: self.last_login_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    uid: Uuid,
    email: String,
    hashed_password: String,
}

#[derive(FromRow)]
struct BookingRecord {
    id: Uuid,
    display_id: String,
    name: String,
    email: String,
    phone: String,
    service_type: String,
    preferred_date: DateTime<Utc>,
    preferred_time: String,
    status: String,
    user_email: String,
    booked_at: DateTime<Utc>,
}
impl BookingRecord {
    fn to_domain(self) -> PortResult<Booking> {
        let display_id = DisplayId::parse(&self.display_id).ok_or_else(|| {
            PortError::Unexpected(format!("Malformed display id '{}'", self.display_id))
        })?;
        let service_type = ServiceType::from_label(&self.service_type).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown service type '{}'", self.service_type))
        })?;
        let status = BookingStatus::from_label(&self.status).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown booking status '{}'", self.status))
        })?;
        Ok(Booking {
            id: self.id,
            display_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            service_type,
            preferred_date: timestamp_to_date(self.preferred_date),
            preferred_time: self.preferred_time,
            status,
            owner_email: self.user_email,
            booked_at: self.booked_at,
        })
    }
}

fn bookings_to_domain(records: Vec<BookingRecord>) -> PortResult<Vec<Booking>> {
    records.into_iter().map(BookingRecord::to_domain).collect()
}

#[derive(FromRow)]
struct ContactRecord {
    id: Uuid,
    name: String,
    email: String,
    subject: Option<String>,
    message: String,
    submitted_at: DateTime<Utc>,
}
impl ContactRecord {
    fn to_domain(self) -> ContactSubmission {
        ContactSubmission {
            id: self.id,
            name: self.name,
            email: self.email,
            subject: self.subject,
            message: self.message,
            submitted_at: self.submitted_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (uid, email, hashed_password, display_name) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to create user"))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT uid, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("User {} not found", email)))?;
        Ok(UserCredentials {
            uid: record.uid,
            email: record.email,
            hashed_password: record.hashed_password,
        })
    }

    async fn get_user_by_id(&self, uid: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE uid = $1"
        ))
        .bind(uid)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("User {} not found", uid)))?;
        Ok(record.to_domain())
    }

    async fn record_login(&self, uid: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET last_login_at = now() WHERE uid = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(uid)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("User {} not found", uid)))?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        uid: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, uid, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(uid)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to create auth session"))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT uid FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Session not found or expired"))
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to delete auth session"))?;
        Ok(())
    }

    async fn create_booking(&self, display_prefix: &str, draft: BookingDraft) -> PortResult<Booking> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error(e, "Failed to start transaction"))?;

        // Lock the counter row; concurrent allocations queue here until commit.
        let current = sqlx::query_scalar::<_, i64>(
            "SELECT current_id FROM counters WHERE name = $1 FOR UPDATE",
        )
        .bind(BOOKING_COUNTER)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to lock booking counter"))?
        .ok_or_else(|| {
            PortError::MissingIndex(format!("Counter row '{}' is missing", BOOKING_COUNTER))
        })?;

        let next = current + 1;
        sqlx::query("UPDATE counters SET current_id = $2 WHERE name = $1")
            .bind(BOOKING_COUNTER)
            .bind(next)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, "Failed to advance booking counter"))?;

        let display_id = DisplayId::new(display_prefix, next as u64);
        let record = sqlx::query_as::<_, BookingRecord>(&format!(
            "INSERT INTO service_bookings \
             (id, display_id, display_number, name, email, phone, service_type, \
              preferred_date, preferred_time, status, user_email) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(display_id.to_string())
        .bind(next)
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(draft.service_type.as_str())
        .bind(date_to_timestamp(draft.preferred_date))
        .bind(&draft.preferred_time)
        .bind(BookingStatus::initial().as_str())
        .bind(&draft.owner_email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to insert booking"))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error(e, "Failed to commit booking"))?;

        debug!("Allocated booking number {}", next);
        record.to_domain()
    }

    async fn get_booking(&self, booking_id: Uuid) -> PortResult<Booking> {
        let record = sqlx::query_as::<_, BookingRecord>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM service_bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("Booking {} not found", booking_id)))?;
        record.to_domain()
    }

    async fn list_bookings_by_owner(&self, owner_email: &str) -> PortResult<Vec<Booking>> {
        let records = sqlx::query_as::<_, BookingRecord>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM service_bookings WHERE user_email = $1 \
             ORDER BY booked_at DESC, display_number DESC"
        ))
        .bind(owner_email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to list bookings by owner"))?;
        bookings_to_domain(records)
    }

    async fn list_all_bookings(&self) -> PortResult<Vec<Booking>> {
        let records = sqlx::query_as::<_, BookingRecord>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM service_bookings \
             ORDER BY booked_at DESC, display_number DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to list all bookings"))?;
        bookings_to_domain(records)
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE service_bookings SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to update booking status"))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Booking {} not found",
                booking_id
            )));
        }
        Ok(())
    }

    async fn current_display_number(&self) -> PortResult<u64> {
        let current = sqlx::query_scalar::<_, i64>("SELECT current_id FROM counters WHERE name = $1")
            .bind(BOOKING_COUNTER)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to read booking counter"))?;
        Ok(current.unwrap_or(0) as u64)
    }

    async fn save_contact_submission(&self, draft: ContactDraft) -> PortResult<ContactSubmission> {
        let record = sqlx::query_as::<_, ContactRecord>(
            "INSERT INTO contact_submissions (id, name, email, subject, message) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, subject, message, submitted_at",
        )
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.subject)
        .bind(&draft.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to save contact submission"))?;
        Ok(record.to_domain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_date_survives_timestamp_encoding() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 26).unwrap();
        assert_eq!(timestamp_to_date(date_to_timestamp(date)), date);
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = map_db_error(sqlx::Error::RowNotFound, "Booking x not found");
        assert_eq!(err, PortError::NotFound("Booking x not found".to_string()));
    }

    #[test]
    fn stored_booking_with_unknown_status_is_rejected() {
        let record = BookingRecord {
            id: Uuid::new_v4(),
            display_id: "OZN0001".into(),
            name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            phone: "9876543210".into(),
            service_type: "Installation".into(),
            preferred_date: Utc::now(),
            preferred_time: "10:00".into(),
            status: "Done".into(),
            user_email: "jane@x.com".into(),
            booked_at: Utc::now(),
        };
        assert!(matches!(record.to_domain(), Err(PortError::Unexpected(_))));
    }
}
