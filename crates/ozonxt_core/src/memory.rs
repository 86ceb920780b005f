//! crates/ozonxt_core/src/memory.rs
//!
//! An in-memory implementation of the `DatabaseService` port. Used by the
//! test suites and for running the API without Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Booking, BookingDraft, BookingStatus, ContactDraft, ContactSubmission, DisplayId, User,
    UserCredentials,
};
use crate::ports::{DatabaseService, PortError, PortResult};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    passwords: HashMap<Uuid, String>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    /// Insertion order doubles as creation order.
    bookings: Vec<Booking>,
    counter: u64,
    contacts: Vec<ContactSubmission>,
    booking_failure: Option<PortError>,
}

/// Every operation takes one lock, so the counter read-modify-write and the
/// booking insert are atomic with respect to each other.
#[derive(Default)]
pub struct InMemoryDatabase {
    inner: Mutex<Inner>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `create_booking` call fail with `err` before touching the counter.
    pub async fn fail_next_booking(&self, err: PortError) {
        self.inner.lock().await.booking_failure = Some(err);
    }

    pub async fn contact_submissions(&self) -> Vec<ContactSubmission> {
        self.inner.lock().await.contacts.clone()
    }
}

fn newest_first(bookings: impl Iterator<Item = Booking>) -> Vec<Booking> {
    let mut out: Vec<Booking> = bookings.collect();
    out.reverse();
    out
}

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: Option<&str>,
    ) -> PortResult<User> {
        let mut inner = self.inner.lock().await;
        if inner.users.values().any(|u| u.email == email) {
            return Err(PortError::Conflict(format!("User {} already exists", email)));
        }
        let user = User {
            uid: Uuid::new_v4(),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
            photo_url: None,
            email_verified: false,
            last_login_at: None,
        };
        inner.passwords.insert(user.uid, hashed_password.to_string());
        inner.users.insert(user.uid, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let inner = self.inner.lock().await;
        let user = inner
            .users
            .values()
            .find(|u| u.email == email)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))?;
        let hashed_password = inner
            .passwords
            .get(&user.uid)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} has no password", email)))?;
        Ok(UserCredentials {
            uid: user.uid,
            email: user.email.clone(),
            hashed_password,
        })
    }

    async fn get_user_by_id(&self, uid: Uuid) -> PortResult<User> {
        self.inner
            .lock()
            .await
            .users
            .get(&uid)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", uid)))
    }

    async fn record_login(&self, uid: Uuid) -> PortResult<User> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .get_mut(&uid)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", uid)))?;
        user.last_login_at = Some(Utc::now());
        Ok(user.clone())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        uid: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.inner
            .lock()
            .await
            .sessions
            .insert(session_id.to_string(), (uid, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let inner = self.inner.lock().await;
        match inner.sessions.get(session_id) {
            Some((uid, expires_at)) if *expires_at > Utc::now() => Ok(*uid),
            Some(_) => Err(PortError::Unauthorized),
            None => Err(PortError::NotFound("Session not found".to_string())),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.inner.lock().await.sessions.remove(session_id);
        Ok(())
    }

    async fn create_booking(&self, display_prefix: &str, draft: BookingDraft) -> PortResult<Booking> {
        let mut inner = self.inner.lock().await;
        if let Some(err) = inner.booking_failure.take() {
            return Err(err);
        }

        let next = inner.counter + 1;
        let booking = Booking {
            id: Uuid::new_v4(),
            display_id: DisplayId::new(display_prefix, next),
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            service_type: draft.service_type,
            preferred_date: draft.preferred_date,
            preferred_time: draft.preferred_time,
            status: BookingStatus::initial(),
            owner_email: draft.owner_email,
            booked_at: Utc::now(),
        };
        inner.counter = next;
        inner.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, booking_id: Uuid) -> PortResult<Booking> {
        self.inner
            .lock()
            .await
            .bookings
            .iter()
            .find(|b| b.id == booking_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Booking {} not found", booking_id)))
    }

    async fn list_bookings_by_owner(&self, owner_email: &str) -> PortResult<Vec<Booking>> {
        let inner = self.inner.lock().await;
        Ok(newest_first(
            inner
                .bookings
                .iter()
                .filter(|b| b.owner_email == owner_email)
                .cloned(),
        ))
    }

    async fn list_all_bookings(&self) -> PortResult<Vec<Booking>> {
        let inner = self.inner.lock().await;
        Ok(newest_first(inner.bookings.iter().cloned()))
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().await;
        let booking = inner
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| PortError::NotFound(format!("Booking {} not found", booking_id)))?;
        booking.status = status;
        Ok(())
    }

    async fn current_display_number(&self) -> PortResult<u64> {
        Ok(self.inner.lock().await.counter)
    }

    async fn save_contact_submission(&self, draft: ContactDraft) -> PortResult<ContactSubmission> {
        let submission = ContactSubmission {
            id: Uuid::new_v4(),
            name: draft.name,
            email: draft.email,
            subject: draft.subject,
            message: draft.message,
            submitted_at: Utc::now(),
        };
        self.inner.lock().await.contacts.push(submission.clone());
        Ok(submission)
    }
}
