//! crates/ozonxt_core/src/domain.rs
//!
//! Defines the pure, core data structures for the storefront.
//! These structs are independent of any database, but carry serde derives
//! because the web layer and the cart's local persistence both speak JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Service Types
//=========================================================================================

/// The fixed list of services a customer can book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Installation,
    Maintenance,
    Repair,
    Consultation,
    #[serde(rename = "Water Quality Testing")]
    WaterQualityTesting,
}

impl ServiceType {
    pub const ALL: [ServiceType; 5] = [
        ServiceType::Installation,
        ServiceType::Maintenance,
        ServiceType::Repair,
        ServiceType::Consultation,
        ServiceType::WaterQualityTesting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Installation => "Installation",
            ServiceType::Maintenance => "Maintenance",
            ServiceType::Repair => "Repair",
            ServiceType::Consultation => "Consultation",
            ServiceType::WaterQualityTesting => "Water Quality Testing",
        }
    }

    /// Looks up a service type by its display label. Matching is exact.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == label)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Booking Status
//=========================================================================================

/// Lifecycle labels for a booking, ordered from the initial state onwards.
///
/// Any admin may move a booking to any of these values; `Completed` and
/// `Cancelled` are terminal only by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    #[serde(rename = "Pending Confirmation")]
    PendingConfirmation,
    Scheduled,
    #[serde(rename = "Technician Assigned")]
    TechnicianAssigned,
    #[serde(rename = "Work In Progress")]
    WorkInProgress,
    Completed,
    Cancelled,
    Rescheduled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 7] = [
        BookingStatus::PendingConfirmation,
        BookingStatus::Scheduled,
        BookingStatus::TechnicianAssigned,
        BookingStatus::WorkInProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Rescheduled,
    ];

    /// The status every new booking starts in.
    pub fn initial() -> Self {
        Self::ALL[0]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::PendingConfirmation => "Pending Confirmation",
            BookingStatus::Scheduled => "Scheduled",
            BookingStatus::TechnicianAssigned => "Technician Assigned",
            BookingStatus::WorkInProgress => "Work In Progress",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Rescheduled => "Rescheduled",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == label)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Display Identifier
//=========================================================================================

/// The human-facing booking reference, e.g. `OZN0042`.
///
/// Ordering compares the sequence number first, so identifiers sort in
/// issue order regardless of prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayId {
    prefix: String,
    number: u64,
}

/// Minimum number of digits in a formatted display identifier.
pub const DISPLAY_ID_WIDTH: usize = 4;

impl DisplayId {
    pub fn new(prefix: impl Into<String>, number: u64) -> Self {
        Self {
            prefix: prefix.into(),
            number,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// Parses `<ALPHA PREFIX><DIGITS>`. Returns `None` if either part is missing.
    pub fn parse(value: &str) -> Option<Self> {
        let split = value.find(|c: char| c.is_ascii_digit())?;
        let (prefix, digits) = value.split_at(split);
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let number = digits.parse().ok()?;
        Some(Self::new(prefix, number))
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", self.prefix, self.number, width = DISPLAY_ID_WIDTH)
    }
}

impl Ord for DisplayId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.prefix.cmp(&other.prefix))
    }
}

impl PartialOrd for DisplayId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for DisplayId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DisplayId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DisplayId::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid display id '{raw}'")))
    }
}

//=========================================================================================
// Bookings
//=========================================================================================

/// The raw booking form as submitted by the browser. Nothing here is trusted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_type: String,
    pub preferred_date: String,
    pub preferred_time: String,
}

/// A validated booking waiting for its display identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_type: ServiceType,
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    pub owner_email: String,
}

/// A persisted service booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub display_id: DisplayId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_type: ServiceType,
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    pub status: BookingStatus,
    /// Email of the account that submitted the booking. Never changes.
    #[serde(rename = "userEmail")]
    pub owner_email: String,
    pub booked_at: DateTime<Utc>,
}

//=========================================================================================
// Contact Submissions
//=========================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

/// A stored contact form message. Write-only from the storefront's perspective.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

//=========================================================================================
// Users and Sessions
//=========================================================================================

/// A user profile, upserted on every successful sign-in.
#[derive(Debug, Clone)]
pub struct User {
    pub uid: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub uid: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// The caller of an operation, resolved from the session cookie.
///
/// `is_admin` is a role claim stamped by the `AdminPolicy` when the identity
/// is resolved. It is a display hint only: `BookingService` authorizes admin
/// operations with `AdminPolicy::is_admin` on the email and ignores this field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: Uuid,
    pub email: String,
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_id_pads_to_four_digits() {
        assert_eq!(DisplayId::new("OZN", 7).to_string(), "OZN0007");
        assert_eq!(DisplayId::new("OZN", 12345).to_string(), "OZN12345");
    }

    #[test]
    fn display_id_parses_formatted_value() {
        let id = DisplayId::parse("OZN0042").expect("valid id");
        assert_eq!(id.prefix(), "OZN");
        assert_eq!(id.number(), 42);
        assert!(DisplayId::parse("0042").is_none());
        assert!(DisplayId::parse("OZN").is_none());
        assert!(DisplayId::parse("OZN12a").is_none());
    }

    #[test]
    fn display_ids_order_by_number() {
        let mut ids = vec![
            DisplayId::new("OZN", 10),
            DisplayId::new("OZN", 2),
            DisplayId::new("OZN", 9999),
        ];
        ids.sort();
        let numbers: Vec<u64> = ids.iter().map(DisplayId::number).collect();
        assert_eq!(numbers, vec![2, 10, 9999]);
    }

    #[test]
    fn status_labels_round_trip_through_serde() {
        for status in BookingStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: BookingStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
        assert_eq!(BookingStatus::initial(), BookingStatus::PendingConfirmation);
    }

    #[test]
    fn service_type_lookup_is_exact() {
        assert_eq!(
            ServiceType::from_label("Water Quality Testing"),
            Some(ServiceType::WaterQualityTesting)
        );
        assert_eq!(ServiceType::from_label("installation"), None);
    }
}
