//! crates/ozonxt_core/src/validation.rs
//!
//! Field-level validation for the booking and contact forms. Validation is
//! side-effect free: it either yields a draft ready to persist or a map of
//! field name to error messages.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::domain::{BookingDraft, BookingRequest, ContactDraft, ContactRequest, ServiceType};

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PHONE_DIGITS: usize = 10;
pub const MIN_CONTACT_MESSAGE_LEN: usize = 10;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Per-field error messages, keyed by the form's field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+?[0-9\s\-()]*$").expect("phone pattern is valid"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Accepts a plain calendar date (`2026-10-26`) or a full RFC 3339 timestamp,
/// which is what browsers send when they serialize a `Date`.
pub fn parse_preferred_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.date_naive())
}

/// Validates a raw booking form.
///
/// `owner_email` is the signed-in submitter; `today` is the earliest
/// acceptable preferred date.
pub fn validate_booking(
    request: &BookingRequest,
    owner_email: &str,
    today: NaiveDate,
) -> Result<BookingDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = request.name.trim();
    if name.chars().count() < MIN_NAME_LEN {
        errors.push("name", "Name must be at least 2 characters long.");
    }

    let email = request.email.trim();
    if !is_valid_email(email) {
        errors.push("email", "Invalid email address.");
    }

    let phone = request.phone.trim();
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_PHONE_DIGITS {
        errors.push("phone", "Phone number must be at least 10 digits.");
    }
    if !phone_regex().is_match(phone) {
        errors.push("phone", "Invalid phone number format.");
    }

    let service_type = if request.service_type.trim().is_empty() {
        errors.push("serviceType", "Please select a service type.");
        None
    } else {
        let found = ServiceType::from_label(request.service_type.trim());
        if found.is_none() {
            errors.push("serviceType", "Please select a valid service type.");
        }
        found
    };

    let preferred_date = if request.preferred_date.trim().is_empty() {
        errors.push("preferredDate", "Please pick a date.");
        None
    } else {
        match parse_preferred_date(&request.preferred_date) {
            Some(date) if date < today => {
                errors.push("preferredDate", "Preferred date cannot be in the past.");
                None
            }
            Some(date) => Some(date),
            None => {
                errors.push("preferredDate", "Invalid date.");
                None
            }
        }
    };

    let preferred_time = request.preferred_time.trim();
    if preferred_time.is_empty() {
        errors.push("preferredTime", "Please select a preferred time.");
    }

    match (service_type, preferred_date) {
        (Some(service_type), Some(preferred_date)) if errors.is_empty() => Ok(BookingDraft {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            service_type,
            preferred_date,
            preferred_time: preferred_time.to_string(),
            owner_email: owner_email.to_string(),
        }),
        _ => Err(errors),
    }
}

pub fn validate_contact(request: &ContactRequest) -> Result<ContactDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = request.name.trim();
    if name.chars().count() < MIN_NAME_LEN {
        errors.push("name", "Name must be at least 2 characters long.");
    }
    let email = request.email.trim();
    if !is_valid_email(email) {
        errors.push("email", "Invalid email address.");
    }
    let message = request.message.trim();
    if message.chars().count() < MIN_CONTACT_MESSAGE_LEN {
        errors.push("message", "Message must be at least 10 characters long.");
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let subject = request
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ContactDraft {
        name: name.to_string(),
        email: email.to_string(),
        subject,
        message: message.to_string(),
    })
}

/// Validates sign-up credentials, mirroring the auth provider's rules.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if !is_valid_email(email.trim()) {
        errors.push("email", "The email address is not valid. Please check and try again.");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(
            "password",
            "The password is too weak. It must be at least 6 characters long.",
        );
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn valid_request() -> BookingRequest {
        BookingRequest {
            name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            phone: "9876543210".into(),
            service_type: "Installation".into(),
            preferred_date: "2026-10-26".into(),
            preferred_time: "10:00".into(),
        }
    }

    #[test]
    fn accepts_a_well_formed_booking() {
        let draft = validate_booking(&valid_request(), "jane@x.com", today()).unwrap();
        assert_eq!(draft.service_type, ServiceType::Installation);
        assert_eq!(draft.preferred_date, NaiveDate::from_ymd_opt(2026, 10, 26).unwrap());
        assert_eq!(draft.owner_email, "jane@x.com");
    }

    #[test]
    fn short_phone_is_rejected() {
        let request = BookingRequest {
            phone: "123".into(),
            ..valid_request()
        };
        let errors = validate_booking(&request, "jane@x.com", today()).unwrap_err();
        assert_eq!(
            errors.get("phone").unwrap(),
            &["Phone number must be at least 10 digits.".to_string()]
        );
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["phone"]);
    }

    #[test]
    fn phone_allows_punctuation_and_leading_plus() {
        let request = BookingRequest {
            phone: "+91 (958) 117-2082".into(),
            ..valid_request()
        };
        assert!(validate_booking(&request, "jane@x.com", today()).is_ok());

        let request = BookingRequest {
            phone: "98765x43210".into(),
            ..valid_request()
        };
        let errors = validate_booking(&request, "jane@x.com", today()).unwrap_err();
        assert_eq!(
            errors.get("phone").unwrap(),
            &["Invalid phone number format.".to_string()]
        );
    }

    #[test]
    fn reports_every_invalid_field() {
        let errors = validate_booking(&BookingRequest::default(), "jane@x.com", today())
            .unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(
            fields,
            vec!["email", "name", "phone", "preferredDate", "preferredTime", "serviceType"]
        );
    }

    #[test]
    fn unknown_service_type_is_rejected() {
        let request = BookingRequest {
            service_type: "Plumbing".into(),
            ..valid_request()
        };
        let errors = validate_booking(&request, "jane@x.com", today()).unwrap_err();
        assert!(errors.get("serviceType").is_some());
    }

    #[test]
    fn past_dates_are_rejected_but_today_is_fine() {
        let past = BookingRequest {
            preferred_date: "2026-10-18".into(),
            ..valid_request()
        };
        let errors = validate_booking(&past, "jane@x.com", today()).unwrap_err();
        assert_eq!(
            errors.get("preferredDate").unwrap(),
            &["Preferred date cannot be in the past.".to_string()]
        );

        let same_day = BookingRequest {
            preferred_date: "2026-10-19".into(),
            ..valid_request()
        };
        assert!(validate_booking(&same_day, "jane@x.com", today()).is_ok());
    }

    #[test]
    fn parses_browser_timestamps() {
        assert_eq!(
            parse_preferred_date("2026-10-26T00:00:00.000Z"),
            NaiveDate::from_ymd_opt(2026, 10, 26)
        );
        assert_eq!(parse_preferred_date("next monday"), None);
    }

    #[test]
    fn contact_subject_is_optional() {
        let draft = validate_contact(&ContactRequest {
            name: "Ravi".into(),
            email: "ravi@example.com".into(),
            subject: Some("   ".into()),
            message: "Is the G series in stock?".into(),
        })
        .unwrap();
        assert_eq!(draft.subject, None);
    }

    #[test]
    fn weak_passwords_are_rejected() {
        let errors = validate_credentials("a@b.co", "12345").unwrap_err();
        assert!(errors.get("password").is_some());
        assert!(validate_credentials("a@b.co", "123456").is_ok());
    }
}
