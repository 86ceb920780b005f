//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

use ozonxt_core::booking::DEFAULT_DISPLAY_PREFIX;

/// Upper bound for `SESSION_TTL_DAYS`.
pub const MAX_SESSION_TTL_DAYS: i64 = 365;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// The one admin allow-list; route guards and the booking service both read it.
    pub admin_emails: Vec<String>,
    pub display_id_prefix: String,
    pub whatsapp_phone_number: String,
    pub cors_origin: String,
    pub session_ttl_days: i64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Storefront Settings ---
        let admin_emails = parse_admin_emails(&std::env::var("ADMIN_EMAILS").unwrap_or_default());

        let display_id_prefix = std::env::var("DISPLAY_ID_PREFIX")
            .unwrap_or_else(|_| DEFAULT_DISPLAY_PREFIX.to_string());
        if display_id_prefix.is_empty()
            || !display_id_prefix.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ConfigError::InvalidValue(
                "DISPLAY_ID_PREFIX".to_string(),
                format!("'{}' must be one or more ASCII letters", display_id_prefix),
            ));
        }

        let whatsapp_phone_number = std::env::var("WHATSAPP_PHONE_NUMBER")
            .unwrap_or_else(|_| "+919581172082".to_string());

        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let session_ttl_days = parse_session_ttl_days(
            &std::env::var("SESSION_TTL_DAYS").unwrap_or_else(|_| "30".to_string()),
        )?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            admin_emails,
            display_id_prefix,
            whatsapp_phone_number,
            cors_origin,
            session_ttl_days,
        })
    }
}

/// Splits a comma-separated list, dropping blanks. Case is preserved.
pub fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a session lifetime in whole days, between 1 and `MAX_SESSION_TTL_DAYS`.
pub fn parse_session_ttl_days(raw: &str) -> Result<i64, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|days| (1..=MAX_SESSION_TTL_DAYS).contains(days))
        .ok_or_else(|| {
            ConfigError::InvalidValue(
                "SESSION_TTL_DAYS".to_string(),
                format!(
                    "'{}' is not a number of days between 1 and {}",
                    raw, MAX_SESSION_TTL_DAYS
                ),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_list_ignores_blanks_and_keeps_case() {
        assert_eq!(
            parse_admin_emails(" Owner@ozonxt.in, ,ops@ozonxt.in,"),
            vec!["Owner@ozonxt.in".to_string(), "ops@ozonxt.in".to_string()]
        );
        assert!(parse_admin_emails("").is_empty());
    }

    #[test]
    fn session_ttl_must_be_within_a_year() {
        assert_eq!(parse_session_ttl_days("30").unwrap(), 30);
        assert_eq!(parse_session_ttl_days("365").unwrap(), 365);
        assert!(parse_session_ttl_days("0").is_err());
        assert!(parse_session_ttl_days("-5").is_err());
        assert!(parse_session_ttl_days("366").is_err());
        assert!(parse_session_ttl_days("9223372036854775807").is_err());
        assert!(parse_session_ttl_days("soon").is_err());
    }
}
