//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use ozonxt_core::{AdminPolicy, BookingService, DatabaseService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub policy: Arc<AdminPolicy>,
    pub bookings: BookingService,
}

impl AppState {
    /// Wires the booking service and the route guards to one admin policy.
    pub fn new(db: Arc<dyn DatabaseService>, config: Arc<Config>) -> Self {
        let policy = Arc::new(AdminPolicy::new(config.admin_emails.iter().cloned()));
        let bookings = BookingService::new(
            db.clone(),
            policy.clone(),
            config.display_id_prefix.clone(),
        );
        Self {
            db,
            config,
            policy,
            bookings,
        }
    }
}
