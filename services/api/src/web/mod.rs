pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod contact;
pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the router builder so the binary and the tests share one route table.
pub use middleware::require_auth;
pub use rest::{build_router, ApiDoc};
