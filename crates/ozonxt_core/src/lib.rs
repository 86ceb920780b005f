pub mod booking;
pub mod cart;
pub mod catalog;
pub mod domain;
pub mod memory;
pub mod notify;
pub mod ports;
pub mod validation;

pub use booking::{AdminPolicy, BookingError, BookingReceipt, BookingService};
pub use domain::{
    Booking, BookingDraft, BookingRequest, BookingStatus, ContactDraft,
    ContactRequest, ContactSubmission, DisplayId, Identity, ServiceType, User, UserCredentials,
};
pub use ports::{DatabaseService, PortError, PortResult};
