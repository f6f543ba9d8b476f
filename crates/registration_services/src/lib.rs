//! # Registration Services
//!
//! This crate provides the authoritative check-in registry: it classifies each
//! scanned identifier as accepted, already registered, rejected or unknown, and
//! persists check-in and rejection records through a pluggable store.

/// Records, outcomes and errors of the registration service.
pub mod types;
/// Storage seam and the PostgreSQL, flat-file and in-memory backends.
pub mod store;
/// Optional allow-list of identifiers.
pub mod guest_list;
/// The registration service itself.
pub mod service;

pub use guest_list::GuestList;
pub use service::RegistrationService;
pub use store::{CheckinStore, JsonFileStore, MemoryStore, PgCheckinStore};
pub use types::*;
