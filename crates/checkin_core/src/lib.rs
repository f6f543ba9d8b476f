//! # Check-in Core
//!
//! Shared vocabulary of the check-in system: the attendee identifier, the
//! extractor that pulls it out of a scanned QR payload, and the JSON wire
//! protocol spoken between scanning clients and the registration service.

/// Attendee identifier and its format rule.
mod identifier;
pub use identifier::*;

/// Extraction of identifiers from decoded QR text.
mod extractor;
pub use extractor::*;

/// Request and response bodies of the registration endpoint.
pub mod wire;
