//! # Web Handlers for the Check-in Registration Service
//!
//! This crate provides the HTTP surface of the registration service: a single
//! endpoint whose `action` query parameter selects the operation.

/// Error type and request helpers for the registration endpoint
mod checkin_types;
pub use checkin_types::*;

/// Handlers for the registration endpoint
mod checkin_handlers;
pub use checkin_handlers::*;

/// Health and other unauthenticated handlers
mod admin_handlers;
pub use admin_handlers::*;
