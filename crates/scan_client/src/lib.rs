//! # Scan Client
//!
//! This crate provides the scanning-station side of the check-in system: the
//! HTTP client for the registration service and the scan session controller
//! that decides, for every decoded QR payload, whether to submit it, treat it
//! as a duplicate, or report an error.

/// Client configuration and display-phase durations
pub mod config;
/// Registration service client
mod client;
pub use client::*;
/// Outcomes, phases and the injected camera/feedback handles
mod session_types;
pub use session_types::*;
/// Scan session controller
mod session;
pub use session::*;
