//! # Auth Services
//!
//! This crate provides caller authentication for the registration endpoint.
//! It includes server secret loading and the middleware that checks the
//! `X-API-Token` header in constant time before any handler runs.

/// Middleware for request authentication.
pub mod middleware;
/// Server-held secret the caller credential is compared against.
pub mod token;
