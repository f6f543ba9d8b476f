//! # Postgres
//!
//! This crate provides the PostgreSQL connection and schema for the check-in registration service.

/// Database connection and schema bootstrap for the check-in tables.
pub mod database;
