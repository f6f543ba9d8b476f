use chrono::{DateTime, Utc};
use checkin_core::{Identifier, IdentifierError};
use serde::{Deserialize, Serialize};

/// Durable proof that an identifier was accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinRecord {
    /// Identifier that checked in
    pub identifier: Identifier,
    /// When the first successful check-in happened
    pub registered_at: DateTime<Utc>,
}

/// Durable block preventing future acceptance of an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionRecord {
    /// Identifier that is blocked
    pub identifier: Identifier,
    /// Why it is blocked
    pub reason: String,
    /// Who blocked it, if known
    pub rejected_by: Option<String>,
    /// When the block was recorded
    pub rejected_at: DateTime<Utc>,
}

/// Classification of a single check-in attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckinOutcome {
    /// A new check-in record was created
    Accepted,
    /// The identifier had already checked in
    AlreadyRegistered,
    /// The identifier carries a rejection record
    Rejected {
        /// Reason stored with the rejection
        reason: String,
    },
    /// A guest list is configured and the identifier is not on it
    Unknown,
}

/// Errors raised by a storage backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Flat-file I/O error
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Flat-file contents could not be (de)serialized
    #[error("Storage format error: {0}")]
    Format(#[from] serde_json::Error),

    /// A stored identifier no longer satisfies the identifier format
    #[error("Corrupt record: {0}")]
    Corrupt(#[from] IdentifierError),
}

/// Errors raised by the registration service
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// Identifier failed the format check
    #[error("Invalid request: ID has an invalid format.")]
    InvalidFormat(String),

    /// A rejection record already exists; the stored reason is kept
    #[error("ID '{0}' has already been rejected.")]
    AlreadyRejected(Identifier),

    /// Other request fields failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage failed after validation
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<IdentifierError> for RegistrationError {
    fn from(error: IdentifierError) -> Self {
        match error {
            IdentifierError::InvalidFormat(raw) => RegistrationError::InvalidFormat(raw),
        }
    }
}
