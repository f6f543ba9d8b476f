use std::fmt;
use std::time::Duration;

use crate::client::RegistrationResult;

/// Lifecycle phase of a scan session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Camera released, decodes are ignored
    Idle,
    /// Camera active, the next decode is processed
    Listening,
    /// A decode is being classified, submitted or displayed
    Resolving,
}

/// Sound and colour class of a displayed result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTone {
    /// Accepted check-in
    Success,
    /// Duplicate or already registered
    Warning,
    /// Identifier is blocked
    Rejected,
    /// Anything else that went wrong
    Error,
}

/// Classification of one processed decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The service accepted the check-in
    Accepted {
        /// Checked-in identifier
        id: String,
        /// Message from the service
        message: String,
    },
    /// Same identifier as the last processed scan; nothing was sent
    DuplicateImmediate {
        /// Scanned identifier
        id: String,
    },
    /// Identifier was accepted earlier in this session; nothing was sent
    DuplicateKnown {
        /// Scanned identifier
        id: String,
    },
    /// The service already had a check-in for this identifier
    AlreadyRegistered {
        /// Scanned identifier
        id: String,
        /// Message from the service
        message: String,
    },
    /// The identifier is blocked
    Rejected {
        /// Scanned identifier
        id: String,
        /// Message from the service
        message: String,
        /// Stored rejection reason
        reason: String,
    },
    /// The identifier is not on the guest list
    Unknown {
        /// Scanned identifier
        id: String,
        /// Message from the service
        message: String,
    },
    /// The payload carried no check-in URL; nothing was sent
    InvalidCode,
    /// The service answered with an error
    ServiceError {
        /// Scanned identifier
        id: String,
        /// Message from the service
        message: String,
    },
    /// The service could not be reached or answered unintelligibly
    TransportError {
        /// Scanned identifier
        id: String,
        /// Description of the failure
        message: String,
    },
    /// The camera reported a failure
    ScannerError {
        /// Description of the failure
        message: String,
    },
}

impl ScanOutcome {
    /// Builds the outcome for a submitted identifier from the service result.
    pub fn from_registration(id: String, result: RegistrationResult) -> Self {
        match result {
            RegistrationResult::Accepted { message } => ScanOutcome::Accepted { id, message },
            RegistrationResult::AlreadyRegistered { message } => {
                ScanOutcome::AlreadyRegistered { id, message }
            }
            RegistrationResult::Rejected { message, reason } => {
                ScanOutcome::Rejected { id, message, reason }
            }
            RegistrationResult::Unknown { message } => ScanOutcome::Unknown { id, message },
            RegistrationResult::ServiceError { message } => {
                ScanOutcome::ServiceError { id, message }
            }
            RegistrationResult::TransportError { message } => {
                ScanOutcome::TransportError { id, message }
            }
        }
    }

    /// Feedback class used to pick the sound and display duration.
    pub fn tone(&self) -> FeedbackTone {
        match self {
            ScanOutcome::Accepted { .. } => FeedbackTone::Success,
            ScanOutcome::DuplicateImmediate { .. }
            | ScanOutcome::DuplicateKnown { .. }
            | ScanOutcome::AlreadyRegistered { .. } => FeedbackTone::Warning,
            ScanOutcome::Rejected { .. } => FeedbackTone::Rejected,
            ScanOutcome::Unknown { .. }
            | ScanOutcome::InvalidCode
            | ScanOutcome::ServiceError { .. }
            | ScanOutcome::TransportError { .. }
            | ScanOutcome::ScannerError { .. } => FeedbackTone::Error,
        }
    }

    /// Identifier the outcome refers to, if one was extracted.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            ScanOutcome::Accepted { id, .. }
            | ScanOutcome::DuplicateImmediate { id }
            | ScanOutcome::DuplicateKnown { id }
            | ScanOutcome::AlreadyRegistered { id, .. }
            | ScanOutcome::Rejected { id, .. }
            | ScanOutcome::Unknown { id, .. }
            | ScanOutcome::ServiceError { id, .. }
            | ScanOutcome::TransportError { id, .. } => Some(id),
            ScanOutcome::InvalidCode | ScanOutcome::ScannerError { .. } => None,
        }
    }

    /// Whether the service was contacted to produce this outcome.
    pub fn was_submitted(&self) -> bool {
        !matches!(
            self,
            ScanOutcome::DuplicateImmediate { .. }
                | ScanOutcome::DuplicateKnown { .. }
                | ScanOutcome::InvalidCode
                | ScanOutcome::ScannerError { .. }
        )
    }
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanOutcome::Accepted { message, .. }
            | ScanOutcome::AlreadyRegistered { message, .. }
            | ScanOutcome::Unknown { message, .. } => f.write_str(message),
            ScanOutcome::DuplicateImmediate { id } => {
                write!(f, "ID '{}' was just scanned.", id)
            }
            ScanOutcome::DuplicateKnown { id } => {
                write!(f, "ID '{}' was already checked in during this session.", id)
            }
            ScanOutcome::Rejected { message, reason, .. } => {
                write!(f, "{} Reason: {}", message, reason)
            }
            ScanOutcome::InvalidCode => {
                f.write_str("Invalid QR code: Does not contain a valid check-in URL.")
            }
            ScanOutcome::ServiceError { message, .. } => write!(f, "Error: {}", message),
            ScanOutcome::TransportError { message, .. } => {
                write!(f, "Connection problem: {}", message)
            }
            ScanOutcome::ScannerError { message } => write!(f, "Scanner error: {}", message),
        }
    }
}

/// Camera owned by a scan session
///
/// Calls arrive in session order: `activate` on start, `suspend`/`resume`
/// around each resolution and `release` on stop.
pub trait CameraHandle: Send + Sync {
    /// Turns the camera on.
    fn activate(&self);
    /// Stops delivering decodes while a result is resolved.
    fn suspend(&self);
    /// Delivers decodes again.
    fn resume(&self);
    /// Turns the camera off.
    fn release(&self);
}

/// Receives everything the operator should see or hear
pub trait FeedbackSink: Send + Sync {
    /// A decode was classified; show it for `display_for`.
    fn on_outcome(&self, outcome: &ScanOutcome, display_for: Duration);

    /// The session moved to `phase`.
    fn on_phase_changed(&self, _phase: SessionPhase) {}
}
