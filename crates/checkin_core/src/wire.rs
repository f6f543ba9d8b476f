use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Header carrying the caller credential on every request.
pub const API_TOKEN_HEADER: &str = "X-API-Token";

/// Query parameter selecting the operation on the registration endpoint.
pub const ACTION_PARAM: &str = "action";

/// Operations exposed by the registration endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `POST` - check an identifier in
    CheckIn,
    /// `GET` - list every checked-in identifier
    RegisteredIds,
    /// `POST` - delete every check-in record
    Clear,
    /// `POST` - block an identifier from future check-ins
    Reject,
}

impl Action {
    /// Query string value selecting this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CheckIn => "checkin",
            Action::RegisteredIds => "registered-ids",
            Action::Clear => "clear",
            Action::Reject => "reject",
        }
    }

    /// Whether the action is invoked with `GET` rather than `POST`.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Action::RegisteredIds)
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checkin" => Ok(Action::CheckIn),
            "registered-ids" => Ok(Action::RegisteredIds),
            "clear" => Ok(Action::Clear),
            "reject" => Ok(Action::Reject),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business status carried in every JSON response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiStatus {
    /// Operation succeeded
    #[serde(rename = "ok")]
    Ok,
    /// Identifier already has a check-in record
    #[serde(rename = "already registered")]
    AlreadyRegistered,
    /// Identifier carries a rejection record
    #[serde(rename = "rejected")]
    Rejected,
    /// Identifier is not on the guest list
    #[serde(rename = "id not known")]
    IdNotKnown,
    /// Any failure: bad input, bad credential, server fault
    #[serde(rename = "error")]
    Error,
}

/// Standard `{status, message}` response body, with `reason` on rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Business status of the request
    pub status: ApiStatus,
    /// Operator-facing message
    pub message: String,
    /// Rejection reason, present only when `status` is `rejected`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApiResponse {
    /// Builds a response without a rejection reason.
    pub fn new(status: ApiStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            reason: None,
        }
    }

    /// Builds an `error` response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ApiStatus::Error, message)
    }

    /// Builds a `rejected` response carrying the stored reason.
    pub fn rejected(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Rejected,
            message: message.into(),
            reason: Some(reason.into()),
        }
    }
}

/// Body of the `checkin` action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckinRequest {
    /// Scanned identifier; format is checked by the service
    #[serde(default)]
    pub id: String,
}

/// Body of the `reject` action
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RejectRequest {
    /// Identifier to block
    #[serde(default)]
    pub id: String,

    /// Why the identifier is blocked, shown to operators on later scans
    #[validate(length(min = 1, max = 500, message = "Reason must be between 1 and 500 characters"))]
    #[serde(default)]
    pub reason: String,

    /// Who issued the rejection
    #[validate(length(max = 255, message = "rejected_by must be at most 255 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_uses_wire_spelling() {
        let body = ApiResponse::new(ApiStatus::AlreadyRegistered, "dup");
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"status":"already registered","message":"dup"}"#
        );

        let parsed: ApiResponse =
            serde_json::from_str(r#"{"status":"id not known","message":"nope"}"#).unwrap();
        assert_eq!(parsed.status, ApiStatus::IdNotKnown);
        assert!(parsed.reason.is_none());
    }

    #[test]
    fn test_rejected_response_carries_reason() {
        let json = serde_json::to_value(ApiResponse::rejected("blocked", "banned")).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"], "banned");
    }

    #[test]
    fn test_action_round_trips_through_query_value() {
        for action in [
            Action::CheckIn,
            Action::RegisteredIds,
            Action::Clear,
            Action::Reject,
        ] {
            assert_eq!(action.as_str().parse::<Action>(), Ok(action));
        }
        assert!("".parse::<Action>().is_err());
        assert!("CHECKIN".parse::<Action>().is_err());
    }

    #[test]
    fn test_reject_request_validation() {
        let ok = RejectRequest {
            id: "guest-42".into(),
            reason: "banned".into(),
            rejected_by: Some("door-1".into()),
        };
        assert!(ok.validate().is_ok());

        let missing_reason: RejectRequest = serde_json::from_str(r#"{"id":"guest-42"}"#).unwrap();
        assert!(missing_reason.validate().is_err());
    }
}
