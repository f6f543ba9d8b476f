use actix_web::{HttpResponse, http::StatusCode, http::header};
use checkin_core::wire::ApiResponse;
use registration_services::RegistrationError;
use serde::Deserialize;

/// Query string of the registration endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ActionQuery {
    /// Operation selector, e.g. `checkin`
    pub action: Option<String>,
}

/// Custom error type for the registration endpoint
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Missing or unrecognised `action`
    #[error("Action not specified or invalid.")]
    UnknownAction,

    /// Action exists but was called with the wrong HTTP method
    #[error("Method Not Allowed.")]
    MethodNotAllowed {
        /// Method the action expects
        allowed: &'static str,
    },

    /// Body could not be parsed or failed validation
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Error raised by the registration service
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnknownAction => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Registration(RegistrationError::InvalidFormat(_))
            | ApiError::Registration(RegistrationError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Registration(RegistrationError::AlreadyRejected(_)) => StatusCode::CONFLICT,
            ApiError::Registration(RegistrationError::Storage(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());

        let message = match self {
            ApiError::MethodNotAllowed { allowed } => {
                builder.insert_header((header::ALLOW, *allowed));
                self.to_string()
            }
            ApiError::Registration(RegistrationError::Storage(e)) => {
                log::error!("❌ Storage failure: {}", e);
                "An unexpected error occurred.".to_string()
            }
            _ => self.to_string(),
        };

        builder.json(ApiResponse::error(message))
    }
}

/// Parses a JSON request body, mapping failures to a 400.
pub fn parse_json_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("malformed JSON body ({})", e)))
}
