use async_trait::async_trait;
use checkin_core::wire::{
    API_TOKEN_HEADER, ACTION_PARAM, Action, ApiResponse, ApiStatus, CheckinRequest, RejectRequest,
};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use crate::config::ClientConfig;

/// Reason shown when the service rejects an identifier without saying why.
pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

/// Normalised answer of the service to one check-in submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationResult {
    /// New check-in recorded
    Accepted {
        /// Message from the service
        message: String,
    },
    /// A check-in already existed
    AlreadyRegistered {
        /// Message from the service
        message: String,
    },
    /// The identifier is blocked
    Rejected {
        /// Message from the service
        message: String,
        /// Stored rejection reason
        reason: String,
    },
    /// The identifier is not on the guest list
    Unknown {
        /// Message from the service
        message: String,
    },
    /// The service reported an error
    ServiceError {
        /// Message from the service
        message: String,
    },
    /// No intelligible answer: network failure, timeout or malformed body
    TransportError {
        /// Description of the failure
        message: String,
    },
}

/// Error type for the administrative operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the answer not read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status
    #[error("Service returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message from the service
        message: String,
    },

    /// The answer was not the expected JSON
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Something that can submit an identifier for check-in.
///
/// [`RegistrationClient`] is the production implementation; tests substitute
/// their own to drive a scan session without a server.
#[async_trait]
pub trait CheckinSubmitter: Send + Sync {
    /// Submits `id` and classifies the answer. Never fails; failures become
    /// [`RegistrationResult::TransportError`] or [`RegistrationResult::ServiceError`].
    async fn submit(&self, id: &str) -> RegistrationResult;
}

/// Client for the registration endpoint
#[derive(Debug, Clone)]
pub struct RegistrationClient {
    client: Client,
    api_url: String,
    api_token: String,
}

impl RegistrationClient {
    /// Create a new registration client
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    fn request(&self, action: Action) -> RequestBuilder {
        let builder = if action.is_read_only() {
            self.client.get(&self.api_url)
        } else {
            self.client.post(&self.api_url)
        };
        builder
            .query(&[(ACTION_PARAM, action.as_str())])
            .header(API_TOKEN_HEADER, &self.api_token)
    }

    /// Submits one check-in.
    pub async fn submit(&self, id: &str) -> RegistrationResult {
        debug!("Submitting check-in for {}", id);

        let response = match self
            .request(Action::CheckIn)
            .json(&CheckinRequest { id: id.to_string() })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Check-in request for {} failed: {}", id, e);
                return RegistrationResult::TransportError {
                    message: describe_transport_error(&e),
                };
            }
        };

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => interpret_checkin_response(status, &body),
            Err(e) => {
                warn!("Could not read check-in response for {}: {}", id, e);
                RegistrationResult::TransportError {
                    message: describe_transport_error(&e),
                }
            }
        }
    }

    /// Lists every checked-in identifier, ascending.
    pub async fn list_registered(&self) -> Result<Vec<String>, ClientError> {
        let response = self.request(Action::RegisteredIds).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        serde_json::from_slice(&body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }

    /// Deletes every check-in record. Returns the service message.
    pub async fn clear_all(&self) -> Result<String, ClientError> {
        let response = self.request(Action::Clear).send().await?;
        read_confirmation(response).await
    }

    /// Blocks `id` from future check-ins. Returns the service message.
    pub async fn reject(
        &self,
        id: &str,
        reason: &str,
        rejected_by: Option<&str>,
    ) -> Result<String, ClientError> {
        let body = RejectRequest {
            id: id.to_string(),
            reason: reason.to_string(),
            rejected_by: rejected_by.map(str::to_string),
        };
        let response = self.request(Action::Reject).json(&body).send().await?;
        read_confirmation(response).await
    }
}

#[async_trait]
impl CheckinSubmitter for RegistrationClient {
    async fn submit(&self, id: &str) -> RegistrationResult {
        RegistrationClient::submit(self, id).await
    }
}

/// Classifies a check-in answer from its HTTP status and body.
///
/// The JSON `status` field decides; the HTTP status only matters when the
/// body cannot be understood.
pub fn interpret_checkin_response(http_status: u16, body: &[u8]) -> RegistrationResult {
    let response: ApiResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(e) => {
            warn!("Unintelligible check-in response (HTTP {}): {}", http_status, e);
            return RegistrationResult::TransportError {
                message: format!("Unexpected response from server (HTTP {}).", http_status),
            };
        }
    };

    let ApiResponse {
        status,
        message,
        reason,
    } = response;

    match status {
        ApiStatus::Ok => RegistrationResult::Accepted { message },
        ApiStatus::AlreadyRegistered => RegistrationResult::AlreadyRegistered { message },
        ApiStatus::Rejected => RegistrationResult::Rejected {
            message,
            reason: reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string()),
        },
        ApiStatus::IdNotKnown => RegistrationResult::Unknown { message },
        ApiStatus::Error => RegistrationResult::ServiceError { message },
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "The server did not answer in time.".to_string()
    } else if e.is_connect() {
        "Could not connect to the server.".to_string()
    } else {
        format!("Request failed: {}", e)
    }
}

fn api_error(status: u16, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ApiResponse>(body)
        .map(|r| r.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());
    ClientError::Api { status, message }
}

async fn read_confirmation(response: reqwest::Response) -> Result<String, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(api_error(status.as_u16(), &body));
    }

    let parsed: ApiResponse = serde_json::from_slice(&body)
        .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
    match parsed.status {
        ApiStatus::Ok => Ok(parsed.message),
        _ => Err(ClientError::Api {
            status: status.as_u16(),
            message: parsed.message,
        }),
    }
}
