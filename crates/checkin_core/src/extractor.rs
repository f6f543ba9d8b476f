use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Token after `/checkin/`, terminated by `/`, `?`, `#` or end of text.
    static ref CHECKIN_URL_PATTERN: Regex =
        Regex::new(r"/checkin/([a-zA-Z0-9-]+)(?:[/?#]|$)").unwrap();
}

/// Error returned when decoded text carries no check-in token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    /// No `/checkin/<token>` segment anywhere in the text
    #[error("Invalid QR code: Does not contain a valid check-in URL.")]
    ExtractionFailed,
}

/// Extracts the check-in token from a decoded QR payload.
///
/// Works on any text containing a `/checkin/<token>` segment, e.g.
/// `https://example.org/checkin/guest-42?src=badge` yields `guest-42`. The
/// token is not length-checked here; the registration service does that.
pub fn extract_identifier(decoded_text: &str) -> Result<String, ExtractionError> {
    CHECKIN_URL_PATTERN
        .captures(decoded_text)
        .and_then(|caps| caps.get(1))
        .map(|token| token.as_str().to_string())
        .ok_or(ExtractionError::ExtractionFailed)
}
