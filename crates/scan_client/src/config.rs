use std::time::Duration;

use crate::session_types::FeedbackTone;

/// How long each kind of result stays on screen before scanning resumes.
///
/// Successes are brief; warnings stay longest so the operator can read them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDurations {
    /// Accepted check-ins
    pub success: Duration,
    /// Duplicates and already-registered identifiers
    pub warning: Duration,
    /// Rejections, unknown identifiers and every kind of error
    pub error: Duration,
}

impl Default for DisplayDurations {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(2500),
            warning: Duration::from_millis(4000),
            error: Duration::from_millis(3000),
        }
    }
}

impl DisplayDurations {
    /// Display duration for a result with the given tone.
    pub fn for_tone(&self, tone: FeedbackTone) -> Duration {
        match tone {
            FeedbackTone::Success => self.success,
            FeedbackTone::Warning => self.warning,
            FeedbackTone::Rejected | FeedbackTone::Error => self.error,
        }
    }
}

/// Error type for client configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable holds a value that cannot be parsed
    #[error("{key} has invalid value '{value}'")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

/// Settings a scanning station needs to reach the registration service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the registration endpoint
    pub api_url: String,
    /// Caller credential sent in `X-API-Token`
    pub api_token: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Display-phase durations
    pub display: DisplayDurations,
}

impl ClientConfig {
    /// Creates a configuration with default timeout and display durations.
    pub fn new(api_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: api_token.into(),
            timeout: Duration::from_secs(10),
            display: DisplayDurations::default(),
        }
    }

    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let millis = |key: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            match get(key) {
                Some(value) => value
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|_| ConfigError::Invalid { key, value }),
                None => Ok(default),
            }
        };

        let api_url = get("CHECKIN_API_URL").ok_or(ConfigError::Missing("CHECKIN_API_URL"))?;
        let api_token =
            get("CHECKIN_API_TOKEN").ok_or(ConfigError::Missing("CHECKIN_API_TOKEN"))?;

        let mut config = Self::new(api_url, api_token);

        if let Some(value) = get("CHECKIN_HTTP_TIMEOUT_SECS") {
            let secs = value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "CHECKIN_HTTP_TIMEOUT_SECS",
                value: value.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        let defaults = DisplayDurations::default();
        config.display = DisplayDurations {
            success: millis("CHECKIN_DISPLAY_SUCCESS_MS", defaults.success)?,
            warning: millis("CHECKIN_DISPLAY_WARNING_MS", defaults.warning)?,
            error: millis("CHECKIN_DISPLAY_ERROR_MS", defaults.error)?,
        };

        Ok(config)
    }
}
