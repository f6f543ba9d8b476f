use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref IDENTIFIER_PATTERN: Regex = Regex::new(r"^[a-zA-Z0-9-]{5,50}$").unwrap();
}

/// Shortest identifier the registration service accepts.
pub const MIN_IDENTIFIER_LEN: usize = 5;

/// Longest identifier the registration service accepts.
pub const MAX_IDENTIFIER_LEN: usize = 50;

/// Error returned when a string is not a well-formed identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// Wrong length or characters outside `[a-zA-Z0-9-]`
    #[error("Invalid identifier format: '{0}'")]
    InvalidFormat(String),
}

/// A validated attendee identifier.
///
/// Between 5 and 50 characters drawn from `[a-zA-Z0-9-]`. Immutable once
/// constructed; the only way to get one is through [`Identifier::parse`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Validates `raw` (after trimming surrounding whitespace) against the identifier format.
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let trimmed = raw.trim();
        if is_valid_identifier(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(IdentifierError::InvalidFormat(trimmed.to_string()))
        }
    }

    /// Borrows the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identifier::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

/// Returns whether `candidate` satisfies the identifier format, without trimming.
pub fn is_valid_identifier(candidate: &str) -> bool {
    IDENTIFIER_PATTERN.is_match(candidate)
}
