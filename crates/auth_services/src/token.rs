use std::path::Path;

use subtle::ConstantTimeEq;

/// Default location of the token file, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = ".apitoken";

/// Error type for loading the server secret
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token file could not be read
    #[error("Token file {path} could not be read: {source}")]
    Unreadable {
        /// Path that was tried
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The token is empty after trimming
    #[error("Token is empty")]
    Empty,
}

/// The server-held API secret.
///
/// Cloned into every worker's middleware. Its `Debug` output never shows the
/// secret itself.
#[derive(Clone)]
pub struct ServerSecret(String);

impl ServerSecret {
    /// Wraps a secret, trimming surrounding whitespace.
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        let trimmed = secret.trim();
        if trimmed.is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Reads the secret from a file. Trailing newlines are ignored.
    pub fn from_file(path: &Path) -> Result<Self, TokenError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| TokenError::Unreadable {
                path: path.display().to_string(),
                source,
            })?;
        Self::new(&contents)
    }

    /// Compares a caller-supplied credential in constant time.
    ///
    /// The credential is trimmed first; an empty credential never matches.
    pub fn verify(&self, presented: &str) -> bool {
        let presented = presented.trim();
        if presented.is_empty() {
            return false;
        }
        // ct_eq on slices of different length returns false without leaking where they differ.
        self.0.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl std::fmt::Debug for ServerSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ServerSecret(***)")
    }
}
