use std::path::PathBuf;

use auth_services::token::DEFAULT_TOKEN_FILE;
use postgres::database::DEFAULT_DATABASE_URL;

/// Which backend keeps check-in and rejection records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// PostgreSQL tables (`DATABASE_URL`)
    Postgres,
    /// A single JSON document on disk
    File,
    /// Process memory; everything is lost on restart
    Memory,
}

/// Error type for server configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `CHECKIN_STORE` names no known backend
    #[error("Unknown CHECKIN_STORE '{0}' (expected postgres, file or memory)")]
    UnknownStore(String),

    /// A numeric variable could not be parsed
    #[error("{key} has invalid value '{value}'")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

/// Server settings read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Storage backend
    pub store: StoreKind,
    /// Connection string for [`StoreKind::Postgres`]
    pub database_url: String,
    /// Pool size for [`StoreKind::Postgres`]
    pub database_max_connections: u32,
    /// Data file for [`StoreKind::File`]
    pub data_file: PathBuf,
    /// Optional guest list file
    pub guest_list_file: Option<PathBuf>,
    /// Secret given inline; takes precedence over the token file
    pub api_token: Option<String>,
    /// File holding the secret
    pub api_token_file: PathBuf,
    /// Value of `Access-Control-Allow-Origin`
    pub allowed_origin: String,
    /// Directory of a built scanner UI to serve at `/`
    pub frontend_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match get("CHECKIN_STORE")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("postgres") => StoreKind::Postgres,
            Some("file") => StoreKind::File,
            Some("memory") => StoreKind::Memory,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let database_max_connections = match get("CHECKIN_DB_MAX_CONNECTIONS") {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "CHECKIN_DB_MAX_CONNECTIONS",
                        value,
                    });
                }
            },
            None => 5,
        };

        Ok(Self {
            bind_addr: get("CHECKIN_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            store,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections,
            data_file: get("CHECKIN_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("registered_ids.json")),
            guest_list_file: get("CHECKIN_GUEST_LIST_FILE").map(PathBuf::from),
            api_token: get("CHECKIN_API_TOKEN"),
            api_token_file: get("CHECKIN_API_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE)),
            allowed_origin: get("CHECKIN_ALLOWED_ORIGIN").unwrap_or_else(|| "*".to_string()),
            frontend_dir: get("CHECKIN_FRONTEND_DIR").map(PathBuf::from),
        })
    }
}
