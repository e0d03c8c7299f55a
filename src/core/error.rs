//! Typed error handling for split-board
//!
//! Every fallible operation in the crate returns [`BoardResult`]. The
//! top-level [`BoardError`] wraps one category enum per collaborator so
//! callers can tell an unavailable upstream apart from a broken store.
//!
//! # Error Categories
//!
//! - [`UpstreamError`]: the bookkeeping API answered with a non-success
//!   status, could not be reached, or sent an undecodable body
//! - [`StorageError`]: the record store is unavailable or a query failed
//! - [`ConfigError`]: a required setting or secret is missing or malformed
//! - [`NotificationError`]: the chat webhook rejected or dropped a message
//! - [`RequestError`]: the incoming HTTP request is malformed
//!
//! # Example
//!
//! ```rust,ignore
//! match sync.sync(group_id).await {
//!     Ok(report) => println!("{} new", report.inserted.len()),
//!     Err(BoardError::Upstream(UpstreamError::Status { status })) => {
//!         eprintln!("upstream answered {}", status);
//!     }
//!     Err(e) => eprintln!("sync failed: {}", e),
//! }
//! ```

use axum::http::StatusCode;
use std::fmt;

/// The main error type for split-board
#[derive(Debug)]
pub enum BoardError {
    /// Bookkeeping API errors
    Upstream(UpstreamError),

    /// Record store errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Chat webhook errors
    Notification(NotificationError),

    /// HTTP/Request errors
    Request(RequestError),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Upstream(e) => write!(f, "{}", e),
            BoardError::Storage(e) => write!(f, "{}", e),
            BoardError::Config(e) => write!(f, "{}", e),
            BoardError::Notification(e) => write!(f, "{}", e),
            BoardError::Request(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoardError::Upstream(e) => Some(e),
            BoardError::Storage(e) => Some(e),
            BoardError::Config(e) => Some(e),
            BoardError::Notification(e) => Some(e),
            BoardError::Request(e) => Some(e),
        }
    }
}

impl BoardError {
    /// Get the HTTP status code for this error
    ///
    /// Everything except a malformed request is a server-side failure from
    /// the caller's point of view.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BoardError::Request(e) => e.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            BoardError::Upstream(e) => e.error_code(),
            BoardError::Storage(_) => "STORAGE_ERROR",
            BoardError::Config(_) => "CONFIG_ERROR",
            BoardError::Notification(_) => "NOTIFICATION_ERROR",
            BoardError::Request(e) => e.error_code(),
        }
    }

    /// True when the bookkeeping API could not serve the request
    pub fn is_upstream_unavailable(&self) -> bool {
        matches!(self, BoardError::Upstream(_))
    }
}

// =============================================================================
// Upstream Errors
// =============================================================================

/// Errors talking to the bookkeeping API
#[derive(Debug)]
pub enum UpstreamError {
    /// The API answered with a non-success HTTP status
    Status {
        status: u16,
    },

    /// Connection failure, TLS failure or timeout
    Transport {
        message: String,
    },

    /// The body did not match the expected payload schema
    Decode {
        message: String,
    },
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Status { status } => {
                write!(f, "Upstream API answered with status {}", status)
            }
            UpstreamError::Transport { message } => {
                write!(f, "Upstream API unreachable: {}", message)
            }
            UpstreamError::Decode { message } => {
                write!(f, "Failed to decode upstream payload: {}", message)
            }
        }
    }
}

impl std::error::Error for UpstreamError {}

impl UpstreamError {
    pub fn error_code(&self) -> &'static str {
        match self {
            UpstreamError::Status { .. } => "UPSTREAM_STATUS",
            UpstreamError::Transport { .. } => "UPSTREAM_TRANSPORT",
            UpstreamError::Decode { .. } => "UPSTREAM_DECODE",
        }
    }

    /// The HTTP status the API answered with, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<UpstreamError> for BoardError {
    fn from(err: UpstreamError) -> Self {
        BoardError::Upstream(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to the record store
#[derive(Debug)]
pub enum StorageError {
    /// Failed to connect to storage backend
    ConnectionError {
        backend: String,
        message: String,
    },

    /// Query execution error
    QueryError {
        backend: String,
        message: String,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionError { backend, message } => {
                write!(f, "Failed to connect to {}: {}", backend, message)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for BoardError {
    fn from(err: StorageError) -> Self {
        BoardError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Required environment variable is unset or blank
    MissingVar {
        name: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Configuration file not found
    FileNotFound {
        path: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar { name } => {
                write!(f, "{} is not set", name)
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for BoardError {
    fn from(err: ConfigError) -> Self {
        BoardError::Config(err)
    }
}

// =============================================================================
// Notification Errors
// =============================================================================

/// Errors delivering a message to the chat webhook
#[derive(Debug)]
pub enum NotificationError {
    /// The webhook answered with a non-success HTTP status
    Status {
        status: u16,
    },

    /// Connection failure or timeout
    Transport {
        message: String,
    },
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationError::Status { status } => {
                write!(f, "Webhook rejected message with status {}", status)
            }
            NotificationError::Transport { message } => {
                write!(f, "Webhook unreachable: {}", message)
            }
        }
    }
}

impl std::error::Error for NotificationError {}

impl From<NotificationError> for BoardError {
    fn from(err: NotificationError) -> Self {
        BoardError::Notification(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Group id path segment is not an integer
    InvalidGroupId {
        value: String,
    },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidGroupId { value } => {
                write!(f, "Invalid group id: '{}'", value)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidGroupId { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidGroupId { .. } => "INVALID_GROUP_ID",
        }
    }
}

impl From<RequestError> for BoardError {
    fn from(err: RequestError) -> Self {
        BoardError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for BoardError {
    fn from(err: serde_yaml::Error) -> Self {
        BoardError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for split-board operations
pub type BoardResult<T> = Result<T, BoardError>;

// =============================================================================
// Tests
// =============================================================================
