//! Error types for zoho-crm-api.

/// Result type alias for zoho-crm-api operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Placeholder code when a response defeats code extraction.
pub(crate) const UNKNOWN_CODE: i32 = -1;

/// Placeholder message when a response defeats message extraction.
pub(crate) const UNSPECIFIED_MESSAGE: &str = "Unspecified error";

/// Error type for zoho-crm-api operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Create a remote-rejection error with the code and message Zoho sent.
    pub fn remote(code: i32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Remote {
            code,
            message: message.into(),
        })
    }

    /// Returns true if this is the duplicate-record condition.
    ///
    /// Callers often treat "this exact record already exists" as non-fatal,
    /// unlike every other remote rejection.
    pub fn is_duplicate(&self) -> bool {
        matches!(self.kind, ErrorKind::DuplicateRecord)
    }

    /// Returns the numeric code if this is a remote-rejection error.
    pub fn remote_code(&self) -> Option<i32> {
        match &self.kind {
            ErrorKind::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Zoho rejected the request; code and message are passed through intact.
    #[error("Zoho error {code}: {message}")]
    Remote { code: i32, message: String },

    /// The record already exists (duplicate detection).
    #[error("record already exists")]
    DuplicateRecord,

    /// Non-success HTTP status.
    #[error("HTTP error: {status} {message}")]
    Http { status: u16, message: String },

    /// Connection or timeout failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// The response body had none of the expected shapes.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() || err.is_connect() {
            ErrorKind::Transport(err.to_string())
        } else if let Some(status) = err.status() {
            ErrorKind::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ErrorKind::Transport(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}
