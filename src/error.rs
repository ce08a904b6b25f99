//! Error types for simplechat.
//!
//! Construction-time failures (the store, an unsupported provider) are fatal
//! to the process.  Everything else surfaces while handling a single line of
//! input and is reported inline by the shell.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// The main error type for simplechat.
#[derive(Clone, Debug)]
pub enum Error {
    /// The persistent store could not be opened or migrated.
    Store {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<rusqlite::Error>>,
    },

    /// A provider identifier outside the supported set was supplied.
    UnsupportedProvider {
        /// The identifier as given on the command line.
        provider: String,
    },

    /// A generic API error returned by a chat backend.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Error type string from the API.
        error_type: Option<String>,
        /// Human-readable error message.
        message: String,
    },

    /// Authentication error, including a missing API key.
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Rate limit exceeded.
    RateLimit {
        /// Human-readable error message.
        message: String,
        /// Time to wait before retrying, in seconds.
        retry_after: Option<u64>,
    },

    /// The backend could not be reached.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// HTTP client error.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The system clipboard is unavailable or failed.
    Clipboard {
        /// Human-readable error message.
        message: String,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },
}

impl Error {
    /// Creates a new store error.
    pub fn store(message: impl Into<String>, source: Option<rusqlite::Error>) -> Self {
        Error::Store {
            message: message.into(),
            source: source.map(Arc::new),
        }
    }

    /// Creates a new unsupported provider error.
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        Error::UnsupportedProvider {
            provider: provider.into(),
        }
    }

    /// Creates a new API error.
    pub fn api(status_code: u16, error_type: Option<String>, message: String) -> Self {
        Error::Api {
            status_code,
            error_type,
            message,
        }
    }

    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new rate limit error.
    pub fn rate_limit(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Error::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new clipboard error.
    pub fn clipboard(message: impl Into<String>) -> Self {
        Error::Clipboard {
            message: message.into(),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Returns true if this error is a store error.
    pub fn is_store(&self) -> bool {
        matches!(self, Error::Store { .. })
    }

    /// Returns true if this error names an unsupported provider.
    pub fn is_unsupported_provider(&self) -> bool {
        matches!(self, Error::UnsupportedProvider { .. })
    }

    /// Returns true if this error is related to authentication.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Returns true if this error is a clipboard error.
    pub fn is_clipboard(&self) -> bool {
        matches!(self, Error::Clipboard { .. })
    }

    /// Returns true if this error must abort the process.
    ///
    /// Only configuration and store construction errors are fatal; every
    /// other error is contained within a single shell iteration.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Store { .. } | Error::UnsupportedProvider { .. }
        )
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store { message, .. } => {
                write!(f, "Store error: {message}")
            }
            Error::UnsupportedProvider { provider } => {
                write!(f, "Unsupported provider: {provider:?}")
            }
            Error::Api {
                status_code,
                error_type,
                message,
            } => {
                if let Some(error_type) = error_type {
                    write!(f, "{error_type}: {message} (status {status_code})")
                } else {
                    write!(f, "API error: {message} (status {status_code})")
                }
            }
            Error::Authentication { message } => {
                write!(f, "Authentication error: {message}")
            }
            Error::RateLimit {
                message,
                retry_after,
            } => {
                if let Some(retry_after) = retry_after {
                    write!(
                        f,
                        "Rate limit exceeded: {message} (retry after {retry_after} seconds)"
                    )
                } else {
                    write!(f, "Rate limit exceeded: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Connection error: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Clipboard { message } => {
                write!(f, "Clipboard error: {message}")
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Store { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::store(err.to_string(), Some(err))
    }
}

/// A specialized Result type for simplechat operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_provider_is_fatal() {
        let err = Error::unsupported_provider("gemini");
        assert!(err.is_unsupported_provider());
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "Unsupported provider: \"gemini\"");
    }

    #[test]
    fn interaction_errors_are_not_fatal() {
        assert!(!Error::authentication("no key").is_fatal());
        assert!(!Error::clipboard("no xclip").is_fatal());
        assert!(!Error::api(500, None, "boom".to_string()).is_fatal());
    }

    #[test]
    fn store_error_keeps_source() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(err.is_store());
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn api_error_display() {
        let err = Error::api(
            400,
            Some("invalid_request_error".to_string()),
            "bad model".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "invalid_request_error: bad model (status 400)"
        );
        assert_eq!(err.status_code(), Some(400));
    }
}
