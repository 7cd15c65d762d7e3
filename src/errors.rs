/*!
 * Error types for the strans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::fmt;
use thiserror::Error;

/// Symbolic classification of a failed translation call.
///
/// The batch client never lets an error cross its contract boundary; it
/// reports one of these instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The API rejected the key (HTTP 401)
    Auth,
    /// Too many requests (HTTP 429)
    RateLimit,
    /// No credits left on the account (HTTP 402)
    Quota,
    /// The request exceeded the configured timeout
    Timeout,
    /// The run was canceled before or after the network call
    Canceled,
    /// Any other transport, protocol or decoding failure
    Network(String),
}

impl ErrorKind {
    /// Whether this kind should stop the chunk engine instead of retrying
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth => write!(f, "Invalid API key!"),
            Self::RateLimit => write!(f, "Rate limit!"),
            Self::Quota => write!(f, "No credits!"),
            Self::Timeout => write!(f, "Timeout"),
            Self::Canceled => write!(f, "Canceled"),
            Self::Network(message) => write!(f, "Error: {}", message),
        }
    }
}

/// Errors that can occur when talking to the translation API
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The account has no remaining credits
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    /// The request did not complete in time
    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

impl ProviderError {
    /// Map a provider error onto the symbolic kind reported to the chunk engine
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationError(_) => ErrorKind::Auth,
            Self::RateLimitExceeded(_) => ErrorKind::RateLimit,
            Self::QuotaExhausted(_) => ErrorKind::Quota,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::RequestFailed(message) | Self::ParseError(message) => {
                ErrorKind::Network(truncate_message(message, MAX_ERROR_MESSAGE_CHARS))
            }
            Self::ApiError { status_code, message } => ErrorKind::Network(truncate_message(
                &format!("{} {}", status_code, message),
                MAX_ERROR_MESSAGE_CHARS,
            )),
        }
    }
}

/// Longest error message carried inside [`ErrorKind::Network`]
pub const MAX_ERROR_MESSAGE_CHARS: usize = 80;

/// Truncate a message to at most `max_chars` characters, on a char boundary
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    message.chars().take(max_chars).collect()
}

/// Errors that can occur while reading or writing translatable files
#[derive(Error, Debug)]
pub enum FormatError {
    /// The file extension is not one we can translate
    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    /// A single block or pair could not be understood
    #[error("Parse error: {0}")]
    Parse(String),

    /// The file exceeds the configured size ceiling
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    TooLarge {
        /// Actual size in bytes
        size: u64,
        /// Configured ceiling in bytes
        limit: u64,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from file format handling
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// A precondition for starting a run was not met
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
