//! Error types for invoice-mailer
//!
//! Failures are grouped by the stage that produces them:
//! - [`Error::Config`] and [`Error::InvalidInvoice`] are raised while
//!   constructing a job and are the only errors that reach the caller of
//!   [`DeliveryJob::new`](crate::DeliveryJob::new)
//! - [`TransportError`] covers the rendering request and its response stream
//! - [`MailError`] covers building and submitting the outgoing message
//!
//! Once a job has been sent, errors are reported through logs and
//! [`Event`](crate::Event)s rather than returned.

use thiserror::Error;

/// Result type alias for invoice-mailer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for invoice-mailer
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "mail.credentials")
        key: Option<String>,
    },

    /// The invoice holds a number JSON cannot represent (NaN or infinite)
    #[error("invalid invoice: {field} is not a finite number")]
    InvalidInvoice {
        /// Path of the offending value, e.g. `items[1].unit_cost`
        field: String,
    },

    /// Rendering request or response stream failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Building or submitting the email failed
    #[error("mail error: {0}")]
    Mail(#[from] MailError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a config key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Errors talking to the rendering service
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent (DNS, connection refused, TLS, ...)
    #[error("request to {url} failed: {source}")]
    Request {
        /// Endpoint the request was sent to
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status
    #[error("{url} returned status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Endpoint the request was sent to
        url: String,
    },

    /// The response body stream broke off
    #[error("response body from {url} interrupted: {source}")]
    Body {
        /// Endpoint the request was sent to
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },
}

/// Errors building or sending the email
#[derive(Debug, Error)]
pub enum MailError {
    /// A sender or recipient address could not be parsed
    #[error("invalid email address {address:?}: {reason}")]
    Address {
        /// The offending address
        address: String,
        /// Parser message
        reason: String,
    },

    /// The message could not be assembled
    #[error("failed to build message: {0}")]
    Build(String),

    /// The attachment could not be read
    #[error("failed to read attachment {}: {source}", .path.display())]
    Attachment {
        /// Path of the attachment
        path: std::path::PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The SMTP transport failed (auth, connection drop, protocol error)
    #[error("SMTP error: {0}")]
    Smtp(String),
}
