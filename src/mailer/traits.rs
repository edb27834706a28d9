//! Traits and types for sending the invoice email

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A message with the rendered invoice attached
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub text: String,
    /// File to attach; read when the message is sent
    pub attachment: PathBuf,
}

/// What the transport said about a submitted message
///
/// `accepted` and `rejected` are independent; both may be non-empty.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReport {
    /// Recipients the transport accepted
    pub accepted: Vec<String>,
    /// Recipients the transport refused
    pub rejected: Vec<String>,
    /// Raw final response line(s) from the transport
    pub response: String,
}

/// Trait for email transports
///
/// Implementations submit one [`OutgoingMail`] and describe the result in a
/// [`SendReport`]. Recipient-level refusals belong in the report; an `Err` is
/// reserved for failures of the transport itself (authentication, dropped
/// connection, unreadable attachment).
///
/// # Examples
///
/// ```no_run
/// use invoice_mailer::config::MailConfig;
/// use invoice_mailer::mailer::{Mailer, OutgoingMail, SmtpMailer};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mailer = SmtpMailer::from_config(&MailConfig::default())?;
/// let report = mailer
///     .send(&OutgoingMail {
///         from: "invoice@me.com".into(),
///         to: "sample@me.com".into(),
///         subject: "Invoice".into(),
///         text: "Attached.".into(),
///         attachment: "invoice.pdf".into(),
///     })
///     .await?;
/// println!("{}", report.response);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Submit `mail` and wait for the transport's answer
    ///
    /// # Errors
    ///
    /// Returns an error if the attachment cannot be read, the message cannot
    /// be built, or the transport fails before answering.
    async fn send(&self, mail: &OutgoingMail) -> crate::Result<SendReport>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
