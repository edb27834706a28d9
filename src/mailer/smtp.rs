//! SMTP mailer backed by lettre

use super::traits::{Mailer, OutgoingMail, SendReport};
use crate::config::{MailConfig, SmtpSecurity};
use crate::error::{Error, MailError};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

/// Mailer that submits through an SMTP relay
///
/// lettre aborts the whole transaction on any negative reply, whether it
/// answers `MAIL FROM`, `RCPT TO` or the end of `DATA`, so every such reply
/// is an `Err` here. A successful report lists all envelope recipients as
/// accepted and never fills `rejected`.
///
/// # Examples
///
/// ```no_run
/// use invoice_mailer::config::{MailConfig, MailCredentials};
/// use invoice_mailer::mailer::SmtpMailer;
///
/// let config = MailConfig {
///     credentials: Some(MailCredentials::new("user", "secret")),
///     ..Default::default()
/// };
/// let mailer = SmtpMailer::from_config(&config).expect("valid relay settings");
/// ```
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    /// Build a mailer for the relay described by `config`
    ///
    /// No connection is opened until the first message is sent.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if credentials are missing or the TLS
    /// parameters for `host` cannot be built.
    pub fn from_config(config: &MailConfig) -> crate::Result<Self> {
        let credentials = config.credentials.as_ref().ok_or_else(|| {
            Error::config(
                "mail.credentials",
                format!(
                    "mail credentials not set ({} and {} are required)",
                    crate::config::USERNAME_VAR,
                    crate::config::PASSWORD_VAR
                ),
            )
        })?;

        let builder = match config.security {
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .map_err(|e| Error::config("mail.host", e.to_string()))?
            }
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| Error::config("mail.host", e.to_string()))?,
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            host: config.host.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> crate::Result<SendReport> {
        let content = tokio::fs::read(&mail.attachment)
            .await
            .map_err(|source| MailError::Attachment {
                path: mail.attachment.clone(),
                source,
            })?;
        let message = build_message(mail, content)?;
        let recipients: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();

        debug!(host = %self.host, recipients = ?recipients, "submitting message");

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;
        let lines: Vec<&str> = response.message().collect();

        Ok(SendReport {
            accepted: recipients,
            rejected: Vec::new(),
            response: format!("{} {}", response.code(), lines.join(" ")),
        })
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Assemble a text body plus the PDF attachment
fn build_message(mail: &OutgoingMail, content: Vec<u8>) -> Result<Message, MailError> {
    let filename = mail
        .attachment
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "invoice.pdf".to_string());
    let pdf = ContentType::parse("application/pdf").map_err(|e| MailError::Build(e.to_string()))?;

    Message::builder()
        .from(parse_mailbox(&mail.from)?)
        .to(parse_mailbox(&mail.to)?)
        .subject(mail.subject.clone())
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(mail.text.clone()))
                .singlepart(Attachment::new(filename).body(content, pdf)),
        )
        .map_err(|e| MailError::Build(e.to_string()))
}
