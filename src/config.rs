//! Configuration types for invoice-mailer
//!
//! Configuration is loaded once by the caller and passed into
//! [`DeliveryJob::new`](crate::DeliveryJob::new). Nothing inside the pipeline
//! reads the process environment.

use serde::{Deserialize, Serialize};

/// Environment variable holding the SMTP username
pub const USERNAME_VAR: &str = "MAILTRAP_USERNAME";
/// Environment variable holding the SMTP password
pub const PASSWORD_VAR: &str = "MAILTRAP_PASSWORD";

/// Main configuration for a delivery job
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Rendering service settings
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Outgoing mail settings
    #[serde(default)]
    pub mail: MailConfig,

    /// Whether `send()` completion includes the email stage
    #[serde(default)]
    pub dispatch: DispatchMode,
}

impl Config {
    /// Default configuration with mail credentials taken from the environment
    ///
    /// Missing credentials are not an error here; they are rejected when the
    /// job is constructed.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.mail.credentials = MailCredentials::from_env();
        config
    }
}

/// Rendering service configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Endpoint that accepts the invoice JSON and answers with a PDF
    /// (default: "https://invoice-generator.com/")
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// User-Agent sent with the request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
        }
    }
}

/// SMTP connection security
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection, no TLS
    None,
    /// Upgrade with STARTTLS (default)
    #[default]
    StartTls,
    /// Implicit TLS from the first byte
    Tls,
}

/// Outgoing mail configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host (default: "smtp.mailtrap.io")
    #[serde(default = "default_smtp_host")]
    pub host: String,

    /// SMTP relay port (default: 2525)
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Connection security
    #[serde(default)]
    pub security: SmtpSecurity,

    /// Login for the relay; required before a job can be built
    #[serde(default)]
    pub credentials: Option<MailCredentials>,

    /// Sender address
    #[serde(default = "default_from")]
    pub from: String,

    /// Recipient address
    #[serde(default = "default_to")]
    pub to: String,

    /// Subject line
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Plain-text body
    #[serde(default = "default_body")]
    pub body: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            security: SmtpSecurity::default(),
            credentials: None,
            from: default_from(),
            to: default_to(),
            subject: default_subject(),
            body: default_body(),
        }
    }
}

/// SMTP login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailCredentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl MailCredentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read credentials from the process environment
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`
    ///
    /// Returns `None` unless both [`USERNAME_VAR`] and [`PASSWORD_VAR`] resolve
    /// to non-blank values.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Some(Self {
            username: present(USERNAME_VAR)?,
            password: present(PASSWORD_VAR)?,
        })
    }
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How the email stage relates to the handle returned by `send()`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// The handle completes only after the mail transport has answered
    #[default]
    Awaited,
    /// The email is sent from its own task; the handle completes once the
    /// file is saved and nothing waits for the mail transport
    Detached,
}

fn default_endpoint() -> String {
    "https://invoice-generator.com/".to_string()
}

fn default_user_agent() -> String {
    concat!("invoice-mailer/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_smtp_host() -> String {
    "smtp.mailtrap.io".to_string()
}

fn default_smtp_port() -> u16 {
    2525
}

fn default_from() -> String {
    "invoice@me.com".to_string()
}

fn default_to() -> String {
    "sample@me.com".to_string()
}

fn default_subject() -> String {
    "Invoice for weekly payments".to_string()
}

fn default_body() -> String {
    "Find attached the weekly invoice from me. Thanks".to_string()
}
