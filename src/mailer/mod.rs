//! Email dispatch of the rendered invoice
//!
//! The core abstraction is the [`Mailer`] trait. [`SmtpMailer`] submits through
//! an SMTP relay; tests and embedders can provide their own implementation and
//! hand it to [`DeliveryJob::with_mailer`](crate::DeliveryJob::with_mailer).

mod smtp;
mod traits;

pub use smtp::SmtpMailer;
pub use traits::{Mailer, OutgoingMail, SendReport};

use crate::config::MailConfig;
use std::path::Path;

impl OutgoingMail {
    /// The configured message with `attachment` attached
    pub fn from_config(config: &MailConfig, attachment: &Path) -> Self {
        Self {
            from: config.from.clone(),
            to: config.to.clone(),
            subject: config.subject.clone(),
            text: config.body.clone(),
            attachment: attachment.to_path_buf(),
        }
    }
}
