//! Core types and events for invoice-mailer

use crate::mailer::SendReport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Event emitted while a job runs
///
/// Subscribe with [`DeliveryJob::subscribe`](crate::DeliveryJob::subscribe)
/// before calling `send()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The rendered invoice is completely written and closed
    Saved {
        /// Output file
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },

    /// Rendering failed; no email will be sent
    RenderFailed {
        /// Error message
        error: String,
    },

    /// The transport accepted at least one recipient
    MailAccepted {
        /// Accepted recipients
        recipients: Vec<String>,
        /// Raw transport response
        response: String,
    },

    /// The transport rejected at least one recipient
    MailRejected {
        /// Rejected recipients
        recipients: Vec<String>,
        /// Raw transport response
        response: String,
    },

    /// The mail transport raised an error
    MailFailed {
        /// Error message
        error: String,
    },
}

/// Final result of a sent job, as seen through its handle
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub enum DeliveryOutcome {
    /// Rendering failed; no file was kept and no email was attempted
    RenderFailed {
        /// Error message
        error: String,
    },

    /// The file was saved and the transport answered
    ///
    /// `report.rejected` may be non-empty: a partial delivery is still `Mailed`.
    Mailed {
        /// Output file
        path: PathBuf,
        /// Bytes written
        bytes: u64,
        /// Transport answer
        report: SendReport,
    },

    /// The file was saved but the mail transport raised an error
    MailFailed {
        /// Output file
        path: PathBuf,
        /// Bytes written
        bytes: u64,
        /// Error message
        error: String,
    },

    /// The file was saved and the email was handed to a detached task
    MailDetached {
        /// Output file
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },
}

impl DeliveryOutcome {
    /// Path of the saved invoice, if rendering succeeded
    pub fn saved_path(&self) -> Option<&PathBuf> {
        match self {
            DeliveryOutcome::RenderFailed { .. } => None,
            DeliveryOutcome::Mailed { path, .. }
            | DeliveryOutcome::MailFailed { path, .. }
            | DeliveryOutcome::MailDetached { path, .. } => Some(path),
        }
    }
}
