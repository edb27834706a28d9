//! # invoice-mailer
//!
//! Render an invoice to PDF through a remote rendering service, save it to
//! disk, and email it as an attachment.
//!
//! The pipeline runs in three steps, strictly in order:
//! 1. The [`InvoiceDocument`] is serialized into a [`RenderRequest`]
//! 2. The request is POSTed and the response is streamed into the output file
//! 3. Once the file is closed, it is attached to an email and sent
//!
//! Only construction can fail with an error. After [`DeliveryJob::send`] the
//! outcome is reported through logs, [`Event`]s, and the [`DeliveryOutcome`]
//! returned by the handle.
//!
//! ## Quick Start
//!
//! ```no_run
//! use invoice_mailer::{Config, DeliveryJob, Event, InvoiceDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let job = DeliveryJob::new(InvoiceDocument::sample(), "invoice.pdf", &config)?;
//!
//!     let mut events = job.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let outcome = job.send().wait().await?;
//!     println!("Outcome: {:?}", outcome);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Invoice data model
pub mod invoice;
/// Email dispatch
pub mod mailer;
/// Render, save, and mail pipeline
pub mod pipeline;
/// Render request builder
pub mod request;
/// Events and outcomes
pub mod types;

// Re-export commonly used types
pub use config::{Config, DispatchMode, MailConfig, MailCredentials, RendererConfig};
pub use error::{Error, MailError, Result, TransportError};
pub use invoice::{Currency, FieldValue, InvoiceDocument, LineItem, PaymentTerms};
pub use mailer::{Mailer, OutgoingMail, SendReport, SmtpMailer};
pub use pipeline::{DeliveryHandle, DeliveryJob};
pub use request::RenderRequest;
pub use types::{DeliveryOutcome, Event};
