//! Delivery pipeline: render, save, then email.
//!
//! A [`DeliveryJob`] is validated when it is built and consumed when it is
//! sent. The work is split into two stages:
//! - [`render`] - POST the invoice and stream the PDF to disk
//! - [`dispatch`] - attach the saved file and report the mail outcome
//!
//! The email stage only starts after the file has been flushed and closed.

mod dispatch;
mod render;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::config::{Config, DispatchMode, MailConfig};
use crate::error::{Error, Result};
use crate::invoice::InvoiceDocument;
use crate::mailer::{Mailer, OutgoingMail, SmtpMailer};
use crate::request::RenderRequest;
use crate::types::{DeliveryOutcome, Event};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use url::Url;

/// Capacity of the event channel; a job emits at most three events
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// One invoice, rendered to one file and mailed once
///
/// # Examples
///
/// ```no_run
/// use invoice_mailer::{Config, DeliveryJob, InvoiceDocument};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::from_env();
///     let job = DeliveryJob::new(InvoiceDocument::sample(), "invoice.pdf", &config)?;
///
///     let outcome = job.send().wait().await?;
///     println!("{:?}", outcome);
///     Ok(())
/// }
/// ```
pub struct DeliveryJob {
    request: RenderRequest,
    output_path: PathBuf,
    client: reqwest::Client,
    mailer: Arc<dyn Mailer>,
    mail: MailConfig,
    dispatch: DispatchMode,
    event_tx: broadcast::Sender<Event>,
}

impl DeliveryJob {
    /// Build a job that mails through the SMTP relay in `config.mail`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if mail credentials are missing, the output
    /// path is not writable, or the renderer endpoint is not a valid URL.
    /// Nothing is sent over the network here.
    pub fn new(
        document: InvoiceDocument,
        output_path: impl Into<PathBuf>,
        config: &Config,
    ) -> Result<Self> {
        let mailer = SmtpMailer::from_config(&config.mail)?;
        Self::with_mailer(document, output_path, config, Arc::new(mailer))
    }

    /// Build a job that mails through `mailer`
    ///
    /// Credentials are still required in `config`, so a job never starts
    /// without them.
    pub fn with_mailer(
        document: InvoiceDocument,
        output_path: impl Into<PathBuf>,
        config: &Config,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self> {
        require_credentials(config)?;

        let output_path = output_path.into();
        validate_output_path(&output_path)?;

        let endpoint = Url::parse(&config.renderer.endpoint).map_err(|e| {
            Error::config(
                "renderer.endpoint",
                format!("invalid endpoint '{}': {}", config.renderer.endpoint, e),
            )
        })?;
        let request = RenderRequest::build(&document, &endpoint)?;

        let client = reqwest::Client::builder()
            .user_agent(config.renderer.user_agent.as_str())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            request,
            output_path,
            client,
            mailer,
            mail: config.mail.clone(),
            dispatch: config.dispatch,
            event_tx,
        })
    }

    /// Subscribe to this job's events
    ///
    /// Only events emitted after subscribing are received, so subscribe
    /// before calling [`send`](Self::send).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Where the rendered invoice will be written
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// The prepared render request
    pub fn request(&self) -> &RenderRequest {
        &self.request
    }

    /// Start the pipeline in the background and return immediately
    ///
    /// Must be called from within a tokio runtime. Failures after this point
    /// are logged and published as events; they never panic the caller.
    pub fn send(self) -> DeliveryHandle {
        DeliveryHandle {
            task: tokio::spawn(self.run()),
        }
    }

    async fn run(self) -> DeliveryOutcome {
        let DeliveryJob {
            request,
            output_path,
            client,
            mailer,
            mail,
            dispatch,
            event_tx,
        } = self;

        let url = request.endpoint.to_string();
        debug!(
            url = %url,
            bytes = request.content_length,
            path = %output_path.display(),
            "requesting invoice render"
        );

        let bytes = match render::render_to_file(&client, request, &output_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(url = %url, error = %e, "invoice render failed");
                let error = e.to_string();
                event_tx
                    .send(Event::RenderFailed {
                        error: error.clone(),
                    })
                    .ok();
                return DeliveryOutcome::RenderFailed { error };
            }
        };

        info!(path = %output_path.display(), bytes, "saved invoice");
        event_tx
            .send(Event::Saved {
                path: output_path.clone(),
                bytes,
            })
            .ok();

        let outgoing = OutgoingMail::from_config(&mail, &output_path);
        match dispatch {
            DispatchMode::Awaited => {
                match dispatch::send_mail(mailer.as_ref(), &outgoing, &event_tx).await {
                    Ok(report) => DeliveryOutcome::Mailed {
                        path: output_path,
                        bytes,
                        report,
                    },
                    Err(e) => DeliveryOutcome::MailFailed {
                        path: output_path,
                        bytes,
                        error: e.to_string(),
                    },
                }
            }
            DispatchMode::Detached => {
                tokio::spawn(async move {
                    // Outcome already logged and published by send_mail
                    let _ = dispatch::send_mail(mailer.as_ref(), &outgoing, &event_tx).await;
                });
                DeliveryOutcome::MailDetached {
                    path: output_path,
                    bytes,
                }
            }
        }
    }
}

/// Handle to a running [`DeliveryJob`]
#[must_use = "call wait() to observe the outcome or detach() to ignore it"]
pub struct DeliveryHandle {
    task: JoinHandle<DeliveryOutcome>,
}

impl DeliveryHandle {
    /// Wait for the pipeline to finish
    ///
    /// # Errors
    ///
    /// Only fails if the pipeline task itself panicked or was aborted.
    pub async fn wait(self) -> Result<DeliveryOutcome> {
        self.task
            .await
            .map_err(|e| Error::Other(format!("delivery task failed: {}", e)))
    }

    /// Let the pipeline run on without waiting for it
    pub fn detach(self) {
        drop(self.task);
    }

    /// Whether the pipeline has finished
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

fn require_credentials(config: &Config) -> Result<()> {
    match &config.mail.credentials {
        Some(_) => Ok(()),
        None => Err(Error::config(
            "mail.credentials",
            format!(
                "mail credentials not set ({} and {} are required)",
                crate::config::USERNAME_VAR,
                crate::config::PASSWORD_VAR
            ),
        )),
    }
}

/// The output path must name a file inside an existing, writable location
fn validate_output_path(path: &Path) -> Result<()> {
    if path.file_name().is_none() {
        return Err(Error::config(
            "output_path",
            format!("'{}' does not name a file", path.display()),
        ));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
        && !parent.is_dir()
    {
        return Err(Error::config(
            "output_path",
            format!("directory '{}' does not exist", parent.display()),
        ));
    }

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(Error::config(
            "output_path",
            format!("'{}' is a directory", path.display()),
        )),
        Ok(meta) if meta.permissions().readonly() => Err(Error::config(
            "output_path",
            format!("'{}' is read-only", path.display()),
        )),
        _ => Ok(()),
    }
}
