//! Render the sample invoice, save it, and email it.
//!
//! Usage: `invoice-mailer [OUTPUT]` (default `invoice.pdf`). SMTP credentials
//! come from `MAILTRAP_USERNAME` and `MAILTRAP_PASSWORD`, optionally via `.env`.

use invoice_mailer::{Config, DeliveryJob, DeliveryOutcome, InvoiceDocument};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT: &str = "invoice.pdf";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // A missing .env file is fine; the variables may already be exported
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        warn!(error = %e, "failed to load .env");
    }

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    let config = Config::from_env();

    let job = match DeliveryJob::new(InvoiceDocument::sample(), output, &config) {
        Ok(job) => job,
        Err(e) => {
            error!(error = %e, "cannot start invoice delivery");
            return ExitCode::FAILURE;
        }
    };

    match job.send().wait().await {
        Ok(DeliveryOutcome::Mailed { path, report, .. }) => {
            info!(path = %path.display(), response = %report.response, "invoice delivered");
        }
        Ok(outcome) => info!(?outcome, "invoice delivery finished"),
        Err(e) => error!(error = %e, "invoice delivery aborted"),
    }

    ExitCode::SUCCESS
}
