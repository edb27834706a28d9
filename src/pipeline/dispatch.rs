//! Email stage: attach the saved invoice and report the transport's answer.

use crate::error::Result;
use crate::mailer::{Mailer, OutgoingMail, SendReport};
use crate::types::Event;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Send `mail` and report the outcome
///
/// Transport errors are logged and published here; the caller only decides
/// what to put in the outcome and never propagates them further.
pub(super) async fn send_mail(
    mailer: &dyn Mailer,
    mail: &OutgoingMail,
    event_tx: &broadcast::Sender<Event>,
) -> Result<SendReport> {
    match mailer.send(mail).await {
        Ok(report) => {
            report_delivery(&report, event_tx);
            Ok(report)
        }
        Err(e) => {
            error!(mailer = mailer.name(), error = %e, "error sending email");
            event_tx
                .send(Event::MailFailed {
                    error: e.to_string(),
                })
                .ok();
            Err(e)
        }
    }
}

/// Log and publish accepted and rejected recipients independently
pub(super) fn report_delivery(report: &SendReport, event_tx: &broadcast::Sender<Event>) {
    if !report.accepted.is_empty() {
        info!(
            recipients = ?report.accepted,
            response = %report.response,
            "email sent"
        );
        event_tx
            .send(Event::MailAccepted {
                recipients: report.accepted.clone(),
                response: report.response.clone(),
            })
            .ok();
    }

    if !report.rejected.is_empty() {
        error!(
            recipients = ?report.rejected,
            response = %report.response,
            "email not sent"
        );
        event_tx
            .send(Event::MailRejected {
                recipients: report.rejected.clone(),
                response: report.response.clone(),
            })
            .ok();
    }
}
