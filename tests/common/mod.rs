//! Common test utilities for invoice-mailer integration tests

use async_trait::async_trait;
use invoice_mailer::{Config, Event, MailCredentials, Mailer, OutgoingMail, SendReport};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;

/// Mailer that keeps every message and the attachment bytes it saw
pub struct MemoryMailer {
    report: SendReport,
    sent: Mutex<Vec<(OutgoingMail, Vec<u8>)>>,
}

impl MemoryMailer {
    /// Answers every send with `report`
    pub fn new(report: SendReport) -> Self {
        Self {
            report,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Accepts `recipient`
    pub fn accepting(recipient: &str) -> Self {
        Self::new(SendReport {
            accepted: vec![recipient.to_string()],
            rejected: Vec::new(),
            response: "250 Message accepted".to_string(),
        })
    }

    /// Messages sent so far
    pub fn sent(&self) -> Vec<(OutgoingMail, Vec<u8>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: &OutgoingMail) -> invoice_mailer::Result<SendReport> {
        let bytes = tokio::fs::read(&mail.attachment).await?;
        self.sent.lock().unwrap().push((mail.clone(), bytes));
        Ok(self.report.clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Config for a renderer at `endpoint` with dummy credentials
pub fn config_for(endpoint: &str) -> Config {
    let mut config = Config::default();
    config.renderer.endpoint = endpoint.to_string();
    config.mail.credentials = Some(MailCredentials::new("user", "secret"));
    config
}

/// Collect events until `stop_predicate` matches or `timeout` elapses
pub async fn collect_events_until<F>(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
    stop_predicate: F,
) -> Vec<Event>
where
    F: Fn(&Event) -> bool,
{
    let mut collected = Vec::new();

    let _ = tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            let should_stop = stop_predicate(&event);
            collected.push(event);
            if should_stop {
                break;
            }
        }
    })
    .await;

    collected
}
