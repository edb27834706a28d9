//! Shared test helpers for pipeline tests.

use crate::config::{Config, MailCredentials};
use crate::error::MailError;
use crate::mailer::{Mailer, OutgoingMail, SendReport};
use crate::types::Event;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Notify, broadcast};
use tracing_subscriber::fmt::MakeWriter;

enum Reply {
    Report(SendReport),
    Fail(String),
}

/// In-memory mailer that records what it was asked to send
///
/// The attachment is read at the moment `send` is called, so tests can check
/// that the file was complete by then.
pub(crate) struct RecordingMailer {
    reply: Reply,
    gate: Option<Notify>,
    calls: Mutex<Vec<(OutgoingMail, Option<Vec<u8>>)>>,
}

impl RecordingMailer {
    /// Accepts every recipient
    pub(crate) fn accepting() -> Self {
        Self::replying(SendReport {
            accepted: vec!["sample@me.com".to_string()],
            rejected: Vec::new(),
            response: "250 2.0.0 Ok: queued as 1234".to_string(),
        })
    }

    /// Answers with `report`
    pub(crate) fn replying(report: SendReport) -> Self {
        Self {
            reply: Reply::Report(report),
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails with an SMTP error carrying `message`
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            reply: Reply::Fail(message.to_string()),
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Holds every answer until [`release`](Self::release) is called
    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    /// Let a gated send complete
    pub(crate) fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Messages sent so far with the attachment bytes seen at send time
    pub(crate) fn calls(&self) -> Vec<(OutgoingMail, Option<Vec<u8>>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> crate::Result<SendReport> {
        let attachment = tokio::fs::read(&mail.attachment).await.ok();
        self.calls.lock().unwrap().push((mail.clone(), attachment));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match &self.reply {
            Reply::Report(report) => Ok(report.clone()),
            Reply::Fail(message) => Err(MailError::Smtp(message.clone()).into()),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Config pointing at `endpoint` with dummy credentials
pub(crate) fn test_config(endpoint: &str) -> Config {
    let mut config = Config::default();
    config.renderer.endpoint = endpoint.to_string();
    config.mail.credentials = Some(MailCredentials::new("user", "secret"));
    config
}

/// Every event currently buffered in `rx`
pub(crate) fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Serve one response that declares `declared` body bytes, sends `sent`, then
/// closes the connection
///
/// Returns the endpoint URL.
pub(crate) async fn truncated_body_server(declared: usize, sent: &[u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let sent = sent.to_vec();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request(&mut stream).await;

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: {declared}\r\n\r\n"
        );
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(&sent).await.unwrap();
        stream.flush().await.unwrap();
    });

    format!("http://{addr}/")
}

/// Consume one request, headers and body
async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                return;
            }
        }
    }
}

/// Log output collected by [`capture_logs`]
#[derive(Clone, Default)]
pub(crate) struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route this thread's `tracing` output into a buffer until the guard drops
pub(crate) fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
