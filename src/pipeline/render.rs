//! Render stage: POST the invoice and stream the PDF to disk.

use crate::error::{Result, TransportError};
use crate::request::RenderRequest;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Stream the rendered invoice into `path`, returning the bytes written
///
/// The file is created before the request goes out and each response chunk is
/// written before the next one is read. On success the file is flushed and
/// closed before this returns. On failure a file this call created is removed.
pub(super) async fn render_to_file(
    client: &reqwest::Client,
    request: RenderRequest,
    path: &Path,
) -> Result<u64> {
    let file = File::create(path).await?;
    render_into(client, request, path, file).await
}

/// Stream into `sink`, removing `path` if anything fails, flush included
async fn render_into<W>(
    client: &reqwest::Client,
    request: RenderRequest,
    path: &Path,
    sink: W,
) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let result = stream_into(client, request, sink).await;

    if result.is_err() {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %remove_err, "failed to remove partial invoice");
        } else {
            debug!(path = %path.display(), "removed partial invoice");
        }
    }
    result
}

async fn stream_into<W>(client: &reqwest::Client, request: RenderRequest, mut sink: W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let url = request.endpoint.to_string();
    let headers = request.headers();

    let mut response = client
        .post(request.endpoint)
        .headers(headers)
        .body(request.body)
        .send()
        .await
        .map_err(|source| TransportError::Request {
            url: url.clone(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(TransportError::Status {
            status: response.status().as_u16(),
            url,
        }
        .into());
    }

    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| TransportError::Body {
            url: url.clone(),
            source,
        })?
    {
        sink.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    // Deferred write errors on tokio files only surface here
    sink.flush().await?;
    drop(sink);

    debug!(url = %url, bytes = written, "render response complete");
    Ok(written)
}
