//! Outbound request for the rendering service

use crate::error::{Error, Result};
use crate::invoice::InvoiceDocument;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

/// Content type of the request body
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A fully prepared POST to the rendering service
///
/// The body is serialized once, up front; `content_length` is always its exact
/// byte length.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    /// Where to POST
    pub endpoint: Url,
    /// Value of the `Content-Type` header
    pub content_type: &'static str,
    /// Value of the `Content-Length` header
    pub content_length: usize,
    /// Serialized [`InvoiceDocument`]
    pub body: Vec<u8>,
}

impl RenderRequest {
    /// Serialize `document` into a request for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInvoice`] if a number in `document` is NaN or
    /// infinite.
    pub fn build(document: &InvoiceDocument, endpoint: &Url) -> Result<Self> {
        if let Some(field) = document.non_finite_field() {
            return Err(Error::InvalidInvoice { field });
        }
        let body = serde_json::to_vec(document)?;

        Ok(Self {
            endpoint: endpoint.clone(),
            content_type: JSON_CONTENT_TYPE,
            content_length: body.len(),
            body,
        })
    }

    /// Headers describing the body
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(self.content_length));
        headers
    }
}
