//! Image download and data-URI re-encoding.
//!
//! Emoji and icon payloads are submitted to the platform as `data:` URIs.
//! The fetcher downloads the image bytes, takes the MIME type from the
//! response's `Content-Type` header (defaulting to `image/png` when absent),
//! and assembles the URI. Timeouts are classified separately from connection
//! failures so the retry layer can tell them apart.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::header::CONTENT_TYPE;

use crate::platform::error::PlatformError;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_MIME_TYPE: &str = "image/png";

/// Source of image payloads for emoji and icon cloning.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetches `url` and returns its content as a `data:` URI.
    async fn fetch_data_uri(&self, url: &str) -> Result<String, PlatformError>;
}

/// [`ImageSource`] backed by an HTTP client with a request deadline.
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch_data_uri(&self, url: &str) -> Result<String, PlatformError> {
        let response = self.client.get(url).send().await.map_err(map_fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::Http {
                status: status.as_u16(),
            });
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        let bytes = response.bytes().await.map_err(map_fetch_error)?;

        Ok(encode_data_uri(&mime_type, &bytes))
    }
}

/// Assembles a `data:` URI from a MIME type and raw bytes.
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

fn map_fetch_error(err: reqwest::Error) -> PlatformError {
    if err.is_timeout() {
        PlatformError::Timeout
    } else if err.is_connect() {
        PlatformError::ConnectionReset
    } else {
        PlatformError::Api(err.to_string())
    }
}
