//! Media plumbing shared by the acquisition channels, the generation
//! workflow and the output actions.
//!
//! * [`data_url`]: `data:` URL encode/decode plus MIME sniffing (`infer`).
//! * [`payload`]: platform-neutral file, drop and clipboard payloads.
//! * [`fetch_bytes`] / [`fetch_as_data_url`]: download a remote image.

pub mod data_url;
pub mod payload;

pub use data_url::{is_data_url, DecodedDataUrl};
pub use payload::{ClipboardItem, ClipboardPayload, DropPayload, FileContent, FileItem};

use thiserror::Error;

// ---------------------------------------------------------------------------
// MediaError
// ---------------------------------------------------------------------------

/// Errors raised while reading, decoding or fetching image data.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Local file could not be read.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The string is not a well-formed `data:` URL.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// The base64 payload of a data URL is corrupt.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Remote download failed (transport or non-success status).
    #[error("failed to fetch remote image: {0}")]
    Fetch(String),
}

impl From<reqwest::Error> for MediaError {
    fn from(e: reqwest::Error) -> Self {
        MediaError::Fetch(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Remote fetch
// ---------------------------------------------------------------------------

/// Download `url`, returning the body and the server-declared content type.
pub async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
) -> Result<(Vec<u8>, Option<String>), MediaError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(MediaError::Fetch(format!("HTTP {status} for {url}")));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

    let bytes = response.bytes().await?;
    Ok((bytes.to_vec(), content_type))
}

/// Download `url` and inline it as a data URL.
pub async fn fetch_as_data_url(client: &reqwest::Client, url: &str) -> Result<String, MediaError> {
    let (bytes, content_type) = fetch_bytes(client, url).await?;
    log::debug!("media: fetched {} bytes from remote source", bytes.len());
    Ok(data_url::encode_with_mime(&bytes, content_type.as_deref()))
}
