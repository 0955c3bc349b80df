/// Remote photo fetching module
///
/// This module handles:
/// - Querying the paginated random-photo listing (listing.rs)
/// - Downloading and decoding grid thumbnails (thumbnail.rs)

pub mod listing;
pub mod thumbnail;

use std::time::Duration;

use thiserror::Error;

/// What went wrong while talking to the photo service.
///
/// These travel inside UI messages, so they are `Clone` and carry
/// rendered detail strings instead of live source errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network failure, timeout, or a non-2xx status
    #[error("download failed for {url}: {detail}")]
    Transport { url: String, detail: String },

    /// Bytes arrived but could not be decoded or parsed
    #[error("unreadable data from {url}")]
    DataFormat { url: String },
}

impl FetchError {
    fn transport(url: &str, err: reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            detail: err.to_string(),
        }
    }
}

/// Download a URL's body with a bounded timeout.
///
/// Non-2xx statuses count as transport failures just like timeouts and
/// connection errors.
pub(crate) async fn download_bytes(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| FetchError::transport(url, e))?
        .error_for_status()
        .map_err(|e| FetchError::transport(url, e))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::transport(url, e))?;

    Ok(bytes.to_vec())
}
