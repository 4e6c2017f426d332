//! Blocking HTTP(S) fetch for URL image references.

use super::reader::ReadError;
use std::time::Duration;

/// GET `url` and return the response body.
///
/// Non-success statuses are errors. With `timeout` set to `None` a stalled
/// server blocks the call indefinitely.
pub(crate) fn fetch(url: &str, timeout: Option<Duration>) -> Result<Vec<u8>, ReadError> {
    let transport = |source: reqwest::Error| ReadError::Transport {
        url: url.to_string(),
        source,
    };

    log::debug!("fetching {url}");
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("image-comparison/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(transport)?;
    let bytes = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.bytes())
        .map_err(transport)?;
    log::debug!("fetched {} bytes from {url}", bytes.len());
    Ok(bytes.to_vec())
}
