use std::time::Duration;

use reqwest::{redirect::Policy, Client};

use crate::error::SourceError;

const USER_AGENT: &str = concat!("seatmap/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for map documents and the winners feed.
pub(crate) fn client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::limited(10))
        .timeout(timeout)
        .build()
}

/// GET `url` and return the body, mapping every failure to a [`SourceError`].
pub(crate) async fn get_bytes(client: &Client, url: &str, timeout: Duration) -> Result<Vec<u8>, SourceError> {
    let transport = |source: reqwest::Error| {
        if source.is_timeout() {
            SourceError::Timeout { url: url.to_string(), timeout_ms: timeout.as_millis() as u64 }
        } else {
            SourceError::Http { url: url.to_string(), source }
        }
    };

    let resp = client.get(url).send().await.map_err(transport)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::Status { url: url.to_string(), status: status.as_u16() });
    }
    let body = resp.bytes().await.map_err(transport)?;
    Ok(body.to_vec())
}

/// Read a local file into memory.
pub(crate) async fn read_file(path: &std::path::Path) -> Result<Vec<u8>, SourceError> {
    tokio::fs::read(path).await
        .map_err(|source| SourceError::Io { path: path.display().to_string(), source })
}
