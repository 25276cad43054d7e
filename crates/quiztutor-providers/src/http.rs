//! Request plumbing shared by the HTTP providers.

use std::time::Duration;

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;

pub(crate) fn build_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

/// Send a request and turn transport failures and error statuses into
/// [`ProviderError`]s.
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    timeout_secs: u64,
) -> Result<reqwest::Response, ProviderError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ProviderError::Timeout(timeout_secs)
        } else {
            ProviderError::NetworkError(e.to_string())
        }
    })?;

    let status = response.status().as_u16();
    if status >= 400 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(status, body, retry_after));
    }

    Ok(response)
}

pub(crate) async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    response.json().await.map_err(|e| ProviderError::ApiError {
        status: 0,
        message: format!("failed to parse response: {e}"),
    })
}
