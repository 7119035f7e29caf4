//! Shared reqwest plumbing for the source adapters.

use crate::SourceError;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("researcher-rs/", env!("CARGO_PKG_VERSION"));
const BODY_PREVIEW_CHARS: usize = 200;

pub(crate) fn build_client(timeout: Duration) -> Result<Client, SourceError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| SourceError::Transport(format!("failed to build HTTP client: {err}")))
}

/// Send a request and return its status and raw body.
pub(crate) async fn fetch(request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), SourceError> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    Ok((status, body.to_vec()))
}

/// Send a request and decode a successful JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, SourceError> {
    let (status, body) = fetch(request).await?;
    if !status.is_success() {
        return Err(status_error(status, &body));
    }
    decode(&body)
}

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, SourceError> {
    serde_json::from_slice(body).map_err(|err| SourceError::Decode(err.to_string()))
}

pub(crate) fn status_error(status: StatusCode, body: &[u8]) -> SourceError {
    if matches!(
        status,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT
    ) {
        return SourceError::Timeout(format!("status {}", status.as_u16()));
    }
    SourceError::Status {
        status: status.as_u16(),
        body: body_preview(body),
    }
}

fn map_transport_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout(err.to_string())
    } else {
        SourceError::Transport(err.to_string())
    }
}

fn body_preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .trim()
        .chars()
        .take(BODY_PREVIEW_CHARS)
        .collect()
}
