//! Shared HTTP helpers for the REST adapters.

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Non-success reply from one of the REST services.
#[derive(Debug, Error)]
#[error("{service}: HTTP {status}: {message}")]
pub struct ApiError {
    pub service: &'static str,
    pub status: StatusCode,
    pub message: String,
}

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

/// Passes successful responses through; turns anything else into an error carrying
/// the API's own message when the body has one.
pub async fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    Err(ApiError {
        service,
        status,
        message: error_message(&error_text).unwrap_or(error_text),
    }
    .into())
}

/// Pulls `message` (Discord style) or `error.message` out of a JSON error body.
pub fn error_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    json.get("message")
        .or_else(|| json.get("error").and_then(|e| e.get("message")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
