use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;
use tracing::{error, info};

use crate::backend::{ByteStream, ChatBackend, StreamFuture};
use crate::config::EndpointConfig;
use crate::error::{ChatError, Result};
use crate::models::wire::{ChatRequest, ErrorBody};

/// HTTP backend talking to the assistant endpoint over reqwest.
pub struct HttpBackend {
    client: Client,
    config: EndpointConfig,
}

impl HttpBackend {
    pub fn new(config: EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

impl ChatBackend for HttpBackend {
    fn stream_chat(&self, request: ChatRequest) -> StreamFuture {
        let url = self.config.url.clone();
        let client = self.client.clone();

        Box::pin(async move { stream_chat_impl(url, client, request).await })
    }

    fn name(&self) -> &str {
        "http"
    }
}

async fn stream_chat_impl(url: String, client: Client, request: ChatRequest) -> Result<ByteStream> {
    let body = serde_json::to_vec(&request)?;
    info!(url = %url, messages = request.messages.len(), "Sending chat request");

    let response = client
        .post(&url)
        .header("Content-Type", "application/json")
        .header("Accept", "text/event-stream")
        .body(body)
        .send()
        .await
        .map_err(|e| ChatError::Transport(format!("Request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let message = extract_error_message(status, response.text().await.ok());
        error!(status = status.as_u16(), message = %message, "Endpoint returned error");
        return Err(ChatError::Http {
            status: status.as_u16(),
            message,
        });
    }

    let stream = response
        .bytes_stream()
        .map(|chunk: reqwest::Result<Bytes>| {
            chunk.map_err(|e| ChatError::Transport(format!("Stream read failed: {}", e)))
        });
    Ok(Box::pin(stream))
}

/// Pull a human-readable message out of an error response body. JSON
/// bodies are checked for `error`, `message`, `details` in that order;
/// plain-text bodies are used as-is; empty bodies fall back to the
/// canonical status reason.
fn extract_error_message(status: reqwest::StatusCode, body: Option<String>) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    };
    let Some(body) = body.filter(|b| !b.trim().is_empty()) else {
        return fallback();
    };
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.into_message().unwrap_or_else(fallback),
        Err(_) => body.trim().to_string(),
    }
}
