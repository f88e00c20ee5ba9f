//! OpenAI-compatible chat-completion transport

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::{ApiMessage, ChatApi, GatewayError, GenerateOptions};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Client for OpenAI-compatible `/chat/completions` endpoints
#[derive(Clone)]
pub struct OpenAiClient {
    client: Arc<Client>,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ApiMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_BASE_URL, DEFAULT_MODEL)
    }

    /// Client against a custom base URL and model (any OpenAI-compatible provider)
    pub fn with_endpoint(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Map an HTTP error status to the gateway taxonomy
fn classify_status(status: u16, body: &str) -> GatewayError {
    match status {
        401 | 403 => GatewayError::AuthFailed,
        429 => GatewayError::RateLimited { attempts: 1 },
        502 | 503 | 504 => GatewayError::ServerUnavailable { status, attempts: 1 },
        _ => GatewayError::Api {
            status,
            message: truncate_body(body),
        },
    }
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::TimedOut { attempts: 1 }
    } else {
        GatewayError::Unknown(e.to_string())
    }
}

/// Keep error bodies short enough for logs and error messages
fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    }
}

#[async_trait]
impl ChatApi for OpenAiClient {
    async fn chat(
        &self,
        messages: &[ApiMessage],
        options: &GenerateOptions,
    ) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: options.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(options.timeout)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Chat API returned {}: {}", status, truncate_body(&body));
            return Err(classify_status(status.as_u16(), &body));
        }

        let body = response.text().await.map_err(map_transport_error)?;
        let raw: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Unknown(format!("invalid JSON from provider: {}", e)))?;

        // Content arrives either as a plain string or as an array of typed parts
        let content_value = raw
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"));

        let content = match content_value {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Array(parts)) => parts
                .iter()
                .filter_map(|part| {
                    if part.get("type").and_then(|t| t.as_str()) == Some("text") {
                        part.get("text").and_then(|t| t.as_str()).map(str::to_string)
                    } else {
                        None
                    }
                })
                .collect::<Vec<_>>()
                .join(""),
            _ => {
                return Err(GatewayError::Unknown(
                    "provider response had no message content".to_string(),
                ))
            }
        };

        Ok(content)
    }
}
