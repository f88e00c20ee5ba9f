//! LLM gateway with bounded retry
//!
//! Every model call in the app goes through [`LlmGateway`], which owns the
//! retry policy: up to three attempts with exponential backoff for transient
//! failures (rate limits, timeouts, temporary downtime), immediate surfacing
//! for everything else. The transport behind it is an injected [`ChatApi`]
//! implementation, so tests can script failure sequences.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::types::ChatMessage;

pub mod openai;

pub use openai::OpenAiClient;

/// Total attempts per generate call, counting the first one
pub const MAX_ATTEMPTS: u32 = 3;

/// Attempt timeout used when the caller does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error taxonomy for chat-completion calls
///
/// Transient variants carry the number of attempts made before the error
/// was surfaced, so exhausted retries are distinguishable at the call site.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Provider returned 429; retried with backoff before surfacing
    #[error("Rate limit exceeded after {attempts} attempt(s). Please try again later.")]
    RateLimited { attempts: u32 },

    /// An attempt exceeded its deadline; retried before surfacing
    #[error("Request timed out after {attempts} attempt(s). Please check your connection and try again.")]
    TimedOut { attempts: u32 },

    /// Temporary downtime (502/503/504); retried before surfacing
    #[error("Service unavailable (HTTP {status}) after {attempts} attempt(s). Please try again later.")]
    ServerUnavailable { status: u16, attempts: u32 },

    /// Non-transient API failure; never retried
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Credentials rejected; never retried
    #[error("Authentication error: please check your API key.")]
    AuthFailed,

    /// Anything that could not be classified
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl GatewayError {
    /// Whether another attempt might succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::RateLimited { .. }
                | GatewayError::TimedOut { .. }
                | GatewayError::ServerUnavailable { .. }
        )
    }

    fn with_attempts(self, attempts: u32) -> Self {
        match self {
            GatewayError::RateLimited { .. } => GatewayError::RateLimited { attempts },
            GatewayError::TimedOut { .. } => GatewayError::TimedOut { attempts },
            GatewayError::ServerUnavailable { status, .. } => {
                GatewayError::ServerUnavailable { status, attempts }
            }
            other => other,
        }
    }
}

/// Per-call knobs for a completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Cap on generated tokens; None lets the provider decide
    pub max_tokens: Option<u32>,
    /// Deadline for each individual attempt
    pub timeout: Duration,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_tokens: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Wire-format chat message for OpenAI-compatible endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

impl ApiMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for ApiMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.to_api_string().to_string(),
            content: message.content.clone(),
        }
    }
}

/// Transport seam for chat-completion backends
///
/// Implementations make exactly one attempt per call; the retry policy
/// lives in [`LlmGateway`] and nowhere else.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn chat(
        &self,
        messages: &[ApiMessage],
        options: &GenerateOptions,
    ) -> Result<String, GatewayError>;
}

/// Retrying facade over a [`ChatApi`] transport
#[derive(Clone)]
pub struct LlmGateway {
    api: Arc<dyn ChatApi>,
}

impl LlmGateway {
    /// Gateway over the hosted OpenAI-compatible API
    pub fn new(client: OpenAiClient) -> Self {
        Self {
            api: Arc::new(client),
        }
    }

    /// Gateway over any transport; used by tests and alternative backends
    pub fn with_api(api: Arc<dyn ChatApi>) -> Self {
        Self { api }
    }

    /// Send a conversation to the model and return the trimmed reply text
    ///
    /// Transient failures are retried up to [`MAX_ATTEMPTS`] total attempts,
    /// sleeping 2^i seconds after failed attempt i (1s, then 2s). Everything
    /// else surfaces immediately.
    pub async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &GenerateOptions,
    ) -> Result<String, GatewayError> {
        if messages.is_empty() {
            return Err(GatewayError::Unknown("no messages to send".to_string()));
        }

        let wire: Vec<ApiMessage> = messages.iter().map(ApiMessage::from).collect();

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.api.chat(&wire, options).await {
                Ok(text) => return Ok(text.trim().to_string()),
                Err(e) if e.is_transient() && attempts < MAX_ATTEMPTS => {
                    let delay = Duration::from_secs(1 << (attempts - 1));
                    warn!(
                        "Transient gateway error (attempt {}/{}): {}; retrying in {:?}",
                        attempts, MAX_ATTEMPTS, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_transient() => return Err(e.with_attempts(attempts)),
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    /// Replays a scripted sequence of results and records call times
    struct ScriptedApi {
        replies: Mutex<VecDeque<Result<String, GatewayError>>>,
        calls: AtomicUsize,
        call_times: Mutex<Vec<Instant>>,
    }

    impl ScriptedApi {
        fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                call_times: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatApi for ScriptedApi {
        async fn chat(
            &self,
            _messages: &[ApiMessage],
            _options: &GenerateOptions,
        ) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.call_times.lock().unwrap().push(Instant::now());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Unknown("script exhausted".to_string())))
        }
    }

    fn prompt() -> Vec<ChatMessage> {
        vec![ChatMessage::user("hello")]
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_retried_with_backoff() {
        let api = Arc::new(ScriptedApi::new(vec![
            Err(GatewayError::RateLimited { attempts: 1 }),
            Err(GatewayError::TimedOut { attempts: 1 }),
            Ok("  recovered  ".to_string()),
        ]));
        let gateway = LlmGateway::with_api(api.clone());

        let reply = tokio_test::assert_ok!(
            gateway.generate(&prompt(), &GenerateOptions::default()).await
        );

        assert_eq!(reply, "recovered");
        assert_eq!(api.calls(), 3);

        // Gaps between attempts grow: 1s after the first failure, 2s after the second
        let times = api.call_times.lock().unwrap();
        assert_eq!(times[1] - times[0], Duration::from_secs(1));
        assert_eq!(times[2] - times[1], Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhausts_all_attempts() {
        let api = Arc::new(ScriptedApi::new(vec![
            Err(GatewayError::RateLimited { attempts: 1 }),
            Err(GatewayError::RateLimited { attempts: 1 }),
            Err(GatewayError::RateLimited { attempts: 1 }),
        ]));
        let gateway = LlmGateway::with_api(api.clone());

        let err = tokio_test::assert_err!(
            gateway.generate(&prompt(), &GenerateOptions::default()).await
        );

        assert_eq!(err, GatewayError::RateLimited { attempts: 3 });
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_not_retried() {
        let api = Arc::new(ScriptedApi::new(vec![Err(GatewayError::AuthFailed)]));
        let gateway = LlmGateway::with_api(api.clone());

        let err = gateway
            .generate(&prompt(), &GenerateOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err, GatewayError::AuthFailed);
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_api_error_not_retried() {
        let api = Arc::new(ScriptedApi::new(vec![Err(GatewayError::Api {
            status: 400,
            message: "bad request".to_string(),
        })]));
        let gateway = LlmGateway::with_api(api.clone());

        let err = gateway
            .generate(&prompt(), &GenerateOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Api { status: 400, .. }));
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_message_list_rejected_without_call() {
        let api = Arc::new(ScriptedApi::new(vec![Ok("unused".to_string())]));
        let gateway = LlmGateway::with_api(api.clone());

        let err = gateway
            .generate(&[], &GenerateOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Unknown(_)));
        assert_eq!(api.calls(), 0);
    }

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::RateLimited { attempts: 1 }.is_transient());
        assert!(GatewayError::TimedOut { attempts: 2 }.is_transient());
        assert!(GatewayError::ServerUnavailable { status: 503, attempts: 1 }.is_transient());
        assert!(!GatewayError::AuthFailed.is_transient());
        assert!(!GatewayError::Api { status: 400, message: String::new() }.is_transient());
        assert!(!GatewayError::Unknown("x".to_string()).is_transient());
    }

    #[test]
    fn test_options_builders() {
        let options = GenerateOptions::new()
            .with_max_tokens(150)
            .with_timeout_secs(20);
        assert_eq!(options.max_tokens, Some(150));
        assert_eq!(options.timeout, Duration::from_secs(20));

        let defaults = GenerateOptions::default();
        assert_eq!(defaults.max_tokens, None);
        assert_eq!(defaults.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_error_messages_name_the_failure() {
        let err = GatewayError::RateLimited { attempts: 3 };
        assert!(err.to_string().contains("Rate limit"));
        assert!(err.to_string().contains('3'));
        assert!(GatewayError::AuthFailed.to_string().contains("API key"));
    }
}
