//! Orato - Personal Communication Coach Library
//!
//! A practice-and-feedback coach with:
//! - Chat-completion gateway with bounded retry and typed errors
//! - Conversation practice against fixed personas
//! - Impromptu speaking, storytelling, and conflict resolution drills
//! - Weekly presentation tasks
//! - Eight-criterion scoring recorded to an append-only CSV history
//! - Trend statistics and tailored coaching tips
//!
//! # Example
//!
//! ```ignore
//! use orato::{ChatMessage, Coach, ConversationRole, Session};
//! use orato::{LlmGateway, OpenAiClient, ProgressStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OpenAiClient::new(std::env::var("ORATO_API_KEY")?);
//!     let coach = Coach::new(LlmGateway::new(client), ProgressStore::open_default()?);
//!
//!     let mut session = Session::new();
//!     session.push(ChatMessage::user("Ask me your first interview question."));
//!     let reply = coach
//!         .conversational_reply(ConversationRole::JobInterviewer, &session)
//!         .await?;
//!     println!("{}", reply.text);
//!     Ok(())
//! }
//! ```

// Core modules (order matters for cross-module dependencies)
pub mod types;
pub mod gateway; // Must come before scoring and coach, both call through it
pub mod scoring;
pub mod progress;
pub mod coach;
pub mod speech;
pub mod config;
pub mod credentials;
pub mod cli;

// Re-export commonly used types for convenience
pub use coach::{Activity, Coach, ConversationRole, DrillFeedback, Reply};

pub use gateway::{
    ApiMessage,
    ChatApi,
    GatewayError,
    GenerateOptions,
    LlmGateway,
    OpenAiClient,
};

pub use progress::{
    Advice,
    Module,
    ProgressRecord,
    ProgressStore,
    StoreError,
    TrendAnalyzer,
    TrendSummary,
};

pub use scoring::{Criterion, ScoreExtractor, ScoreVector, ScoringInput};

pub use speech::{
    AudioClip,
    Capture,
    CaptureLimits,
    SpeechCapture,
    SpeechError,
    SpeechSynthesizer,
    Transcription,
};

pub use types::{ChatMessage, Modality, Role, Session};

pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Personal Communication Coach Library", NAME, VERSION)
}
