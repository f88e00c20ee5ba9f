//! Speech capability seams
//!
//! Capture/transcription and synthesis are external capabilities with
//! backend-defined implementations; this module only fixes their contracts.
//! The rest of the app works the same whether a real engine is plugged in
//! or speech is unavailable and practice stays text-only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// How long capture waits for speech to start (seconds)
pub const DEFAULT_LISTEN_SECS: u64 = 5;

/// Longest single utterance accepted (seconds)
pub const DEFAULT_PHRASE_SECS: u64 = 60;

/// Raw audio returned by capture or synthesis; payload format is backend-defined
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Bounds on one capture attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLimits {
    /// Give up waiting for speech to start after this long
    pub max_listen: Duration,
    /// Cut a single utterance off after this long
    pub max_phrase: Duration,
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self {
            max_listen: Duration::from_secs(DEFAULT_LISTEN_SECS),
            max_phrase: Duration::from_secs(DEFAULT_PHRASE_SECS),
        }
    }
}

/// What transcription made of the captured audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    /// Recognized speech
    Text(String),
    /// Audio captured but no speech recognized in it
    Unrecognized,
    /// The transcription backend itself failed
    Failed(String),
}

/// Outcome of one capture: the recorded audio plus its transcription
///
/// The audio is kept even when transcription fails, so callers can replay
/// or retry it.
#[derive(Debug, Clone)]
pub struct Capture {
    pub audio: AudioClip,
    pub transcription: Transcription,
}

/// Errors from speech backends
#[derive(Debug, Error)]
pub enum SpeechError {
    /// No backend configured; practice continues text-only
    #[error("No speech backend available")]
    Unavailable,

    #[error("Speech backend error: {0}")]
    Backend(String),
}

/// Records from a microphone and transcribes the result
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    async fn capture_and_transcribe(&self, limits: &CaptureLimits)
        -> Result<Capture, SpeechError>;
}

/// Synthesizes spoken audio from reply text
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioClip, SpeechError>;
}

/// Stand-in used when no speech backend is configured
pub struct UnsupportedSpeech;

#[async_trait]
impl SpeechCapture for UnsupportedSpeech {
    async fn capture_and_transcribe(
        &self,
        _limits: &CaptureLimits,
    ) -> Result<Capture, SpeechError> {
        Err(SpeechError::Unavailable)
    }
}

#[async_trait]
impl SpeechSynthesizer for UnsupportedSpeech {
    async fn synthesize(&self, _text: &str) -> Result<AudioClip, SpeechError> {
        Err(SpeechError::Unavailable)
    }
}
