//! Rubric score extraction
//!
//! Asks the model for a machine-parseable score line over the fixed rubric
//! and parses it defensively. Any shape violation in the reply yields the
//! all-zero vector; a partial vector is never produced.

use tracing::debug;

use crate::gateway::{GenerateOptions, GatewayError, LlmGateway};
use crate::types::{ChatMessage, Session};

use super::{Criterion, ScoreVector};

/// Instruction demanding the exact single-line reply format
const SCORING_INSTRUCTION: &str = "You are a communication trainer. Evaluate this response or chat session and return only scores out of 10 for: Content, Delivery, Structure, Language skills, Creativity, Communication, Vocabulary, Grammar. Format exactly as 'Content: X/10, Delivery: Y/10, Structure: Z/10, Language skills: W/10, Creativity: V/10, Communication: U/10, Vocabulary: T/10, Grammar: S/10'. Use 0 for criteria not applicable to the activity.";

/// What gets scored: a single written/transcribed response, or a whole session
///
/// Exactly one of the two, by construction.
#[derive(Debug, Clone, Copy)]
pub enum ScoringInput<'a> {
    Response(&'a str),
    History(&'a Session),
}

/// Turns model output into [`ScoreVector`]s via one gateway call
#[derive(Clone)]
pub struct ScoreExtractor {
    gateway: LlmGateway,
}

impl ScoreExtractor {
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    /// Score the input against the fixed rubric
    ///
    /// The gateway call itself can fail; a reply that merely fails to parse
    /// cannot, and comes back as the all-zero vector instead. `activity` is
    /// only used to label diagnostics.
    pub async fn extract(
        &self,
        activity: &str,
        input: ScoringInput<'_>,
    ) -> Result<ScoreVector, GatewayError> {
        let mut messages = vec![ChatMessage::system(SCORING_INSTRUCTION)];
        match input {
            ScoringInput::Response(text) => messages.push(ChatMessage::user(text)),
            ScoringInput::History(session) => messages.extend(session.messages.iter().cloned()),
        }

        let reply = self
            .gateway
            .generate(&messages, &GenerateOptions::default())
            .await?;
        debug!("Raw score reply for {}: {}", activity, reply);

        Ok(parse_score_line(&reply).unwrap_or_else(|| {
            debug!("Unparseable score reply for {}; recording zeros", activity);
            ScoreVector::zeroed()
        }))
    }
}

/// Parse a `Content: X/10, Delivery: Y/10, ...` line
///
/// Requires every criterion exactly once, an integer in 0..=10 before each
/// `/`, and nothing unrecognized. Returns None on any violation.
fn parse_score_line(reply: &str) -> Option<ScoreVector> {
    let mut seen = [false; Criterion::COUNT];
    let mut vector = ScoreVector::zeroed();

    for segment in reply.trim().split(", ") {
        let (key, value) = segment.split_once(": ")?;
        let criterion = Criterion::from_label(key.trim())?;
        if seen[criterion as usize] {
            return None;
        }
        seen[criterion as usize] = true;

        let (numerator, _) = value.split_once('/')?;
        let score: u8 = numerator.trim().parse().ok()?;
        if score > 10 {
            return None;
        }
        vector.set(criterion, score);
    }

    if seen.iter().all(|s| *s) {
        Some(vector)
    } else {
        None
    }
}
