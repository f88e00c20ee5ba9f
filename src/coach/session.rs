//! Open conversation practice with a persona, plus whole-session feedback

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::gateway::{GatewayError, GenerateOptions};
use crate::progress::Module;
use crate::scoring::ScoringInput;
use crate::types::{ChatMessage, Session};

use super::{Coach, Reply};

const REPLY_MAX_TOKENS: u32 = 150;
const REPLY_TIMEOUT_SECS: u64 = 20;
const FEEDBACK_MAX_TOKENS: u32 = 300;
const FEEDBACK_TIMEOUT_SECS: u64 = 10;

/// Rubric for judging a whole chat session
const SESSION_RUBRIC: &str = "You are a communication trainer evaluating a student's chat session. Provide genuine, candid feedback based on: 1. Grammar: Assess correctness and sentence structure. 2. Vocabulary: Evaluate word choice and variety. Do not be neutral—highlight strengths and weaknesses. Return a structured report with scores out of 10 for each category and specific suggestions for improvement.";

/// Persona the user talks with during open practice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ConversationRole {
    JobInterviewer,
    DebateOpponent,
    CasualFriend,
}

impl ConversationRole {
    pub fn label(&self) -> &'static str {
        match self {
            ConversationRole::JobInterviewer => "Job Interviewer",
            ConversationRole::DebateOpponent => "Debate Opponent",
            ConversationRole::CasualFriend => "Casual Friend",
        }
    }

    /// System prompt that sets the persona
    pub fn system_prompt(&self) -> &'static str {
        match self {
            ConversationRole::JobInterviewer => {
                "You are a professional job interviewer. Ask relevant questions and evaluate the user's responses critically."
            }
            ConversationRole::DebateOpponent => {
                "You are a debate opponent. Challenge the user's arguments and provide counterpoints."
            }
            ConversationRole::CasualFriend => {
                "You are a friendly and casual conversational partner. Keep the conversation light, engaging, and fun."
            }
        }
    }
}

impl std::fmt::Display for ConversationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Coach {
    /// Generate the persona's next turn in an open practice conversation
    ///
    /// The reply is synthesized to audio when a speech backend is attached;
    /// synthesis failure degrades to a text-only reply with a warning.
    pub async fn conversational_reply(
        &self,
        role: ConversationRole,
        session: &Session,
    ) -> Result<Reply, GatewayError> {
        let mut messages = vec![ChatMessage::system(role.system_prompt())];
        messages.extend(session.messages.iter().cloned());

        let options = GenerateOptions::new()
            .with_max_tokens(REPLY_MAX_TOKENS)
            .with_timeout_secs(REPLY_TIMEOUT_SECS);
        let text = self.gateway().generate(&messages, &options).await?;

        let audio = match &self.synthesizer {
            Some(synthesizer) => match synthesizer.synthesize(&text).await {
                Ok(clip) => Some(clip),
                Err(e) => {
                    warn!("Reply synthesis failed, returning text only: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Reply { text, audio })
    }

    /// Judge a whole practice session on grammar and vocabulary
    ///
    /// On success a scoring pass runs against the same transcript and a
    /// Daily Practice row is appended, best-effort.
    pub async fn session_feedback(&self, session: &Session) -> Result<String, GatewayError> {
        let mut messages = vec![ChatMessage::system(SESSION_RUBRIC)];
        messages.extend(session.messages.iter().cloned());

        let options = GenerateOptions::new()
            .with_max_tokens(FEEDBACK_MAX_TOKENS)
            .with_timeout_secs(FEEDBACK_TIMEOUT_SECS);
        let feedback = self.gateway().generate(&messages, &options).await?;

        self.record_scores_best_effort(Module::DailyPractice, ScoringInput::History(session))
            .await;

        Ok(feedback)
    }
}
