//! Skill drills: generated prompts, judged responses, next prompt queued

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::gateway::{GatewayError, GenerateOptions};
use crate::progress::Module;
use crate::scoring::ScoringInput;
use crate::types::ChatMessage;

use super::Coach;

const FEEDBACK_MAX_TOKENS: u32 = 300;
const FEEDBACK_TIMEOUT_SECS: u64 = 10;
const PROMPT_TIMEOUT_SECS: u64 = 10;

/// Shared preamble for drill prompt generation
const PROMPT_BASE: &str = "You are a communication trainer tasked with giving students random topics or scenarios to describe, allowing analysis of their communication, creativity, and language skills. ";

/// A skill-training drill type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Activity {
    ImpromptuSpeaking,
    Storytelling,
    ConflictResolution,
}

impl Activity {
    pub fn label(&self) -> &'static str {
        match self {
            Activity::ImpromptuSpeaking => "Impromptu Speaking",
            Activity::Storytelling => "Storytelling",
            Activity::ConflictResolution => "Conflict Resolution",
        }
    }

    /// What the generated prompt is called when shown to the user
    pub fn prompt_noun(&self) -> &'static str {
        match self {
            Activity::ImpromptuSpeaking => "Topic",
            Activity::Storytelling => "Prompt",
            Activity::ConflictResolution => "Scenario",
        }
    }

    /// Instruction for generating a fresh practice prompt
    fn generation_instruction(&self) -> String {
        let specific = match self {
            Activity::ImpromptuSpeaking => {
                "Generate a concise, thought-provoking topic (15 words max) for an impromptu speech. Examples: 'How technology shapes human connection,' 'The role of art in a digital world.'"
            }
            Activity::Storytelling => {
                "Suggest a vivid, unique scenario (under 20 words) for a short personal story. Examples: 'How you befriended a stranger on a train,' 'A risky decision that paid off.'"
            }
            Activity::ConflictResolution => {
                "Create a realistic workplace disagreement scenario (15-20 words) for conflict resolution practice. Examples: 'A teammate blames you for a failed project,' 'Your boss rejects your idea without reason.'"
            }
        };
        format!("{}{}", PROMPT_BASE, specific)
    }

    /// Rubric for judging a drill response
    fn rubric(&self) -> String {
        format!(
            "You are a communication trainer evaluating a student's {} response. Provide genuine, candid feedback based on: 1. Communication: How effectively is the message conveyed? 2. Creativity: Is the response original and imaginative? 3. Language Skills: Assess vocabulary, grammar, and fluency. Do not be neutral—highlight strengths and weaknesses. Return a structured report with scores out of 10 for each category and specific suggestions for improvement.",
            self.label().to_lowercase()
        )
    }
}

impl From<Activity> for Module {
    fn from(activity: Activity) -> Self {
        match activity {
            Activity::ImpromptuSpeaking => Module::ImpromptuSpeaking,
            Activity::Storytelling => Module::Storytelling,
            Activity::ConflictResolution => Module::ConflictResolution,
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Feedback for one drill round plus the prompt for the next one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillFeedback {
    pub feedback: String,
    /// Fresh practice prompt; None means generation failed and the
    /// previous prompt stays active
    pub next_prompt: Option<String>,
}

impl Coach {
    /// Generate a fresh practice prompt for a drill
    pub async fn practice_prompt(&self, activity: Activity) -> Result<String, GatewayError> {
        let messages = vec![
            ChatMessage::system("You are a communication trainer."),
            ChatMessage::user(activity.generation_instruction()),
        ];
        let options = GenerateOptions::new().with_timeout_secs(PROMPT_TIMEOUT_SECS);
        self.gateway().generate(&messages, &options).await
    }

    /// Judge a drill response against the prompt it answered
    ///
    /// On success a scoring pass appends a row for the drill's module and a
    /// replacement prompt is generated, both best-effort. A failed prompt
    /// generation comes back as `next_prompt: None` so the caller knows the
    /// previous prompt remains active.
    pub async fn drill_feedback(
        &self,
        response: &str,
        activity: Activity,
        current_prompt: &str,
    ) -> Result<DrillFeedback, GatewayError> {
        let messages = vec![
            ChatMessage::system(activity.rubric()),
            ChatMessage::user(format!(
                "Prompt/Scenario: {}\nResponse: {}",
                current_prompt, response
            )),
        ];

        let options = GenerateOptions::new()
            .with_max_tokens(FEEDBACK_MAX_TOKENS)
            .with_timeout_secs(FEEDBACK_TIMEOUT_SECS);
        let feedback = self.gateway().generate(&messages, &options).await?;

        self.record_scores_best_effort(activity.into(), ScoringInput::Response(response))
            .await;

        let next_prompt = match self.practice_prompt(activity).await {
            Ok(prompt) => Some(prompt),
            Err(e) => {
                warn!("Next {} prompt generation failed: {}", activity, e);
                None
            }
        };

        Ok(DrillFeedback {
            feedback,
            next_prompt,
        })
    }
}
