//! Weekly presentation tasks and critique

use crate::gateway::{GatewayError, GenerateOptions};
use crate::progress::Module;
use crate::scoring::ScoringInput;
use crate::types::ChatMessage;

use super::Coach;

const FEEDBACK_MAX_TOKENS: u32 = 400;
const FEEDBACK_TIMEOUT_SECS: u64 = 10;

/// Rubric for judging a prepared presentation against its task
const PRESENTATION_RUBRIC: &str = "You are a communication trainer evaluating a student's presentation. Provide genuine, candid feedback based on: 1. Structure: Is there a clear intro, body, and conclusion? 2. Delivery: Assess pacing, tone, and clarity (for voice, infer from transcribed text). 3. Content: Evaluate persuasiveness, vocabulary, and relevance. Do not be neutral—highlight strengths and weaknesses. Return a structured report with scores out of 10 for each category and specific suggestions for improvement.";

/// The rotating catalog of weekly presentation tasks
pub const WEEKLY_TASKS: [&str; 10] = [
    "Deliver a 2-minute self-introduction highlighting your strengths and goals.",
    "Present a project you’ve worked on, explaining its purpose and impact.",
    "Pitch a product or service idea to a potential investor in 2 minutes.",
    "Explain a complex concept (e.g., AI, climate change) in simple terms.",
    "Share a personal success story and what you learned from it.",
    "Argue for or against a controversial topic (e.g., remote work benefits).",
    "Describe your vision for the future of your industry or field.",
    "Teach a skill or hobby you’re passionate about in a clear manner.",
    "Propose a solution to a common workplace problem.",
    "Give a motivational speech to inspire a team or audience.",
];

/// Task for a 1-based week number; None past the end of the catalog
pub fn weekly_task(week: usize) -> Option<&'static str> {
    if week == 0 {
        return None;
    }
    WEEKLY_TASKS.get(week - 1).copied()
}

impl Coach {
    /// Critique a presentation response against its weekly task
    ///
    /// On success a scoring pass runs against the raw response and a
    /// Presentation row is appended, best-effort.
    pub async fn presentation_feedback(
        &self,
        response: &str,
        task: &str,
    ) -> Result<String, GatewayError> {
        let messages = vec![
            ChatMessage::system(PRESENTATION_RUBRIC),
            ChatMessage::user(format!("Task: {}\nResponse: {}", task, response)),
        ];

        let options = GenerateOptions::new()
            .with_max_tokens(FEEDBACK_MAX_TOKENS)
            .with_timeout_secs(FEEDBACK_TIMEOUT_SECS);
        let feedback = self.gateway().generate(&messages, &options).await?;

        self.record_scores_best_effort(Module::Presentation, ScoringInput::Response(response))
            .await;

        Ok(feedback)
    }
}
