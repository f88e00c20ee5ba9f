//! Feedback generation for every practice module
//!
//! [`Coach`] owns the two-call flow shared by all exercises: one model call
//! produces the prose feedback the user reads, a second scores the same
//! input against the fixed rubric for the progress store. The scoring pass
//! is strictly best-effort; its failures are logged and never reach the
//! user or block the feedback text.

use std::sync::Arc;
use tracing::debug;

use crate::gateway::LlmGateway;
use crate::progress::{Advice, Module, ProgressRecord, ProgressStore, TrendAnalyzer};
use crate::scoring::{ScoreExtractor, ScoringInput};
use crate::speech::{AudioClip, SpeechSynthesizer};

pub mod drill;
pub mod presentation;
pub mod session;

pub use drill::{Activity, DrillFeedback};
pub use presentation::{weekly_task, WEEKLY_TASKS};
pub use session::ConversationRole;

/// A conversational turn from the practice partner
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    /// Spoken rendition; None when synthesis is unavailable or failed
    pub audio: Option<AudioClip>,
}

/// Generates feedback, replies, and practice prompts for all modules
#[derive(Clone)]
pub struct Coach {
    gateway: LlmGateway,
    extractor: ScoreExtractor,
    store: ProgressStore,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

impl Coach {
    pub fn new(gateway: LlmGateway, store: ProgressStore) -> Self {
        Self {
            extractor: ScoreExtractor::new(gateway.clone()),
            gateway,
            store,
            synthesizer: None,
        }
    }

    /// Attach a speech backend for spoken replies
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub(crate) fn gateway(&self) -> &LlmGateway {
        &self.gateway
    }

    /// Read stored history and generate trend-based coaching tips
    ///
    /// A missing store becomes [`Advice::NoHistory`] without any model
    /// call; other store errors do surface.
    pub async fn trend_advice(&self) -> anyhow::Result<Advice> {
        let history = self.store.read_all_or_empty()?;
        let analyzer = TrendAnalyzer::new(self.gateway.clone());
        Ok(analyzer.advice(&history).await?)
    }

    /// Score the input and append a dated progress row
    async fn record_scores(&self, module: Module, input: ScoringInput<'_>) -> anyhow::Result<()> {
        let scores = self.extractor.extract(module.label(), input).await?;
        let record = ProgressRecord::today(module, scores);
        self.store.append(&record)?;
        Ok(())
    }

    /// Best-effort scoring pass; failures are logged at debug and dropped
    pub(crate) async fn record_scores_best_effort(&self, module: Module, input: ScoringInput<'_>) {
        if let Err(e) = self.record_scores(module, input).await {
            debug!("Score recording for {} skipped: {:#}", module, e);
        }
    }
}
