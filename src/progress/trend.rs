//! Trend aggregation and coaching advice over progress history
//!
//! Groups stored rows into per-day averages, measures how those averages
//! move day over day, and feeds the summary into one model call that asks
//! for three improvement tips.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

use crate::gateway::{GatewayError, GenerateOptions, LlmGateway};
use crate::scoring::Criterion;
use crate::types::ChatMessage;

use super::ProgressRecord;

/// How many most-recent records feed the per-criterion averages
pub const RECENT_WINDOW: usize = 5;

const ADVICE_MAX_TOKENS: u32 = 150;
const ADVICE_TIMEOUT_SECS: u64 = 10;

/// Aggregate statistics over progress history
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummary {
    /// Mean of all criterion values per practice day, dates ascending
    pub daily_average: Vec<(NaiveDate, f64)>,
    /// Mean day-over-day change of the daily averages; 0.0 with fewer than two days
    pub average_daily_delta: f64,
    /// Per-criterion means over the last [`RECENT_WINDOW`] records in insertion order
    pub recent_averages: [(Criterion, f64); Criterion::COUNT],
}

impl TrendSummary {
    /// Compute from history; None when there is nothing to aggregate
    pub fn from_history(records: &[ProgressRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        // Group every criterion value by calendar day; BTreeMap keeps dates ascending
        let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for record in records {
            let values = by_date.entry(record.date).or_default();
            values.extend(record.scores.iter().map(|(_, v)| f64::from(v)));
        }

        let daily_average: Vec<(NaiveDate, f64)> = by_date
            .into_iter()
            .map(|(date, values)| {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                (date, mean)
            })
            .collect();

        let average_daily_delta = if daily_average.len() < 2 {
            0.0
        } else {
            let deltas: Vec<f64> = daily_average
                .windows(2)
                .map(|pair| pair[1].1 - pair[0].1)
                .collect();
            deltas.iter().sum::<f64>() / deltas.len() as f64
        };

        // The window is over records as appended, not over calendar days
        let recent = &records[records.len().saturating_sub(RECENT_WINDOW)..];
        let mut recent_averages = [(Criterion::Content, 0.0); Criterion::COUNT];
        for (slot, criterion) in recent_averages.iter_mut().zip(Criterion::ALL) {
            let sum: u32 = recent
                .iter()
                .map(|r| u32::from(r.scores.get(criterion)))
                .sum();
            *slot = (criterion, f64::from(sum) / recent.len() as f64);
        }

        Some(Self {
            daily_average,
            average_daily_delta,
            recent_averages,
        })
    }

    /// Trailing rolling mean over the per-day series, for smoother charts
    ///
    /// Each day's value becomes the mean of up to `window` days ending at it.
    /// A window of 0 or 1 returns the series unchanged.
    pub fn rolling_daily_average(&self, window: usize) -> Vec<(NaiveDate, f64)> {
        if window <= 1 {
            return self.daily_average.clone();
        }
        self.daily_average
            .iter()
            .enumerate()
            .map(|(i, (date, _))| {
                let start = (i + 1).saturating_sub(window);
                let slice = &self.daily_average[start..=i];
                let mean = slice.iter().map(|(_, v)| v).sum::<f64>() / slice.len() as f64;
                (*date, mean)
            })
            .collect()
    }
}

/// Outcome of a trend-advice request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advice {
    /// Nothing recorded yet; no model call was made
    NoHistory,
    /// Generated coaching tips
    Tips(String),
}

/// Turns stored history into coaching advice via one model call
#[derive(Clone)]
pub struct TrendAnalyzer {
    gateway: LlmGateway,
}

impl TrendAnalyzer {
    pub fn new(gateway: LlmGateway) -> Self {
        Self { gateway }
    }

    /// Summarize history and ask the model for three improvement tips
    ///
    /// Empty history short-circuits to [`Advice::NoHistory`] without touching
    /// the gateway.
    pub async fn advice(&self, history: &[ProgressRecord]) -> Result<Advice, GatewayError> {
        let summary = match TrendSummary::from_history(history) {
            Some(summary) => summary,
            None => return Ok(Advice::NoHistory),
        };

        let prompt = advice_prompt(&summary);
        debug!("Trend advice prompt:\n{}", prompt);

        let options = GenerateOptions::new()
            .with_max_tokens(ADVICE_MAX_TOKENS)
            .with_timeout_secs(ADVICE_TIMEOUT_SECS);
        let tips = self
            .gateway
            .generate(&[ChatMessage::user(prompt)], &options)
            .await?;
        Ok(Advice::Tips(tips))
    }
}

fn advice_prompt(summary: &TrendSummary) -> String {
    let mut prompt =
        String::from("Based on the following progress trend from a communication training app:\n");
    prompt.push_str(&format!(
        "- Average daily score change: {:.2} points (positive means improving, negative means declining).\n",
        summary.average_daily_delta
    ));
    prompt.push_str("- Recent performance (average of last 5 days):\n");
    for (criterion, average) in &summary.recent_averages {
        prompt.push_str(&format!("  - {}: {:.1}/10\n", criterion.label(), average));
    }
    prompt.push_str(
        "\nProvide 3 concise, actionable tips to improve communication skills, tailored to this trend and recent performance.",
    );
    prompt
}
