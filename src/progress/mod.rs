//! Progress history: append-only score rows and trend aggregation
//!
//! Every completed exercise appends one dated row to a CSV store. Trend
//! statistics and coaching advice are derived from that history wholesale;
//! nothing here ever rewrites past rows.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoreVector;

pub mod store;
pub mod trend;

pub use store::{ProgressStore, StoreError};
pub use trend::{Advice, TrendAnalyzer, TrendSummary};

/// Practice module a progress record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Module {
    DailyPractice,
    Presentation,
    ImpromptuSpeaking,
    Storytelling,
    ConflictResolution,
}

impl Module {
    pub const ALL: [Module; 5] = [
        Module::DailyPractice,
        Module::Presentation,
        Module::ImpromptuSpeaking,
        Module::Storytelling,
        Module::ConflictResolution,
    ];

    /// Display and store form
    pub fn label(&self) -> &'static str {
        match self {
            Module::DailyPractice => "Daily Practice",
            Module::Presentation => "Presentation",
            Module::ImpromptuSpeaking => "Impromptu Speaking",
            Module::Storytelling => "Storytelling",
            Module::ConflictResolution => "Conflict Resolution",
        }
    }

    /// Parse a stored label (exact match; rows are written by us)
    pub fn from_label(s: &str) -> Option<Self> {
        Module::ALL.iter().copied().find(|m| m.label() == s)
    }
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One scored practice event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub date: NaiveDate,
    pub module: Module,
    pub scores: ScoreVector,
}

impl ProgressRecord {
    pub fn new(date: NaiveDate, module: Module, scores: ScoreVector) -> Self {
        Self { date, module, scores }
    }

    /// Record dated today in local time
    pub fn today(module: Module, scores: ScoreVector) -> Self {
        Self::new(Local::now().date_naive(), module, scores)
    }
}
