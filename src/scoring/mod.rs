//! The fixed eight-criterion scoring rubric
//!
//! Every practice activity is scored against the same eight criteria so
//! progress rows stay comparable across modules. Criteria that do not apply
//! to an activity are recorded as 0, never omitted.

use serde::{Deserialize, Serialize};

pub mod extractor;

pub use extractor::{ScoreExtractor, ScoringInput};

/// A judged criterion, in canonical (store column) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    Content,
    Delivery,
    Structure,
    LanguageSkills,
    Creativity,
    Communication,
    Vocabulary,
    Grammar,
}

impl Criterion {
    pub const COUNT: usize = 8;

    /// All criteria in canonical order
    pub const ALL: [Criterion; Criterion::COUNT] = [
        Criterion::Content,
        Criterion::Delivery,
        Criterion::Structure,
        Criterion::LanguageSkills,
        Criterion::Creativity,
        Criterion::Communication,
        Criterion::Vocabulary,
        Criterion::Grammar,
    ];

    /// Display and store-column form
    pub fn label(&self) -> &'static str {
        match self {
            Criterion::Content => "Content",
            Criterion::Delivery => "Delivery",
            Criterion::Structure => "Structure",
            Criterion::LanguageSkills => "Language skills",
            Criterion::Creativity => "Creativity",
            Criterion::Communication => "Communication",
            Criterion::Vocabulary => "Vocabulary",
            Criterion::Grammar => "Grammar",
        }
    }

    /// Parse a label, case-insensitively
    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "content" => Some(Criterion::Content),
            "delivery" => Some(Criterion::Delivery),
            "structure" => Some(Criterion::Structure),
            "language skills" => Some(Criterion::LanguageSkills),
            "creativity" => Some(Criterion::Creativity),
            "communication" => Some(Criterion::Communication),
            "vocabulary" => Some(Criterion::Vocabulary),
            "grammar" => Some(Criterion::Grammar),
            _ => None,
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Scores for every criterion; always carries all eight, values in 0..=10
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreVector {
    values: [u8; Criterion::COUNT],
}

impl ScoreVector {
    /// All-zero vector, also the fallback for unparseable score replies
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn get(&self, criterion: Criterion) -> u8 {
        self.values[criterion as usize]
    }

    /// Set one criterion's score, clamped to 10
    pub fn set(&mut self, criterion: Criterion, score: u8) {
        self.values[criterion as usize] = score.min(10);
    }

    /// Mean across all eight criteria
    pub fn mean(&self) -> f64 {
        let sum: u32 = self.values.iter().map(|v| u32::from(*v)).sum();
        f64::from(sum) / Criterion::COUNT as f64
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0)
    }

    /// Criterion/score pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Criterion, u8)> + '_ {
        Criterion::ALL.iter().map(|c| (*c, self.values[*c as usize]))
    }
}

impl From<[u8; Criterion::COUNT]> for ScoreVector {
    fn from(values: [u8; Criterion::COUNT]) -> Self {
        let mut vector = ScoreVector::default();
        for (criterion, value) in Criterion::ALL.iter().zip(values) {
            vector.set(*criterion, value);
        }
        vector
    }
}
