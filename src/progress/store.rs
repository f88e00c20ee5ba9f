//! Append-only CSV progress store
//!
//! One row per scored practice event, living under the app data directory.
//! The header is written once when the file is created and rows are never
//! rewritten or deduplicated, so the file is a permanent history.

use anyhow::Context;
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::scoring::{Criterion, ScoreVector};

use super::{Module, ProgressRecord};

/// File name under the data directory
pub const STORE_FILE: &str = "progress.csv";

/// Errors from the progress store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Nothing recorded yet; consumers treat this as an empty history
    #[error("No progress recorded yet")]
    NoHistory,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Append-only store of scored practice events
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    /// Store at the default location under the app data directory
    pub fn open_default() -> anyhow::Result<Self> {
        let dir = crate::config::data_dir()?;
        std::fs::create_dir_all(&dir).context("Failed to create data directory")?;
        Ok(Self {
            path: dir.join(STORE_FILE),
        })
    }

    /// Store at a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file and header on first write
    pub fn append(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let is_new = !self.path.exists();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // One write_all per append keeps rows whole
        let mut chunk = String::new();
        if is_new {
            chunk.push_str(&header());
            chunk.push('\n');
        }
        chunk.push_str(&format_row(record));
        chunk.push('\n');
        file.write_all(chunk.as_bytes())?;

        debug!(
            "Recorded {} scores for {} in {}",
            record.module,
            record.date,
            self.path.display()
        );
        Ok(())
    }

    /// All records in insertion order
    ///
    /// Fails with [`StoreError::NoHistory`] when nothing has been recorded
    /// yet. Rows that fail to parse are skipped with a warning so one bad
    /// line cannot take the whole history down.
    pub fn read_all(&self) -> Result<Vec<ProgressRecord>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NoHistory)
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut records = Vec::new();
        let mut lines = text.lines().enumerate();
        lines.next(); // header
        for (index, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(line) {
                Some(record) => records.push(record),
                None => warn!("Skipping malformed progress row {}: {}", index + 1, line),
            }
        }
        Ok(records)
    }

    /// Like [`ProgressStore::read_all`] but treats a missing store as empty
    pub fn read_all_or_empty(&self) -> Result<Vec<ProgressRecord>, StoreError> {
        match self.read_all() {
            Err(StoreError::NoHistory) => Ok(Vec::new()),
            other => other,
        }
    }
}

fn header() -> String {
    let mut columns = vec!["date", "module"];
    columns.extend(Criterion::ALL.iter().map(|c| c.label()));
    columns.join(",")
}

fn format_row(record: &ProgressRecord) -> String {
    let mut fields = vec![
        record.date.format("%Y-%m-%d").to_string(),
        record.module.label().to_string(),
    ];
    fields.extend(record.scores.iter().map(|(_, value)| value.to_string()));
    fields.join(",")
}

fn parse_row(line: &str) -> Option<ProgressRecord> {
    let mut fields = line.split(',');
    let date = NaiveDate::parse_from_str(fields.next()?, "%Y-%m-%d").ok()?;
    let module = Module::from_label(fields.next()?)?;

    let mut scores = ScoreVector::zeroed();
    for criterion in Criterion::ALL {
        let value: u8 = fields.next()?.trim().parse().ok()?;
        if value > 10 {
            return None;
        }
        scores.set(criterion, value);
    }
    if fields.next().is_some() {
        return None;
    }
    Some(ProgressRecord::new(date, module, scores))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, module: Module, fill: u8) -> ProgressRecord {
        ProgressRecord::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            module,
            ScoreVector::from([fill; Criterion::COUNT]),
        )
    }

    #[test]
    fn test_header_matches_store_layout() {
        assert_eq!(
            header(),
            "date,module,Content,Delivery,Structure,Language skills,Creativity,Communication,Vocabulary,Grammar"
        );
    }

    #[test]
    fn test_append_writes_header_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::with_path(dir.path().join(STORE_FILE));

        store.append(&record("2025-03-01", Module::DailyPractice, 6)).unwrap();
        store.append(&record("2025-03-02", Module::Presentation, 7)).unwrap();

        let text = std::fs::read_to_string(store.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,module,Content"));
        assert_eq!(
            lines[1],
            "2025-03-01,Daily Practice,6,6,6,6,6,6,6,6"
        );
        assert_eq!(
            lines[2],
            "2025-03-02,Presentation,7,7,7,7,7,7,7,7"
        );
    }

    #[test]
    fn test_round_trip_preserves_records_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::with_path(dir.path().join(STORE_FILE));

        // Deliberately out of date order; the store must not re-sort
        let first = record("2025-03-05", Module::Storytelling, 8);
        let second = record("2025-03-01", Module::ConflictResolution, 4);
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records, vec![first, second]);
    }

    #[test]
    fn test_same_day_records_stay_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::with_path(dir.path().join(STORE_FILE));

        store.append(&record("2025-03-01", Module::DailyPractice, 5)).unwrap();
        store.append(&record("2025-03-01", Module::DailyPractice, 9)).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].scores.get(Criterion::Content), 5);
        assert_eq!(records[1].scores.get(Criterion::Content), 9);
    }

    #[test]
    fn test_missing_store_is_no_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProgressStore::with_path(dir.path().join(STORE_FILE));

        assert!(matches!(store.read_all(), Err(StoreError::NoHistory)));
        assert_eq!(store.read_all_or_empty().unwrap(), Vec::new());
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        std::fs::write(
            &path,
            "date,module,Content,Delivery,Structure,Language skills,Creativity,Communication,Vocabulary,Grammar\n\
             2025-03-01,Daily Practice,6,6,6,6,6,6,6,6\n\
             not-a-date,Daily Practice,1,2,3,4,5,6,7,8\n\
             2025-03-02,Unknown Module,1,2,3,4,5,6,7,8\n\
             2025-03-03,Presentation,7,7,7,7,7,7,7,7\n",
        )
        .unwrap();

        let store = ProgressStore::with_path(path);
        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].module, Module::DailyPractice);
        assert_eq!(records[1].module, Module::Presentation);
    }

    #[test]
    fn test_out_of_range_scores_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        std::fs::write(
            &path,
            "date,module,Content,Delivery,Structure,Language skills,Creativity,Communication,Vocabulary,Grammar\n\
             2025-03-01,Daily Practice,10,10,10,10,10,10,10,10\n\
             2025-03-02,Daily Practice,11,2,3,4,5,6,7,8\n",
        )
        .unwrap();

        // A score past 10 skips the whole row; it is never clamped
        let store = ProgressStore::with_path(path);
        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].scores.get(Criterion::Content), 10);
    }
}
