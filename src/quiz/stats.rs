//! Per-subject quiz totals
//!
//! Persisted in the settings blob, keyed by subject name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Running totals for one subject
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectStats {
    pub answered: u64,
    pub correct: u64,
}

impl SubjectStats {
    /// Whole-number percentage, 0 when nothing has been answered
    pub fn percent_correct(&self) -> u32 {
        if self.answered == 0 {
            return 0;
        }
        (self.correct.min(self.answered) * 100 / self.answered) as u32
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizStatsStore {
    subjects: BTreeMap<String, SubjectStats>,
}

impl QuizStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, subject: &str) -> SubjectStats {
        self.subjects.get(subject).copied().unwrap_or_default()
    }

    /// Add a finished quiz to the subject's totals and return the new totals
    pub fn record(&mut self, subject: &str, answered: u64, correct: u64) -> SubjectStats {
        let entry = self.subjects.entry(subject.to_string()).or_default();
        entry.answered = entry.answered.saturating_add(answered);
        entry.correct = entry.correct.saturating_add(correct.min(answered));
        *entry
    }

    pub fn subjects(&self) -> impl Iterator<Item = (&str, SubjectStats)> {
        self.subjects.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn clear(&mut self) {
        self.subjects.clear();
    }
}
