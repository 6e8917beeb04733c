//! Question type classification and per-type accuracy.
//!
//! The type vocabulary is an ordered keyword table held as data, so new
//! types can be added without touching control flow. This table is
//! deliberately independent of the difficulty classifier's keyword list: the
//! two answer different questions (what kind vs. how hard) and share no
//! vocabulary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::eval::evaluator::EvalRecord;

/// Fallback type for questions matching no keyword.
pub const OTHER_TYPE: &str = "other";

/// Ordered mapping from question type names to trigger keywords.
///
/// Classification walks the table in order and the first type with any
/// matching keyword wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTypeTable {
    entries: Vec<(String, Vec<String>)>,
}

impl Default for QuestionTypeTable {
    fn default() -> Self {
        let entries = [
            ("percentage", vec!["percent", "percentage"]),
            (
                "change",
                vec!["increase", "decrease", "change", "growth", "difference"],
            ),
            (
                "factual",
                vec!["what is", "what was", "what are", "what were"],
            ),
            ("quantity", vec!["how much", "how many"]),
            ("explanation", vec!["why", "how", "explain"]),
            (
                "comparison",
                vec!["compare", "difference between", "versus", "vs"],
            ),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(name, kws)| {
                    (
                        name.to_string(),
                        kws.into_iter().map(String::from).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl QuestionTypeTable {
    /// Build a table from explicit (type, keywords) entries.
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    /// Classify a question; returns [`OTHER_TYPE`] when nothing matches.
    pub fn classify<'a>(&'a self, question: &str) -> &'a str {
        let question = question.to_lowercase();
        for (name, keywords) in &self.entries {
            if keywords.iter().any(|kw| question.contains(kw.as_str())) {
                return name;
            }
        }
        OTHER_TYPE
    }

    /// Count questions per type.
    pub fn counts<'a, I>(&self, questions: I) -> HashMap<String, usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for question in questions {
            *counts.entry(self.classify(question).to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Per-question-type accuracy statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionTypeStats {
    /// Questions of this type.
    pub count: usize,
    /// Correctly answered.
    pub correct: usize,
    /// Incorrectly answered.
    pub incorrect: usize,
    /// Accuracy as a percentage.
    pub accuracy: f64,
}

/// Fold evaluation records into per-type accuracy statistics.
///
/// Records without a question are skipped.
pub fn question_type_stats(
    table: &QuestionTypeTable,
    records: &[EvalRecord],
) -> HashMap<String, QuestionTypeStats> {
    let mut stats: HashMap<String, QuestionTypeStats> = HashMap::new();

    for record in records {
        let Some(question) = record.question.as_deref() else {
            continue;
        };
        let entry = stats.entry(table.classify(question).to_string()).or_default();
        entry.count += 1;
        if record.is_correct {
            entry.correct += 1;
        } else {
            entry.incorrect += 1;
        }
    }

    for entry in stats.values_mut() {
        if entry.count > 0 {
            entry.accuracy = entry.correct as f64 / entry.count as f64 * 100.0;
        }
    }

    stats
}
