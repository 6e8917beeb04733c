//! Question difficulty classification.
//!
//! A pure function of the question's surface features; no answer or document
//! is consulted. Three signals are combined:
//!
//! - **Operation keywords**: more than one distinct financial operation term
//!   suggests a multi-step calculation
//! - **Multiple years**: two or more 4-digit year tokens imply cross-period
//!   reasoning
//! - **Phrase patterns**: fixed templates like "difference ... between" or
//!   "year over year" that signal comparison questions
//!
//! Any signal firing yields `Complex`; exactly one operation keyword with no
//! other signal yields `Moderate`; otherwise `Simple`. The keyword and
//! pattern tables are static data, extensible without touching the control
//! flow.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Question difficulty derived from surface linguistic features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// No operation keywords, single time period, no comparison phrasing.
    Simple,
    /// Exactly one operation keyword.
    Moderate,
    /// Multiple operations, multiple years, or comparison phrasing.
    Complex,
}

impl Difficulty {
    /// Stable lowercase label.
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Simple => "simple",
            Difficulty::Moderate => "moderate",
            Difficulty::Complex => "complex",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Financial operation terms counted toward question complexity.
pub const OPERATION_KEYWORDS: &[&str] = &[
    "increase",
    "decrease",
    "change",
    "growth",
    "difference",
    "percentage",
    "percent",
    "ratio",
    "compare",
    "total",
    "sum",
    "average",
    "mean",
    "median",
];

/// 4-digit year tokens (19xx/20xx).
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

/// Phrase templates that mark a question complex on their own.
static COMPLEX_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:difference|change).+between",
        r"compare.+and",
        r"calculate.+(?:percentage|percent|ratio)",
        r"\bwhat\s+(?:percentage|percent)\b",
        r"how much did.+(?:change|increase|decrease)",
        r"year(?:-|\s)over(?:-|\s)year",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Count operation keywords present in the question.
///
/// Substring matching, but a matched keyword that is itself a substring of
/// another matched keyword counts once ("percentage" does not also count
/// "percent").
fn operation_keyword_count(question: &str) -> usize {
    let matched: Vec<&str> = OPERATION_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| question.contains(*kw))
        .collect();
    matched
        .iter()
        .filter(|kw| {
            !matched
                .iter()
                .any(|other| other.len() > kw.len() && other.contains(*kw))
        })
        .count()
}

/// Classify question difficulty from its text.
pub fn classify_difficulty(question: &str) -> Difficulty {
    let question = question.to_lowercase();

    let operation_count = operation_keyword_count(&question);
    let has_multiple_years = YEAR.find_iter(&question).count() > 1;
    let matches_complex_pattern = COMPLEX_PATTERNS.iter().any(|p| p.is_match(&question));

    if operation_count > 1 || has_multiple_years || matches_complex_pattern {
        Difficulty::Complex
    } else if operation_count == 1 {
        Difficulty::Moderate
    } else {
        Difficulty::Simple
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_question() {
        assert_eq!(classify_difficulty("What is the revenue?"), Difficulty::Simple);
        assert_eq!(classify_difficulty("What was net income in 2019?"), Difficulty::Simple);
    }

    #[test]
    fn test_moderate_single_keyword() {
        assert_eq!(
            classify_difficulty("What is the percentage of revenue?"),
            Difficulty::Moderate
        );
        assert_eq!(classify_difficulty("What was the total debt?"), Difficulty::Moderate);
    }

    #[test]
    fn test_complex_multi_keyword_and_years() {
        assert_eq!(
            classify_difficulty("What was the percentage change between 2019 and 2020?"),
            Difficulty::Complex
        );
    }

    #[test]
    fn test_complex_multiple_years_alone() {
        assert_eq!(
            classify_difficulty("What was revenue in 2019 and in 2020?"),
            Difficulty::Complex
        );
    }

    #[test]
    fn test_complex_phrase_patterns() {
        assert_eq!(
            classify_difficulty("How much did net sales increase?"),
            Difficulty::Complex
        );
        assert_eq!(
            classify_difficulty("What is the year-over-year revenue?"),
            Difficulty::Complex
        );
        assert_eq!(
            classify_difficulty("What percentage of sales came from services?"),
            Difficulty::Complex
        );
    }

    #[test]
    fn test_keyword_subsumption_counts_once() {
        // "percentage" contains "percent"; must not double count.
        assert_eq!(operation_keyword_count("the percentage here"), 1);
        assert_eq!(operation_keyword_count("percent and ratio"), 2);
    }

    #[test]
    fn test_single_year_not_complex() {
        assert_eq!(
            classify_difficulty("What was the revenue in 2020?"),
            Difficulty::Simple
        );
    }
}
