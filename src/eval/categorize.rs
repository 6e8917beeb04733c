//! Prediction result categorization.
//!
//! A (ground truth, prediction) pair lands in exactly one of three buckets:
//! exact match, close match, or incorrect. Exact string equality of the
//! normalized forms always wins before numeric tolerance is considered, so a
//! prediction that formats identically after normalization is never demoted
//! to a mere "close" judgment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::{is_numeric_answer, normalize_answer, numerically_close};

/// Category of a prediction relative to its ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCategory {
    /// Normalized forms are string-identical.
    ExactMatch,
    /// Both numeric, within the configured relative tolerance.
    CloseMatch,
    /// Neither an exact nor a close match.
    Incorrect,
}

impl MatchCategory {
    /// Whether this category counts as a correct answer.
    pub fn is_correct(self) -> bool {
        matches!(self, MatchCategory::ExactMatch | MatchCategory::CloseMatch)
    }

    /// Stable snake_case label, as used in reports and confusion matrices.
    pub fn label(self) -> &'static str {
        match self {
            MatchCategory::ExactMatch => "exact_match",
            MatchCategory::CloseMatch => "close_match",
            MatchCategory::Incorrect => "incorrect",
        }
    }
}

impl fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Categorize a prediction against its ground truth.
///
/// Normalizes both sides, then checks exact equality before falling back to
/// numeric closeness under `tolerance`.
pub fn categorize(ground_truth: &str, prediction: &str, tolerance: f64) -> MatchCategory {
    let norm_ground_truth = normalize_answer(ground_truth);
    let norm_prediction = normalize_answer(prediction);

    if norm_ground_truth == norm_prediction {
        return MatchCategory::ExactMatch;
    }

    if is_numeric_answer(&norm_ground_truth)
        && is_numeric_answer(&norm_prediction)
        && numerically_close(&norm_ground_truth, &norm_prediction, tolerance)
    {
        return MatchCategory::CloseMatch;
    }

    MatchCategory::Incorrect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_after_normalization() {
        assert_eq!(categorize("14.1%", "14.10%", 0.01), MatchCategory::ExactMatch);
        assert_eq!(categorize("Yes", "yes!", 0.01), MatchCategory::ExactMatch);
    }

    #[test]
    fn test_exact_match_precedence_over_close() {
        // Identical after normalization: exact, even though tolerance would
        // also accept it.
        assert_eq!(categorize("14%", "14.0%", 0.01), MatchCategory::ExactMatch);
    }

    #[test]
    fn test_close_match_percent_fraction() {
        assert_eq!(categorize("14.1%", "0.141", 0.01), MatchCategory::CloseMatch);
    }

    #[test]
    fn test_incorrect_text() {
        assert_eq!(categorize("Yes", "No", 0.01), MatchCategory::Incorrect);
    }

    #[test]
    fn test_incorrect_numeric() {
        assert_eq!(categorize("100", "150", 0.01), MatchCategory::Incorrect);
    }

    #[test]
    fn test_correctness_flag() {
        assert!(MatchCategory::ExactMatch.is_correct());
        assert!(MatchCategory::CloseMatch.is_correct());
        assert!(!MatchCategory::Incorrect.is_correct());
    }
}
