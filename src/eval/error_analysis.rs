//! Error analysis for incorrect predictions.
//!
//! Assigns a single human-readable error category to each incorrect
//! (ground truth, prediction) pair. The cascade is an ordered table of rules
//! evaluated top-to-bottom with first-match-wins semantics, so each rule can
//! be audited and tested in isolation:
//!
//! 1. Sign flip between two numeric answers
//! 2. Numeric divergence, classified by relative magnitude (minor < 10%,
//!    significant < 50%, major otherwise); extraction failure gets its own
//!    dedicated category
//! 3. Pure formatting difference (equal after stripping periods and `%`)
//! 4. Missing percentage symbol
//! 5. Unit word (million/billion) present in the ground truth but not the
//!    prediction
//! 6. Unknown error type (fallback)
//!
//! # Example
//!
//! ```rust
//! use finqa::eval::error_analysis::{ErrorAnalyzer, ErrorKind};
//!
//! let analyzer = ErrorAnalyzer::default();
//! let analysis = analyzer.analyze("5", "-5").unwrap();
//! assert_eq!(analysis.kind, ErrorKind::SignError);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_TOLERANCE;
use crate::eval::categorize::{categorize, MatchCategory};
use crate::normalize::{extract_numeric_value, is_numeric_answer, normalize_answer};

/// Fixed error taxonomy for incorrect predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Relative difference below 10%.
    MinorCalculation,
    /// Relative difference below 50%.
    SignificantCalculation,
    /// Relative difference of 50% or more.
    MajorCalculation,
    /// Both sides looked numeric but a value could not be extracted.
    ExtractionFailure,
    /// Equal after stripping periods and percent signs.
    FormattingDifference,
    /// Ground truth carries `%`, prediction does not.
    MissingPercentSymbol,
    /// Unit word in ground truth absent from prediction.
    IncorrectUnit,
    /// Extracted values have opposite signs.
    SignError,
    /// No rule matched.
    Unknown,
}

impl ErrorKind {
    /// Human-readable label, used as the key in error distributions.
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::MinorCalculation => "Minor calculation error",
            ErrorKind::SignificantCalculation => "Significant calculation error",
            ErrorKind::MajorCalculation => "Major calculation error",
            ErrorKind::ExtractionFailure => "Failed to extract numeric values",
            ErrorKind::FormattingDifference => "Formatting difference",
            ErrorKind::MissingPercentSymbol => "Missing percentage symbol",
            ErrorKind::IncorrectUnit => "Incorrect unit",
            ErrorKind::SignError => "Sign error",
            ErrorKind::Unknown => "Unknown error type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of analyzing one incorrect pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    /// Which rule matched.
    pub kind: ErrorKind,
    /// Message with the concrete differences embedded.
    pub message: String,
}

impl ErrorAnalysis {
    fn plain(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.label().to_string(),
        }
    }
}

/// Everything a rule may inspect: raw and normalized forms of both answers.
struct RuleInput<'a> {
    ground_truth: &'a str,
    prediction: &'a str,
    norm_ground_truth: &'a str,
    norm_prediction: &'a str,
}

type Rule = fn(&RuleInput<'_>) -> Option<ErrorAnalysis>;

/// Ordered rule table; the first rule returning `Some` wins.
const RULES: &[Rule] = &[
    sign_flip,
    numeric_divergence,
    formatting_difference,
    missing_percent_symbol,
    unit_mismatch,
];

fn sign_flip(input: &RuleInput<'_>) -> Option<ErrorAnalysis> {
    if !is_numeric_answer(input.norm_ground_truth) || !is_numeric_answer(input.norm_prediction) {
        return None;
    }
    let gt = extract_numeric_value(input.norm_ground_truth)?;
    let pred = extract_numeric_value(input.norm_prediction)?;
    if (gt > 0.0 && pred < 0.0) || (gt < 0.0 && pred > 0.0) {
        Some(ErrorAnalysis {
            kind: ErrorKind::SignError,
            message: format!("Sign error (ground truth {gt}, prediction {pred})"),
        })
    } else {
        None
    }
}

fn numeric_divergence(input: &RuleInput<'_>) -> Option<ErrorAnalysis> {
    if !is_numeric_answer(input.norm_ground_truth) || !is_numeric_answer(input.norm_prediction) {
        return None;
    }
    let (gt, pred) = match (
        extract_numeric_value(input.norm_ground_truth),
        extract_numeric_value(input.norm_prediction),
    ) {
        (Some(gt), Some(pred)) => (gt, pred),
        // Looked numeric but would not parse: dedicated category, and no
        // further rules are consulted for this pair.
        _ => return Some(ErrorAnalysis::plain(ErrorKind::ExtractionFailure)),
    };

    let abs_diff = (gt - pred).abs();
    let rel_diff = abs_diff / gt.abs().max(1e-10);

    let kind = if rel_diff < 0.1 {
        ErrorKind::MinorCalculation
    } else if rel_diff < 0.5 {
        ErrorKind::SignificantCalculation
    } else {
        ErrorKind::MajorCalculation
    };
    Some(ErrorAnalysis {
        kind,
        message: format!(
            "{} (difference of {abs_diff:.2}, {:.1}% off)",
            kind.label(),
            rel_diff * 100.0
        ),
    })
}

fn formatting_difference(input: &RuleInput<'_>) -> Option<ErrorAnalysis> {
    let strip = |s: &str| s.replace(['.', '%'], "").trim().to_string();
    if strip(input.norm_ground_truth) == strip(input.norm_prediction) {
        Some(ErrorAnalysis::plain(ErrorKind::FormattingDifference))
    } else {
        None
    }
}

fn missing_percent_symbol(input: &RuleInput<'_>) -> Option<ErrorAnalysis> {
    if input.norm_ground_truth.contains('%') && !input.norm_prediction.contains('%') {
        Some(ErrorAnalysis::plain(ErrorKind::MissingPercentSymbol))
    } else {
        None
    }
}

fn unit_mismatch(input: &RuleInput<'_>) -> Option<ErrorAnalysis> {
    // Checked on the raw strings: normalization already strips unit words.
    let gt = input.ground_truth.to_lowercase();
    let pred = input.prediction.to_lowercase();
    for unit in ["million", "billion"] {
        if gt.contains(unit) && !pred.contains(unit) {
            return Some(ErrorAnalysis {
                kind: ErrorKind::IncorrectUnit,
                message: format!("Incorrect unit (expected {unit})"),
            });
        }
    }
    None
}

/// Analyzer for incorrect predictions.
#[derive(Debug, Clone)]
pub struct ErrorAnalyzer {
    /// Tolerance used to re-check that the pair is actually incorrect.
    pub tolerance: f64,
}

impl Default for ErrorAnalyzer {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ErrorAnalyzer {
    /// Create an analyzer with a custom tolerance.
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Analyze the error between ground truth and prediction.
    ///
    /// Returns `None` when the pair is not incorrect under this analyzer's
    /// tolerance. Otherwise exactly one category is produced.
    pub fn analyze(&self, ground_truth: &str, prediction: &str) -> Option<ErrorAnalysis> {
        if categorize(ground_truth, prediction, self.tolerance) != MatchCategory::Incorrect {
            return None;
        }

        let norm_ground_truth = normalize_answer(ground_truth);
        let norm_prediction = normalize_answer(prediction);
        let input = RuleInput {
            ground_truth,
            prediction,
            norm_ground_truth: &norm_ground_truth,
            norm_prediction: &norm_prediction,
        };

        for rule in RULES {
            if let Some(analysis) = rule(&input) {
                return Some(analysis);
            }
        }
        Some(ErrorAnalysis::plain(ErrorKind::Unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(gt: &str, pred: &str) -> ErrorAnalysis {
        ErrorAnalyzer::default()
            .analyze(gt, pred)
            .expect("pair should be incorrect")
    }

    #[test]
    fn test_correct_pair_yields_none() {
        let analyzer = ErrorAnalyzer::default();
        assert!(analyzer.analyze("14.1%", "14.10%").is_none());
        assert!(analyzer.analyze("14.1%", "0.141").is_none());
    }

    #[test]
    fn test_sign_error_beats_magnitude() {
        let analysis = analyze("5", "-5");
        assert_eq!(analysis.kind, ErrorKind::SignError);
    }

    #[test]
    fn test_minor_calculation_error() {
        let analysis = analyze("100", "105");
        assert_eq!(analysis.kind, ErrorKind::MinorCalculation);
        assert!(analysis.message.contains("5.00"));
    }

    #[test]
    fn test_significant_calculation_error() {
        let analysis = analyze("100", "130");
        assert_eq!(analysis.kind, ErrorKind::SignificantCalculation);
    }

    #[test]
    fn test_major_calculation_error() {
        let analysis = analyze("100", "250");
        assert_eq!(analysis.kind, ErrorKind::MajorCalculation);
    }

    #[test]
    fn test_missing_percent_symbol() {
        // Percentage ground truth against a non-numeric prediction: the
        // calculation rules pass, the %-symbol rule catches it.
        let analysis = analyze("14.1%", "about fourteen");
        assert_eq!(analysis.kind, ErrorKind::MissingPercentSymbol);
    }

    #[test]
    fn test_incorrect_unit() {
        let input = RuleInput {
            ground_truth: "1.2 million units",
            prediction: "1.2 units",
            norm_ground_truth: "gt",
            norm_prediction: "pred",
        };
        let analysis = unit_mismatch(&input).expect("unit rule should match");
        assert_eq!(analysis.kind, ErrorKind::IncorrectUnit);
    }

    #[test]
    fn test_unknown_error_type() {
        let analysis = analyze("Yes", "No");
        assert_eq!(analysis.kind, ErrorKind::Unknown);
    }

    #[test]
    fn test_formatting_difference() {
        let input = RuleInput {
            ground_truth: "14.1%",
            prediction: "141",
            norm_ground_truth: "14.1%",
            norm_prediction: "141",
        };
        assert!(formatting_difference(&input).is_some());
    }

    #[test]
    fn test_first_match_wins_order() {
        // Both numeric with opposite signs AND large divergence: the sign
        // rule is ordered first.
        let analysis = analyze("100", "-100");
        assert_eq!(analysis.kind, ErrorKind::SignError);
    }
}
