//! Prediction evaluation and metrics aggregation.
//!
//! The [`Evaluator`] consumes parallel sequences of ground truths and
//! predictions (plus optional questions and processing times), categorizes
//! each pair, attaches error analysis to incorrect pairs, and folds the full
//! record set into an [`EvalSummary`]. Aggregates are always recomputed over
//! the complete record set, never updated incrementally, so sub-metrics can
//! never drift out of sync with each other.
//!
//! Zero-length or mismatched-length inputs produce a single explicit error
//! and no metrics; the evaluator never silently computes over truncated or
//! misaligned data.
//!
//! # Example
//!
//! ```rust
//! use finqa::eval::evaluator::Evaluator;
//!
//! let ground_truths = vec!["14.1%".to_string(), "Yes".to_string()];
//! let predictions = vec!["0.141".to_string(), "No".to_string()];
//!
//! let summary = Evaluator::default()
//!     .evaluate(&ground_truths, &predictions, None, None)
//!     .unwrap();
//! assert_eq!(summary.total, 2);
//! assert_eq!(summary.correct, 1);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::EvalConfig;
use crate::error::{Error, Result};
use crate::eval::categorize::{categorize, MatchCategory};
use crate::eval::difficulty::{classify_difficulty, Difficulty};
use crate::eval::error_analysis::{ErrorAnalysis, ErrorAnalyzer};
use crate::eval::metrics;
use crate::eval::metrics::ResponseTimeStats;
use crate::normalize::{extract_numeric_value, normalize_answer};

/// One evaluated example. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRecord {
    /// Reference answer.
    pub ground_truth: String,
    /// Generated answer.
    pub prediction: String,
    /// Normalized reference answer.
    pub normalized_ground_truth: String,
    /// Normalized generated answer.
    pub normalized_prediction: String,
    /// Match category for the pair.
    pub category: MatchCategory,
    /// Whether the category counts as correct.
    pub is_correct: bool,
    /// Question text, when supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// Seconds spent producing the prediction, when supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    /// Difficulty of the question, when a question was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Error analysis, only for incorrect pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_analysis: Option<ErrorAnalysis>,
}

/// Accuracy within one difficulty bin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultyBin {
    /// Questions in this bin.
    pub total: usize,
    /// Correctly answered questions in this bin.
    pub correct: usize,
    /// Accuracy as a percentage; 0 for an empty bin.
    pub accuracy: f64,
}

/// Accuracy binned by question difficulty. All three bins are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DifficultyBins {
    /// Simple questions.
    pub simple: DifficultyBin,
    /// Moderate questions.
    pub moderate: DifficultyBin,
    /// Complex questions.
    pub complex: DifficultyBin,
}

impl DifficultyBins {
    /// The bin for a difficulty level.
    pub fn get(&self, difficulty: Difficulty) -> &DifficultyBin {
        match difficulty {
            Difficulty::Simple => &self.simple,
            Difficulty::Moderate => &self.moderate,
            Difficulty::Complex => &self.complex,
        }
    }

    fn get_mut(&mut self, difficulty: Difficulty) -> &mut DifficultyBin {
        match difficulty {
            Difficulty::Simple => &mut self.simple,
            Difficulty::Moderate => &mut self.moderate,
            Difficulty::Complex => &mut self.complex,
        }
    }

    /// Iterate bins in fixed (simple, moderate, complex) order.
    pub fn iter(&self) -> impl Iterator<Item = (Difficulty, &DifficultyBin)> {
        [
            (Difficulty::Simple, &self.simple),
            (Difficulty::Moderate, &self.moderate),
            (Difficulty::Complex, &self.complex),
        ]
        .into_iter()
    }
}

/// Aggregated metrics for one evaluation run.
///
/// Built by folding over the full set of [`EvalRecord`]s; rebuilt from
/// scratch each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    /// Number of evaluated pairs.
    pub total: usize,
    /// Exact plus close matches.
    pub correct: usize,
    /// Exact matches.
    pub exact_match: usize,
    /// Close matches.
    pub close_match: usize,
    /// Incorrect predictions.
    pub incorrect: usize,
    /// Overall accuracy as a percentage.
    pub accuracy: f64,
    /// Exact-match rate as a percentage.
    pub exact_match_rate: f64,
    /// MAPE over numeric pairs with non-zero ground truth; `None` when no
    /// pair qualifies.
    pub mape: Option<f64>,
    /// Count of each error category across incorrect records.
    pub error_distribution: HashMap<String, usize>,
    /// Per-example detail records.
    pub details: Vec<EvalRecord>,
    /// Accuracy by question difficulty; present when questions were supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_bins: Option<DifficultyBins>,
    /// Correct/incorrect vs. predicted-category confusion matrix; present
    /// when questions were supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confusion_matrix: Option<HashMap<String, HashMap<String, usize>>>,
    /// Response-time statistics; present when processing times were supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<ResponseTimeStats>,
}

/// Evaluates predictions against ground truths.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    /// Create an evaluator with the given configuration.
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// Create an evaluator with a custom numeric tolerance.
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            config: EvalConfig::with_tolerance(tolerance),
        }
    }

    /// The numeric tolerance in use.
    pub fn tolerance(&self) -> f64 {
        self.config.tolerance
    }

    /// Evaluate predictions against ground truths.
    ///
    /// `questions` and `processing_times`, when given, must have the same
    /// length as the ground truths. Returns [`Error::InvalidInput`] for
    /// empty or mismatched inputs.
    pub fn evaluate(
        &self,
        ground_truths: &[String],
        predictions: &[String],
        questions: Option<&[String]>,
        processing_times: Option<&[f64]>,
    ) -> Result<EvalSummary> {
        let total = ground_truths.len();
        if total == 0 || predictions.len() != total {
            return Err(Error::invalid_input(
                "ground truths and predictions must be non-empty and of equal length",
            ));
        }
        if let Some(questions) = questions {
            if questions.len() != total {
                return Err(Error::invalid_input(
                    "questions must match ground truths in length",
                ));
            }
        }
        if let Some(times) = processing_times {
            if times.len() != total {
                return Err(Error::invalid_input(
                    "processing times must match ground truths in length",
                ));
            }
        }

        log::info!("Evaluating {total} predictions");

        let analyzer = ErrorAnalyzer::new(self.config.tolerance);

        let mut exact_match = 0;
        let mut close_match = 0;
        let mut incorrect = 0;
        let mut details = Vec::with_capacity(total);

        for i in 0..total {
            let ground_truth = &ground_truths[i];
            let prediction = &predictions[i];
            let question = questions.map(|qs| qs[i].clone());

            let category = categorize(ground_truth, prediction, self.config.tolerance);
            match category {
                MatchCategory::ExactMatch => exact_match += 1,
                MatchCategory::CloseMatch => close_match += 1,
                MatchCategory::Incorrect => incorrect += 1,
            }

            let error_analysis = if category == MatchCategory::Incorrect {
                analyzer.analyze(ground_truth, prediction)
            } else {
                None
            };

            details.push(EvalRecord {
                ground_truth: ground_truth.clone(),
                prediction: prediction.clone(),
                normalized_ground_truth: normalize_answer(ground_truth),
                normalized_prediction: normalize_answer(prediction),
                category,
                is_correct: category.is_correct(),
                difficulty: question.as_deref().map(classify_difficulty),
                question,
                processing_time: processing_times.map(|ts| ts[i]),
                error_analysis,
            });
        }

        let correct = exact_match + close_match;

        // Numeric pairs for MAPE, from the normalized forms.
        let mape_pairs: Vec<(f64, f64)> = details
            .iter()
            .filter_map(|r| {
                let gt = extract_numeric_value(&r.normalized_ground_truth)?;
                let pred = extract_numeric_value(&r.normalized_prediction)?;
                Some((gt, pred))
            })
            .collect();

        let difficulty_bins = questions.is_some().then(|| Self::bin_by_difficulty(&details));

        let confusion_matrix = questions.is_some().then(|| {
            let actual: Vec<String> = details
                .iter()
                .map(|r| {
                    if r.is_correct {
                        "correct".to_string()
                    } else {
                        "incorrect".to_string()
                    }
                })
                .collect();
            let predicted: Vec<String> =
                details.iter().map(|r| r.category.label().to_string()).collect();
            metrics::confusion_matrix(&actual, &predicted)
        });

        let response_time = processing_times.map(metrics::response_time_stats);

        let mut error_distribution: HashMap<String, usize> = HashMap::new();
        for record in &details {
            if let Some(analysis) = &record.error_analysis {
                *error_distribution
                    .entry(analysis.kind.label().to_string())
                    .or_insert(0) += 1;
            }
        }

        Ok(EvalSummary {
            total,
            correct,
            exact_match,
            close_match,
            incorrect,
            accuracy: metrics::accuracy(correct, total),
            exact_match_rate: metrics::accuracy(exact_match, total),
            mape: metrics::mape(&mape_pairs),
            error_distribution,
            details,
            difficulty_bins,
            confusion_matrix,
            response_time,
        })
    }

    fn bin_by_difficulty(details: &[EvalRecord]) -> DifficultyBins {
        let mut bins = DifficultyBins::default();
        for record in details {
            let Some(difficulty) = record.difficulty else {
                continue;
            };
            let bin = bins.get_mut(difficulty);
            bin.total += 1;
            if record.is_correct {
                bin.correct += 1;
            }
        }
        for difficulty in [Difficulty::Simple, Difficulty::Moderate, Difficulty::Complex] {
            let bin = bins.get_mut(difficulty);
            bin.accuracy = if bin.total > 0 {
                bin.correct as f64 / bin.total as f64 * 100.0
            } else {
                0.0
            };
        }
        bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::error_analysis::ErrorKind;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_input_is_error() {
        let result = Evaluator::default().evaluate(&[], &[], None, None);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_mismatched_lengths_are_errors() {
        let evaluator = Evaluator::default();
        let gts = strings(&["1", "2"]);

        let result = evaluator.evaluate(&gts, &strings(&["1"]), None, None);
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = evaluator.evaluate(&gts, &gts.clone(), Some(&strings(&["q"])), None);
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = evaluator.evaluate(&gts, &gts.clone(), None, Some(&[0.1]));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_mixed_scenario() {
        let ground_truths = strings(&["14.1%", "$1.2 million", "Yes"]);
        let predictions = strings(&["0.141", "1,200,000", "No"]);

        let summary = Evaluator::default()
            .evaluate(&ground_truths, &predictions, None, None)
            .unwrap();

        assert_eq!(summary.total, 3);
        // "14.1%" vs "0.141" reconciles via the percent/fraction rule.
        assert_eq!(summary.details[0].category, MatchCategory::CloseMatch);
        // "$1.2 million" normalizes to "1.2" while "1,200,000" yields its
        // first number "1": outside tolerance.
        assert_eq!(summary.details[1].category, MatchCategory::Incorrect);
        assert_eq!(summary.details[2].category, MatchCategory::Incorrect);
        assert_eq!(summary.correct, 1);
        assert!((summary.accuracy - 100.0 / 3.0).abs() < 1e-9);

        // The textual pair falls through every rule.
        let text_error = summary.details[2].error_analysis.as_ref().unwrap();
        assert_eq!(text_error.kind, ErrorKind::Unknown);
        assert_eq!(
            summary.error_distribution[ErrorKind::Unknown.label()],
            1
        );
    }

    #[test]
    fn test_exact_match_rate() {
        let summary = Evaluator::default()
            .evaluate(
                &strings(&["14.1%", "100"]),
                &strings(&["14.10%", "100.5"]),
                None,
                None,
            )
            .unwrap();
        assert_eq!(summary.exact_match, 1);
        assert_eq!(summary.close_match, 1);
        assert!((summary.exact_match_rate - 50.0).abs() < 1e-9);
        assert!((summary.accuracy - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_mape_exclusion_of_zero_ground_truth() {
        let summary = Evaluator::default()
            .evaluate(&strings(&["0", "0"]), &strings(&["1", "2"]), None, None)
            .unwrap();
        assert!(summary.mape.is_none());
    }

    #[test]
    fn test_mape_present_for_numeric_pairs() {
        let summary = Evaluator::default()
            .evaluate(&strings(&["100"]), &strings(&["110"]), None, None)
            .unwrap();
        assert!((summary.mape.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_difficulty_bins_and_confusion_matrix() {
        let ground_truths = strings(&["5", "10"]);
        let predictions = strings(&["5", "99"]);
        let questions = strings(&[
            "What is the revenue?",
            "What was the percentage change between 2019 and 2020?",
        ]);

        let summary = Evaluator::default()
            .evaluate(&ground_truths, &predictions, Some(&questions), None)
            .unwrap();

        let bins = summary.difficulty_bins.as_ref().unwrap();
        assert_eq!(bins.simple.total, 1);
        assert_eq!(bins.simple.correct, 1);
        assert!((bins.simple.accuracy - 100.0).abs() < 1e-9);
        assert_eq!(bins.complex.total, 1);
        assert_eq!(bins.complex.correct, 0);
        assert_eq!(bins.moderate.total, 0);
        assert_eq!(bins.moderate.accuracy, 0.0);

        let matrix = summary.confusion_matrix.as_ref().unwrap();
        assert_eq!(matrix["correct"]["exact_match"], 1);
        assert_eq!(matrix["incorrect"]["incorrect"], 1);
    }

    #[test]
    fn test_response_time_stats_attached() {
        let summary = Evaluator::default()
            .evaluate(
                &strings(&["1", "2"]),
                &strings(&["1", "2"]),
                None,
                Some(&[1.0, 3.0]),
            )
            .unwrap();
        let stats = summary.response_time.unwrap();
        assert!((stats.mean - 2.0).abs() < 1e-12);
        assert_eq!(stats.max, 3.0);
    }

    #[test]
    fn test_details_carry_normalized_forms() {
        let summary = Evaluator::default()
            .evaluate(&strings(&["$1.2 million"]), &strings(&["1.2"]), None, None)
            .unwrap();
        let record = &summary.details[0];
        assert_eq!(record.normalized_ground_truth, "1.2");
        assert_eq!(record.normalized_prediction, "1.2");
        assert_eq!(record.category, MatchCategory::ExactMatch);
    }
}
