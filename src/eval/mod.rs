//! Financial QA evaluation framework.
//!
//! # Overview
//!
//! This module turns pairs of free-form answer strings into correctness
//! judgments and aggregates them into run-level metrics:
//!
//! - **Categorization**: exact match / close match / incorrect, built on the
//!   normalizer and numeric comparator in [`crate::normalize`]
//! - **Error analysis**: a fixed taxonomy for incorrect pairs (calculation
//!   magnitude, formatting, missing units, sign errors)
//! - **Difficulty**: simple / moderate / complex from question surface
//!   features
//! - **Question types**: an ordered keyword table, independent of the
//!   difficulty vocabulary
//! - **Aggregation**: accuracy, exact-match rate, MAPE, confusion matrix,
//!   difficulty bins, response-time percentiles, error distribution
//! - **Harness + reports**: drive a generator over a dataset and render the
//!   result to markdown/JSON/console
//!
//! # Example
//!
//! ```rust
//! use finqa::eval::evaluator::Evaluator;
//!
//! let summary = Evaluator::default()
//!     .evaluate(
//!         &["14.1%".to_string()],
//!         &["0.141".to_string()],
//!         None,
//!         None,
//!     )
//!     .unwrap();
//! assert_eq!(summary.correct, 1);
//! ```
//!
//! # Metrics
//!
//! | Metric | Notes |
//! |--------|-------|
//! | Accuracy | exact + close matches over total |
//! | Exact-match rate | exact matches over total |
//! | MAPE | numeric pairs only, zero ground truths excluded |
//! | Difficulty bins | simple / moderate / complex accuracy |
//! | Confusion matrix | correct/incorrect vs. predicted category |
//! | Response time | mean, median, min, max, p90, p95 |

pub mod categorize;
pub mod difficulty;
pub mod error_analysis;
pub mod evaluator;
pub mod harness;
pub mod metrics;
pub mod question_types;
pub mod report;

pub use categorize::{categorize, MatchCategory};
pub use difficulty::{classify_difficulty, Difficulty};
pub use error_analysis::{ErrorAnalysis, ErrorAnalyzer, ErrorKind};
pub use evaluator::{DifficultyBin, DifficultyBins, EvalRecord, EvalSummary, Evaluator};
pub use harness::{EvalHarness, HarnessRun};
pub use metrics::ResponseTimeStats;
pub use question_types::{QuestionTypeStats, QuestionTypeTable};
pub use report::ReportContext;
