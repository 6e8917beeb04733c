//! # finqa
//!
//! Answer evaluation for financial question answering.
//!
//! Financial QA systems produce free-form answers ("14.1%", "$1.2 million",
//! "Yes, it did") that must be judged against equally free-form references.
//! This crate is the scoring side of that pipeline:
//!
//! - **Normalization**: canonicalize percentages, currency, plain numbers,
//!   and text so formatting variance never masquerades as a wrong answer
//! - **Tolerance comparison**: numeric closeness with percent/fraction
//!   reconciliation ("14.1%" vs "0.141")
//! - **Categorization**: exact match, close match, or incorrect
//! - **Error taxonomy**: why an answer was wrong (calculation magnitude,
//!   formatting, missing units, sign flips)
//! - **Aggregation**: accuracy, MAPE, confusion matrices, difficulty-binned
//!   accuracy, response-time percentiles
//!
//! ## Quick Start
//!
//! ```rust
//! use finqa::Evaluator;
//!
//! let ground_truths = vec!["14.1%".to_string(), "$1.2 million".to_string()];
//! let predictions = vec!["0.141".to_string(), "$1.2 million".to_string()];
//!
//! let summary = Evaluator::default()
//!     .evaluate(&ground_truths, &predictions, None, None)?;
//! println!("Accuracy: {:.2}%", summary.accuracy);
//! # Ok::<(), finqa::Error>(())
//! ```
//!
//! ## Running Against a Generator
//!
//! Live LLM backends implement [`AnswerGenerator`] outside this crate; the
//! [`eval::EvalHarness`] drives any implementation over a dataset and
//! aggregates once every example has been answered:
//!
//! ```rust
//! use finqa::dataset::{QaDocument, QaPair};
//! use finqa::eval::EvalHarness;
//! use finqa::MockGenerator;
//!
//! let generator = MockGenerator::new("mock").with_default_answer("14.1%");
//! let documents = vec![QaDocument {
//!     qa: Some(QaPair {
//!         question: "What is the margin?".to_string(),
//!         answer: "14.10%".to_string(),
//!     }),
//!     ..Default::default()
//! }];
//!
//! let run = EvalHarness::new(&generator).run(&documents)?;
//! assert_eq!(run.summary.exact_match, 1);
//! # Ok::<(), finqa::Error>(())
//! ```
//!
//! ## Design Philosophy
//!
//! - **Pure core**: normalization, comparison, and classification are pure
//!   functions; the only mutation is the counters inside one aggregation pass
//! - **Fail closed**: extraction failures mean "not close", never a panic or
//!   a silently-correct answer
//! - **Whole-set aggregation**: metrics are rebuilt from the complete record
//!   set every run, so percentiles, MAPE, and bins can never disagree
//! - **Tables over branches**: error rules and keyword/pattern vocabularies
//!   are ordered data, extensible without touching control flow

#![warn(missing_docs)]

pub mod config;
pub mod dataset;
mod error;
pub mod eval;
pub mod generate;
pub mod normalize;
pub mod retrieval;

pub use error::{Error, Result};
pub use eval::{Difficulty, EvalRecord, EvalSummary, Evaluator, MatchCategory};
pub use generate::{AnswerGenerator, GeneratedAnswer, MockGenerator, TokenUsage};
pub use normalize::{extract_numeric_value, is_numeric_answer, normalize_answer, numerically_close};
