//! Answer generation seam.
//!
//! The evaluation core treats answer generation as an opaque capability:
//! given a document and a question, a generator returns a raw answer string
//! plus timing and token-usage metadata. Live LLM clients implement
//! [`AnswerGenerator`] outside this crate; [`MockGenerator`] exists so tests
//! and offline runs never need a network.
//!
//! Token usage is an explicit value returned with each answer and folded by
//! the caller. Generators hold no shared mutable counters, so concurrent
//! runs cannot bleed usage into each other.
//!
//! # Example
//!
//! ```rust
//! use finqa::generate::{AnswerGenerator, MockGenerator};
//! use finqa::dataset::QaDocument;
//!
//! let generator = MockGenerator::new("mock").with_answer("What is x?", "42");
//! let result = generator
//!     .answer_question(&QaDocument::default(), "What is x?")
//!     .unwrap();
//! assert_eq!(result.answer, "42");
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dataset::QaDocument;
use crate::error::Result;

/// Token counts for one or more generation calls.
///
/// A plain value: fold per-answer usages with [`TokenUsage::add`] to get a
/// run total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens in the completion.
    pub completion_tokens: u64,
    /// Prompt plus completion tokens.
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Accumulate another usage value into this one.
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }

    /// Sum an iterator of usage values.
    pub fn fold<'a, I>(usages: I) -> TokenUsage
    where
        I: IntoIterator<Item = &'a TokenUsage>,
    {
        let mut total = TokenUsage::default();
        for usage in usages {
            total.add(usage);
        }
        total
    }
}

/// One generated answer with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    /// The extracted final answer.
    pub answer: String,
    /// The complete model response the answer was extracted from.
    #[serde(default)]
    pub full_response: String,
    /// Seconds spent producing the answer.
    pub processing_time: f64,
    /// Token usage for this call, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Produces answers to questions about documents.
///
/// Implementations are expected to be deterministic per call site only in
/// their contract shape; the core never retries or validates output beyond
/// normalization.
pub trait AnswerGenerator {
    /// Answer a question about a document.
    fn answer_question(&self, document: &QaDocument, question: &str) -> Result<GeneratedAnswer>;

    /// Identifier of the underlying model, used for pricing and reports.
    fn model_name(&self) -> &str;
}

static FINAL_ANSWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"Final Answer:\s*([^\n]+)").unwrap());

/// Extract the `Final Answer:` line from a raw model response.
///
/// Returns the trimmed remainder of the first matching line, or `None` when
/// the marker is absent.
pub fn extract_final_answer(response: &str) -> Option<&str> {
    FINAL_ANSWER
        .captures(response)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Canned-answer generator for tests and offline runs.
///
/// Answers are keyed by question text; unmatched questions fall back to the
/// default answer (empty when unset).
#[derive(Debug, Clone)]
pub struct MockGenerator {
    name: String,
    answers: HashMap<String, String>,
    default_answer: String,
    processing_time: f64,
    usage: Option<TokenUsage>,
}

impl MockGenerator {
    /// Create a mock generator with the given model name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            answers: HashMap::new(),
            default_answer: String::new(),
            processing_time: 0.0,
            usage: None,
        }
    }

    /// Register a canned answer for a question.
    pub fn with_answer(mut self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        self.answers.insert(question.into(), answer.into());
        self
    }

    /// Set the answer returned for unregistered questions.
    pub fn with_default_answer(mut self, answer: impl Into<String>) -> Self {
        self.default_answer = answer.into();
        self
    }

    /// Set the processing time reported per answer.
    pub fn with_processing_time(mut self, seconds: f64) -> Self {
        self.processing_time = seconds;
        self
    }

    /// Set the token usage reported per answer.
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

impl AnswerGenerator for MockGenerator {
    fn answer_question(&self, _document: &QaDocument, question: &str) -> Result<GeneratedAnswer> {
        let answer = self
            .answers
            .get(question)
            .cloned()
            .unwrap_or_else(|| self.default_answer.clone());
        Ok(GeneratedAnswer {
            full_response: format!("Final Answer: {answer}"),
            answer,
            processing_time: self.processing_time,
            usage: self.usage,
        })
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}
