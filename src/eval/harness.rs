//! Evaluation harness: drive a generator over a dataset, then aggregate.
//!
//! The harness owns the full run lifecycle: filter documents down to valid
//! examples, obtain a prediction for each, fold token usage, and only after
//! every example has been answered run the aggregator once over the
//! complete, order-stable sequence. Aggregation is never streamed or
//! partial; percentiles and MAPE require the whole record set.

use std::collections::HashMap;
use std::time::Instant;

use crate::config::{estimate_cost, model_pricing, CostBreakdown, EvalConfig};
use crate::dataset::{valid_examples, QaDocument};
use crate::error::{Error, Result};
use crate::eval::evaluator::{EvalSummary, Evaluator};
use crate::eval::question_types::{question_type_stats, QuestionTypeStats, QuestionTypeTable};
use crate::generate::{AnswerGenerator, TokenUsage};

/// Complete output of one harness run.
#[derive(Debug, Clone)]
pub struct HarnessRun {
    /// Aggregated evaluation metrics.
    pub summary: EvalSummary,
    /// Per-question-type accuracy.
    pub question_types: HashMap<String, QuestionTypeStats>,
    /// Token usage folded across all generation calls.
    pub usage: TokenUsage,
    /// Estimated cost of the run.
    pub cost: CostBreakdown,
    /// Model identifier reported by the generator.
    pub model: String,
    /// Wall-clock duration of the run in seconds.
    pub duration_secs: f64,
}

/// Drives an [`AnswerGenerator`] over a dataset and evaluates the results.
pub struct EvalHarness<'a> {
    generator: &'a dyn AnswerGenerator,
    config: EvalConfig,
    type_table: QuestionTypeTable,
}

impl<'a> EvalHarness<'a> {
    /// Create a harness around a generator with default configuration.
    pub fn new(generator: &'a dyn AnswerGenerator) -> Self {
        Self {
            generator,
            config: EvalConfig::default(),
            type_table: QuestionTypeTable::default(),
        }
    }

    /// Replace the evaluation configuration.
    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the question-type table.
    pub fn with_type_table(mut self, table: QuestionTypeTable) -> Self {
        self.type_table = table;
        self
    }

    /// Run the evaluation over a dataset.
    ///
    /// Documents without a `qa` record are skipped; a generator failure on
    /// one example is logged and that example dropped, matching the
    /// fail-soft behavior expected of long evaluation runs.
    pub fn run(&self, documents: &[QaDocument]) -> Result<HarnessRun> {
        let mut examples = valid_examples(documents);
        log::info!(
            "Found {} valid examples out of {} documents",
            examples.len(),
            documents.len()
        );
        if examples.is_empty() {
            return Err(Error::evaluation("no valid examples found"));
        }
        if let Some(limit) = self.config.limit {
            examples.truncate(limit);
            log::info!("Limiting evaluation to {limit} examples");
        }

        let total = examples.len();
        let start = Instant::now();

        let mut ground_truths = Vec::with_capacity(total);
        let mut predictions = Vec::with_capacity(total);
        let mut questions = Vec::with_capacity(total);
        let mut processing_times = Vec::with_capacity(total);
        let mut usage = TokenUsage::default();

        for (i, example) in examples.iter().enumerate() {
            // Presence is guaranteed by valid_examples.
            let Some(qa) = &example.qa else { continue };
            log::info!("Processing example {}/{}: {}", i + 1, total, qa.question);

            let generated = match self.generator.answer_question(example, &qa.question) {
                Ok(generated) => generated,
                Err(e) => {
                    log::error!("Error processing example {}: {e}", i + 1);
                    continue;
                }
            };

            if let Some(call_usage) = &generated.usage {
                usage.add(call_usage);
            }
            ground_truths.push(qa.answer.clone());
            predictions.push(generated.answer);
            questions.push(qa.question.clone());
            processing_times.push(generated.processing_time);
        }

        let evaluator = Evaluator::new(self.config.clone());
        let summary = evaluator.evaluate(
            &ground_truths,
            &predictions,
            Some(&questions),
            Some(&processing_times),
        )?;

        let question_types = question_type_stats(&self.type_table, &summary.details);
        let model = self.generator.model_name().to_string();
        let cost = estimate_cost(&usage, &model_pricing(&model));

        Ok(HarnessRun {
            summary,
            question_types,
            usage,
            cost,
            model,
            duration_secs: start.elapsed().as_secs_f64(),
        })
    }
}
