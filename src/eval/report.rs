//! Evaluation report rendering.
//!
//! Renders an [`EvalSummary`] plus run metadata to markdown, a console
//! summary, or JSON, and saves the markdown/JSON pair to a reports
//! directory. The JSON variant truncates detail records to a 10-record
//! sample so large runs do not produce huge files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::CostBreakdown;
use crate::error::Result;
use crate::eval::evaluator::{EvalRecord, EvalSummary};
use crate::eval::harness::HarnessRun;
use crate::eval::question_types::QuestionTypeStats;
use crate::generate::TokenUsage;

/// Number of detail records kept in the simplified JSON output.
const JSON_SAMPLE_SIZE: usize = 10;

/// Number of examples shown per section in the markdown report.
const SAMPLE_EXAMPLES: usize = 3;

/// Run metadata accompanying a summary in reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportContext {
    /// Identifier for this evaluation run.
    pub evaluation_id: String,
    /// Model under evaluation, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Per-question-type accuracy, when computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_types: Option<HashMap<String, QuestionTypeStats>>,
    /// Token usage folded across the run, when tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    /// Estimated cost, when tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostBreakdown>,
}

impl ReportContext {
    /// Create a context with an epoch-derived evaluation id.
    pub fn new() -> Self {
        Self {
            evaluation_id: epoch_id(),
            ..Self::default()
        }
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Build a context from a harness run.
    pub fn from_run(run: &HarnessRun) -> Self {
        Self {
            evaluation_id: epoch_id(),
            model: Some(run.model.clone()),
            question_types: Some(run.question_types.clone()),
            token_usage: Some(run.usage),
            cost: Some(run.cost.clone()),
        }
    }
}

/// Seconds-since-epoch identifier; avoids a calendar dependency.
fn epoch_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    secs.to_string()
}

/// Render a full markdown evaluation report.
pub fn render_markdown(summary: &EvalSummary, ctx: &ReportContext) -> String {
    let mut out = String::new();

    out.push_str("# Financial QA Evaluation Report\n\n");
    out.push_str("## Overview\n\n");
    out.push_str(&format!("- **Evaluation ID**: {}\n", ctx.evaluation_id));
    out.push_str(&format!("- **Total examples evaluated**: {}\n", summary.total));
    if let Some(model) = &ctx.model {
        out.push_str(&format!("- **Model**: {model}\n"));
    }
    out.push('\n');

    out.push_str("## Performance Metrics\n\n");
    out.push_str(&format!("- **Overall accuracy**: {:.2}%\n", summary.accuracy));
    out.push_str(&format!(
        "- **Exact match rate**: {:.2}%\n",
        summary.exact_match_rate
    ));
    out.push_str(&format!(
        "- **Correct answers**: {}/{} (exact {}, close {})\n",
        summary.correct, summary.total, summary.exact_match, summary.close_match
    ));
    out.push_str(&format!(
        "- **Incorrect answers**: {}/{}\n",
        summary.incorrect, summary.total
    ));
    if let Some(mape) = summary.mape {
        out.push_str(&format!(
            "- **Mean Absolute Percentage Error (MAPE)**: {mape:.2}%\n"
        ));
    }
    out.push('\n');

    if let Some(usage) = &ctx.token_usage {
        out.push_str("## Token Usage and Cost\n\n");
        out.push_str(&format!("- **Prompt tokens**: {}\n", usage.prompt_tokens));
        out.push_str(&format!(
            "- **Completion tokens**: {}\n",
            usage.completion_tokens
        ));
        out.push_str(&format!("- **Total tokens**: {}\n", usage.total_tokens));
        if let Some(cost) = &ctx.cost {
            out.push_str(&format!(
                "- **Estimated cost**: ${:.4} {}\n",
                cost.total_cost, cost.currency
            ));
        }
        out.push('\n');
    }

    if let Some(types) = &ctx.question_types {
        out.push_str("## Performance by Question Type\n\n");
        let mut entries: Vec<_> = types.iter().collect();
        entries.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(b.0)));
        for (name, stats) in entries {
            out.push_str(&format!(
                "- **{name}**: {:.2}% ({}/{})\n",
                stats.accuracy, stats.correct, stats.count
            ));
        }
        out.push('\n');
    }

    if let Some(bins) = &summary.difficulty_bins {
        out.push_str("## Performance by Question Difficulty\n\n");
        for (difficulty, bin) in bins.iter() {
            out.push_str(&format!(
                "- **{difficulty}**: {:.2}% ({}/{})\n",
                bin.accuracy, bin.correct, bin.total
            ));
        }
        out.push('\n');
    }

    if let Some(rt) = &summary.response_time {
        out.push_str("## Response Time Statistics\n\n");
        out.push_str(&format!("- **Mean**: {:.2} seconds\n", rt.mean));
        out.push_str(&format!("- **Median**: {:.2} seconds\n", rt.median));
        out.push_str(&format!("- **Min**: {:.2} seconds\n", rt.min));
        out.push_str(&format!("- **Max**: {:.2} seconds\n", rt.max));
        out.push_str(&format!("- **90th percentile**: {:.2} seconds\n", rt.p90));
        out.push_str(&format!("- **95th percentile**: {:.2} seconds\n", rt.p95));
        out.push('\n');
    }

    if !summary.error_distribution.is_empty() {
        out.push_str("## Error Analysis\n\n");
        let mut errors: Vec<_> = summary.error_distribution.iter().collect();
        errors.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (error_type, count) in errors.iter().take(5) {
            let share = if summary.incorrect > 0 {
                **count as f64 / summary.incorrect as f64 * 100.0
            } else {
                0.0
            };
            out.push_str(&format!(
                "- **{error_type}**: {count} occurrences ({share:.1}% of errors)\n"
            ));
        }
        out.push('\n');
    }

    let correct: Vec<&EvalRecord> = summary.details.iter().filter(|r| r.is_correct).collect();
    let incorrect: Vec<&EvalRecord> = summary.details.iter().filter(|r| !r.is_correct).collect();
    push_examples(&mut out, "Sample Correct Answers", &correct);
    push_examples(&mut out, "Sample Incorrect Answers", &incorrect);

    out
}

fn push_examples(out: &mut String, title: &str, records: &[&EvalRecord]) {
    if records.is_empty() {
        return;
    }
    out.push_str(&format!("## {title}\n\n"));
    for (i, record) in records.iter().take(SAMPLE_EXAMPLES).enumerate() {
        out.push_str(&format!("### Example {}\n\n", i + 1));
        if let Some(question) = &record.question {
            out.push_str(&format!("**Question**: {question}\n\n"));
        }
        out.push_str(&format!("**Ground Truth**: {}\n\n", record.ground_truth));
        out.push_str(&format!("**Prediction**: {}\n\n", record.prediction));
        out.push_str(&format!(
            "**Normalized**: {} vs {}\n\n",
            record.normalized_ground_truth, record.normalized_prediction
        ));
        out.push_str(&format!("**Category**: {}\n\n", record.category));
        if let Some(analysis) = &record.error_analysis {
            out.push_str(&format!("**Error Analysis**: {}\n\n", analysis.message));
        }
        out.push_str("---\n\n");
    }
}

/// Render a compact console summary.
pub fn console_summary(summary: &EvalSummary, ctx: &ReportContext) -> String {
    let mut out = String::new();
    out.push_str("===== Evaluation Results Summary =====\n");
    out.push_str(&format!("Total examples evaluated: {}\n", summary.total));
    out.push_str(&format!("Accuracy: {:.2}%\n", summary.accuracy));
    out.push_str(&format!("Exact match rate: {:.2}%\n", summary.exact_match_rate));
    if let Some(mape) = summary.mape {
        out.push_str(&format!("MAPE: {mape:.2}%\n"));
    }

    if let Some(types) = &ctx.question_types {
        out.push_str("\nPerformance by question type:\n");
        let mut entries: Vec<_> = types.iter().collect();
        entries.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(b.0)));
        for (name, stats) in entries {
            out.push_str(&format!(
                "  {name}: {:.2}% ({}/{})\n",
                stats.accuracy, stats.correct, stats.count
            ));
        }
    }

    if !summary.error_distribution.is_empty() {
        out.push_str("\nCommon error types:\n");
        let mut errors: Vec<_> = summary.error_distribution.iter().collect();
        errors.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (error_type, count) in errors.iter().take(5) {
            out.push_str(&format!("  {error_type}: {count} occurrences\n"));
        }
    }

    if let Some(usage) = &ctx.token_usage {
        out.push_str("\nToken usage:\n");
        out.push_str(&format!("  Prompt tokens: {}\n", usage.prompt_tokens));
        out.push_str(&format!("  Completion tokens: {}\n", usage.completion_tokens));
        out.push_str(&format!("  Total tokens: {}\n", usage.total_tokens));
        if let Some(cost) = &ctx.cost {
            out.push_str(&format!("  Estimated cost: ${:.4}\n", cost.total_cost));
        }
    }

    out.push_str(&"=".repeat(40));
    out.push('\n');
    out
}

/// Simplified JSON view of a run, with detail records truncated to a sample.
pub fn simplified_json(summary: &EvalSummary, ctx: &ReportContext) -> serde_json::Value {
    let sample: Vec<&EvalRecord> = summary.details.iter().take(JSON_SAMPLE_SIZE).collect();
    json!({
        "evaluation_id": ctx.evaluation_id,
        "model": ctx.model,
        "total": summary.total,
        "correct": summary.correct,
        "exact_match": summary.exact_match,
        "close_match": summary.close_match,
        "incorrect": summary.incorrect,
        "accuracy": summary.accuracy,
        "exact_match_rate": summary.exact_match_rate,
        "mape": summary.mape,
        "error_distribution": summary.error_distribution,
        "difficulty_bins": summary.difficulty_bins,
        "confusion_matrix": summary.confusion_matrix,
        "response_time": summary.response_time,
        "question_types": ctx.question_types,
        "token_usage": ctx.token_usage,
        "cost": ctx.cost,
        "sample_details": sample,
    })
}

/// Save markdown and JSON reports, returning their paths.
pub fn save_report(
    summary: &EvalSummary,
    ctx: &ReportContext,
    dir: &Path,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)?;

    let md_path = dir.join(format!("finqa_evaluation_{}.md", ctx.evaluation_id));
    fs::write(&md_path, render_markdown(summary, ctx))?;

    let json_path = dir.join(format!("finqa_results_{}.json", ctx.evaluation_id));
    let value = simplified_json(summary, ctx);
    fs::write(&json_path, serde_json::to_string_pretty(&value)?)?;

    log::info!(
        "Saved evaluation report to {} and {}",
        md_path.display(),
        json_path.display()
    );
    Ok((md_path, json_path))
}
