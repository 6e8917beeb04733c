//! finqa - Financial QA evaluation CLI
//!
//! Offline scoring for financial QA predictions: load a dataset, align a
//! predictions file against its valid examples, and produce accuracy,
//! error-taxonomy, and timing metrics.
//!
//! # Usage
//!
//! ```bash
//! # Score predictions against a dataset
//! finqa eval --data train.json --predictions preds.json
//!
//! # Custom tolerance, capped at 50 examples, with saved reports
//! finqa eval --data train.json --predictions preds.json \
//!     --limit 50 --tolerance 0.02 --report-dir outputs/reports
//!
//! # Show build information
//! finqa info
//! ```
//!
//! Predictions are a JSON array, each element either a bare answer string or
//! an object `{"answer": "...", "processing_time": 1.2}`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use finqa::config::{EvalConfig, DEFAULT_TOLERANCE};
use finqa::dataset::{load_dataset, valid_examples};
use finqa::eval::question_types::{question_type_stats, QuestionTypeTable};
use finqa::eval::report;
use finqa::eval::report::ReportContext;
use finqa::eval::Evaluator;
use finqa::{Error, Result};

// ============================================================================
// CLI Structure
// ============================================================================

/// Financial QA evaluation - normalization, tolerance scoring, error taxonomy
#[derive(Parser)]
#[command(name = "finqa")]
#[command(
    author,
    version,
    about = "Financial QA evaluation - normalization, tolerance scoring, error taxonomy",
    long_about = r#"
finqa - answer evaluation for financial question answering

CAPABILITIES:
  - Normalize free-form answers (percentages, currency, plain numbers, text)
  - Judge predictions against references with numeric tolerance
  - Categorize errors (calculation magnitude, formatting, units, sign)
  - Aggregate accuracy, MAPE, difficulty bins, response-time percentiles

EXAMPLES:
  finqa eval --data train.json --predictions preds.json
  finqa eval --data train.json --predictions preds.json --format json
  finqa info
"#
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate predictions against a dataset's reference answers
    #[command(visible_alias = "e")]
    Eval(EvalArgs),

    /// Show version and build information
    Info,
}

#[derive(Args)]
struct EvalArgs {
    /// Path to the QA dataset (JSON array of documents)
    #[arg(short, long)]
    data: PathBuf,

    /// Path to predictions (JSON array of strings or answer records)
    #[arg(short, long)]
    predictions: PathBuf,

    /// Evaluate at most N examples
    #[arg(short, long)]
    limit: Option<usize>,

    /// Relative tolerance for numeric comparison
    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Directory to write markdown and JSON reports into
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Model name recorded in reports
    #[arg(long)]
    model: Option<String>,

    /// Console output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Simplified JSON
    Json,
    /// Full markdown report
    Markdown,
}

/// One entry in the predictions file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictionEntry {
    /// Bare answer string.
    Answer(String),
    /// Answer with optional timing metadata.
    Detailed {
        answer: String,
        #[serde(default)]
        processing_time: Option<f64>,
    },
}

impl PredictionEntry {
    fn answer(&self) -> &str {
        match self {
            PredictionEntry::Answer(answer) => answer,
            PredictionEntry::Detailed { answer, .. } => answer,
        }
    }

    fn processing_time(&self) -> Option<f64> {
        match self {
            PredictionEntry::Answer(_) => None,
            PredictionEntry::Detailed { processing_time, .. } => *processing_time,
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn run_eval(args: &EvalArgs) -> Result<()> {
    let documents = load_dataset(&args.data)?;
    let mut examples = valid_examples(&documents);
    if let Some(limit) = args.limit {
        examples.truncate(limit);
    }
    if examples.is_empty() {
        return Err(Error::dataset("no valid examples with qa/question/answer"));
    }

    let contents = std::fs::read_to_string(&args.predictions)?;
    let entries: Vec<PredictionEntry> = serde_json::from_str(&contents)?;
    if entries.len() != examples.len() {
        return Err(Error::invalid_input(format!(
            "{} predictions for {} examples; counts must match",
            entries.len(),
            examples.len()
        )));
    }

    let mut ground_truths = Vec::with_capacity(examples.len());
    let mut questions = Vec::with_capacity(examples.len());
    for example in &examples {
        // Presence is guaranteed by valid_examples.
        let Some(qa) = &example.qa else { continue };
        ground_truths.push(qa.answer.clone());
        questions.push(qa.question.clone());
    }
    let predictions: Vec<String> = entries.iter().map(|e| e.answer().to_string()).collect();

    // Use timings only when every entry carries one; a partial vector would
    // misalign the percentile statistics.
    let times: Option<Vec<f64>> = entries
        .iter()
        .map(PredictionEntry::processing_time)
        .collect();

    let evaluator = Evaluator::new(EvalConfig {
        tolerance: args.tolerance,
        limit: args.limit,
    });
    let summary = evaluator.evaluate(
        &ground_truths,
        &predictions,
        Some(&questions),
        times.as_deref(),
    )?;

    let question_types = question_type_stats(&QuestionTypeTable::default(), &summary.details);
    let mut ctx = ReportContext::new();
    ctx.question_types = Some(question_types);
    if let Some(model) = &args.model {
        ctx.model = Some(model.clone());
    }

    match args.format {
        OutputFormat::Text => print!("{}", report::console_summary(&summary, &ctx)),
        OutputFormat::Json => {
            let value = report::simplified_json(&summary, &ctx);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Markdown => print!("{}", report::render_markdown(&summary, &ctx)),
    }

    if let Some(dir) = &args.report_dir {
        let (md_path, json_path) = report::save_report(&summary, &ctx, dir)?;
        eprintln!("Report saved to: {}", md_path.display());
        eprintln!("Results saved to: {}", json_path.display());
    }

    Ok(())
}

fn run_info() {
    println!("finqa {}", env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("Default numeric tolerance: {DEFAULT_TOLERANCE}");
    println!("Match categories: exact_match, close_match, incorrect");
    println!("Difficulty levels: simple, moderate, complex");
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Eval(args) => run_eval(args),
        Commands::Info => {
            run_info();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
