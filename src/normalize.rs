//! Answer normalization and numeric comparison.
//!
//! Financial answers arrive in wildly different shapes: `"14.1%"`, `"0.141"`,
//! `"$1.2 million"`, `"1,200,000"`, or free text. Before any correctness
//! judgment, both sides are reduced to a canonical string form:
//!
//! - Percentages are formatted with exactly one decimal place (`"14.1%"`)
//! - Currency loses its symbol, separators, and unit words (`"$1.2 million"`
//!   becomes `"1.2"`)
//! - Plain numbers are rendered in canonical decimal form
//! - Free text is lowercased, stripped of punctuation, and whitespace-collapsed
//!
//! Normalization is total and pure: every input (including the empty string)
//! produces a defined output, and normalizing twice yields the same string.
//!
//! # Example
//!
//! ```rust
//! use finqa::normalize::{normalize_answer, numerically_close};
//!
//! assert_eq!(normalize_answer("14.10%"), "14.1%");
//! assert_eq!(normalize_answer("$1,200,000"), "1200000");
//! assert!(numerically_close("14.1%", "0.141", 0.01));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// First signed decimal number: optional minus, digits, optional decimal part.
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+\.?\d*").unwrap());

/// Currency unit words stripped during normalization.
static UNIT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(million|billion|thousand|m|b|k)\b").unwrap());

static PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize an answer string for comparison.
///
/// Rules are applied in priority order: percentage, currency, plain numeric,
/// then generic text cleanup. Never fails; an empty input yields an empty
/// string.
pub fn normalize_answer(answer: &str) -> String {
    if answer.is_empty() {
        return String::new();
    }

    let mut s = answer.to_lowercase().trim().to_string();

    // Percentage answers: standardize to one decimal place.
    if s.contains('%') {
        if let Some(value) = extract_numeric_value(&s) {
            return format!("{value:.1}%");
        }
    }

    // Currency answers: strip symbol, thousands separators, and unit words.
    // The stripped form feeds the remaining rules when no number survives.
    if s.contains('$') {
        s = s.replace(['$', ','], "");
        s = UNIT_SUFFIX.replace_all(&s, "").into_owned();
        if let Some(value) = extract_numeric_value(&s) {
            return value.to_string();
        }
    }

    // Other numeric answers: canonical decimal form, or a percentage when the
    // magnitude fits and the text says so without the symbol.
    if let Some(value) = extract_numeric_value(&s) {
        if (0.0..=100.0).contains(&value) && (s.contains("percent") || s.contains("percentage")) {
            return format!("{value:.1}%");
        }
        return value.to_string();
    }

    // Free text: drop punctuation, collapse whitespace.
    let s = PUNCT.replace_all(&s, "");
    let s = WHITESPACE.replace_all(&s, " ");
    s.trim().to_string()
}

/// Whether the answer contains a numeric value.
pub fn is_numeric_answer(answer: &str) -> bool {
    NUMBER.is_match(answer)
}

/// Extract the first numeric value from text, if any.
///
/// Only the first match is used; later numbers in multi-number strings are
/// ignored.
pub fn extract_numeric_value(text: &str) -> Option<f64> {
    NUMBER.find(text).and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Whether two answers are numerically close under a relative tolerance.
///
/// Handles percent/fraction mismatches: `"14.1%"` and `"0.141"` are close
/// because the unmarked value times 100 matches the marked one. Extraction
/// failure on either side yields `false` (fail closed).
pub fn numerically_close(answer1: &str, answer2: &str, tolerance: f64) -> bool {
    let (val1, val2) = match (extract_numeric_value(answer1), extract_numeric_value(answer2)) {
        (Some(v1), Some(v2)) => (v1, v2),
        _ => return false,
    };

    let has_percent1 = answer1.contains('%');
    let has_percent2 = answer2.contains('%');

    // One side marked as a percentage: treat the other as a fraction of it.
    if has_percent1 && !has_percent2 {
        if (val1 - val2 * 100.0).abs() < tolerance * val1.abs() {
            return true;
        }
    } else if has_percent2 && !has_percent1 {
        if (val1 * 100.0 - val2).abs() < tolerance * val2.abs() {
            return true;
        }
    }

    // Both effectively zero: close, and avoids division by zero below.
    if val1.abs() < 1e-10 && val2.abs() < 1e-10 {
        return true;
    }

    let relative_diff = (val1 - val2).abs() / val1.abs().max(val2.abs());
    relative_diff <= tolerance
}
