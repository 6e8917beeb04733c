//! Scalar evaluation metrics.
//!
//! Small, pure building blocks consumed by the aggregator: accuracy,
//! F1, MAPE, confusion matrices, and response-time statistics. All of them
//! operate on complete input sequences; none maintain running state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Accuracy as a percentage; 0 when `total` is zero.
pub fn accuracy(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

/// Harmonic mean of precision and recall; 0 when both are zero.
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Mean Absolute Percentage Error over (ground truth, prediction) pairs.
///
/// Pairs whose ground-truth magnitude is at or below `1e-10` are excluded to
/// avoid division by zero. Returns `None` when no pair survives the filter.
pub fn mape(pairs: &[(f64, f64)]) -> Option<f64> {
    let errors: Vec<f64> = pairs
        .iter()
        .filter(|(gt, _)| gt.abs() > 1e-10)
        .map(|(gt, pred)| ((gt - pred) / gt).abs() * 100.0)
        .collect();
    if errors.is_empty() {
        None
    } else {
        Some(errors.iter().sum::<f64>() / errors.len() as f64)
    }
}

/// Confusion matrix over categorical labels.
///
/// Every cell over the union of observed categories is initialized to zero,
/// then populated by pairwise counts.
pub fn confusion_matrix(
    actual: &[String],
    predicted: &[String],
) -> HashMap<String, HashMap<String, usize>> {
    let mut categories: Vec<&String> = actual.iter().chain(predicted.iter()).collect();
    categories.sort();
    categories.dedup();

    let mut matrix: HashMap<String, HashMap<String, usize>> = HashMap::new();
    for a in &categories {
        let row = matrix.entry((*a).clone()).or_default();
        for p in &categories {
            row.insert((*p).clone(), 0);
        }
    }

    for (a, p) in actual.iter().zip(predicted.iter()) {
        if let Some(cell) = matrix.get_mut(a).and_then(|row| row.get_mut(p)) {
            *cell += 1;
        }
    }

    matrix
}

/// Response-time summary statistics, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimeStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// 50th percentile.
    pub median: f64,
    /// Fastest response.
    pub min: f64,
    /// Slowest response.
    pub max: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 95th percentile.
    pub p95: f64,
}

/// Compute response-time statistics; all zeros for an empty input.
pub fn response_time_stats(times: &[f64]) -> ResponseTimeStats {
    if times.is_empty() {
        return ResponseTimeStats::default();
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(f64::total_cmp);

    ResponseTimeStats {
        mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
        median: percentile(&sorted, 50.0),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        p90: percentile(&sorted, 90.0),
        p95: percentile(&sorted, 95.0),
    }
}

/// Linear-interpolation percentile over a sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
    }
}
