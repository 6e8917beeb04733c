//! Evaluation configuration and model pricing.
//!
//! The core configuration surface is intentionally small: a single relative
//! tolerance for numeric comparison plus an optional example limit. Pricing
//! data for cost estimation lives here as a static table so new models can be
//! added without touching control flow.

use serde::{Deserialize, Serialize};

use crate::generate::TokenUsage;

/// Default relative tolerance for numeric comparison (1%).
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Default number of examples evaluated when no limit is given.
pub const DEFAULT_EVAL_SAMPLE_SIZE: usize = 5;

/// Configuration for an evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Relative tolerance used by the numeric comparator.
    pub tolerance: f64,
    /// Maximum number of examples to evaluate (`None` = all).
    pub limit: Option<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            limit: None,
        }
    }
}

impl EvalConfig {
    /// Create a config with a custom tolerance.
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }
}

/// Per-1000-token pricing for a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Cost per 1000 prompt tokens, in USD.
    pub prompt_per_1k: f64,
    /// Cost per 1000 completion tokens, in USD.
    pub completion_per_1k: f64,
}

/// Known model pricing, cost per 1000 tokens in USD.
const PRICING: &[(&str, ModelPricing)] = &[
    (
        "gpt-4o",
        ModelPricing {
            prompt_per_1k: 0.0025,
            completion_per_1k: 0.01,
        },
    ),
    (
        "o1",
        ModelPricing {
            prompt_per_1k: 0.015,
            completion_per_1k: 0.06,
        },
    ),
    (
        "gpt-4.5-preview",
        ModelPricing {
            prompt_per_1k: 0.075,
            completion_per_1k: 0.15,
        },
    ),
    (
        "gpt-3.5-turbo",
        ModelPricing {
            prompt_per_1k: 0.0005,
            completion_per_1k: 0.0015,
        },
    ),
];

/// Look up pricing for a model, falling back to `gpt-4o` rates for
/// unknown models.
pub fn model_pricing(model: &str) -> ModelPricing {
    PRICING
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, p)| *p)
        .unwrap_or(PRICING[0].1)
}

/// Estimated cost of an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Cost attributed to prompt tokens.
    pub prompt_cost: f64,
    /// Cost attributed to completion tokens.
    pub completion_cost: f64,
    /// Total estimated cost.
    pub total_cost: f64,
    /// Currency of the estimate.
    pub currency: String,
}

/// Estimate cost from accumulated token usage and a pricing entry.
pub fn estimate_cost(usage: &TokenUsage, pricing: &ModelPricing) -> CostBreakdown {
    let prompt_cost = usage.prompt_tokens as f64 / 1000.0 * pricing.prompt_per_1k;
    let completion_cost = usage.completion_tokens as f64 / 1000.0 * pricing.completion_per_1k;
    CostBreakdown {
        prompt_cost,
        completion_cost,
        total_cost: prompt_cost + completion_cost,
        currency: "USD".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerance() {
        let config = EvalConfig::default();
        assert!((config.tolerance - 0.01).abs() < f64::EPSILON);
        assert!(config.limit.is_none());
    }

    #[test]
    fn test_unknown_model_falls_back() {
        let pricing = model_pricing("some-future-model");
        assert_eq!(pricing, model_pricing("gpt-4o"));
    }

    #[test]
    fn test_cost_estimation() {
        let usage = TokenUsage {
            prompt_tokens: 2000,
            completion_tokens: 1000,
            total_tokens: 3000,
        };
        let cost = estimate_cost(&usage, &model_pricing("gpt-4o"));
        assert!((cost.prompt_cost - 0.005).abs() < 1e-12);
        assert!((cost.completion_cost - 0.01).abs() < 1e-12);
        assert!((cost.total_cost - 0.015).abs() < 1e-12);
    }
}
