//! Property tests for normalization and aggregation invariants.

use finqa::eval::metrics::{accuracy, f1_score, mape};
use finqa::{normalize_answer, Evaluator, MatchCategory};
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalize_is_idempotent(answer in "[ -~]{0,40}") {
        let once = normalize_answer(&answer);
        let twice = normalize_answer(&once);
        prop_assert_eq!(&twice, &once, "normalize not idempotent for {:?}", answer);
    }

    #[test]
    fn normalized_percent_has_one_decimal(value in -1000.0f64..1000.0) {
        let normalized = normalize_answer(&format!("{value}%"));
        prop_assert!(normalized.ends_with('%'));
        let digits_after_dot = normalized
            .trim_end_matches('%')
            .rsplit('.')
            .next()
            .map(str::len);
        prop_assert_eq!(digits_after_dot, Some(1));
    }

    #[test]
    fn identical_strings_are_exact_matches(answer in "[ -~]{1,40}") {
        let ground_truths = vec![answer.clone()];
        let predictions = vec![answer.clone()];
        let summary = Evaluator::default()
            .evaluate(&ground_truths, &predictions, None, None)
            .unwrap();
        prop_assert_eq!(summary.details[0].category, MatchCategory::ExactMatch);
        prop_assert_eq!(summary.correct, 1);
    }

    #[test]
    fn accuracy_is_bounded(correct in 0usize..100, extra in 0usize..100) {
        let total = correct + extra;
        let value = accuracy(correct, total);
        prop_assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn f1_is_bounded(precision in 0.0f64..=1.0, recall in 0.0f64..=1.0) {
        let value = f1_score(precision, recall);
        prop_assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn mape_is_non_negative(pairs in prop::collection::vec((-1e6f64..1e6, -1e6f64..1e6), 0..20)) {
        if let Some(value) = mape(&pairs) {
            prop_assert!(value >= 0.0);
        }
    }

    #[test]
    fn summary_counts_are_consistent(
        pairs in prop::collection::vec(("[ -~]{0,20}", "[ -~]{0,20}"), 1..20)
    ) {
        let ground_truths: Vec<String> = pairs.iter().map(|(gt, _)| gt.clone()).collect();
        let predictions: Vec<String> = pairs.iter().map(|(_, pred)| pred.clone()).collect();

        let summary = Evaluator::default()
            .evaluate(&ground_truths, &predictions, None, None)
            .unwrap();

        prop_assert_eq!(summary.total, pairs.len());
        prop_assert_eq!(
            summary.exact_match + summary.close_match + summary.incorrect,
            summary.total
        );
        prop_assert_eq!(summary.correct, summary.exact_match + summary.close_match);
        prop_assert_eq!(summary.details.len(), summary.total);
        // Every incorrect record carries exactly one error analysis.
        for record in &summary.details {
            prop_assert_eq!(
                record.error_analysis.is_some(),
                record.category == MatchCategory::Incorrect
            );
        }
        prop_assert!((0.0..=100.0).contains(&summary.accuracy));
    }
}
