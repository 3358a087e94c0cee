// crates/perf-gate-core/tests/proptest_properties.rs
// ============================================================================
// Module: Property-Based Tests
// Description: Invariants of normalization, percentiles, diffs, and verdicts.
// Purpose: Exercise invariants over generated inputs.
// Dependencies: perf-gate-core, proptest
// ============================================================================
//! ## Overview
//! Invariants of normalization, percentiles, diffs, and verdicts.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::float_cmp,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use common::REPORT;
use common::report_with;
use perf_gate_core::ConstraintEvaluation;
use perf_gate_core::ConstraintId;
use perf_gate_core::ConstraintVerdict;
use perf_gate_core::Escalation;
use perf_gate_core::LabelKey;
use perf_gate_core::MetricDelta;
use perf_gate_core::Percentile;
use perf_gate_core::aggregate;
use perf_gate_core::normalize_label;
use proptest::prelude::*;

/// Strategy over escalations.
fn escalation() -> impl Strategy<Value = Escalation> {
    prop_oneof![Just(Escalation::Info), Just(Escalation::Warning), Just(Escalation::Error)]
}

/// Builds an evaluated verdict.
fn verdict(index: usize, success: bool, escalation: Escalation) -> ConstraintVerdict {
    ConstraintVerdict::Evaluated(ConstraintEvaluation {
        constraint_id: ConstraintId::new(format!("c{index}")),
        label: None,
        measured_value: 0.0,
        constraint_value: 0.0,
        reference_value: None,
        success,
        escalation,
    })
}

proptest! {
    #[test]
    fn normalization_is_idempotent(raw in "[a-z:/\\\\.]{0,24}") {
        let once = normalize_label(&raw);
        prop_assert_eq!(normalize_label(&once), once.clone());
        prop_assert!(!once.contains('/'));
        prop_assert!(!once.contains('\\'));
        prop_assert!(!once.contains("http:"));
    }

    #[test]
    fn protocol_and_separator_variants_share_a_key(path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
        let plain = LabelKey::normalize(&format!("//{path}"));
        prop_assert_eq!(LabelKey::normalize(&format!("http://{path}")), plain.clone());
        prop_assert_eq!(LabelKey::normalize(&format!("https://{path}")), plain.clone());
        let windows = format!("\\\\{}", path.replace('/', "\\"));
        prop_assert_eq!(LabelKey::normalize(&windows), plain);
    }

    #[test]
    fn extreme_percentiles_are_min_and_max(
        durations in prop::collection::vec(0_u64 .. 100_000, 1 .. 64),
    ) {
        let report = report_with(REPORT, &[("Login", durations.as_slice())]);
        let label = report.label_by_name("Login").unwrap();
        let min = durations.iter().copied().min().unwrap();
        let max = durations.iter().copied().max().unwrap();

        prop_assert_eq!(label.value_at(Percentile::MIN), f64::from(u32::try_from(min).unwrap()));
        prop_assert_eq!(label.value_at(Percentile::MAX), f64::from(u32::try_from(max).unwrap()));
        prop_assert!(label.median() <= label.percentile_90());
        prop_assert!(report.min() <= report.median());
    }

    #[test]
    fn any_percentage_selects_the_floor_index(
        durations in prop::collection::vec(0_u64 .. 100_000, 1 .. 256),
        percent in 0.0_f64 ..= 100.0,
    ) {
        let report = report_with(REPORT, &[("Login", durations.as_slice())]);
        let mut sorted = durations.clone();
        sorted.sort_unstable();
        let count = sorted.len();
        let rank = (count as f64 * percent / 100.0).floor() as usize;
        let expected = sorted[rank.saturating_sub(1).min(count - 1)];

        prop_assert_eq!(report.duration_at(percent).unwrap(), expected as f64);
    }

    #[test]
    fn diff_without_baseline_is_zero(durations in prop::collection::vec(1_u64 .. 10_000, 0 .. 32)) {
        let report = report_with(REPORT, &[("Login", durations.as_slice())]);
        prop_assert_eq!(report.diff(), MetricDelta::zero());
    }

    #[test]
    fn appending_verdicts_never_improves_outcome(
        head in prop::collection::vec((any::<bool>(), escalation()), 0 .. 16),
        tail in prop::collection::vec((any::<bool>(), escalation()), 0 .. 16),
    ) {
        let head_verdicts: Vec<ConstraintVerdict> = head
            .iter()
            .enumerate()
            .map(|(index, (success, level))| verdict(index, *success, *level))
            .collect();
        let mut all = head_verdicts.clone();
        all.extend(
            tail.iter()
                .enumerate()
                .map(|(index, (success, level))| verdict(head.len() + index, *success, *level)),
        );
        let before = aggregate(&head_verdicts).outcome;
        let after = aggregate(&all).outcome;
        prop_assert!(after >= before);

        let mut with_passes = head_verdicts.clone();
        with_passes.push(verdict(head.len(), true, Escalation::Error));
        prop_assert_eq!(aggregate(&with_passes).outcome, before);
    }
}
