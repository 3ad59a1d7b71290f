// crates/geotrust-core/src/runtime/comparator.rs
// ============================================================================
// Module: GeoTrust Comparator Logic
// Description: SLO comparator evaluation and system status classification.
// Purpose: Convert metric values into tri-state SLO outcomes, never errors.
// Dependencies: crate::domain::{slo, snapshot}
// ============================================================================

//! ## Overview
//! Comparator evaluation converts a measured metric into a tri-state outcome.
//! A missing metric yields `Unknown` to preserve fail-closed behavior; an
//! evaluation pass never raises an error. Equality is exact: a verification
//! rate of 97.3 against a target of 100 with operator `=` is a plain `Fail`,
//! not a near-miss.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::domain::slo::MetricSet;
use crate::domain::slo::SloDefinition;
use crate::domain::slo::SloOperator;
use crate::domain::slo::SloResult;
use crate::domain::slo::SloStatus;
use crate::domain::snapshot::SystemStatus;
use crate::domain::snapshot::ViolationCounts;

// ============================================================================
// SECTION: SLO Evaluation
// ============================================================================

/// Evaluates one SLO definition against the collected metrics.
#[must_use]
pub fn evaluate_slo(definition: &SloDefinition, metrics: &MetricSet) -> SloResult {
    let current = metrics.value(definition.metric);
    let status = match current {
        None => SloStatus::Unknown,
        Some(value) => {
            if compare(definition.operator, value, definition.target_value) {
                SloStatus::Pass
            } else {
                SloStatus::Fail
            }
        }
    };
    SloResult {
        name: definition.name.clone(),
        current,
        target: definition.target_value,
        operator: definition.operator,
        status,
        severity: definition.severity,
    }
}

/// Applies a comparison operator to current and target values.
fn compare(operator: SloOperator, current: f64, target: f64) -> bool {
    match operator {
        SloOperator::Equal => current == target,
        SloOperator::NotEqual => current != target,
        SloOperator::GreaterOrEqual => current >= target,
        SloOperator::LessOrEqual => current <= target,
        SloOperator::Greater => current > target,
        SloOperator::Less => current < target,
    }
}

// ============================================================================
// SECTION: Status Classification
// ============================================================================

/// Classifies system health from the verification rate and violation counts.
///
/// HEALTHY requires a 100% verification rate and zero violations in every
/// zero-tolerance category. CRITICAL trips on any zero-tolerance violation or
/// a rate below `critical_rate_floor`. Everything in between is DEGRADED.
#[must_use]
pub fn classify_system_status(
    verification_rate: f64,
    violations: &ViolationCounts,
    critical_rate_floor: f64,
) -> SystemStatus {
    if violations.zero_tolerance_total() > 0 || verification_rate < critical_rate_floor {
        return SystemStatus::Critical;
    }
    if verification_rate >= 100.0 {
        SystemStatus::Healthy
    } else {
        SystemStatus::Degraded
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        reason = "Test-only assertions and helpers are permitted."
    )]

    use super::*;
    use crate::domain::identifiers::SloName;
    use crate::domain::slo::MetricKey;
    use crate::domain::slo::SloSeverity;

    fn definition(operator: SloOperator, target: f64, metric: MetricKey) -> SloDefinition {
        SloDefinition {
            name: SloName::new("verification_rate"),
            description: "all transactions verified".to_string(),
            metric,
            target_value: target,
            operator,
            severity: SloSeverity::Critical,
            enabled: true,
            grace_period_minutes: 60,
        }
    }

    #[test]
    fn equality_target_fails_on_partial_rate() {
        let metrics = MetricSet {
            verification_rate: 97.3,
            ..MetricSet::default()
        };
        let result =
            evaluate_slo(&definition(SloOperator::Equal, 100.0, MetricKey::VerificationRate), &metrics);
        assert_eq!(result.status, SloStatus::Fail);
        assert_eq!(result.current, Some(97.3));
    }

    #[test]
    fn missing_metric_resolves_unknown() {
        let metrics = MetricSet::default();
        let result = evaluate_slo(
            &definition(SloOperator::LessOrEqual, 60.0, MetricKey::SnapshotAgeMinutes),
            &metrics,
        );
        assert_eq!(result.status, SloStatus::Unknown);
        assert_eq!(result.current, None);
    }

    #[test]
    fn ordering_operators_hold() {
        let metrics = MetricSet {
            unknown_count: 3.0,
            ..MetricSet::default()
        };
        let le = definition(SloOperator::LessOrEqual, 3.0, MetricKey::UnknownCount);
        let lt = definition(SloOperator::Less, 3.0, MetricKey::UnknownCount);
        assert_eq!(evaluate_slo(&le, &metrics).status, SloStatus::Pass);
        assert_eq!(evaluate_slo(&lt, &metrics).status, SloStatus::Fail);
    }

    #[test]
    fn zero_tolerance_violation_is_critical() {
        let violations = ViolationCounts {
            false_verified: 1,
            ..ViolationCounts::default()
        };
        assert_eq!(classify_system_status(100.0, &violations, 90.0), SystemStatus::Critical);
    }

    #[test]
    fn partial_rate_without_violations_is_degraded() {
        let violations = ViolationCounts::default();
        assert_eq!(classify_system_status(97.3, &violations, 90.0), SystemStatus::Degraded);
    }

    #[test]
    fn rate_below_floor_is_critical() {
        let violations = ViolationCounts::default();
        assert_eq!(classify_system_status(42.0, &violations, 90.0), SystemStatus::Critical);
    }

    #[test]
    fn full_rate_without_violations_is_healthy() {
        let violations = ViolationCounts::default();
        assert_eq!(classify_system_status(100.0, &violations, 90.0), SystemStatus::Healthy);
    }
}
