// crates/geotrust-engine/src/monitor.rs
// ============================================================================
// Module: SLO Monitoring Engine
// Description: Metric collection, SLO evaluation, snapshots, and alerts.
// Purpose: Turn dataset reads into SLO outcomes, snapshots, and alerts.
// Dependencies: geotrust-core
// ============================================================================

//! ## Overview
//! Evaluation never fails: metrics that cannot be computed resolve the SLO to
//! `Unknown`. Snapshot capture collects metrics and classifies system status
//! from one consistent dataset read, then appends the immutable row. Alert
//! generation deduplicates per SLO inside each definition's grace period via
//! the store's atomic check-and-insert, and auto-resolves open alerts whose
//! SLO passes again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use geotrust_core::Alert;
use geotrust_core::AlertId;
use geotrust_core::AlertState;
use geotrust_core::MetricSet;
use geotrust_core::OperatorId;
use geotrust_core::SloResult;
use geotrust_core::SloStatus;
use geotrust_core::VerificationSnapshot;
use geotrust_core::VerificationStore;
use geotrust_core::ViolationCounts;
use geotrust_core::ViolationReport;
use geotrust_core::classify_system_status;
use geotrust_core::evaluate_slo;
use serde::Deserialize;
use serde::Serialize;

use crate::engine::EngineError;
use crate::engine::VerificationEngine;
use crate::integrity;

// ============================================================================
// SECTION: Results
// ============================================================================

/// Rows purged by one retention cleanup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CleanupStats {
    /// Snapshot rows removed.
    pub snapshots_purged: u64,
    /// Resolved alert rows removed.
    pub alerts_purged: u64,
}

/// Metrics plus the violation reports they were derived from.
pub(crate) struct CollectedMetrics {
    /// Metric values for SLO evaluation.
    pub metrics: MetricSet,
    /// Per-category violation counts.
    pub violations: ViolationCounts,
    /// Full violation reports.
    #[allow(dead_code, reason = "carried alongside derived counts; not read yet")]
    pub reports: Vec<ViolationReport>,
    /// Aggregate projection counts.
    pub counts: geotrust_core::ProjectionCounts,
}

// ============================================================================
// SECTION: Engine Surface
// ============================================================================

impl<S: VerificationStore> VerificationEngine<S> {
    /// Collects every metric from one consistent dataset read.
    pub(crate) fn collect_metrics(&self) -> Result<CollectedMetrics, EngineError> {
        let dataset = self.store().verification_dataset()?;
        let reports = integrity::run_checks(&dataset, &self.trust_domain().bounds, self.now());
        let violations = integrity::counts_from_reports(&reports);
        let counts = dataset.counts;
        let verification_rate = if counts.total == 0 {
            100.0
        } else {
            (counts.verified as f64 / counts.total as f64) * 100.0
        };
        let snapshot_age_minutes = self
            .store()
            .latest_snapshot()?
            .map(|snapshot| self.now().minutes_since(snapshot.captured_at) as f64);
        let metrics = MetricSet {
            total_transactions: counts.total as f64,
            verification_rate,
            unknown_count: counts.unknown as f64,
            false_verified_count: violations.false_verified as f64,
            sentinel_leakage_count: violations.sentinel_leakage as f64,
            stale_municipality_count: violations.stale_municipality as f64,
            shape_violation_count: violations.shape_violation as f64,
            bounds_violation_count: violations.bounds_violation as f64,
            snapshot_age_minutes,
        };
        Ok(CollectedMetrics {
            metrics,
            violations,
            reports,
            counts,
        })
    }

    /// Evaluates every enabled SLO against current metrics.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when metric collection fails; the
    /// evaluation itself never errors.
    pub fn evaluate_slos(&self) -> Result<Vec<SloResult>, EngineError> {
        let collected = self.collect_metrics()?;
        Ok(self
            .slo_definitions()
            .iter()
            .map(|definition| evaluate_slo(definition, &collected.metrics))
            .collect())
    }

    /// Captures and appends an immutable verification snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the read or append fails.
    pub fn capture_snapshot(&self) -> Result<VerificationSnapshot, EngineError> {
        let collected = self.collect_metrics()?;
        let system_status = classify_system_status(
            collected.metrics.verification_rate,
            &collected.violations,
            self.settings().critical_rate_floor,
        );
        let mut slo_statuses = BTreeMap::new();
        for definition in self.slo_definitions() {
            let result = evaluate_slo(definition, &collected.metrics);
            slo_statuses.insert(result.name, result.status);
        }
        let snapshot = VerificationSnapshot {
            captured_at: self.now(),
            total: collected.counts.total,
            verified: collected.counts.verified,
            unknown: collected.counts.unknown,
            violations: collected.violations,
            system_status,
            slo_statuses,
        };
        self.store().append_snapshot(&snapshot)?;
        Ok(snapshot)
    }

    /// Generates alerts for failing SLOs and auto-resolves passing ones.
    ///
    /// Failing SLOs with an unresolved alert inside their grace period are
    /// suppressed by the store's atomic check-and-insert. SLOs that pass
    /// again resolve their open alerts automatically.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when evaluation or a write fails.
    pub fn generate_alerts(&self) -> Result<Vec<Alert>, EngineError> {
        let collected = self.collect_metrics()?;
        let now = self.now();
        let mut created = Vec::new();
        for definition in self.slo_definitions() {
            let result = evaluate_slo(definition, &collected.metrics);
            match result.status {
                SloStatus::Fail => {
                    let alert = Alert {
                        alert_id: AlertId::new(format!(
                            "alert-{}-{}",
                            definition.name,
                            now.as_unix_millis()
                        )),
                        slo_name: definition.name.clone(),
                        triggered_at: now,
                        current_value: result.current,
                        target_value: definition.target_value,
                        severity: definition.severity,
                        message: Alert::render_message(
                            &definition.name,
                            result.current,
                            definition.operator,
                            definition.target_value,
                        ),
                        state: AlertState::Open,
                        acknowledged_by: None,
                        acknowledged_at: None,
                        resolved_at: None,
                    };
                    let window_start = now.minutes_before(definition.grace_period_minutes);
                    if self.store().insert_alert_if_absent(&alert, window_start)? {
                        created.push(alert);
                    }
                }
                SloStatus::Pass => {
                    self.store().resolve_alerts_for_slo(&definition.name, now)?;
                }
                SloStatus::Unknown => {}
            }
        }
        Ok(created)
    }

    /// Acknowledges an open alert with an operator identity.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] with `NotFound` for a missing alert or
    /// `Invalid` for an illegal lifecycle transition.
    pub fn acknowledge_alert(
        &self,
        alert_id: &AlertId,
        operator: &OperatorId,
    ) -> Result<Alert, EngineError> {
        Ok(self.store().acknowledge_alert(alert_id, operator, self.now())?)
    }

    /// Resolves an unresolved alert manually.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] with `NotFound` for a missing alert or
    /// `Invalid` for an illegal lifecycle transition.
    pub fn resolve_alert(&self, alert_id: &AlertId) -> Result<Alert, EngineError> {
        Ok(self.store().resolve_alert(alert_id, self.now())?)
    }

    /// Purges snapshots and resolved alerts older than the retention window.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when a purge fails.
    pub fn cleanup(&self, retention_days: u32) -> Result<CleanupStats, EngineError> {
        let minutes = retention_days.saturating_mul(24 * 60);
        let cutoff = self.now().minutes_before(minutes);
        Ok(CleanupStats {
            snapshots_purged: self.store().purge_snapshots_before(cutoff)?,
            alerts_purged: self.store().purge_resolved_alerts_before(cutoff)?,
        })
    }
}
