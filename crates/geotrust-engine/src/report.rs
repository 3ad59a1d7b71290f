// crates/geotrust-engine/src/report.rs
// ============================================================================
// Module: Reporting Surface
// Description: Read-only report models for dashboards and operators.
// Purpose: Summarize verification state without mutating anything.
// Dependencies: geotrust-core, serde
// ============================================================================

//! ## Overview
//! Read-only views consumed by dashboards and the CLI. Reports are computed
//! from the same consistent dataset read the integrity engine uses, so the
//! totals in a report always agree with the violations printed beside them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use geotrust_core::SloResult;
use geotrust_core::StoreId;
use geotrust_core::SystemStatus;
use geotrust_core::Timestamp;
use geotrust_core::VerificationStore;
use geotrust_core::ViolationCategory;
use geotrust_core::ViolationReport;
use geotrust_core::classify_system_status;
use geotrust_core::evaluate_slo;
use serde::Deserialize;
use serde::Serialize;

use crate::engine::EngineError;
use crate::engine::VerificationEngine;

// ============================================================================
// SECTION: Report Models
// ============================================================================

/// Per-store verification breakdown inside a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreVerificationRow {
    /// Store identifier.
    pub store_id: StoreId,
    /// Registry store name, when the store is mapped.
    pub store_name: Option<String>,
    /// Registry municipality, when the store is mapped.
    pub municipality: Option<String>,
    /// Projections referencing the store.
    pub total: u64,
    /// Verified projections referencing the store.
    pub verified: u64,
}

/// Full verification report for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Report generation timestamp.
    pub generated_at: Timestamp,
    /// Total projections.
    pub total: u64,
    /// Verified projections.
    pub verified: u64,
    /// Sentinel projections.
    pub unknown: u64,
    /// Verification rate percentage (0-100).
    pub verification_rate: f64,
    /// Per-store breakdown, ordered by store identifier.
    pub stores: Vec<StoreVerificationRow>,
    /// One violation report per category.
    pub violations: Vec<ViolationReport>,
}

/// Condensed health view for operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    /// Summary generation timestamp.
    pub generated_at: Timestamp,
    /// Classified system status.
    pub system_status: SystemStatus,
    /// Verification rate percentage (0-100).
    pub verification_rate: f64,
    /// Unresolved alert count.
    pub open_alerts: u64,
    /// Capture time of the most recent snapshot, when history exists.
    pub latest_snapshot_at: Option<Timestamp>,
    /// Current SLO evaluation results.
    pub slo_results: Vec<SloResult>,
}

/// One point in a verification trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Snapshot capture time.
    pub captured_at: Timestamp,
    /// Verification rate at capture.
    pub verification_rate: f64,
    /// Total projections at capture.
    pub total: u64,
    /// System status at capture.
    pub system_status: SystemStatus,
}

// ============================================================================
// SECTION: Engine Surface
// ============================================================================

impl<S: VerificationStore> VerificationEngine<S> {
    /// Builds the full verification report from one consistent read.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the dataset read fails.
    pub fn verification_report(&self) -> Result<VerificationReport, EngineError> {
        let dataset = self.store().verification_dataset()?;
        let now = self.now();
        let reports = crate::integrity::run_checks(&dataset, &self.trust_domain().bounds, now);
        let mut per_store: BTreeMap<StoreId, StoreVerificationRow> = BTreeMap::new();
        for entry in &dataset.entries {
            per_store.insert(
                entry.store_id,
                StoreVerificationRow {
                    store_id: entry.store_id,
                    store_name: Some(entry.store_name.clone()),
                    municipality: Some(entry.municipality.clone()),
                    total: 0,
                    verified: 0,
                },
            );
        }
        for row in &dataset.rows {
            let Some(store_id) = row.store_id else {
                continue;
            };
            let slot = per_store.entry(store_id).or_insert_with(|| StoreVerificationRow {
                store_id,
                store_name: None,
                municipality: None,
                total: 0,
                verified: 0,
            });
            slot.total = slot.total.saturating_add(1);
            if row.verified {
                slot.verified = slot.verified.saturating_add(1);
            }
        }
        let counts = dataset.counts;
        let verification_rate = if counts.total == 0 {
            100.0
        } else {
            (counts.verified as f64 / counts.total as f64) * 100.0
        };
        Ok(VerificationReport {
            generated_at: now,
            total: counts.total,
            verified: counts.verified,
            unknown: counts.unknown,
            verification_rate,
            stores: per_store.into_values().collect(),
            violations: reports,
        })
    }

    /// Builds the condensed operator health summary.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when a read fails.
    pub fn health_summary(&self) -> Result<HealthSummary, EngineError> {
        let collected = self.collect_metrics()?;
        let system_status = classify_system_status(
            collected.metrics.verification_rate,
            &collected.violations,
            self.settings().critical_rate_floor,
        );
        let slo_results = self
            .slo_definitions()
            .iter()
            .map(|definition| evaluate_slo(definition, &collected.metrics))
            .collect();
        let open_alerts =
            u64::try_from(self.store().unresolved_alerts()?.len()).unwrap_or(u64::MAX);
        let latest_snapshot_at =
            self.store().latest_snapshot()?.map(|snapshot| snapshot.captured_at);
        Ok(HealthSummary {
            generated_at: self.now(),
            system_status,
            verification_rate: collected.metrics.verification_rate,
            open_alerts,
            latest_snapshot_at,
            slo_results,
        })
    }

    /// Returns the snapshot trend series inside an inclusive time range.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the history read fails.
    pub fn trends(&self, from: Timestamp, to: Timestamp) -> Result<Vec<TrendPoint>, EngineError> {
        let snapshots = self.store().snapshots_between(from, to)?;
        Ok(snapshots
            .iter()
            .map(|snapshot| TrendPoint {
                captured_at: snapshot.captured_at,
                verification_rate: snapshot.verification_rate(),
                total: snapshot.total,
                system_status: snapshot.system_status,
            })
            .collect())
    }

    /// Returns the current violation report for one category.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the dataset read fails.
    pub fn violations(&self, category: ViolationCategory) -> Result<ViolationReport, EngineError> {
        let reports = self.check()?;
        reports.into_iter().find(|report| report.category == category).ok_or_else(|| {
            EngineError::Invalid(format!("no report computed for category {}", category.as_str()))
        })
    }
}
