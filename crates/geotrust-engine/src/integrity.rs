// crates/geotrust-engine/src/integrity.rs
// ============================================================================
// Module: Integrity Assertion Engine
// Description: Read-only consistency checks over the verification dataset.
// Purpose: Detect projections and registry rows that contradict the rules.
// Dependencies: geotrust-core, serde_json
// ============================================================================

//! ## Overview
//! Five independent checks over one consistent dataset read: false-verified
//! projections, sentinel leakage, stale municipalities, schema shape
//! violations, and registry rows outside the trust-domain bounds. Violations
//! are derived on demand and surfaced in reports; nothing here mutates state,
//! and nothing auto-corrects; correction is an explicit onboarding run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use geotrust_core::BoundingBox;
use geotrust_core::Timestamp;
use geotrust_core::UNKNOWN_MUNICIPALITY;
use geotrust_core::VerificationDataset;
use geotrust_core::VerificationStore;
use geotrust_core::ViolationCategory;
use geotrust_core::ViolationCounts;
use geotrust_core::ViolationReport;
use geotrust_core::missing_top_level_fields;
use serde_json::Value;

use crate::engine::EngineError;
use crate::engine::RegistryIndex;
use crate::engine::VerificationEngine;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum affected identifiers sampled per violation report.
const MAX_AFFECTED_IDS: usize = 20;

// ============================================================================
// SECTION: Engine Surface
// ============================================================================

impl<S: VerificationStore> VerificationEngine<S> {
    /// Runs every integrity check over one consistent dataset read.
    ///
    /// Always returns one report per category, including zero counts.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when the dataset read fails.
    pub fn check(&self) -> Result<Vec<ViolationReport>, EngineError> {
        let dataset = self.store().verification_dataset()?;
        Ok(run_checks(&dataset, &self.trust_domain().bounds, self.now()))
    }
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Runs every check against an already-loaded dataset.
pub(crate) fn run_checks(
    dataset: &VerificationDataset,
    bounds: &BoundingBox,
    detected_at: Timestamp,
) -> Vec<ViolationReport> {
    let index = RegistryIndex::new(dataset.entries.clone());
    let mut false_verified = Sample::new();
    let mut sentinel_leakage = Sample::new();
    let mut stale_municipality = Sample::new();
    let mut shape_violation = Sample::new();
    let mut bounds_violation = Sample::new();

    for row in &dataset.rows {
        let entry = row.store_id.and_then(|store_id| index.get(&store_id));
        if row.verified {
            let backed = entry.is_some_and(geotrust_core::StoreDimensionEntry::satisfies_verification);
            if !backed {
                false_verified.record(row.transaction_id.as_str());
            }
            if row.municipality == UNKNOWN_MUNICIPALITY {
                sentinel_leakage.record(row.transaction_id.as_str());
            }
            if let Some(entry) = entry
                && entry.municipality != row.municipality
            {
                stale_municipality.record(row.transaction_id.as_str());
            }
        }
        if !shape_holds(&row.projection_json) {
            shape_violation.record(row.transaction_id.as_str());
        }
    }
    for entry in &dataset.entries {
        let point_out = entry.point.as_ref().is_some_and(|point| !bounds.contains(point));
        let polygon_out = entry.polygon.as_ref().is_some_and(|polygon| !polygon.within(bounds));
        if point_out || polygon_out {
            bounds_violation.record(&entry.store_id.to_string());
        }
    }

    vec![
        false_verified.into_report(ViolationCategory::FalseVerified, detected_at),
        sentinel_leakage.into_report(ViolationCategory::SentinelLeakage, detected_at),
        stale_municipality.into_report(ViolationCategory::StaleMunicipality, detected_at),
        shape_violation.into_report(ViolationCategory::ShapeViolation, detected_at),
        bounds_violation.into_report(ViolationCategory::BoundsViolation, detected_at),
    ]
}

/// Collapses a report list into per-category counts.
pub(crate) fn counts_from_reports(reports: &[ViolationReport]) -> ViolationCounts {
    let mut counts = ViolationCounts::default();
    for report in reports {
        match report.category {
            ViolationCategory::FalseVerified => counts.false_verified = report.count,
            ViolationCategory::SentinelLeakage => counts.sentinel_leakage = report.count,
            ViolationCategory::StaleMunicipality => counts.stale_municipality = report.count,
            ViolationCategory::ShapeViolation => counts.shape_violation = report.count,
            ViolationCategory::BoundsViolation => counts.bounds_violation = report.count,
        }
    }
    counts
}

/// Returns true when the persisted payload carries every required field.
fn shape_holds(projection_json: &str) -> bool {
    match serde_json::from_str::<Value>(projection_json) {
        Ok(document) => missing_top_level_fields(&document).is_empty(),
        Err(_) => false,
    }
}

/// Violation accumulator with a bounded identifier sample.
struct Sample {
    /// Total violations observed.
    count: u64,
    /// First [`MAX_AFFECTED_IDS`] affected identifiers.
    ids: Vec<String>,
}

impl Sample {
    /// Creates an empty accumulator.
    const fn new() -> Self {
        Self {
            count: 0,
            ids: Vec::new(),
        }
    }

    /// Records one violation, sampling the identifier while room remains.
    fn record(&mut self, id: &str) {
        self.count = self.count.saturating_add(1);
        if self.ids.len() < MAX_AFFECTED_IDS {
            self.ids.push(id.to_string());
        }
    }

    /// Finishes the accumulator as a category report.
    fn into_report(self, category: ViolationCategory, detected_at: Timestamp) -> ViolationReport {
        ViolationReport {
            category,
            count: self.count,
            affected_ids: self.ids,
            detected_at,
        }
    }
}
