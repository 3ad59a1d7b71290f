// crates/geotrust-core/src/domain/snapshot.rs
// ============================================================================
// Module: GeoTrust Verification Snapshot
// Description: Immutable point-in-time system metrics and status.
// Purpose: Define the append-only snapshot record and violation categories.
// Dependencies: crate::domain::{identifiers, slo, time}, serde
// ============================================================================

//! ## Overview
//! A verification snapshot freezes the system-wide counts, the per-category
//! integrity violation totals, the classified system status, and the per-SLO
//! pass/fail map at one instant, read under a single consistent transaction.
//! Snapshots are append-only and immutable once written; only retention
//! cleanup removes them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::domain::identifiers::SloName;
use crate::domain::slo::SloStatus;
use crate::domain::time::Timestamp;

// ============================================================================
// SECTION: Violation Categories
// ============================================================================

/// Integrity violation categories detected by the assertion engine.
///
/// # Invariants
/// - Variants are stable for serialization and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    /// Projection claims verified but the registry does not back it.
    FalseVerified,
    /// Verified projection carries the sentinel municipality.
    SentinelLeakage,
    /// Verified projection disagrees with the registry municipality.
    StaleMunicipality,
    /// Persisted projection is missing a required schema field.
    ShapeViolation,
    /// Registry entry coordinates fall outside the trust domain.
    BoundsViolation,
}

impl ViolationCategory {
    /// Returns the stable label for the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FalseVerified => "false_verified",
            Self::SentinelLeakage => "sentinel_leakage",
            Self::StaleMunicipality => "stale_municipality",
            Self::ShapeViolation => "shape_violation",
            Self::BoundsViolation => "bounds_violation",
        }
    }

    /// Returns true when a single occurrence makes the system critical.
    #[must_use]
    pub const fn is_zero_tolerance(self) -> bool {
        matches!(self, Self::FalseVerified | Self::SentinelLeakage | Self::BoundsViolation)
    }
}

/// Per-category violation counts carried in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ViolationCounts {
    /// False-verified violations.
    pub false_verified: u64,
    /// Sentinel-leakage violations.
    pub sentinel_leakage: u64,
    /// Stale-municipality violations.
    pub stale_municipality: u64,
    /// Shape violations.
    pub shape_violation: u64,
    /// Bounds violations.
    pub bounds_violation: u64,
}

impl ViolationCounts {
    /// Returns the count for one category.
    #[must_use]
    pub const fn get(&self, category: ViolationCategory) -> u64 {
        match category {
            ViolationCategory::FalseVerified => self.false_verified,
            ViolationCategory::SentinelLeakage => self.sentinel_leakage,
            ViolationCategory::StaleMunicipality => self.stale_municipality,
            ViolationCategory::ShapeViolation => self.shape_violation,
            ViolationCategory::BoundsViolation => self.bounds_violation,
        }
    }

    /// Returns the sum of zero-tolerance category counts.
    #[must_use]
    pub const fn zero_tolerance_total(&self) -> u64 {
        self.false_verified + self.sentinel_leakage + self.bounds_violation
    }
}

/// Violation report produced by one integrity check.
///
/// # Invariants
/// - `affected_ids` is a bounded sample, not the full population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationReport {
    /// Violation category.
    pub category: ViolationCategory,
    /// Total number of violations detected.
    pub count: u64,
    /// Sample of affected identifiers (transaction or store).
    pub affected_ids: Vec<String>,
    /// Detection timestamp.
    pub detected_at: Timestamp,
}

// ============================================================================
// SECTION: System Status
// ============================================================================

/// Classified health of the whole verification system.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemStatus {
    /// Verification rate is 100% and no zero-tolerance violations exist.
    Healthy,
    /// Quality degraded but no zero-tolerance condition tripped.
    Degraded,
    /// A zero-tolerance violation exists or the rate fell below the floor.
    Critical,
}

impl SystemStatus {
    /// Returns the stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY",
            Self::Degraded => "DEGRADED",
            Self::Critical => "CRITICAL",
        }
    }
}

// ============================================================================
// SECTION: Snapshot Record
// ============================================================================

/// Append-only verification snapshot.
///
/// # Invariants
/// - `verified + unknown <= total`.
/// - Immutable once written; purged only by retention cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationSnapshot {
    /// Capture timestamp.
    pub captured_at: Timestamp,
    /// Total projected transactions.
    pub total: u64,
    /// Verified projections.
    pub verified: u64,
    /// Sentinel-location projections.
    pub unknown: u64,
    /// Per-category violation counts.
    pub violations: ViolationCounts,
    /// Classified system status.
    pub system_status: SystemStatus,
    /// Per-SLO pass/fail map at capture time.
    pub slo_statuses: BTreeMap<SloName, SloStatus>,
}

impl VerificationSnapshot {
    /// Returns the verification rate percentage (100 for an empty system).
    #[must_use]
    pub fn verification_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.verified as f64 / self.total as f64) * 100.0
        }
    }

    /// Returns true when the count invariant holds.
    #[must_use]
    pub const fn counts_consistent(&self) -> bool {
        self.verified + self.unknown <= self.total
    }
}
