// crates/geotrust-core/src/domain/slo.rs
// ============================================================================
// Module: GeoTrust SLO Model
// Description: SLO definitions, metric keys, and evaluation results.
// Purpose: Define the typed configuration and outcome model for SLO checks.
// Dependencies: crate::domain::identifiers, serde
// ============================================================================

//! ## Overview
//! An SLO is a named target over one system metric, compared with a fixed
//! operator. Evaluation never fails: each SLO resolves to `Pass`, `Fail`, or
//! `Unknown` (the latter when the underlying metric cannot be computed, such
//! as snapshot freshness before any snapshot exists). The per-SLO grace
//! period governs alert deduplication and is authoritative.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::domain::identifiers::SloName;

// ============================================================================
// SECTION: Metric Keys
// ============================================================================

/// System metrics an SLO definition may target.
///
/// # Invariants
/// - Variants are stable for serialization and configuration matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    /// Total projected transactions.
    TotalTransactions,
    /// Percentage of projections with verified locations (0-100).
    VerificationRate,
    /// Projections carrying the sentinel location.
    UnknownCount,
    /// False-verified integrity violations.
    FalseVerifiedCount,
    /// Sentinel-leakage integrity violations.
    SentinelLeakageCount,
    /// Stale-municipality integrity violations.
    StaleMunicipalityCount,
    /// Shape-violation integrity violations.
    ShapeViolationCount,
    /// Bounds-violation integrity violations.
    BoundsViolationCount,
    /// Minutes since the most recent snapshot (unknown without history).
    SnapshotAgeMinutes,
}

/// Collected metric values for one evaluation pass.
///
/// # Invariants
/// - `None` means the metric could not be computed, never that it is zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricSet {
    /// Total projected transactions.
    pub total_transactions: f64,
    /// Verification rate percentage (0-100).
    pub verification_rate: f64,
    /// Sentinel-location projection count.
    pub unknown_count: f64,
    /// False-verified violation count.
    pub false_verified_count: f64,
    /// Sentinel-leakage violation count.
    pub sentinel_leakage_count: f64,
    /// Stale-municipality violation count.
    pub stale_municipality_count: f64,
    /// Shape-violation count.
    pub shape_violation_count: f64,
    /// Bounds-violation count.
    pub bounds_violation_count: f64,
    /// Minutes since the latest snapshot, when history exists.
    pub snapshot_age_minutes: Option<f64>,
}

impl MetricSet {
    /// Resolves the value behind a metric key, `None` when unavailable.
    #[must_use]
    pub const fn value(&self, key: MetricKey) -> Option<f64> {
        match key {
            MetricKey::TotalTransactions => Some(self.total_transactions),
            MetricKey::VerificationRate => Some(self.verification_rate),
            MetricKey::UnknownCount => Some(self.unknown_count),
            MetricKey::FalseVerifiedCount => Some(self.false_verified_count),
            MetricKey::SentinelLeakageCount => Some(self.sentinel_leakage_count),
            MetricKey::StaleMunicipalityCount => Some(self.stale_municipality_count),
            MetricKey::ShapeViolationCount => Some(self.shape_violation_count),
            MetricKey::BoundsViolationCount => Some(self.bounds_violation_count),
            MetricKey::SnapshotAgeMinutes => self.snapshot_age_minutes,
        }
    }
}

// ============================================================================
// SECTION: Operators, Severity, Status
// ============================================================================

/// Comparison operator applied between the current metric and the target.
///
/// # Invariants
/// - Wire forms are the literal operator strings from operator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SloOperator {
    /// Exact equality.
    #[serde(rename = "=")]
    Equal,
    /// Inequality.
    #[serde(rename = "!=")]
    NotEqual,
    /// Current must be at least the target.
    #[serde(rename = ">=")]
    GreaterOrEqual,
    /// Current must be at most the target.
    #[serde(rename = "<=")]
    LessOrEqual,
    /// Current must exceed the target.
    #[serde(rename = ">")]
    Greater,
    /// Current must stay below the target.
    #[serde(rename = "<")]
    Less,
}

impl fmt::Display for SloOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::Less => "<",
        };
        f.write_str(symbol)
    }
}

/// Severity attached to an SLO definition and inherited by its alerts.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SloSeverity {
    /// Informational only.
    Info,
    /// Requires attention.
    Warning,
    /// Requires immediate operator action.
    Critical,
}

impl SloSeverity {
    /// Returns the stable label for the severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// Tri-state outcome of one SLO evaluation.
///
/// # Invariants
/// - `Unknown` means the metric was unavailable, never that the check errored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SloStatus {
    /// The comparison held.
    Pass,
    /// The comparison did not hold.
    Fail,
    /// The underlying metric could not be computed.
    Unknown,
}

// ============================================================================
// SECTION: Definition and Result
// ============================================================================

/// Operator-edited SLO definition.
///
/// # Invariants
/// - `name` is unique across the loaded definition set.
/// - `grace_period_minutes` is authoritative for alert deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SloDefinition {
    /// Unique SLO name.
    pub name: SloName,
    /// Human-readable description.
    pub description: String,
    /// Metric the SLO targets.
    pub metric: MetricKey,
    /// Target value for the comparison.
    pub target_value: f64,
    /// Comparison operator.
    pub operator: SloOperator,
    /// Severity inherited by generated alerts.
    pub severity: SloSeverity,
    /// Whether the SLO participates in evaluation.
    pub enabled: bool,
    /// Alert deduplication window in minutes.
    pub grace_period_minutes: u32,
}

/// Outcome of evaluating one SLO definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SloResult {
    /// SLO name.
    pub name: SloName,
    /// Measured metric value, when available.
    pub current: Option<f64>,
    /// Configured target value.
    pub target: f64,
    /// Comparison operator used.
    pub operator: SloOperator,
    /// Tri-state evaluation status.
    pub status: SloStatus,
    /// Severity inherited from the definition.
    pub severity: SloSeverity,
}
