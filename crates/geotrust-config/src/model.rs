// crates/geotrust-config/src/model.rs
// ============================================================================
// Module: Configuration Model
// Description: TOML-backed settings for store, engine, and SLO definitions.
// Purpose: Provide the validated top-level configuration document.
// Dependencies: crate::trust_domain, geotrust-core, serde
// ============================================================================

//! ## Overview
//! The top-level document is `[trust_domain]`, `[store]`, `[engine]`, and a
//! repeated `[[slos]]` table. Every section has defaults, so an empty TOML
//! string loads the built-in NCR setup with the default SLO set. `validate`
//! enforces every cross-field rule once at load time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::PathBuf;

use geotrust_core::MetricKey;
use geotrust_core::SloDefinition;
use geotrust_core::SloOperator;
use geotrust_core::SloSeverity;
use serde::Deserialize;
use serde::Serialize;

use crate::trust_domain::TrustDomainConfig;
use crate::ConfigError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default projection rebuild chunk size.
const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default verification-rate floor below which the system is critical.
const DEFAULT_CRITICAL_RATE_FLOOR: f64 = 95.0;

/// Default retention for resolved alerts and snapshot history, in days.
const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Default radius for polygons derived from a point-only store, in km.
const DEFAULT_CIRCLE_RADIUS_KM: f64 = 0.5;

/// Default vertex count for derived circle polygons.
const DEFAULT_CIRCLE_SEGMENTS: usize = 16;

/// Default alert deduplication window, in minutes.
const DEFAULT_GRACE_PERIOD_MINUTES: u32 = 60;

// ============================================================================
// SECTION: Store Settings
// ============================================================================

/// SQLite store location and tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Database file path.
    pub path: PathBuf,
    /// SQLite busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
    /// Number of pooled read connections.
    pub read_pool_size: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("geotrust.db"),
            busy_timeout_ms: 5_000,
            read_pool_size: 4,
        }
    }
}

// ============================================================================
// SECTION: Engine Settings
// ============================================================================

/// Engine tuning knobs.
///
/// # Invariants
/// - `chunk_size` and `circle_segments` are non-zero (validated at load).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Projections rewritten per rebuild chunk.
    pub chunk_size: usize,
    /// Verification-rate floor below which system status is critical.
    pub critical_rate_floor: f64,
    /// Days of resolved alerts and snapshots kept by cleanup.
    pub retention_days: u32,
    /// Radius for polygons derived from point-only stores, in km.
    pub circle_radius_km: f64,
    /// Vertex count for derived circle polygons.
    pub circle_segments: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            critical_rate_floor: DEFAULT_CRITICAL_RATE_FLOOR,
            retention_days: DEFAULT_RETENTION_DAYS,
            circle_radius_km: DEFAULT_CIRCLE_RADIUS_KM,
            circle_segments: DEFAULT_CIRCLE_SEGMENTS,
        }
    }
}

// ============================================================================
// SECTION: SLO Definitions
// ============================================================================

/// One operator-edited SLO definition as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SloDefinitionConfig {
    /// Unique SLO name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
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
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Alert deduplication window in minutes.
    #[serde(default = "default_grace_period")]
    pub grace_period_minutes: u32,
}

/// Serde default for `enabled`.
const fn default_enabled() -> bool {
    true
}

/// Serde default for `grace_period_minutes`.
const fn default_grace_period() -> u32 {
    DEFAULT_GRACE_PERIOD_MINUTES
}

impl SloDefinitionConfig {
    /// Converts the configuration row into the core definition type.
    #[must_use]
    pub fn to_definition(&self) -> SloDefinition {
        SloDefinition {
            name: self.name.clone().into(),
            description: self.description.clone(),
            metric: self.metric,
            target_value: self.target_value,
            operator: self.operator,
            severity: self.severity,
            enabled: self.enabled,
            grace_period_minutes: self.grace_period_minutes,
        }
    }
}

/// Returns the built-in SLO definition set.
fn default_slos() -> Vec<SloDefinitionConfig> {
    vec![
        SloDefinitionConfig {
            name: "location_verification_rate".to_string(),
            description: "Every projected transaction carries a verified location.".to_string(),
            metric: MetricKey::VerificationRate,
            target_value: 100.0,
            operator: SloOperator::Equal,
            severity: SloSeverity::Critical,
            enabled: true,
            grace_period_minutes: DEFAULT_GRACE_PERIOD_MINUTES,
        },
        SloDefinitionConfig {
            name: "zero_false_verified".to_string(),
            description: "No projection claims verification without registry backing.".to_string(),
            metric: MetricKey::FalseVerifiedCount,
            target_value: 0.0,
            operator: SloOperator::Equal,
            severity: SloSeverity::Critical,
            enabled: true,
            grace_period_minutes: DEFAULT_GRACE_PERIOD_MINUTES,
        },
        SloDefinitionConfig {
            name: "zero_sentinel_leakage".to_string(),
            description: "No verified projection leaks the sentinel municipality.".to_string(),
            metric: MetricKey::SentinelLeakageCount,
            target_value: 0.0,
            operator: SloOperator::Equal,
            severity: SloSeverity::Critical,
            enabled: true,
            grace_period_minutes: DEFAULT_GRACE_PERIOD_MINUTES,
        },
        SloDefinitionConfig {
            name: "zero_bounds_violations".to_string(),
            description: "No registry geometry falls outside the trust domain.".to_string(),
            metric: MetricKey::BoundsViolationCount,
            target_value: 0.0,
            operator: SloOperator::Equal,
            severity: SloSeverity::Critical,
            enabled: true,
            grace_period_minutes: DEFAULT_GRACE_PERIOD_MINUTES,
        },
        SloDefinitionConfig {
            name: "snapshot_freshness".to_string(),
            description: "A verification snapshot was captured within the last day.".to_string(),
            metric: MetricKey::SnapshotAgeMinutes,
            target_value: 1_440.0,
            operator: SloOperator::LessOrEqual,
            severity: SloSeverity::Warning,
            enabled: true,
            grace_period_minutes: DEFAULT_GRACE_PERIOD_MINUTES,
        },
    ]
}

// ============================================================================
// SECTION: Top-Level Document
// ============================================================================

/// The validated top-level configuration document.
///
/// # Invariants
/// - `trust_domain.bounds` is well-formed.
/// - Enabled SLO names are unique and non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoTrustConfig {
    /// Trust domain boundary and PSGC reference data.
    pub trust_domain: TrustDomainConfig,
    /// SQLite store settings.
    pub store: StoreSettings,
    /// Engine tuning knobs.
    pub engine: EngineSettings,
    /// Operator-edited SLO definitions.
    pub slos: Vec<SloDefinitionConfig>,
}

impl Default for GeoTrustConfig {
    fn default() -> Self {
        Self {
            trust_domain: TrustDomainConfig::ncr(),
            store: StoreSettings::default(),
            engine: EngineSettings::default(),
            slos: default_slos(),
        }
    }
}

impl GeoTrustConfig {
    /// Checks every cross-field validation rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first rule that failed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.trust_domain.bounds.is_well_formed() {
            return Err(ConfigError::Invalid(
                "trust domain bounding box is not well-formed".to_string(),
            ));
        }
        if self.trust_domain.psgc_region.is_empty() || self.trust_domain.psgc_province.is_empty() {
            return Err(ConfigError::Invalid(
                "trust domain PSGC region and province codes must be non-empty".to_string(),
            ));
        }
        for (alias, canonical) in &self.trust_domain.aliases {
            if self.trust_domain.citymun_code(canonical).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "alias '{alias}' targets '{canonical}' which is not in the reference table"
                )));
            }
        }
        if self.engine.chunk_size == 0 {
            return Err(ConfigError::Invalid("engine chunk_size must be non-zero".to_string()));
        }
        if self.engine.circle_segments < 3 {
            return Err(ConfigError::Invalid(
                "engine circle_segments must be at least 3".to_string(),
            ));
        }
        if !self.engine.circle_radius_km.is_finite() || self.engine.circle_radius_km <= 0.0 {
            return Err(ConfigError::Invalid(
                "engine circle_radius_km must be positive and finite".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.engine.critical_rate_floor) {
            return Err(ConfigError::Invalid(
                "engine critical_rate_floor must be between 0 and 100".to_string(),
            ));
        }
        if self.store.read_pool_size == 0 {
            return Err(ConfigError::Invalid(
                "store read_pool_size must be non-zero".to_string(),
            ));
        }
        let mut names: BTreeSet<&str> = BTreeSet::new();
        for slo in &self.slos {
            if slo.name.is_empty() {
                return Err(ConfigError::Invalid("slo names must be non-empty".to_string()));
            }
            if !names.insert(slo.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate slo name '{}'", slo.name)));
            }
            if !slo.target_value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "slo '{}' target_value must be finite",
                    slo.name
                )));
            }
            if slo.grace_period_minutes == 0 {
                return Err(ConfigError::Invalid(format!(
                    "slo '{}' grace_period_minutes must be non-zero",
                    slo.name
                )));
            }
        }
        Ok(())
    }

    /// Returns the core definitions for every enabled SLO.
    #[must_use]
    pub fn enabled_definitions(&self) -> Vec<SloDefinition> {
        self.slos
            .iter()
            .filter(|slo| slo.enabled)
            .map(SloDefinitionConfig::to_definition)
            .collect()
    }
}
