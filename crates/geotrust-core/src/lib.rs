// crates/geotrust-core/src/lib.rs
// ============================================================================
// Module: GeoTrust Core
// Description: Domain model and verification logic for zero-trust location checks.
// Purpose: Define registry entries, projections, SLOs, snapshots, and alerts.
// Dependencies: serde, serde_json, serde_jcs, sha2, thiserror, time
// ============================================================================

//! ## Overview
//! GeoTrust core defines the canonical domain model for zero-trust location
//! verification of retail transactions: the store dimension registry, the
//! per-transaction verification projection, integrity violation categories,
//! SLO definitions with tri-state evaluation, immutable verification
//! snapshots, and lifecycle-tracked alerts.
//!
//! The core is storage-agnostic and clock-free: hosts supply timestamps and
//! durable state through the [`interfaces`] traits. Verification never
//! guesses; a location is verified only when every registry condition holds,
//! and everything else collapses to the `"Unknown"` sentinel.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod domain;
pub mod hashing;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use domain::alert::Alert;
pub use domain::alert::AlertId;
pub use domain::alert::AlertState;
pub use domain::alert::AlertTransitionError;
pub use domain::alert::OperatorId;
pub use domain::geo::BoundingBox;
pub use domain::geo::GeoPoint;
pub use domain::geo::MIN_POLYGON_VERTICES;
pub use domain::geo::Polygon;
pub use domain::identifiers::SloName;
pub use domain::identifiers::StoreId;
pub use domain::identifiers::TransactionId;
pub use domain::projection::Basket;
pub use domain::projection::GeoFields;
pub use domain::projection::Interaction;
pub use domain::projection::ProjectedLocation;
pub use domain::projection::QualityFlags;
pub use domain::projection::RawTransaction;
pub use domain::projection::SourceInfo;
pub use domain::projection::REQUIRED_TOP_LEVEL_FIELDS;
pub use domain::projection::TransactionProjection;
pub use domain::projection::UNKNOWN_MUNICIPALITY;
pub use domain::projection::missing_top_level_fields;
pub use domain::registry::PsgcCodes;
pub use domain::registry::StoreDimensionEntry;
pub use domain::registry::ValidationError;
pub use domain::slo::MetricKey;
pub use domain::slo::MetricSet;
pub use domain::slo::SloDefinition;
pub use domain::slo::SloOperator;
pub use domain::slo::SloResult;
pub use domain::slo::SloSeverity;
pub use domain::slo::SloStatus;
pub use domain::snapshot::SystemStatus;
pub use domain::snapshot::VerificationSnapshot;
pub use domain::snapshot::ViolationCategory;
pub use domain::snapshot::ViolationCounts;
pub use domain::snapshot::ViolationReport;
pub use domain::time::Timestamp;
pub use interfaces::AlertStore;
pub use interfaces::ProjectionAuditRow;
pub use interfaces::ProjectionCounts;
pub use interfaces::ProjectionScope;
pub use interfaces::ProjectionStore;
pub use interfaces::RegistryStore;
pub use interfaces::SnapshotStore;
pub use interfaces::StoreError;
pub use interfaces::VerificationDataset;
pub use interfaces::VerificationStore;
pub use runtime::classify_system_status;
pub use runtime::evaluate_slo;
