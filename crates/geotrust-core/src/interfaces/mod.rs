// crates/geotrust-core/src/interfaces/mod.rs
// ============================================================================
// Module: GeoTrust Interfaces
// Description: Backend-agnostic interfaces for durable verification state.
// Purpose: Define the contract surfaces used by the GeoTrust engine.
// Dependencies: crate::domain, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the engine reaches durable state without embedding
//! backend-specific details. Components communicate only through these
//! surfaces, never shared memory; every multi-aggregate read is served under
//! one consistent transaction by the implementation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::domain::alert::Alert;
use crate::domain::alert::AlertId;
use crate::domain::alert::OperatorId;
use crate::domain::identifiers::SloName;
use crate::domain::identifiers::StoreId;
use crate::domain::identifiers::TransactionId;
use crate::domain::projection::TransactionProjection;
use crate::domain::registry::StoreDimensionEntry;
use crate::domain::snapshot::VerificationSnapshot;
use crate::domain::time::Timestamp;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Durable store errors surfaced to the engine.
///
/// # Invariants
/// - `Overloaded` is the only transient variant; callers own retry/backoff.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Storage engine error.
    #[error("store db error: {0}")]
    Db(String),
    /// Stored payload failed integrity verification.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid stored or supplied data.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// Requested record does not exist.
    #[error("store record not found: {0}")]
    NotFound(String),
    /// Store is contended or overloaded; the caller should retry.
    #[error("store overloaded: {message}")]
    Overloaded {
        /// Retryable overload message.
        message: String,
        /// Optional retry delay in milliseconds.
        retry_after_ms: Option<u64>,
    },
}

// ============================================================================
// SECTION: Read Models
// ============================================================================

/// Scope selector for projection reads and rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "store_id", rename_all = "snake_case")]
pub enum ProjectionScope {
    /// Every projection.
    All,
    /// Projections referencing one store.
    Store(StoreId),
}

/// Aggregate projection counts read under one transaction.
///
/// # Invariants
/// - `verified + unknown == total` as read; the snapshot invariant
///   `verified + unknown <= total` follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectionCounts {
    /// Total projections.
    pub total: u64,
    /// Projections with verified locations.
    pub verified: u64,
    /// Projections carrying the sentinel location.
    pub unknown: u64,
}

/// Raw audit row used by the integrity assertion engine.
///
/// # Invariants
/// - `projection_json` is the exact persisted payload, not a re-serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionAuditRow {
    /// Transaction identifier.
    pub transaction_id: TransactionId,
    /// Referenced store identifier, if any.
    pub store_id: Option<StoreId>,
    /// Persisted verified flag.
    pub verified: bool,
    /// Persisted municipality value.
    pub municipality: String,
    /// Persisted canonical JSON payload.
    pub projection_json: String,
}

/// Registry entries plus projection rows read under one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationDataset {
    /// Aggregate counts.
    pub counts: ProjectionCounts,
    /// Every registry entry.
    pub entries: Vec<StoreDimensionEntry>,
    /// Every projection audit row.
    pub rows: Vec<ProjectionAuditRow>,
}

// ============================================================================
// SECTION: Registry Store
// ============================================================================

/// Durable store surface for the store dimension registry.
pub trait RegistryStore {
    /// Returns the registry entry for a store, when present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn registry_entry(&self, store_id: StoreId) -> Result<Option<StoreDimensionEntry>, StoreError>;

    /// Returns every registry entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn registry_entries(&self) -> Result<Vec<StoreDimensionEntry>, StoreError>;

    /// Commits an onboarding write: the registry entry and its rebuilt
    /// projections land in one transaction or not at all.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the transaction fails; nothing is written.
    fn commit_onboarding(
        &self,
        entry: &StoreDimensionEntry,
        projections: &[TransactionProjection],
    ) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Projection Store
// ============================================================================

/// Durable store surface for transaction projections.
pub trait ProjectionStore {
    /// Returns one projection, when present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn projection(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<TransactionProjection>, StoreError>;

    /// Returns a page of projections in scope, ordered by transaction
    /// identifier, starting strictly after the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn projections_page(
        &self,
        scope: ProjectionScope,
        after: Option<&TransactionId>,
        limit: usize,
    ) -> Result<Vec<TransactionProjection>, StoreError>;

    /// Upserts a chunk of projections in one transaction and returns how many
    /// rows actually changed (by canonical content hash).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails; the chunk is atomic.
    fn apply_projection_chunk(
        &self,
        projections: &[TransactionProjection],
    ) -> Result<u64, StoreError>;

    /// Returns aggregate counts under one consistent read.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn projection_counts(&self) -> Result<ProjectionCounts, StoreError>;

    /// Returns counts scoped to one store under one consistent read.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn projection_counts_for_store(&self, store_id: StoreId)
    -> Result<ProjectionCounts, StoreError>;

    /// Returns the registry and projection rows needed by integrity checks
    /// and snapshot capture, read under one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn verification_dataset(&self) -> Result<VerificationDataset, StoreError>;
}

// ============================================================================
// SECTION: Snapshot Store
// ============================================================================

/// Durable store surface for verification snapshot history.
pub trait SnapshotStore {
    /// Appends an immutable snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn append_snapshot(&self, snapshot: &VerificationSnapshot) -> Result<(), StoreError>;

    /// Returns the most recent snapshot, when any exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn latest_snapshot(&self) -> Result<Option<VerificationSnapshot>, StoreError>;

    /// Returns snapshots captured inside the inclusive time range.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn snapshots_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<VerificationSnapshot>, StoreError>;

    /// Deletes snapshots older than the cutoff; returns rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn purge_snapshots_before(&self, cutoff: Timestamp) -> Result<u64, StoreError>;
}

// ============================================================================
// SECTION: Alert Store
// ============================================================================

/// Durable store surface for alert lifecycle and deduplication.
pub trait AlertStore {
    /// Inserts an alert unless an unresolved alert for the same SLO was
    /// raised at or after `window_start`. The check and the insert execute
    /// atomically; returns true when the alert was created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn insert_alert_if_absent(
        &self,
        alert: &Alert,
        window_start: Timestamp,
    ) -> Result<bool, StoreError>;

    /// Returns one alert, when present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn alert(&self, alert_id: &AlertId) -> Result<Option<Alert>, StoreError>;

    /// Returns every unresolved alert.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn unresolved_alerts(&self) -> Result<Vec<Alert>, StoreError>;

    /// Acknowledges an open alert with an operator identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for a missing alert and
    /// [`StoreError::Invalid`] for an illegal lifecycle transition.
    fn acknowledge_alert(
        &self,
        alert_id: &AlertId,
        operator: &OperatorId,
        at: Timestamp,
    ) -> Result<Alert, StoreError>;

    /// Resolves an unresolved alert.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for a missing alert and
    /// [`StoreError::Invalid`] for an illegal lifecycle transition.
    fn resolve_alert(&self, alert_id: &AlertId, at: Timestamp) -> Result<Alert, StoreError>;

    /// Resolves every unresolved alert for one SLO; returns rows changed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn resolve_alerts_for_slo(&self, slo_name: &SloName, at: Timestamp)
    -> Result<u64, StoreError>;

    /// Deletes resolved alerts older than the cutoff; returns rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn purge_resolved_alerts_before(&self, cutoff: Timestamp) -> Result<u64, StoreError>;
}

// ============================================================================
// SECTION: Combined Surface
// ============================================================================

/// Full durable store surface consumed by the engine.
pub trait VerificationStore:
    RegistryStore + ProjectionStore + SnapshotStore + AlertStore + Send + Sync
{
}

impl<T> VerificationStore for T where
    T: RegistryStore + ProjectionStore + SnapshotStore + AlertStore + Send + Sync
{
}
