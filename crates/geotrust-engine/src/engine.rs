// crates/geotrust-engine/src/engine.rs
// ============================================================================
// Module: Verification Engine
// Description: Engine state, onboarding, rebuilds, and ingestion.
// Purpose: Drive the write-side verification workflows over the store.
// Dependencies: geotrust-core, geotrust-config, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Write-side workflows. Onboarding validates the registry entry first,
//! computes the scoped rebuild in memory, and hands the registry write plus
//! every recomputed projection to the store as one transaction; a failure at
//! any point commits nothing. Rebuilds stream projections in chunks, checking
//! the cancellation flag at chunk boundaries so a cancelled run always ends
//! at the last committed chunk. Ingestion seeds projections from raw upstream
//! documents, verifying immediately when the registry already maps the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use geotrust_config::EngineSettings;
use geotrust_config::GeoTrustConfig;
use geotrust_config::TrustDomainConfig;
use geotrust_core::GeoPoint;
use geotrust_core::Polygon;
use geotrust_core::ProjectionScope;
use geotrust_core::PsgcCodes;
use geotrust_core::RawTransaction;
use geotrust_core::SloDefinition;
use geotrust_core::StoreDimensionEntry;
use geotrust_core::StoreError;
use geotrust_core::StoreId;
use geotrust_core::Timestamp;
use geotrust_core::TransactionId;
use geotrust_core::TransactionProjection;
use geotrust_core::ValidationError;
use geotrust_core::VerificationStore;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Engine operation errors.
///
/// # Invariants
/// - `Validation` failures guarantee nothing was persisted.
/// - Transient store contention surfaces as `Store(Overloaded)`; the caller
///   owns retry/backoff.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A registry invariant was violated before any write.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// The durable store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A supplied argument or document was invalid.
    #[error("invalid input: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Requests and Results
// ============================================================================

/// Operator-supplied details for store onboarding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardRequest {
    /// Store identifier being onboarded.
    pub store_id: StoreId,
    /// Store display name.
    pub store_name: String,
    /// Raw municipality name; normalized against the trust-domain aliases.
    pub municipality: String,
    /// Optional barangay name.
    #[serde(default)]
    pub barangay: Option<String>,
    /// Explicit verified polygon, when surveyed.
    #[serde(default)]
    pub polygon: Option<Polygon>,
    /// Verified point coordinates.
    #[serde(default)]
    pub point: Option<GeoPoint>,
    /// Provenance label for the verification source.
    pub source: String,
}

/// Outcome of one onboarding workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardResult {
    /// The committed registry entry.
    pub entry: StoreDimensionEntry,
    /// Verified projection count for the store before the commit.
    pub before_verified: u64,
    /// Verified projection count for the store after the commit.
    pub after_verified: u64,
    /// Number of projections recomputed by the scoped rebuild.
    pub affected_transactions: u64,
}

/// Aggregate statistics from one projection rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RebuildStats {
    /// Rows whose persisted content actually changed.
    pub rows_updated: u64,
    /// Change in the verified count across the rebuild scope.
    pub verified_delta: i64,
    /// True when cancellation stopped the run at a chunk boundary.
    pub cancelled: bool,
}

/// Aggregate statistics from one raw-transaction ingestion batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IngestStats {
    /// Documents received in the batch.
    pub received: u64,
    /// Documents projected (verified or collapsed to the sentinel).
    pub projected: u64,
    /// Documents rejected as unparseable.
    pub rejected: u64,
    /// Projection rows whose persisted content changed.
    pub rows_changed: u64,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Clock supplier used so evaluation and tests control time explicitly.
type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// Verification engine over a durable store.
///
/// # Invariants
/// - Registry writes for one store identifier are serialized via `store_locks`.
/// - The engine holds no durable verification state of its own.
pub struct VerificationEngine<S: VerificationStore> {
    /// Durable verification store.
    store: S,
    /// Trust-domain boundary and PSGC reference data.
    trust_domain: TrustDomainConfig,
    /// Engine tuning knobs.
    settings: EngineSettings,
    /// Operator-edited SLO definitions (enabled subset).
    slos: Vec<SloDefinition>,
    /// Timestamp supplier.
    clock: Clock,
    /// Per-store-id onboarding locks.
    store_locks: Mutex<HashMap<StoreId, Arc<Mutex<()>>>>,
}

impl<S: VerificationStore> VerificationEngine<S> {
    /// Builds an engine from a validated configuration and an open store.
    #[must_use]
    pub fn new(store: S, config: &GeoTrustConfig) -> Self {
        Self {
            store,
            trust_domain: config.trust_domain.clone(),
            settings: config.engine.clone(),
            slos: config.enabled_definitions(),
            clock: Arc::new(system_now),
            store_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the timestamp supplier. Intended for tests and replay tools.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> Timestamp + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Returns the durable store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the configured trust domain.
    pub const fn trust_domain(&self) -> &TrustDomainConfig {
        &self.trust_domain
    }

    /// Returns the engine settings.
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns the enabled SLO definitions.
    pub fn slo_definitions(&self) -> &[SloDefinition] {
        &self.slos
    }

    /// Returns the current engine timestamp.
    pub(crate) fn now(&self) -> Timestamp {
        (self.clock)()
    }

    /// Returns the keyed lock for one store identifier.
    fn store_lock(&self, store_id: StoreId) -> Arc<Mutex<()>> {
        let mut locks = self.store_locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(store_id).or_insert_with(|| Arc::new(Mutex::new(()))))
    }

    // ------------------------------------------------------------------
    // Onboarding
    // ------------------------------------------------------------------

    /// Runs the atomic onboarding workflow for one store.
    ///
    /// Validates the entry, recomputes every projection referencing the
    /// store in memory, and commits registry entry plus projections in one
    /// store transaction. A failure anywhere leaves nothing written.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when a registry invariant fails
    /// and [`EngineError::Store`] when the commit fails.
    pub fn onboard(&self, request: OnboardRequest) -> Result<OnboardResult, EngineError> {
        let lock = self.store_lock(request.store_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = self.build_entry(&request)?;
        entry.validate(&self.trust_domain.bounds)?;
        let before = self.store.projection_counts_for_store(request.store_id)?;
        let projections =
            self.collect_reverified(ProjectionScope::Store(request.store_id), Some(&entry))?;
        let affected = u64::try_from(projections.len()).unwrap_or(u64::MAX);
        self.store.commit_onboarding(&entry, &projections)?;
        let after = self.store.projection_counts_for_store(request.store_id)?;
        Ok(OnboardResult {
            entry,
            before_verified: before.verified,
            after_verified: after.verified,
            affected_transactions: affected,
        })
    }

    /// Builds and normalizes a registry entry from an onboarding request.
    fn build_entry(&self, request: &OnboardRequest) -> Result<StoreDimensionEntry, EngineError> {
        let municipality = self.trust_domain.normalize_municipality(&request.municipality);
        let psgc = PsgcCodes {
            region: self.trust_domain.psgc_region.clone(),
            province: self.trust_domain.psgc_province.clone(),
            citymun: self.trust_domain.citymun_code(&municipality),
        };
        let polygon = match (&request.polygon, request.point) {
            (Some(polygon), _) => Some(polygon.clone()),
            (None, Some(point)) => Some(Polygon::circle_around(
                point,
                self.settings.circle_radius_km,
                self.settings.circle_segments,
            )),
            (None, None) => None,
        };
        Ok(StoreDimensionEntry {
            store_id: request.store_id,
            store_name: request.store_name.clone(),
            trust_domain: self.trust_domain.name.clone(),
            municipality,
            barangay: request.barangay.clone(),
            polygon,
            point: request.point,
            psgc,
            verified_at: self.now(),
            source: request.source.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Rebuild
    // ------------------------------------------------------------------

    /// Rebuilds projections in scope under the zero-trust rule.
    ///
    /// Work is chunked by the configured chunk size; `cancel` is checked at
    /// chunk boundaries and a cancelled run ends at the last committed chunk.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when a read or chunk commit fails.
    pub fn rebuild(
        &self,
        scope: ProjectionScope,
        cancel: &AtomicBool,
    ) -> Result<RebuildStats, EngineError> {
        let before = self.scope_counts(scope)?;
        let entries = self.registry_index()?;
        let mut stats = RebuildStats::default();
        let mut cursor: Option<TransactionId> = None;
        loop {
            if cancel.load(Ordering::Relaxed) {
                stats.cancelled = true;
                break;
            }
            let page =
                self.store.projections_page(scope, cursor.as_ref(), self.settings.chunk_size)?;
            let Some(last) = page.last() else {
                break;
            };
            cursor = Some(last.transaction_id.clone());
            let rebuilt: Vec<TransactionProjection> = page
                .iter()
                .map(|projection| {
                    let entry =
                        projection.store_id.and_then(|store_id| entries.get(&store_id));
                    projection.reverified(
                        entry,
                        &self.trust_domain.region_name,
                        &self.trust_domain.province_name,
                    )
                })
                .collect();
            stats.rows_updated =
                stats.rows_updated.saturating_add(self.store.apply_projection_chunk(&rebuilt)?);
        }
        let after = self.scope_counts(scope)?;
        let before_verified = i64::try_from(before.verified).unwrap_or(i64::MAX);
        let after_verified = i64::try_from(after.verified).unwrap_or(i64::MAX);
        stats.verified_delta = after_verified - before_verified;
        Ok(stats)
    }

    /// Reads aggregate counts for a rebuild scope.
    fn scope_counts(
        &self,
        scope: ProjectionScope,
    ) -> Result<geotrust_core::ProjectionCounts, EngineError> {
        let counts = match scope {
            ProjectionScope::All => self.store.projection_counts()?,
            ProjectionScope::Store(store_id) => {
                self.store.projection_counts_for_store(store_id)?
            }
        };
        Ok(counts)
    }

    /// Reads the registry once and indexes entries by store identifier.
    fn registry_index(&self) -> Result<RegistryIndex, EngineError> {
        let entries = self.store.registry_entries()?;
        Ok(RegistryIndex::new(entries))
    }

    /// Collects every projection in scope, reverified against one entry.
    ///
    /// Used by onboarding, which already holds the authoritative entry in
    /// memory before anything is committed.
    fn collect_reverified(
        &self,
        scope: ProjectionScope,
        entry: Option<&StoreDimensionEntry>,
    ) -> Result<Vec<TransactionProjection>, EngineError> {
        let mut collected = Vec::new();
        let mut cursor: Option<TransactionId> = None;
        loop {
            let page =
                self.store.projections_page(scope, cursor.as_ref(), self.settings.chunk_size)?;
            let Some(last) = page.last() else {
                break;
            };
            cursor = Some(last.transaction_id.clone());
            for projection in &page {
                collected.push(projection.reverified(
                    entry,
                    &self.trust_domain.region_name,
                    &self.trust_domain.province_name,
                ));
            }
        }
        Ok(collected)
    }

    // ------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------

    /// Ingests raw upstream transaction documents as projections.
    ///
    /// Each parseable document seeds a projection, verified immediately when
    /// the registry already maps its store and collapsed to the sentinel
    /// otherwise. Unparseable documents are counted, not fatal.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when a chunk commit fails.
    pub fn ingest(&self, documents: &[Value]) -> Result<IngestStats, EngineError> {
        let entries = self.registry_index()?;
        let mut stats = IngestStats {
            received: u64::try_from(documents.len()).unwrap_or(u64::MAX),
            ..IngestStats::default()
        };
        let mut projections = Vec::new();
        for document in documents {
            let Ok(raw) = serde_json::from_value::<RawTransaction>(document.clone()) else {
                stats.rejected = stats.rejected.saturating_add(1);
                continue;
            };
            let entry = raw.store_id.and_then(|store_id| entries.get(&store_id));
            let projection = TransactionProjection::unverified(&raw).reverified(
                entry,
                &self.trust_domain.region_name,
                &self.trust_domain.province_name,
            );
            projections.push(projection);
        }
        stats.projected = u64::try_from(projections.len()).unwrap_or(u64::MAX);
        for chunk in projections.chunks(self.settings.chunk_size.max(1)) {
            stats.rows_changed =
                stats.rows_changed.saturating_add(self.store.apply_projection_chunk(chunk)?);
        }
        Ok(stats)
    }
}

/// Registry entries indexed by store identifier for rebuild lookups.
pub(crate) struct RegistryIndex {
    /// Entries keyed by store identifier.
    by_id: HashMap<StoreId, StoreDimensionEntry>,
}

impl RegistryIndex {
    /// Builds the index from a consistent registry read.
    pub(crate) fn new(entries: Vec<StoreDimensionEntry>) -> Self {
        let by_id = entries.into_iter().map(|entry| (entry.store_id, entry)).collect();
        Self {
            by_id,
        }
    }

    /// Looks up one entry by store identifier.
    pub(crate) fn get(&self, store_id: &StoreId) -> Option<&StoreDimensionEntry> {
        self.by_id.get(store_id)
    }
}

/// Returns the current system time as a unix-millisecond timestamp.
fn system_now() -> Timestamp {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    Timestamp::from_unix_millis(i64::try_from(now.as_millis()).unwrap_or(i64::MAX))
}
