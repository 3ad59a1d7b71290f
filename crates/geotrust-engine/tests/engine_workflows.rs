// crates/geotrust-engine/tests/engine_workflows.rs
// ============================================================================
// Module: Engine Workflow Tests
// Description: End-to-end tests for onboarding, rebuilds, SLOs, and alerts.
// Purpose: Exercise the engine workflows over a real durable store.
// ============================================================================

//! ## Overview
//! Drives the verification engine against a temporary sqlite store and checks
//! the zero-trust outcomes: unmapped stores collapse to the sentinel, mapped
//! stores verify, onboarding commits atomically, rebuilds converge, failing
//! SLOs raise deduplicated alerts, and recovery auto-resolves them.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use geotrust_config::GeoTrustConfig;
use geotrust_core::Alert;
use geotrust_core::AlertId;
use geotrust_core::AlertState;
use geotrust_core::GeoPoint;
use geotrust_core::OperatorId;
use geotrust_core::Polygon;
use geotrust_core::ProjectedLocation;
use geotrust_core::ProjectionScope;
use geotrust_core::PsgcCodes;
use geotrust_core::QualityFlags;
use geotrust_core::SloName;
use geotrust_core::SloStatus;
use geotrust_core::StoreDimensionEntry;
use geotrust_core::StoreError;
use geotrust_core::StoreId;
use geotrust_core::SystemStatus;
use geotrust_core::Timestamp;
use geotrust_core::TransactionId;
use geotrust_core::TransactionProjection;
use geotrust_core::UNKNOWN_MUNICIPALITY;
use geotrust_core::ViolationCategory;
use geotrust_core::interfaces::AlertStore;
use geotrust_core::interfaces::ProjectionCounts;
use geotrust_core::interfaces::ProjectionStore;
use geotrust_core::interfaces::RegistryStore;
use geotrust_core::interfaces::SnapshotStore;
use geotrust_core::interfaces::VerificationDataset;
use geotrust_core::VerificationSnapshot;
use geotrust_engine::EngineError;
use geotrust_engine::OnboardRequest;
use geotrust_engine::VerificationEngine;
use geotrust_store_sqlite::SqliteStoreConfig;
use geotrust_store_sqlite::SqliteVerificationStore;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Fixed base timestamp for deterministic clocks.
const BASE_MILLIS: i64 = 1_756_000_000_000;

type SqliteEngine = VerificationEngine<SqliteVerificationStore>;

fn open_store(dir: &TempDir) -> SqliteVerificationStore {
    let config = SqliteStoreConfig::new(dir.path().join("geotrust.db"));
    SqliteVerificationStore::new(&config).unwrap()
}

/// Builds an engine over a fresh store with an externally-advanced clock.
fn test_engine(dir: &TempDir) -> (SqliteEngine, Arc<AtomicI64>) {
    let clock = Arc::new(AtomicI64::new(BASE_MILLIS));
    let supplier = Arc::clone(&clock);
    let engine = VerificationEngine::new(open_store(dir), &GeoTrustConfig::default())
        .with_clock(move || Timestamp::from_unix_millis(supplier.load(Ordering::SeqCst)));
    (engine, clock)
}

fn advance_minutes(clock: &AtomicI64, minutes: i64) {
    clock.fetch_add(minutes * 60_000, Ordering::SeqCst);
}

fn store_id(raw: u64) -> StoreId {
    StoreId::from_raw(raw).unwrap()
}

fn raw_doc(transaction_id: &str, raw_store_id: Option<u64>) -> Value {
    json!({
        "transactionId": transaction_id,
        "storeId": raw_store_id,
        "timestamp": BASE_MILLIS,
        "basket": { "items": [], "itemCount": 2, "totalAmount": 150.5 },
        "interaction": { "ageBracket": "25-34" },
        "brandMatched": true,
        "substitutionDetected": false,
        "source": { "file": "batch-001.json", "rowCount": 3 }
    })
}

fn onboard_request(raw_store_id: u64, municipality: &str) -> OnboardRequest {
    OnboardRequest {
        store_id: store_id(raw_store_id),
        store_name: format!("Sari-sari {raw_store_id}"),
        municipality: municipality.to_string(),
        barangay: Some("Barangay Commonwealth".to_string()),
        polygon: None,
        point: Some(GeoPoint::new(14.62, 121.03)),
        source: "field_survey".to_string(),
    }
}

fn never_cancel() -> AtomicBool {
    AtomicBool::new(false)
}

// ============================================================================
// SECTION: Ingestion and Onboarding
// ============================================================================

/// Tests that transactions referencing an unmapped store collapse to the
/// sentinel location instead of trusting upstream claims.
#[test]
fn test_ingest_unmapped_store_collapses_to_sentinel() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);

    let docs = vec![raw_doc("txn-001", Some(901)), raw_doc("txn-002", Some(901))];
    let stats = engine.ingest(&docs).unwrap();
    assert_eq!(stats.received, 2);
    assert_eq!(stats.projected, 2);
    assert_eq!(stats.rejected, 0);
    assert_eq!(stats.rows_changed, 2);

    let projection =
        engine.store().projection(&TransactionId::new("txn-001")).unwrap().unwrap();
    assert!(!projection.quality_flags.location_verified);
    assert_eq!(projection.location.municipality, UNKNOWN_MUNICIPALITY);
    assert_eq!(projection.location.region, None);
    assert_eq!(projection.location.geo.lat, None);
    // Pass-through fragments survive the collapse.
    assert!(projection.quality_flags.brand_matched);
    assert_eq!(projection.basket.item_count, Some(2));

    let counts = engine.store().projection_counts().unwrap();
    assert_eq!(counts, ProjectionCounts { total: 2, verified: 0, unknown: 2 });
}

/// Tests that unparseable documents are counted and skipped, never fatal.
#[test]
fn test_ingest_counts_rejected_documents() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);

    let docs = vec![raw_doc("txn-001", None), json!({"not": "a transaction"}), json!(42)];
    let stats = engine.ingest(&docs).unwrap();
    assert_eq!(stats.received, 3);
    assert_eq!(stats.projected, 1);
    assert_eq!(stats.rejected, 2);
}

/// Tests that onboarding a store verifies its existing projections in the
/// same commit and normalizes the municipality through the alias table.
#[test]
fn test_onboard_verifies_existing_projections() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);

    let docs: Vec<Value> =
        (1 ..= 3).map(|n| raw_doc(&format!("txn-{n:03}"), Some(901))).collect();
    engine.ingest(&docs).unwrap();

    let result = engine.onboard(onboard_request(901, " QC ")).unwrap();
    assert_eq!(result.entry.municipality, "Quezon City");
    assert_eq!(result.entry.psgc.region, "130000000");
    assert_eq!(result.entry.psgc.citymun.as_deref(), Some("137402000"));
    assert!(result.entry.polygon.is_some());
    assert_eq!(result.before_verified, 0);
    assert_eq!(result.after_verified, 3);
    assert_eq!(result.affected_transactions, 3);

    let projection =
        engine.store().projection(&TransactionId::new("txn-002")).unwrap().unwrap();
    assert!(projection.quality_flags.location_verified);
    assert_eq!(projection.location.municipality, "Quezon City");
    assert_eq!(projection.location.psgc_citymun.as_deref(), Some("137402000"));
    assert_eq!(projection.location.geo.lat, Some(14.62));

    let counts = engine.store().projection_counts().unwrap();
    assert_eq!(counts.verified, 3);
}

/// Tests that an out-of-bounds onboarding request fails validation before
/// anything is written.
#[test]
fn test_onboard_rejects_out_of_bounds_coordinates() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);
    engine.ingest(&[raw_doc("txn-001", Some(901))]).unwrap();

    let mut request = onboard_request(901, "Quezon City");
    request.point = Some(GeoPoint::new(16.4, 120.6));
    let err = engine.onboard(request).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "unexpected error: {err}");

    assert!(engine.store().registry_entry(store_id(901)).unwrap().is_none());
    let counts = engine.store().projection_counts().unwrap();
    assert_eq!(counts.verified, 0);
}

/// Tests that an empty municipality fails validation with nothing written.
#[test]
fn test_onboard_rejects_empty_municipality() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);

    let request = onboard_request(901, "   ");
    let err = engine.onboard(request).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "unexpected error: {err}");
    assert!(engine.store().registry_entry(store_id(901)).unwrap().is_none());
}

/// Tests that a store failure during the onboarding commit leaves no
/// registry entry and no verified projections behind.
#[test]
fn test_onboard_commit_failure_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let inner = Arc::new(open_store(&dir));
    let faulty = FaultInjectingStore { inner: Arc::clone(&inner), fail_commit: true };
    let engine = VerificationEngine::new(faulty, &GeoTrustConfig::default())
        .with_clock(|| Timestamp::from_unix_millis(BASE_MILLIS));

    engine.ingest(&[raw_doc("txn-001", Some(901))]).unwrap();
    let err = engine.onboard(onboard_request(901, "Makati")).unwrap_err();
    assert!(matches!(err, EngineError::Store(StoreError::Db(_))), "unexpected error: {err}");

    assert!(inner.registry_entry(store_id(901)).unwrap().is_none());
    let counts = inner.projection_counts().unwrap();
    assert_eq!(counts, ProjectionCounts { total: 1, verified: 0, unknown: 1 });
}

// ============================================================================
// SECTION: Rebuild
// ============================================================================

/// Tests that a full rebuild verifies mapped projections and converges: the
/// second run changes zero rows.
#[test]
fn test_rebuild_converges_to_fixpoint() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);

    let docs: Vec<Value> =
        (1 ..= 5).map(|n| raw_doc(&format!("txn-{n:03}"), Some(901))).collect();
    engine.ingest(&docs).unwrap();

    // Registry entry committed without touching projections, so the first
    // rebuild has real work to do.
    let entry = sample_entry(901);
    engine.store().commit_onboarding(&entry, &[]).unwrap();

    let first = engine.rebuild(ProjectionScope::All, &never_cancel()).unwrap();
    assert_eq!(first.rows_updated, 5);
    assert_eq!(first.verified_delta, 5);
    assert!(!first.cancelled);

    let second = engine.rebuild(ProjectionScope::All, &never_cancel()).unwrap();
    assert_eq!(second.rows_updated, 0);
    assert_eq!(second.verified_delta, 0);
}

/// Tests that a scoped rebuild leaves other stores' projections untouched.
#[test]
fn test_rebuild_scoped_to_one_store() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);

    engine.ingest(&[raw_doc("txn-001", Some(901)), raw_doc("txn-002", Some(902))]).unwrap();
    engine.store().commit_onboarding(&sample_entry(901), &[]).unwrap();
    engine.store().commit_onboarding(&sample_entry(902), &[]).unwrap();

    let stats = engine.rebuild(ProjectionScope::Store(store_id(901)), &never_cancel()).unwrap();
    assert_eq!(stats.rows_updated, 1);

    let other = engine.store().projection(&TransactionId::new("txn-002")).unwrap().unwrap();
    assert!(!other.quality_flags.location_verified);
}

/// Tests that a pre-set cancellation flag stops the rebuild before any chunk.
#[test]
fn test_rebuild_cancellation_before_first_chunk() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);
    engine.ingest(&[raw_doc("txn-001", Some(901))]).unwrap();
    engine.store().commit_onboarding(&sample_entry(901), &[]).unwrap();

    let cancel = AtomicBool::new(true);
    let stats = engine.rebuild(ProjectionScope::All, &cancel).unwrap();
    assert!(stats.cancelled);
    assert_eq!(stats.rows_updated, 0);
}

// ============================================================================
// SECTION: Integrity Checks
// ============================================================================

/// Tests that fabricated corrupt rows are caught by the integrity checks:
/// a row claiming verification with the sentinel municipality trips both
/// the false-verified and sentinel-leakage assertions.
#[test]
fn test_check_detects_false_verified_and_sentinel_leakage() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);

    let mut projection = sentinel_projection("txn-bad", Some(store_id(901)));
    projection.quality_flags.location_verified = true;
    engine.store().apply_projection_chunk(&[projection]).unwrap();

    let reports = engine.check().unwrap();
    assert_eq!(reports.len(), 5);
    for report in &reports {
        match report.category {
            ViolationCategory::FalseVerified | ViolationCategory::SentinelLeakage => {
                assert_eq!(report.count, 1, "category {}", report.category.as_str());
            }
            _ => assert_eq!(report.count, 0, "category {}", report.category.as_str()),
        }
    }
}

/// Tests that a clean dataset produces five zero-count reports.
#[test]
fn test_check_clean_dataset_reports_all_zero() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);
    engine.ingest(&[raw_doc("txn-001", Some(901))]).unwrap();
    engine.onboard(onboard_request(901, "Pateros")).unwrap();

    let reports = engine.check().unwrap();
    assert_eq!(reports.len(), 5);
    assert!(reports.iter().all(|report| report.count == 0));
}

/// Tests that a verified row disagreeing with its registry municipality is
/// reported as stale rather than as leakage.
#[test]
fn test_check_detects_stale_municipality() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);
    engine.ingest(&[raw_doc("txn-001", Some(901))]).unwrap();
    engine.onboard(onboard_request(901, "Quezon City")).unwrap();

    // Drift the registry under the projection without a rebuild.
    let mut entry = engine.store().registry_entry(store_id(901)).unwrap().unwrap();
    entry.municipality = "Makati City".to_string();
    engine.store().commit_onboarding(&entry, &[]).unwrap();

    let reports = engine.check().unwrap();
    let stale = reports
        .iter()
        .find(|report| report.category == ViolationCategory::StaleMunicipality)
        .unwrap();
    assert_eq!(stale.count, 1);
    assert_eq!(stale.affected_ids, vec!["txn-001".to_string()]);
}

// ============================================================================
// SECTION: Snapshots, SLOs, and Alerts
// ============================================================================

/// Tests snapshot capture over a failing dataset: the system classifies as
/// critical and the verification-rate SLO records a failing status.
#[test]
fn test_snapshot_captures_critical_status() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);
    engine.ingest(&[raw_doc("txn-001", Some(901)), raw_doc("txn-002", None)]).unwrap();

    let snapshot = engine.capture_snapshot().unwrap();
    assert_eq!(snapshot.total, 2);
    assert_eq!(snapshot.verified, 0);
    assert_eq!(snapshot.unknown, 2);
    assert_eq!(snapshot.system_status, SystemStatus::Critical);
    assert_eq!(
        snapshot.slo_statuses.get(&SloName::new("location_verification_rate")),
        Some(&SloStatus::Fail)
    );

    let latest = engine.store().latest_snapshot().unwrap().unwrap();
    assert_eq!(latest, snapshot);
}

/// Tests that an empty dataset counts as fully verified and healthy.
#[test]
fn test_snapshot_empty_dataset_is_healthy() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);

    let snapshot = engine.capture_snapshot().unwrap();
    assert_eq!(snapshot.total, 0);
    assert!((snapshot.verification_rate() - 100.0).abs() < f64::EPSILON);
    assert_eq!(snapshot.system_status, SystemStatus::Healthy);
}

/// Tests the alert grace period: repeated failing evaluations inside the
/// window raise exactly one alert, and a failure past the window raises a
/// second one.
#[test]
fn test_alert_deduplication_within_grace_period() {
    let dir = TempDir::new().unwrap();
    let (engine, clock) = test_engine(&dir);
    engine.ingest(&[raw_doc("txn-001", Some(901))]).unwrap();
    engine.capture_snapshot().unwrap();

    let created = engine.generate_alerts().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].slo_name, SloName::new("location_verification_rate"));
    assert_eq!(created[0].state, AlertState::Open);

    // Still failing ten minutes later: suppressed by the grace window.
    advance_minutes(&clock, 10);
    assert!(engine.generate_alerts().unwrap().is_empty());
    assert_eq!(engine.store().unresolved_alerts().unwrap().len(), 1);

    // Two hours later the window has passed; a fresh alert is allowed.
    advance_minutes(&clock, 120);
    let reraised = engine.generate_alerts().unwrap();
    assert_eq!(reraised.len(), 1);
    assert_eq!(engine.store().unresolved_alerts().unwrap().len(), 2);
}

/// Tests that an SLO passing again auto-resolves its open alerts.
#[test]
fn test_alerts_auto_resolve_on_recovery() {
    let dir = TempDir::new().unwrap();
    let (engine, clock) = test_engine(&dir);
    engine.ingest(&[raw_doc("txn-001", Some(901))]).unwrap();
    engine.capture_snapshot().unwrap();
    assert_eq!(engine.generate_alerts().unwrap().len(), 1);

    engine.onboard(onboard_request(901, "Quezon City")).unwrap();
    advance_minutes(&clock, 5);
    assert!(engine.generate_alerts().unwrap().is_empty());

    let unresolved = engine.store().unresolved_alerts().unwrap();
    assert!(unresolved.is_empty(), "expected auto-resolution, got {unresolved:?}");
}

/// Tests the alert lifecycle: open, acknowledged, resolved, and a rejected
/// second resolution.
#[test]
fn test_alert_lifecycle_transitions() {
    let dir = TempDir::new().unwrap();
    let (engine, clock) = test_engine(&dir);
    engine.ingest(&[raw_doc("txn-001", Some(901))]).unwrap();
    let created = engine.generate_alerts().unwrap();
    let alert_id = created[0].alert_id.clone();

    advance_minutes(&clock, 1);
    let operator = OperatorId::new("ops-ana");
    let acknowledged = engine.acknowledge_alert(&alert_id, &operator).unwrap();
    assert_eq!(acknowledged.state, AlertState::Acknowledged);
    assert_eq!(acknowledged.acknowledged_by, Some(operator.clone()));

    // Acknowledging twice is an illegal transition.
    let err = engine.acknowledge_alert(&alert_id, &operator).unwrap_err();
    assert!(matches!(err, EngineError::Store(StoreError::Invalid(_))));

    advance_minutes(&clock, 1);
    let resolved = engine.resolve_alert(&alert_id).unwrap();
    assert_eq!(resolved.state, AlertState::Resolved);
    assert!(resolved.resolved_at.is_some());

    let err = engine.resolve_alert(&alert_id).unwrap_err();
    assert!(matches!(err, EngineError::Store(StoreError::Invalid(_))));
}

/// Tests that cleanup purges snapshots and resolved alerts past retention
/// while keeping unresolved alerts and recent history.
#[test]
fn test_cleanup_respects_retention_window() {
    let dir = TempDir::new().unwrap();
    let (engine, clock) = test_engine(&dir);
    engine.ingest(&[raw_doc("txn-001", Some(901))]).unwrap();

    engine.capture_snapshot().unwrap();
    let created = engine.generate_alerts().unwrap();
    engine.resolve_alert(&created[0].alert_id).unwrap();

    // Forty days later: the 30-day retention window has lapsed for both.
    advance_minutes(&clock, 40 * 24 * 60);
    engine.capture_snapshot().unwrap();
    let stats = engine.cleanup(30).unwrap();
    assert_eq!(stats.snapshots_purged, 1);
    assert_eq!(stats.alerts_purged, 1);

    // The fresh snapshot survives.
    assert!(engine.store().latest_snapshot().unwrap().is_some());
}

// ============================================================================
// SECTION: Reporting
// ============================================================================

/// Tests the full verification report: totals, per-store rows, and the
/// embedded violation reports agree with one consistent read.
#[test]
fn test_verification_report_per_store_breakdown() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);
    engine
        .ingest(&[
            raw_doc("txn-001", Some(901)),
            raw_doc("txn-002", Some(901)),
            raw_doc("txn-003", Some(902)),
            raw_doc("txn-004", None),
        ])
        .unwrap();
    engine.onboard(onboard_request(901, "Quezon City")).unwrap();

    let report = engine.verification_report().unwrap();
    assert_eq!(report.total, 4);
    assert_eq!(report.verified, 2);
    assert_eq!(report.unknown, 2);
    assert!((report.verification_rate - 50.0).abs() < f64::EPSILON);
    assert_eq!(report.violations.len(), 5);

    let mapped = report.stores.iter().find(|row| row.store_id == store_id(901)).unwrap();
    assert_eq!(mapped.total, 2);
    assert_eq!(mapped.verified, 2);
    assert_eq!(mapped.municipality.as_deref(), Some("Quezon City"));

    let unmapped = report.stores.iter().find(|row| row.store_id == store_id(902)).unwrap();
    assert_eq!(unmapped.total, 1);
    assert_eq!(unmapped.verified, 0);
    assert!(unmapped.store_name.is_none());
}

/// Tests the operator health summary against a failing dataset.
#[test]
fn test_health_summary_reflects_open_alerts() {
    let dir = TempDir::new().unwrap();
    let (engine, _clock) = test_engine(&dir);
    engine.ingest(&[raw_doc("txn-001", Some(901))]).unwrap();
    engine.capture_snapshot().unwrap();
    engine.generate_alerts().unwrap();

    let summary = engine.health_summary().unwrap();
    assert_eq!(summary.system_status, SystemStatus::Critical);
    assert!((summary.verification_rate - 0.0).abs() < f64::EPSILON);
    assert_eq!(summary.open_alerts, 1);
    assert!(summary.latest_snapshot_at.is_some());
    assert!(summary.slo_results.iter().any(|result| result.status == SloStatus::Fail));
}

/// Tests that the trend series returns range-filtered snapshots in order.
#[test]
fn test_trends_filters_by_time_range() {
    let dir = TempDir::new().unwrap();
    let (engine, clock) = test_engine(&dir);
    engine.ingest(&[raw_doc("txn-001", Some(901))]).unwrap();

    engine.capture_snapshot().unwrap();
    advance_minutes(&clock, 60);
    engine.onboard(onboard_request(901, "Quezon City")).unwrap();
    engine.capture_snapshot().unwrap();
    advance_minutes(&clock, 60);
    engine.capture_snapshot().unwrap();

    let from = Timestamp::from_unix_millis(BASE_MILLIS + 30 * 60_000);
    let to = Timestamp::from_unix_millis(BASE_MILLIS + 90 * 60_000);
    let points = engine.trends(from, to).unwrap();
    assert_eq!(points.len(), 1);
    assert!((points[0].verification_rate - 100.0).abs() < f64::EPSILON);
    assert_eq!(points[0].system_status, SystemStatus::Healthy);
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn sample_entry(raw_store_id: u64) -> StoreDimensionEntry {
    let point = GeoPoint::new(14.62, 121.03);
    StoreDimensionEntry {
        store_id: store_id(raw_store_id),
        store_name: format!("Sari-sari {raw_store_id}"),
        trust_domain: "NCR".to_string(),
        municipality: "Quezon City".to_string(),
        barangay: None,
        polygon: Some(Polygon::circle_around(point, 0.5, 16)),
        point: Some(point),
        psgc: PsgcCodes {
            region: "130000000".to_string(),
            province: "137400000".to_string(),
            citymun: Some("137402000".to_string()),
        },
        verified_at: Timestamp::from_unix_millis(BASE_MILLIS),
        source: "field_survey".to_string(),
    }
}

fn sentinel_projection(transaction_id: &str, id: Option<StoreId>) -> TransactionProjection {
    TransactionProjection {
        transaction_id: TransactionId::new(transaction_id),
        store_id: id,
        timestamp: Timestamp::from_unix_millis(BASE_MILLIS),
        basket: geotrust_core::Basket::default(),
        interaction: geotrust_core::Interaction::default(),
        location: ProjectedLocation::unknown(),
        quality_flags: QualityFlags::default(),
        source: geotrust_core::SourceInfo::default(),
    }
}

/// Store wrapper that fails the onboarding commit while delegating all
/// other operations to a real sqlite store.
struct FaultInjectingStore {
    inner: Arc<SqliteVerificationStore>,
    fail_commit: bool,
}

impl RegistryStore for FaultInjectingStore {
    fn registry_entry(&self, id: StoreId) -> Result<Option<StoreDimensionEntry>, StoreError> {
        self.inner.registry_entry(id)
    }

    fn registry_entries(&self) -> Result<Vec<StoreDimensionEntry>, StoreError> {
        self.inner.registry_entries()
    }

    fn commit_onboarding(
        &self,
        entry: &StoreDimensionEntry,
        projections: &[TransactionProjection],
    ) -> Result<(), StoreError> {
        if self.fail_commit {
            return Err(StoreError::Db("injected commit failure".to_string()));
        }
        self.inner.commit_onboarding(entry, projections)
    }
}

impl ProjectionStore for FaultInjectingStore {
    fn projection(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<TransactionProjection>, StoreError> {
        self.inner.projection(transaction_id)
    }

    fn projections_page(
        &self,
        scope: ProjectionScope,
        after: Option<&TransactionId>,
        limit: usize,
    ) -> Result<Vec<TransactionProjection>, StoreError> {
        self.inner.projections_page(scope, after, limit)
    }

    fn apply_projection_chunk(
        &self,
        projections: &[TransactionProjection],
    ) -> Result<u64, StoreError> {
        self.inner.apply_projection_chunk(projections)
    }

    fn projection_counts(&self) -> Result<ProjectionCounts, StoreError> {
        self.inner.projection_counts()
    }

    fn projection_counts_for_store(&self, id: StoreId) -> Result<ProjectionCounts, StoreError> {
        self.inner.projection_counts_for_store(id)
    }

    fn verification_dataset(&self) -> Result<VerificationDataset, StoreError> {
        self.inner.verification_dataset()
    }
}

impl SnapshotStore for FaultInjectingStore {
    fn append_snapshot(&self, snapshot: &VerificationSnapshot) -> Result<(), StoreError> {
        self.inner.append_snapshot(snapshot)
    }

    fn latest_snapshot(&self) -> Result<Option<VerificationSnapshot>, StoreError> {
        self.inner.latest_snapshot()
    }

    fn snapshots_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<VerificationSnapshot>, StoreError> {
        self.inner.snapshots_between(from, to)
    }

    fn purge_snapshots_before(&self, cutoff: Timestamp) -> Result<u64, StoreError> {
        self.inner.purge_snapshots_before(cutoff)
    }
}

impl AlertStore for FaultInjectingStore {
    fn insert_alert_if_absent(
        &self,
        alert: &Alert,
        window_start: Timestamp,
    ) -> Result<bool, StoreError> {
        self.inner.insert_alert_if_absent(alert, window_start)
    }

    fn alert(&self, alert_id: &AlertId) -> Result<Option<Alert>, StoreError> {
        self.inner.alert(alert_id)
    }

    fn unresolved_alerts(&self) -> Result<Vec<Alert>, StoreError> {
        self.inner.unresolved_alerts()
    }

    fn acknowledge_alert(
        &self,
        alert_id: &AlertId,
        operator: &OperatorId,
        at: Timestamp,
    ) -> Result<Alert, StoreError> {
        self.inner.acknowledge_alert(alert_id, operator, at)
    }

    fn resolve_alert(&self, alert_id: &AlertId, at: Timestamp) -> Result<Alert, StoreError> {
        self.inner.resolve_alert(alert_id, at)
    }

    fn resolve_alerts_for_slo(&self, slo_name: &SloName, at: Timestamp) -> Result<u64, StoreError> {
        self.inner.resolve_alerts_for_slo(slo_name, at)
    }

    fn purge_resolved_alerts_before(&self, cutoff: Timestamp) -> Result<u64, StoreError> {
        self.inner.purge_resolved_alerts_before(cutoff)
    }
}
