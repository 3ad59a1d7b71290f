// crates/geotrust-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Verification Store
// Description: Durable VerificationStore backed by SQLite WAL.
// Purpose: Persist registry, projection, snapshot, and alert state.
// Dependencies: geotrust-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements every durable store surface using `SQLite`. Records
//! are persisted as canonical JSON with stored hashes; loads verify integrity
//! and fail closed on corruption. One writer connection behind a mutex serves
//! every mutation, so multi-row guarantees (onboarding commits, chunk upserts,
//! alert dedup check-and-insert) are ordinary single transactions. Reads go
//! through a small round-robin pool of additional connections under WAL.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use geotrust_core::Alert;
use geotrust_core::AlertId;
use geotrust_core::AlertStore;
use geotrust_core::OperatorId;
use geotrust_core::ProjectionAuditRow;
use geotrust_core::ProjectionCounts;
use geotrust_core::ProjectionScope;
use geotrust_core::ProjectionStore;
use geotrust_core::RegistryStore;
use geotrust_core::SloName;
use geotrust_core::SnapshotStore;
use geotrust_core::StoreDimensionEntry;
use geotrust_core::StoreError;
use geotrust_core::StoreId;
use geotrust_core::Timestamp;
use geotrust_core::TransactionId;
use geotrust_core::TransactionProjection;
use geotrust_core::VerificationDataset;
use geotrust_core::VerificationSnapshot;
use geotrust_core::hashing::DEFAULT_HASH_ALGORITHM;
use geotrust_core::hashing::canonical_json_bytes;
use geotrust_core::hashing::hash_bytes;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Millisecond bucket boundaries used for lightweight store perf snapshots.
const PERF_BUCKETS_MS: [u64; 10] = [1, 2, 5, 10, 20, 50, 100, 250, 500, 1_000];
/// Microsecond bucket boundaries used for read-pool lock wait histograms.
const READ_WAIT_TIME_BUCKETS_US: [u64; 10] =
    [100, 250, 500, 1_000, 2_500, 5_000, 10_000, 25_000, 50_000, 100_000];

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` verification store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `read_pool_size` must be greater than zero.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Number of read-only connections used for read path isolation.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,
}

impl SqliteStoreConfig {
    /// Builds a configuration with defaults for everything but the path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            read_pool_size: default_read_pool_size(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default read connection pool size.
const fn default_read_pool_size() -> usize {
    4
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw projection or registry payloads.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Requested record does not exist.
    #[error("sqlite store record not found: {0}")]
    NotFound(String),
    /// Store is overloaded and the caller should retry.
    #[error("sqlite store overloaded: {message}")]
    Overloaded {
        /// Retryable overload message.
        message: String,
        /// Optional retry delay in milliseconds.
        retry_after_ms: Option<u64>,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Db(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::NotFound(message) => Self::NotFound(message),
            SqliteStoreError::Overloaded {
                message,
                retry_after_ms,
            } => Self::Overloaded {
                message,
                retry_after_ms,
            },
        }
    }
}

// ============================================================================
// SECTION: Perf Stats
// ============================================================================

/// Store-level operation counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqliteStoreOpCounts {
    /// Read operations across every store surface.
    pub read: u64,
    /// Write operations across every store surface.
    pub write: u64,
}

/// Classified database error counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqliteDbErrorCounts {
    /// Count of `busy` database errors.
    pub busy: u64,
    /// Count of `locked` database errors.
    pub locked: u64,
    /// Count of all other database errors.
    pub other: u64,
}

/// Snapshot of lightweight `SQLite` perf/contention stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlitePerfStatsSnapshot {
    /// Per-class operation counts.
    pub op_counts: SqliteStoreOpCounts,
    /// Operation latencies represented as `<= upper_bound` buckets plus overflow slot.
    pub latency_buckets_ms: Vec<u64>,
    /// Read-operation histogram counts (length = `latency_buckets_ms.len() + 1`).
    pub read_latency_histogram: Vec<u64>,
    /// Write-operation histogram counts (length = `latency_buckets_ms.len() + 1`).
    pub write_latency_histogram: Vec<u64>,
    /// Cumulative read duration in milliseconds.
    pub read_total_duration_ms: u64,
    /// Cumulative write duration in milliseconds.
    pub write_total_duration_ms: u64,
    /// Read-pool lock wait bucket boundaries in microseconds.
    pub read_wait_buckets_us: Vec<u64>,
    /// Read-pool lock wait histogram counts.
    pub read_wait_histogram_us: Vec<u64>,
    /// Read-pool lock wait p50 estimate in microseconds.
    pub read_wait_p50_us: u64,
    /// Read-pool lock wait p95 estimate in microseconds.
    pub read_wait_p95_us: u64,
    /// Database error counters.
    pub db_errors: SqliteDbErrorCounts,
}

/// Internal mutable perf counters before snapshot serialization.
#[derive(Debug, Default)]
struct SqlitePerfStats {
    /// Per-operation counters.
    op_counts: SqliteStoreOpCounts,
    /// Read-operation latency histogram.
    read_latency_histogram: [u64; PERF_BUCKETS_MS.len() + 1],
    /// Write-operation latency histogram.
    write_latency_histogram: [u64; PERF_BUCKETS_MS.len() + 1],
    /// Cumulative read duration in milliseconds.
    read_total_duration_ms: u64,
    /// Cumulative write duration in milliseconds.
    write_total_duration_ms: u64,
    /// Read-pool lock wait histogram in microseconds.
    read_wait_histogram_us: [u64; READ_WAIT_TIME_BUCKETS_US.len() + 1],
    /// Classified database error counters.
    db_errors: SqliteDbErrorCounts,
}

/// Performance operation class used for histogram/counter updates.
#[derive(Debug, Clone, Copy)]
enum SqlitePerfOp {
    /// Any read-path operation.
    Read,
    /// Any write-path operation.
    Write,
}

/// Classified database error kind for contention accounting.
#[derive(Debug, Clone, Copy)]
enum SqliteDbErrorKind {
    /// `SQLITE_BUSY` class errors.
    Busy,
    /// `SQLITE_LOCKED` class errors.
    Locked,
    /// Everything else.
    Other,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed verification store with WAL support.
///
/// # Invariants
/// - Loads verify stored hashes before deserialization.
/// - All mutations flow through one writer connection behind a mutex.
#[derive(Clone)]
pub struct SqliteVerificationStore {
    /// Shared writer connection guarded by a mutex.
    write_connection: Arc<Mutex<Connection>>,
    /// Read connection pool used for read path isolation under WAL.
    read_connections: Arc<Vec<Mutex<Connection>>>,
    /// Round-robin cursor for read connection selection.
    read_cursor: Arc<AtomicUsize>,
    /// Lightweight operation stats used for local performance diagnostics.
    perf_stats: Arc<Mutex<SqlitePerfStats>>,
}

impl SqliteVerificationStore {
    /// Opens an `SQLite`-backed verification store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        if config.read_pool_size == 0 {
            return Err(SqliteStoreError::Invalid(
                "read_pool_size must be greater than zero".to_string(),
            ));
        }
        let mut write_connection = open_connection(config)?;
        initialize_schema(&mut write_connection)?;
        let mut read_connections = Vec::with_capacity(config.read_pool_size);
        for _ in 0 .. config.read_pool_size {
            read_connections.push(Mutex::new(open_connection(config)?));
        }
        Ok(Self {
            write_connection: Arc::new(Mutex::new(write_connection)),
            read_connections: Arc::new(read_connections),
            read_cursor: Arc::new(AtomicUsize::new(0)),
            perf_stats: Arc::new(Mutex::new(SqlitePerfStats::default())),
        })
    }

    /// Verifies the store can execute a simple statement on both paths.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if a mutex is poisoned or a query fails.
    pub fn check_connection(&self) -> Result<(), SqliteStoreError> {
        {
            let guard = self.lock_read()?;
            guard.execute("SELECT 1", []).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        let guard = self.lock_write()?;
        guard.execute("SELECT 1", []).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Returns a snapshot of lightweight operation and contention stats.
    #[must_use]
    pub fn perf_stats_snapshot(&self) -> SqlitePerfStatsSnapshot {
        let guard = self.perf_stats.lock().unwrap_or_else(PoisonError::into_inner);
        SqlitePerfStatsSnapshot {
            op_counts: guard.op_counts.clone(),
            latency_buckets_ms: PERF_BUCKETS_MS.to_vec(),
            read_latency_histogram: guard.read_latency_histogram.to_vec(),
            write_latency_histogram: guard.write_latency_histogram.to_vec(),
            read_total_duration_ms: guard.read_total_duration_ms,
            write_total_duration_ms: guard.write_total_duration_ms,
            read_wait_buckets_us: READ_WAIT_TIME_BUCKETS_US.to_vec(),
            read_wait_histogram_us: guard.read_wait_histogram_us.to_vec(),
            read_wait_p50_us: histogram_percentile(
                &READ_WAIT_TIME_BUCKETS_US,
                &guard.read_wait_histogram_us,
                50,
            ),
            read_wait_p95_us: histogram_percentile(
                &READ_WAIT_TIME_BUCKETS_US,
                &guard.read_wait_histogram_us,
                95,
            ),
            db_errors: guard.db_errors.clone(),
        }
    }

    /// Returns the next read connection guard using round-robin selection.
    fn lock_read(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        let len = self.read_connections.len();
        let index = self.read_cursor.fetch_add(1, Ordering::Relaxed) % len;
        let wait_started = Instant::now();
        let guard = self.read_connections[index]
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite read mutex poisoned".to_string()))?;
        let wait_us = u64::try_from(wait_started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.record_read_wait(wait_us);
        Ok(guard)
    }

    /// Returns the writer connection guard.
    fn lock_write(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite write mutex poisoned".to_string()))
    }

    /// Records one store operation in the perf counters.
    fn record_store_op(&self, op: SqlitePerfOp, elapsed: Duration, db_error: Option<&str>) {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let bucket_index = histogram_bucket_index_from_bounds(&PERF_BUCKETS_MS, elapsed_ms);
        let Ok(mut stats) = self.perf_stats.lock() else {
            return;
        };
        match op {
            SqlitePerfOp::Read => {
                stats.op_counts.read = stats.op_counts.read.saturating_add(1);
                stats.read_total_duration_ms =
                    stats.read_total_duration_ms.saturating_add(elapsed_ms);
                if let Some(slot) = stats.read_latency_histogram.get_mut(bucket_index) {
                    *slot = slot.saturating_add(1);
                }
            }
            SqlitePerfOp::Write => {
                stats.op_counts.write = stats.op_counts.write.saturating_add(1);
                stats.write_total_duration_ms =
                    stats.write_total_duration_ms.saturating_add(elapsed_ms);
                if let Some(slot) = stats.write_latency_histogram.get_mut(bucket_index) {
                    *slot = slot.saturating_add(1);
                }
            }
        }
        if let Some(message) = db_error {
            match classify_db_error_message(message) {
                SqliteDbErrorKind::Busy => {
                    stats.db_errors.busy = stats.db_errors.busy.saturating_add(1);
                }
                SqliteDbErrorKind::Locked => {
                    stats.db_errors.locked = stats.db_errors.locked.saturating_add(1);
                }
                SqliteDbErrorKind::Other => {
                    stats.db_errors.other = stats.db_errors.other.saturating_add(1);
                }
            }
        }
    }

    /// Records read-pool lock wait in microseconds.
    fn record_read_wait(&self, wait_us: u64) {
        let bucket = histogram_bucket_index_from_bounds(&READ_WAIT_TIME_BUCKETS_US, wait_us);
        let Ok(mut stats) = self.perf_stats.lock() else {
            return;
        };
        if let Some(slot) = stats.read_wait_histogram_us.get_mut(bucket) {
            *slot = slot.saturating_add(1);
        }
    }

    /// Runs a read-path closure with perf accounting.
    fn with_read<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, StoreError> {
        let started = Instant::now();
        let result = self.lock_read().and_then(|guard| op(&guard));
        self.record_store_op(
            SqlitePerfOp::Read,
            started.elapsed(),
            result.as_ref().err().and_then(db_error_message),
        );
        result.map_err(StoreError::from)
    }

    /// Runs a write-path closure inside one transaction with perf accounting.
    fn with_write_tx<T>(
        &self,
        op: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T, SqliteStoreError>,
    ) -> Result<T, StoreError> {
        let started = Instant::now();
        let result = self.lock_write().and_then(|mut guard| {
            let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let value = op(&tx)?;
            tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(value)
        });
        self.record_store_op(
            SqlitePerfOp::Write,
            started.elapsed(),
            result.as_ref().err().and_then(db_error_message),
        );
        result.map_err(StoreError::from)
    }
}

/// Extracts a database error message for contention classification.
fn db_error_message(error: &SqliteStoreError) -> Option<&str> {
    match error {
        SqliteStoreError::Db(message) => Some(message.as_str()),
        _ => None,
    }
}

// ============================================================================
// SECTION: Row Codecs
// ============================================================================

/// Canonical JSON bytes plus hash metadata for one persisted record.
struct EncodedRecord {
    /// Canonical JSON payload.
    json: Vec<u8>,
    /// Canonical hash of `json`.
    hash: String,
    /// Hash algorithm label for `hash`.
    hash_algorithm: String,
}

/// Encodes a record as canonical JSON with its content hash.
fn encode_record<T: Serialize>(value: &T) -> Result<EncodedRecord, SqliteStoreError> {
    let json =
        canonical_json_bytes(value).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    let digest = hash_bytes(&json);
    Ok(EncodedRecord {
        json,
        hash: digest.value,
        hash_algorithm: digest.algorithm,
    })
}

/// Decodes a stored record after verifying its hash.
fn decode_record<T: DeserializeOwned>(
    json: &[u8],
    stored_hash: &str,
    stored_algorithm: &str,
    context: &str,
) -> Result<T, SqliteStoreError> {
    if stored_algorithm != DEFAULT_HASH_ALGORITHM {
        return Err(SqliteStoreError::Corrupt(format!(
            "{context}: unsupported hash algorithm {stored_algorithm}"
        )));
    }
    let digest = hash_bytes(json);
    if digest.value != stored_hash {
        return Err(SqliteStoreError::Corrupt(format!("{context}: content hash mismatch")));
    }
    serde_json::from_slice(json)
        .map_err(|err| SqliteStoreError::Corrupt(format!("{context}: {err}")))
}

/// Converts a store identifier into its signed column value.
fn store_id_column(store_id: StoreId) -> Result<i64, SqliteStoreError> {
    i64::try_from(store_id.get())
        .map_err(|_| SqliteStoreError::Invalid(format!("store id {store_id} out of range")))
}

/// Converts a signed column value back into a store identifier.
fn store_id_from_column(value: i64) -> Result<StoreId, SqliteStoreError> {
    let raw = u64::try_from(value)
        .map_err(|_| SqliteStoreError::Corrupt(format!("negative store id column: {value}")))?;
    StoreId::from_raw(raw)
        .ok_or_else(|| SqliteStoreError::Corrupt("zero store id column".to_string()))
}

/// Upserts one projection row, returning true when the stored content changed.
fn upsert_projection(
    tx: &rusqlite::Transaction<'_>,
    projection: &TransactionProjection,
) -> Result<bool, SqliteStoreError> {
    let encoded = encode_record(projection)?;
    let existing: Option<String> = tx
        .query_row(
            "SELECT content_hash FROM projections WHERE transaction_id = ?1",
            params![projection.transaction_id.as_str()],
            |row| row.get(0),
        )
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    if existing.as_deref() == Some(encoded.hash.as_str()) {
        return Ok(false);
    }
    let store_id = match projection.store_id {
        Some(store_id) => Some(store_id_column(store_id)?),
        None => None,
    };
    tx.execute(
        "INSERT OR REPLACE INTO projections (
            transaction_id, store_id, verified, municipality,
            projection_json, content_hash, hash_algorithm, event_time
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            projection.transaction_id.as_str(),
            store_id,
            i64::from(projection.quality_flags.location_verified),
            projection.location.municipality,
            encoded.json,
            encoded.hash,
            encoded.hash_algorithm,
            projection.timestamp.as_unix_millis(),
        ],
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(true)
}

/// Reads aggregate projection counts inside an open transaction or connection.
fn read_counts(
    connection: &Connection,
    store_filter: Option<i64>,
) -> Result<ProjectionCounts, SqliteStoreError> {
    let (sql, params_vec): (&str, Vec<i64>) = match store_filter {
        Some(store_id) => (
            "SELECT COUNT(1), COALESCE(SUM(verified), 0) FROM projections WHERE store_id = ?1",
            vec![store_id],
        ),
        None => ("SELECT COUNT(1), COALESCE(SUM(verified), 0) FROM projections", Vec::new()),
    };
    let (total, verified): (i64, i64) = connection
        .query_row(sql, rusqlite::params_from_iter(params_vec), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let total = u64::try_from(total)
        .map_err(|_| SqliteStoreError::Corrupt("negative projection count".to_string()))?;
    let verified = u64::try_from(verified)
        .map_err(|_| SqliteStoreError::Corrupt("negative verified count".to_string()))?;
    let unknown = total.saturating_sub(verified);
    Ok(ProjectionCounts {
        total,
        verified,
        unknown,
    })
}

/// Decodes one registry entry row.
fn registry_entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(Vec<u8>, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

// ============================================================================
// SECTION: Registry Store
// ============================================================================

impl RegistryStore for SqliteVerificationStore {
    fn registry_entry(&self, store_id: StoreId) -> Result<Option<StoreDimensionEntry>, StoreError> {
        self.with_read(|connection| {
            let column = store_id_column(store_id)?;
            let row: Option<(Vec<u8>, String, String)> = connection
                .query_row(
                    "SELECT entry_json, entry_hash, hash_algorithm
                     FROM store_dim WHERE store_id = ?1",
                    params![column],
                    registry_entry_from_row,
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            match row {
                Some((json, hash, algorithm)) => {
                    let entry =
                        decode_record(&json, &hash, &algorithm, &format!("store_dim {store_id}"))?;
                    Ok(Some(entry))
                }
                None => Ok(None),
            }
        })
    }

    fn registry_entries(&self) -> Result<Vec<StoreDimensionEntry>, StoreError> {
        self.with_read(|connection| {
            let mut statement = connection
                .prepare(
                    "SELECT entry_json, entry_hash, hash_algorithm
                     FROM store_dim ORDER BY store_id ASC",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map([], registry_entry_from_row)
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut entries = Vec::new();
            for row in rows {
                let (json, hash, algorithm) =
                    row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                entries.push(decode_record(&json, &hash, &algorithm, "store_dim")?);
            }
            Ok(entries)
        })
    }

    fn commit_onboarding(
        &self,
        entry: &StoreDimensionEntry,
        projections: &[TransactionProjection],
    ) -> Result<(), StoreError> {
        self.with_write_tx(|tx| {
            let encoded = encode_record(entry)?;
            let column = store_id_column(entry.store_id)?;
            tx.execute(
                "INSERT OR REPLACE INTO store_dim (
                    store_id, municipality, verified_at,
                    entry_json, entry_hash, hash_algorithm
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    column,
                    entry.municipality,
                    entry.verified_at.as_unix_millis(),
                    encoded.json,
                    encoded.hash,
                    encoded.hash_algorithm,
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            for projection in projections {
                upsert_projection(tx, projection)?;
            }
            Ok(())
        })
    }
}

// ============================================================================
// SECTION: Projection Store
// ============================================================================

impl ProjectionStore for SqliteVerificationStore {
    fn projection(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<TransactionProjection>, StoreError> {
        self.with_read(|connection| {
            let row: Option<(Vec<u8>, String, String)> = connection
                .query_row(
                    "SELECT projection_json, content_hash, hash_algorithm
                     FROM projections WHERE transaction_id = ?1",
                    params![transaction_id.as_str()],
                    registry_entry_from_row,
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            match row {
                Some((json, hash, algorithm)) => {
                    let context = format!("projection {}", transaction_id.as_str());
                    Ok(Some(decode_record(&json, &hash, &algorithm, &context)?))
                }
                None => Ok(None),
            }
        })
    }

    fn projections_page(
        &self,
        scope: ProjectionScope,
        after: Option<&TransactionId>,
        limit: usize,
    ) -> Result<Vec<TransactionProjection>, StoreError> {
        self.with_read(|connection| {
            let limit = i64::try_from(limit)
                .map_err(|_| SqliteStoreError::Invalid("page limit out of range".to_string()))?;
            let cursor = after.map_or("", TransactionId::as_str);
            let mut rows: Vec<(Vec<u8>, String, String)> = Vec::new();
            match scope {
                ProjectionScope::All => {
                    let mut statement = connection
                        .prepare(
                            "SELECT projection_json, content_hash, hash_algorithm
                             FROM projections WHERE transaction_id > ?1
                             ORDER BY transaction_id ASC LIMIT ?2",
                        )
                        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                    let mapped = statement
                        .query_map(params![cursor, limit], registry_entry_from_row)
                        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                    for row in mapped {
                        rows.push(row.map_err(|err| SqliteStoreError::Db(err.to_string()))?);
                    }
                }
                ProjectionScope::Store(store_id) => {
                    let column = store_id_column(store_id)?;
                    let mut statement = connection
                        .prepare(
                            "SELECT projection_json, content_hash, hash_algorithm
                             FROM projections WHERE store_id = ?1 AND transaction_id > ?2
                             ORDER BY transaction_id ASC LIMIT ?3",
                        )
                        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                    let mapped = statement
                        .query_map(params![column, cursor, limit], registry_entry_from_row)
                        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                    for row in mapped {
                        rows.push(row.map_err(|err| SqliteStoreError::Db(err.to_string()))?);
                    }
                }
            }
            let mut page = Vec::with_capacity(rows.len());
            for (json, hash, algorithm) in rows {
                page.push(decode_record(&json, &hash, &algorithm, "projection page")?);
            }
            Ok(page)
        })
    }

    fn apply_projection_chunk(
        &self,
        projections: &[TransactionProjection],
    ) -> Result<u64, StoreError> {
        self.with_write_tx(|tx| {
            let mut changed = 0_u64;
            for projection in projections {
                if upsert_projection(tx, projection)? {
                    changed = changed.saturating_add(1);
                }
            }
            Ok(changed)
        })
    }

    fn projection_counts(&self) -> Result<ProjectionCounts, StoreError> {
        self.with_read(|connection| read_counts(connection, None))
    }

    fn projection_counts_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<ProjectionCounts, StoreError> {
        self.with_read(|connection| {
            let column = store_id_column(store_id)?;
            read_counts(connection, Some(column))
        })
    }

    fn verification_dataset(&self) -> Result<VerificationDataset, StoreError> {
        let started = Instant::now();
        let result = self.lock_read().and_then(|mut guard| {
            let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let counts = read_counts(&tx, None)?;
            let mut entries = Vec::new();
            {
                let mut statement = tx
                    .prepare(
                        "SELECT entry_json, entry_hash, hash_algorithm
                         FROM store_dim ORDER BY store_id ASC",
                    )
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                let rows = statement
                    .query_map([], registry_entry_from_row)
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                for row in rows {
                    let (json, hash, algorithm) =
                        row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                    entries.push(decode_record(&json, &hash, &algorithm, "store_dim")?);
                }
            }
            let mut audit_rows = Vec::new();
            {
                let mut statement = tx
                    .prepare(
                        "SELECT transaction_id, store_id, verified, municipality, projection_json
                         FROM projections ORDER BY transaction_id ASC",
                    )
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                let rows = statement
                    .query_map([], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, Option<i64>>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, Vec<u8>>(4)?,
                        ))
                    })
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                for row in rows {
                    let (transaction_id, store_id, verified, municipality, json) =
                        row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                    let store_id = match store_id {
                        Some(column) => Some(store_id_from_column(column)?),
                        None => None,
                    };
                    let projection_json = String::from_utf8(json).map_err(|_| {
                        SqliteStoreError::Corrupt(format!(
                            "projection {transaction_id}: payload is not utf-8"
                        ))
                    })?;
                    audit_rows.push(ProjectionAuditRow {
                        transaction_id: TransactionId::new(transaction_id),
                        store_id,
                        verified: verified != 0,
                        municipality,
                        projection_json,
                    });
                }
            }
            tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(VerificationDataset {
                counts,
                entries,
                rows: audit_rows,
            })
        });
        self.record_store_op(
            SqlitePerfOp::Read,
            started.elapsed(),
            result.as_ref().err().and_then(db_error_message),
        );
        result.map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Snapshot Store
// ============================================================================

impl SnapshotStore for SqliteVerificationStore {
    fn append_snapshot(&self, snapshot: &VerificationSnapshot) -> Result<(), StoreError> {
        self.with_write_tx(|tx| {
            let encoded = encode_record(snapshot)?;
            tx.execute(
                "INSERT INTO snapshots (
                    captured_at, snapshot_json, snapshot_hash, hash_algorithm
                 ) VALUES (?1, ?2, ?3, ?4)",
                params![
                    snapshot.captured_at.as_unix_millis(),
                    encoded.json,
                    encoded.hash,
                    encoded.hash_algorithm,
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
    }

    fn latest_snapshot(&self) -> Result<Option<VerificationSnapshot>, StoreError> {
        self.with_read(|connection| {
            let row: Option<(Vec<u8>, String, String)> = connection
                .query_row(
                    "SELECT snapshot_json, snapshot_hash, hash_algorithm
                     FROM snapshots ORDER BY captured_at DESC, rowid DESC LIMIT 1",
                    [],
                    registry_entry_from_row,
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            match row {
                Some((json, hash, algorithm)) => {
                    Ok(Some(decode_record(&json, &hash, &algorithm, "snapshot")?))
                }
                None => Ok(None),
            }
        })
    }

    fn snapshots_between(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<VerificationSnapshot>, StoreError> {
        self.with_read(|connection| {
            let mut statement = connection
                .prepare(
                    "SELECT snapshot_json, snapshot_hash, hash_algorithm
                     FROM snapshots WHERE captured_at >= ?1 AND captured_at <= ?2
                     ORDER BY captured_at ASC, rowid ASC",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map(
                    params![from.as_unix_millis(), to.as_unix_millis()],
                    registry_entry_from_row,
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut snapshots = Vec::new();
            for row in rows {
                let (json, hash, algorithm) =
                    row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                snapshots.push(decode_record(&json, &hash, &algorithm, "snapshot")?);
            }
            Ok(snapshots)
        })
    }

    fn purge_snapshots_before(&self, cutoff: Timestamp) -> Result<u64, StoreError> {
        self.with_write_tx(|tx| {
            let removed = tx
                .execute(
                    "DELETE FROM snapshots WHERE captured_at < ?1",
                    params![cutoff.as_unix_millis()],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(u64::try_from(removed).unwrap_or(u64::MAX))
        })
    }
}

// ============================================================================
// SECTION: Alert Store
// ============================================================================

/// Loads one alert row inside an open transaction.
fn load_alert_for_update(
    tx: &rusqlite::Transaction<'_>,
    alert_id: &AlertId,
) -> Result<Alert, SqliteStoreError> {
    let row: Option<(Vec<u8>, String, String)> = tx
        .query_row(
            "SELECT alert_json, alert_hash, hash_algorithm FROM alerts WHERE alert_id = ?1",
            params![alert_id.as_str()],
            registry_entry_from_row,
        )
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match row {
        Some((json, hash, algorithm)) => {
            decode_record(&json, &hash, &algorithm, &format!("alert {alert_id}"))
        }
        None => Err(SqliteStoreError::NotFound(format!("alert {alert_id}"))),
    }
}

/// Writes an updated alert row inside an open transaction.
fn persist_alert_update(
    tx: &rusqlite::Transaction<'_>,
    alert: &Alert,
) -> Result<(), SqliteStoreError> {
    let encoded = encode_record(alert)?;
    tx.execute(
        "UPDATE alerts SET
            state = ?2, resolved_at = ?3,
            alert_json = ?4, alert_hash = ?5, hash_algorithm = ?6
         WHERE alert_id = ?1",
        params![
            alert.alert_id.as_str(),
            alert.state.as_str(),
            alert.resolved_at.map(Timestamp::as_unix_millis),
            encoded.json,
            encoded.hash,
            encoded.hash_algorithm,
        ],
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

impl AlertStore for SqliteVerificationStore {
    fn insert_alert_if_absent(
        &self,
        alert: &Alert,
        window_start: Timestamp,
    ) -> Result<bool, StoreError> {
        self.with_write_tx(|tx| {
            let duplicates: i64 = tx
                .query_row(
                    "SELECT COUNT(1) FROM alerts
                     WHERE slo_name = ?1 AND state != 'resolved' AND triggered_at >= ?2",
                    params![alert.slo_name.as_str(), window_start.as_unix_millis()],
                    |row| row.get(0),
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            if duplicates > 0 {
                return Ok(false);
            }
            let encoded = encode_record(alert)?;
            tx.execute(
                "INSERT INTO alerts (
                    alert_id, slo_name, state, triggered_at, resolved_at,
                    alert_json, alert_hash, hash_algorithm
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    alert.alert_id.as_str(),
                    alert.slo_name.as_str(),
                    alert.state.as_str(),
                    alert.triggered_at.as_unix_millis(),
                    alert.resolved_at.map(Timestamp::as_unix_millis),
                    encoded.json,
                    encoded.hash,
                    encoded.hash_algorithm,
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(true)
        })
    }

    fn alert(&self, alert_id: &AlertId) -> Result<Option<Alert>, StoreError> {
        self.with_read(|connection| {
            let row: Option<(Vec<u8>, String, String)> = connection
                .query_row(
                    "SELECT alert_json, alert_hash, hash_algorithm
                     FROM alerts WHERE alert_id = ?1",
                    params![alert_id.as_str()],
                    registry_entry_from_row,
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            match row {
                Some((json, hash, algorithm)) => {
                    let context = format!("alert {alert_id}");
                    Ok(Some(decode_record(&json, &hash, &algorithm, &context)?))
                }
                None => Ok(None),
            }
        })
    }

    fn unresolved_alerts(&self) -> Result<Vec<Alert>, StoreError> {
        self.with_read(|connection| {
            let mut statement = connection
                .prepare(
                    "SELECT alert_json, alert_hash, hash_algorithm
                     FROM alerts WHERE state != 'resolved'
                     ORDER BY triggered_at ASC, alert_id ASC",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map([], registry_entry_from_row)
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut alerts = Vec::new();
            for row in rows {
                let (json, hash, algorithm) =
                    row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                alerts.push(decode_record(&json, &hash, &algorithm, "alert")?);
            }
            Ok(alerts)
        })
    }

    fn acknowledge_alert(
        &self,
        alert_id: &AlertId,
        operator: &OperatorId,
        at: Timestamp,
    ) -> Result<Alert, StoreError> {
        self.with_write_tx(|tx| {
            let mut alert = load_alert_for_update(tx, alert_id)?;
            alert
                .acknowledge(operator.clone(), at)
                .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
            persist_alert_update(tx, &alert)?;
            Ok(alert)
        })
    }

    fn resolve_alert(&self, alert_id: &AlertId, at: Timestamp) -> Result<Alert, StoreError> {
        self.with_write_tx(|tx| {
            let mut alert = load_alert_for_update(tx, alert_id)?;
            alert.resolve(at).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
            persist_alert_update(tx, &alert)?;
            Ok(alert)
        })
    }

    fn resolve_alerts_for_slo(
        &self,
        slo_name: &SloName,
        at: Timestamp,
    ) -> Result<u64, StoreError> {
        self.with_write_tx(|tx| {
            let mut ids = Vec::new();
            {
                let mut statement = tx
                    .prepare(
                        "SELECT alert_id FROM alerts
                         WHERE slo_name = ?1 AND state != 'resolved'",
                    )
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                let rows = statement
                    .query_map(params![slo_name.as_str()], |row| row.get::<_, String>(0))
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                for row in rows {
                    ids.push(row.map_err(|err| SqliteStoreError::Db(err.to_string()))?);
                }
            }
            let mut resolved = 0_u64;
            for id in ids {
                let alert_id = AlertId::new(id);
                let mut alert = load_alert_for_update(tx, &alert_id)?;
                alert.resolve(at).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
                persist_alert_update(tx, &alert)?;
                resolved = resolved.saturating_add(1);
            }
            Ok(resolved)
        })
    }

    fn purge_resolved_alerts_before(&self, cutoff: Timestamp) -> Result<u64, StoreError> {
        self.with_write_tx(|tx| {
            let removed = tx
                .execute(
                    "DELETE FROM alerts WHERE state = 'resolved' AND resolved_at < ?1",
                    params![cutoff.as_unix_millis()],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(u64::try_from(removed).unwrap_or(u64::MAX))
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Computes the histogram bucket index for a value given bucket bounds.
fn histogram_bucket_index_from_bounds(bounds: &[u64], value: u64) -> usize {
    for (index, bound) in bounds.iter().enumerate() {
        if value <= *bound {
            return index;
        }
    }
    bounds.len()
}

/// Estimates a percentile from cumulative histogram counts.
fn histogram_percentile(bounds: &[u64], counts: &[u64], percentile: u32) -> u64 {
    if percentile == 0 || percentile > 100 || counts.is_empty() || bounds.is_empty() {
        return 0;
    }
    let total = counts.iter().fold(0_u64, |acc, value| acc.saturating_add(*value));
    if total == 0 {
        return 0;
    }
    let rank =
        total.saturating_mul(u64::from(percentile)).saturating_add(99).saturating_div(100).max(1);
    let mut running = 0_u64;
    for (idx, count) in counts.iter().enumerate() {
        running = running.saturating_add(*count);
        if running >= rank {
            return if idx < bounds.len() {
                bounds[idx]
            } else {
                bounds.last().copied().unwrap_or(0)
            };
        }
    }
    bounds.last().copied().unwrap_or(0)
}

/// Classifies a database error message for contention accounting.
fn classify_db_error_message(message: &str) -> SqliteDbErrorKind {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("busy") {
        SqliteDbErrorKind::Busy
    } else if lowered.contains("locked") {
        SqliteDbErrorKind::Locked
    } else {
        SqliteDbErrorKind::Other
    }
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS store_dim (
                    store_id INTEGER PRIMARY KEY,
                    municipality TEXT NOT NULL,
                    verified_at INTEGER NOT NULL,
                    entry_json BLOB NOT NULL,
                    entry_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS projections (
                    transaction_id TEXT PRIMARY KEY,
                    store_id INTEGER,
                    verified INTEGER NOT NULL,
                    municipality TEXT NOT NULL,
                    projection_json BLOB NOT NULL,
                    content_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    event_time INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_projections_store_id
                    ON projections (store_id, transaction_id);
                CREATE TABLE IF NOT EXISTS snapshots (
                    captured_at INTEGER NOT NULL,
                    snapshot_json BLOB NOT NULL,
                    snapshot_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_snapshots_captured_at
                    ON snapshots (captured_at);
                CREATE TABLE IF NOT EXISTS alerts (
                    alert_id TEXT PRIMARY KEY,
                    slo_name TEXT NOT NULL,
                    state TEXT NOT NULL,
                    triggered_at INTEGER NOT NULL,
                    resolved_at INTEGER,
                    alert_json BLOB NOT NULL,
                    alert_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_alerts_dedup
                    ON alerts (slo_name, state, triggered_at);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
