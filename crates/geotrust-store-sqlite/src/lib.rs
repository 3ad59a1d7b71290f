// crates/geotrust-store-sqlite/src/lib.rs
// ============================================================================
// Module: GeoTrust SQLite Store
// Description: Durable VerificationStore backed by SQLite WAL.
// Purpose: Expose the SQLite-backed store implementation.
// Dependencies: geotrust-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `SQLite`-backed implementation of every durable store surface the engine
//! consumes: registry entries, transaction projections, snapshot history, and
//! the alert lifecycle. All atomicity guarantees live here, behind single
//! transactions on one writer connection.

mod store;

pub use store::SqlitePerfStatsSnapshot;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
pub use store::SqliteVerificationStore;
