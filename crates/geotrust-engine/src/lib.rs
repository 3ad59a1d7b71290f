// crates/geotrust-engine/src/lib.rs
// ============================================================================
// Module: GeoTrust Engine
// Description: Verification engine over any durable VerificationStore.
// Purpose: Orchestrate onboarding, rebuilds, integrity, SLOs, and alerts.
// Dependencies: geotrust-core, geotrust-config, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The engine hosts every operator-triggerable operation: store onboarding,
//! projection rebuilds, integrity checks, SLO evaluation, snapshot capture,
//! alert generation, reporting, and retention cleanup. It is generic over the
//! durable store and holds no verification state of its own; components
//! communicate exclusively through the store, so operations compose under an
//! external scheduler without shared-memory coordination. Registry writes for
//! one store are serialized through a keyed lock; everything else relies on
//! the store's transactional guarantees.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod engine;
mod integrity;
mod monitor;
mod report;

pub use engine::EngineError;
pub use engine::IngestStats;
pub use engine::OnboardRequest;
pub use engine::OnboardResult;
pub use engine::RebuildStats;
pub use engine::VerificationEngine;
pub use monitor::CleanupStats;
pub use report::HealthSummary;
pub use report::StoreVerificationRow;
pub use report::TrendPoint;
pub use report::VerificationReport;
