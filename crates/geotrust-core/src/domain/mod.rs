// crates/geotrust-core/src/domain/mod.rs
// ============================================================================
// Module: GeoTrust Core Model
// Description: Canonical domain types for registry, projections, SLOs, and alerts.
// Purpose: Group the storage-agnostic model modules under one namespace.
// Dependencies: crate submodules
// ============================================================================

//! ## Overview
//! The `domain` namespace holds the canonical domain types. Modules are split by
//! aggregate: identifiers, geometry, registry entries, projections, SLOs,
//! snapshots, alerts, and the shared time model.

pub mod alert;
pub mod geo;
pub mod identifiers;
pub mod projection;
pub mod registry;
pub mod slo;
pub mod snapshot;
pub mod time;
