// crates/geotrust-core/src/runtime/mod.rs
// ============================================================================
// Module: GeoTrust Core Runtime
// Description: Pure evaluation logic layered over the domain model.
// Purpose: Group comparator evaluation and status classification.
// Dependencies: crate::domain
// ============================================================================

//! ## Overview
//! Runtime logic is pure and deterministic: SLO comparator evaluation and
//! system status classification take values in and return outcomes, with no
//! storage or clock access.

pub mod comparator;

pub use comparator::classify_system_status;
pub use comparator::evaluate_slo;
