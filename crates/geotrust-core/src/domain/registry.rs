// crates/geotrust-core/src/domain/registry.rs
// ============================================================================
// Module: GeoTrust Store Dimension Registry Model
// Description: Authoritative store entries and their geometric invariants.
// Purpose: Define the registry record and the validation gate for writes.
// Dependencies: crate::domain::{geo, identifiers, time}, serde, thiserror
// ============================================================================

//! ## Overview
//! The store dimension registry is the single authoritative mapping from a
//! store identifier to a proven geographic location. Entries enter the
//! registry only through [`StoreDimensionEntry::validate`]: municipality must
//! be non-empty, at least one geometry must be present, and every coordinate
//! must fall inside the trust-domain bounding box. Nothing is ever partially
//! persisted; validation failure rejects the whole write.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::domain::geo::BoundingBox;
use crate::domain::geo::GeoPoint;
use crate::domain::geo::MIN_POLYGON_VERTICES;
use crate::domain::geo::Polygon;
use crate::domain::identifiers::StoreId;
use crate::domain::time::Timestamp;

// ============================================================================
// SECTION: PSGC Codes
// ============================================================================

/// Philippine Standard Geographic Code triple attached to a registry entry.
///
/// # Invariants
/// - `region` and `province` always carry the trust-domain codes.
/// - `citymun` is present only when the municipality resolved against the
///   trust-domain reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsgcCodes {
    /// Region-level PSGC code.
    pub region: String,
    /// Province-level PSGC code.
    pub province: String,
    /// City/municipality-level PSGC code, when resolvable.
    pub citymun: Option<String>,
}

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Registry write validation failures.
///
/// # Invariants
/// - Raised before any persistence; a failed validation writes nothing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The municipality attribute was empty or whitespace.
    #[error("municipality must be non-empty")]
    EmptyMunicipality,
    /// Neither a polygon nor a coordinate pair was supplied.
    #[error("geometry required: supply a polygon or both latitude and longitude")]
    MissingGeometry,
    /// A coordinate pair fell outside the trust-domain bounding box.
    #[error("coordinates ({lat}, {lon}) outside trust domain '{domain}'")]
    OutOfBounds {
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lon: f64,
        /// Trust domain name.
        domain: String,
    },
    /// The polygon ring was degenerate or contained non-finite vertices.
    #[error("polygon must have at least {MIN_POLYGON_VERTICES} finite vertices, got {vertices}")]
    DegeneratePolygon {
        /// Number of vertices supplied.
        vertices: usize,
    },
    /// The coordinate pair contained non-finite values.
    #[error("coordinates must be finite numbers")]
    NonFiniteCoordinates,
}

// ============================================================================
// SECTION: Store Dimension Entry
// ============================================================================

/// Authoritative registry entry mapping a store to a proven location.
///
/// # Invariants
/// - `polygon.is_some() || point.is_some()` for every committed entry.
/// - Any `point` lies inside the trust-domain bounding box.
/// - `municipality` is non-empty for every committed entry.
/// - Created and updated only through the onboarding workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDimensionEntry {
    /// Store identifier (unique within the registry).
    pub store_id: StoreId,
    /// Human-readable store name.
    pub store_name: String,
    /// Trust domain label the entry belongs to (e.g. "NCR").
    pub trust_domain: String,
    /// Municipality name (required, non-empty).
    pub municipality: String,
    /// Optional barangay name.
    pub barangay: Option<String>,
    /// Optional polygon geometry.
    pub polygon: Option<Polygon>,
    /// Optional point geometry.
    pub point: Option<GeoPoint>,
    /// PSGC codes derived from the trust-domain reference.
    pub psgc: PsgcCodes,
    /// Timestamp of the committing write.
    pub verified_at: Timestamp,
    /// Label describing where the entry data came from.
    pub source: String,
}

impl StoreDimensionEntry {
    /// Validates the registry invariants against the trust-domain bounds.
    ///
    /// This is the single enforcement gate for registry writes; storage-level
    /// constraints may exist on top but are never the only check.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an empty municipality, missing
    /// geometry, a degenerate polygon, or out-of-bounds coordinates.
    pub fn validate(&self, bounds: &BoundingBox) -> Result<(), ValidationError> {
        if self.municipality.trim().is_empty() {
            return Err(ValidationError::EmptyMunicipality);
        }
        if self.polygon.is_none() && self.point.is_none() {
            return Err(ValidationError::MissingGeometry);
        }
        if let Some(polygon) = &self.polygon {
            if !polygon.is_well_formed() {
                return Err(ValidationError::DegeneratePolygon {
                    vertices: polygon.vertices.len(),
                });
            }
            if !polygon.within(bounds) {
                let outlier = polygon
                    .vertices
                    .iter()
                    .find(|vertex| !bounds.contains(vertex))
                    .copied()
                    .unwrap_or(GeoPoint::new(f64::NAN, f64::NAN));
                return Err(ValidationError::OutOfBounds {
                    lat: outlier.lat,
                    lon: outlier.lon,
                    domain: self.trust_domain.clone(),
                });
            }
        }
        if let Some(point) = &self.point {
            if !point.is_finite() {
                return Err(ValidationError::NonFiniteCoordinates);
            }
            if !bounds.contains(point) {
                return Err(ValidationError::OutOfBounds {
                    lat: point.lat,
                    lon: point.lon,
                    domain: self.trust_domain.clone(),
                });
            }
        }
        Ok(())
    }

    /// Returns true when the entry satisfies every zero-trust verification
    /// condition a projection may rely on.
    #[must_use]
    pub fn satisfies_verification(&self) -> bool {
        !self.municipality.trim().is_empty() && (self.polygon.is_some() || self.point.is_some())
    }
}
