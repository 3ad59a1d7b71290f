// crates/geotrust-core/src/domain/geo.rs
// ============================================================================
// Module: GeoTrust Geometry
// Description: Points, polygons, and trust-domain bounding boxes.
// Purpose: Provide the geometric primitives registry invariants are checked against.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Geometry in GeoTrust is deliberately small: a point, a vertex-ordered
//! polygon, and an axis-aligned bounding box describing the trust domain.
//! Registry validation only ever asks two questions: is a geometry present,
//! and does every coordinate fall inside the trust-domain bounds. No
//! projection math or geodesic precision is needed at this granularity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum number of vertices for a valid polygon ring.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Approximate kilometers per degree of latitude, used for derived circles.
const KM_PER_DEGREE: f64 = 111.0;

// ============================================================================
// SECTION: Point
// ============================================================================

/// Geographic point in decimal degrees (WGS84).
///
/// # Invariants
/// - `lat` and `lon` are finite; bounds membership is checked separately
///   against the trust domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
        }
    }

    /// Returns true when both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

// ============================================================================
// SECTION: Bounding Box
// ============================================================================

/// Axis-aligned bounding box describing a trust domain.
///
/// # Invariants
/// - `min_lat <= max_lat` and `min_lon <= max_lon`; enforced at config load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern latitude limit.
    pub min_lat: f64,
    /// Northern latitude limit.
    pub max_lat: f64,
    /// Western longitude limit.
    pub min_lon: f64,
    /// Eastern longitude limit.
    pub max_lon: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its four limits.
    #[must_use]
    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Returns true when the limits are finite and correctly ordered.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.min_lat.is_finite()
            && self.max_lat.is_finite()
            && self.min_lon.is_finite()
            && self.max_lon.is_finite()
            && self.min_lat <= self.max_lat
            && self.min_lon <= self.max_lon
    }

    /// Returns true when the point lies inside the box (inclusive edges).
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.is_finite()
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }
}

// ============================================================================
// SECTION: Polygon
// ============================================================================

/// Ordered polygon ring of geographic vertices.
///
/// # Invariants
/// - A valid ring has at least [`MIN_POLYGON_VERTICES`] vertices.
/// - Closure is implicit; the last vertex does not repeat the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    /// Ordered ring vertices.
    pub vertices: Vec<GeoPoint>,
}

impl Polygon {
    /// Creates a polygon from ordered vertices.
    #[must_use]
    pub const fn new(vertices: Vec<GeoPoint>) -> Self {
        Self {
            vertices,
        }
    }

    /// Returns true when the ring has enough finite vertices.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.vertices.len() >= MIN_POLYGON_VERTICES
            && self.vertices.iter().all(GeoPoint::is_finite)
    }

    /// Returns true when every vertex lies inside the bounding box.
    #[must_use]
    pub fn within(&self, bounds: &BoundingBox) -> bool {
        self.vertices.iter().all(|vertex| bounds.contains(vertex))
    }

    /// Derives an approximate circular ring around a center point.
    ///
    /// Used by onboarding when a store supplies coordinates but no polygon.
    /// The radius is converted with a flat kilometers-per-degree factor,
    /// which is adequate at city scale.
    #[must_use]
    pub fn circle_around(center: GeoPoint, radius_km: f64, segments: usize) -> Self {
        let segments = segments.max(MIN_POLYGON_VERTICES);
        let radius_deg = radius_km / KM_PER_DEGREE;
        let mut vertices = Vec::with_capacity(segments);
        for index in 0 .. segments {
            let angle = std::f64::consts::TAU * (index as f64) / (segments as f64);
            vertices.push(GeoPoint::new(
                center.lat + radius_deg * angle.cos(),
                center.lon + radius_deg * angle.sin(),
            ));
        }
        Self::new(vertices)
    }
}
