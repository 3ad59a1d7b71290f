// crates/geotrust-core/src/domain/projection.rs
// ============================================================================
// Module: GeoTrust Transaction Projection
// Description: Enriched per-transaction record with zero-trust location status.
// Purpose: Define the fixed wire schema contract and sentinel semantics.
// Dependencies: crate::domain::{identifiers, registry, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! The transaction projection is the enriched record downstream consumers
//! read. Its schema is a fixed contract: every top-level field is present in
//! the wire JSON even when null. Location fields are either fully real
//! (copied from a registry entry that passed every invariant) or fully
//! collapsed to the `"Unknown"` sentinel with null geometry. There is no
//! partial trust and no inferred value.
//!
//! Basket and interaction fragments are supplied by the upstream collaborator
//! and pass through unchanged; the projection builder never interprets them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::domain::identifiers::StoreId;
use crate::domain::identifiers::TransactionId;
use crate::domain::registry::StoreDimensionEntry;
use crate::domain::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sentinel municipality written when verification fails.
pub const UNKNOWN_MUNICIPALITY: &str = "Unknown";

/// Required top-level fields of the projection wire schema.
pub const REQUIRED_TOP_LEVEL_FIELDS: [&str; 8] = [
    "transactionId",
    "storeId",
    "timestamp",
    "basket",
    "interaction",
    "location",
    "qualityFlags",
    "source",
];

// ============================================================================
// SECTION: Pass-through Fragments
// ============================================================================

/// Basket fragment supplied by upstream ingestion (opaque to GeoTrust).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    /// Opaque basket items.
    pub items: Vec<Value>,
    /// Item count reported upstream.
    pub item_count: Option<u64>,
    /// Total amount reported upstream.
    pub total_amount: Option<f64>,
}

/// Interaction fragment supplied by upstream ingestion (opaque to GeoTrust).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Shopper age bracket.
    pub age_bracket: Option<String>,
    /// Shopper gender.
    pub gender: Option<String>,
    /// Shopper role.
    pub role: Option<String>,
    /// Weekday or weekend label.
    pub weekday_or_weekend: Option<String>,
    /// Time-of-day label.
    pub time_of_day: Option<String>,
}

/// Source fragment describing the ingested file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    /// Source file label.
    pub file: Option<String>,
    /// Row count of the source file.
    pub row_count: Option<u64>,
}

// ============================================================================
// SECTION: Location Block
// ============================================================================

/// Geographic coordinates embedded in the location block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GeoFields {
    /// Latitude, null when unverified.
    pub lat: Option<f64>,
    /// Longitude, null when unverified.
    pub lon: Option<f64>,
}

/// Location block of the projection wire schema.
///
/// # Invariants
/// - When the owning projection is verified, `municipality` is a real name
///   copied from the registry; otherwise it equals [`UNKNOWN_MUNICIPALITY`]
///   and every other field is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedLocation {
    /// Region name.
    pub region: Option<String>,
    /// Province name.
    pub province: Option<String>,
    /// Municipality name or the `"Unknown"` sentinel.
    pub municipality: String,
    /// Barangay name.
    pub barangay: Option<String>,
    /// Region-level PSGC code.
    pub psgc_region: Option<String>,
    /// City/municipality-level PSGC code.
    pub psgc_citymun: Option<String>,
    /// Barangay-level PSGC code.
    pub psgc_barangay: Option<String>,
    /// Coordinates, null when unverified.
    pub geo: GeoFields,
}

impl ProjectedLocation {
    /// Returns the fully collapsed sentinel location.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            region: None,
            province: None,
            municipality: UNKNOWN_MUNICIPALITY.to_string(),
            barangay: None,
            psgc_region: None,
            psgc_citymun: None,
            psgc_barangay: None,
            geo: GeoFields::default(),
        }
    }
}

// ============================================================================
// SECTION: Quality Flags
// ============================================================================

/// Per-transaction quality flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QualityFlags {
    /// True when a brand match was detected upstream (pass-through).
    pub brand_matched: bool,
    /// True when the location passed zero-trust verification.
    pub location_verified: bool,
    /// True when a substitution was detected upstream (pass-through).
    pub substitution_detected: bool,
}

// ============================================================================
// SECTION: Raw Transaction
// ============================================================================

/// Raw transaction payload delivered by the upstream collaborator.
///
/// # Invariants
/// - `store_id` may reference a store absent from the registry.
/// - Fragment contents are never interpreted by GeoTrust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    /// Transaction identifier.
    pub transaction_id: TransactionId,
    /// Referenced store identifier, if any.
    pub store_id: Option<StoreId>,
    /// Transaction timestamp.
    pub timestamp: Timestamp,
    /// Opaque basket fragment.
    #[serde(default)]
    pub basket: Basket,
    /// Opaque interaction fragment.
    #[serde(default)]
    pub interaction: Interaction,
    /// Upstream brand-match flag.
    #[serde(default)]
    pub brand_matched: bool,
    /// Upstream substitution flag.
    #[serde(default)]
    pub substitution_detected: bool,
    /// Source file fragment.
    #[serde(default)]
    pub source: SourceInfo,
}

// ============================================================================
// SECTION: Transaction Projection
// ============================================================================

/// Enriched per-transaction projection (fixed wire schema contract).
///
/// # Invariants
/// - `quality_flags.location_verified == true` implies
///   `location.municipality != "Unknown"` and a backing registry entry
///   satisfying every registry invariant.
/// - All top-level fields serialize even when their contents are null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionProjection {
    /// Transaction identifier.
    pub transaction_id: TransactionId,
    /// Referenced store identifier, if any.
    pub store_id: Option<StoreId>,
    /// Transaction timestamp.
    pub timestamp: Timestamp,
    /// Opaque basket fragment (pass-through).
    pub basket: Basket,
    /// Opaque interaction fragment (pass-through).
    pub interaction: Interaction,
    /// Location block ruled by the zero-trust verification outcome.
    pub location: ProjectedLocation,
    /// Quality flags.
    pub quality_flags: QualityFlags,
    /// Source file fragment (pass-through).
    pub source: SourceInfo,
}

impl TransactionProjection {
    /// Builds an unverified projection from a raw transaction.
    ///
    /// The location collapses to the sentinel; fragments pass through.
    #[must_use]
    pub fn unverified(raw: &RawTransaction) -> Self {
        Self {
            transaction_id: raw.transaction_id.clone(),
            store_id: raw.store_id,
            timestamp: raw.timestamp,
            basket: raw.basket.clone(),
            interaction: raw.interaction.clone(),
            location: ProjectedLocation::unknown(),
            quality_flags: QualityFlags {
                brand_matched: raw.brand_matched,
                location_verified: false,
                substitution_detected: raw.substitution_detected,
            },
            source: raw.source.clone(),
        }
    }

    /// Returns a copy of this projection re-verified against a registry entry.
    ///
    /// When `entry` is present and satisfies every verification condition the
    /// location block is copied from the registry; otherwise it collapses to
    /// the sentinel. Fragments are preserved unchanged in both cases.
    #[must_use]
    pub fn reverified(
        &self,
        entry: Option<&StoreDimensionEntry>,
        region: &str,
        province: &str,
    ) -> Self {
        let mut next = self.clone();
        match entry {
            Some(entry) if entry.satisfies_verification() => {
                let point = entry.point.or_else(|| {
                    entry.polygon.as_ref().and_then(|polygon| polygon.vertices.first().copied())
                });
                next.location = ProjectedLocation {
                    region: Some(region.to_string()),
                    province: Some(province.to_string()),
                    municipality: entry.municipality.clone(),
                    barangay: entry.barangay.clone(),
                    psgc_region: Some(entry.psgc.region.clone()),
                    psgc_citymun: entry.psgc.citymun.clone(),
                    psgc_barangay: None,
                    geo: GeoFields {
                        lat: point.map(|value| value.lat),
                        lon: point.map(|value| value.lon),
                    },
                };
                next.quality_flags.location_verified = true;
            }
            _ => {
                next.location = ProjectedLocation::unknown();
                next.quality_flags.location_verified = false;
            }
        }
        next
    }

    /// Returns true when the internal verified/sentinel invariant holds.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        !self.quality_flags.location_verified
            || self.location.municipality != UNKNOWN_MUNICIPALITY
    }
}

/// Checks a persisted projection JSON document against the schema contract.
///
/// Returns the names of required top-level fields missing from the document.
/// A non-object document reports every required field as missing.
#[must_use]
pub fn missing_top_level_fields(document: &Value) -> Vec<&'static str> {
    match document {
        Value::Object(map) => REQUIRED_TOP_LEVEL_FIELDS
            .iter()
            .filter(|field| !map.contains_key(**field))
            .copied()
            .collect(),
        _ => REQUIRED_TOP_LEVEL_FIELDS.to_vec(),
    }
}
