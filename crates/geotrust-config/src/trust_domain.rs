// crates/geotrust-config/src/trust_domain.rs
// ============================================================================
// Module: Trust Domain Configuration
// Description: Bounding box, PSGC reference table, and municipality aliases.
// Purpose: Define the geographic/administrative boundary registry writes obey.
// Dependencies: geotrust-core, serde
// ============================================================================

//! ## Overview
//! A trust domain is the configured boundary within which every registry
//! entry must fall. It carries the bounding box, the region/province PSGC
//! codes, a city/municipality PSGC reference table, and the alias map used to
//! normalize free-form municipality names ("QC" resolves to "Quezon City").
//! The built-in default is the National Capital Region.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use geotrust_core::BoundingBox;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Municipality Reference
// ============================================================================

/// One city/municipality row of the PSGC reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityRef {
    /// Canonical municipality name.
    pub name: String,
    /// City/municipality-level PSGC code.
    pub psgc_citymun: String,
}

// ============================================================================
// SECTION: Trust Domain
// ============================================================================

/// Configured trust domain for registry validation and PSGC derivation.
///
/// # Invariants
/// - `bounds` is well-formed (validated at config load).
/// - Alias keys and reference names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustDomainConfig {
    /// Trust domain label (e.g. "NCR").
    pub name: String,
    /// Region display name.
    pub region_name: String,
    /// Province display name.
    pub province_name: String,
    /// Region-level PSGC code.
    pub psgc_region: String,
    /// Province-level PSGC code.
    pub psgc_province: String,
    /// Bounding box every coordinate must fall inside.
    pub bounds: BoundingBox,
    /// City/municipality PSGC reference table.
    #[serde(default)]
    pub municipalities: Vec<MunicipalityRef>,
    /// Alias map from raw names to canonical reference names.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl TrustDomainConfig {
    /// Returns the built-in National Capital Region trust domain.
    #[must_use]
    pub fn ncr() -> Self {
        let municipalities = [
            ("City of Manila", "137401000"),
            ("Quezon City", "137402000"),
            ("Caloocan", "137403000"),
            ("Las Piñas", "137404000"),
            ("Makati City", "137405000"),
            ("Malabon", "137406000"),
            ("Mandaluyong City", "137407000"),
            ("Marikina", "137408000"),
            ("Muntinlupa", "137409000"),
            ("Navotas", "137410000"),
            ("Parañaque", "137411000"),
            ("Pasay", "137412000"),
            ("Pasig", "137413000"),
            ("Pateros", "137414000"),
            ("San Juan", "137415000"),
            ("Taguig", "137416000"),
            ("Valenzuela", "137417000"),
        ]
        .into_iter()
        .map(|(name, code)| MunicipalityRef {
            name: name.to_string(),
            psgc_citymun: code.to_string(),
        })
        .collect();
        let aliases = [
            ("QC", "Quezon City"),
            ("QUEZON CITY", "Quezon City"),
            ("MANILA", "City of Manila"),
            ("Manila", "City of Manila"),
            ("MAKATI", "Makati City"),
            ("Makati", "Makati City"),
            ("MANDALUYONG", "Mandaluyong City"),
            ("Mandaluyong", "Mandaluyong City"),
            ("PATEROS", "Pateros"),
        ]
        .into_iter()
        .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
        .collect();
        Self {
            name: "NCR".to_string(),
            region_name: "NCR".to_string(),
            province_name: "Metro Manila".to_string(),
            psgc_region: "130000000".to_string(),
            psgc_province: "137400000".to_string(),
            bounds: BoundingBox::new(14.2, 14.9, 120.9, 121.2),
            municipalities,
            aliases,
        }
    }

    /// Normalizes a raw municipality name through the alias map.
    ///
    /// Unmatched names pass through trimmed; verification only requires
    /// non-emptiness, and unknown municipalities simply carry no city code.
    #[must_use]
    pub fn normalize_municipality(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        self.aliases.get(trimmed).cloned().unwrap_or_else(|| trimmed.to_string())
    }

    /// Resolves the city/municipality PSGC code for a canonical name.
    #[must_use]
    pub fn citymun_code(&self, canonical: &str) -> Option<String> {
        self.municipalities
            .iter()
            .find(|entry| entry.name == canonical)
            .map(|entry| entry.psgc_citymun.clone())
    }
}
