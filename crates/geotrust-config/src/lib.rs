// crates/geotrust-config/src/lib.rs
// ============================================================================
// Module: GeoTrust Configuration
// Description: Canonical configuration model, validation, and defaults.
// Purpose: Load and validate trust-domain, store, SLO, and engine settings.
// Dependencies: geotrust-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is a single TOML document validated in full before anything
//! runs: the trust domain (bounding box, PSGC reference, aliases), the store
//! location, engine tuning (chunk size, critical rate floor, retention), and
//! the operator-edited SLO definition set. Validation fails closed; a config
//! that loads is a config every component can rely on without rechecking.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod model;
mod trust_domain;

pub use model::EngineSettings;
pub use model::GeoTrustConfig;
pub use model::SloDefinitionConfig;
pub use model::StoreSettings;
pub use trust_domain::MunicipalityRef;
pub use trust_domain::TrustDomainConfig;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration load and validation failures.
///
/// # Invariants
/// - A returned config has passed every validation rule; partial configs are
///   never surfaced.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The document was not valid TOML for the model.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A validation rule failed.
    #[error("config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates a configuration document from disk.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, parsed, or
/// validated.
pub fn load_config(path: &Path) -> Result<GeoTrustConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    parse_config(&raw)
}

/// Parses and validates a configuration document from a TOML string.
///
/// # Errors
///
/// Returns [`ConfigError`] when the document cannot be parsed or validated.
pub fn parse_config(raw: &str) -> Result<GeoTrustConfig, ConfigError> {
    let config: GeoTrustConfig =
        toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
    config.validate()?;
    Ok(config)
}
