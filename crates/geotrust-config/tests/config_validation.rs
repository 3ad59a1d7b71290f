//! Config validation tests for geotrust-config.
// crates/geotrust-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Validate TOML loading, defaults, and cross-field rules.
// Purpose: Ensure configuration handling is strict and fail-closed.
// =============================================================================

use std::io::Write;

use geotrust_config::load_config;
use geotrust_config::parse_config;
use geotrust_config::ConfigError;
use geotrust_config::GeoTrustConfig;
use geotrust_config::TrustDomainConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<GeoTrustConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn empty_document_loads_defaults() -> TestResult {
    let config = parse_config("").map_err(|err| err.to_string())?;
    if config.trust_domain.name != "NCR" {
        return Err("default trust domain should be NCR".to_string());
    }
    if config.slos.is_empty() {
        return Err("default SLO set should be non-empty".to_string());
    }
    if config.engine.chunk_size == 0 {
        return Err("default chunk size should be non-zero".to_string());
    }
    Ok(())
}

#[test]
fn load_reads_file_from_disk() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[engine]\nchunk_size = 100\n").map_err(|err| err.to_string())?;
    let config = load_config(file.path()).map_err(|err| err.to_string())?;
    if config.engine.chunk_size != 100 {
        return Err("chunk_size override should apply".to_string());
    }
    Ok(())
}

#[test]
fn malformed_toml_is_a_parse_error() -> TestResult {
    assert_invalid(parse_config("[engine\nchunk_size = "), "config parse error")
}

#[test]
fn rejects_zero_chunk_size() -> TestResult {
    assert_invalid(parse_config("[engine]\nchunk_size = 0\n"), "chunk_size must be non-zero")
}

#[test]
fn rejects_duplicate_slo_names() -> TestResult {
    let raw = r#"
[[slos]]
name = "dup"
metric = "verification_rate"
target_value = 100.0
operator = "="
severity = "critical"

[[slos]]
name = "dup"
metric = "unknown_count"
target_value = 0.0
operator = "="
severity = "warning"
"#;
    assert_invalid(parse_config(raw), "duplicate slo name")
}

#[test]
fn rejects_zero_grace_period() -> TestResult {
    let raw = r#"
[[slos]]
name = "fast"
metric = "verification_rate"
target_value = 100.0
operator = "="
severity = "critical"
grace_period_minutes = 0
"#;
    assert_invalid(parse_config(raw), "grace_period_minutes must be non-zero")
}

#[test]
fn rejects_inverted_bounding_box() -> TestResult {
    let raw = r#"
[trust_domain]
name = "BAD"
region_name = "BAD"
province_name = "BAD"
psgc_region = "000000000"
psgc_province = "000000000"
bounds = { min_lat = 15.0, max_lat = 14.0, min_lon = 120.0, max_lon = 121.0 }
"#;
    assert_invalid(parse_config(raw), "not well-formed")
}

#[test]
fn rejects_alias_without_reference_row() -> TestResult {
    let raw = r#"
[trust_domain]
name = "T"
region_name = "T"
province_name = "T"
psgc_region = "100000000"
psgc_province = "100100000"
bounds = { min_lat = 14.0, max_lat = 15.0, min_lon = 120.0, max_lon = 121.0 }
aliases = { "X" = "Nowhere" }
"#;
    assert_invalid(parse_config(raw), "not in the reference table")
}

#[test]
fn ncr_reference_resolves_aliases_and_codes() -> TestResult {
    let domain = TrustDomainConfig::ncr();
    if domain.normalize_municipality(" QC ") != "Quezon City" {
        return Err("QC should normalize to Quezon City".to_string());
    }
    if domain.normalize_municipality("MANILA") != "City of Manila" {
        return Err("MANILA should normalize to City of Manila".to_string());
    }
    if domain.citymun_code("Valenzuela").as_deref() != Some("137417000") {
        return Err("Valenzuela should carry PSGC 137417000".to_string());
    }
    if domain.citymun_code("Nowhere").is_some() {
        return Err("unknown municipalities should carry no code".to_string());
    }
    Ok(())
}

#[test]
fn enabled_definitions_skip_disabled_slos() -> TestResult {
    let raw = r#"
[[slos]]
name = "on"
metric = "verification_rate"
target_value = 100.0
operator = "="
severity = "critical"

[[slos]]
name = "off"
metric = "unknown_count"
target_value = 0.0
operator = "="
severity = "warning"
enabled = false
"#;
    let config = parse_config(raw).map_err(|err| err.to_string())?;
    let definitions = config.enabled_definitions();
    if definitions.len() != 1 {
        return Err(format!("expected one enabled definition, got {}", definitions.len()));
    }
    if definitions[0].name.as_str() != "on" {
        return Err("enabled definition should be 'on'".to_string());
    }
    Ok(())
}
