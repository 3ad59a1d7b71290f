// crates/geotrust-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and bounded input reads.
// Purpose: Ensure the CLI surface parses correctly and fails closed on input.
// Dependencies: geotrust-cli main helpers, clap, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Validates the clap command tree, store identifier parsing, and the
//! size-limited file readers used for ingest batches and polygon files.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;

use clap::CommandFactory;
use clap::Parser;
use serde_json::json;
use tempfile::TempDir;

use super::Cli;
use super::Commands;
use super::MAX_INPUT_BYTES;
use super::SnapshotCommand;
use super::parse_store_id;
use super::read_json_documents;
use super::read_limited;
use super::read_polygon;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes bytes into a fresh file under the temp directory.
fn write_input(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

// ============================================================================
// SECTION: Argument Parsing Tests
// ============================================================================

/// Tests that the command tree satisfies clap's internal invariants.
#[test]
fn test_command_tree_is_well_formed() {
    Cli::command().debug_assert();
}

/// Tests that onboard arguments parse into the expected fields.
#[test]
fn test_onboard_arguments_parse() {
    let cli = Cli::try_parse_from([
        "geotrust",
        "onboard",
        "--store-id",
        "42",
        "--name",
        "Aling Nena Sari-Sari",
        "--municipality",
        "QC",
        "--lat",
        "14.62",
        "--lon",
        "121.03",
    ])
    .unwrap();
    let Some(Commands::Onboard(command)) = cli.command else {
        panic!("expected onboard command");
    };
    assert_eq!(command.store_id, 42);
    assert_eq!(command.municipality, "QC");
    assert_eq!(command.lat, Some(14.62));
    assert_eq!(command.lon, Some(121.03));
    assert_eq!(command.source, "manual");
    assert!(command.polygon.is_none());
}

/// Tests that a lone `--lat` without `--lon` is rejected at parse time.
#[test]
fn test_onboard_point_requires_both_coordinates() {
    let result = Cli::try_parse_from([
        "geotrust",
        "onboard",
        "--store-id",
        "42",
        "--name",
        "Store",
        "--municipality",
        "Makati",
        "--lat",
        "14.55",
    ]);
    assert!(result.is_err());
}

/// Tests that rebuild parses with and without a store scope.
#[test]
fn test_rebuild_scope_parses() {
    let cli = Cli::try_parse_from(["geotrust", "rebuild"]).unwrap();
    let Some(Commands::Rebuild(command)) = cli.command else {
        panic!("expected rebuild command");
    };
    assert!(command.store_id.is_none());

    let cli = Cli::try_parse_from(["geotrust", "rebuild", "--store-id", "7"]).unwrap();
    let Some(Commands::Rebuild(command)) = cli.command else {
        panic!("expected rebuild command");
    };
    assert_eq!(command.store_id, Some(7));
}

/// Tests that snapshot trends parses its time range.
#[test]
fn test_snapshot_trends_parses_range() {
    let cli = Cli::try_parse_from([
        "geotrust",
        "snapshot",
        "trends",
        "--from",
        "1756000000000",
        "--to",
        "1756086400000",
    ])
    .unwrap();
    let Some(Commands::Snapshot {
        command: SnapshotCommand::Trends(trends),
    }) = cli.command
    else {
        panic!("expected snapshot trends command");
    };
    assert_eq!(trends.from, 1_756_000_000_000);
    assert_eq!(trends.to, 1_756_086_400_000);
}

/// Tests that a global config path is accepted before the subcommand.
#[test]
fn test_global_config_flag_parses() {
    let cli =
        Cli::try_parse_from(["geotrust", "--config", "geotrust.toml", "health"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("geotrust.toml")));
}

// ============================================================================
// SECTION: Input Helper Tests
// ============================================================================

/// Tests that a zero store identifier is rejected.
#[test]
fn test_store_id_zero_rejected() {
    assert!(parse_store_id(0).is_err());
    assert_eq!(parse_store_id(42).unwrap().get(), 42);
}

/// Tests that oversized input files fail closed before parsing.
#[test]
fn test_read_limited_rejects_oversized_input() {
    let dir = TempDir::new().unwrap();
    let oversized = usize::try_from(MAX_INPUT_BYTES).unwrap() + 1;
    let path = write_input(&dir, "oversized.json", &vec![b'0'; oversized]);
    assert!(read_limited(&path).is_err());
}

/// Tests that an ingest batch file parses into documents.
#[test]
fn test_read_json_documents_parses_array() {
    let dir = TempDir::new().unwrap();
    let batch = json!([
        {"transactionId": "txn-001", "storeId": 42},
        {"transactionId": "txn-002"}
    ]);
    let path = write_input(&dir, "batch.json", batch.to_string().as_bytes());
    let documents = read_json_documents(&path).unwrap();
    assert_eq!(documents.len(), 2);
}

/// Tests that a non-array ingest file is rejected.
#[test]
fn test_read_json_documents_rejects_non_array() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, "object.json", b"{\"transactionId\": \"txn-001\"}");
    assert!(read_json_documents(&path).is_err());
}

/// Tests that a polygon vertex file parses into a polygon.
#[test]
fn test_read_polygon_parses_vertices() {
    let dir = TempDir::new().unwrap();
    let ring = json!([
        {"lat": 14.60, "lon": 121.00},
        {"lat": 14.60, "lon": 121.05},
        {"lat": 14.65, "lon": 121.05},
        {"lat": 14.65, "lon": 121.00}
    ]);
    let path = write_input(&dir, "polygon.json", ring.to_string().as_bytes());
    let polygon = read_polygon(&path).unwrap();
    assert_eq!(polygon.vertices.len(), 4);
}
