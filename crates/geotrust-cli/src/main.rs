// crates/geotrust-cli/src/main.rs
// ============================================================================
// Module: GeoTrust CLI Entry Point
// Description: Command dispatcher for onboarding, verification, and SLO tasks.
// Purpose: Provide an operator-facing CLI over the verification engine.
// Dependencies: clap, geotrust-config, geotrust-core, geotrust-engine,
//               geotrust-store-sqlite, serde, serde_jcs, serde_json, thiserror.
// ============================================================================

//! ## Overview
//! The GeoTrust CLI wires the verification engine to a local `SQLite` store
//! and exposes every operator-triggerable operation as a subcommand: store
//! onboarding, raw-transaction ingestion, projection rebuilds, integrity
//! checks, SLO evaluation, snapshot capture and trends, alert lifecycle, and
//! retention cleanup. All structured output is canonical JSON on stdout;
//! errors go to stderr with a failure exit code. Inputs are untrusted and are
//! validated and size-limited before parsing.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use geotrust_config::GeoTrustConfig;
use geotrust_core::AlertId;
use geotrust_core::AlertStore;
use geotrust_core::GeoPoint;
use geotrust_core::OperatorId;
use geotrust_core::Polygon;
use geotrust_core::ProjectionScope;
use geotrust_core::SloStatus;
use geotrust_core::SnapshotStore;
use geotrust_core::StoreId;
use geotrust_core::SystemStatus;
use geotrust_core::Timestamp;
use geotrust_engine::OnboardRequest;
use geotrust_engine::VerificationEngine;
use geotrust_store_sqlite::SqliteStoreConfig;
use geotrust_store_sqlite::SqliteVerificationStore;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted size for ingest and polygon input files.
const MAX_INPUT_BYTES: u64 = 8 * 1024 * 1024;

/// Engine specialization used by every command.
type CliEngine = VerificationEngine<SqliteVerificationStore>;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "geotrust", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Path to the GeoTrust configuration file (defaults apply when absent).
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Onboard a store into the verified dimension registry.
    Onboard(OnboardCommand),
    /// Ingest a batch of raw transaction documents.
    Ingest(IngestCommand),
    /// Rebuild persisted projections against the current registry.
    Rebuild(RebuildCommand),
    /// Run integrity checks and report violations.
    Check,
    /// Evaluate all enabled SLOs against current metrics.
    Evaluate,
    /// Snapshot capture and history utilities.
    Snapshot {
        /// Selected snapshot subcommand.
        #[command(subcommand)]
        command: SnapshotCommand,
    },
    /// Alert generation and lifecycle utilities.
    Alerts {
        /// Selected alerts subcommand.
        #[command(subcommand)]
        command: AlertsCommand,
    },
    /// Produce the per-store verification report.
    Report,
    /// Summarize current system health.
    Health,
    /// Purge snapshots and resolved alerts past the retention window.
    Cleanup(CleanupCommand),
}

/// Arguments for the `onboard` command.
#[derive(Args, Debug)]
struct OnboardCommand {
    /// Store identifier (non-zero).
    #[arg(long = "store-id", value_name = "ID")]
    store_id: u64,
    /// Store display name.
    #[arg(long, value_name = "NAME")]
    name: String,
    /// Municipality name or alias within the trust domain.
    #[arg(long, value_name = "NAME")]
    municipality: String,
    /// Optional barangay name.
    #[arg(long, value_name = "NAME")]
    barangay: Option<String>,
    /// Verified point latitude (requires `--lon`).
    #[arg(long, value_name = "DEG", requires = "lon")]
    lat: Option<f64>,
    /// Verified point longitude (requires `--lat`).
    #[arg(long, value_name = "DEG", requires = "lat")]
    lon: Option<f64>,
    /// JSON file holding the verified polygon vertices.
    #[arg(long, value_name = "FILE")]
    polygon: Option<PathBuf>,
    /// Provenance label for the verification source.
    #[arg(long, value_name = "LABEL", default_value = "manual")]
    source: String,
}

/// Arguments for the `ingest` command.
#[derive(Args, Debug)]
struct IngestCommand {
    /// JSON file holding an array of raw transaction documents.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
}

/// Arguments for the `rebuild` command.
#[derive(Args, Debug)]
struct RebuildCommand {
    /// Restrict the rebuild to one store.
    #[arg(long = "store-id", value_name = "ID")]
    store_id: Option<u64>,
}

/// Supported snapshot subcommands.
#[derive(Subcommand, Debug)]
enum SnapshotCommand {
    /// Capture and persist a verification snapshot.
    Capture,
    /// Print the most recent snapshot.
    Latest,
    /// Print the trend series for a time range.
    Trends(TrendsCommand),
}

/// Arguments for the `snapshot trends` command.
#[derive(Args, Debug)]
struct TrendsCommand {
    /// Range start as unix milliseconds (inclusive).
    #[arg(long, value_name = "MILLIS")]
    from: i64,
    /// Range end as unix milliseconds (inclusive).
    #[arg(long, value_name = "MILLIS")]
    to: i64,
}

/// Supported alerts subcommands.
#[derive(Subcommand, Debug)]
enum AlertsCommand {
    /// Evaluate SLOs and raise alerts for failures.
    Generate,
    /// List unresolved alerts.
    List,
    /// Acknowledge an open alert.
    Ack(AckCommand),
    /// Resolve an unresolved alert.
    Resolve(ResolveCommand),
}

/// Arguments for the `alerts ack` command.
#[derive(Args, Debug)]
struct AckCommand {
    /// Alert identifier to acknowledge.
    #[arg(long, value_name = "ID")]
    id: String,
    /// Operator identity recorded on the alert.
    #[arg(long, value_name = "OPERATOR")]
    operator: String,
}

/// Arguments for the `alerts resolve` command.
#[derive(Args, Debug)]
struct ResolveCommand {
    /// Alert identifier to resolve.
    #[arg(long, value_name = "ID")]
    id: String,
}

/// Arguments for the `cleanup` command.
#[derive(Args, Debug)]
struct CleanupCommand {
    /// Retention window in days (defaults to the configured window).
    #[arg(long = "retention-days", value_name = "DAYS")]
    retention_days: Option<u32>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a rendered message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a rendered message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("geotrust {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let (config, engine) = open_engine(cli.config.as_deref())?;
    match command {
        Commands::Onboard(command) => command_onboard(&engine, command),
        Commands::Ingest(command) => command_ingest(&engine, &command),
        Commands::Rebuild(command) => command_rebuild(&engine, &command),
        Commands::Check => command_check(&engine),
        Commands::Evaluate => command_evaluate(&engine),
        Commands::Snapshot {
            command,
        } => command_snapshot(&engine, &command),
        Commands::Alerts {
            command,
        } => command_alerts(&engine, &command),
        Commands::Report => command_report(&engine),
        Commands::Health => command_health(&engine),
        Commands::Cleanup(command) => command_cleanup(&engine, &config, &command),
    }
}

/// Prints top-level help when no subcommand is given.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Engine Construction
// ============================================================================

/// Loads configuration and opens the engine over the `SQLite` store.
fn open_engine(config_path: Option<&Path>) -> CliResult<(GeoTrustConfig, CliEngine)> {
    let config = match config_path {
        Some(path) => geotrust_config::load_config(path)
            .map_err(|err| CliError::new(format!("failed to load configuration: {err}")))?,
        None => GeoTrustConfig::default(),
    };
    let mut store_config = SqliteStoreConfig::new(config.store.path.clone());
    store_config.busy_timeout_ms = u64::from(config.store.busy_timeout_ms);
    store_config.read_pool_size = config.store.read_pool_size;
    let store = SqliteVerificationStore::new(&store_config)
        .map_err(|err| CliError::new(format!("failed to open store: {err}")))?;
    let engine = VerificationEngine::new(store, &config);
    Ok((config, engine))
}

// ============================================================================
// SECTION: Registry Commands
// ============================================================================

/// Executes the `onboard` command.
fn command_onboard(engine: &CliEngine, command: OnboardCommand) -> CliResult<ExitCode> {
    let store_id = parse_store_id(command.store_id)?;
    let point = match (command.lat, command.lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
        _ => None,
    };
    let polygon = match command.polygon.as_deref() {
        Some(path) => Some(read_polygon(path)?),
        None => None,
    };
    let request = OnboardRequest {
        store_id,
        store_name: command.name,
        municipality: command.municipality,
        barangay: command.barangay,
        polygon,
        point,
        source: command.source,
    };
    let result = engine
        .onboard(request)
        .map_err(|err| CliError::new(format!("onboarding failed: {err}")))?;
    write_canonical_json(&result)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `ingest` command.
fn command_ingest(engine: &CliEngine, command: &IngestCommand) -> CliResult<ExitCode> {
    let documents = read_json_documents(&command.input)?;
    let stats = engine
        .ingest(&documents)
        .map_err(|err| CliError::new(format!("ingestion failed: {err}")))?;
    write_canonical_json(&stats)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `rebuild` command.
fn command_rebuild(engine: &CliEngine, command: &RebuildCommand) -> CliResult<ExitCode> {
    let scope = match command.store_id {
        Some(raw) => ProjectionScope::Store(parse_store_id(raw)?),
        None => ProjectionScope::All,
    };
    let cancel = AtomicBool::new(false);
    let stats = engine
        .rebuild(scope, &cancel)
        .map_err(|err| CliError::new(format!("rebuild failed: {err}")))?;
    write_canonical_json(&stats)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Integrity and SLO Commands
// ============================================================================

/// Executes the `check` command; fails when any violation is present.
fn command_check(engine: &CliEngine) -> CliResult<ExitCode> {
    let reports =
        engine.check().map_err(|err| CliError::new(format!("integrity check failed: {err}")))?;
    write_canonical_json(&reports)?;
    if reports.iter().any(|report| report.count > 0) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `evaluate` command; fails when any SLO fails.
fn command_evaluate(engine: &CliEngine) -> CliResult<ExitCode> {
    let results = engine
        .evaluate_slos()
        .map_err(|err| CliError::new(format!("evaluation failed: {err}")))?;
    write_canonical_json(&results)?;
    if results.iter().any(|result| result.status == SloStatus::Fail) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Dispatches snapshot subcommands.
fn command_snapshot(engine: &CliEngine, command: &SnapshotCommand) -> CliResult<ExitCode> {
    match command {
        SnapshotCommand::Capture => {
            let snapshot = engine
                .capture_snapshot()
                .map_err(|err| CliError::new(format!("snapshot capture failed: {err}")))?;
            write_canonical_json(&snapshot)?;
        }
        SnapshotCommand::Latest => {
            let snapshot = engine
                .store()
                .latest_snapshot()
                .map_err(|err| CliError::new(format!("snapshot lookup failed: {err}")))?;
            match snapshot {
                Some(snapshot) => write_canonical_json(&snapshot)?,
                None => write_stdout_line("no snapshots captured")
                    .map_err(|err| CliError::new(output_error("stdout", &err)))?,
            }
        }
        SnapshotCommand::Trends(trends) => {
            let points = engine
                .trends(
                    Timestamp::from_unix_millis(trends.from),
                    Timestamp::from_unix_millis(trends.to),
                )
                .map_err(|err| CliError::new(format!("trend query failed: {err}")))?;
            write_canonical_json(&points)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Alert Commands
// ============================================================================

/// Dispatches alerts subcommands.
fn command_alerts(engine: &CliEngine, command: &AlertsCommand) -> CliResult<ExitCode> {
    match command {
        AlertsCommand::Generate => {
            let created = engine
                .generate_alerts()
                .map_err(|err| CliError::new(format!("alert generation failed: {err}")))?;
            write_canonical_json(&created)?;
        }
        AlertsCommand::List => {
            let alerts = engine
                .store()
                .unresolved_alerts()
                .map_err(|err| CliError::new(format!("alert listing failed: {err}")))?;
            write_canonical_json(&alerts)?;
        }
        AlertsCommand::Ack(ack) => {
            let alert = engine
                .acknowledge_alert(&AlertId::new(ack.id.clone()), &OperatorId::new(
                    ack.operator.clone(),
                ))
                .map_err(|err| CliError::new(format!("acknowledgement failed: {err}")))?;
            write_canonical_json(&alert)?;
        }
        AlertsCommand::Resolve(resolve) => {
            let alert = engine
                .resolve_alert(&AlertId::new(resolve.id.clone()))
                .map_err(|err| CliError::new(format!("resolution failed: {err}")))?;
            write_canonical_json(&alert)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Reporting Commands
// ============================================================================

/// Executes the `report` command.
fn command_report(engine: &CliEngine) -> CliResult<ExitCode> {
    let report = engine
        .verification_report()
        .map_err(|err| CliError::new(format!("report generation failed: {err}")))?;
    write_canonical_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `health` command; fails when the system is critical.
fn command_health(engine: &CliEngine) -> CliResult<ExitCode> {
    let summary = engine
        .health_summary()
        .map_err(|err| CliError::new(format!("health summary failed: {err}")))?;
    write_canonical_json(&summary)?;
    if summary.system_status == SystemStatus::Critical {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `cleanup` command.
fn command_cleanup(
    engine: &CliEngine,
    config: &GeoTrustConfig,
    command: &CleanupCommand,
) -> CliResult<ExitCode> {
    let retention_days = command.retention_days.unwrap_or(config.engine.retention_days);
    let stats = engine
        .cleanup(retention_days)
        .map_err(|err| CliError::new(format!("cleanup failed: {err}")))?;
    write_canonical_json(&stats)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Parses a raw store identifier, rejecting zero.
fn parse_store_id(raw: u64) -> CliResult<StoreId> {
    StoreId::from_raw(raw)
        .ok_or_else(|| CliError::new("store identifier must be non-zero".to_owned()))
}

/// Reads a size-limited file into memory.
fn read_limited(path: &Path) -> CliResult<Vec<u8>> {
    let metadata = fs::metadata(path).map_err(|err| {
        CliError::new(format!("failed to read {}: {err}", path.display()))
    })?;
    if metadata.len() > MAX_INPUT_BYTES {
        return Err(CliError::new(format!(
            "input {} exceeds size limit ({} > {MAX_INPUT_BYTES} bytes)",
            path.display(),
            metadata.len()
        )));
    }
    fs::read(path).map_err(|err| CliError::new(format!("failed to read {}: {err}", path.display())))
}

/// Reads an ingest batch file holding a JSON array of documents.
fn read_json_documents(path: &Path) -> CliResult<Vec<Value>> {
    let bytes = read_limited(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("input {} is not a JSON array: {err}", path.display())))
}

/// Reads a polygon file holding a JSON array of vertices.
fn read_polygon(path: &Path) -> CliResult<Polygon> {
    let bytes = read_limited(path)?;
    let vertices: Vec<GeoPoint> = serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(format!("polygon {} is not a JSON vertex array: {err}", path.display()))
    })?;
    Ok(Polygon::new(vertices))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes canonical JSON to stdout with a trailing newline.
fn write_canonical_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output write failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
