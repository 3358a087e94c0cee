// crates/perf-gate-cli/src/main.rs
// ============================================================================
// Module: Perf Gate CLI Entry Point
// Description: Command dispatcher for report parsing and gate evaluation.
// Purpose: Provide a CI-friendly CLI whose exit code is the gate outcome.
// Dependencies: clap, perf-gate-cli, perf-gate-config, perf-gate-core, thiserror
// ============================================================================

//! ## Overview
//! The Perf Gate CLI parses performance-test reports, evaluates configured
//! constraints against run history, and exports statistics. Exit codes:
//! `0` success, `1` failure or error, `2` unstable.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use perf_gate_cli::FsFileProvider;
use perf_gate_cli::GateSession;
use perf_gate_cli::JsonSink;
use perf_gate_cli::TextSink;
use perf_gate_cli::init_logging;
use perf_gate_cli::render::ExportFormat;
use perf_gate_cli::render::constraint_export;
use perf_gate_cli::render::report_export;
use perf_gate_cli::render::report_line;
use perf_gate_config::PerfGateConfig;
use perf_gate_config::config_toml_example;
use perf_gate_core::GateOutcome;
use perf_gate_core::OutcomeSink;
use perf_gate_core::ReportExport;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "perf-gate", version, disable_help_subcommand = true)]
struct Cli {
    /// Config file path (defaults to perf-gate.toml or `PERF_GATE_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Log filter overriding `RUST_LOG` and the configured level.
    #[arg(long, value_name = "FILTER", global = true)]
    log_level: Option<String>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse report files and print per-report statistics.
    Parse(ParseCommand),
    /// Evaluate configured constraints; the exit code is the gate outcome.
    Evaluate(EvaluateCommand),
    /// Export report statistics or constraint verdicts.
    Export(ExportCommand),
    /// List registered adapters and whether policy allows them.
    Adapters,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `parse` command.
#[derive(Args, Debug)]
struct ParseCommand {
    /// Report file patterns; the configured inputs when omitted.
    #[arg(value_name = "PATTERN")]
    patterns: Vec<String>,
    /// Adapter forced for every file.
    #[arg(long, value_name = "NAME")]
    adapter: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for the `evaluate` command.
#[derive(Args, Debug)]
struct EvaluateCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for the `export` command.
#[derive(Args, Debug)]
struct ExportCommand {
    /// What to export.
    #[arg(value_enum)]
    target: ExportTarget,
    /// Serialization format.
    #[arg(long, value_enum, default_value_t = ExportFormatArg::Json)]
    format: ExportFormatArg,
    /// Directory receiving one file per export; stdout when omitted.
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Perf Gate configuration file.
    Validate,
    /// Print a canonical example configuration.
    Example,
}

/// Terminal output formats.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// JSON documents.
    Json,
}

/// Export targets.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ExportTarget {
    /// Per-label statistics of every report.
    Reports,
    /// Constraint verdicts of an evaluation.
    Constraints,
}

/// Export formats.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ExportFormatArg {
    /// JSON documents.
    Json,
    /// CSV tables.
    Csv,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(value: ExportFormatArg) -> Self {
        match value {
            ExportFormatArg::Json => Self::Json,
            ExportFormatArg::Csv => Self::Csv,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a printable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run(cli: Cli) -> CliResult<ExitCode> {
    let Cli { config, log_level, command } = cli;
    let load = || prepare(config.as_deref(), log_level.as_deref());
    match command {
        Commands::Parse(command) => command_parse(load()?, command),
        Commands::Evaluate(command) => command_evaluate(load()?, &command),
        Commands::Export(command) => command_export(load()?, &command),
        Commands::Adapters => command_adapters(load()?),
        Commands::Config { command } => command_config(&command, config.as_deref()),
    }
}

/// Loads configuration and installs logging.
fn prepare(path: Option<&Path>, log_level: Option<&str>) -> CliResult<PerfGateConfig> {
    let config = PerfGateConfig::load_or_default(path)
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    init_logging(log_level, &config.logging.level, config.logging.ansi)
        .map_err(|err| CliError::new(err.to_string()))?;
    Ok(config)
}

/// Builds a session rooted at the working directory.
fn session(config: PerfGateConfig) -> CliResult<GateSession> {
    GateSession::new(config, FsFileProvider::new("."))
        .map_err(|err| CliError::new(format!("session setup failed: {err}")))
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `parse` command.
fn command_parse(mut config: PerfGateConfig, command: ParseCommand) -> CliResult<ExitCode> {
    if command.adapter.is_some() {
        config.inputs.adapter = command.adapter;
    }
    let patterns =
        if command.patterns.is_empty() { config.inputs.patterns.clone() } else { command.patterns };
    if patterns.is_empty() {
        return Err(CliError::new("no report inputs: set inputs.patterns or pass patterns"));
    }
    let session = session(config)?;
    let outcome = session
        .parse_patterns(&patterns)
        .map_err(|err| CliError::new(format!("parse failed: {err}")))?;
    for report in &outcome.reports {
        let line = match command.format {
            OutputFormat::Text => report_line(report),
            OutputFormat::Json => ReportExport::from_report(report)
                .to_json()
                .map_err(|err| CliError::new(err.to_string()))?,
        };
        write_stdout_line(&line)?;
    }
    for failure in &outcome.failures {
        write_stderr_line(&format!("error: {failure}"))?;
    }
    Ok(if outcome.is_complete() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Executes the `evaluate` command.
fn command_evaluate(config: PerfGateConfig, command: &EvaluateCommand) -> CliResult<ExitCode> {
    let session = session(config)?;
    let report = session
        .evaluate()
        .map_err(|err| CliError::new(format!("evaluation failed: {err}")))?;
    for failure in &report.parse_failures {
        write_stderr_line(&format!("error: {failure}"))?;
    }
    let stdout = std::io::stdout().lock();
    match command.format {
        OutputFormat::Text => {
            let mut sink = TextSink::new(stdout);
            for run_report in &report.run.reports {
                let line = report_line(run_report);
                sink.write_line(&line).map_err(|err| CliError::new(output_error(&err)))?;
            }
            sink.publish(&report.summary, &report.verdicts)
                .map_err(|err| CliError::new(err.to_string()))?;
        }
        OutputFormat::Json => {
            JsonSink::new(stdout)
                .publish(&report.summary, &report.verdicts)
                .map_err(|err| CliError::new(err.to_string()))?;
        }
    }
    Ok(outcome_exit_code(report.summary.outcome))
}

/// Executes the `export` command.
fn command_export(config: PerfGateConfig, command: &ExportCommand) -> CliResult<ExitCode> {
    let format = ExportFormat::from(command.format);
    let session = session(config)?;
    let mut documents = Vec::new();
    match command.target {
        ExportTarget::Reports => {
            let patterns = session.config().inputs.patterns.clone();
            if patterns.is_empty() {
                return Err(CliError::new("no report inputs: set inputs.patterns"));
            }
            let outcome = session
                .parse_patterns(&patterns)
                .map_err(|err| CliError::new(format!("parse failed: {err}")))?;
            for failure in &outcome.failures {
                write_stderr_line(&format!("error: {failure}"))?;
            }
            for report in &outcome.reports {
                let body = report_export(report, format)
                    .map_err(|err| CliError::new(err.to_string()))?;
                documents.push((report.name().to_string(), body));
            }
        }
        ExportTarget::Constraints => {
            let report = session
                .evaluate()
                .map_err(|err| CliError::new(format!("evaluation failed: {err}")))?;
            let body = constraint_export(&report.verdicts, format)
                .map_err(|err| CliError::new(err.to_string()))?;
            documents.push(("constraints".to_string(), body));
        }
    }
    match &command.output {
        Some(dir) => write_documents(dir, &documents, format)?,
        None => {
            for (_, body) in &documents {
                write_stdout_line(body.trim_end())?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `adapters` command.
fn command_adapters(config: PerfGateConfig) -> CliResult<ExitCode> {
    let session = session(config)?;
    let registry = session.registry();
    for name in registry.adapter_names() {
        let status = if registry.policy().is_allowed(name) { "allowed" } else { "denied" };
        write_stdout_line(&format!("{name}\t{status}"))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand, path: Option<&Path>) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => {
            let config = PerfGateConfig::load(path)
                .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
            write_stdout_line(&format!(
                "config ok: {} input pattern(s), {} constraint(s)",
                config.inputs.patterns.len(),
                config.constraints.len()
            ))?;
        }
        ConfigCommand::Example => write_stdout_line(config_toml_example().trim_end())?,
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Maps a gate outcome to the process exit code.
fn outcome_exit_code(outcome: GateOutcome) -> ExitCode {
    match outcome {
        GateOutcome::Success => ExitCode::SUCCESS,
        GateOutcome::Failure => ExitCode::FAILURE,
        GateOutcome::Unstable => ExitCode::from(2),
    }
}

/// Writes one file per export document into `dir`.
fn write_documents(
    dir: &Path,
    documents: &[(String, String)],
    format: ExportFormat,
) -> CliResult<()> {
    fs::create_dir_all(dir)
        .map_err(|err| CliError::new(format!("{}: {err}", dir.display())))?;
    for (name, body) in documents {
        let path = dir.join(format!("{name}.{}", format.extension()));
        fs::write(&path, body)
            .map_err(|err| CliError::new(format!("{}: {err}", path.display())))?;
        write_stdout_line(&format!("wrote {}", path.display()))?;
    }
    Ok(())
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::new(output_error(&err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> CliResult<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}").map_err(|err| CliError::new(output_error(&err)))
}

/// Formats an output error message.
fn output_error(error: &std::io::Error) -> String {
    format!("failed to write output: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "error: {message}");
    ExitCode::FAILURE
}
