// crates/perf-gate-cli/src/pipeline.rs
// ============================================================================
// Module: Gate Pipeline
// Description: Config-driven ingestion, history loading, and evaluation.
// Purpose: Wire file provider, adapters, caches, and the evaluator together.
// Dependencies: perf-gate-core, perf-gate-adapters, perf-gate-config, time, tracing
// ============================================================================

//! ## Overview
//! A [`GateSession`] owns everything one CLI invocation needs: the validated
//! config, a file provider, the adapter registry, and batch options sharing
//! one in-memory report cache. Evaluation proceeds in fixed steps:
//!
//! 1. Convert and validate constraints (fail fast, nothing is read first).
//! 2. Parse prior runs into an in-memory history.
//! 3. Parse the current run and attach to each report a baseline from the
//!    most recent prior run that carries a report of the same name.
//! 4. Evaluate constraints against the sealed run and fold the verdicts.
//!
//! Report files that fail to parse are logged and carried in the result;
//! the run is evaluated on whatever parsed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use perf_gate_adapters::AdapterRegistry;
use perf_gate_adapters::BatchOptions;
use perf_gate_adapters::BatchOutcome;
use perf_gate_adapters::FormatError;
use perf_gate_adapters::RegistryError;
use perf_gate_adapters::parse_batch;
use perf_gate_config::ConfigError;
use perf_gate_config::PerfGateConfig;
use perf_gate_core::BaselineSnapshot;
use perf_gate_core::ConstraintError;
use perf_gate_core::ConstraintEvaluator;
use perf_gate_core::ConstraintVerdict;
use perf_gate_core::FileProvider;
use perf_gate_core::FileProviderError;
use perf_gate_core::HistoryError;
use perf_gate_core::HistoryProvider;
use perf_gate_core::HistoryRequest;
use perf_gate_core::InMemoryReportCache;
use perf_gate_core::InMemoryRunHistory;
use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportError;
use perf_gate_core::ReportInput;
use perf_gate_core::RunRecord;
use perf_gate_core::SharedReportCache;
use perf_gate_core::Timestamp;
use perf_gate_core::VerdictSummary;
use perf_gate_core::aggregate;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::files::FsFileProvider;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pipeline failures that stop a command.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Adapter registration failed.
    #[error("adapter registry error: {0}")]
    Registry(#[from] RegistryError),
    /// A pattern could not be resolved.
    #[error(transparent)]
    Files(#[from] FileProviderError),
    /// History backend failure.
    #[error(transparent)]
    History(#[from] HistoryError),
    /// A constraint is invalid.
    #[error("invalid constraint: {0}")]
    Constraint(#[from] ConstraintError),
    /// A report rejected an update.
    #[error("report error: {0}")]
    Report(#[from] ReportError),
    /// History directory could not be listed.
    #[error("history io error: {0}")]
    Io(String),
    /// No input patterns were configured or given.
    #[error("no report inputs: set inputs.patterns or pass patterns")]
    NoInputs,
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// The current run after ingestion.
#[derive(Debug, Clone)]
pub struct CurrentRun {
    /// Run with sealed reports.
    pub run: RunRecord,
    /// Files that failed to parse.
    pub failures: Vec<FormatError>,
    /// Reports served from the cache.
    pub cache_hits: usize,
}

/// Result of evaluating the gate.
#[derive(Debug, Clone)]
pub struct GateReport {
    /// Evaluated run.
    pub run: RunRecord,
    /// Files of the current run that failed to parse.
    pub parse_failures: Vec<FormatError>,
    /// Folded outcome.
    pub summary: VerdictSummary,
    /// Verdicts in constraint order.
    pub verdicts: Vec<ConstraintVerdict>,
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// One configured ingestion and evaluation session.
pub struct GateSession {
    /// Validated configuration.
    config: PerfGateConfig,
    /// Pattern resolver.
    provider: FsFileProvider,
    /// Adapter registry built from the config.
    registry: AdapterRegistry,
    /// Batch options shared by every parse.
    options: BatchOptions,
}

impl GateSession {
    /// Builds a session from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Registry`] when adapter registration fails.
    pub fn new(config: PerfGateConfig, provider: FsFileProvider) -> Result<Self, PipelineError> {
        let registry = AdapterRegistry::with_builtin_adapters(
            config.adapters.builtin_configs(),
            config.adapters.access_policy(),
        )?;
        let mut options = BatchOptions::new(config.inputs.worker_count());
        if let Some(adapter) = &config.inputs.adapter {
            options = options.with_adapter(adapter.clone());
        }
        if config.inputs.cache {
            options = options.with_cache(SharedReportCache::from_cache(InMemoryReportCache::new()));
        }
        Ok(Self { config, provider, registry, options })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PerfGateConfig {
        &self.config
    }

    /// Returns the adapter registry.
    #[must_use]
    pub const fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Resolves patterns into inputs, dropping repeated report names.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Files`] when a pattern cannot be resolved.
    pub fn collect_inputs(&self, patterns: &[String]) -> Result<Vec<ReportInput>, PipelineError> {
        let mut seen = BTreeSet::new();
        let mut inputs = Vec::new();
        for pattern in patterns {
            let resolved = self.provider.resolve(pattern)?;
            if resolved.is_empty() {
                warn!(pattern = pattern.as_str(), "pattern matched no report files");
            }
            for input in resolved {
                if seen.insert(input.name.clone()) {
                    inputs.push(input);
                } else {
                    warn!(report = %input.name, "duplicate report name ignored");
                }
            }
        }
        Ok(inputs)
    }

    /// Resolves and parses patterns.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Files`] when a pattern cannot be resolved.
    pub fn parse_patterns(&self, patterns: &[String]) -> Result<BatchOutcome, PipelineError> {
        let inputs = self.collect_inputs(patterns)?;
        Ok(parse_batch(&self.registry, &inputs, &self.options))
    }

    /// Parses every configured prior run into a history.
    ///
    /// Explicit `[[history.runs]]` entries win over a numbered directory of
    /// the same run under `history.root`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when a history directory or pattern cannot
    /// be read.
    pub fn load_history(&self) -> Result<InMemoryRunHistory, PipelineError> {
        let history = InMemoryRunHistory::new();
        let mut listed = BTreeSet::new();
        for entry in &self.config.history.runs {
            listed.insert(entry.number);
            let outcome = self.parse_patterns(&entry.patterns)?;
            let started_at = entry.started_at()?;
            let run = build_run(entry.run_id(), entry.number, started_at, outcome.reports, epoch);
            history.record(run)?;
        }
        if let Some(root) = &self.config.history.root {
            for number in numbered_dirs(&self.provider.root().join(root))? {
                if listed.contains(&number) {
                    continue;
                }
                let pattern = root.join(number.to_string()).join("*");
                let outcome = self.parse_patterns(&[pattern.to_string_lossy().into_owned()])?;
                let run = build_run(format!("run-{number}"), number, None, outcome.reports, epoch);
                history.record(run)?;
            }
        }
        Ok(history)
    }

    /// Parses the current run and attaches baselines from the most recent
    /// prior run holding each report.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when no inputs are configured, a pattern
    /// cannot be resolved, or history lookup fails.
    pub fn current_run(&self, history: &InMemoryRunHistory) -> Result<CurrentRun, PipelineError> {
        if self.config.inputs.patterns.is_empty() {
            return Err(PipelineError::NoInputs);
        }
        let outcome = self.parse_patterns(&self.config.inputs.patterns)?;
        let mut reports = outcome.reports;
        for report in &mut reports {
            if let Some((run_number, baseline)) =
                find_baseline(history, self.config.run.number, report)?
            {
                report.attach_baseline(baseline)?;
                debug!(report = %report.name(), baseline_run = run_number, "baseline attached");
            }
        }
        let run = build_run(
            self.config.run.run_id(),
            self.config.run.number,
            self.config.run.started_at()?,
            reports,
            now,
        );
        Ok(CurrentRun { run, failures: outcome.failures, cache_hits: outcome.cache_hits })
    }

    /// Runs the full gate.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when constraints are invalid or ingestion
    /// cannot proceed.
    pub fn evaluate(&self) -> Result<GateReport, PipelineError> {
        let constraints = self.config.constraints()?;
        let history = self.load_history()?;
        let current = self.current_run(&history)?;
        let prior = history.prior_runs(&HistoryRequest::for_run(current.run.number))?;
        let evaluator = ConstraintEvaluator::new(&current.run, &prior);
        let verdicts = match self.config.evaluation.parallel_workers() {
            Some(workers) => evaluator.evaluate_all_parallel(&constraints, workers)?,
            None => evaluator.evaluate_all(&constraints)?,
        };
        let mut summary = aggregate(&verdicts);
        summary.record_failed_inputs(current.failures.iter().map(|failure| failure.report.clone()));
        info!(
            run = %current.run.run_id,
            outcome = %summary.outcome,
            passed = summary.passed,
            failed = summary.failed,
            unresolved = summary.unresolved,
            skipped = summary.skipped,
            history_runs = prior.len(),
            failed_inputs = summary.failed_inputs,
            "gate evaluated"
        );
        Ok(GateReport {
            run: current.run,
            parse_failures: current.failures,
            summary,
            verdicts,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a run, taking the start time from `started_at`, else the earliest
/// report timestamp, else `fallback`.
fn build_run(
    run_id: String,
    number: u64,
    started_at: Option<Timestamp>,
    reports: Vec<PerformanceReport>,
    fallback: fn() -> Timestamp,
) -> RunRecord {
    let started_at = started_at
        .or_else(|| reports.iter().filter_map(PerformanceReport::first_timestamp).min())
        .unwrap_or_else(fallback);
    reports
        .into_iter()
        .fold(RunRecord::new(run_id, number, started_at), RunRecord::with_report)
}

/// Walks prior runs newest first until one carries a report named like
/// `report`, returning that run's number and a snapshot of the report.
fn find_baseline(
    history: &impl HistoryProvider,
    run_number: u64,
    report: &PerformanceReport,
) -> Result<Option<(u64, BaselineSnapshot)>, HistoryError> {
    let mut request = HistoryRequest::for_run(run_number);
    while let Some(run) = history.previous_run(&request)? {
        if let Some(baseline) = run.report(report.name()) {
            return Ok(Some((run.number, BaselineSnapshot::capture(baseline))));
        }
        request = request.with_cursor(run.number);
    }
    Ok(None)
}

/// Returns the Unix epoch.
const fn epoch() -> Timestamp {
    Timestamp::from_unix_millis(0)
}

/// Returns the current time.
fn now() -> Timestamp {
    Timestamp::from_offset_datetime(OffsetDateTime::now_utc())
}

/// Lists subdirectories of `root` whose names are run numbers, ascending.
fn numbered_dirs(root: &Path) -> Result<Vec<u64>, PipelineError> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(root = %root.display(), "history root does not exist");
            return Ok(Vec::new());
        }
        Err(err) => return Err(PipelineError::Io(format!("{}: {err}", root.display()))),
    };
    let mut numbers = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| PipelineError::Io(format!("{}: {err}", root.display())))?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Some(number) = entry.file_name().to_str().and_then(|name| name.parse().ok()) {
            numbers.push(number);
        }
    }
    numbers.sort_unstable();
    Ok(numbers)
}
