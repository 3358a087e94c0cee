// crates/perf-gate-config/src/config.rs
// ============================================================================
// Module: Perf Gate Configuration
// Description: Configuration loading and validation for Perf Gate.
// Purpose: Provide strict, fail-fast config parsing with hard limits.
// Dependencies: perf-gate-core, perf-gate-adapters, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys, malformed constraints, and inconsistent sections fail before
//! any report is read, so evaluation never starts on a half-valid config.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;

use perf_gate_adapters::AdapterAccessPolicy;
use perf_gate_adapters::BuiltinAdapterConfigs;
use perf_gate_adapters::JmeterCsvConfig;
use perf_gate_adapters::LocustConfig;
use perf_gate_adapters::TaurusConfig;
use perf_gate_adapters::TimestampParser;
use perf_gate_core::Constraint;
use perf_gate_core::ConstraintError;
use perf_gate_core::Escalation;
use perf_gate_core::HistorySelector;
use perf_gate_core::LabelScope;
use perf_gate_core::Metric;
use perf_gate_core::Operator;
use perf_gate_core::Timestamp;
use perf_gate_core::parse_threshold;
use perf_gate_core::validate_all;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "perf-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "PERF_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of input patterns.
pub(crate) const MAX_INPUT_PATTERNS: usize = 256;
/// Maximum number of constraints.
pub(crate) const MAX_CONSTRAINTS: usize = 1024;
/// Maximum number of configured history runs.
pub(crate) const MAX_HISTORY_RUNS: usize = 1024;
/// Maximum worker threads for parsing and evaluation.
pub(crate) const MAX_WORKERS: usize = 256;
/// Log levels accepted by `[logging] level`.
const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Perf Gate configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerfGateConfig {
    /// Identity of the run under evaluation.
    #[serde(default)]
    pub run: RunConfig,
    /// Report inputs of the run.
    #[serde(default)]
    pub inputs: InputsConfig,
    /// Adapter policy and per-adapter options.
    #[serde(default)]
    pub adapters: AdaptersConfig,
    /// Prior runs used by relative constraints.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Constraint evaluation settings.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Constraint definitions.
    #[serde(default)]
    pub constraints: Vec<ConstraintConfig>,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PerfGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path comes from `path`, else the `PERF_GATE_CONFIG` environment
    /// variable, else `perf-gate.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Loads configuration like [`PerfGateConfig::load`], but returns the
    /// defaults when no path was given, the environment variable is unset,
    /// and `perf-gate.toml` does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an explicit or discovered file fails to
    /// load or validate.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if path.is_none()
            && env::var_os(CONFIG_ENV_VAR).is_none()
            && !Path::new(DEFAULT_CONFIG_NAME).exists()
        {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run.validate()?;
        self.inputs.validate()?;
        self.adapters.validate()?;
        self.history.validate()?;
        self.evaluation.validate()?;
        self.logging.validate()?;
        if self.constraints.len() > MAX_CONSTRAINTS {
            return Err(ConfigError::Invalid("too many constraints".to_string()));
        }
        self.constraints()?;
        Ok(())
    }

    /// Converts the constraint definitions into validated core constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Constraint`] naming the first offending entry,
    /// including duplicate identifiers.
    pub fn constraints(&self) -> Result<Vec<Constraint>, ConfigError> {
        let constraints = self
            .constraints
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                entry.to_constraint().map_err(|source| ConfigError::Constraint {
                    index,
                    id: entry.id.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        validate_all(&constraints).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(constraints)
    }
}

// ============================================================================
// SECTION: Run
// ============================================================================

/// Identity of the run under evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Run identifier; `run-<number>` when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Monotonic run number.
    #[serde(default = "default_run_number")]
    pub number: u64,
    /// Start time as epoch milliseconds or a supported textual layout.
    #[serde(default)]
    pub started_at: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { id: None, number: default_run_number(), started_at: None }
    }
}

/// Returns the default run number.
const fn default_run_number() -> u64 {
    1
}

impl RunConfig {
    /// Returns the effective run identifier.
    #[must_use]
    pub fn run_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| format!("run-{}", self.number))
    }

    /// Returns the configured start time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the value is not a timestamp.
    pub fn started_at(&self) -> Result<Option<Timestamp>, ConfigError> {
        self.started_at.as_deref().map(|value| parse_timestamp("run.started_at", value)).transpose()
    }

    /// Validates run settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(id) = &self.id
            && id.trim().is_empty()
        {
            return Err(ConfigError::Invalid("run.id must be non-empty".to_string()));
        }
        self.started_at()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Inputs
// ============================================================================

/// Report inputs of the run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputsConfig {
    /// File patterns resolved relative to the working directory.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Adapter forced for every input; detected per file when absent.
    #[serde(default)]
    pub adapter: Option<String>,
    /// Parser worker threads; available parallelism when absent.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Whether parsed reports are cached by content hash.
    #[serde(default = "default_true")]
    pub cache: bool,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self { patterns: Vec::new(), adapter: None, workers: None, cache: true }
    }
}

/// Returns true for serde defaults.
const fn default_true() -> bool {
    true
}

impl InputsConfig {
    /// Returns the parser worker count.
    #[must_use]
    pub fn worker_count(&self) -> NonZeroUsize {
        worker_count(self.workers)
    }

    /// Validates input settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.patterns.len() > MAX_INPUT_PATTERNS {
            return Err(ConfigError::Invalid("too many inputs.patterns entries".to_string()));
        }
        for pattern in &self.patterns {
            validate_path_string("inputs.patterns", pattern)?;
        }
        if let Some(adapter) = &self.adapter
            && adapter.trim().is_empty()
        {
            return Err(ConfigError::Invalid("inputs.adapter must be non-empty".to_string()));
        }
        validate_workers("inputs.workers", self.workers)
    }
}

// ============================================================================
// SECTION: Adapters
// ============================================================================

/// Adapter policy and per-adapter options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdaptersConfig {
    /// Adapters allowed; all when absent.
    #[serde(default)]
    pub allowlist: Option<BTreeSet<String>>,
    /// Adapters denied; overrides the allowlist.
    #[serde(default)]
    pub denylist: BTreeSet<String>,
    /// JMeter CSV options.
    #[serde(default)]
    pub jmeter_csv: JmeterCsvConfig,
    /// Taurus options.
    #[serde(default)]
    pub taurus: TaurusConfig,
    /// Locust options.
    #[serde(default)]
    pub locust: LocustConfig,
}

impl AdaptersConfig {
    /// Returns the access policy for the adapter registry.
    #[must_use]
    pub fn access_policy(&self) -> AdapterAccessPolicy {
        AdapterAccessPolicy { allowlist: self.allowlist.clone(), denylist: self.denylist.clone() }
    }

    /// Returns the built-in adapter configuration bundle.
    #[must_use]
    pub fn builtin_configs(&self) -> BuiltinAdapterConfigs {
        BuiltinAdapterConfigs {
            jmeter_csv: self.jmeter_csv,
            taurus: self.taurus.clone(),
            locust: self.locust.clone(),
        }
    }

    /// Validates adapter settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(delimiter) = self.jmeter_csv.delimiter
            && !delimiter.is_ascii()
        {
            return Err(ConfigError::Invalid(
                "adapters.jmeter_csv.delimiter must be a single ascii character".to_string(),
            ));
        }
        if self.locust.total_labels.iter().any(|label| label.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "adapters.locust.total_labels entries must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: History
// ============================================================================

/// Prior runs used by relative constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Directory whose numbered subdirectories each hold one prior run.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Explicitly listed prior runs.
    #[serde(default)]
    pub runs: Vec<HistoryRunConfig>,
}

impl HistoryConfig {
    /// Validates history settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(root) = &self.root {
            validate_path_string("history.root", &root.to_string_lossy())?;
        }
        if self.runs.len() > MAX_HISTORY_RUNS {
            return Err(ConfigError::Invalid("too many history.runs entries".to_string()));
        }
        let mut seen = BTreeSet::new();
        for run in &self.runs {
            if !seen.insert(run.number) {
                return Err(ConfigError::Invalid(format!(
                    "history.runs number {} is listed twice",
                    run.number
                )));
            }
            run.validate()?;
        }
        Ok(())
    }
}

/// One explicitly listed prior run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryRunConfig {
    /// Run number.
    pub number: u64,
    /// Run identifier; `run-<number>` when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// Start time; the earliest report timestamp when absent.
    #[serde(default)]
    pub started_at: Option<String>,
    /// Report file patterns of the run.
    pub patterns: Vec<String>,
}

impl HistoryRunConfig {
    /// Returns the effective run identifier.
    #[must_use]
    pub fn run_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| format!("run-{}", self.number))
    }

    /// Returns the configured start time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the value is not a timestamp.
    pub fn started_at(&self) -> Result<Option<Timestamp>, ConfigError> {
        self.started_at
            .as_deref()
            .map(|value| parse_timestamp("history.runs.started_at", value))
            .transpose()
    }

    /// Validates one history run.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.patterns.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "history.runs number {} needs at least one pattern",
                self.number
            )));
        }
        for pattern in &self.patterns {
            validate_path_string("history.runs.patterns", pattern)?;
        }
        self.started_at()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Constraint evaluation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Evaluation worker threads; sequential evaluation when absent.
    #[serde(default)]
    pub workers: Option<usize>,
}

impl EvaluationConfig {
    /// Returns the worker count when parallel evaluation is configured.
    #[must_use]
    pub fn parallel_workers(&self) -> Option<NonZeroUsize> {
        self.workers.and_then(NonZeroUsize::new)
    }

    /// Validates evaluation settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_workers("evaluation.workers", self.workers)
    }
}

// ============================================================================
// SECTION: Constraints
// ============================================================================

/// Threshold given as a TOML number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    /// Numeric threshold.
    Number(f64),
    /// Textual threshold, parsed as a number.
    Text(String),
}

impl ThresholdValue {
    /// Returns the numeric threshold.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::InvalidThreshold`] for non-numeric text.
    pub fn value(&self) -> Result<f64, ConstraintError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Text(text) => parse_threshold(text),
        }
    }
}

/// History selection of a relative constraint. Exactly one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistorySelectorConfig {
    /// Compare against this many most recent runs.
    #[serde(default)]
    pub last_runs: Option<u32>,
    /// Compare against every prior run.
    #[serde(default)]
    pub all_runs: bool,
    /// Inclusive range start.
    #[serde(default)]
    pub from: Option<String>,
    /// Inclusive range end.
    #[serde(default)]
    pub to: Option<String>,
}

impl HistorySelectorConfig {
    /// Converts the selection into a core selector.
    fn to_selector(&self) -> Result<HistorySelector, String> {
        match (self.last_runs, self.all_runs, &self.from, &self.to) {
            (Some(count), false, None, None) => Ok(HistorySelector::LastRuns { count }),
            (None, true, None, None) => Ok(HistorySelector::AllRuns),
            (None, false, Some(from), Some(to)) => {
                let start = parse_timestamp("history.from", from).map_err(|err| err.to_string())?;
                let end = parse_timestamp("history.to", to).map_err(|err| err.to_string())?;
                Ok(HistorySelector::DateRange { start, end })
            }
            _ => Err("history must set exactly one of last_runs, all_runs, or from/to".to_string()),
        }
    }
}

/// One constraint definition.
///
/// # Invariants
/// - A constraint is absolute when `threshold` is set and relative when
///   `history` is set; exactly one of the two must be present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintConfig {
    /// Constraint identifier.
    pub id: String,
    /// Report name the constraint reads.
    pub report: String,
    /// Metric name.
    pub metric: String,
    /// Operator name.
    pub operator: String,
    /// Escalation name; `error` when absent.
    #[serde(default)]
    pub escalation: Option<String>,
    /// Single label to read.
    #[serde(default)]
    pub label: Option<String>,
    /// Read every label of the report.
    #[serde(default)]
    pub all_labels: bool,
    /// Literal threshold of an absolute constraint.
    #[serde(default)]
    pub threshold: Option<ThresholdValue>,
    /// History of a relative constraint.
    #[serde(default)]
    pub history: Option<HistorySelectorConfig>,
    /// Allowed deviation of a relative constraint, in percent.
    #[serde(default)]
    pub tolerance_percent: Option<f64>,
}

impl ConstraintConfig {
    /// Converts the definition into a validated core constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintFieldError`] for unknown names, conflicting
    /// fields, or values the core rejects.
    pub fn to_constraint(&self) -> Result<Constraint, ConstraintFieldError> {
        let metric: Metric = self.metric.parse()?;
        let operator: Operator = self.operator.parse()?;
        let escalation = match &self.escalation {
            Some(name) => name.parse::<Escalation>()?,
            None => Escalation::Error,
        };
        let scope = match (&self.label, self.all_labels) {
            (Some(_), true) => {
                return Err(ConstraintFieldError::Conflict(
                    "label and all_labels are mutually exclusive".to_string(),
                ));
            }
            (Some(label), false) => LabelScope::Label(label.clone()),
            (None, true) => LabelScope::AllLabels,
            (None, false) => LabelScope::WholeReport,
        };
        let constraint = match (&self.threshold, &self.history) {
            (Some(threshold), None) => {
                if self.tolerance_percent.is_some() {
                    return Err(ConstraintFieldError::Conflict(
                        "tolerance_percent applies only to relative constraints".to_string(),
                    ));
                }
                Constraint::absolute(
                    self.id.as_str(),
                    self.report.as_str(),
                    metric,
                    operator,
                    threshold.value()?,
                )?
            }
            (None, Some(history)) => {
                let selector = history.to_selector().map_err(ConstraintFieldError::Conflict)?;
                Constraint::relative(
                    self.id.as_str(),
                    self.report.as_str(),
                    metric,
                    operator,
                    selector,
                    self.tolerance_percent.unwrap_or(0.0),
                )?
            }
            (Some(_), Some(_)) => {
                return Err(ConstraintFieldError::Conflict(
                    "threshold and history are mutually exclusive".to_string(),
                ));
            }
            (None, None) => {
                return Err(ConstraintFieldError::Conflict(
                    "either threshold or history is required".to_string(),
                ));
            }
        };
        Ok(constraint.with_escalation(escalation).with_scope(scope)?)
    }
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default level; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit ANSI colors.
    #[serde(default)]
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), ansi: false }
    }
}

/// Returns the default log level.
fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    /// Validates logging settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Invalid constraint definition.
    #[error("invalid config: constraints[{index}] ({id}): {source}")]
    Constraint {
        /// Position in the constraint list.
        index: usize,
        /// Identifier as written.
        id: String,
        /// Underlying failure.
        source: ConstraintFieldError,
    },
}

/// Failure to convert one constraint definition.
#[derive(Debug, Error)]
pub enum ConstraintFieldError {
    /// The core rejected a name or value.
    #[error(transparent)]
    Core(#[from] ConstraintError),
    /// Fields contradict each other.
    #[error("{0}")]
    Conflict(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path or pattern string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} component too long")));
        }
    }
    Ok(())
}

/// Validates an optional worker count.
fn validate_workers(field: &str, workers: Option<usize>) -> Result<(), ConfigError> {
    match workers {
        Some(0) => Err(ConfigError::Invalid(format!("{field} must be greater than zero"))),
        Some(count) if count > MAX_WORKERS => {
            Err(ConfigError::Invalid(format!("{field} must be at most {MAX_WORKERS}")))
        }
        Some(_) | None => Ok(()),
    }
}

/// Returns the configured worker count or the available parallelism.
fn worker_count(workers: Option<usize>) -> NonZeroUsize {
    workers.and_then(NonZeroUsize::new).unwrap_or_else(|| {
        std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
    })
}

/// Parses a configured timestamp.
fn parse_timestamp(field: &str, value: &str) -> Result<Timestamp, ConfigError> {
    TimestampParser::new()
        .parse(value)
        .ok_or_else(|| ConfigError::Invalid(format!("{field} is not a timestamp: {value}")))
}
