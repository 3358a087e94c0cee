// crates/perf-gate-adapters/src/batch.rs
// ============================================================================
// Module: Batch Parsing
// Description: Parallel parsing of many report inputs.
// Purpose: Fan adapter work out to scoped workers and collect it in order.
// Dependencies: perf-gate-core, tracing
// ============================================================================

//! ## Overview
//! [`parse_batch`] parses each input on a bounded pool of scoped worker
//! threads. Workers pull the next input index from a shared counter and send
//! `(index, result)` through a fan-in channel; the calling thread assembles
//! the outcome in input order, so the result does not depend on scheduling.
//!
//! A failed input is recorded in [`BatchOutcome::failures`] and never
//! aborts its siblings. When a report cache is configured, inputs are looked
//! up by [`ReportKey`] before parsing. Cache errors are logged and otherwise
//! ignored: a failed load is a miss and a failed store is dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroUsize;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;

use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportCache;
use perf_gate_core::ReportInput;
use perf_gate_core::ReportKey;
use perf_gate_core::SharedReportCache;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::AdapterRegistry;
use crate::FormatError;

// ============================================================================
// SECTION: Options and Outcome
// ============================================================================

/// Batch parsing options.
#[derive(Clone)]
pub struct BatchOptions {
    /// Upper bound on worker threads.
    pub workers: NonZeroUsize,
    /// Adapter forced for every input; detected per input when `None`.
    pub adapter: Option<String>,
    /// Optional cache consulted before parsing.
    pub cache: Option<SharedReportCache>,
}

impl BatchOptions {
    /// Creates options with `workers` threads, detection, and no cache.
    #[must_use]
    pub const fn new(workers: NonZeroUsize) -> Self {
        Self { workers, adapter: None, cache: None }
    }

    /// Forces one adapter for every input.
    #[must_use]
    pub fn with_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    /// Attaches a report cache.
    #[must_use]
    pub fn with_cache(mut self, cache: SharedReportCache) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::new(thread::available_parallelism().unwrap_or(NonZeroUsize::MIN))
    }
}

/// Result of a batch parse.
///
/// # Invariants
/// - `reports` and `failures` each preserve input order.
/// - Every input lands in exactly one of the two lists.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successfully parsed reports.
    pub reports: Vec<PerformanceReport>,
    /// Per-input failures.
    pub failures: Vec<FormatError>,
    /// Number of reports served from the cache.
    pub cache_hits: usize,
}

impl BatchOutcome {
    /// Returns true when every input parsed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// SECTION: Batch Parsing
// ============================================================================

/// Result of one worker task.
struct Parsed {
    /// Input position.
    index: usize,
    /// Parse result.
    result: Result<PerformanceReport, FormatError>,
    /// True when the report came from the cache.
    cached: bool,
}

/// Parses every input with the registry, in parallel.
#[must_use]
pub fn parse_batch(
    registry: &AdapterRegistry,
    inputs: &[ReportInput],
    options: &BatchOptions,
) -> BatchOutcome {
    let workers = options.workers.get().min(inputs.len());
    let next = AtomicUsize::new(0);
    let (sender, receiver) = mpsc::channel::<Parsed>();
    let mut slots: Vec<Option<Parsed>> = Vec::with_capacity(inputs.len());
    slots.resize_with(inputs.len(), || None);

    thread::scope(|scope| {
        for _ in 0 .. workers {
            let sender = sender.clone();
            let next = &next;
            scope.spawn(move || {
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(input) = inputs.get(index) else {
                        break;
                    };
                    let parsed = parse_one(registry, input, options, index);
                    if sender.send(parsed).is_err() {
                        break;
                    }
                }
            });
        }
        drop(sender);
        for parsed in receiver {
            if let Some(slot) = slots.get_mut(parsed.index) {
                *slot = Some(parsed);
            }
        }
    });

    let mut outcome = BatchOutcome::default();
    for parsed in slots.into_iter().flatten() {
        outcome.cache_hits += usize::from(parsed.cached);
        match parsed.result {
            Ok(report) => outcome.reports.push(report),
            Err(err) => {
                warn!(report = %err.report, reason = %err.reason, "report failed to parse");
                outcome.failures.push(err);
            }
        }
    }
    info!(
        inputs = inputs.len(),
        reports = outcome.reports.len(),
        failures = outcome.failures.len(),
        cache_hits = outcome.cache_hits,
        "batch parse complete"
    );
    outcome
}

/// Parses one input, consulting the cache when configured.
fn parse_one(
    registry: &AdapterRegistry,
    input: &ReportInput,
    options: &BatchOptions,
    index: usize,
) -> Parsed {
    let key = options.cache.as_ref().map(|_| ReportKey::for_input(input));
    if let (Some(cache), Some(key)) = (&options.cache, &key) {
        match cache.load(key) {
            Ok(Some(report)) => {
                debug!(key = %key, "report cache hit");
                return Parsed { index, result: Ok(report), cached: true };
            }
            Ok(None) => {}
            Err(err) => warn!(key = %key, error = %err, "report cache load failed"),
        }
    }
    let result = registry.parse(input, options.adapter.as_deref());
    if let (Some(cache), Some(key), Ok(report)) = (&options.cache, &key, &result)
        && let Err(err) = cache.store(key, report)
    {
        warn!(key = %key, error = %err, "report cache store failed");
    }
    Parsed { index, result, cached: false }
}
