// crates/perf-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Perf Gate In-Memory Stores
// Description: In-memory report cache and run history.
// Purpose: Provide deterministic collaborator implementations without I/O.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides in-memory implementations of [`ReportCache`] and
//! [`HistoryProvider`] for tests and the CLI, plus shared `Arc` wrappers so a
//! single backend can be handed to several workers. Neither store is durable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::PerformanceReport;
use crate::core::RunRecord;
use crate::interfaces::CacheError;
use crate::interfaces::HistoryError;
use crate::interfaces::HistoryProvider;
use crate::interfaces::HistoryRequest;
use crate::interfaces::ReportCache;
use crate::interfaces::ReportKey;

// ============================================================================
// SECTION: Report Cache
// ============================================================================

/// In-memory report cache keyed by content hash.
#[derive(Debug, Default, Clone)]
pub struct InMemoryReportCache {
    /// Cached reports protected by a mutex.
    reports: Arc<Mutex<BTreeMap<ReportKey, PerformanceReport>>>,
}

impl InMemoryReportCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached reports.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Cache`] when the mutex is poisoned.
    pub fn cached_count(&self) -> Result<usize, CacheError> {
        let guard = self
            .reports
            .lock()
            .map_err(|_| CacheError::Cache("report cache mutex poisoned".to_string()))?;
        Ok(guard.len())
    }
}

impl ReportCache for InMemoryReportCache {
    fn load(&self, key: &ReportKey) -> Result<Option<PerformanceReport>, CacheError> {
        let guard = self
            .reports
            .lock()
            .map_err(|_| CacheError::Cache("report cache mutex poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn store(&self, key: &ReportKey, report: &PerformanceReport) -> Result<(), CacheError> {
        self.reports
            .lock()
            .map_err(|_| CacheError::Cache("report cache mutex poisoned".to_string()))?
            .insert(key.clone(), report.clone());
        Ok(())
    }
}

/// Shared report cache backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedReportCache {
    /// Inner cache implementation.
    inner: Arc<dyn ReportCache + Send + Sync>,
}

impl SharedReportCache {
    /// Wraps a cache in a shared, clonable wrapper.
    #[must_use]
    pub fn from_cache(cache: impl ReportCache + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(cache) }
    }

    /// Wraps an existing shared cache.
    #[must_use]
    pub const fn new(cache: Arc<dyn ReportCache + Send + Sync>) -> Self {
        Self { inner: cache }
    }
}

impl ReportCache for SharedReportCache {
    fn load(&self, key: &ReportKey) -> Result<Option<PerformanceReport>, CacheError> {
        self.inner.load(key)
    }

    fn store(&self, key: &ReportKey, report: &PerformanceReport) -> Result<(), CacheError> {
        self.inner.store(key, report)
    }
}

// ============================================================================
// SECTION: Run History
// ============================================================================

/// In-memory run history ordered by run number.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRunHistory {
    /// Runs keyed by run number, protected by a mutex.
    runs: Arc<Mutex<BTreeMap<u64, RunRecord>>>,
}

impl InMemoryRunHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a run, sealing its reports. A run with the same number is
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Provider`] when the mutex is poisoned.
    pub fn record(&self, mut run: RunRecord) -> Result<(), HistoryError> {
        run.seal_all();
        self.runs
            .lock()
            .map_err(|_| HistoryError::Provider("run history mutex poisoned".to_string()))?
            .insert(run.number, run);
        Ok(())
    }
}

impl HistoryProvider for InMemoryRunHistory {
    fn previous_run(&self, request: &HistoryRequest) -> Result<Option<RunRecord>, HistoryError> {
        let guard = self
            .runs
            .lock()
            .map_err(|_| HistoryError::Provider("run history mutex poisoned".to_string()))?;
        Ok(guard.range(..request.upper_bound()).next_back().map(|(_, run)| run.clone()))
    }

    fn prior_runs(&self, request: &HistoryRequest) -> Result<Vec<RunRecord>, HistoryError> {
        let guard = self
            .runs
            .lock()
            .map_err(|_| HistoryError::Provider("run history mutex poisoned".to_string()))?;
        Ok(guard.range(..request.upper_bound()).map(|(_, run)| run.clone()).collect())
    }
}

/// Shared history provider backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedHistoryProvider {
    /// Inner provider implementation.
    inner: Arc<dyn HistoryProvider + Send + Sync>,
}

impl SharedHistoryProvider {
    /// Wraps a provider in a shared, clonable wrapper.
    #[must_use]
    pub fn from_provider(provider: impl HistoryProvider + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(provider) }
    }
}

impl HistoryProvider for SharedHistoryProvider {
    fn previous_run(&self, request: &HistoryRequest) -> Result<Option<RunRecord>, HistoryError> {
        self.inner.previous_run(request)
    }

    fn prior_runs(&self, request: &HistoryRequest) -> Result<Vec<RunRecord>, HistoryError> {
        self.inner.prior_runs(request)
    }
}
