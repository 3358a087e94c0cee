// crates/perf-gate-adapters/src/registry.rs
// ============================================================================
// Module: Adapter Registry
// Description: Registry of built-in and custom report adapters.
// Purpose: Route report inputs to an adapter by name or by content detection.
// Dependencies: perf-gate-core, serde, tracing
// ============================================================================

//! ## Overview
//! The adapter registry resolves report inputs to adapters either by explicit
//! name or by sniffing the leading bytes of the content. Detection tries
//! adapters in registration order; the built-in order puts XML formats
//! first, then CSV formats, then console logs. Allowlist and denylist
//! policies apply to both routes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use perf_gate_core::PerformanceReport;
use perf_gate_core::ReportInput;
use serde::Deserialize;
use tracing::debug;

use crate::ContentProbe;
use crate::FormatError;
use crate::JmeterCsvAdapter;
use crate::JmeterCsvConfig;
use crate::JmeterLogAdapter;
use crate::JmeterXmlAdapter;
use crate::JunitAdapter;
use crate::LocustAdapter;
use crate::LocustConfig;
use crate::RegistryError;
use crate::ReportAdapter;
use crate::TaurusConfig;
use crate::TaurusCsvAdapter;
use crate::TaurusXmlAdapter;
use crate::WrkAdapter;

// ============================================================================
// SECTION: Built-in Config
// ============================================================================

/// Configuration bundle for built-in adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuiltinAdapterConfigs {
    /// Configuration for the JMeter CSV adapter.
    #[serde(default)]
    pub jmeter_csv: JmeterCsvConfig,
    /// Configuration shared by the Taurus adapters.
    #[serde(default)]
    pub taurus: TaurusConfig,
    /// Configuration for the Locust adapter.
    #[serde(default)]
    pub locust: LocustConfig,
}

// ============================================================================
// SECTION: Access Policy
// ============================================================================

/// Access policy controlling which adapters may be used.
///
/// # Invariants
/// - `denylist` overrides `allowlist` when both are present.
/// - If `allowlist` is `None`, all adapters are allowed unless denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterAccessPolicy {
    /// Optional allowlist of adapter names.
    pub allowlist: Option<BTreeSet<String>>,
    /// Explicit denylist of adapter names.
    pub denylist: BTreeSet<String>,
}

impl AdapterAccessPolicy {
    /// Returns a policy that permits all adapters.
    #[must_use]
    pub const fn allow_all() -> Self {
        Self {
            allowlist: None,
            denylist: BTreeSet::new(),
        }
    }

    /// Returns true when the adapter is allowed by policy.
    #[must_use]
    pub fn is_allowed(&self, adapter: &str) -> bool {
        if self.denylist.contains(adapter) {
            return false;
        }
        if let Some(allowlist) = &self.allowlist {
            return allowlist.contains(adapter);
        }
        true
    }
}

impl Default for AdapterAccessPolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}

// ============================================================================
// SECTION: Adapter Registry
// ============================================================================

/// Report adapter registry with policy enforcement.
///
/// # Invariants
/// - Adapter names are unique within the registry.
/// - `order` lists every registered name exactly once, in registration order.
/// - Access policy is enforced on every lookup.
pub struct AdapterRegistry {
    /// Adapter implementations keyed by adapter name.
    adapters: BTreeMap<String, Box<dyn ReportAdapter + Send + Sync>>,
    /// Registration order used for detection.
    order: Vec<String>,
    /// Access control policy for adapter usage.
    policy: AdapterAccessPolicy,
}

impl AdapterRegistry {
    /// Creates an empty registry with the provided policy.
    #[must_use]
    pub const fn new(policy: AdapterAccessPolicy) -> Self {
        Self {
            adapters: BTreeMap::new(),
            order: Vec::new(),
            policy,
        }
    }

    /// Creates a registry with every built-in adapter registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a built-in name collides.
    pub fn with_builtin_adapters(
        configs: BuiltinAdapterConfigs,
        policy: AdapterAccessPolicy,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new(policy);
        registry.register_builtin_adapters(configs)?;
        Ok(registry)
    }

    /// Registers an adapter under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAdapter`] when the name is taken.
    pub fn register_adapter(
        &mut self,
        adapter: impl ReportAdapter + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        let name = adapter.name().to_string();
        if self.adapters.contains_key(&name) {
            return Err(RegistryError::DuplicateAdapter(name));
        }
        self.order.push(name.clone());
        self.adapters.insert(name, Box::new(adapter));
        Ok(())
    }

    /// Registers the built-in adapters in detection order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a built-in name is already registered.
    pub fn register_builtin_adapters(
        &mut self,
        configs: BuiltinAdapterConfigs,
    ) -> Result<(), RegistryError> {
        self.register_adapter(JmeterXmlAdapter)?;
        self.register_adapter(JunitAdapter)?;
        self.register_adapter(TaurusXmlAdapter::new(configs.taurus.clone()))?;
        self.register_adapter(JmeterCsvAdapter::new(configs.jmeter_csv))?;
        self.register_adapter(TaurusCsvAdapter::new(configs.taurus))?;
        self.register_adapter(LocustAdapter::new(configs.locust))?;
        self.register_adapter(JmeterLogAdapter)?;
        self.register_adapter(WrkAdapter)?;
        Ok(())
    }

    /// Returns the configured policy.
    #[must_use]
    pub const fn policy(&self) -> &AdapterAccessPolicy {
        &self.policy
    }

    /// Returns registered adapter names in detection order.
    #[must_use]
    pub fn adapter_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Returns the adapter registered under `name` when policy allows it.
    #[must_use]
    pub fn select(&self, name: &str) -> Option<&(dyn ReportAdapter + Send + Sync)> {
        if !self.policy.is_allowed(name) {
            return None;
        }
        self.adapters.get(name).map(AsRef::as_ref)
    }

    /// Returns the first allowed adapter whose detector accepts the probe.
    #[must_use]
    pub fn detect(&self, probe: &ContentProbe) -> Option<&(dyn ReportAdapter + Send + Sync)> {
        self.order
            .iter()
            .filter(|name| self.policy.is_allowed(name))
            .filter_map(|name| self.adapters.get(name))
            .map(AsRef::as_ref)
            .find(|adapter| adapter.detect(probe))
    }

    /// Parses an input with the named adapter, or the detected one when
    /// `adapter` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the named adapter is unknown or denied,
    /// no adapter recognizes the content, or parsing fails.
    pub fn parse(
        &self,
        input: &ReportInput,
        adapter: Option<&str>,
    ) -> Result<PerformanceReport, FormatError> {
        let chosen = match adapter {
            Some(name) => {
                if !self.adapters.contains_key(name) {
                    return Err(FormatError::new(&input.name, format!("unknown adapter: {name}")));
                }
                self.select(name).ok_or_else(|| {
                    FormatError::new(&input.name, format!("adapter denied by policy: {name}"))
                })?
            }
            None => {
                let probe = ContentProbe::from_input(input);
                self.detect(&probe)
                    .ok_or_else(|| FormatError::new(&input.name, "unrecognized report format"))?
            }
        };
        debug!(report = %input.name, adapter = chosen.name(), "parsing report");
        chosen.parse(input)
    }
}
