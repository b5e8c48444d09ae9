//! Per-component metric derivation.
//!
//! Each submodule gathers the windowed counters for one kind of component and
//! combines them into that component's metrics.

pub mod cache;
pub mod cores;
pub mod dram;
pub mod memctrl;

use checkpoint::{ComponentDeltas, Error, StatsSource};
use log::warn;

use crate::config::{ComponentKind, ComponentSpec, RunConfig};
use crate::report::{ComponentReport, Metric};

use self::cache::{CacheCounters, CacheMetrics};
use self::cores::{CoreCounters, CoreMetrics};
use self::dram::{DramCounters, DramMetrics};
use self::memctrl::{MemCtrlCounters, MemCtrlMetrics};

/// Result of deriving one component
#[derive(Debug, Clone, PartialEq)]
pub enum Derived {
    Core(CoreMetrics),
    Cache(CacheMetrics),
    MemoryController(MemCtrlMetrics),
    Dram {
        metrics: DramMetrics,
        /// Per-entity bytes, kept for metrics spanning components
        transferred_bytes: Vec<checkpoint::Counter>,
    },
}

impl Derived {
    pub fn entries(&self) -> Vec<(&'static str, Metric)> {
        match self {
            Derived::Core(metrics) => metrics.entries(),
            Derived::Cache(metrics) => metrics.entries(),
            Derived::MemoryController(metrics) => metrics.entries(),
            Derived::Dram { metrics, .. } => metrics.entries(),
        }
    }

    /// Describes a failed sanity check, if any
    pub fn sanity_warning(&self, component: &str) -> Option<String> {
        match self {
            Derived::Cache(metrics) if !metrics.consistent => Some(format!(
                "{}: reads plus writes disagree with hits plus misses",
                component
            )),
            Derived::Dram { metrics, .. } if !metrics.consistent => Some(format!(
                "{}: transferred bytes disagree with requests times line size; is the line size right?",
                component
            )),
            _ => None,
        }
    }

    pub fn to_report(&self, component: &str) -> ComponentReport {
        ComponentReport {
            name: component.to_string(),
            metrics: self.entries(),
        }
    }
}

/// Derives the metrics of `spec` from `source`.
///
/// Failed sanity checks are logged as warnings; they do not fail the call.
pub fn derive_component<S: StatsSource + ?Sized>(
    source: &S,
    spec: &ComponentSpec,
    config: &RunConfig,
) -> Result<Derived, Error> {
    let deltas = ComponentDeltas::new(source, &spec.name, config.extractor);

    let derived = match spec.kind {
        ComponentKind::Core => Derived::Core(CoreMetrics::derive(
            &CoreCounters::gather(&deltas)?,
            config.system_frequency_hz,
        )),
        ComponentKind::Cache { first_level } => Derived::Cache(CacheMetrics::derive(
            &CacheCounters::gather(&deltas, first_level)?,
        )),
        ComponentKind::MemoryController => Derived::MemoryController(MemCtrlMetrics::derive(
            &MemCtrlCounters::gather(&deltas)?,
            config.page_size_bytes,
        )),
        ComponentKind::Dram => {
            let counters = DramCounters::gather(&deltas)?;
            Derived::Dram {
                metrics: DramMetrics::derive(&counters, config.line_size_bytes),
                transferred_bytes: counters.transferred_bytes(),
            }
        }
    };

    if let Some(message) = derived.sanity_warning(&spec.name) {
        warn!("{}", message);
    }

    Ok(derived)
}
