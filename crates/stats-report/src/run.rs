use anyhow::{anyhow, Context, Result};
use checkpoint::{ratio, total, ComponentDeltas, Counter, StatsSource};
use log::debug;

use crate::config::RunConfig;
use crate::derive::{derive_component, Derived};
use crate::report::{Metric, Report, RunSummary};

/// State carried between components for metrics that need several of them
#[derive(Debug, Default)]
struct CrossComponent {
    exec_time_seconds: Option<f64>,
    dram: Option<(String, Vec<Counter>)>,
}

impl CrossComponent {
    fn observe(&mut self, component: &str, derived: &Derived) {
        match derived {
            // The first core also supplies the run summary
            Derived::Core(metrics) => {
                self.exec_time_seconds.get_or_insert(metrics.exec_time_seconds);
            }
            Derived::Dram {
                transferred_bytes, ..
            } => self.dram = Some((component.to_string(), transferred_bytes.clone())),
            Derived::Cache(_) | Derived::MemoryController(_) => {}
        }
    }

    fn metrics(&self) -> Vec<(String, Metric)> {
        let mut misc = Vec::new();

        // Bytes moved during the application's execution time
        if let (Some(exec_time), Some((dram, bytes))) = (self.exec_time_seconds, &self.dram) {
            misc.push((
                format!("{}_bandwidth_utilization_ratio", dram),
                Metric::raw(ratio(bytes, exec_time)),
            ));
        }

        misc
    }
}

/// Builds the full report of one measurement.
///
/// Nothing is printed here; a failure leaves no partial output behind.
pub fn analyze<S: StatsSource + ?Sized>(
    source: &S,
    file: impl Into<String>,
    config: &RunConfig,
) -> Result<Report> {
    let file = file.into();
    let core = config
        .core()
        .ok_or_else(|| anyhow!("No core component configured"))?;

    // The whole simulation, warm-up included
    let core_deltas = ComponentDeltas::new(source, &core.name, config.extractor);
    let checkpoints = core_deltas.checkpoints()?;
    let instructions = core_deltas.since("instrs", 0)?;
    debug!(
        "{}: {} checkpoints, measurement window starts at checkpoint {}",
        file,
        checkpoints,
        config.extractor.start_index(checkpoints)
    );

    let mut report = Report::new(
        file,
        RunSummary {
            instructions: total(&instructions) as f64,
            checkpoints,
            warmup_fraction: config.warmup_fraction(),
        },
    );

    let mut cross = CrossComponent::default();
    for spec in &config.components {
        let derived = derive_component(source, spec, config)
            .with_context(|| format!("Failed to derive {} stats", spec.name))?;

        if let Some(warning) = derived.sanity_warning(&spec.name) {
            report.warnings.push(warning);
        }
        cross.observe(&spec.name, &derived);
        report.components.push(derived.to_report(&spec.name));
    }

    report.misc = cross.metrics();
    Ok(report)
}
