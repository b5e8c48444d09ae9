use std::fmt::Write;

use crate::config::RunConfig;
use crate::format::{Formatter, Rendered};

/// How a metric's value is scaled when pretty printing is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricClass {
    /// Plain quantity, scaled by powers of 1000
    Count,
    /// Size in bytes, scaled by powers of 1024
    Bytes,
    /// Ratio shown as a percentage
    Percent,
    /// Never scaled
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub value: f64,
    pub class: MetricClass,
}

impl Metric {
    pub fn count(value: f64) -> Self {
        Self {
            value,
            class: MetricClass::Count,
        }
    }

    pub fn bytes(value: f64) -> Self {
        Self {
            value,
            class: MetricClass::Bytes,
        }
    }

    pub fn percent(value: f64) -> Self {
        Self {
            value,
            class: MetricClass::Percent,
        }
    }

    pub fn raw(value: f64) -> Self {
        Self {
            value,
            class: MetricClass::Raw,
        }
    }

    pub fn render(&self, formatter: &Formatter, precision: usize) -> Rendered {
        match self.class {
            MetricClass::Count => formatter.count(self.value, Some(precision)),
            MetricClass::Bytes => formatter.bytes(self.value, Some(precision)),
            MetricClass::Percent => formatter.percent(self.value, Some(precision)),
            MetricClass::Raw => Rendered::Raw(self.value),
        }
    }
}

/// Whole-run figures, never filtered by warm-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub instructions: f64,
    pub checkpoints: usize,
    pub warmup_fraction: f64,
}

/// Derived metrics of one component, in report order
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentReport {
    pub name: String,
    pub metrics: Vec<(&'static str, Metric)>,
}

/// Everything reported for one measurement file
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub file: String,
    pub summary: RunSummary,
    pub components: Vec<ComponentReport>,
    /// Metrics that need more than one component, fully named
    pub misc: Vec<(String, Metric)>,
    /// Failed sanity checks; these never abort the report
    pub warnings: Vec<String>,
}

impl Report {
    pub fn new(file: impl Into<String>, summary: RunSummary) -> Self {
        Self {
            file: file.into(),
            summary,
            components: Vec::new(),
            misc: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Renders the line-oriented text report
    pub fn render(&self, config: &RunConfig) -> String {
        let formatter = Formatter::new(config.pretty);
        let precision = config.precision;
        let mut out = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(out, "\nFile: {}", self.file);

        let _ = writeln!(out, "\nsimulation stats:");
        let _ = writeln!(
            out,
            "--instructions: {}",
            formatter.count(self.summary.instructions, Some(precision.instructions))
        );
        let _ = writeln!(
            out,
            "--stats_dumps: {}",
            formatter.count(self.summary.checkpoints as f64, Some(precision.checkpoints))
        );
        let _ = writeln!(
            out,
            "--warmup_percent: {}",
            formatter.percent(self.summary.warmup_fraction, Some(precision.warmup))
        );

        for component in &self.components {
            let _ = writeln!(out, "\n{}_stats:", component.name);
            for (metric_name, metric) in &component.metrics {
                let _ = writeln!(
                    out,
                    "--{}_{}: {}",
                    component.name,
                    metric_name,
                    metric.render(&formatter, precision.metric)
                );
            }
        }

        let _ = writeln!(out, "\nmisc stats:");
        for (metric_name, metric) in &self.misc {
            let _ = writeln!(
                out,
                "--{}: {}",
                metric_name,
                metric.render(&formatter, precision.metric)
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}\n", "_".repeat(27));
        out
    }
}
