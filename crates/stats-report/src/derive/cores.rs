use checkpoint::{ratio, ComponentDeltas, Counter, Error, StatsSource};

use crate::report::Metric;

/// Windowed core counters, one entry per core
#[derive(Debug, Clone, PartialEq)]
pub struct CoreCounters {
    pub cycles: Vec<Counter>,
    pub contention_cycles: Vec<Counter>,
    pub instrs: Vec<Counter>,
    pub uops: Vec<Counter>,
    pub bbls: Vec<Counter>,
    pub mispred_branches: Vec<Counter>,
}

impl CoreCounters {
    pub fn gather<S: StatsSource + ?Sized>(deltas: &ComponentDeltas<'_, S>) -> Result<Self, Error> {
        Ok(Self {
            cycles: deltas.windowed("cycles")?,
            contention_cycles: deltas.windowed("cCycles")?,
            instrs: deltas.windowed("instrs")?,
            uops: deltas.windowed("uops")?,
            bbls: deltas.windowed("bbls")?,
            mispred_branches: deltas.windowed("mispredBranches")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreMetrics {
    pub ipc: f64,
    pub uops_per_clock: f64,
    pub branch_ratio: f64,
    pub branch_misspred_ratio: f64,
    pub contention_cycles_ratio: f64,
    pub exec_time_seconds: f64,
}

impl CoreMetrics {
    pub fn derive(counters: &CoreCounters, system_frequency_hz: f64) -> Self {
        Self {
            ipc: ratio(&counters.instrs, &counters.cycles),
            uops_per_clock: ratio(&counters.uops, &counters.cycles),
            branch_ratio: ratio(&counters.bbls, &counters.instrs),
            branch_misspred_ratio: ratio(&counters.mispred_branches, &counters.bbls),
            contention_cycles_ratio: ratio(&counters.contention_cycles, &counters.cycles),
            exec_time_seconds: execution_time_seconds(&counters.cycles, system_frequency_hz),
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, Metric)> {
        vec![
            ("ipc", Metric::count(self.ipc)),
            ("uops_per_clock", Metric::count(self.uops_per_clock)),
            ("branch_ratio", Metric::percent(self.branch_ratio)),
            ("branch_misspred_ratio", Metric::percent(self.branch_misspred_ratio)),
            ("contention_cycles_ratio", Metric::percent(self.contention_cycles_ratio)),
            ("workload_execution_time", Metric::count(self.exec_time_seconds)),
        ]
    }
}

/// Wall-clock time of the run: cores execute in parallel, so the slowest core
/// bounds it.
pub fn execution_time_seconds(cycles: &[Counter], system_frequency_hz: f64) -> f64 {
    let slowest = cycles.iter().copied().max().unwrap_or(0);
    slowest as f64 / system_frequency_hz
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkpoint::{DeltaExtractor, InMemoryStats, UNDEFINED_RATIO};

    fn counters() -> CoreCounters {
        CoreCounters {
            cycles: vec![1000, 1000],
            contention_cycles: vec![100, 300],
            instrs: vec![2000, 1500],
            uops: vec![2500, 1500],
            bbls: vec![400, 300],
            mispred_branches: vec![7, 0],
        }
    }

    #[test]
    fn test_ipc_aggregates_cores() {
        let metrics = CoreMetrics::derive(&counters(), 2.8e9);

        assert_eq!(metrics.ipc, 1.75);
        assert_eq!(metrics.uops_per_clock, 2.0);
        assert_eq!(metrics.branch_ratio, 0.2);
        assert_eq!(metrics.branch_misspred_ratio, 0.01);
        assert_eq!(metrics.contention_cycles_ratio, 0.2);
    }

    #[test]
    fn test_execution_time_uses_slowest_core() {
        let mut counters = counters();
        counters.cycles = vec![1000, 4000, 2000];

        let metrics = CoreMetrics::derive(&counters, 1000.0);
        assert_eq!(metrics.exec_time_seconds, 4.0);
        assert_eq!(execution_time_seconds(&[1000, 1000], 2.8e9), 1000.0 / 2.8e9);
    }

    #[test]
    fn test_idle_core_ratios_are_undefined() {
        let idle = CoreCounters {
            cycles: vec![0],
            contention_cycles: vec![0],
            instrs: vec![0],
            uops: vec![0],
            bbls: vec![0],
            mispred_branches: vec![0],
        };
        let metrics = CoreMetrics::derive(&idle, 2.8e9);

        assert_eq!(metrics.ipc, UNDEFINED_RATIO);
        assert_eq!(metrics.branch_misspred_ratio, UNDEFINED_RATIO);
        assert_eq!(metrics.exec_time_seconds, 0.0);
    }

    #[test]
    fn test_gather_from_source() {
        let mut stats = InMemoryStats::new();
        for (counter, end) in [
            ("cycles", [1000, 1000]),
            ("cCycles", [0, 0]),
            ("instrs", [2000, 1500]),
            ("uops", [2000, 1500]),
            ("bbls", [200, 150]),
            ("mispredBranches", [2, 1]),
        ] {
            stats
                .insert("c", counter, vec![vec![0, 0], end.to_vec()])
                .unwrap();
        }

        let deltas = ComponentDeltas::new(&stats, "c", DeltaExtractor::default());
        let counters = CoreCounters::gather(&deltas).unwrap();

        assert_eq!(counters.instrs, vec![2000, 1500]);
        assert_eq!(counters.mispred_branches, vec![2, 1]);
        assert_eq!(CoreMetrics::derive(&counters, 2.8e9).ipc, 1.75);
    }

    #[test]
    fn test_entries_order() {
        let names: Vec<_> = CoreMetrics::derive(&counters(), 2.8e9)
            .entries()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec![
                "ipc",
                "uops_per_clock",
                "branch_ratio",
                "branch_misspred_ratio",
                "contention_cycles_ratio",
                "workload_execution_time",
            ]
        );
    }
}
