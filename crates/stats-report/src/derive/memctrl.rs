use checkpoint::{ratio, total, ComponentDeltas, Counter, Error, StatsSource};

use crate::report::Metric;

#[derive(Debug, Clone, PartialEq)]
pub struct MemCtrlCounters {
    /// Pages touched since the start of the run, warm-up included
    pub total_pages: Vec<Counter>,
    pub llc_compulsory_misses: Vec<Counter>,
    pub llc_total_misses: Vec<Counter>,
}

impl MemCtrlCounters {
    pub fn gather<S: StatsSource + ?Sized>(deltas: &ComponentDeltas<'_, S>) -> Result<Self, Error> {
        Ok(Self {
            total_pages: deltas.since("totalPages", 0)?,
            llc_compulsory_misses: deltas.windowed("llcCompulsoryMisses")?,
            llc_total_misses: deltas.windowed("llcTotalMisses")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemCtrlMetrics {
    pub footprint_bytes: f64,
    pub unique_access_ratio: f64,
}

impl MemCtrlMetrics {
    pub fn derive(counters: &MemCtrlCounters, page_size_bytes: i64) -> Self {
        Self {
            footprint_bytes: total(&counters.total_pages) as f64 * page_size_bytes as f64,
            unique_access_ratio: ratio(&counters.llc_compulsory_misses, &counters.llc_total_misses),
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, Metric)> {
        vec![
            ("Footprint", Metric::bytes(self.footprint_bytes)),
            ("Unique_Access_Ratio", Metric::percent(self.unique_access_ratio)),
        ]
    }
}
