use checkpoint::{plus, ratio, same_activity, ComponentDeltas, Counter, Error, StatsSource};

use crate::report::Metric;

/// Windowed cache counters.
///
/// For first-level caches `h_gets` and `h_getx` already include the
/// filter-cache hits.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheCounters {
    pub h_gets: Vec<Counter>,
    pub h_getx: Vec<Counter>,
    pub m_gets: Vec<Counter>,
    /// Write misses from Invalid to Modified
    pub m_getx_im: Vec<Counter>,
    /// Upgrade misses from Shared to Modified
    pub m_getx_sm: Vec<Counter>,
    /// Invalidations from the upper level
    pub inv: Vec<Counter>,
    /// Downgrades from the upper level
    pub invx: Vec<Counter>,
}

impl CacheCounters {
    pub fn gather<S: StatsSource + ?Sized>(
        deltas: &ComponentDeltas<'_, S>,
        first_level: bool,
    ) -> Result<Self, Error> {
        let mut h_gets = deltas.windowed("hGETS")?;
        // Counters are combined entity by entity, so all must match hGETS
        let entities = h_gets.len();
        let windowed = |counter: &str| deltas.windowed_exact(counter, entities);

        let mut h_getx = windowed("hGETX")?;
        if first_level {
            h_gets = plus(&h_gets, &windowed("fhGETS")?);
            h_getx = plus(&h_getx, &windowed("fhGETX")?);
        }

        Ok(Self {
            h_gets,
            h_getx,
            m_gets: windowed("mGETS")?,
            m_getx_im: windowed("mGETXIM")?,
            m_getx_sm: windowed("mGETXSM")?,
            inv: windowed("INV")?,
            invx: windowed("INVX")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheMetrics {
    pub total_hit_ratio: f64,
    pub total_miss_ratio: f64,
    pub read_hit_ratio: f64,
    pub read_miss_ratio: f64,
    pub write_hit_ratio: f64,
    pub write_miss_ratio: f64,
    /// Upgrade misses over all accesses, not over misses
    pub coherence_miss_ratio: f64,
    pub invalidation_ratio: f64,
    pub downgrade_ratio: f64,
    /// Reads plus writes agree with hits plus misses
    pub consistent: bool,
}

impl CacheMetrics {
    pub fn derive(c: &CacheCounters) -> Self {
        let hits = plus(&c.h_gets, &c.h_getx);
        let write_misses = plus(&c.m_getx_im, &c.m_getx_sm);
        let misses = plus(&c.m_gets, &write_misses);
        let accesses = plus(&hits, &misses);
        let reads = plus(&c.h_gets, &c.m_gets);
        let writes = plus(&c.h_getx, &write_misses);

        Self {
            total_hit_ratio: ratio(&hits, &accesses),
            total_miss_ratio: ratio(&misses, &accesses),
            read_hit_ratio: ratio(&c.h_gets, &reads),
            read_miss_ratio: ratio(&c.m_gets, &reads),
            write_hit_ratio: ratio(&c.h_getx, &writes),
            write_miss_ratio: ratio(&write_misses, &writes),
            coherence_miss_ratio: ratio(&c.m_getx_sm, &accesses),
            invalidation_ratio: ratio(&c.inv, &accesses),
            downgrade_ratio: ratio(&c.invx, &accesses),
            consistent: same_activity(&plus(&reads, &writes), &accesses),
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, Metric)> {
        vec![
            ("total_hit_ratio", Metric::percent(self.total_hit_ratio)),
            ("total_miss_ratio", Metric::percent(self.total_miss_ratio)),
            ("read_hit_ratio", Metric::percent(self.read_hit_ratio)),
            ("read_miss_ratio", Metric::percent(self.read_miss_ratio)),
            ("write_hit_ratio", Metric::percent(self.write_hit_ratio)),
            ("write_miss_ratio", Metric::percent(self.write_miss_ratio)),
            ("coherence_miss_ratio", Metric::percent(self.coherence_miss_ratio)),
            ("invalidation_ratio", Metric::percent(self.invalidation_ratio)),
            ("downgrade_ratio", Metric::percent(self.downgrade_ratio)),
        ]
    }
}
