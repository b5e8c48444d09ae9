use checkpoint::{plus, ratio, same_activity, scaled, total, ComponentDeltas, Counter, Error, StatsSource};

use crate::report::Metric;

/// Windowed DRAM counters. Latencies are summed over all requests.
#[derive(Debug, Clone, PartialEq)]
pub struct DramCounters {
    pub read_reqs: Vec<Counter>,
    pub write_reqs: Vec<Counter>,
    pub read_bytes: Vec<Counter>,
    pub write_bytes: Vec<Counter>,
    pub read_latency: Vec<Counter>,
    pub write_latency: Vec<Counter>,
    pub read_row_hits: Vec<Counter>,
    pub write_row_hits: Vec<Counter>,
}

impl DramCounters {
    pub fn gather<S: StatsSource + ?Sized>(deltas: &ComponentDeltas<'_, S>) -> Result<Self, Error> {
        let read_reqs = deltas.windowed("rd")?;
        let entities = read_reqs.len();
        let windowed = |counter: &str| deltas.windowed_exact(counter, entities);

        Ok(Self {
            read_reqs,
            write_reqs: windowed("wr")?,
            read_bytes: windowed("tot_rd")?,
            write_bytes: windowed("tot_wr")?,
            read_latency: windowed("rdlat")?,
            write_latency: windowed("wrlat")?,
            read_row_hits: windowed("rdhits")?,
            write_row_hits: windowed("wrhits")?,
        })
    }

    /// Bytes moved in either direction, per entity
    pub fn transferred_bytes(&self) -> Vec<Counter> {
        plus(&self.read_bytes, &self.write_bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DramMetrics {
    pub read_ratio: f64,
    pub write_ratio: f64,
    pub traffic_bytes: f64,
    pub avg_req_latency: f64,
    pub avg_read_latency: f64,
    pub avg_write_latency: f64,
    pub row_buffer_hit_ratio: f64,
    pub row_buffer_read_hit_ratio: f64,
    pub row_buffer_write_hit_ratio: f64,
    /// Transferred bytes agree with request count times line size
    pub consistent: bool,
}

impl DramMetrics {
    pub fn derive(c: &DramCounters, line_size_bytes: i64) -> Self {
        let reqs = plus(&c.read_reqs, &c.write_reqs);
        let bytes = c.transferred_bytes();
        let latency = plus(&c.read_latency, &c.write_latency);
        let row_hits = plus(&c.read_row_hits, &c.write_row_hits);

        Self {
            read_ratio: ratio(&c.read_reqs, &reqs),
            write_ratio: ratio(&c.write_reqs, &reqs),
            traffic_bytes: total(&bytes) as f64,
            avg_req_latency: ratio(&latency, &reqs),
            avg_read_latency: ratio(&c.read_latency, &c.read_reqs),
            avg_write_latency: ratio(&c.write_latency, &c.write_reqs),
            row_buffer_hit_ratio: ratio(&row_hits, &reqs),
            row_buffer_read_hit_ratio: ratio(&c.read_row_hits, &c.read_reqs),
            row_buffer_write_hit_ratio: ratio(&c.write_row_hits, &c.write_reqs),
            consistent: same_activity(&bytes, &scaled(&reqs, line_size_bytes)),
        }
    }

    pub fn entries(&self) -> Vec<(&'static str, Metric)> {
        vec![
            ("Read_Ratio", Metric::percent(self.read_ratio)),
            ("Write_Ratio", Metric::percent(self.write_ratio)),
            ("Total_Traffic_Bytes", Metric::count(self.traffic_bytes)),
            ("Average_Req_Latency", Metric::count(self.avg_req_latency)),
            ("Average_Read_Latency", Metric::count(self.avg_read_latency)),
            ("Average_Write_Latency", Metric::count(self.avg_write_latency)),
            ("Row_Buffer_Hit_Ratio", Metric::percent(self.row_buffer_hit_ratio)),
            ("Row_Buffer_Read_Hit_Ratio", Metric::percent(self.row_buffer_read_hit_ratio)),
            ("Row_Buffer_Write_Hit_Ratio", Metric::percent(self.row_buffer_write_hit_ratio)),
        ]
    }
}
