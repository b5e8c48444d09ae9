use crate::error::Error;
use crate::series::{Counter, Series, StatsSource};

/// Computes windowed deltas, skipping a warm-up prefix of the checkpoints.
///
/// The warm-up is a fraction of the number of checkpoints, not of simulated
/// time: with 10 checkpoints and a fraction of 0.5 the window starts at
/// checkpoint 4 and ends at the last one.
///
/// # Examples
///
/// ```
/// use checkpoint::{DeltaExtractor, Series};
///
/// let series = Series::new("c/instrs", vec![vec![10], vec![15], vec![25], vec![40]]).unwrap();
/// let extractor = DeltaExtractor::new(0.0).unwrap();
///
/// assert_eq!(extractor.delta(&series, Some(0)).unwrap(), vec![30]);
/// assert_eq!(extractor.delta(&series, Some(2)).unwrap(), vec![15]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaExtractor {
    warmup_fraction: f64,
}

impl Default for DeltaExtractor {
    fn default() -> Self {
        Self {
            warmup_fraction: 0.0,
        }
    }
}

impl DeltaExtractor {
    /// Creates an extractor that discards `warmup_fraction` of the checkpoints.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWarmup` unless `0 <= warmup_fraction < 1`.
    pub fn new(warmup_fraction: f64) -> Result<Self, Error> {
        if !(0.0..1.0).contains(&warmup_fraction) {
            return Err(Error::InvalidWarmup(warmup_fraction));
        }
        Ok(Self { warmup_fraction })
    }

    pub fn warmup_fraction(&self) -> f64 {
        self.warmup_fraction
    }

    /// First checkpoint of the measurement window for a series of `len` checkpoints
    pub fn start_index(&self, len: usize) -> usize {
        ((len as f64 * self.warmup_fraction).floor() as usize).saturating_sub(1)
    }

    /// Returns `last - series[start]` for every entity.
    ///
    /// When `start` is `None` the warm-up start index is used. `Some(0)` always
    /// covers the whole run regardless of the warm-up fraction.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientCheckpoints` if `start` is not strictly before the
    /// last checkpoint.
    pub fn delta(&self, series: &Series, start: Option<usize>) -> Result<Vec<Counter>, Error> {
        let len = series.len();
        let start = start.unwrap_or_else(|| self.start_index(len));

        let base = match series.checkpoint(start) {
            Some(base) if start + 1 < len => base,
            _ => {
                return Err(Error::InsufficientCheckpoints {
                    name: series.name().to_string(),
                    start,
                    len,
                })
            }
        };

        Ok(series
            .last()
            .iter()
            .zip(base)
            .map(|(end, begin)| end - begin)
            .collect())
    }
}

/// Delta extraction bound to one component of a [`StatsSource`]
pub struct ComponentDeltas<'a, S: StatsSource + ?Sized> {
    source: &'a S,
    component: &'a str,
    extractor: DeltaExtractor,
}

impl<'a, S: StatsSource + ?Sized> ComponentDeltas<'a, S> {
    pub fn new(source: &'a S, component: &'a str, extractor: DeltaExtractor) -> Self {
        Self {
            source,
            component,
            extractor,
        }
    }

    pub fn component(&self) -> &str {
        self.component
    }

    pub fn checkpoints(&self) -> Result<usize, Error> {
        self.source.checkpoint_count(self.component)
    }

    /// Delta over the measurement window, after warm-up
    pub fn windowed(&self, counter: &str) -> Result<Vec<Counter>, Error> {
        let series = self.source.series(self.component, counter)?;
        self.extractor.delta(series, None)
    }

    /// Like [`windowed`](Self::windowed), but the counter must also have
    /// exactly `entities` sub-entities.
    ///
    /// # Errors
    ///
    /// Returns `WidthMismatch` if the series has any other width.
    pub fn windowed_exact(&self, counter: &str, entities: usize) -> Result<Vec<Counter>, Error> {
        let series = self.source.series(self.component, counter)?;
        if series.entities() != entities {
            return Err(Error::WidthMismatch {
                component: self.component.to_string(),
                counter: counter.to_string(),
                expected: entities,
                found: series.entities(),
            });
        }
        self.extractor.delta(series, None)
    }

    /// Delta from an explicit checkpoint, ignoring the warm-up fraction
    pub fn since(&self, counter: &str, start: usize) -> Result<Vec<Counter>, Error> {
        let series = self.source.series(self.component, counter)?;
        self.extractor.delta(series, Some(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::InMemoryStats;
    use rstest::rstest;

    fn single(values: &[Counter]) -> Series {
        Series::new("c/instrs", values.iter().map(|v| vec![*v]).collect()).unwrap()
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.0)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn test_invalid_warmup(#[case] fraction: f64) {
        assert!(matches!(
            DeltaExtractor::new(fraction),
            Err(Error::InvalidWarmup(_))
        ));
    }

    #[rstest]
    #[case(0.0, 4, 0)]
    #[case(0.25, 4, 0)]
    #[case(0.5, 4, 1)]
    #[case(0.5, 10, 4)]
    #[case(0.999, 10, 8)]
    #[case(0.1, 1, 0)]
    fn test_start_index(#[case] fraction: f64, #[case] len: usize, #[case] expected: usize) {
        let extractor = DeltaExtractor::new(fraction).unwrap();
        assert_eq!(extractor.start_index(len), expected);
    }

    #[rstest]
    #[case(Some(0), 30)]
    #[case(Some(1), 25)]
    #[case(Some(2), 15)]
    fn test_explicit_start(#[case] start: Option<usize>, #[case] expected: Counter) {
        let extractor = DeltaExtractor::new(0.9).unwrap();
        let series = single(&[10, 15, 25, 40]);
        assert_eq!(extractor.delta(&series, start).unwrap(), vec![expected]);
    }

    #[test]
    fn test_warmup_start_used_by_default() {
        // floor(4 * 0.75) - 1 = 2
        let extractor = DeltaExtractor::new(0.75).unwrap();
        let series = single(&[10, 15, 25, 40]);
        assert_eq!(extractor.delta(&series, None).unwrap(), vec![15]);
    }

    #[test]
    fn test_delta_is_per_entity() {
        let extractor = DeltaExtractor::default();
        let series = Series::new("c/cycles", vec![vec![5, 7], vec![100, 300]]).unwrap();
        assert_eq!(extractor.delta(&series, None).unwrap(), vec![95, 293]);
    }

    #[test]
    fn test_no_window_left() {
        let extractor = DeltaExtractor::default();
        let series = single(&[10, 15, 25, 40]);

        let result = extractor.delta(&series, Some(3));
        assert_eq!(
            result,
            Err(Error::InsufficientCheckpoints {
                name: "c/instrs".to_string(),
                start: 3,
                len: 4,
            })
        );

        // A single checkpoint never forms a window
        assert!(extractor.delta(&single(&[10]), None).is_err());
        assert!(extractor.delta(&series, Some(10)).is_err());
    }

    #[test]
    fn test_component_deltas() {
        let stats = InMemoryStats::new()
            .with("c", "instrs", vec![vec![10], vec![15], vec![25], vec![40]])
            .unwrap();
        let extractor = DeltaExtractor::new(0.75).unwrap();
        let deltas = ComponentDeltas::new(&stats, "c", extractor);

        assert_eq!(deltas.component(), "c");
        assert_eq!(deltas.checkpoints().unwrap(), 4);
        assert_eq!(deltas.windowed("instrs").unwrap(), vec![15]);
        assert_eq!(deltas.since("instrs", 0).unwrap(), vec![30]);
        assert!(matches!(
            deltas.windowed("cycles"),
            Err(Error::MissingCounter { .. })
        ));
    }

    #[test]
    fn test_windowed_exact_width() {
        let stats = InMemoryStats::new()
            .with("l1d", "hGETS", vec![vec![0, 0], vec![10, 20]])
            .unwrap()
            .with("l1d", "fhGETS", vec![vec![0], vec![5]])
            .unwrap();
        let deltas = ComponentDeltas::new(&stats, "l1d", DeltaExtractor::default());

        assert_eq!(deltas.windowed_exact("hGETS", 2).unwrap(), vec![10, 20]);
        assert_eq!(
            deltas.windowed_exact("fhGETS", 2),
            Err(Error::WidthMismatch {
                component: "l1d".to_string(),
                counter: "fhGETS".to_string(),
                expected: 2,
                found: 1,
            })
        );
    }
}
