use std::collections::BTreeMap;

use crate::error::Error;

/// Raw value of a cumulative counter for one entity at one checkpoint
pub type Counter = i64;

/// Cumulative samples of one counter, one row per checkpoint.
///
/// Every row holds one value per sub-entity (one per core for per-core
/// components, a single slot for shared ones). All rows have the same width.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    entities: usize,
    samples: Vec<Vec<Counter>>,
}

impl Series {
    /// Creates a series from its checkpoint rows.
    ///
    /// # Errors
    ///
    /// * `EmptySeries` if `samples` is empty
    /// * `EntityMismatch` if a row's width differs from the first row's
    ///
    /// # Examples
    ///
    /// ```
    /// use checkpoint::Series;
    ///
    /// let series = Series::new("c/cycles", vec![vec![0, 0], vec![10, 12]]).unwrap();
    /// assert_eq!(series.len(), 2);
    /// assert_eq!(series.entities(), 2);
    /// ```
    pub fn new(name: impl Into<String>, samples: Vec<Vec<Counter>>) -> Result<Self, Error> {
        let name = name.into();
        let entities = match samples.first() {
            Some(first) => first.len(),
            None => return Err(Error::EmptySeries(name)),
        };

        if let Some((index, row)) = samples
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != entities)
        {
            return Err(Error::EntityMismatch {
                name,
                index,
                expected: entities,
                found: row.len(),
            });
        }

        Ok(Self {
            name,
            entities,
            samples,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of checkpoints
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of sub-entities in every checkpoint
    pub fn entities(&self) -> usize {
        self.entities
    }

    pub fn checkpoint(&self, index: usize) -> Option<&[Counter]> {
        self.samples.get(index).map(Vec::as_slice)
    }

    /// The final checkpoint, i.e. the end of the simulation
    pub fn last(&self) -> &[Counter] {
        // Construction guarantees at least one row
        self.samples.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Element-wise sum of two entity vectors.
///
/// Both vectors must have the same width; use
/// [`ComponentDeltas::windowed_exact`](crate::ComponentDeltas::windowed_exact)
/// to guarantee it for counters read from a source.
pub fn plus(a: &[Counter], b: &[Counter]) -> Vec<Counter> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// Element-wise multiplication by a constant, saturating at the counter range
pub fn scaled(a: &[Counter], factor: Counter) -> Vec<Counter> {
    a.iter().map(|x| x.saturating_mul(factor)).collect()
}

/// Sum across all entities
pub fn total(a: &[Counter]) -> Counter {
    a.iter().sum()
}

pub fn any_nonzero(a: &[Counter]) -> bool {
    a.iter().any(|&x| x != 0)
}

/// Loose consistency check between two vectors that should describe the same
/// activity: both must agree on whether anything happened at all.
///
/// This deliberately does not compare values element by element.
pub fn same_activity(a: &[Counter], b: &[Counter]) -> bool {
    any_nonzero(a) == any_nonzero(b)
}

/// Access to named counter series grouped by component.
///
/// Implementations own the series for as long as the measurement is open;
/// callers only borrow them.
pub trait StatsSource {
    /// Returns the series recorded for `counter` in `component`
    fn series(&self, component: &str, counter: &str) -> Result<&Series, Error>;

    /// Number of checkpoints recorded for `component`
    fn checkpoint_count(&self, component: &str) -> Result<usize, Error>;
}

/// A [`StatsSource`] kept entirely in memory.
///
/// # Examples
///
/// ```
/// use checkpoint::{InMemoryStats, StatsSource};
///
/// let mut stats = InMemoryStats::new();
/// stats.insert("c", "instrs", vec![vec![0], vec![100]]).unwrap();
///
/// assert_eq!(stats.checkpoint_count("c").unwrap(), 2);
/// assert!(stats.series("c", "cycles").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryStats {
    components: BTreeMap<String, BTreeMap<String, Series>>,
}

impl InMemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the series for `component`/`counter`
    pub fn insert(
        &mut self,
        component: &str,
        counter: &str,
        samples: Vec<Vec<Counter>>,
    ) -> Result<(), Error> {
        let series = Series::new(format!("{}/{}", component, counter), samples)?;
        self.components
            .entry(component.to_string())
            .or_default()
            .insert(counter.to_string(), series);
        Ok(())
    }

    /// Builder form of [`InMemoryStats::insert`]
    pub fn with(
        mut self,
        component: &str,
        counter: &str,
        samples: Vec<Vec<Counter>>,
    ) -> Result<Self, Error> {
        self.insert(component, counter, samples)?;
        Ok(self)
    }

    /// Names of all components, in sorted order
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

}

impl StatsSource for InMemoryStats {
    fn series(&self, component: &str, counter: &str) -> Result<&Series, Error> {
        self.components
            .get(component)
            .ok_or_else(|| Error::MissingComponent(component.to_string()))?
            .get(counter)
            .ok_or_else(|| Error::MissingCounter {
                component: component.to_string(),
                counter: counter.to_string(),
            })
    }

    fn checkpoint_count(&self, component: &str) -> Result<usize, Error> {
        let counters = self
            .components
            .get(component)
            .ok_or_else(|| Error::MissingComponent(component.to_string()))?;

        // All counters of a component are dumped together
        Ok(counters.values().map(Series::len).max().unwrap_or(0))
    }
}
