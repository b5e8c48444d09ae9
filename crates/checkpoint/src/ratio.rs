use crate::series::Counter;

/// Returned by [`ratio`] when the denominator aggregates to zero.
///
/// Valid ratios are never negative, so the sentinel cannot collide with one.
pub const UNDEFINED_RATIO: f64 = -1.0;

/// A quantity that can be collapsed to a single total across entities
pub trait Aggregate {
    fn aggregate(&self) -> f64;
}

impl Aggregate for [Counter] {
    fn aggregate(&self) -> f64 {
        self.iter().sum::<Counter>() as f64
    }
}

impl Aggregate for Vec<Counter> {
    fn aggregate(&self) -> f64 {
        self.as_slice().aggregate()
    }
}

impl Aggregate for Counter {
    fn aggregate(&self) -> f64 {
        *self as f64
    }
}

impl Aggregate for f64 {
    fn aggregate(&self) -> f64 {
        *self
    }
}

impl<T: Aggregate + ?Sized> Aggregate for &T {
    fn aggregate(&self) -> f64 {
        (**self).aggregate()
    }
}

/// Sums numerator and denominator across all entities, then divides.
///
/// Returns [`UNDEFINED_RATIO`] when the summed denominator is exactly zero.
///
/// # Examples
///
/// ```
/// use checkpoint::{ratio, UNDEFINED_RATIO};
///
/// assert_eq!(ratio(&[2000i64, 1500][..], &[1000i64, 1000][..]), 1.75);
/// assert_eq!(ratio(&[5i64][..], &[0i64][..]), UNDEFINED_RATIO);
/// ```
pub fn ratio<N, D>(numerator: N, denominator: D) -> f64
where
    N: Aggregate,
    D: Aggregate,
{
    let denominator = denominator.aggregate();
    if denominator == 0.0 {
        return UNDEFINED_RATIO;
    }
    numerator.aggregate() / denominator
}
