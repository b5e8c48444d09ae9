use thiserror::Error;

/// Errors that can occur while extracting counters from a stats source
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// The warm-up fraction must lie in [0, 1)
    #[error("warm-up fraction {0} is outside [0, 1)")]
    InvalidWarmup(f64),

    /// A series was built without any checkpoint
    #[error("series {0} has no checkpoints")]
    EmptySeries(String),

    /// A checkpoint's width differs from the first checkpoint of the same series
    #[error("series {name}: checkpoint {index} has {found} entities, expected {expected}")]
    EntityMismatch {
        name: String,
        index: usize,
        expected: usize,
        found: usize,
    },

    /// Two counters of one component disagree on the number of entities
    #[error("counter {counter} of component {component} has {found} entities, expected {expected}")]
    WidthMismatch {
        component: String,
        counter: String,
        expected: usize,
        found: usize,
    },

    /// The source holds no component with this name
    #[error("component {0} not found")]
    MissingComponent(String),

    /// The component exists but does not record this counter
    #[error("counter {counter} not found in component {component}")]
    MissingCounter { component: String, counter: String },

    /// Not enough checkpoints remain after the start index to form a window
    #[error("series {name}: start checkpoint {start} leaves no window in {len} checkpoints")]
    InsufficientCheckpoints {
        name: String,
        start: usize,
        len: usize,
    },
}
