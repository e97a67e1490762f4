use thiserror::Error;

/// Errors raised while building or evaluating a fuzzy model.
///
/// `InvalidInput` and `OutOfUniverse` are recovered locally (default value,
/// nearest-edge evaluation) and only reported alongside a result.
/// `UndefinedDefuzzification` means no score could be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FuzzyError {
    #[error("invalid value for '{field}': {raw:?} is not a number, default used")]
    InvalidInput { field: String, raw: String },

    #[error("'{variable}' value {value} is outside its universe, evaluated at {clamped}")]
    OutOfUniverse {
        variable: String,
        value: f64,
        clamped: f64,
    },

    #[error("no rule fired: aggregated output is zero everywhere, centroid is undefined")]
    UndefinedDefuzzification,

    #[error("expected {expected} input values, got {got}")]
    InputArity { expected: usize, got: usize },

    #[error("invalid fuzzy model: {}", .0.join("; "))]
    InvalidModel(Vec<String>),
}

pub type FuzzyResult<T> = Result<T, FuzzyError>;
