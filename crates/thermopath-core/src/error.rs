//! Error types for partition function computation and series preprocessing.

/// Errors from the partition function engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThermalError {
    /// Returned when the two input series do not have the same number of observations.
    #[error("only series of equal length are supported, got {len_a} and {len_b}")]
    LengthMismatch {
        /// Length of the first series.
        len_a: usize,
        /// Length of the second series.
        len_b: usize,
    },
}

/// Errors from series preprocessing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreprocessError {
    /// Returned when an empty slice is provided.
    #[error("cannot normalize an empty series")]
    EmptySeries,

    /// Returned when all values are identical, so the variance is zero.
    #[error("cannot normalize constant series of length {n} (all values = {value})")]
    ConstantSeries {
        /// Length of the series.
        n: usize,
        /// The repeated value.
        value: f64,
    },
}
