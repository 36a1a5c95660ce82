//! Average lag path derived from a partition function.

use std::ops::Index;

use tracing::{debug, instrument, warn};

use crate::lattice::{Boundary, Lattice};
use crate::table::PartitionTable;

/// Expected lag at each rotated time step.
///
/// Holds `2n-1` values for a table of side `n`. Entry `t` is the
/// weight-average of `x = t_b - t_a` over all cells with `t_a + t_b = t`.
/// A positive value means the second series lags the first.
#[derive(Debug, Clone, PartialEq)]
pub struct AveragePath(Vec<f64>);

impl AveragePath {
    /// Return the values indexed by rotated time.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Return the number of rotated time steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lag estimate at each original time step.
    ///
    /// Keeps the even rotated times `0, 2, ..., 2n-2`, which are the ones that
    /// fall on the diagonal of the original grid. Returns `n` values.
    #[must_use]
    pub fn lags(&self) -> Vec<f64> {
        self.0.iter().step_by(2).copied().collect()
    }

    /// Count the non-finite values strictly between the first and last rotated time.
    ///
    /// Only the two extreme rotated times may legitimately carry no weight; a
    /// non-zero count means the table underflowed or overflowed.
    #[must_use]
    pub fn interior_undefined(&self) -> usize {
        match self.0.len() {
            0..=2 => 0,
            len => self.0[1..len - 1].iter().filter(|v| !v.is_finite()).count(),
        }
    }

    /// Consume and return the inner vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Index<usize> for AveragePath {
    type Output = f64;

    fn index(&self, t: usize) -> &Self::Output {
        &self.0[t]
    }
}

impl AsRef<[f64]> for AveragePath {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Reduce a partition function to its average lag path.
///
/// Sweeps every cell, boundary included, accumulating the total weight and the
/// lag-weighted sum per rotated time, then divides. A rotated time whose total
/// weight is zero yields a non-finite value, kept in place rather than dropped.
/// For a well-formed table this only happens at the two extreme rotated times;
/// anywhere else it is logged as a warning. Tables from the raw fill overflow
/// for long series, so prefer [`ThermalPath::partition_function_scaled`].
///
/// [`ThermalPath::partition_function_scaled`]: crate::ThermalPath::partition_function_scaled
#[must_use]
#[instrument(skip(g), fields(n = g.len()))]
pub fn average_path(g: &PartitionTable) -> AveragePath {
    let n = g.len();
    let steps = (2 * n).saturating_sub(1);
    let mut total = vec![0.0; steps];
    let mut weighted = vec![0.0; steps];

    for point in Lattice::new(n, Boundary::Included) {
        let weight = g[(point.t_a, point.t_b)];
        total[point.t] += weight;
        weighted[point.t] += point.x as f64 * weight;
    }

    let avg: Vec<f64> = weighted
        .iter()
        .zip(&total)
        .map(|(&w, &z)| w / z)
        .collect();

    let avg = AveragePath(avg);
    let interior = avg.interior_undefined();
    if interior > 0 {
        warn!(interior, "average path undefined at interior rotated times");
    } else if avg.values().iter().any(|v| !v.is_finite()) {
        debug!("average path undefined at an extreme rotated time");
    }
    avg
}
