//! Partition function of the thermal optimal path.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::average::{AveragePath, average_path};
use crate::cost::{ErrorModel, LocalCost};
use crate::error::ThermalError;
use crate::lattice::{Boundary, Lattice, LatticePoint};
use crate::table::{PartitionTable, ScaledTable};

/// Layers shorter than this are not worth splitting across threads.
const PAR_MIN_CELLS: usize = 64;

/// Immutable thermal optimal path configuration: a temperature and a local cost.
///
/// The temperature scales the Boltzmann kernel `exp(-cost / temperature)`.
/// Higher temperatures spread weight over more paths, lower ones concentrate it
/// on the lowest-cost path. It is expected to be positive and is not checked.
///
/// # Example
///
/// ```
/// use thermopath_core::{ErrorModel, ThermalPath};
///
/// let engine = ThermalPath::new(1.0).with_cost(ErrorModel::default().with_sqrt(true));
/// let g = engine.partition_function(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(g.len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalPath<C = ErrorModel> {
    temperature: f64,
    cost: C,
}

impl ThermalPath {
    /// Create an engine using the default [`ErrorModel`].
    #[must_use]
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature,
            cost: ErrorModel::default(),
        }
    }
}

impl<C> ThermalPath<C> {
    /// Replace the local cost. Accepts an [`ErrorModel`] or any `Fn(f64, f64) -> f64`.
    #[must_use]
    pub fn with_cost<D: LocalCost>(self, cost: D) -> ThermalPath<D> {
        ThermalPath {
            temperature: self.temperature,
            cost,
        }
    }

    /// Return the temperature.
    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Return the local cost.
    #[must_use]
    pub fn cost(&self) -> &C {
        &self.cost
    }
}

impl<C: LocalCost> ThermalPath<C> {
    /// Compute the partition function of `series_a` against `series_b`.
    ///
    /// The first row and column are fixed to zero except for a unit weight at
    /// `(0, 0)`, `(0, 1)` and `(1, 0)`. Every other cell is
    /// `(g[i, j-1] + g[i-1, j] + g[i-1, j-1]) * exp(-cost(a[i], b[j]) / temperature)`,
    /// filled in rotated-time order. Runs in O(n²) time and space.
    ///
    /// The raw weights grow geometrically along the diagonal and overflow to
    /// infinity for series longer than a few hundred points. Use
    /// [`partition_function_scaled`][Self::partition_function_scaled] for
    /// long series.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ThermalError::LengthMismatch`] | `series_a.len() != series_b.len()` |
    #[instrument(skip(self, series_a, series_b), fields(n = series_a.len(), temperature = self.temperature))]
    pub fn partition_function(
        &self,
        series_a: &[f64],
        series_b: &[f64],
    ) -> Result<PartitionTable, ThermalError> {
        let mut g = seeded_table(series_a, series_b)?;
        let lattice = Lattice::new(series_a.len(), Boundary::Excluded);

        for point in &lattice {
            g[(point.t_a, point.t_b)] = self.cell_weight(&g, series_a, series_b, point, 1.0);
        }

        debug!(cells = lattice.len(), "partition function filled");
        Ok(g)
    }

    /// Compute the partition function with every interior layer rescaled to sum to one.
    ///
    /// Same recurrence as [`partition_function`][Self::partition_function],
    /// but each rotated-time layer is divided by its total as soon as it is
    /// complete and the log of the divisor is kept in the returned
    /// [`ScaledTable`]. Stored weights stay in `[0, 1]` for any series length,
    /// and the ratios inside each layer, hence the average path, are unchanged.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ThermalError::LengthMismatch`] | `series_a.len() != series_b.len()` |
    #[instrument(skip(self, series_a, series_b), fields(n = series_a.len(), temperature = self.temperature))]
    pub fn partition_function_scaled(
        &self,
        series_a: &[f64],
        series_b: &[f64],
    ) -> Result<ScaledTable, ThermalError> {
        let mut g = seeded_table(series_a, series_b)?;
        let lattice = Lattice::new(series_a.len(), Boundary::Excluded);
        let mut log_scale = vec![0.0; layer_count(series_a.len())];

        for t in lattice.times() {
            let carry = inherit_scale(&mut log_scale, t);
            for point in lattice.layer(t) {
                g[(point.t_a, point.t_b)] = self.cell_weight(&g, series_a, series_b, point, carry);
            }
            rescale_layer(&mut g, &lattice, t, &mut log_scale[t]);
        }

        debug!(
            log_total = log_scale.last().copied().unwrap_or(0.0),
            "scaled partition function filled"
        );
        Ok(ScaledTable::new(g, log_scale))
    }

    /// Compute the partition function and reduce it to the average lag path.
    ///
    /// Uses the rescaled fill, so the result stays finite for long series.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ThermalError::LengthMismatch`] | `series_a.len() != series_b.len()` |
    pub fn average_path(
        &self,
        series_a: &[f64],
        series_b: &[f64],
    ) -> Result<AveragePath, ThermalError> {
        let g = self.partition_function_scaled(series_a, series_b)?;
        Ok(average_path(g.table()))
    }

    /// Weight of an interior cell given its three already-filled predecessors.
    ///
    /// `carry` brings the diagonal predecessor, two layers back, onto the scale
    /// of the previous layer. It is exactly `1.0` for the raw fill.
    #[inline]
    fn cell_weight(
        &self,
        g: &PartitionTable,
        a: &[f64],
        b: &[f64],
        p: LatticePoint,
        carry: f64,
    ) -> f64 {
        let inflow = g[(p.t_a, p.t_b - 1)]
            + g[(p.t_a - 1, p.t_b)]
            + g[(p.t_a - 1, p.t_b - 1)] * carry;
        inflow * (-self.cost.cost(a[p.t_a], b[p.t_b]) / self.temperature).exp()
    }
}

impl<C: LocalCost + Sync> ThermalPath<C> {
    /// Compute the partition function, filling each rotated-time layer in parallel.
    ///
    /// Cells sharing a rotated time are independent, so each layer is computed
    /// with rayon and written back before the next layer starts. The result is
    /// bit-identical to [`partition_function`][Self::partition_function].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ThermalError::LengthMismatch`] | `series_a.len() != series_b.len()` |
    #[instrument(skip(self, series_a, series_b), fields(n = series_a.len(), temperature = self.temperature))]
    pub fn partition_function_par(
        &self,
        series_a: &[f64],
        series_b: &[f64],
    ) -> Result<PartitionTable, ThermalError> {
        let mut g = seeded_table(series_a, series_b)?;
        let n = series_a.len();
        let lattice = Lattice::new(n, Boundary::Excluded);

        let mut layer: Vec<LatticePoint> = Vec::with_capacity(n);
        let mut weights: Vec<f64> = Vec::with_capacity(n);

        for t in lattice.times() {
            layer.clear();
            layer.extend(lattice.layer(t));
            self.fill_layer_par(&mut g, series_a, series_b, &layer, 1.0, &mut weights);
        }

        debug!(cells = lattice.len(), "partition function filled in parallel");
        Ok(g)
    }

    /// Parallel counterpart of [`partition_function_scaled`][Self::partition_function_scaled].
    ///
    /// Bit-identical to the serial rescaled fill.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ThermalError::LengthMismatch`] | `series_a.len() != series_b.len()` |
    #[instrument(skip(self, series_a, series_b), fields(n = series_a.len(), temperature = self.temperature))]
    pub fn partition_function_scaled_par(
        &self,
        series_a: &[f64],
        series_b: &[f64],
    ) -> Result<ScaledTable, ThermalError> {
        let mut g = seeded_table(series_a, series_b)?;
        let n = series_a.len();
        let lattice = Lattice::new(n, Boundary::Excluded);
        let mut log_scale = vec![0.0; layer_count(n)];

        let mut layer: Vec<LatticePoint> = Vec::with_capacity(n);
        let mut weights: Vec<f64> = Vec::with_capacity(n);

        for t in lattice.times() {
            let carry = inherit_scale(&mut log_scale, t);
            layer.clear();
            layer.extend(lattice.layer(t));
            self.fill_layer_par(&mut g, series_a, series_b, &layer, carry, &mut weights);
            rescale_layer(&mut g, &lattice, t, &mut log_scale[t]);
        }

        debug!(
            log_total = log_scale.last().copied().unwrap_or(0.0),
            "scaled partition function filled in parallel"
        );
        Ok(ScaledTable::new(g, log_scale))
    }

    fn fill_layer_par(
        &self,
        g: &mut PartitionTable,
        a: &[f64],
        b: &[f64],
        layer: &[LatticePoint],
        carry: f64,
        weights: &mut Vec<f64>,
    ) {
        let table = &*g;
        layer
            .par_iter()
            .with_min_len(PAR_MIN_CELLS)
            .map(|&point| self.cell_weight(table, a, b, point, carry))
            .collect_into_vec(weights);

        for (point, &weight) in layer.iter().zip(weights.iter()) {
            g[(point.t_a, point.t_b)] = weight;
        }
    }
}

/// Allocate the table with its boundary conditions in place.
///
/// Row 0 and column 0 are zero so that no path can be created by lingering on
/// an edge; the unit mass enters at the origin and its two neighbours.
fn seeded_table(series_a: &[f64], series_b: &[f64]) -> Result<PartitionTable, ThermalError> {
    if series_a.len() != series_b.len() {
        return Err(ThermalError::LengthMismatch {
            len_a: series_a.len(),
            len_b: series_b.len(),
        });
    }

    let n = series_a.len();
    let mut g = PartitionTable::filled(n, 0.0);
    for (i, j) in [(0, 0), (0, 1), (1, 0)] {
        if i < n && j < n {
            g[(i, j)] = 1.0;
        }
    }
    Ok(g)
}

/// Number of rotated-time layers in an `n × n` table.
fn layer_count(n: usize) -> usize {
    (2 * n).saturating_sub(1)
}

/// Start layer `t` on the scale of layer `t - 1` and return the factor that
/// moves layer `t - 2` onto that scale.
fn inherit_scale(log_scale: &mut [f64], t: usize) -> f64 {
    if t == 0 {
        return 1.0;
    }
    log_scale[t] = log_scale[t - 1];
    if t < 2 {
        1.0
    } else {
        (log_scale[t - 2] - log_scale[t - 1]).exp()
    }
}

/// Divide the interior cells of layer `t` by their sum and fold it into `log_scale`.
///
/// The seeded boundary layers hold no interior cells and keep their scale.
/// A layer whose sum underflowed to zero is left as is.
fn rescale_layer(g: &mut PartitionTable, lattice: &Lattice, t: usize, log_scale: &mut f64) {
    let total: f64 = lattice.layer(t).map(|p| g[(p.t_a, p.t_b)]).sum();
    if !(total > 0.0 && total.is_finite()) {
        return;
    }
    for p in lattice.layer(t) {
        g[(p.t_a, p.t_b)] /= total;
    }
    *log_scale += total.ln();
}

/// Compute the partition function under the default [`ErrorModel`].
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ThermalError::LengthMismatch`] | `series_a.len() != series_b.len()` |
pub fn partition_function(
    series_a: &[f64],
    series_b: &[f64],
    temperature: f64,
) -> Result<PartitionTable, ThermalError> {
    ThermalPath::new(temperature).partition_function(series_a, series_b)
}

/// Compute the partition function under a caller-supplied local cost.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ThermalError::LengthMismatch`] | `series_a.len() != series_b.len()` |
pub fn partition_function_with<C: LocalCost>(
    series_a: &[f64],
    series_b: &[f64],
    temperature: f64,
    cost: C,
) -> Result<PartitionTable, ThermalError> {
    ThermalPath::new(temperature)
        .with_cost(cost)
        .partition_function(series_a, series_b)
}
