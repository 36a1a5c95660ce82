//! Dense square table holding the partition function.

use std::ops::{Index, IndexMut};

/// Partition function `g` of two length-`n` series, stored row-major.
///
/// `get(i, j)` is the unnormalized weight of all monotone paths from the
/// origin to cell `(i, j)`, where `i` indexes the first series and `j` the
/// second.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionTable {
    n: usize,
    data: Vec<f64>,
}

impl PartitionTable {
    /// Create an `n × n` table with every cell set to `fill`.
    pub(crate) fn filled(n: usize, fill: f64) -> Self {
        Self {
            n,
            data: vec![fill; n * n],
        }
    }

    /// Create a table from row-major values.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != n * n`.
    #[must_use]
    pub fn from_row_major(n: usize, data: Vec<f64>) -> Self {
        assert_eq!(
            data.len(),
            n * n,
            "expected {} values for a {n}x{n} table, got {}",
            n * n,
            data.len()
        );
        Self { n, data }
    }

    /// Return the side length `n`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the table has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Return the weight at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n` or `j >= n`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self[(i, j)]
    }

    /// Return row `i`, i.e. every cell sharing the first-series index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.n, "row index {i} out of bounds for table of size {}", self.n);
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.n.max(1))
    }

    /// Return all cells in row-major order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Return the transposed table, swapping the roles of the two series.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let n = self.n;
        let data = (0..n * n).map(|k| self.data[(k % n) * n + k / n]).collect();
        Self { n, data }
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        assert!(i < self.n, "row index {i} out of bounds for table of size {}", self.n);
        assert!(j < self.n, "column index {j} out of bounds for table of size {}", self.n);
        i * self.n + j
    }
}

impl Index<(usize, usize)> for PartitionTable {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[self.offset(i, j)]
    }
}

impl IndexMut<(usize, usize)> for PartitionTable {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        let k = self.offset(i, j);
        &mut self.data[k]
    }
}

/// Partition function stored with one scale factor per rotated-time layer.
///
/// The true weight of cell `(i, j)` is `table[(i, j)] * exp(log_scale(i + j))`.
/// Each interior layer of the stored table sums to one, so it stays in range for
/// series of any length. Ratios inside a layer are those of the raw table,
/// which is all [`average_path`](crate::average_path) needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledTable {
    table: PartitionTable,
    log_scale: Vec<f64>,
}

impl ScaledTable {
    pub(crate) fn new(table: PartitionTable, log_scale: Vec<f64>) -> Self {
        debug_assert_eq!(log_scale.len(), (2 * table.len()).saturating_sub(1));
        Self { table, log_scale }
    }

    /// Return the rescaled weights.
    #[must_use]
    pub fn table(&self) -> &PartitionTable {
        &self.table
    }

    /// Return the side length `n`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Return true if the table has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Natural log of the factor removed from rotated-time layer `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t >= 2n - 1`.
    #[must_use]
    pub fn log_scale(&self, t: usize) -> f64 {
        self.log_scale[t]
    }

    /// Return every layer's log scale, indexed by rotated time.
    #[must_use]
    pub fn log_scales(&self) -> &[f64] {
        &self.log_scale
    }

    /// Natural log of the unscaled weight at `(i, j)`. Zero cells give `-inf`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n` or `j >= n`.
    #[must_use]
    pub fn log_weight(&self, i: usize, j: usize) -> f64 {
        self.table[(i, j)].ln() + self.log_scale[i + j]
    }

    /// Consume and return the rescaled weights.
    #[must_use]
    pub fn into_table(self) -> PartitionTable {
        self.table
    }
}
