//! Rotated lattice traversal in dependency order.
//!
//! A cell `(t_a, t_b)` of the `n × n` table is addressed in rotated coordinates
//! by `t = t_a + t_b` (rotated time) and `x = t_b - t_a` (lag). Every
//! predecessor of a cell lies on a strictly smaller `t`, so sweeping layers in
//! increasing `t` visits each cell after all of its dependencies.

use std::iter::FusedIterator;
use std::ops::RangeInclusive;

/// Whether the first row and column of the table are part of the traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Boundary {
    /// Visit every cell, including `t_a = 0` and `t_b = 0`.
    Included,
    /// Skip cells with `t_a = 0` or `t_b = 0` (default).
    #[default]
    Excluded,
}

impl Boundary {
    /// Smallest original-time index visited along either axis.
    fn offset(self) -> usize {
        match self {
            Self::Included => 0,
            Self::Excluded => 1,
        }
    }
}

/// One lattice cell in both coordinate systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LatticePoint {
    /// Lag `t_b - t_a`.
    pub x: isize,
    /// Rotated time `t_a + t_b`.
    pub t: usize,
    /// Index into the first series.
    pub t_a: usize,
    /// Index into the second series.
    pub t_b: usize,
}

impl LatticePoint {
    /// `x` and `t` must share parity.
    fn from_rotated(x: isize, t: usize) -> Self {
        let t_signed = t as isize;
        Self {
            x,
            t,
            t_a: ((t_signed - x) / 2) as usize,
            t_b: ((t_signed + x) / 2) as usize,
        }
    }
}

/// The set of cells of an `n × n` table under a boundary policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lattice {
    n: usize,
    boundary: Boundary,
}

impl Lattice {
    /// Create the lattice for series of length `n`.
    #[must_use]
    pub fn new(n: usize, boundary: Boundary) -> Self {
        Self { n, boundary }
    }

    /// Return the series length.
    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Return the boundary policy.
    #[must_use]
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Number of cells visited: `n²` with the boundary, `(n-1)²` without.
    #[must_use]
    pub fn len(&self) -> usize {
        let side = self.n.saturating_sub(self.boundary.offset());
        side * side
    }

    /// Return true if the traversal visits no cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rotated times that contain at least one visited cell.
    ///
    /// `0..=2n-2` with the boundary and `1..=2n-2` without. Empty when the
    /// lattice is empty.
    #[must_use]
    pub fn times(&self) -> RangeInclusive<usize> {
        if self.is_empty() {
            return RangeInclusive::new(1, 0);
        }
        self.boundary.offset()..=2 * self.n - 2
    }

    /// Iterate over every visited cell in increasing `t`, then increasing `x`.
    #[must_use]
    pub fn iter(&self) -> LatticeIter {
        let times = self.times();
        LatticeIter::spanning(*self, *times.start(), *times.end())
    }

    /// Iterate over the cells of the single rotated-time layer `t`, in increasing `x`.
    ///
    /// Cells of one layer never depend on each other.
    #[must_use]
    pub fn layer(&self, t: usize) -> LatticeIter {
        LatticeIter::spanning(*self, t, t)
    }

    /// Inclusive range of lags on layer `t`, already aligned to the parity of `t`.
    ///
    /// `start > end` when the layer holds no cell.
    fn x_range(&self, t: usize) -> (isize, isize) {
        let n = self.n as isize;
        let t = t as isize;
        let offset = self.boundary.offset() as isize;
        let mut start = (t - 2 * n + 1).max(offset - t);
        let end = (2 * n - t - 1).min(t - offset);
        if (start + t).rem_euclid(2) == 1 {
            start += 1;
        }
        (start, end)
    }
}

impl IntoIterator for Lattice {
    type Item = LatticePoint;
    type IntoIter = LatticeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &Lattice {
    type Item = LatticePoint;
    type IntoIter = LatticeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy cursor over lattice cells. Holds constant state regardless of `n`.
#[derive(Debug, Clone)]
pub struct LatticeIter {
    lattice: Lattice,
    t: usize,
    t_last: usize,
    x: isize,
    x_end: isize,
    exhausted: bool,
}

impl LatticeIter {
    fn spanning(lattice: Lattice, t_first: usize, t_last: usize) -> Self {
        let (x, x_end) = lattice.x_range(t_first);
        Self {
            lattice,
            t: t_first,
            t_last,
            x,
            x_end,
            exhausted: t_first > t_last,
        }
    }
}

impl Iterator for LatticeIter {
    type Item = LatticePoint;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.exhausted {
                return None;
            }
            if self.x <= self.x_end {
                let point = LatticePoint::from_rotated(self.x, self.t);
                self.x += 2;
                return Some(point);
            }
            if self.t >= self.t_last {
                self.exhausted = true;
                return None;
            }
            self.t += 1;
            (self.x, self.x_end) = self.lattice.x_range(self.t);
        }
    }
}

impl FusedIterator for LatticeIter {}

/// Iterate over the cells of an `n × n` table in dependency order.
///
/// Shorthand for `Lattice::new(n, boundary).iter()`.
#[must_use]
pub fn iter_lattice(n: usize, boundary: Boundary) -> LatticeIter {
    Lattice::new(n, boundary).iter()
}

/// Exhaustive reference traversal.
///
/// Scans every `t` in `0..2n` and every `x` in `-t..=t`, keeping integer
/// in-range coordinates. Yields the same set of cells as [`iter_lattice`] in a
/// different order. Each layer scans `O(t)` candidates, so a full pass costs
/// `O(n²)` regardless of boundary mode. Intended for testing.
pub fn iter_lattice_brute_force(
    n: usize,
    boundary: Boundary,
) -> impl Iterator<Item = LatticePoint> {
    let start = boundary.offset();
    (0..2 * n).flat_map(move |t| {
        let t_signed = t as isize;
        (-t_signed..=t_signed).filter_map(move |x| {
            let twice_a = t_signed - x;
            if twice_a % 2 != 0 {
                return None;
            }
            let t_a = (twice_a / 2) as usize;
            let t_b = ((t_signed + x) / 2) as usize;
            let in_range = (start..n).contains(&t_a) && (start..n).contains(&t_b);
            in_range.then_some(LatticePoint { x, t, t_a, t_b })
        })
    })
}
