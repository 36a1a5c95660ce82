//! Thermal optimal path estimation of the lead/lag structure between two series.
//!
//! Pure math, no I/O. Provides the rotated lattice traversal, the
//! partition function recurrence under a Boltzmann error kernel, the average
//! lag path derived from it, and z-normalization for preparing inputs.

mod average;
mod cost;
mod error;
mod lattice;
mod partition;
mod preprocess;
mod table;

pub use average::{AveragePath, average_path};
pub use cost::{ErrorModel, LocalCost, error};
pub use error::{PreprocessError, ThermalError};
pub use lattice::{
    Boundary, Lattice, LatticeIter, LatticePoint, iter_lattice, iter_lattice_brute_force,
};
pub use partition::{ThermalPath, partition_function, partition_function_with};
pub use preprocess::z_normalize;
pub use table::{PartitionTable, ScaledTable};
