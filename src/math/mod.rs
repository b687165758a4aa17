//! Fixed-point math kernels: scalars, vectors, matrices

pub mod fixed;
mod matrix;
mod vector;

pub use fixed::{FP_BIT, FP_HALF, FP_ONE};
pub use matrix::{screenport, FixedMat4};
pub use vector::FixedVec3;
