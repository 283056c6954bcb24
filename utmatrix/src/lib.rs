//! # Offset vectors and upper-triangular matrices
//!
//! [`Sequence`] is an owning vector whose elements are considered from a start offset onwards.
//! [`TriangularMatrix`] stacks `n` such sequences, row `i` starting at column `i`, to model an
//! upper-triangular matrix without compacting its storage.
use std::ops::{Mul, Sub};

use log::debug;
use num_traits::Zero;

mod error;
pub mod io;
mod sequence;
mod triangular_matrix;

pub use error::{Error, Result, Shape};
pub use sequence::Sequence;
pub use triangular_matrix::TriangularMatrix;

/// Largest size accepted by [`Sequence::new`].
pub const MAX_VECTOR_SIZE: usize = 100_000_000;
/// Largest dimension accepted by [`TriangularMatrix::new`].
pub const MAX_MATRIX_SIZE: usize = 10_000;
/// Size used by the `Default` implementations.
pub const DEFAULT_SIZE: usize = 10;

/// Numbers that can be stored in a [`Sequence`]: the zero value comes from [`Zero`].
pub trait Element: Clone + PartialEq + Zero + Sub<Output = Self> + Mul<Output = Self> {}
impl<T> Element for T where T: Clone + PartialEq + Zero + Sub<Output = Self> + Mul<Output = Self> {}

pub(crate) fn checked_size(size: isize, max: usize) -> Result<usize> {
    match usize::try_from(size) {
        Ok(checked) if checked <= max => Ok(checked),
        _ => {
            debug!("rejecting size {} (maximum {})", size, max);
            Err(Error::InvalidSize { size, max })
        }
    }
}
