use std::io;

use derive_more::{Display, Error, From};

/// Shape of a sequence operand: `(size, start_index)`.
pub type Shape = (usize, usize);

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Requested size is negative or above the maximum for the container type.
    #[display("invalid size {}: must lie in 0..={}", size, max)]
    InvalidSize { size: isize, max: usize },
    /// Start offset is negative or above the size.
    #[display("invalid start index {}: must lie in 0..={}", start_index, size)]
    InvalidStartIndex { start_index: isize, size: isize },
    #[display("index {} out of range for size {}", index, size)]
    IndexOutOfRange { index: isize, size: usize },
    /// Operands of a binary operation differ in `(size, start_index)`.
    #[display("incompatible shapes {:?} and {:?}", left, right)]
    IncompatibleShape { left: Shape, right: Shape },
    #[display("failed to read input: {}", _0)]
    #[from]
    Io(#[error(source)] io::Error),
    #[display("cannot parse token {:?}", token)]
    Parse { token: String },
    #[display("unexpected end of input after {} of {} values", read, expected)]
    UnexpectedEof { expected: usize, read: usize },
}
