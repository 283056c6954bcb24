use std::fmt;
use std::io::BufRead;
use std::mem;
use std::ops::{Add, Index, IndexMut, Mul, Sub};
use std::str::FromStr;

use itertools::Itertools;
use log::{debug, trace};

use crate::error::{Error, Result, Shape};
use crate::io::Tokens;
use crate::{checked_size, Element, DEFAULT_SIZE, MAX_VECTOR_SIZE};

/// An owning vector whose elements are considered from `start_index` onwards.
///
/// Slots before the start offset are allocated and addressable, but they are ignored by
/// comparison and arithmetic, and they are written as `0`.
#[derive(Clone, Debug)]
pub struct Sequence<T> {
    data: Vec<T>,
    start_index: usize,
}

impl<T: Element> Sequence<T> {
    /// Create a sequence of `size` zeros whose elements count from `start_index`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidSize`] if `size` is negative or above [`MAX_VECTOR_SIZE`].
    /// * [`Error::InvalidStartIndex`] if `start_index` is negative or above `size`.
    pub fn new(size: isize, start_index: isize) -> Result<Self> {
        let len = checked_size(size, MAX_VECTOR_SIZE)?;
        let start = usize::try_from(start_index)
            .ok()
            .filter(|&start| start <= len)
            .ok_or_else(|| {
                debug!("rejecting start index {} for size {}", start_index, size);
                Error::InvalidStartIndex { start_index, size }
            })?;

        trace!("allocating sequence of size {} from {}", len, start);
        Ok(Self::zeros(len, start))
    }

    pub fn with_size(size: isize) -> Result<Self> {
        Self::new(size, 0)
    }

    pub(crate) fn zeros(len: usize, start_index: usize) -> Self {
        Self {
            data: vec![T::zero(); len],
            start_index,
        }
    }

    /// Make `self` equal to `other`.
    ///
    /// Storage is reallocated only when the sizes differ. Slots before `other`'s start offset
    /// are not copied: they keep their previous value, or zero after a reallocation.
    pub fn assign(&mut self, other: &Self) {
        if self == other {
            return;
        }
        if self.size() != other.size() {
            debug!(
                "reallocating sequence storage from {} to {} elements",
                self.size(),
                other.size()
            );
            self.data = vec![T::zero(); other.size()];
        }
        self.start_index = other.start_index;
        self.data[other.start_index..].clone_from_slice(other.in_range());
    }

    /// The result starts at offset 0, slots before `self`'s offset are zero.
    fn map_in_range(&self, f: impl Fn(T) -> T) -> Self {
        let mut result = Self::zeros(self.size(), 0);
        for (slot, value) in result.data[self.start_index..]
            .iter_mut()
            .zip_eq(self.in_range())
        {
            *slot = f(value.clone());
        }
        result
    }

    pub fn add_scalar(&self, value: T) -> Self {
        self.map_in_range(|x| x + value.clone())
    }

    pub fn sub_scalar(&self, value: T) -> Self {
        self.map_in_range(|x| x - value.clone())
    }

    pub fn mul_scalar(&self, value: T) -> Self {
        self.map_in_range(|x| x * value.clone())
    }

    fn check_shape(&self, other: &Self) -> Result<()> {
        if self.shape() != other.shape() {
            debug!(
                "shape mismatch between {:?} and {:?}",
                self.shape(),
                other.shape()
            );
            return Err(Error::IncompatibleShape {
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(())
    }

    fn zip_with(&self, other: &Self, f: impl Fn(T, T) -> T) -> Result<Self> {
        self.check_shape(other)?;

        let mut result = self.clone();
        for (slot, value) in result.data[self.start_index..]
            .iter_mut()
            .zip_eq(other.in_range())
        {
            let lhs = mem::replace(slot, T::zero());
            *slot = f(lhs, value.clone());
        }
        Ok(result)
    }

    /// Element-wise sum; both operands must have the same size and start offset.
    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Element-wise difference; both operands must have the same size and start offset.
    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Inner product over the elements from the start offset onwards.
    pub fn dot(&self, other: &Self) -> Result<T> {
        self.check_shape(other)?;

        Ok(self
            .in_range()
            .iter()
            .zip_eq(other.in_range())
            .fold(T::zero(), |total, (a, b)| total + a.clone() * b.clone()))
    }
}

impl<T> Sequence<T> {
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        (self.size(), self.start_index)
    }

    /// All stored elements, including those before the start offset.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The elements from the start offset onwards.
    pub fn in_range(&self) -> &[T] {
        &self.data[self.start_index..]
    }

    fn position(&self, index: isize) -> Result<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&position| position < self.size())
            .ok_or_else(|| {
                debug!("index {} out of range for size {}", index, self.size());
                Error::IndexOutOfRange {
                    index,
                    size: self.size(),
                }
            })
    }

    pub fn get(&self, index: isize) -> Result<&T> {
        let position = self.position(index)?;
        Ok(&self.data[position])
    }

    pub fn get_mut(&mut self, index: isize) -> Result<&mut T> {
        let position = self.position(index)?;
        Ok(&mut self.data[position])
    }
}

impl<T: FromStr> Sequence<T> {
    /// Read `size` whitespace-separated values into slots `0..size`, ignoring the start offset.
    pub fn read<R: BufRead>(&mut self, reader: R) -> Result<()> {
        self.read_tokens(&mut Tokens::new(reader))
    }

    pub fn read_tokens<R: BufRead>(&mut self, tokens: &mut Tokens<R>) -> Result<()> {
        self.data = tokens.parse_values(self.size())?;
        Ok(())
    }
}

impl<T: Element> Default for Sequence<T> {
    fn default() -> Self {
        Self::zeros(DEFAULT_SIZE, 0)
    }
}

impl<T: Element> TryFrom<Vec<T>> for Sequence<T> {
    type Error = Error;

    fn try_from(data: Vec<T>) -> Result<Self> {
        if data.len() > MAX_VECTOR_SIZE {
            return Err(Error::InvalidSize {
                size: isize::try_from(data.len()).unwrap_or(isize::MAX),
                max: MAX_VECTOR_SIZE,
            });
        }
        Ok(Self {
            data,
            start_index: 0,
        })
    }
}

impl<T: PartialEq> PartialEq for Sequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.in_range() == other.in_range()
    }
}

impl<T> Index<usize> for Sequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for Sequence<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<T: Element> Add<T> for &Sequence<T> {
    type Output = Sequence<T>;

    fn add(self, rhs: T) -> Self::Output {
        self.add_scalar(rhs)
    }
}

impl<T: Element> Sub<T> for &Sequence<T> {
    type Output = Sequence<T>;

    fn sub(self, rhs: T) -> Self::Output {
        self.sub_scalar(rhs)
    }
}

impl<T: Element> Mul<T> for &Sequence<T> {
    type Output = Sequence<T>;

    fn mul(self, rhs: T) -> Self::Output {
        self.mul_scalar(rhs)
    }
}

impl<T: fmt::Display> fmt::Display for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for _ in 0..self.start_index {
            write!(f, "0 ")?;
        }
        for value in self.in_range() {
            write!(f, "{} ", value)?;
        }
        Ok(())
    }
}
