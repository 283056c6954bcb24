use std::fmt;
use std::io::BufRead;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use itertools::Itertools;
use log::{debug, trace};

use crate::error::{Error, Result};
use crate::io::Tokens;
use crate::{checked_size, Element, Sequence, DEFAULT_SIZE, MAX_MATRIX_SIZE};

/// Square matrix of `n` rows where row `i` is a [`Sequence`] of size `n` starting at column `i`.
///
/// Cells left of the diagonal are stored and writable, but they take no part in comparison or
/// arithmetic.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangularMatrix<T> {
    rows: Vec<Sequence<T>>,
}

impl<T> From<Vec<Sequence<T>>> for TriangularMatrix<T> {
    /// Rows are taken as they are, without checking sizes or start offsets.
    fn from(rows: Vec<Sequence<T>>) -> Self {
        Self { rows }
    }
}

impl<T: Element> TriangularMatrix<T> {
    /// Create a zero matrix of dimension `size`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSize`] if `size` is negative or above [`MAX_MATRIX_SIZE`].
    pub fn new(size: isize) -> Result<Self> {
        let n = checked_size(size, MAX_MATRIX_SIZE)?;
        trace!("allocating {}x{} triangular matrix", n, n);
        Ok(Self::zeros(n))
    }

    fn zeros(n: usize) -> Self {
        Self {
            rows: (0..n).map(|i| Sequence::zeros(n, i)).collect(),
        }
    }

    /// Make `self` equal to `other`, reallocating the rows only when the dimensions differ.
    pub fn assign(&mut self, other: &Self) {
        if self == other {
            return;
        }
        if self.size() != other.size() {
            debug!(
                "reallocating matrix rows from {} to {}",
                self.size(),
                other.size()
            );
            self.rows = other
                .rows
                .iter()
                .map(|source| {
                    let mut row = Sequence::zeros(source.size(), 0);
                    row.assign(source);
                    row
                })
                .collect();
            return;
        }
        for (row, source) in self.rows.iter_mut().zip_eq(&other.rows) {
            row.assign(source);
        }
    }

    fn zip_rows(
        &self,
        other: &Self,
        f: impl Fn(&Sequence<T>, &Sequence<T>) -> Result<Sequence<T>>,
    ) -> Result<Self> {
        if self.size() != other.size() {
            debug!(
                "dimension mismatch between {} and {}",
                self.size(),
                other.size()
            );
            return Err(Error::IncompatibleShape {
                left: (self.size(), 0),
                right: (other.size(), 0),
            });
        }

        let rows = self
            .rows
            .iter()
            .zip_eq(&other.rows)
            .map(|(a, b)| {
                // Cells left of the row offset stay zero
                let combined = f(a, b)?;
                let mut row = Sequence::zeros(combined.size(), 0);
                row.assign(&combined);
                Ok(row)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    pub fn try_add(&self, other: &Self) -> Result<Self> {
        self.zip_rows(other, Sequence::try_add)
    }

    pub fn try_sub(&self, other: &Self) -> Result<Self> {
        self.zip_rows(other, Sequence::try_sub)
    }
}

impl<T> TriangularMatrix<T> {
    #[inline]
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Sequence<T>] {
        &self.rows
    }

    fn position(&self, i: isize) -> Result<usize> {
        usize::try_from(i)
            .ok()
            .filter(|&position| position < self.size())
            .ok_or_else(|| {
                debug!("row {} out of range for dimension {}", i, self.size());
                Error::IndexOutOfRange {
                    index: i,
                    size: self.size(),
                }
            })
    }

    pub fn row(&self, i: isize) -> Result<&Sequence<T>> {
        let position = self.position(i)?;
        Ok(&self.rows[position])
    }

    pub fn row_mut(&mut self, i: isize) -> Result<&mut Sequence<T>> {
        let position = self.position(i)?;
        Ok(&mut self.rows[position])
    }

    pub fn get(&self, i: isize, j: isize) -> Result<&T> {
        self.row(i)?.get(j)
    }

    pub fn get_mut(&mut self, i: isize, j: isize) -> Result<&mut T> {
        self.row_mut(i)?.get_mut(j)
    }
}

impl<T: FromStr> TriangularMatrix<T> {
    /// Read every row in order, each consuming `size` values.
    pub fn read<R: BufRead>(&mut self, reader: R) -> Result<()> {
        self.read_tokens(&mut Tokens::new(reader))
    }

    pub fn read_tokens<R: BufRead>(&mut self, tokens: &mut Tokens<R>) -> Result<()> {
        self.rows
            .iter_mut()
            .try_for_each(|row| row.read_tokens(tokens))
    }
}

impl<T: Element> Default for TriangularMatrix<T> {
    fn default() -> Self {
        Self::zeros(DEFAULT_SIZE)
    }
}

impl<T> Index<usize> for TriangularMatrix<T> {
    type Output = Sequence<T>;

    fn index(&self, i: usize) -> &Self::Output {
        &self.rows[i]
    }
}

impl<T> IndexMut<usize> for TriangularMatrix<T> {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.rows[i]
    }
}

impl<T> Index<(usize, usize)> for TriangularMatrix<T> {
    type Output = T;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.rows[index.0][index.1]
    }
}

impl<T> IndexMut<(usize, usize)> for TriangularMatrix<T> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        &mut self.rows[index.0][index.1]
    }
}

impl<T: fmt::Display> fmt::Display for TriangularMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_env_logger::env_logger;

    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn sums(n: usize) -> TriangularMatrix<i32> {
        let mut m = TriangularMatrix::new(n as isize).unwrap();
        for i in 0..n {
            for j in i..n {
                m[i][j] = (i + j) as i32;
            }
        }
        m
    }

    fn two_by_two(cells: [i32; 3]) -> TriangularMatrix<i32> {
        let mut m = TriangularMatrix::new(2).unwrap();
        m[0][0] = cells[0];
        m[0][1] = cells[1];
        m[1][1] = cells[2];
        m
    }

    #[test]
    fn test_new() {
        init();

        let m = TriangularMatrix::<i32>::new(5).unwrap();
        assert_eq!(m.size(), 5);
        for (i, row) in m.rows().iter().enumerate() {
            assert_eq!(row.shape(), (5, i));
            assert!(row.as_slice().iter().all(|x| *x == 0));
        }
        assert_eq!(TriangularMatrix::<i32>::new(10).unwrap().size(), 10);
        assert_eq!(TriangularMatrix::<i32>::new(0).unwrap().size(), 0);
        assert_eq!(TriangularMatrix::<i64>::default().size(), DEFAULT_SIZE);
    }

    #[test]
    fn test_new_invalid() {
        init();

        assert!(matches!(
            TriangularMatrix::<i32>::new(MAX_MATRIX_SIZE as isize + 1),
            Err(Error::InvalidSize { .. })
        ));
        assert!(matches!(
            TriangularMatrix::<i32>::new(-5),
            Err(Error::InvalidSize { size: -5, .. })
        ));
    }

    #[test]
    fn test_clone_is_equal_and_independent() {
        let m = sums(5);
        let mut m1 = m.clone();
        assert_eq!(m, m1);

        m1[0][0] = 90;
        assert_ne!(m, m1);
        assert_eq!(m[0][0], 0);
    }

    #[test]
    fn test_get_set() {
        let mut m = TriangularMatrix::<i32>::new(5).unwrap();
        m[1][2] = 100;
        assert_eq!(m[1][2], 100);
        assert_eq!(m[(1, 2)], 100);
        assert_eq!(*m.get(1, 2).unwrap(), 100);

        *m.get_mut(3, 4).unwrap() = 7;
        m[(4, 4)] = 8;
        assert_eq!(m.row(3).unwrap()[4], 7);
        assert_eq!(m[4][4], 8);
    }

    #[test]
    fn test_get_out_of_range() {
        let mut m = TriangularMatrix::<i32>::new(5).unwrap();
        assert!(matches!(
            m.row_mut(-1),
            Err(Error::IndexOutOfRange { index: -1, size: 5 })
        ));
        assert!(matches!(
            m.get_mut(10, 0),
            Err(Error::IndexOutOfRange { index: 10, size: 5 })
        ));
        assert!(matches!(
            m.get(0, 5),
            Err(Error::IndexOutOfRange { index: 5, size: 5 })
        ));
    }

    #[test]
    fn test_assign_to_itself() {
        let mut m = TriangularMatrix::<i32>::new(5).unwrap();
        let mut m1 = TriangularMatrix::new(5).unwrap();
        m1[1][1] = 1;
        m[1][1] = 1;

        let same = m.clone();
        m.assign(&same);
        assert_eq!(m1, m);
    }

    #[test]
    fn test_assign_equal_size() {
        let mut m = TriangularMatrix::<i32>::new(5).unwrap();
        let m1 = TriangularMatrix::new(5).unwrap();
        m[1][1] = 1;

        m.assign(&m1);
        assert_eq!(m1, m);
    }

    #[test]
    fn test_assign_changes_size() {
        init();

        let mut m = TriangularMatrix::<i32>::new(5).unwrap();
        let m1 = TriangularMatrix::new(10).unwrap();
        m.assign(&m1);
        assert_eq!(m1.size(), m.size());

        let m = sums(5);
        let mut m1 = TriangularMatrix::new(6).unwrap();
        m1.assign(&m);
        assert_eq!(m, m1);
        assert_eq!(m1[4].start_index(), 4);
    }

    #[test]
    fn test_eq() {
        let m = sums(5);
        let m1 = sums(5);
        assert!(m == m1);
        assert!(m == m);

        assert!(TriangularMatrix::<i32>::new(5).unwrap() != TriangularMatrix::new(10).unwrap());
    }

    #[test]
    fn test_eq_ignores_cells_below_diagonal() {
        let m = sums(3);
        let mut m1 = sums(3);
        m1[2][0] = 42;
        assert_eq!(m, m1);
    }

    #[test]
    fn test_add_sub() {
        let m = two_by_two([1, 5, 10]);
        let m1 = two_by_two([2, 20, 15]);

        assert_eq!(m.try_add(&m1).unwrap(), two_by_two([3, 25, 25]));
        assert_eq!(m1.try_sub(&m).unwrap(), two_by_two([1, 15, 5]));
    }

    #[test]
    fn test_add_sub_zero_below_diagonal() {
        let mut m = two_by_two([1, 5, 10]);
        m[1][0] = 7;
        let m1 = two_by_two([2, 20, 15]);

        let sum = m.try_add(&m1).unwrap();
        assert_eq!(sum[1].as_slice(), &[0, 25]);
        assert_eq!(sum[1].start_index(), 1);
        assert_eq!(m.try_sub(&m1).unwrap()[(1, 0)], 0);
    }

    #[test]
    fn test_add_sub_different_size() {
        init();

        let m = TriangularMatrix::<i32>::new(5).unwrap();
        let m1 = TriangularMatrix::<i32>::new(10).unwrap();
        assert!(matches!(
            m.try_add(&m1),
            Err(Error::IncompatibleShape {
                left: (5, 0),
                right: (10, 0)
            })
        ));
        assert!(matches!(m.try_sub(&m1), Err(Error::IncompatibleShape { .. })));
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![
            Sequence::<i32>::new(2, 0).unwrap(),
            Sequence::<i32>::new(2, 1).unwrap(),
        ];
        assert_eq!(TriangularMatrix::from(rows), TriangularMatrix::new(2).unwrap());

        // No shape check on conversion, but row arithmetic still rejects mismatches
        let irregular = TriangularMatrix::from(vec![
            Sequence::<i32>::new(2, 0).unwrap(),
            Sequence::<i32>::new(2, 0).unwrap(),
        ]);
        assert_eq!(irregular.size(), 2);
        let m = TriangularMatrix::new(2).unwrap();
        assert!(matches!(
            irregular.try_add(&m),
            Err(Error::IncompatibleShape {
                left: (2, 0),
                right: (2, 1)
            })
        ));
    }

    #[test]
    fn test_display() {
        let mut m = two_by_two([1, 5, 10]);
        m[1][0] = 99;
        assert_eq!(m.to_string(), "1 5 \n0 10 \n");
    }

    #[test]
    fn test_read() {
        let mut m = TriangularMatrix::<i32>::new(3).unwrap();
        m.read(Cursor::new("1 2 3\n0 4 5\n0 0 6\n")).unwrap();
        assert_eq!(m[0].as_slice(), &[1, 2, 3]);
        assert_eq!(m[2][2], 6);

        let mut m1 = TriangularMatrix::<i32>::new(3).unwrap();
        m1.read(Cursor::new(m.to_string())).unwrap();
        assert_eq!(m, m1);

        assert!(matches!(
            m1.read(Cursor::new("1 2 3 4")),
            Err(Error::UnexpectedEof {
                expected: 3,
                read: 1
            })
        ));
    }
}
