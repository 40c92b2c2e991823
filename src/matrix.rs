//! Column-major pixel matrices.
//!
//! [`PixelMatrix`] stores one value per (pixel, column) pair in a flat vector
//! with column-major layout: element `(pixel, col)` is at `pixel + col * nrows`.
//! For a time series stack the columns are acquisition dates, so a whole date
//! is a contiguous slice and appending a new date is a cheap `extend`. For the
//! harmonic coefficients the columns are the five basis terms.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Column-major matrix with pixels as rows.
///
/// # Examples
///
/// ```
/// use fordead_core::matrix::PixelMatrix;
///
/// // 3 pixels, 2 dates
/// let data = vec![
///     0.1, 0.2, 0.3, // date 0
///     0.4, 0.5, 0.6, // date 1
/// ];
/// let stack = PixelMatrix::from_column_major(data, 3, 2).unwrap();
///
/// assert_eq!(stack[(1, 0)], 0.2);
/// assert_eq!(stack.column(1), &[0.4, 0.5, 0.6]);
/// assert_eq!(stack.row(2), vec![0.3, 0.6]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelMatrix<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
}

impl<T: Copy> PixelMatrix<T> {
    /// Create from flat column-major data with dimension validation.
    ///
    /// Returns `None` if `data.len() != nrows * ncols`.
    pub fn from_column_major(data: Vec<T>, nrows: usize, ncols: usize) -> Option<Self> {
        if data.len() != nrows * ncols {
            return None;
        }
        Some(Self { data, nrows, ncols })
    }

    /// Create a matrix with every element set to `value`.
    pub fn filled(nrows: usize, ncols: usize, value: T) -> Self {
        Self {
            data: vec![value; nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Create an empty matrix with `nrows` pixels and no columns yet.
    ///
    /// Columns are then appended one date at a time with [`push_column`](Self::push_column).
    pub fn with_rows(nrows: usize) -> Self {
        Self {
            data: Vec::new(),
            nrows,
            ncols: 0,
        }
    }

    /// Number of rows (pixels).
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns (dates or coefficients).
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Dimensions as `(nrows, ncols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the matrix holds no element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Contiguous column slice (zero-copy).
    ///
    /// # Panics
    /// Panics if `col >= ncols`.
    #[inline]
    pub fn column(&self, col: usize) -> &[T] {
        let start = col * self.nrows;
        &self.data[start..start + self.nrows]
    }

    /// Append one column. Returns `false` (and leaves the matrix untouched)
    /// when `values.len() != nrows`.
    pub fn push_column(&mut self, values: &[T]) -> bool {
        if values.len() != self.nrows {
            return false;
        }
        self.data.extend_from_slice(values);
        self.ncols += 1;
        true
    }

    /// Copy of one row (a pixel's full series). O(ncols), rows are strided.
    pub fn row(&self, row: usize) -> Vec<T> {
        (0..self.ncols)
            .map(|j| self.data[row + j * self.nrows])
            .collect()
    }

    /// Write a whole row. Returns `false` when `values.len() != ncols`.
    pub fn set_row(&mut self, row: usize, values: &[T]) -> bool {
        if row >= self.nrows || values.len() != self.ncols {
            return false;
        }
        for (j, &v) in values.iter().enumerate() {
            self.data[row + j * self.nrows] = v;
        }
        true
    }

    /// Element at `(row, col)` with bounds checking.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.nrows && col < self.ncols {
            Some(self.data[row + col * self.nrows])
        } else {
            None
        }
    }

    /// Flat slice of the underlying column-major data.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl PixelMatrix<f64> {
    /// Zero-filled matrix.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self::filled(nrows, ncols, 0.0)
    }

    /// Convert to a nalgebra `DMatrix<f64>`. Both layouts are column-major.
    pub fn to_dmatrix(&self) -> DMatrix<f64> {
        DMatrix::from_column_slice(self.nrows, self.ncols, &self.data)
    }

    /// Whether every element is finite.
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl<T> std::ops::Index<(usize, usize)> for PixelMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        debug_assert!(
            row < self.nrows && col < self.ncols,
            "PixelMatrix index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.nrows,
            self.ncols
        );
        &self.data[row + col * self.nrows]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for PixelMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        debug_assert!(
            row < self.nrows && col < self.ncols,
            "PixelMatrix index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.nrows,
            self.ncols
        );
        &mut self.data[row + col * self.nrows]
    }
}

impl<T> std::fmt::Display for PixelMatrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PixelMatrix({}x{})", self.nrows, self.ncols)
    }
}
