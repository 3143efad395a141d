/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::ops::{Index, IndexMut};

/// A dense matrix stored as a flat vector in row-major order.
///
/// `cols` is the number of columns; the number of rows equals `data.len() /
/// cols`.
#[derive(Debug, Clone)]
pub struct Matrix<T> {
    data: Vec<T>,
    cols: usize,
}

impl<T: Clone + Default> Matrix<T> {
    /// Creates a new `rows` × `cols` matrix with all elements set to
    /// `T::default()`.
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![T::default(); rows * cols],
            cols,
        }
    }
}

impl<T> Matrix<T> {
    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.data.len().checked_div(self.cols).unwrap_or(0)
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns a row as a slice.
    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        &mut self.data[row * self.cols + col]
    }
}
