/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/// Append-only ragged rows in compressed sparse row (CSR) layout.
///
/// It behaves like a `Vec<Vec<T>>` in which rows can only be appended, and
/// once appended cannot be modified. All values live in a single vector, so
/// scanning all rows in order is a sequential read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrRows<T> {
    /// The first offset is always zero; there is one more offset than rows.
    offsets: Vec<usize>,
    values: Vec<T>,
}

impl<T> Default for CsrRows<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CsrRows<T> {
    /// Creates new, empty rows.
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            values: Vec::new(),
        }
    }

    /// Creates new, empty rows with room for the given number of rows and
    /// values.
    pub fn with_capacity(num_rows: usize, num_values: usize) -> Self {
        let mut offsets = Vec::with_capacity(num_rows + 1);
        offsets.push(0);
        Self {
            offsets,
            values: Vec::with_capacity(num_values),
        }
    }

    /// Appends a row.
    pub fn push(&mut self, values: impl IntoIterator<Item = T>) {
        self.values.extend(values);
        self.offsets.push(self.values.len());
    }

    /// Appends a value to the last row, or to a first row if there are no
    /// rows yet.
    pub fn extend_last(&mut self, value: T) {
        if self.offsets.len() == 1 {
            self.offsets.push(0);
        }
        self.values.push(value);
        if let Some(last) = self.offsets.last_mut() {
            *last = self.values.len();
        }
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns the overall number of values.
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Returns the length of a row.
    pub fn row_len(&self, row: usize) -> usize {
        self.offsets[row + 1] - self.offsets[row]
    }

    /// Returns an iterator over the rows, in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        self.offsets
            .windows(2)
            .map(|w| &self.values[w[0]..w[1]])
    }

    /// Shrinks the capacity to fit the current size.
    pub fn shrink_to_fit(&mut self) {
        self.offsets.shrink_to_fit();
        self.values.shrink_to_fit();
    }
}

impl<T> core::ops::Index<usize> for CsrRows<T> {
    type Output = [T];

    fn index(&self, row: usize) -> &Self::Output {
        &self.values[self.offsets[row]..self.offsets[row + 1]]
    }
}
