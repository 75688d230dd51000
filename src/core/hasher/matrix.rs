//! Square real-valued matrices passed between pipeline stages.

use crate::error::ConfigError;

/// An N×N matrix of `f64` values stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    size: usize,
    values: Vec<f64>,
}

/// Grayscale intensities (0-255), row = image y, column = image x.
pub type IntensityMatrix = SquareMatrix;

/// DCT coefficients; entry (u, v) holds vertical frequency u, horizontal frequency v.
pub type CoefficientMatrix = SquareMatrix;

impl SquareMatrix {
    /// Wrap row-major values, checking there are exactly `size * size` of them
    pub fn from_vec(size: usize, values: Vec<f64>) -> Result<Self, ConfigError> {
        let expected = size * size;
        if values.len() != expected {
            return Err(ConfigError::MatrixValueCount {
                size,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { size, values })
    }

    /// Build a matrix by evaluating `f(row, col)` for every cell
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                values.push(f(row, col));
            }
        }
        Self { size, values }
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at (row, col). Panics if out of bounds, like slice indexing.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size + col]
    }

    /// One row as a slice
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.size;
        &self.values[start..start + self.size]
    }

    /// All values, row-major
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
