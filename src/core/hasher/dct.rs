//! Two-dimensional type-II discrete cosine transform.
//!
//! Computes, for every output cell (u, v):
//!
//! ```text
//! F(u,v) = c(u)·c(v)/4 · Σi Σj f(i,j) · cos((2i+1)uπ / 2N) · cos((2j+1)vπ / 2N)
//! ```
//!
//! with `c(0) = 1/√2` and `c(k) = 1` otherwise. The sum is separable, so the
//! transform runs as a row pass followed by a column pass over a cosine table
//! built once per transform size: O(N³) instead of the direct O(N⁴).

use super::matrix::{CoefficientMatrix, SquareMatrix};
use crate::error::ConfigError;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// A DCT of fixed size with its precomputed basis.
///
/// Read-only after construction, so one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct DctTransform {
    size: usize,
    /// c(k) normalisation factors
    scale: Vec<f64>,
    /// `cosines[k * size + i] = cos((2i+1)kπ / 2N)`
    cosines: Vec<f64>,
}

impl DctTransform {
    /// Precompute the basis for an N×N transform
    pub fn new(size: usize) -> Self {
        let mut scale = vec![1.0; size];
        if let Some(first) = scale.first_mut() {
            *first = FRAC_1_SQRT_2;
        }

        let n = size as f64;
        let cosines = (0..size)
            .flat_map(|k| {
                (0..size).map(move |i| (((2 * i + 1) as f64 / (2.0 * n)) * k as f64 * PI).cos())
            })
            .collect();

        Self {
            size,
            scale,
            cosines,
        }
    }

    /// The N this transform was built for
    pub fn size(&self) -> usize {
        self.size
    }

    /// Transform an N×N matrix into its N×N coefficient matrix
    pub fn transform(&self, input: &SquareMatrix) -> Result<CoefficientMatrix, ConfigError> {
        let n = self.size;
        if input.size() != n {
            return Err(ConfigError::MatrixSizeMismatch {
                expected: n,
                actual: input.size(),
            });
        }

        // Row pass: rows[i][v] = Σj f(i,j)·cos_v(j)
        let mut rows = vec![0.0; n * n];
        for i in 0..n {
            let src = input.row(i);
            for v in 0..n {
                rows[i * n + v] = dot(src, self.basis(v));
            }
        }

        // Column pass over the row results, then normalise
        let mut coefficients = vec![0.0; n * n];
        for u in 0..n {
            let basis = self.basis(u);
            for v in 0..n {
                let sum: f64 = (0..n).map(|i| rows[i * n + v] * basis[i]).sum();
                coefficients[u * n + v] = sum * self.scale[u] * self.scale[v] / 4.0;
            }
        }

        SquareMatrix::from_vec(n, coefficients)
    }

    fn basis(&self, k: usize) -> &[f64] {
        &self.cosines[k * self.size..(k + 1) * self.size]
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
