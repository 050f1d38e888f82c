//! Correlation matrix estimation and the correlated fit metric.
//!
//! Neighboring time slices of a correlator are measured on the same
//! configurations and are strongly correlated. The correlated chi-square
//! accounts for that through the inverse of the sample correlation matrix,
//! estimated over a truncated time window and applied through its Cholesky
//! factor rather than as a naive inverse.

use nalgebra::Cholesky;

use crate::error::{AnalysisError, Result};
use crate::types::{Matrix, SampleSet, Vector};

/// Sample correlation matrix across time slices,
///
/// ```text
/// C[i, j] = 1/(N (N-1)) * sum_k (x_k[i] - x̄[i]) (x_k[j] - x̄[j])
/// ```
///
/// estimated from the `N` member series. For fewer than two series there is
/// no correlation information and the zero matrix is returned; any attempt
/// to invert it fails downstream as singular.
pub fn correlation_matrix(samples: &SampleSet) -> Matrix {
    let n = samples.len();
    let dim = samples.time_extent();
    if n < 2 {
        return Matrix::zeros(dim, dim);
    }

    let mean = samples.mean_series();
    let mut matrix = Matrix::zeros(dim, dim);
    for s in samples.series() {
        let dev = Vector::from_iterator(
            dim,
            s.as_slice()
                .iter()
                .zip(mean.as_slice())
                .map(|(&x, &m)| x - m),
        );
        matrix += &dev * dev.transpose();
    }
    matrix /= (n * (n - 1)) as f64;
    matrix
}

/// Truncation window over time slices: keeps `[omit_pre, len - omit_post)`.
///
/// Early slices are contaminated by excited states, late ones by noise;
/// both destabilize the matrix inverse and are cut before inversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitWindow {
    /// Slices dropped from the start of the series.
    pub omit_pre: usize,
    /// Slices dropped from the end of the series.
    pub omit_post: usize,
}

impl FitWindow {
    /// Build a window.
    pub fn new(omit_pre: usize, omit_post: usize) -> Self {
        Self {
            omit_pre,
            omit_post,
        }
    }

    /// Resolve the window against a series of length `len`.
    ///
    /// # Errors
    ///
    /// `Shape` when the window leaves no slices.
    pub fn range(&self, len: usize) -> Result<std::ops::Range<usize>> {
        let end = len.saturating_sub(self.omit_post);
        if self.omit_pre >= end {
            return Err(AnalysisError::Shape {
                expected: self.omit_pre + self.omit_post + 1,
                got: len,
                context: "fit window (omits leave no slices)",
            });
        }
        Ok(self.omit_pre..end)
    }

    /// Slice `data` down to the window.
    pub fn slice<'a>(&self, data: &'a [f64]) -> Result<&'a [f64]> {
        let range = self.range(data.len())?;
        Ok(&data[range])
    }
}

/// The correlated metric over a fit window.
///
/// Holds the upper-triangular factor `U` with `UᵀU = C_w⁻¹`, where `C_w` is
/// the window-truncated correlation matrix. Whitened residuals `U·(ȳ - f)`
/// turn the correlated chi-square into a plain sum of squares, which is
/// what the least-squares machinery minimizes.
#[derive(Debug, Clone)]
pub struct CorrelatedMetric {
    whitening: Matrix,
    dim: usize,
}

impl CorrelatedMetric {
    /// Estimate the correlation matrix from `samples` and build the metric.
    pub fn from_samples(samples: &SampleSet, window: FitWindow) -> Result<Self> {
        let matrix = correlation_matrix(samples);
        Self::from_matrix(&matrix, window, samples.len())
    }

    /// Build the metric from a precomputed correlation matrix.
    ///
    /// `n_samples` is the number of series the matrix was estimated from;
    /// a window at least that wide is rank deficient by construction and
    /// rejected up front.
    ///
    /// # Errors
    ///
    /// `SingularMatrix` when the truncated matrix is not positive definite.
    pub fn from_matrix(matrix: &Matrix, window: FitWindow, n_samples: usize) -> Result<Self> {
        let range = window.range(matrix.nrows())?;
        let dim = range.len();
        if n_samples <= dim {
            return Err(AnalysisError::SingularMatrix { dim, n_samples });
        }

        let truncated = matrix
            .view((range.start, range.start), (dim, dim))
            .into_owned();
        let singular = || AnalysisError::SingularMatrix { dim, n_samples };

        let factorized = Cholesky::new(truncated).ok_or_else(singular)?;
        let inverse = factorized.inverse();
        let factorized_inverse = Cholesky::new(inverse).ok_or_else(singular)?;
        let whitening = factorized_inverse.l().transpose();

        Ok(Self { whitening, dim })
    }

    /// Dimension of the truncated window.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Apply the Cholesky factor of the inverse to a residual vector.
    pub fn whiten(&self, residual: &Vector) -> Vector {
        debug_assert_eq!(residual.len(), self.dim);
        &self.whitening * residual
    }

    /// The correlated chi-square `rᵀ C_w⁻¹ r` of a residual vector.
    pub fn chi_square(&self, residual: &Vector) -> f64 {
        self.whiten(residual).norm_squared()
    }
}
