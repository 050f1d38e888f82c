//! Core data types: time series, sample sets, linear-algebra aliases.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Dynamically sized covariance/correlation matrix.
pub type Matrix = DMatrix<f64>;

/// Dynamically sized column vector over time slices.
pub type Vector = DVector<f64>;

/// One correlator measurement: real samples indexed by discrete time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries(Vec<f64>);

impl TimeSeries {
    /// Wrap raw per-time-slice values.
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Build a real series from the (re, im) pairs the correlator loader
    /// hands over. The imaginary parts are statistical noise on a
    /// zero-momentum correlator and are dropped.
    pub fn from_complex_pairs(pairs: &[(f64, f64)]) -> Self {
        Self(pairs.iter().map(|&(re, _im)| re).collect())
    }

    /// Number of time slices.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the series holds no slices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying values.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consume the series, returning the underlying values.
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    /// View as an nalgebra vector (copies).
    pub fn to_vector(&self) -> Vector {
        Vector::from_column_slice(&self.0)
    }
}

impl std::ops::Index<usize> for TimeSeries {
    type Output = f64;

    fn index(&self, t: usize) -> &f64 {
        &self.0[t]
    }
}

impl From<Vec<f64>> for TimeSeries {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// An ordered ensemble of time series, one per configuration.
///
/// All series share the same time extent; the constructor rejects ragged
/// input so downstream matrix code can rely on rectangular data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    series: Vec<TimeSeries>,
    time_extent: usize,
}

impl SampleSet {
    /// Build a sample set, validating that every series has the same length
    /// and that there is at least one configuration.
    pub fn new(series: Vec<TimeSeries>) -> Result<Self> {
        let Some(first) = series.first() else {
            return Err(AnalysisError::Shape {
                expected: 1,
                got: 0,
                context: "sample set configuration count",
            });
        };
        let time_extent = first.len();
        if time_extent == 0 {
            return Err(AnalysisError::Shape {
                expected: 1,
                got: 0,
                context: "sample set time extent",
            });
        }
        for s in &series {
            if s.len() != time_extent {
                return Err(AnalysisError::Shape {
                    expected: time_extent,
                    got: s.len(),
                    context: "sample set series length",
                });
            }
        }
        Ok(Self {
            series,
            time_extent,
        })
    }

    /// Number of configurations.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// True when the set holds no configurations (never, post-construction).
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Shared length of the member series.
    pub fn time_extent(&self) -> usize {
        self.time_extent
    }

    /// Borrow the member series.
    pub fn series(&self) -> &[TimeSeries] {
        &self.series
    }

    /// Per-slice mean over configurations.
    pub fn mean_series(&self) -> TimeSeries {
        let n = self.series.len() as f64;
        let mut mean = vec![0.0; self.time_extent];
        for s in &self.series {
            for (m, &x) in mean.iter_mut().zip(s.as_slice()) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }
        TimeSeries(mean)
    }

    /// Per-slice standard deviation of the mean,
    /// `sqrt(sum (x - x̄)² / (N (N-1)))`.
    ///
    /// Zero for a single configuration.
    pub fn error_series(&self) -> TimeSeries {
        let n = self.series.len();
        if n < 2 {
            return TimeSeries(vec![0.0; self.time_extent]);
        }
        let mean = self.mean_series();
        let mut var = vec![0.0; self.time_extent];
        for s in &self.series {
            for (v, (&x, &m)) in var
                .iter_mut()
                .zip(s.as_slice().iter().zip(mean.as_slice()))
            {
                let d = x - m;
                *v += d * d;
            }
        }
        let norm = (n * (n - 1)) as f64;
        for v in &mut var {
            *v = (*v / norm).sqrt();
        }
        TimeSeries(var)
    }

    /// Build a resampled set by row selection. Indices come from the
    /// bootstrap engine and must be in range.
    pub fn select(&self, indices: &[usize]) -> Self {
        let series = indices.iter().map(|&i| self.series[i].clone()).collect();
        Self {
            series,
            time_extent: self.time_extent,
        }
    }
}
