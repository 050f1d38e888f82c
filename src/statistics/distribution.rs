//! The bootstrap distribution abstraction.
//!
//! A [`Distribution`] pairs the value of an estimator on the original
//! sample set (the central value) with the values on every resampled draw.
//! All transforms are draw-wise: the same scalar function is applied
//! independently to the central value and to each draw. That contract is
//! what lets errors propagate correctly through arbitrary nonlinear
//! transforms of fitted parameters.

use crate::constants::{PERCENTILE_HIGH, PERCENTILE_LOW};
use crate::error::{AnalysisError, Result};
use crate::types::SampleSet;

use super::percentile::percentile;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A draw that could not be evaluated, with the reason.
#[derive(Debug, Clone)]
pub struct DrawFailure {
    /// Index of the draw in the original draw list.
    pub draw: usize,
    /// Why the estimator rejected it.
    pub error: AnalysisError,
}

/// Asymmetric error from percentile bounds of the draw distribution.
#[derive(Debug, Clone, Copy)]
pub struct AsymmetricError {
    /// Median of the draws.
    pub median: f64,
    /// Distance from the median down to the lower percentile.
    pub below: f64,
    /// Distance from the median up to the upper percentile.
    pub above: f64,
}

/// A derived quantity together with its bootstrap draws.
///
/// The central value is computed from the original, unresampled data and is
/// never part of the draw list.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution<T> {
    central: T,
    draws: Vec<T>,
}

impl<T> Distribution<T> {
    /// Assemble from an already-computed central value and draws.
    pub fn new(central: T, draws: Vec<T>) -> Self {
        Self { central, draws }
    }

    /// The estimator applied to the original sample set.
    pub fn central(&self) -> &T {
        &self.central
    }

    /// The estimator applied to each bootstrap draw.
    pub fn draws(&self) -> &[T] {
        &self.draws
    }

    /// Number of draws.
    pub fn n_draws(&self) -> usize {
        self.draws.len()
    }

    /// Apply a pure transform draw-wise.
    ///
    /// Draw `i` of the output corresponds to draw `i` of the input, so
    /// distributions derived from the same draws stay aligned.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Distribution<U> {
        Distribution {
            central: f(&self.central),
            draws: self.draws.iter().map(f).collect(),
        }
    }

    /// Apply a fallible transform draw-wise, dropping failed draws.
    ///
    /// A failure on the central value is fatal; failures on draws are
    /// collected and the surviving draws keep their original order. Note
    /// that dropping draws breaks index alignment with sibling
    /// distributions; transform a combined per-draw record instead when
    /// several quantities must stay aligned.
    pub fn try_map<U>(
        &self,
        f: impl Fn(&T) -> Result<U>,
    ) -> Result<(Distribution<U>, Vec<DrawFailure>)> {
        let central = f(&self.central)?;
        let mut draws = Vec::with_capacity(self.draws.len());
        let mut failures = Vec::new();
        for (i, draw) in self.draws.iter().enumerate() {
            match f(draw) {
                Ok(v) => draws.push(v),
                Err(error) => failures.push(DrawFailure { draw: i, error }),
            }
        }
        Ok((Distribution { central, draws }, failures))
    }
}

impl<T: Send> Distribution<T> {
    /// Evaluate an estimator on the original samples and on every draw.
    ///
    /// The estimator must be pure: draws are conceptually independent and
    /// are evaluated in parallel when the `parallel` feature is enabled.
    /// Any failure, central or per-draw, aborts the construction; use
    /// [`Distribution::from_estimator_skipping`] for the skip-and-record
    /// policy.
    pub fn from_estimator<F>(estimator: F, samples: &SampleSet, draws: &[SampleSet]) -> Result<Self>
    where
        F: Fn(&SampleSet) -> Result<T> + Sync,
    {
        let central = estimator(samples)?;
        let evaluated = evaluate_draws(&estimator, draws);
        let draws = evaluated.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(Self { central, draws })
    }

    /// Like [`Distribution::from_estimator`], but failed draws are dropped
    /// and reported instead of aborting.
    ///
    /// Only a failure on the central value is fatal. A failed draw is
    /// excluded from the distribution entirely; it is never zero-filled.
    pub fn from_estimator_skipping<F>(
        estimator: F,
        samples: &SampleSet,
        draws: &[SampleSet],
    ) -> Result<(Self, Vec<DrawFailure>)>
    where
        F: Fn(&SampleSet) -> Result<T> + Sync,
    {
        let central = estimator(samples)?;
        let evaluated = evaluate_draws(&estimator, draws);

        let mut kept = Vec::with_capacity(evaluated.len());
        let mut failures = Vec::new();
        for (i, outcome) in evaluated.into_iter().enumerate() {
            match outcome {
                Ok(v) => kept.push(v),
                Err(error) => failures.push(DrawFailure { draw: i, error }),
            }
        }
        Ok((Self { central, draws: kept }, failures))
    }
}

#[cfg(feature = "parallel")]
fn evaluate_draws<T, F>(estimator: &F, draws: &[SampleSet]) -> Vec<Result<T>>
where
    T: Send,
    F: Fn(&SampleSet) -> Result<T> + Sync,
{
    draws.par_iter().map(estimator).collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_draws<T, F>(estimator: &F, draws: &[SampleSet]) -> Vec<Result<T>>
where
    T: Send,
    F: Fn(&SampleSet) -> Result<T> + Sync,
{
    draws.iter().map(estimator).collect()
}

impl Distribution<f64> {
    /// Mean of the draws. NaN when there are no draws.
    pub fn mean(&self) -> f64 {
        if self.draws.is_empty() {
            return f64::NAN;
        }
        self.draws.iter().sum::<f64>() / self.draws.len() as f64
    }

    /// Population standard deviation of the draws (the bootstrap error).
    /// NaN when there are no draws.
    ///
    /// The draws themselves already are the resampling distribution, so no
    /// sample-size correction is applied.
    pub fn error(&self) -> f64 {
        if self.draws.is_empty() {
            return f64::NAN;
        }
        let mean = self.mean();
        let var = self
            .draws
            .iter()
            .map(|x| {
                let d = x - mean;
                d * d
            })
            .sum::<f64>()
            / self.draws.len() as f64;
        var.sqrt()
    }

    /// Asymmetric error from percentile bounds (percent units).
    ///
    /// With the default bounds of 15.87 and 84.13 the interval covers one
    /// sigma on each side under normality.
    pub fn percentile_error(&self, low: f64, high: f64) -> AsymmetricError {
        if self.draws.is_empty() {
            return AsymmetricError {
                median: f64::NAN,
                below: f64::NAN,
                above: f64::NAN,
            };
        }
        let mut scratch = self.draws.clone();
        let median = percentile(&mut scratch, 50.0);
        let lo = percentile(&mut scratch, low);
        let hi = percentile(&mut scratch, high);
        AsymmetricError {
            median,
            below: median - lo,
            above: hi - median,
        }
    }

    /// [`Distribution::percentile_error`] with the standard one-sigma bounds.
    pub fn sigma_percentile_error(&self) -> AsymmetricError {
        self.percentile_error(PERCENTILE_LOW, PERCENTILE_HIGH)
    }
}
