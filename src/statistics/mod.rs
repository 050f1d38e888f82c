//! Statistical infrastructure: folding, resampling, distributions,
//! covariance estimation.
//!
//! This module owns everything between raw configuration data and the
//! inputs of the correlated fitter:
//! - Folding of periodic correlators around the temporal midpoint
//! - Bootstrap draw generation with deterministic per-draw seeding
//! - The [`Distribution`] abstraction that propagates errors draw-wise
//! - Correlation matrix estimation and its Cholesky-factored inverse

mod bootstrap;
mod covariance;
mod distribution;
mod fold;
mod percentile;

pub use bootstrap::{counter_seed, draw_indices, make_draws};
pub use covariance::{correlation_matrix, CorrelatedMetric, FitWindow};
pub use distribution::{AsymmetricError, Distribution, DrawFailure};
pub use fold::{fold, fold_all};
pub use percentile::{median, percentile};
