//! Error taxonomy for the analysis core.
//!
//! Errors fall into two recovery classes. Shape and singular-matrix errors
//! are fatal for the input they occur on; convergence and domain errors are
//! expected to happen on individual bootstrap draws and are skipped by the
//! orchestrator, which records them instead of aborting the ensemble.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// All failure modes of the resampling and fitting core.
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// Malformed or mismatched array lengths. Fatal for the offending input.
    #[error("shape mismatch in {context}: expected {expected}, got {got}")]
    Shape {
        /// Expected length or count.
        expected: usize,
        /// Observed length or count.
        got: usize,
        /// What was being validated.
        context: &'static str,
    },

    /// The truncated covariance window is not invertible.
    ///
    /// Fatal for the ensemble; the caller can retry with a narrower window
    /// or fall back to an uncorrelated fit.
    #[error(
        "covariance window of dimension {dim} is singular ({n_samples} samples); \
         widen the sample set or shrink the window"
    )]
    SingularMatrix {
        /// Dimension of the truncated matrix.
        dim: usize,
        /// Number of samples it was estimated from.
        n_samples: usize,
    },

    /// A single least-squares minimization failed to converge.
    ///
    /// Carries the last attempted parameters for diagnostics. Recoverable:
    /// the orchestrator skips the offending draw.
    #[error("fit did not converge after {iterations} iterations (last params {last_params:?})")]
    FitConvergence {
        /// Iterations performed before giving up.
        iterations: usize,
        /// Parameter vector at the point of failure.
        last_params: Vec<f64>,
    },

    /// Invalid input to a mathematical function (arccosh argument below 1,
    /// non-positive mass, negative discriminant). Recoverable per draw.
    #[error("domain error in {what}: {value}")]
    Domain {
        /// The operation that rejected its input.
        what: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Every bootstrap draw failed; the ensemble has no distribution.
    #[error("all {n_draws} bootstrap draws failed")]
    AllDrawsFailed {
        /// Number of draws attempted.
        n_draws: usize,
    },

    /// Too many draws failed for the aggregates to be trustworthy.
    #[error("{failed} of {total} bootstrap draws failed, above the configured tolerance")]
    ExcessiveDrawFailures {
        /// Number of failed draws.
        failed: usize,
        /// Number of draws attempted.
        total: usize,
    },
}
