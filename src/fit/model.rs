//! Correlator fit models.
//!
//! Each model is a parameterized function object: fixed hyperparameters
//! (the lattice time extent) live in the variant, free parameters are
//! passed to `eval`. This replaces ad-hoc closure factories with a type
//! the fitter and the report can both name.

use serde::{Deserialize, Serialize};

use crate::types::Vector;

/// A nonlinear correlator model `f(t, params)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    /// Symmetric two-exponential decay on a periodic lattice of temporal
    /// extent `time_extent`:
    ///
    /// ```text
    /// f(t; m, a) = a (exp(-m t) + exp(-m (T - t)))
    /// ```
    ///
    /// Parameters `[m, a]`. The standard single-particle correlator shape.
    Cosh {
        /// Temporal lattice extent `T`.
        time_extent: usize,
    },

    /// [`Model::Cosh`] plus a constant offset, parameters `[m, a, b]`.
    ///
    /// Four-point correlators develop a constant contribution from
    /// around-the-world propagation; the offset absorbs it.
    CoshWithOffset {
        /// Temporal lattice extent `T`.
        time_extent: usize,
    },

    /// Plain decaying exponential with offset, parameters `[m, a, b]`.
    Exp,
}

impl Model {
    /// Number of free parameters.
    pub fn param_count(&self) -> usize {
        match self {
            Model::Cosh { .. } => 2,
            Model::CoshWithOffset { .. } => 3,
            Model::Exp => 3,
        }
    }

    /// Human-readable model name for reports.
    pub fn name(&self) -> &'static str {
        match self {
            Model::Cosh { .. } => "cosh",
            Model::CoshWithOffset { .. } => "cosh+offset",
            Model::Exp => "exp",
        }
    }

    /// Evaluate the model at time `t`.
    ///
    /// `params` must have length [`Model::param_count`].
    pub fn eval(&self, t: f64, params: &[f64]) -> f64 {
        match *self {
            Model::Cosh { time_extent } => {
                let (m, a) = (params[0], params[1]);
                a * ((-m * t).exp() + (-m * (time_extent as f64 - t)).exp())
            }
            Model::CoshWithOffset { time_extent } => {
                let (m, a, b) = (params[0], params[1], params[2]);
                a * ((-m * t).exp() + (-m * (time_extent as f64 - t)).exp()) + b
            }
            Model::Exp => {
                let (m, a, b) = (params[0], params[1], params[2]);
                a * (-m * t).exp() + b
            }
        }
    }

    /// Evaluate the model over a slice of times.
    pub fn eval_series(&self, ts: &[f64], params: &[f64]) -> Vector {
        Vector::from_iterator(ts.len(), ts.iter().map(|&t| self.eval(t, params)))
    }
}
