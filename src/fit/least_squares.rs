//! Damped nonlinear least squares (Levenberg–Marquardt).
//!
//! Minimizes the squared norm of an arbitrary residual vector function
//! with a forward-difference Jacobian. The damping term interpolates
//! between Gauss–Newton steps (small damping) and scaled gradient descent
//! (large damping); the factor adapts multiplicatively on accepted and
//! rejected steps.

use crate::error::{AnalysisError, Result};
use crate::types::{Matrix, Vector};

/// Tuning knobs for the minimizer. The defaults are forgiving enough for
/// correlator fits seeded by an uncorrelated pre-fit.
#[derive(Debug, Clone, Copy)]
pub struct LevenbergMarquardt {
    /// Outer iteration limit before giving up.
    pub max_iterations: usize,
    /// Relative chi-square improvement below which the fit is converged.
    pub tolerance: f64,
    /// Initial damping strength.
    pub initial_damping: f64,
    /// Multiplicative damping adaptation on rejected/accepted steps.
    pub damping_factor: f64,
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-12,
            initial_damping: 1e-3,
            damping_factor: 10.0,
        }
    }
}

/// A located minimum of the squared residual norm.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Parameters at the minimum.
    pub params: Vec<f64>,
    /// Final squared residual norm.
    pub chi_square: f64,
    /// Outer iterations used.
    pub iterations: usize,
}

const DAMPING_LIMIT: f64 = 1e12;
const GRADIENT_TOLERANCE: f64 = 1e-12;

impl LevenbergMarquardt {
    /// Minimize `‖residual(p)‖²` starting from `p0`.
    ///
    /// # Errors
    ///
    /// `FitConvergence` when the initial residual is not finite, when no
    /// downhill step exists up to the damping limit, or when the iteration
    /// limit is exhausted. The error carries the last parameter vector.
    pub fn minimize<F>(&self, residual: F, p0: &[f64]) -> Result<Minimum>
    where
        F: Fn(&[f64]) -> Vector,
    {
        let mut params = p0.to_vec();
        let mut res = residual(&params);
        if !res.iter().all(|v| v.is_finite()) {
            return Err(AnalysisError::FitConvergence {
                iterations: 0,
                last_params: params,
            });
        }
        let mut chi = res.norm_squared();
        let mut damping = self.initial_damping;

        for iteration in 1..=self.max_iterations {
            if chi == 0.0 {
                return Ok(Minimum {
                    params,
                    chi_square: chi,
                    iterations: iteration - 1,
                });
            }

            let jacobian = forward_jacobian(&residual, &params, &res);
            let hessian = jacobian.transpose() * &jacobian;
            let gradient = jacobian.transpose() * &res;

            if gradient.amax() < GRADIENT_TOLERANCE {
                return Ok(Minimum {
                    params,
                    chi_square: chi,
                    iterations: iteration - 1,
                });
            }

            let mut stepped = false;
            while damping < DAMPING_LIMIT {
                let mut damped = hessian.clone();
                for i in 0..damped.nrows() {
                    damped[(i, i)] += damping * hessian[(i, i)].max(1e-12);
                }

                let Some(delta) = damped.lu().solve(&gradient) else {
                    damping *= self.damping_factor;
                    continue;
                };

                let trial: Vec<f64> = params
                    .iter()
                    .zip(delta.iter())
                    .map(|(p, d)| p - d)
                    .collect();
                let trial_res = residual(&trial);
                let trial_chi = trial_res.norm_squared();

                if trial_chi.is_finite() && trial_chi <= chi {
                    let improvement = chi - trial_chi;
                    params = trial;
                    res = trial_res;
                    chi = trial_chi;
                    damping = (damping / self.damping_factor).max(1e-12);
                    stepped = true;

                    if improvement <= self.tolerance * chi.max(f64::MIN_POSITIVE) {
                        return Ok(Minimum {
                            params,
                            chi_square: chi,
                            iterations: iteration,
                        });
                    }
                    break;
                }
                damping *= self.damping_factor;
            }

            if !stepped {
                // No downhill direction left. At a genuine minimum the
                // gradient check above fires first; reaching this point
                // means the surface is pathological for these data.
                return Err(AnalysisError::FitConvergence {
                    iterations: iteration,
                    last_params: params,
                });
            }
        }

        Err(AnalysisError::FitConvergence {
            iterations: self.max_iterations,
            last_params: params,
        })
    }
}

/// Forward-difference Jacobian of the residual, column per parameter.
fn forward_jacobian<F>(residual: &F, params: &[f64], base: &Vector) -> Matrix
where
    F: Fn(&[f64]) -> Vector,
{
    let mut jacobian = Matrix::zeros(base.len(), params.len());
    let mut work = params.to_vec();
    for j in 0..params.len() {
        let step = f64::EPSILON.sqrt() * work[j].abs().max(1e-8);
        let original = work[j];
        work[j] = original + step;
        let shifted = residual(&work);
        work[j] = original;
        jacobian.set_column(j, &((shifted - base) / step));
    }
    jacobian
}
