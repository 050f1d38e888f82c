//! Correlated and uncorrelated correlator fits.
//!
//! The correlated chi-square
//!
//! ```text
//! chi² = (ȳ - f)ᵀ C⁻¹ (ȳ - f)
//! ```
//!
//! is minimized as `‖U (ȳ - f)‖²` with `U` the Cholesky factor of the
//! inverse window correlation matrix, which is numerically better behaved
//! than forming the quadratic form directly. The uncorrelated weighted fit
//! exists both as a fallback metric and as the first stage of the standard
//! two-stage protocol: fit uncorrelated for stable starting values, then
//! refine with the correlated metric.

use crate::error::{AnalysisError, Result};
use crate::result::FitResult;
use crate::statistics::CorrelatedMetric;
use crate::types::Vector;

use super::goodness::chi_square_p_value;
use super::least_squares::LevenbergMarquardt;
use super::model::Model;

/// Validate shared preconditions and return the degrees of freedom,
/// `n_points - 1 - n_params`.
fn degrees_of_freedom(model: Model, ts: &[f64], ys: &[f64], p0: &[f64]) -> Result<usize> {
    if ts.len() != ys.len() {
        return Err(AnalysisError::Shape {
            expected: ts.len(),
            got: ys.len(),
            context: "fit time/value lengths",
        });
    }
    let n_params = model.param_count();
    if p0.len() != n_params {
        return Err(AnalysisError::Shape {
            expected: n_params,
            got: p0.len(),
            context: "initial parameter count",
        });
    }
    if ts.len() <= 1 + n_params {
        return Err(AnalysisError::Shape {
            expected: n_params + 2,
            got: ts.len(),
            context: "fit window (no degrees of freedom left)",
        });
    }
    Ok(ts.len() - 1 - n_params)
}

/// Weighted uncorrelated least-squares fit.
///
/// With `errors` present, residuals are scaled by `1/σ_i`; without, the
/// plain residual is minimized. Used standalone for diagonal-metric
/// fallback fits and as the pre-fit stage of [`fit_two_stage`].
///
/// # Errors
///
/// `Shape` on mismatched lengths, `Domain` on non-positive errors,
/// `FitConvergence` from the minimizer.
pub fn fit_uncorrelated(
    model: Model,
    ts: &[f64],
    ys: &[f64],
    errors: Option<&[f64]>,
    p0: &[f64],
) -> Result<FitResult> {
    let dof = degrees_of_freedom(model, ts, ys, p0)?;

    let weights = match errors {
        Some(errs) => {
            if errs.len() != ys.len() {
                return Err(AnalysisError::Shape {
                    expected: ys.len(),
                    got: errs.len(),
                    context: "fit error lengths",
                });
            }
            if let Some(&bad) = errs.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
                return Err(AnalysisError::Domain {
                    what: "fit weights (errors must be positive)",
                    value: bad,
                });
            }
            Some(errs.iter().map(|s| 1.0 / s).collect::<Vec<_>>())
        }
        None => None,
    };

    let residual = |params: &[f64]| -> Vector {
        let mut r = Vector::from_iterator(
            ys.len(),
            ts.iter()
                .zip(ys)
                .map(|(&t, &y)| y - model.eval(t, params)),
        );
        if let Some(w) = &weights {
            for (ri, wi) in r.iter_mut().zip(w) {
                *ri *= wi;
            }
        }
        r
    };

    let minimum = LevenbergMarquardt::default().minimize(residual, p0)?;
    Ok(FitResult {
        params: minimum.params,
        chi_square: minimum.chi_square,
        dof,
        p_value: chi_square_p_value(minimum.chi_square, dof),
    })
}

/// Correlated least-squares fit against a precomputed metric.
///
/// `ts` and `ys` must already be cut to the metric's window.
///
/// # Errors
///
/// `Shape` when the data do not match the metric dimension,
/// `FitConvergence` from the minimizer.
pub fn fit_correlated(
    model: Model,
    ts: &[f64],
    ys: &[f64],
    metric: &CorrelatedMetric,
    p0: &[f64],
) -> Result<FitResult> {
    let dof = degrees_of_freedom(model, ts, ys, p0)?;
    if metric.dim() != ys.len() {
        return Err(AnalysisError::Shape {
            expected: metric.dim(),
            got: ys.len(),
            context: "fit window vs metric dimension",
        });
    }

    let y_vec = Vector::from_column_slice(ys);
    let residual =
        |params: &[f64]| -> Vector { metric.whiten(&(&y_vec - model.eval_series(ts, params))) };

    let minimum = LevenbergMarquardt::default().minimize(residual, p0)?;
    Ok(FitResult {
        params: minimum.params,
        chi_square: minimum.chi_square,
        dof,
        p_value: chi_square_p_value(minimum.chi_square, dof),
    })
}

/// Two-stage fit: uncorrelated pre-fit from `p0`, correlated refinement
/// seeded with the pre-fit parameters.
pub fn fit_two_stage(
    model: Model,
    ts: &[f64],
    ys: &[f64],
    errors: Option<&[f64]>,
    metric: &CorrelatedMetric,
    p0: &[f64],
) -> Result<FitResult> {
    let pre = fit_uncorrelated(model, ts, ys, errors, p0)?;
    fit_correlated(model, ts, ys, metric, &pre.params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::FitWindow;
    use crate::types::Matrix;

    fn cosh_data(time_extent: usize, m: f64, a: f64) -> (Vec<f64>, Vec<f64>) {
        let model = Model::Cosh { time_extent };
        let ts: Vec<f64> = (0..=time_extent / 2).map(|t| t as f64).collect();
        let ys: Vec<f64> = ts.iter().map(|&t| model.eval(t, &[m, a])).collect();
        (ts, ys)
    }

    fn diagonal_metric(dim: usize, sigma: f64) -> CorrelatedMetric {
        let matrix = Matrix::from_diagonal_element(dim, dim, sigma * sigma);
        CorrelatedMetric::from_matrix(&matrix, FitWindow::new(0, 0), dim + 1).unwrap()
    }

    #[test]
    fn uncorrelated_fit_recovers_exact_parameters() {
        let (ts, ys) = cosh_data(32, 0.25, 1.0);
        let fit = fit_uncorrelated(
            Model::Cosh { time_extent: 32 },
            &ts,
            &ys,
            None,
            &[0.2, 0.8],
        )
        .unwrap();

        assert!((fit.params[0] - 0.25).abs() < 1e-8);
        assert!((fit.params[1] - 1.0).abs() < 1e-8);
        assert!(fit.chi_square < 1e-14);
        assert!(fit.p_value > 0.999);
        assert_eq!(fit.dof, 17 - 1 - 2);
    }

    #[test]
    fn correlated_fit_on_noiseless_data_has_zero_chi_square() {
        let (ts, ys) = cosh_data(32, 0.25, 1.0);
        let window = FitWindow::new(5, 0);
        let ts_cut = window.slice(&ts).unwrap();
        let ys_cut = window.slice(&ys).unwrap();
        let metric = diagonal_metric(ts_cut.len(), 0.01);

        let fit = fit_correlated(
            Model::Cosh { time_extent: 32 },
            ts_cut,
            ys_cut,
            &metric,
            &[0.3, 0.9],
        )
        .unwrap();

        assert!((fit.params[0] - 0.25).abs() < 1e-7);
        assert!((fit.params[1] - 1.0).abs() < 1e-7);
        assert!(fit.chi_square < 1e-10);
    }

    #[test]
    fn two_stage_matches_direct_correlated_fit_on_clean_data() {
        let (ts, ys) = cosh_data(24, 0.35, 2.0);
        let metric = diagonal_metric(ts.len(), 0.05);
        let errs = vec![0.05; ts.len()];

        let direct = fit_correlated(
            Model::Cosh { time_extent: 24 },
            &ts,
            &ys,
            &metric,
            &[0.3, 1.5],
        )
        .unwrap();
        let staged = fit_two_stage(
            Model::Cosh { time_extent: 24 },
            &ts,
            &ys,
            Some(&errs),
            &metric,
            &[0.3, 1.5],
        )
        .unwrap();

        assert!((direct.params[0] - staged.params[0]).abs() < 1e-7);
        assert!((direct.params[1] - staged.params[1]).abs() < 1e-7);
    }

    #[test]
    fn offset_model_recovers_offset() {
        let model = Model::CoshWithOffset { time_extent: 32 };
        let ts: Vec<f64> = (0..=16).map(|t| t as f64).collect();
        let truth = [0.4, 1.2, 0.33];
        let ys: Vec<f64> = ts.iter().map(|&t| model.eval(t, &truth)).collect();

        let fit = fit_uncorrelated(model, &ts, &ys, None, &[0.3, 1.0, 0.0]).unwrap();
        for (got, want) in fit.params.iter().zip(&truth) {
            assert!((got - want).abs() < 1e-6);
        }
    }

    #[test]
    fn rejects_degenerate_windows_and_bad_errors() {
        let model = Model::Cosh { time_extent: 8 };
        // Three points, two params: dof would be 0.
        let result = fit_uncorrelated(model, &[0.0, 1.0, 2.0], &[1.0, 0.5, 0.3], None, &[0.1, 1.0]);
        assert!(matches!(result, Err(AnalysisError::Shape { .. })));

        let (ts, ys) = cosh_data(8, 0.3, 1.0);
        let mut errs = vec![0.1; ts.len()];
        errs[2] = 0.0;
        let result = fit_uncorrelated(model, &ts, &ys, Some(&errs), &[0.1, 1.0]);
        assert!(matches!(result, Err(AnalysisError::Domain { .. })));
    }

    #[test]
    fn non_finite_data_fail_as_convergence_error() {
        let (ts, mut ys) = cosh_data(16, 0.3, 1.0);
        ys[3] = f64::NAN;
        let result = fit_uncorrelated(Model::Cosh { time_extent: 16 }, &ts, &ys, None, &[0.3, 1.0]);
        assert!(matches!(result, Err(AnalysisError::FitConvergence { .. })));
    }
}
