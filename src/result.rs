//! Report types produced by the analysis.

use serde::{Deserialize, Serialize};

use crate::statistics::Distribution;

/// Outcome of a single least-squares fit.
///
/// Produced once per sample set or draw and consumed immediately by the
/// derived-quantity pipeline; only the central fits survive into the
/// ensemble report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Fitted parameter vector, in model order.
    pub params: Vec<f64>,
    /// Chi-square at the minimum (correlated or weighted, per the metric).
    pub chi_square: f64,
    /// Degrees of freedom, `n_points - 1 - n_params`.
    pub dof: usize,
    /// Chi-square survival probability at the minimum.
    ///
    /// A value near zero signals a poor model choice or an underestimated
    /// covariance; it is reported, never fatal.
    pub p_value: f64,
}

/// Point estimate of one observable with its bootstrap statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observable {
    /// Value from the original, unresampled data.
    pub value: f64,
    /// Mean of the bootstrap draws.
    pub mean: f64,
    /// Population standard deviation of the draws.
    pub error: f64,
    /// Asymmetric error: distance from the draw median down to the lower
    /// percentile bound.
    pub error_low: f64,
    /// Asymmetric error: distance from the draw median up to the upper
    /// percentile bound.
    pub error_high: f64,
}

impl Observable {
    /// Summarize a scalar bootstrap distribution.
    ///
    /// `low` and `high` are percentile bounds in percent units.
    pub fn from_distribution(dist: &Distribution<f64>, low: f64, high: f64) -> Self {
        let asym = dist.percentile_error(low, high);
        Self {
            value: *dist.central(),
            mean: dist.mean(),
            error: dist.error(),
            error_low: asym.below,
            error_high: asym.above,
        }
    }
}

/// Literature values for one ensemble, for comparison columns.
///
/// Loaded by the caller and passed in read-only; the core never hardcodes
/// ensemble tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Published `a₀ · m_π` value.
    pub a0_m2: f64,
    /// Its quoted error.
    pub a0_m2_err: f64,
    /// Published `m_π / f_π` value.
    pub mpi_over_fpi: f64,
    /// Its quoted error.
    pub mpi_over_fpi_err: f64,
}

/// Final report for one ensemble analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleReport {
    /// Ensemble name, as given by the caller.
    pub ensemble: String,
    /// Spatial lattice extent `L`.
    pub spatial_extent: usize,
    /// Temporal lattice extent `T` of the raw series.
    pub time_extent: usize,
    /// Number of configurations analyzed.
    pub n_configurations: usize,
    /// Bootstrap draws attempted.
    pub n_draws_requested: usize,
    /// Bootstrap draws surviving the per-draw error policy.
    pub n_draws_used: usize,

    /// Single-particle mass from the two-point correlator.
    pub m2: Observable,
    /// Two-particle energy from the four-point correlator.
    pub m4: Observable,
    /// S-wave scattering length.
    pub a0: Observable,
    /// The dimensionless product `a₀ · m₂`.
    pub a0_m2: Observable,
    /// P-value of the two-point fit across draws.
    pub p_value_2: Observable,
    /// P-value of the four-point fit across draws.
    pub p_value_4: Observable,

    /// Central two-point fit.
    pub central_fit_2: FitResult,
    /// Central four-point fit.
    pub central_fit_4: FitResult,

    /// Per-draw failures and other non-fatal findings, with draw indices.
    pub warnings: Vec<String>,
    /// Literature comparison values, when the caller supplied them.
    pub reference: Option<ReferencePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observable_summarizes_distribution() {
        let draws: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
        let obs = Observable::from_distribution(&Distribution::new(0.48, draws), 15.87, 84.13);

        assert_eq!(obs.value, 0.48);
        assert!((obs.mean - 0.5).abs() < 1e-9);
        assert!(obs.error > 0.2 && obs.error < 0.4);
        assert!(obs.error_low > 0.0 && obs.error_high > 0.0);
    }

    #[test]
    fn observable_with_no_draws_has_nan_statistics() {
        let obs = Observable::from_distribution(&Distribution::new(1.5, vec![]), 15.87, 84.13);
        assert_eq!(obs.value, 1.5);
        assert!(obs.mean.is_nan());
        assert!(obs.error.is_nan());
    }
}
