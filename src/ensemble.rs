//! Per-ensemble orchestration.
//!
//! Wires the stages together for one ensemble of configurations:
//! fold, resample, estimate the correlated metric, fit the central values
//! and every draw, derive physical quantities, aggregate. The stage order
//! is `Loaded → Folded → Resampled → Fitted → Reported`; every stage is a
//! pure function of its inputs, so reruns with the same seed reproduce the
//! report exactly.

use crate::config::Config;
use crate::error::{AnalysisError, Result};
use crate::fit::{fit_two_stage, fit_uncorrelated, Model};
use crate::physics;
use crate::result::{EnsembleReport, FitResult, Observable, ReferencePoint};
use crate::statistics::{draw_indices, fold_all, CorrelatedMetric, Distribution};
use crate::types::{SampleSet, TimeSeries};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One ensemble's raw data and lattice geometry.
#[derive(Debug, Clone)]
pub struct EnsembleInput {
    /// Ensemble name for the report and warnings.
    pub name: String,
    /// Two-point correlators, one unfolded series per configuration.
    pub two_point: SampleSet,
    /// Four-point correlators, configuration-aligned with `two_point`.
    pub four_point: SampleSet,
    /// Temporal lattice extent `T`; the raw series length.
    pub time_extent: usize,
    /// Spatial lattice extent `L`, entering the scattering-length formula.
    pub spatial_extent: usize,
    /// Optional literature values, copied into the report.
    pub reference: Option<ReferencePoint>,
}

/// Derived quantities of one draw (or of the central value).
///
/// Kept as one record per draw so the observables stay draw-aligned even
/// when individual draws fail and are dropped.
#[derive(Debug, Clone, Copy)]
struct DrawEstimates {
    m2: f64,
    m4: f64,
    a0: f64,
    a0_m2: f64,
    p_value_2: f64,
    p_value_4: f64,
}

struct PairFit {
    estimates: DrawEstimates,
    fit_2: FitResult,
    fit_4: FitResult,
}

/// Analysis driver for one ensemble.
///
/// # Example
///
/// ```ignore
/// use corrfit::{EnsembleAnalysis, EnsembleInput};
///
/// let report = EnsembleAnalysis::new()
///     .draws(500)
///     .seed(42)
///     .window(5, 0)
///     .analyze(&input)?;
///
/// println!("a0*m2 = {} ± {}", report.a0_m2.value, report.a0_m2.error);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnsembleAnalysis {
    config: Config,
}

impl EnsembleAnalysis {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a reduced draw count for exploratory runs.
    ///
    /// Settings:
    /// - 100 bootstrap draws (vs 3 per configuration by default)
    /// - 0.5 tolerated draw failure rate (vs 0.2 default)
    pub fn quick() -> Self {
        Self {
            config: Config {
                n_draws: Some(100),
                max_draw_failure_rate: 0.5,
                ..Config::default()
            },
        }
    }

    /// Create from an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the bootstrap draw count.
    pub fn draws(mut self, n_draws: usize) -> Self {
        self.config.n_draws = Some(n_draws);
        self
    }

    /// Set the base seed for draw generation.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the truncation window (slices omitted before and after).
    pub fn window(mut self, omit_pre: usize, omit_post: usize) -> Self {
        self.config.window = crate::statistics::FitWindow::new(omit_pre, omit_post);
        self
    }

    /// Enable or disable the correlated refinement stage.
    pub fn correlated(mut self, correlated: bool) -> Self {
        self.config.correlated = correlated;
        self
    }

    /// Set the tolerated fraction of failed draws.
    pub fn max_draw_failure_rate(mut self, rate: f64) -> Self {
        self.config.max_draw_failure_rate = rate;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline on one ensemble.
    ///
    /// # Errors
    ///
    /// `Shape` on malformed input, `SingularMatrix` when the window cannot
    /// be inverted, `FitConvergence`/`Domain` when the *central* analysis
    /// fails, and `AllDrawsFailed`/`ExcessiveDrawFailures` when too few
    /// draws survive. Individual draw failures are recorded as warnings,
    /// not errors.
    pub fn analyze(&self, input: &EnsembleInput) -> Result<EnsembleReport> {
        // Loaded: shape contract.
        let n_configs = input.two_point.len();
        if input.four_point.len() != n_configs {
            return Err(AnalysisError::Shape {
                expected: n_configs,
                got: input.four_point.len(),
                context: "four-point configuration count",
            });
        }
        for set in [&input.two_point, &input.four_point] {
            if set.time_extent() != input.time_extent {
                return Err(AnalysisError::Shape {
                    expected: input.time_extent,
                    got: set.time_extent(),
                    context: "raw series length vs declared time extent",
                });
            }
        }
        let n_draws = self.config.resolved_draws(n_configs);
        if n_draws == 0 {
            return Err(AnalysisError::Shape {
                expected: 1,
                got: 0,
                context: "bootstrap draw count",
            });
        }

        // Folded.
        let folded_2 = fold_all(&input.two_point)?;
        let folded_4 = fold_all(&input.four_point)?;

        // Resampled: one shared index table keeps the two observables on
        // the same configurations within each draw.
        let tables = draw_indices(n_configs, n_draws, self.config.seed);
        let means_2 = draw_mean_series(&folded_2, &tables);
        let means_4 = draw_mean_series(&folded_4, &tables);

        let central_2 = folded_2.mean_series();
        let central_4 = folded_4.mean_series();
        let errors_2 = folded_2.error_series();
        let errors_4 = folded_4.error_series();

        // The metric is the covariance of the mean series, estimated from
        // the folded configurations. Computed once per observable and
        // shared read-only by the central fit and every draw fit.
        let (metric_2, metric_4) = if self.config.correlated {
            (
                Some(CorrelatedMetric::from_samples(&folded_2, self.config.window)?),
                Some(CorrelatedMetric::from_samples(&folded_4, self.config.window)?),
            )
        } else {
            (None, None)
        };

        // Fitted: central first; a central failure fails the ensemble.
        let central = self.analyze_pair(
            &central_2,
            &central_4,
            &errors_2,
            &errors_4,
            metric_2.as_ref(),
            metric_4.as_ref(),
            input,
        )?;

        let outcomes = self.analyze_draws(
            &means_2,
            &means_4,
            &errors_2,
            &errors_4,
            metric_2.as_ref(),
            metric_4.as_ref(),
            input,
        );

        let mut survivors = Vec::with_capacity(n_draws);
        let mut warnings = Vec::new();
        for (draw, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(pair) => survivors.push(pair.estimates),
                Err(error) => {
                    warnings.push(format!("{}: draw {draw} skipped: {error}", input.name));
                }
            }
        }

        if survivors.is_empty() {
            return Err(AnalysisError::AllDrawsFailed { n_draws });
        }
        let failed = n_draws - survivors.len();
        if failed as f64 / n_draws as f64 > self.config.max_draw_failure_rate {
            return Err(AnalysisError::ExcessiveDrawFailures {
                failed,
                total: n_draws,
            });
        }

        // Reported.
        let dist = Distribution::new(central.estimates, survivors);
        let (low, high) = self.config.percentile_bounds;
        let observable =
            |f: &dyn Fn(&DrawEstimates) -> f64| Observable::from_distribution(&dist.map(f), low, high);

        Ok(EnsembleReport {
            ensemble: input.name.clone(),
            spatial_extent: input.spatial_extent,
            time_extent: input.time_extent,
            n_configurations: n_configs,
            n_draws_requested: n_draws,
            n_draws_used: dist.n_draws(),
            m2: observable(&|d| d.m2),
            m4: observable(&|d| d.m4),
            a0: observable(&|d| d.a0),
            a0_m2: observable(&|d| d.a0_m2),
            p_value_2: observable(&|d| d.p_value_2),
            p_value_4: observable(&|d| d.p_value_4),
            central_fit_2: central.fit_2,
            central_fit_4: central.fit_4,
            warnings,
            reference: input.reference,
        })
    }

    #[cfg(feature = "parallel")]
    #[allow(clippy::too_many_arguments)]
    fn analyze_draws(
        &self,
        means_2: &[TimeSeries],
        means_4: &[TimeSeries],
        errors_2: &TimeSeries,
        errors_4: &TimeSeries,
        metric_2: Option<&CorrelatedMetric>,
        metric_4: Option<&CorrelatedMetric>,
        input: &EnsembleInput,
    ) -> Vec<Result<PairFit>> {
        means_2
            .par_iter()
            .zip(means_4.par_iter())
            .map(|(y2, y4)| {
                self.analyze_pair(y2, y4, errors_2, errors_4, metric_2, metric_4, input)
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    #[allow(clippy::too_many_arguments)]
    fn analyze_draws(
        &self,
        means_2: &[TimeSeries],
        means_4: &[TimeSeries],
        errors_2: &TimeSeries,
        errors_4: &TimeSeries,
        metric_2: Option<&CorrelatedMetric>,
        metric_4: Option<&CorrelatedMetric>,
        input: &EnsembleInput,
    ) -> Vec<Result<PairFit>> {
        means_2
            .iter()
            .zip(means_4.iter())
            .map(|(y2, y4)| {
                self.analyze_pair(y2, y4, errors_2, errors_4, metric_2, metric_4, input)
            })
            .collect()
    }

    /// Fit one two-point/four-point series pair and derive the physics.
    #[allow(clippy::too_many_arguments)]
    fn analyze_pair(
        &self,
        y2: &TimeSeries,
        y4: &TimeSeries,
        errors_2: &TimeSeries,
        errors_4: &TimeSeries,
        metric_2: Option<&CorrelatedMetric>,
        metric_4: Option<&CorrelatedMetric>,
        input: &EnsembleInput,
    ) -> Result<PairFit> {
        let window = self.config.window;
        let times: Vec<f64> = (0..y2.len()).map(|t| t as f64).collect();
        let ts = window.slice(&times)?;

        // Initial mass from the local effective mass at the window start,
        // falling back to the configured guess when it is undefined on
        // this draw. The amplitude guess is the series' own source point.
        let guess_t = window.omit_pre.max(1);
        let mass_guess = physics::effective_mass_cosh_at(y2.as_slice(), guess_t, 1)
            .unwrap_or(self.config.initial_mass);

        let model_2 = Model::Cosh {
            time_extent: input.time_extent,
        };
        let model_4 = Model::CoshWithOffset {
            time_extent: input.time_extent,
        };

        let fit_2 = fit_pair_series(
            model_2,
            ts,
            y2,
            errors_2,
            metric_2,
            &[mass_guess, y2[0]],
            window,
        )?;
        let fit_4 = fit_pair_series(
            model_4,
            ts,
            y4,
            errors_4,
            metric_4,
            &[mass_guess, y4[0], 0.0],
            window,
        )?;

        let m2 = fit_2.params[0];
        let m4 = fit_4.params[0];
        let a0 = physics::scattering_length(m2, m4, input.spatial_extent)?;

        Ok(PairFit {
            estimates: DrawEstimates {
                m2,
                m4,
                a0,
                a0_m2: a0 * m2,
                p_value_2: fit_2.p_value,
                p_value_4: fit_4.p_value,
            },
            fit_2,
            fit_4,
        })
    }
}

/// Reduce each draw to its mean series.
#[cfg(feature = "parallel")]
fn draw_mean_series(folded: &SampleSet, tables: &[Vec<usize>]) -> Vec<TimeSeries> {
    tables
        .par_iter()
        .map(|indices| folded.select(indices).mean_series())
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn draw_mean_series(folded: &SampleSet, tables: &[Vec<usize>]) -> Vec<TimeSeries> {
    tables
        .iter()
        .map(|indices| folded.select(indices).mean_series())
        .collect()
}

/// Two-stage fit of one windowed series, or the uncorrelated fallback when
/// no metric is configured.
fn fit_pair_series(
    model: Model,
    ts: &[f64],
    ys: &TimeSeries,
    errors: &TimeSeries,
    metric: Option<&CorrelatedMetric>,
    p0: &[f64],
    window: crate::statistics::FitWindow,
) -> Result<FitResult> {
    let ys_cut = window.slice(ys.as_slice())?;
    let errors_cut = window.slice(errors.as_slice())?;
    match metric {
        Some(metric) => fit_two_stage(model, ts, ys_cut, Some(errors_cut), metric, p0),
        None => fit_uncorrelated(model, ts, ys_cut, Some(errors_cut), p0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LUSCHER_C1;
    use rand::SeedableRng;
    use rand_distr::{Distribution as _, Normal};
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::f64::consts::PI;

    const TIME_EXTENT: usize = 24;
    const SPATIAL_EXTENT: usize = 20;
    const M2_TRUE: f64 = 0.3;
    const A0_TRUE: f64 = -1.5;

    fn m4_true() -> f64 {
        let l = SPATIAL_EXTENT as f64;
        let delta_e = -4.0 * PI * A0_TRUE / (M2_TRUE * l.powi(3))
            * (1.0 + LUSCHER_C1 * A0_TRUE / l);
        2.0 * M2_TRUE + delta_e
    }

    /// Synthetic ensemble generated exactly from the fit models plus
    /// Gaussian noise.
    fn synthetic_input(n_configs: usize, noise: f64, seed: u64) -> EnsembleInput {
        let model_2 = Model::Cosh {
            time_extent: TIME_EXTENT,
        };
        let model_4 = Model::CoshWithOffset {
            time_extent: TIME_EXTENT,
        };
        let params_2 = [M2_TRUE, 1.0];
        let params_4 = [m4_true(), 2.0, 0.1];

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let gauss = Normal::new(0.0, noise).unwrap();

        let mut two_point = Vec::with_capacity(n_configs);
        let mut four_point = Vec::with_capacity(n_configs);
        for _ in 0..n_configs {
            two_point.push(TimeSeries::new(
                (0..TIME_EXTENT)
                    .map(|t| model_2.eval(t as f64, &params_2) + gauss.sample(&mut rng))
                    .collect(),
            ));
            four_point.push(TimeSeries::new(
                (0..TIME_EXTENT)
                    .map(|t| model_4.eval(t as f64, &params_4) + gauss.sample(&mut rng))
                    .collect(),
            ));
        }

        EnsembleInput {
            name: "synthetic".to_owned(),
            two_point: SampleSet::new(two_point).unwrap(),
            four_point: SampleSet::new(four_point).unwrap(),
            time_extent: TIME_EXTENT,
            spatial_extent: SPATIAL_EXTENT,
            reference: None,
        }
    }

    fn analysis() -> EnsembleAnalysis {
        EnsembleAnalysis::new().draws(100).seed(7).window(3, 0)
    }

    #[test]
    fn recovers_synthetic_parameters() {
        let input = synthetic_input(40, 0.002, 11);
        let report = analysis().analyze(&input).unwrap();

        assert!(
            (report.m2.value - M2_TRUE).abs() < 3.0 * report.m2.error.max(1e-4),
            "m2 = {} ± {}",
            report.m2.value,
            report.m2.error
        );
        assert!((report.m4.value - m4_true()).abs() < 0.05);
        assert!(report.a0.value < 0.0);
        assert!(report.n_draws_used > 80);
        assert_eq!(report.n_draws_requested, 100);
    }

    #[test]
    fn same_seed_reproduces_report() {
        let input = synthetic_input(30, 0.002, 3);
        let first = analysis().analyze(&input).unwrap();
        let second = analysis().analyze(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn quick_preset_caps_the_draw_count() {
        let analysis = EnsembleAnalysis::quick();
        assert_eq!(analysis.config().resolved_draws(500), 100);
        assert!(analysis.config().max_draw_failure_rate > 0.2);
    }

    #[test]
    fn mismatched_configuration_counts_are_rejected() {
        let mut input = synthetic_input(20, 0.002, 5);
        let trimmed: Vec<TimeSeries> = input.four_point.series()[..19].to_vec();
        input.four_point = SampleSet::new(trimmed).unwrap();

        let result = analysis().analyze(&input);
        assert!(matches!(result, Err(AnalysisError::Shape { .. })));
    }

    #[test]
    fn window_wider_than_config_count_is_singular() {
        // Folded length is 13, so window(3, 0) spans 10 slices; with only
        // 8 independent configurations the truncated matrix is rank
        // deficient and must be rejected.
        let input = synthetic_input(8, 0.002, 5);
        let result = EnsembleAnalysis::new()
            .draws(50)
            .seed(1)
            .window(3, 0)
            .analyze(&input);
        assert!(matches!(result, Err(AnalysisError::SingularMatrix { .. })));
    }

    #[test]
    fn uncorrelated_fallback_runs_where_correlated_cannot() {
        let input = synthetic_input(8, 0.002, 5);
        let report = EnsembleAnalysis::new()
            .draws(50)
            .seed(1)
            .window(3, 0)
            .correlated(false)
            .analyze(&input)
            .unwrap();
        assert_eq!(report.n_draws_requested, 50);
    }

    #[test]
    fn central_domain_failure_fails_the_ensemble() {
        // Spatial extent zero makes the scattering length a domain error
        // on the central value already.
        let mut input = synthetic_input(20, 0.002, 5);
        input.spatial_extent = 0;
        let result = analysis().analyze(&input);
        assert!(matches!(result, Err(AnalysisError::Domain { .. })));
    }
}
