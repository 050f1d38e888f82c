//! Configuration for an ensemble analysis.

use crate::constants::{
    DEFAULT_INITIAL_MASS, DRAWS_PER_CONFIGURATION, PERCENTILE_HIGH, PERCENTILE_LOW,
};
use crate::statistics::FitWindow;

/// Configuration options for [`crate::EnsembleAnalysis`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Bootstrap draw count. `None` scales with the ensemble: three draws
    /// per configuration.
    pub n_draws: Option<usize>,

    /// Base seed for draw generation. Per-draw RNGs are derived from it,
    /// so a fixed seed makes the whole analysis reproducible.
    pub seed: u64,

    /// Truncation window used for both the covariance estimate and the
    /// fits (default: omit the first 13 slices).
    pub window: FitWindow,

    /// Refine with the correlated metric after the uncorrelated pre-fit
    /// (default: true). Disable to fall back to a diagonal-only fit when
    /// the window cannot be made invertible.
    pub correlated: bool,

    /// Fraction of failed draws tolerated before the ensemble analysis is
    /// failed as a whole (default: 0.2).
    pub max_draw_failure_rate: f64,

    /// Percentile bounds for asymmetric errors, percent units
    /// (default: 15.87 / 84.13, one sigma under normality).
    pub percentile_bounds: (f64, f64),

    /// Mass guess (lattice units) used when the effective-mass estimator
    /// is undefined at the window start.
    pub initial_mass: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            n_draws: None,
            seed: 0,
            window: FitWindow::new(13, 0),
            correlated: true,
            max_draw_failure_rate: 0.2,
            percentile_bounds: (PERCENTILE_LOW, PERCENTILE_HIGH),
            initial_mass: DEFAULT_INITIAL_MASS,
        }
    }
}

impl Config {
    /// Number of draws for an ensemble of `n_configs` configurations.
    pub fn resolved_draws(&self, n_configs: usize) -> usize {
        self.n_draws
            .unwrap_or(DRAWS_PER_CONFIGURATION * n_configs)
    }
}
