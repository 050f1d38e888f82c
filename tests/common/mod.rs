//! Shared synthetic-ensemble generation for integration tests.

use std::f64::consts::PI;

use corrfit::{EnsembleInput, Model, SampleSet, TimeSeries, LUSCHER_C1};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Ground truth of the synthetic ensemble.
pub struct Truth {
    pub time_extent: usize,
    pub spatial_extent: usize,
    pub m2: f64,
    pub amplitude_2: f64,
    pub m4: f64,
    pub amplitude_4: f64,
    pub offset_4: f64,
    pub a0: f64,
}

impl Truth {
    /// The standard scenario: a 32-point periodic cosh with m = 0.25 and
    /// a = 1.0, plus a four-point correlator consistent with a known
    /// scattering length.
    pub fn standard() -> Self {
        let (m2, spatial_extent, a0) = (0.25, 24usize, -1.2);
        let l = spatial_extent as f64;
        let delta_e = -4.0 * PI * a0 / (m2 * l.powi(3)) * (1.0 + LUSCHER_C1 * a0 / l);
        Self {
            time_extent: 32,
            spatial_extent,
            m2,
            amplitude_2: 1.0,
            m4: 2.0 * m2 + delta_e,
            amplitude_4: 1.5,
            offset_4: 0.05,
            a0,
        }
    }
}

/// Generate `n_configs` noisy replicas of the exact model correlators.
pub fn synthetic_input(truth: &Truth, n_configs: usize, noise: f64, seed: u64) -> EnsembleInput {
    let model_2 = Model::Cosh {
        time_extent: truth.time_extent,
    };
    let model_4 = Model::CoshWithOffset {
        time_extent: truth.time_extent,
    };
    let params_2 = [truth.m2, truth.amplitude_2];
    let params_4 = [truth.m4, truth.amplitude_4, truth.offset_4];

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let gauss = Normal::new(0.0, noise).unwrap();

    let mut two_point = Vec::with_capacity(n_configs);
    let mut four_point = Vec::with_capacity(n_configs);
    for _ in 0..n_configs {
        two_point.push(TimeSeries::new(
            (0..truth.time_extent)
                .map(|t| model_2.eval(t as f64, &params_2) + gauss.sample(&mut rng))
                .collect(),
        ));
        four_point.push(TimeSeries::new(
            (0..truth.time_extent)
                .map(|t| model_4.eval(t as f64, &params_4) + gauss.sample(&mut rng))
                .collect(),
        ));
    }

    EnsembleInput {
        name: "synthetic-32".to_owned(),
        two_point: SampleSet::new(two_point).unwrap(),
        four_point: SampleSet::new(four_point).unwrap(),
        time_extent: truth.time_extent,
        spatial_extent: truth.spatial_extent,
        reference: None,
    }
}
