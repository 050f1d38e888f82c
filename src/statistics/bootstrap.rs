//! Bootstrap resampling of configuration ensembles.
//!
//! Configurations are statistically independent measurements, so plain
//! resampling with replacement applies. Draws are seeded individually from
//! a counter-derived seed, which makes every draw reproducible on its own
//! and lets serial and parallel evaluation produce identical results.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::types::SampleSet;

/// Counter-based RNG seed derivation using SplitMix64.
///
/// A stateless PRF from a base seed and a draw counter. Deriving per-draw
/// seeds this way instead of incrementing the base seed avoids sequential
/// correlation between neighboring draws.
#[inline]
pub fn counter_seed(base_seed: u64, counter: u64) -> u64 {
    // SplitMix64, see https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Generate index tables for `n_draws` bootstrap draws over `n_samples`
/// configurations, sampling uniformly with replacement.
///
/// Identical `(n_samples, n_draws, seed)` always produce identical tables.
/// One index table can be applied to several observables measured on the
/// same configurations, keeping them paired under resampling.
pub fn draw_indices(n_samples: usize, n_draws: usize, seed: u64) -> Vec<Vec<usize>> {
    (0..n_draws)
        .map(|draw| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(counter_seed(seed, draw as u64));
            (0..n_samples)
                .map(|_| rng.random_range(0..n_samples))
                .collect()
        })
        .collect()
}

/// Draw `n_draws` resampled sample sets from `samples`.
///
/// Each draw has the same configuration count as the input. This is the
/// single-observable convenience over [`draw_indices`] + [`SampleSet::select`].
pub fn make_draws(samples: &SampleSet, n_draws: usize, seed: u64) -> Vec<SampleSet> {
    draw_indices(samples.len(), n_draws, seed)
        .iter()
        .map(|indices| samples.select(indices))
        .collect()
}
