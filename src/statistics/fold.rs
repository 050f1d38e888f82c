//! Folding of correlators around their temporal midpoint.
//!
//! A correlator on a periodic lattice of extent `T` satisfies
//! `C(t) = C(T - t)` up to noise, so averaging a series with its
//! time-reversed counterpart halves the effective noise at no cost.

use crate::error::{AnalysisError, Result};
use crate::types::{SampleSet, TimeSeries};

/// Fold a series of even length `T` down to `T/2 + 1` points.
///
/// The endpoints `t = 0` and `t = T/2` have no reflection partner and are
/// copied; every interior point is averaged with its mirror image:
///
/// ```text
/// folded[i] = (series[i] + series[T - i]) / 2,   0 < i < T/2
/// ```
///
/// # Errors
///
/// `Shape` if the input length is odd or zero.
pub fn fold(series: &TimeSeries) -> Result<TimeSeries> {
    let t_extent = series.len();
    if t_extent == 0 || t_extent % 2 != 0 {
        return Err(AnalysisError::Shape {
            expected: t_extent + t_extent % 2,
            got: t_extent,
            context: "fold input length (must be even and nonzero)",
        });
    }

    let half = t_extent / 2;
    let raw = series.as_slice();
    let mut folded = Vec::with_capacity(half + 1);
    folded.push(raw[0]);
    for i in 1..half {
        folded.push((raw[i] + raw[t_extent - i]) / 2.0);
    }
    folded.push(raw[half]);

    Ok(TimeSeries::new(folded))
}

/// Fold every configuration of a sample set.
pub fn fold_all(samples: &SampleSet) -> Result<SampleSet> {
    let folded = samples
        .series()
        .iter()
        .map(fold)
        .collect::<Result<Vec<_>>>()?;
    SampleSet::new(folded)
}
