//! Percentile computation using O(n) selection.
//!
//! Asymmetric bootstrap errors are read off percentile bounds of the draw
//! distribution. `select_nth_unstable` (introselect) gives O(n) expected
//! time without fully sorting the draws.

/// Compute the percentile `p` (in percent, `0..=100`) of a mutable slice.
///
/// Uses linear interpolation between order statistics, matching the
/// convention of NumPy's default percentile. The slice is partially
/// reordered as a side effect.
///
/// Returns NaN for an empty slice.
pub fn percentile(data: &mut [f64], p: f64) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let n = data.len();
    if n == 1 {
        return data[0];
    }
    debug_assert!((0.0..=100.0).contains(&p), "percentile out of range: {p}");

    let h = (n - 1) as f64 * p / 100.0;
    let h_floor = h.floor() as usize;
    let h_frac = h - h.floor();

    if h_floor >= n - 1 {
        let (_, &mut max, _) = data.select_nth_unstable_by(n - 1, |a, b| a.total_cmp(b));
        return max;
    }

    let (_, &mut lower, upper) = data.select_nth_unstable_by(h_floor, |a, b| a.total_cmp(b));
    if h_frac == 0.0 {
        return lower;
    }

    // The interpolation partner is the smallest element above the pivot.
    let upper_min = upper.iter().copied().fold(f64::INFINITY, f64::min);
    lower + h_frac * (upper_min - lower)
}

/// Median shorthand.
pub fn median(data: &mut [f64]) -> f64 {
    percentile(data, 50.0)
}
