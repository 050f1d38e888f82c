//! Derived physical quantities.
//!
//! Pure algebraic transforms applied to correlator values or fitted
//! parameters. They are mapped draw-wise over bootstrap distributions, so
//! every function rejects invalid input with a `Domain` error instead of
//! producing NaN; the orchestrator skips the offending draw.

use std::f64::consts::PI;

use crate::constants::LUSCHER_C1;
use crate::error::{AnalysisError, Result};
use crate::types::TimeSeries;

/// Assemble the four-point correlator from its three Wick contractions,
///
/// ```text
/// C4(t) = C4_direct(t) + C4_crossed(t) - 2 C4_rectangular(t)
/// ```
///
/// # Errors
///
/// `Shape` when the contraction series lengths differ.
pub fn combine_four_point(
    direct: &TimeSeries,
    crossed: &TimeSeries,
    rectangular: &TimeSeries,
) -> Result<TimeSeries> {
    for series in [crossed, rectangular] {
        if series.len() != direct.len() {
            return Err(AnalysisError::Shape {
                expected: direct.len(),
                got: series.len(),
                context: "four-point contraction lengths",
            });
        }
    }
    Ok(TimeSeries::new(
        direct
            .as_slice()
            .iter()
            .zip(crossed.as_slice())
            .zip(rectangular.as_slice())
            .map(|((&d, &c), &r)| d + c - 2.0 * r)
            .collect(),
    ))
}

/// Local effective mass from the log-ratio of neighboring slices,
///
/// ```text
/// m_eff(t) = -ln(C(t + dt) / C(t)) / dt
/// ```
///
/// Model independent; used for cross-checks and initial fit guesses.
///
/// # Errors
///
/// `Shape` when the series is shorter than `dt + 1`; `Domain` when a
/// ratio is non-positive.
pub fn effective_mass(series: &[f64], dt: usize) -> Result<Vec<f64>> {
    if dt == 0 || series.len() <= dt {
        return Err(AnalysisError::Shape {
            expected: dt + 1,
            got: series.len(),
            context: "effective mass series length",
        });
    }
    let mut out = Vec::with_capacity(series.len() - dt);
    for t in 0..series.len() - dt {
        let ratio = series[t + dt] / series[t];
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(AnalysisError::Domain {
                what: "effective mass log ratio",
                value: ratio,
            });
        }
        out.push(-ratio.ln() / dt as f64);
    }
    Ok(out)
}

/// Cosh-aware effective mass,
///
/// ```text
/// m_eff(t) = arccosh((C(t - dt) + C(t + dt)) / (2 C(t)))
/// ```
///
/// Exact for a symmetric two-exponential correlator, where the plain
/// log-ratio estimator bends near the temporal midpoint.
///
/// # Errors
///
/// `Shape` when fewer than `2 dt + 1` slices are available; `Domain` when
/// the arccosh argument drops below 1.
pub fn effective_mass_cosh(series: &[f64], dt: usize) -> Result<Vec<f64>> {
    if dt == 0 || series.len() <= 2 * dt {
        return Err(AnalysisError::Shape {
            expected: 2 * dt + 1,
            got: series.len(),
            context: "cosh effective mass series length",
        });
    }
    (dt..series.len() - dt)
        .map(|t| effective_mass_cosh_at(series, t, dt))
        .collect()
}

/// [`effective_mass_cosh`] at a single time slice.
pub fn effective_mass_cosh_at(series: &[f64], t: usize, dt: usize) -> Result<f64> {
    if dt == 0 || t < dt || t + dt >= series.len() {
        return Err(AnalysisError::Shape {
            expected: 2 * dt + 1,
            got: series.len(),
            context: "cosh effective mass slice index",
        });
    }
    let arg = (series[t - dt] + series[t + dt]) / (2.0 * series[t]);
    if !(arg.is_finite() && arg >= 1.0) {
        return Err(AnalysisError::Domain {
            what: "arccosh argument",
            value: arg,
        });
    }
    Ok(arg.acosh() / dt as f64)
}

/// Energy shift of the two-particle state relative to twice the
/// single-particle mass, `ΔE = m4 - 2 m2`.
pub fn energy_shift(m2: f64, m4: f64) -> f64 {
    m4 - 2.0 * m2
}

/// S-wave scattering length from the finite-volume energy shift.
///
/// The Lüscher expansion of the two-particle energy on a spatial box of
/// extent `L`,
///
/// ```text
/// ΔE = -4π a₀ / (m₂ L³) · [1 + c₁ a₀ / L],   c₁ = -2.837297,
/// ```
///
/// truncated at first order in `a₀/L`, is solved for `a₀` in closed form.
/// Of the two quadratic roots the perturbative branch is taken, the one
/// that reduces to the leading-order result as `c₁ → 0`.
///
/// # Errors
///
/// `Domain` on a non-positive mass or extent, or when the discriminant is
/// negative (energy shift too large for the truncated expansion).
pub fn scattering_length(m2: f64, m4: f64, spatial_extent: usize) -> Result<f64> {
    if !(m2.is_finite() && m2 > 0.0) {
        return Err(AnalysisError::Domain {
            what: "scattering length mass",
            value: m2,
        });
    }
    if spatial_extent == 0 {
        return Err(AnalysisError::Domain {
            what: "scattering length spatial extent",
            value: 0.0,
        });
    }

    let l = spatial_extent as f64;
    let leading = -energy_shift(m2, m4) * m2 * l.powi(3) / (4.0 * PI);
    let curvature = LUSCHER_C1 / l;

    let discriminant = 1.0 + 4.0 * curvature * leading;
    if discriminant < 0.0 {
        return Err(AnalysisError::Domain {
            what: "scattering length discriminant",
            value: discriminant,
        });
    }

    Ok((-1.0 + discriminant.sqrt()) / (2.0 * curvature))
}
