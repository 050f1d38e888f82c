//! End-to-end analysis of a synthetic ensemble.

mod common;

use common::{synthetic_input, Truth};
use corrfit::{AnalysisError, EnsembleAnalysis};

/// The full scenario: 32-point periodic cosh with m = 0.25 and a = 1.0,
/// folded to 17 points, 50 noisy replicas (sigma = 0.01 a), correlated fit
/// on the window starting at slice 5, 500 bootstrap draws.
#[test]
fn recovers_mass_within_bootstrap_error() {
    let truth = Truth::standard();
    let input = synthetic_input(&truth, 50, 0.01, 2024);

    let report = EnsembleAnalysis::new()
        .draws(500)
        .seed(1)
        .window(5, 0)
        .analyze(&input)
        .unwrap();

    // The folded series has 17 points; the window keeps 12, so the
    // two-parameter cosh fit runs at 9 degrees of freedom.
    assert_eq!(report.central_fit_2.dof, 9);

    assert!(
        (report.m2.value - truth.m2).abs() < 3.0 * report.m2.error,
        "m2 = {} ± {}, truth {}",
        report.m2.value,
        report.m2.error,
        truth.m2
    );
    assert!(report.m2.error > 0.0 && report.m2.error < 0.05);

    // With the model exactly matching the data, p-values must spread over
    // (0, 1) rather than cluster at zero. The draw average is the robust
    // check; the single central p-value only gets a coarse floor.
    assert!(report.central_fit_2.p_value > 1e-3);
    assert!(report.p_value_2.mean > 0.05 && report.p_value_2.mean < 0.99);

    // The four-point channel and the derived scattering length.
    assert!((report.m4.value - truth.m4).abs() < 3.0 * report.m4.error.max(5e-3));
    assert!(report.a0.value < 0.0, "repulsive channel must give a0 < 0");
    assert!(
        (report.a0.value - truth.a0).abs() < 4.0 * report.a0.error.max(0.05),
        "a0 = {} ± {}, truth {}",
        report.a0.value,
        report.a0.error,
        truth.a0
    );

    // The per-draw error policy may drop the odd draw, never a large share.
    assert!(report.n_draws_used >= 450);
    assert_eq!(report.n_draws_used + report.warnings.len(), 500);
}

#[test]
fn asymmetric_errors_bracket_the_value() {
    let truth = Truth::standard();
    let input = synthetic_input(&truth, 50, 0.01, 77);

    let report = EnsembleAnalysis::new()
        .draws(300)
        .seed(5)
        .window(5, 0)
        .analyze(&input)
        .unwrap();

    // Percentile errors are one-sigma-ish on each side; for this benign
    // distribution they agree with the symmetric error within a factor.
    for obs in [&report.m2, &report.m4] {
        assert!(obs.error_low > 0.0 && obs.error_high > 0.0);
        assert!(obs.error_low < 3.0 * obs.error);
        assert!(obs.error_high < 3.0 * obs.error);
    }
}

#[test]
fn oversized_window_is_rejected_not_degraded() {
    let truth = Truth::standard();
    // Only 10 configurations: the 12-slice window cannot be inverted.
    let input = synthetic_input(&truth, 10, 0.01, 9);

    let result = EnsembleAnalysis::new()
        .draws(100)
        .seed(1)
        .window(5, 0)
        .analyze(&input);

    assert!(matches!(
        result,
        Err(AnalysisError::SingularMatrix { .. })
    ));
}

#[test]
fn report_serializes_to_json() {
    let truth = Truth::standard();
    let input = synthetic_input(&truth, 30, 0.01, 13);

    let report = EnsembleAnalysis::new()
        .draws(100)
        .seed(3)
        .window(5, 0)
        .analyze(&input)
        .unwrap();

    let json = serde_json::to_string(&report).expect("report must serialize");
    assert!(json.contains("a0_m2"));
    assert!(json.contains("central_fit_2"));

    let back: corrfit::EnsembleReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}

#[test]
fn terminal_summary_renders() {
    let truth = Truth::standard();
    let input = synthetic_input(&truth, 30, 0.01, 21);

    let report = EnsembleAnalysis::new()
        .draws(100)
        .seed(8)
        .window(5, 0)
        .analyze(&input)
        .unwrap();

    let text = corrfit::output::format_report(&report);
    assert!(text.contains("synthetic-32"));
    assert!(text.contains("a_0*m_2"));
}
