//! Terminal output formatting for ensemble reports.

use colored::Colorize;

use crate::result::{EnsembleReport, FitResult, Observable};

/// Format an [`EnsembleReport`] for human-readable terminal output.
pub fn format_report(report: &EnsembleReport) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str(&format!("corrfit \u{2014} {}\n", report.ensemble.bold()));
    output.push_str(&sep);
    output.push('\n');
    output.push('\n');

    output.push_str(&format!(
        "  Lattice: {}\u{00b3} \u{00d7} {}, {} configurations\n",
        report.spatial_extent, report.time_extent, report.n_configurations
    ));
    output.push_str(&format!(
        "  Bootstrap: {} of {} draws used\n\n",
        report.n_draws_used, report.n_draws_requested
    ));

    output.push_str(&format_observable("m_2      ", &report.m2));
    output.push_str(&format_observable("m_4      ", &report.m4));
    output.push_str(&format_observable("a_0      ", &report.a0));
    output.push_str(&format_observable("a_0*m_2  ", &report.a0_m2));
    output.push('\n');

    output.push_str(&format!(
        "  Two-point fit:  {}\n",
        format_fit(&report.central_fit_2)
    ));
    output.push_str(&format!(
        "  Four-point fit: {}\n",
        format_fit(&report.central_fit_4)
    ));

    if let Some(reference) = &report.reference {
        output.push('\n');
        output.push_str(&format!(
            "  Literature: a_0*m_2 = {:.6} \u{00b1} {:.6}\n",
            reference.a0_m2, reference.a0_m2_err
        ));
    }

    if !report.warnings.is_empty() {
        output.push('\n');
        output.push_str(&format!(
            "  {}\n",
            format!("\u{26a0} {} draws skipped", report.warnings.len())
                .yellow()
                .bold()
        ));
        for warning in &report.warnings {
            output.push_str(&format!("    {warning}\n"));
        }
    }

    output.push_str(&sep);
    output.push('\n');
    output
}

fn format_observable(label: &str, obs: &Observable) -> String {
    format!(
        "  {label} {:>12.6} \u{00b1} {:.6}  (+{:.6} / -{:.6})\n",
        obs.value, obs.error, obs.error_high, obs.error_low
    )
}

fn format_fit(fit: &FitResult) -> String {
    let quality = format!(
        "chi\u{00b2}/dof = {:.3}, p = {:.3}",
        fit.chi_square / fit.dof.max(1) as f64,
        fit.p_value
    );
    if fit.p_value < 0.01 {
        quality.yellow().to_string()
    } else {
        quality.green().to_string()
    }
}
