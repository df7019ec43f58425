//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::fit::DetrendFit;
use crate::io::ingest::{DatasetStats, IngestedData};

/// Format the full run summary (dataset stats + coefficient table + quality).
///
/// `truth` (demo mode) adds a column with the injected coefficient values.
pub fn format_run_summary(
    stats: &DatasetStats,
    fit: &DetrendFit,
    truth: Option<&[(String, f64)]>,
) -> String {
    let mut out = String::new();

    out.push_str("=== lcd - light-curve detrend (weighted least squares) ===\n");
    out.push_str(&format!(
        "Points: n={} | time=[{:.4}, {:.4}]d | flux=[{:.6}, {:.6}]\n",
        stats.n_points, stats.time_min, stats.time_max, stats.flux_min, stats.flux_max
    ));
    out.push_str(&format!(
        "Basis: {} columns ({})\n",
        fit.basis_names.len(),
        fit.basis_names.join(", ")
    ));
    if let Some(signal) = &fit.signal {
        out.push_str(&format!("Signal column: {signal}\n"));
    }

    out.push_str("\nCoefficients:\n");
    out.push_str(&format!(
        "  {:<10} {:>14} {:>12} {:>8}{}\n",
        "name",
        "estimate",
        "stderr",
        "t",
        if truth.is_some() { "        truth" } else { "" }
    ));
    for c in &fit.coefficients {
        let truth_col = truth
            .and_then(|t| truth_for(t, &c.name))
            .map(|v| format!(" {v:>12.4e}"))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:<10} {:>14.6e} {:>12.4e} {:>8.2}{}\n",
            c.name,
            c.value,
            c.std_error,
            c.t_stat(),
            truth_col
        ));
    }

    out.push_str(&format!(
        "\nQuality: chi2={:.3} dof={} (reduced {:.4}) rmse={:.4e}\n",
        fit.quality.chi2,
        fit.quality.dof,
        fit.quality.reduced_chi2(),
        fit.quality.rmse
    ));

    out
}

/// One-line ingest notes: row counts and how many rows were dropped.
pub fn format_ingest_notes(ingest: &IngestedData) -> String {
    let mut out = format!(
        "Ingest: {} rows read, {} used",
        ingest.rows_read, ingest.rows_used
    );
    if !ingest.row_errors.is_empty() {
        out.push_str(&format!(", {} dropped:", ingest.row_errors.len()));
        for e in ingest.row_errors.iter().take(5) {
            out.push_str(&format!("\n  line {}: {}", e.line, e.message));
        }
        if ingest.row_errors.len() > 5 {
            out.push_str(&format!(
                "\n  ... and {} more",
                ingest.row_errors.len() - 5
            ));
        }
    }
    out.push('\n');
    out
}

/// Summary over repeated noise realizations: per coefficient, the mean
/// estimate, the empirical scatter across realizations, and the mean
/// predicted standard error. Scatter and predicted error agreeing is a direct
/// check of the reported covariance.
pub fn format_ensemble_summary(fits: &[DetrendFit], truth: Option<&[(String, f64)]>) -> String {
    let mut out = String::new();
    let Some(first) = fits.first() else {
        return out;
    };
    let m = fits.len() as f64;

    out.push_str(&format!(
        "\nEnsemble over {} noise realizations:\n",
        fits.len()
    ));
    out.push_str(&format!(
        "  {:<10} {:>14} {:>12} {:>12}{}\n",
        "name",
        "mean",
        "scatter",
        "pred. se",
        if truth.is_some() { "        truth" } else { "" }
    ));

    for (j, name) in first.basis_names.iter().enumerate() {
        let values: Vec<f64> = fits.iter().map(|f| f.coefficients[j].value).collect();
        let mean = values.iter().sum::<f64>() / m;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (m - 1.0).max(1.0);
        let pred_se = fits.iter().map(|f| f.coefficients[j].std_error).sum::<f64>() / m;

        let truth_col = truth
            .and_then(|t| truth_for(t, name))
            .map(|v| format!(" {v:>12.4e}"))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:<10} {:>14.6e} {:>12.4e} {:>12.4e}{}\n",
            name,
            mean,
            var.sqrt(),
            pred_se,
            truth_col
        ));
    }

    out
}

fn truth_for(truth: &[(String, f64)], name: &str) -> Option<f64> {
    truth
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| *v)
}
