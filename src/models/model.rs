//! Basis vectors derived from light-curve columns.
//!
//! The fitter consumes named basis vectors; this module derives the standard
//! nuisance set (constant, time trend, centroid terms, position cross-term,
//! periodic background pair, background proxy) plus the box transit template.
//!
//! Column names defined here are part of the contract with the reconstruction
//! step: the fitter locates the signal column by `SIGNAL_NAME`.

use std::f64::consts::TAU;

use crate::domain::{BasisVector, LightCurve, TransitSpec};

/// Name of the signal-template column.
pub const SIGNAL_NAME: &str = "transit";

/// Mean-centered time scaled by the half-span, so the trend column spans
/// roughly [-1, 1] regardless of visit length.
///
/// Keeping all nuisance columns O(1) keeps the normal equations well
/// conditioned when trends are mixed with pixel-scale centroid terms.
pub fn time_trend(time: &[f64]) -> BasisVector {
    let n = time.len().max(1) as f64;
    let mean = time.iter().sum::<f64>() / n;
    let half_span = time
        .iter()
        .map(|t| (t - mean).abs())
        .fold(0.0_f64, f64::max)
        .max(1e-12);
    BasisVector::new(
        "trend",
        time.iter().map(|t| (t - mean) / half_span).collect(),
    )
}

/// Mean-subtracted copy of a measured column (centroids, background proxy).
pub fn centered(name: &str, values: &[f64]) -> BasisVector {
    let n = values.len().max(1) as f64;
    let mean = values.iter().sum::<f64>() / n;
    BasisVector::new(name, values.iter().map(|v| v - mean).collect())
}

/// Elementwise product of two basis vectors (e.g. the position x trend
/// cross-term).
pub fn cross(name: &str, a: &BasisVector, b: &BasisVector) -> BasisVector {
    debug_assert_eq!(a.len(), b.len());
    BasisVector::new(
        name,
        a.values()
            .iter()
            .zip(b.values())
            .map(|(x, y)| x * y)
            .collect(),
    )
}

/// Sin/cos pair at the given period, modeling a periodic background term
/// of unknown amplitude and phase.
pub fn harmonic_pair(time: &[f64], period: f64) -> (BasisVector, BasisVector) {
    let w = TAU / period;
    let sin = BasisVector::new("bg_sin", time.iter().map(|t| (w * t).sin()).collect());
    let cos = BasisVector::new("bg_cos", time.iter().map(|t| (w * t).cos()).collect());
    (sin, cos)
}

/// Column of ones (constant offset).
pub fn constant(n: usize) -> BasisVector {
    BasisVector::new("const", vec![1.0; n])
}

/// Unit-depth, phase-folded box transit template: -1 in transit, 0 outside.
///
/// The fitted coefficient on this column is the transit depth in flux units.
pub fn box_transit(time: &[f64], spec: &TransitSpec) -> BasisVector {
    let half = spec.duration / 2.0;
    let values = time
        .iter()
        .map(|t| {
            let mut phase = (t - spec.t0).rem_euclid(spec.period);
            if phase > spec.period / 2.0 {
                phase -= spec.period;
            }
            if phase.abs() <= half { -1.0 } else { 0.0 }
        })
        .collect();
    BasisVector::new(SIGNAL_NAME, values)
}

/// The standard nuisance basis for a light curve, in fixed order:
/// constant, time trend, centroid x/y, centroid-x-times-trend cross-term,
/// background harmonic pair, measured background proxy.
///
/// Centroid and background terms are included only when the light curve
/// carries those columns.
pub fn nuisance_basis(lc: &LightCurve, roll_period: f64) -> Vec<BasisVector> {
    let n = lc.len();
    let trend = time_trend(&lc.time);

    let mut basis = vec![constant(n), trend.clone()];

    if let Some(xc) = &lc.centroid_x {
        let xc = centered("xc", xc);
        let xc_trend = cross("xc_trend", &xc, &trend);
        basis.push(xc);
        if let Some(yc) = &lc.centroid_y {
            basis.push(centered("yc", yc));
        }
        basis.push(xc_trend);
    } else if let Some(yc) = &lc.centroid_y {
        basis.push(centered("yc", yc));
    }

    let (sin, cos) = harmonic_pair(&lc.time, roll_period);
    basis.push(sin);
    basis.push(cos);

    if let Some(bg) = &lc.background {
        basis.push(centered("bg", bg));
    }

    basis
}

/// Nuisance basis plus the transit template (when requested), template last.
pub fn full_basis(
    lc: &LightCurve,
    roll_period: f64,
    transit: Option<&TransitSpec>,
) -> Vec<BasisVector> {
    let mut basis = nuisance_basis(lc, roll_period);
    if let Some(spec) = transit {
        basis.push(box_transit(&lc.time, spec));
    }
    basis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_is_centered_and_unit_scaled() {
        let time: Vec<f64> = (0..11).map(|i| i as f64 * 0.1).collect();
        let trend = time_trend(&time);

        let sum: f64 = trend.values().iter().sum();
        assert!(sum.abs() < 1e-12);
        assert!((trend.values()[0] + 1.0).abs() < 1e-12);
        assert!((trend.values()[10] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn box_transit_folds_on_the_period() {
        let spec = TransitSpec {
            t0: 0.5,
            period: 1.0,
            duration: 0.2,
        };
        // Cadences at the first and second transit centers, plus one far out.
        let time = vec![0.5, 1.5, 0.55, 0.65, 0.0];
        let tmpl = box_transit(&time, &spec);

        assert_eq!(tmpl.values()[0], -1.0);
        assert_eq!(tmpl.values()[1], -1.0);
        assert_eq!(tmpl.values()[2], -1.0); // within the half-duration window
        assert_eq!(tmpl.values()[3], 0.0);
        assert_eq!(tmpl.values()[4], 0.0);
    }

    #[test]
    fn harmonic_pair_repeats_on_the_period() {
        let (sin, cos) = harmonic_pair(&[0.0, 0.25, 1.0], 1.0);
        assert!(sin.values()[0].abs() < 1e-12);
        assert!((sin.values()[1] - 1.0).abs() < 1e-12);
        assert!(sin.values()[2].abs() < 1e-9);
        assert!((cos.values()[0] - 1.0).abs() < 1e-12);
        assert!((cos.values()[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn nuisance_basis_order_is_stable() {
        let n = 16;
        let lc = LightCurve {
            time: (0..n).map(|i| i as f64 * 0.01).collect(),
            flux: vec![1.0; n],
            flux_err: vec![0.001; n],
            centroid_x: Some((0..n).map(|i| (i as f64 * 0.3).sin()).collect()),
            centroid_y: Some((0..n).map(|i| (i as f64 * 0.2).cos()).collect()),
            background: Some((0..n).map(|i| 1.0 + (i as f64 * 0.1).sin()).collect()),
        };

        let basis = nuisance_basis(&lc, 0.25);
        let names: Vec<&str> = basis.iter().map(|b| b.name()).collect();
        assert_eq!(
            names,
            ["const", "trend", "xc", "yc", "xc_trend", "bg_sin", "bg_cos", "bg"]
        );

        let lc_bare = LightCurve {
            centroid_x: None,
            centroid_y: None,
            background: None,
            ..lc
        };
        let basis_bare = nuisance_basis(&lc_bare, 0.25);
        let names: Vec<&str> = basis_bare.iter().map(|b| b.name()).collect();
        assert_eq!(names, ["const", "trend", "bg_sin", "bg_cos"]);
    }
}
