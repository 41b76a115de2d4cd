//! Metric Summarizer — scalar indices and qualitative interpretation
//!
//! Collapses the derived series into the scalar bundle shown on the
//! dashboard (range of motion, jerk smoothness index, peak force and
//! torque, session energy, dominant tremor frequency) and maps it to
//! qualitative interpretation lines.
//!
//! Bands follow the clinical conventions of the device: amplitude below
//! 15° is critical, 15-60° functional, above 60° excellent; a dominant
//! frequency above 4 Hz flags tremor; jerk above 800 flags instability;
//! energy above 100 J flags high demand.

use crate::calculus::central_difference;
use crate::spectrum::AmplitudeSpectrum;
use crate::types::{DynamicsSeries, SummaryMetrics, GRAVITY};

/// Amplitude below this is a critically short movement, in degrees.
pub const AMPLITUDE_CRITICAL_DEG: f64 = 15.0;
/// Amplitude above this is an excellent excursion, in degrees.
pub const AMPLITUDE_EXCELLENT_DEG: f64 = 60.0;
/// Dominant frequency above this flags tremor, in Hz.
pub const TREMOR_FREQ_HZ: f64 = 4.0;
/// Jerk RMS above this flags movement instability.
pub const JERK_INSTABILITY: f64 = 800.0;
/// Session energy above this flags high demand, in J.
pub const ENERGY_HIGH_DEMAND_J: f64 = 100.0;

/// Derive the scalar summary bundle.
///
/// `angle_deg` is the filtered angle on the uniform grid with step
/// `dt_s`; `spectrum` is `None` when no spectrum was resolvable.
pub fn summarize(
    angle_deg: &[f64],
    dt_s: f64,
    dynamics: &DynamicsSeries,
    spectrum: Option<&AmplitudeSpectrum>,
) -> SummaryMetrics {
    let max = angle_deg.iter().fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let min = angle_deg.iter().fold(f64::INFINITY, |m, &v| m.min(v));
    let amplitude_deg = if max >= min { max - min } else { 0.0 };

    let peak_force_n = dynamics
        .force_n
        .iter()
        .fold(0.0f64, |m, &f| m.max(f.abs()));
    let peak_torque_nm = dynamics
        .torque_nm
        .iter()
        .fold(0.0f64, |m, &t| m.max(t.abs()));

    SummaryMetrics {
        amplitude_deg,
        jerk_rms: jerk_rms(angle_deg, dt_s),
        peak_force_kgf: peak_force_n / GRAVITY,
        peak_torque_nm,
        total_energy_j: dynamics.energy_j,
        peak_tremor_freq_hz: spectrum.map(|s| s.peak_frequency()).unwrap_or(0.0),
    }
}

/// RMS of the third time derivative of angle.
///
/// Three chained central differences; any numerical failure yields 0
/// rather than propagating.
pub fn jerk_rms(angle_deg: &[f64], dt_s: f64) -> f64 {
    if angle_deg.is_empty() || dt_s <= 0.0 {
        return 0.0;
    }
    let d1 = central_difference(angle_deg, dt_s);
    let d2 = central_difference(&d1, dt_s);
    let d3 = central_difference(&d2, dt_s);
    let mean_sq = d3.iter().map(|j| j * j).sum::<f64>() / d3.len() as f64;
    let rms = mean_sq.sqrt();
    if rms.is_finite() {
        rms
    } else {
        0.0
    }
}

/// Map the summary bundle to qualitative interpretation lines.
///
/// `dynamics_available` distinguishes a genuine near-zero measurement
/// from a degraded (zeroed) dynamics result.
pub fn interpret(metrics: &SummaryMetrics, dynamics_available: bool) -> Vec<String> {
    let mut lines = Vec::new();

    let amp = metrics.amplitude_deg;
    if amp < AMPLITUDE_CRITICAL_DEG {
        lines.push(format!(
            "Critical amplitude ({amp:.1}°): short movement excursion"
        ));
    } else if amp < AMPLITUDE_EXCELLENT_DEG {
        lines.push(format!(
            "Functional amplitude ({amp:.1}°): acceptable excursion"
        ));
    } else {
        lines.push(format!(
            "Excellent amplitude ({amp:.1}°): full movement excursion"
        ));
    }

    if metrics.peak_tremor_freq_hz > TREMOR_FREQ_HZ {
        lines.push(format!(
            "Tremor detected ({:.1} Hz): rapid oscillation",
            metrics.peak_tremor_freq_hz
        ));
    } else if metrics.jerk_rms > JERK_INSTABILITY {
        lines.push(format!(
            "Instability: abrupt movement (jerk {:.0})",
            metrics.jerk_rms
        ));
    } else {
        lines.push("Smooth, controlled movement".to_string());
    }

    if dynamics_available {
        lines.push(format!(
            "Load: {:.1} kgf ({:.1} Nm)",
            metrics.peak_force_kgf, metrics.peak_torque_nm
        ));
        if metrics.total_energy_j > ENERGY_HIGH_DEMAND_J {
            lines.push(format!(
                "High demand: {:.1} J of mechanical work",
                metrics.total_energy_j
            ));
        }
    } else {
        lines.push("Load analysis unavailable".to_string());
    }

    lines
}
