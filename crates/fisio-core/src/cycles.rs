//! Cycle Segmenter & Ensembler — repetition detection and consistency
//!
//! Detects repetition cycles in the filtered angle series via local
//! maxima with a prominence criterion (25% of the series range) and a
//! minimum inter-peak distance (0.8 s). Each cycle between consecutive
//! accepted peaks is resampled by cubic Hermite interpolation onto 100
//! equally spaced phase points (0-100% of the cycle), and the ensemble
//! mean and standard deviation across cycles quantify movement
//! consistency.
//!
//! Fewer than 2 retained cycles is reported as
//! [`AnalysisError::InsufficientCycles`]; the caller falls back to
//! displaying the raw continuous series.
//!
//! ## Example
//!
//! ```rust
//! use fisio_core::cycles::{CycleConfig, CycleSegmenter};
//! use fisio_core::types::UniformSeries;
//!
//! // Five identical 1 Hz repetitions at 50 Hz
//! let values: Vec<f64> = (0..=250)
//!     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 50.0).sin() * 40.0)
//!     .collect();
//! let series = UniformSeries { t0_s: 0.0, dt_s: 0.02, values };
//! let segmenter = CycleSegmenter::new(CycleConfig::default());
//! let ensemble = segmenter.segment(&series).unwrap();
//! assert_eq!(ensemble.num_cycles(), 4); // N peaks -> N-1 cycles
//! ```

use crate::types::{AnalysisError, AnalysisResult, UniformSeries};
use serde::{Deserialize, Serialize};

/// Cycle segmentation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Peak prominence threshold as a fraction of the series range.
    pub prominence_fraction: f64,
    /// Minimum inter-peak distance in seconds.
    pub min_distance_s: f64,
    /// Cycles with this many samples or fewer are discarded.
    pub min_cycle_samples: usize,
    /// Phase points per normalized cycle.
    pub phase_points: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            prominence_fraction: 0.25,
            min_distance_s: 0.8,
            min_cycle_samples: 10,
            phase_points: 100,
        }
    }
}

/// Normalized cycles with their pointwise ensemble statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    /// Phase axis in percent, `phase_points` values from 0 to 100.
    pub phase_percent: Vec<f64>,
    /// Each retained cycle resampled onto the phase axis.
    pub cycles: Vec<Vec<f64>>,
    /// Pointwise mean across cycles.
    pub mean: Vec<f64>,
    /// Pointwise standard deviation across cycles.
    pub std: Vec<f64>,
}

impl Ensemble {
    pub fn num_cycles(&self) -> usize {
        self.cycles.len()
    }

    /// Range of motion of the mean curve, in the input's units.
    pub fn mean_rom(&self) -> f64 {
        let max = self.mean.iter().fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        let min = self.mean.iter().fold(f64::INFINITY, |m, &v| m.min(v));
        if max >= min {
            max - min
        } else {
            0.0
        }
    }
}

/// Peak-based cycle segmenter.
#[derive(Debug, Clone)]
pub struct CycleSegmenter {
    config: CycleConfig,
}

impl CycleSegmenter {
    pub fn new(config: CycleConfig) -> Self {
        Self { config }
    }

    /// Segment a uniform series into normalized cycles and compute the
    /// ensemble statistics.
    pub fn segment(&self, series: &UniformSeries) -> AnalysisResult<Ensemble> {
        let y = &series.values;
        let max = y.iter().fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        let min = y.iter().fold(f64::INFINITY, |m, &v| m.min(v));
        let range = if max > min { max - min } else { 0.0 };

        let min_distance = (self.config.min_distance_s * series.sample_rate()) as usize;
        let peaks = find_peaks(y, range * self.config.prominence_fraction, min_distance);

        let mut cycles = Vec::new();
        for pair in peaks.windows(2) {
            let cycle = &y[pair[0]..pair[1]];
            if cycle.len() > self.config.min_cycle_samples {
                cycles.push(resample_phase(cycle, self.config.phase_points));
            }
        }

        if cycles.len() < 2 {
            tracing::debug!(
                peaks = peaks.len(),
                retained = cycles.len(),
                "insufficient cycles for ensemble"
            );
            return Err(AnalysisError::InsufficientCycles {
                found: cycles.len(),
            });
        }

        let p = self.config.phase_points;
        let n = cycles.len() as f64;
        let mut mean = vec![0.0; p];
        let mut std = vec![0.0; p];
        for cycle in &cycles {
            for (m, v) in mean.iter_mut().zip(cycle.iter()) {
                *m += v / n;
            }
        }
        for cycle in &cycles {
            for ((s, v), m) in std.iter_mut().zip(cycle.iter()).zip(mean.iter()) {
                *s += (v - m) * (v - m) / n;
            }
        }
        for s in &mut std {
            *s = s.sqrt();
        }

        let phase_percent = (0..p)
            .map(|k| 100.0 * k as f64 / (p - 1) as f64)
            .collect();

        Ok(Ensemble {
            phase_percent,
            cycles,
            mean,
            std,
        })
    }
}

/// Local-maxima peak detection with prominence and minimum distance.
///
/// A candidate is a strict local maximum (plateaus yield their midpoint).
/// Its prominence is the height above the higher of the two lowest
/// contour points reached before a taller sample on either side, as in
/// the usual `find_peaks` convention. Distance is enforced greedily from
/// the tallest candidate down. Returned indices are sorted ascending.
pub fn find_peaks(y: &[f64], min_prominence: f64, min_distance: usize) -> Vec<usize> {
    let n = y.len();
    if n < 3 {
        return Vec::new();
    }

    // Candidate maxima, plateau-aware
    let mut candidates = Vec::new();
    let mut i = 1;
    while i < n - 1 {
        if y[i - 1] < y[i] {
            let mut j = i;
            while j + 1 < n && y[j + 1] == y[i] {
                j += 1;
            }
            if j + 1 < n && y[j + 1] < y[i] {
                candidates.push((i + j) / 2);
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }

    // Prominence filter
    candidates.retain(|&peak| prominence(y, peak) >= min_prominence);

    // Distance filter, tallest first
    let mut by_height = candidates.clone();
    by_height.sort_by(|&a, &b| y[b].total_cmp(&y[a]));
    let mut keep = vec![true; n];
    let mut accepted = Vec::new();
    for &peak in &by_height {
        if !keep[peak] {
            continue;
        }
        accepted.push(peak);
        let lo = peak.saturating_sub(min_distance);
        let hi = (peak + min_distance).min(n - 1);
        for k in keep.iter_mut().take(hi + 1).skip(lo) {
            *k = false;
        }
    }
    accepted.sort_unstable();
    accepted
}

/// Prominence of a local maximum.
fn prominence(y: &[f64], peak: usize) -> f64 {
    let p = y[peak];

    let mut left_min = p;
    let mut j = peak;
    while j > 0 {
        j -= 1;
        if y[j] > p {
            break;
        }
        left_min = left_min.min(y[j]);
    }

    let mut right_min = p;
    let mut j = peak;
    while j + 1 < y.len() {
        j += 1;
        if y[j] > p {
            break;
        }
        right_min = right_min.min(y[j]);
    }

    p - left_min.max(right_min)
}

/// Resample a cycle onto `points` equally spaced phase positions by
/// cubic Hermite interpolation over a 4-point neighborhood.
fn resample_phase(cycle: &[f64], points: usize) -> Vec<f64> {
    let len = cycle.len();
    let mut out = Vec::with_capacity(points);
    for k in 0..points {
        let t = k as f64 * (len - 1) as f64 / (points - 1) as f64;
        let idx = (t as usize).min(len - 2);
        let frac = t - idx as f64;

        let y0 = if idx > 0 { cycle[idx - 1] } else { cycle[0] };
        let y1 = cycle[idx];
        let y2 = cycle[idx + 1];
        let y3 = cycle[(idx + 2).min(len - 1)];
        out.push(hermite(frac, y0, y1, y2, y3));
    }
    out
}

fn hermite(t: f64, y0: f64, y1: f64, y2: f64, y3: f64) -> f64 {
    let c0 = y1;
    let c1 = 0.5 * (y2 - y0);
    let c2 = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
    let c3 = 0.5 * (y3 - y0) + 1.5 * (y1 - y2);
    ((c3 * t + c2) * t + c1) * t + c0
}
