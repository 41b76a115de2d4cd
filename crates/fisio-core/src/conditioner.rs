//! Signal Conditioner — uniform resampling and smoothing
//!
//! Places raw (timestamp, angle) samples from the variable serial-read
//! rate onto a uniform time grid by linear interpolation, then applies a
//! configurable smoothing stage: a boxcar moving average (interactive
//! dashboard path) or a zero-phase 4th-order Butterworth low-pass
//! (scientific-report path).
//!
//! The grid step is derived from the mean timestamp interval of the
//! input; the nominal device rate (50 Hz) is used only when the derived
//! interval is degenerate. The grid never extends past the raw time
//! range, so no extrapolation occurs.
//!
//! ## Example
//!
//! ```rust
//! use fisio_core::conditioner::{ConditionerConfig, SignalConditioner};
//! use fisio_core::types::Sample;
//!
//! let samples: Vec<Sample> = (0..100)
//!     .map(|i| Sample::new(i as f64 * 20.0, (i as f64 * 0.1).sin() * 30.0))
//!     .collect();
//! let conditioner = SignalConditioner::new(ConditionerConfig::default());
//! let series = conditioner.condition(&samples).unwrap();
//! assert!((series.sample_rate() - 50.0).abs() < 1e-6);
//! ```

use crate::filters::{filtfilt, moving_average_same, ButterworthLowpass};
use crate::types::{AnalysisError, AnalysisResult, Sample, UniformSeries};
use serde::{Deserialize, Serialize};

/// Minimum raw samples required for conditioning.
pub const MIN_SAMPLES: usize = 3;

/// Smoothing stage selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingKind {
    /// Boxcar convolution of the given window length.
    MovingAverage { window: usize },
    /// Butterworth low-pass applied forward-backward (zero phase).
    ButterworthZeroPhase { cutoff_hz: f64, order: usize },
}

impl SmoothingKind {
    /// Dashboard default: 10-sample moving average.
    pub fn moving_average() -> Self {
        SmoothingKind::MovingAverage { window: 10 }
    }

    /// Scientific-report default: 4th-order Butterworth at 6 Hz.
    pub fn butterworth() -> Self {
        SmoothingKind::ButterworthZeroPhase {
            cutoff_hz: 6.0,
            order: 4,
        }
    }
}

/// Signal conditioner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionerConfig {
    /// Nominal device sample rate in Hz, used only when the
    /// timestamp-derived interval is degenerate.
    pub nominal_rate_hz: f64,
    /// Smoothing stage.
    pub smoothing: SmoothingKind,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        Self {
            nominal_rate_hz: 50.0,
            smoothing: SmoothingKind::moving_average(),
        }
    }
}

/// Resamples and smooths a raw angle series onto a uniform time grid.
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    config: ConditionerConfig,
}

impl SignalConditioner {
    pub fn new(config: ConditionerConfig) -> Self {
        Self { config }
    }

    /// Condition a raw sample sequence into a uniform, smoothed series.
    ///
    /// # Errors
    /// - `InsufficientData` when fewer than 3 samples are given or the
    ///   recording is too short to fill a 3-point grid
    /// - `NonMonotonicTimestamps` on duplicate or decreasing timestamps
    /// - `NumericalInstability` when the input or the smoothed output
    ///   contains NaN/Inf
    pub fn condition(&self, samples: &[Sample]) -> AnalysisResult<UniformSeries> {
        if samples.len() < MIN_SAMPLES {
            return Err(AnalysisError::InsufficientData {
                required: MIN_SAMPLES,
                actual: samples.len(),
            });
        }
        for (i, pair) in samples.windows(2).enumerate() {
            if pair[1].t_ms <= pair[0].t_ms {
                return Err(AnalysisError::NonMonotonicTimestamps { index: i + 1 });
            }
        }
        if samples
            .iter()
            .any(|s| !s.t_ms.is_finite() || !s.angle_deg.is_finite())
        {
            return Err(AnalysisError::NumericalInstability(
                "non-finite raw sample".into(),
            ));
        }

        let t0_s = samples[0].t_ms / 1000.0;
        let t_end_s = samples[samples.len() - 1].t_ms / 1000.0;
        let dt_s = self.grid_step(samples);

        // Grid stays inside [t0, t_end]; interpolation only, never
        // extrapolation.
        let n_grid = ((t_end_s - t0_s) / dt_s).floor() as usize + 1;
        if n_grid < MIN_SAMPLES {
            return Err(AnalysisError::InsufficientData {
                required: MIN_SAMPLES,
                actual: n_grid,
            });
        }

        let mut values = Vec::with_capacity(n_grid);
        let mut seg = 0usize;
        for k in 0..n_grid {
            let t_ms = (t0_s + k as f64 * dt_s) * 1000.0;
            while seg + 2 < samples.len() && samples[seg + 1].t_ms < t_ms {
                seg += 1;
            }
            let (a, b) = (&samples[seg], &samples[seg + 1]);
            let frac = ((t_ms - a.t_ms) / (b.t_ms - a.t_ms)).clamp(0.0, 1.0);
            values.push(a.angle_deg + frac * (b.angle_deg - a.angle_deg));
        }

        let smoothed = self.smooth(&values, 1.0 / dt_s);
        debug_assert_eq!(smoothed.len(), values.len());
        if smoothed.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::NumericalInstability(
                "smoothing produced non-finite values".into(),
            ));
        }

        Ok(UniformSeries {
            t0_s,
            dt_s,
            values: smoothed,
        })
    }

    /// Grid step from the mean timestamp interval, falling back to the
    /// nominal rate when the derived interval is degenerate.
    fn grid_step(&self, samples: &[Sample]) -> f64 {
        let span_ms = samples[samples.len() - 1].t_ms - samples[0].t_ms;
        let mean_dt_s = span_ms / 1000.0 / (samples.len() - 1) as f64;
        let nominal_dt_s = 1.0 / self.config.nominal_rate_hz;
        if !mean_dt_s.is_finite() || mean_dt_s <= 0.0 {
            tracing::debug!(
                nominal_hz = self.config.nominal_rate_hz,
                "degenerate timestamp interval, using nominal rate"
            );
            return nominal_dt_s;
        }
        if (mean_dt_s - nominal_dt_s).abs() / nominal_dt_s > 0.05 {
            tracing::debug!(
                derived_hz = 1.0 / mean_dt_s,
                nominal_hz = self.config.nominal_rate_hz,
                "timestamp-derived rate differs from nominal, using derived"
            );
        }
        mean_dt_s
    }

    fn smooth(&self, values: &[f64], sample_rate: f64) -> Vec<f64> {
        match self.config.smoothing {
            SmoothingKind::MovingAverage { window } => moving_average_same(values, window),
            SmoothingKind::ButterworthZeroPhase { cutoff_hz, order } => {
                // Cutoff must sit below Nyquist for the design to be valid
                let cutoff = cutoff_hz.min(0.49 * sample_rate);
                let lpf = ButterworthLowpass::design(order, cutoff, sample_rate);
                filtfilt(&lpf, values)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_samples(n: usize, dt_ms: f64) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample::new(i as f64 * dt_ms, i as f64 * 0.5))
            .collect()
    }

    #[test]
    fn test_too_few_samples_rejected() {
        let conditioner = SignalConditioner::new(ConditionerConfig::default());
        let err = conditioner.condition(&ramp_samples(2, 20.0)).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData {
                required: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_duplicate_timestamps_rejected() {
        let conditioner = SignalConditioner::new(ConditionerConfig::default());
        let samples = vec![
            Sample::new(0.0, 1.0),
            Sample::new(20.0, 2.0),
            Sample::new(20.0, 3.0),
            Sample::new(40.0, 4.0),
        ];
        let err = conditioner.condition(&samples).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::NonMonotonicTimestamps { index: 2 }
        ));
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let conditioner = SignalConditioner::new(ConditionerConfig::default());
        let mut samples = ramp_samples(10, 20.0);
        samples[4].angle_deg = f64::NAN;
        let err = conditioner.condition(&samples).unwrap_err();
        assert!(matches!(err, AnalysisError::NumericalInstability(_)));
    }

    #[test]
    fn test_rate_derived_from_timestamps() {
        // 10 ms interval: 100 Hz actual vs 50 Hz nominal
        let conditioner = SignalConditioner::new(ConditionerConfig::default());
        let series = conditioner.condition(&ramp_samples(50, 10.0)).unwrap();
        assert!((series.sample_rate() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_grid_stays_inside_time_range() {
        let conditioner = SignalConditioner::new(ConditionerConfig::default());
        let samples = ramp_samples(40, 20.0);
        let series = conditioner.condition(&samples).unwrap();
        let t_last = series.t0_s + (series.len() - 1) as f64 * series.dt_s;
        assert!(t_last <= samples[39].t_ms / 1000.0 + 1e-9);
    }

    #[test]
    fn test_linear_signal_preserved() {
        // A ramp passes through linear interpolation and moving average
        // almost unchanged at interior points
        let conditioner = SignalConditioner::new(ConditionerConfig::default());
        let series = conditioner.condition(&ramp_samples(100, 20.0)).unwrap();
        let expected = 0.5 * 50.0; // value at grid index 50
        assert!((series.values[50] - expected).abs() < 0.5);
    }

    #[test]
    fn test_butterworth_path() {
        let config = ConditionerConfig {
            smoothing: SmoothingKind::butterworth(),
            ..Default::default()
        };
        let conditioner = SignalConditioner::new(config);
        let samples: Vec<Sample> = (0..200)
            .map(|i| {
                let t = i as f64 * 0.02;
                // 1 Hz motion plus 15 Hz noise
                let angle = 30.0 * (2.0 * std::f64::consts::PI * t).sin()
                    + 5.0 * (2.0 * std::f64::consts::PI * 15.0 * t).sin();
                Sample::new(t * 1000.0, angle)
            })
            .collect();
        let series = conditioner.condition(&samples).unwrap();
        assert_eq!(series.len(), 200);
        assert!(series.values.iter().all(|v| v.is_finite()));
        // The 15 Hz component is in the stopband; peak stays near 30°
        let peak = series.values.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
        assert!(peak < 32.0, "noise not attenuated: {peak}");
    }
}
