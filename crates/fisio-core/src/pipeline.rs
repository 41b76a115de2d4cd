//! Session analysis pipeline
//!
//! Orchestrates the full biomechanical analysis of one completed
//! recording session: conditioning, kinematics, pendulum dynamics,
//! spectral analysis, cycle ensembling, and the scalar summary. The
//! pipeline is a single-threaded, synchronous transform over an
//! immutable snapshot of samples; every invocation allocates its own
//! series and leaves no state behind.
//!
//! ```text
//! frames/samples → Conditioner → Kinematics → ┬ Dynamics   ┐
//!                                             ├ Spectrum   ├→ Summary → SessionReport
//!                                             └ Cycles     ┘
//! ```
//!
//! Degradation policy: dynamics failures produce a zeroed series with
//! `dynamics_available = false` so the dashboard can always render;
//! fewer than 2 movement cycles leaves `ensemble` as `None` and the
//! caller falls back to the raw continuous series; an unresolvable
//! spectrum is `None`. Conditioner failures on malformed input propagate
//! as errors since they indicate unusable input.
//!
//! ## Example
//!
//! ```rust
//! use fisio_core::model::{Exercise, SexClass, SubjectParams};
//! use fisio_core::pipeline::{AnalyzerConfig, SessionAnalyzer};
//! use fisio_core::types::Sample;
//!
//! let samples: Vec<Sample> = (0..500)
//!     .map(|i| {
//!         let t = i as f64 * 0.02;
//!         Sample::new(t * 1000.0, 40.0 * (2.0 * std::f64::consts::PI * t).sin())
//!     })
//!     .collect();
//! let subject = SubjectParams {
//!     mass_kg: 70.0,
//!     height_m: 1.70,
//!     sex: SexClass::Male,
//!     exercise: Exercise::KneeFlexion,
//! };
//! let analyzer = SessionAnalyzer::new(AnalyzerConfig::default());
//! let report = analyzer.analyze_angles(&samples, &subject).unwrap();
//! assert!(report.dynamics_available);
//! assert!(report.metrics.amplitude_deg > 60.0);
//! ```

use crate::conditioner::{ConditionerConfig, SignalConditioner, SmoothingKind};
use crate::cycles::{CycleConfig, CycleSegmenter, Ensemble};
use crate::model::{SubjectModel, SubjectParams};
use crate::spectrum::{AmplitudeSpectrum, SpectrumAnalyzer};
use crate::summary::{interpret, summarize};
use crate::types::{
    AnalysisError, AnalysisResult, DynamicsSeries, KinematicSeries, Sample, SensorFrame,
    SummaryMetrics,
};
use serde::{Deserialize, Serialize};

/// One point of the phase portrait (coordination view).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhasePoint {
    /// Filtered angle in degrees.
    pub angle_deg: f64,
    /// Angular velocity in °/s.
    pub velocity_deg_s: f64,
    /// Time in seconds.
    pub time_s: f64,
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub conditioner: ConditionerConfig,
    pub cycles: CycleConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::dashboard()
    }
}

impl AnalyzerConfig {
    /// Interactive dashboard preset: moving-average smoothing.
    pub fn dashboard() -> Self {
        Self {
            conditioner: ConditionerConfig::default(),
            cycles: CycleConfig::default(),
        }
    }

    /// Scientific-report preset: zero-phase Butterworth smoothing.
    pub fn scientific_report() -> Self {
        Self {
            conditioner: ConditionerConfig {
                smoothing: SmoothingKind::butterworth(),
                ..ConditionerConfig::default()
            },
            cycles: CycleConfig::default(),
        }
    }
}

/// Complete analysis output for one recording session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Uniform time axis in seconds.
    pub time_s: Vec<f64>,
    /// Filtered joint angle in degrees, per grid point.
    pub angle_deg: Vec<f64>,
    /// Joint torque in N·m, per grid point (zeroed when unavailable).
    pub torque_nm: Vec<f64>,
    /// Reaction force in N, per grid point (zeroed when unavailable).
    pub force_n: Vec<f64>,
    /// False when the dynamics computation degraded and the torque,
    /// force, and energy values are a zeroed stand-in. Presentation
    /// layers must show "analysis unavailable" in that case.
    pub dynamics_available: bool,
    /// Scalar summary bundle.
    pub metrics: SummaryMetrics,
    /// Qualitative interpretation lines.
    pub interpretation: Vec<String>,
    /// Cycle ensemble; `None` means fewer than 2 cycles were found and
    /// the continuous series is the fallback view.
    pub ensemble: Option<Ensemble>,
    /// Angle/velocity/time triples for the phase portrait.
    pub phase_portrait: Vec<PhasePoint>,
    /// Single-sided amplitude spectrum; `None` for degenerate input.
    pub spectrum: Option<AmplitudeSpectrum>,
}

/// Runs the full analysis pipeline for one session.
#[derive(Debug, Clone)]
pub struct SessionAnalyzer {
    config: AnalyzerConfig,
}

impl Default for SessionAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl SessionAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Analyze multi-channel frames: the joint-angle channel is selected
    /// by the subject's exercise profile.
    pub fn analyze_frames(
        &self,
        frames: &[SensorFrame],
        subject: &SubjectParams,
    ) -> AnalysisResult<SessionReport> {
        let model = SubjectModel::new(subject);
        if let Some(first) = frames.first() {
            if !model.has_required_channels(first) {
                tracing::warn!(
                    exercise = ?model.exercise(),
                    "required channels missing, falling back to first available channel"
                );
            }
        }
        let samples: Vec<Sample> = frames
            .iter()
            .map(|f| Sample::new(f.t_ms, model.joint_angle(f)))
            .collect();
        self.run(&samples, &model)
    }

    /// Analyze a pre-derived joint-angle series.
    pub fn analyze_angles(
        &self,
        samples: &[Sample],
        subject: &SubjectParams,
    ) -> AnalysisResult<SessionReport> {
        self.run(samples, &SubjectModel::new(subject))
    }

    fn run(&self, samples: &[Sample], model: &SubjectModel) -> AnalysisResult<SessionReport> {
        let conditioner = SignalConditioner::new(self.config.conditioner);
        let series = conditioner.condition(samples)?;
        let dt = series.dt_s;
        tracing::debug!(
            samples = samples.len(),
            grid = series.len(),
            rate_hz = series.sample_rate(),
            "conditioned session"
        );

        // Kinematics: two chained central differences over radians
        let theta_rad: Vec<f64> = series.values.iter().map(|a| a.to_radians()).collect();
        let velocity_rad_s = crate::calculus::central_difference(&theta_rad, dt);
        let acceleration_rad_s2 = crate::calculus::central_difference(&velocity_rad_s, dt);
        let kin = KinematicSeries {
            angle_deg: series.values.clone(),
            velocity_rad_s,
            acceleration_rad_s2,
            dt_s: dt,
        };

        let (dynamics, dynamics_available) = match model.dynamics(&kin) {
            Ok(d) => (d, true),
            Err(reason) => {
                tracing::warn!(%reason, "dynamics degraded, reporting zeroed series");
                (DynamicsSeries::zeroed(series.len()), false)
            }
        };

        let spectrum = SpectrumAnalyzer::new().analyze(&series.values, series.sample_rate());

        let ensemble = match CycleSegmenter::new(self.config.cycles).segment(&series) {
            Ok(e) => Some(e),
            Err(AnalysisError::InsufficientCycles { found }) => {
                tracing::debug!(found, "no ensemble, falling back to continuous series");
                None
            }
            Err(e) => return Err(e),
        };

        let metrics = summarize(&series.values, dt, &dynamics, spectrum.as_ref());
        let interpretation = interpret(&metrics, dynamics_available);

        let velocity_deg_s = crate::calculus::central_difference(&series.values, dt);
        let time_s = series.time();
        let phase_portrait = series
            .values
            .iter()
            .zip(velocity_deg_s.iter())
            .zip(time_s.iter())
            .map(|((&angle_deg, &velocity_deg_s), &time_s)| PhasePoint {
                angle_deg,
                velocity_deg_s,
                time_s,
            })
            .collect();

        Ok(SessionReport {
            time_s,
            angle_deg: series.values,
            torque_nm: dynamics.torque_nm,
            force_n: dynamics.force_n,
            dynamics_available,
            metrics,
            interpretation,
            ensemble,
            phase_portrait,
            spectrum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exercise, SexClass};
    use std::f64::consts::PI;

    fn subject(exercise: Exercise) -> SubjectParams {
        SubjectParams {
            mass_kg: 70.0,
            height_m: 1.70,
            sex: SexClass::Male,
            exercise,
        }
    }

    fn sine_samples(freq: f64, amp: f64, seconds: f64) -> Vec<Sample> {
        let fs = 50.0;
        (0..(fs * seconds) as usize)
            .map(|i| {
                let t = i as f64 / fs;
                Sample::new(t * 1000.0, amp * (2.0 * PI * freq * t).sin())
            })
            .collect()
    }

    #[test]
    fn test_per_sample_outputs_share_grid() {
        let analyzer = SessionAnalyzer::default();
        let report = analyzer
            .analyze_angles(&sine_samples(1.0, 40.0, 10.0), &subject(Exercise::KneeFlexion))
            .unwrap();
        let n = report.time_s.len();
        assert_eq!(report.angle_deg.len(), n);
        assert_eq!(report.torque_nm.len(), n);
        assert_eq!(report.force_n.len(), n);
        assert_eq!(report.phase_portrait.len(), n);
        assert!(report.dynamics_available);
    }

    #[test]
    fn test_repetitive_motion_yields_ensemble() {
        let analyzer = SessionAnalyzer::new(AnalyzerConfig::scientific_report());
        let report = analyzer
            .analyze_angles(&sine_samples(1.0, 40.0, 10.0), &subject(Exercise::KneeFlexion))
            .unwrap();
        let ensemble = report.ensemble.expect("10 repetitions must ensemble");
        assert!(ensemble.num_cycles() >= 8);
        // Identical repetitions: tight ensemble
        let max_std = ensemble.std.iter().fold(0.0f64, |m, &s| m.max(s));
        assert!(max_std < 1.0, "ensemble std {max_std}");
    }

    #[test]
    fn test_short_session_falls_back_to_continuous() {
        // 1.2 s of a single slow rise: no repetitions
        let analyzer = SessionAnalyzer::default();
        let samples: Vec<Sample> = (0..60)
            .map(|i| Sample::new(i as f64 * 20.0, i as f64))
            .collect();
        let report = analyzer
            .analyze_angles(&samples, &subject(Exercise::KneeFlexion))
            .unwrap();
        assert!(report.ensemble.is_none());
        assert!(!report.angle_deg.is_empty());
    }

    #[test]
    fn test_degenerate_subject_reports_unavailable() {
        let analyzer = SessionAnalyzer::default();
        let bad = SubjectParams {
            mass_kg: 0.0,
            ..subject(Exercise::KneeFlexion)
        };
        let report = analyzer
            .analyze_angles(&sine_samples(1.0, 40.0, 5.0), &bad)
            .unwrap();
        assert!(!report.dynamics_available);
        assert!(report.torque_nm.iter().all(|&t| t == 0.0));
        assert!(report
            .interpretation
            .iter()
            .any(|l| l.contains("unavailable")));
    }

    #[test]
    fn test_tremor_detected_end_to_end() {
        // 5 Hz oscillation at 50 Hz for 4 s. The report path keeps the
        // tremor band: the 6 Hz Butterworth passes 5 Hz, where a
        // 10-sample moving average at 50 Hz would null it.
        let analyzer = SessionAnalyzer::new(AnalyzerConfig::scientific_report());
        let report = analyzer
            .analyze_angles(&sine_samples(5.0, 20.0, 4.0), &subject(Exercise::KneeFlexion))
            .unwrap();
        let freq = report.metrics.peak_tremor_freq_hz;
        assert!(
            (freq - 5.0).abs() <= 0.5,
            "tremor peak resolved at {freq} Hz"
        );
        assert!(report
            .interpretation
            .iter()
            .any(|l| l.starts_with("Tremor detected")));
    }

    #[test]
    fn test_frames_use_exercise_channel() {
        let analyzer = SessionAnalyzer::default();
        let frames: Vec<SensorFrame> = (0..300)
            .map(|i| {
                let t = i as f64 / 50.0;
                let knee = 30.0 * (2.0 * PI * t).sin();
                // p2 - p1 must reconstruct the knee angle
                SensorFrame::full(t * 1000.0, [10.0, 10.0 + knee, 0.0], [0.0, 0.0, 0.0])
            })
            .collect();
        let report = analyzer
            .analyze_frames(&frames, &subject(Exercise::KneeFlexion))
            .unwrap();
        // 60° peak-to-peak, less the moving-average passband droop at 1 Hz
        assert!(report.metrics.amplitude_deg > 50.0 && report.metrics.amplitude_deg <= 61.0);
    }

    #[test]
    fn test_malformed_input_propagates() {
        let analyzer = SessionAnalyzer::default();
        let err = analyzer
            .analyze_angles(&[], &subject(Exercise::KneeFlexion))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }

    #[test]
    fn test_energy_non_negative_end_to_end() {
        let analyzer = SessionAnalyzer::default();
        let report = analyzer
            .analyze_angles(&sine_samples(1.5, 50.0, 8.0), &subject(Exercise::HipAbduction))
            .unwrap();
        assert!(report.metrics.total_energy_j >= 0.0);
    }
}
