//! # Biomechanical Analysis Core
//!
//! This crate provides the signal-processing core of a wearable
//! rehabilitation system: it turns raw orientation-sensor telemetry
//! (pitch/roll per sensor, streamed over a serial link by an external
//! acquisition layer) into joint-angle kinematics, pendulum dynamics,
//! spectral tremor assessment, movement-cycle consistency statistics,
//! and a scalar clinical summary.
//!
//! ## Overview
//!
//! The pipeline is a one-directional chain of pure transforms over a
//! completed recording session:
//!
//! ```text
//! raw samples → Conditioner → Kinematics ─┬→ Dynamics (torque, force, energy)
//!   (resample,    (uniform      (ω, α)    ├→ Spectrum (tremor band)
//!    smooth)       grid)                  ├→ Cycles   (ensemble mean ± std)
//!                                         └→ Summary  (ROM, jerk, peaks)
//! ```
//!
//! - **[`conditioner`]**: uniform resampling plus moving-average or
//!   zero-phase Butterworth smoothing
//! - **[`calculus`]**: central-difference derivatives and Simpson
//!   integration
//! - **[`model`]**: per-exercise anthropometrics and the rigid-pendulum
//!   dynamics equation `τ = I·α + m·g·r·sin θ`
//! - **[`spectrum`]**: single-sided FFT amplitude spectrum and the
//!   4-8 Hz tremor band
//! - **[`cycles`]**: prominence-based repetition detection and 0-100%
//!   phase-normalized ensemble averaging
//! - **[`summary`]**: scalar metrics and qualitative interpretation
//! - **[`pipeline`]**: the [`SessionAnalyzer`] orchestrating all of it
//!
//! Serial-port handling, CSV persistence, and any presentation layer are
//! external collaborators: they hand this crate an immutable snapshot of
//! samples plus subject parameters, and consume the report it returns.
//!
//! ## Example
//!
//! ```rust
//! use fisio_core::model::{Exercise, SexClass, SubjectParams};
//! use fisio_core::pipeline::SessionAnalyzer;
//! use fisio_core::types::Sample;
//!
//! // Ten knee flexion repetitions at 1 Hz
//! let samples: Vec<Sample> = (0..500)
//!     .map(|i| {
//!         let t = i as f64 * 0.02;
//!         Sample::new(t * 1000.0, 45.0 * (2.0 * std::f64::consts::PI * t).sin())
//!     })
//!     .collect();
//!
//! let subject = SubjectParams {
//!     mass_kg: 70.0,
//!     height_m: 1.70,
//!     sex: SexClass::Male,
//!     exercise: Exercise::KneeFlexion,
//! };
//!
//! let report = SessionAnalyzer::default()
//!     .analyze_angles(&samples, &subject)
//!     .unwrap();
//! println!("ROM: {:.1}°", report.metrics.amplitude_deg);
//! for line in &report.interpretation {
//!     println!("{line}");
//! }
//! ```

pub mod calculus;
pub mod conditioner;
pub mod cycles;
pub mod filters;
pub mod model;
pub mod observe;
pub mod pipeline;
pub mod spectrum;
pub mod summary;
pub mod types;

pub use conditioner::{ConditionerConfig, SignalConditioner, SmoothingKind};
pub use cycles::{CycleConfig, CycleSegmenter, Ensemble};
pub use model::{DegradedReason, Exercise, SexClass, SubjectModel, SubjectParams};
pub use pipeline::{AnalyzerConfig, PhasePoint, SessionAnalyzer, SessionReport};
pub use spectrum::{AmplitudeSpectrum, SpectrumAnalyzer};
pub use summary::{interpret, summarize};
pub use types::{
    AnalysisError, AnalysisResult, DynamicsSeries, KinematicSeries, Sample, SensorFrame,
    SummaryMetrics, UniformSeries,
};
