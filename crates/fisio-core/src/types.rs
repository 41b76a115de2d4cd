//! Core types for biomechanical signal processing
//!
//! This module defines the fundamental types shared by the analysis
//! pipeline: raw sensor samples, uniformly resampled series, derived
//! kinematic and dynamic series, and the scalar summary bundle.
//!
//! ## Understanding the series types
//!
//! The wearable streams orientation angles (pitch/roll per sensor) at a
//! variable serial-read rate. The pipeline first places the joint angle
//! on a uniform time grid (`UniformSeries`), then derives velocity and
//! acceleration (`KinematicSeries`) and joint torque and reaction force
//! (`DynamicsSeries`) on that same grid. All derived series are created
//! fresh per analysis invocation and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Gravitational acceleration in m/s².
pub const GRAVITY: f64 = 9.81;

/// Number of orientation sensors on the device.
pub const NUM_SENSORS: usize = 3;

/// A single raw joint-angle sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Timestamp in milliseconds since session start.
    pub t_ms: f64,
    /// Joint angle in degrees.
    pub angle_deg: f64,
}

impl Sample {
    pub fn new(t_ms: f64, angle_deg: f64) -> Self {
        Self { t_ms, angle_deg }
    }
}

/// A multi-channel orientation frame as emitted by the acquisition layer.
///
/// Matches the device CSV layout `p1,r1,y1,p2,r2,y2,p3,r3,y3,t_ms`:
/// three inertial sensors, each reporting pitch and roll. Yaw is carried
/// by the acquisition layer but never consumed by the core, so it is not
/// modeled here. Channels lost to transmission errors are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorFrame {
    /// Timestamp in milliseconds since session start.
    pub t_ms: f64,
    /// Pitch per sensor in degrees.
    pub pitch: [Option<f64>; NUM_SENSORS],
    /// Roll per sensor in degrees.
    pub roll: [Option<f64>; NUM_SENSORS],
}

impl SensorFrame {
    /// Frame with all channels present.
    pub fn full(t_ms: f64, pitch: [f64; NUM_SENSORS], roll: [f64; NUM_SENSORS]) -> Self {
        Self {
            t_ms,
            pitch: pitch.map(Some),
            roll: roll.map(Some),
        }
    }

    /// First available channel, pitch before roll, in sensor order.
    ///
    /// Used as the degraded channel-selection heuristic when the channel
    /// an exercise profile asks for is missing.
    pub fn first_available(&self) -> Option<f64> {
        self.pitch
            .iter()
            .chain(self.roll.iter())
            .find_map(|c| *c)
    }
}

/// Angle values on a strictly increasing, evenly spaced time grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformSeries {
    /// Time of the first grid point in seconds.
    pub t0_s: f64,
    /// Grid step in seconds.
    pub dt_s: f64,
    /// Angle values in degrees, one per grid point.
    pub values: Vec<f64>,
}

impl UniformSeries {
    /// Sample rate implied by the grid step.
    pub fn sample_rate(&self) -> f64 {
        1.0 / self.dt_s
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Time axis in seconds.
    pub fn time(&self) -> Vec<f64> {
        (0..self.values.len())
            .map(|i| self.t0_s + i as f64 * self.dt_s)
            .collect()
    }
}

/// Angle plus its first two time derivatives on the uniform grid.
///
/// Velocity and acceleration are computed over the angle in radians;
/// the angle itself is kept in degrees for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicSeries {
    /// Filtered joint angle in degrees.
    pub angle_deg: Vec<f64>,
    /// Angular velocity in rad/s.
    pub velocity_rad_s: Vec<f64>,
    /// Angular acceleration in rad/s².
    pub acceleration_rad_s2: Vec<f64>,
    /// Grid step in seconds.
    pub dt_s: f64,
}

/// Joint torque and reaction force on the uniform grid, plus the
/// session energy integral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicsSeries {
    /// Joint torque in N·m.
    pub torque_nm: Vec<f64>,
    /// Reaction force at the lever arm in N.
    pub force_n: Vec<f64>,
    /// Simpson-integrated |torque × angular velocity| over the session, in J.
    pub energy_j: f64,
}

impl DynamicsSeries {
    /// All-zero series of the given length.
    ///
    /// Used as the degraded stand-in when the dynamics computation
    /// fails; callers must pair it with an "analysis unavailable"
    /// marker so it is never mistaken for a genuine measurement.
    pub fn zeroed(len: usize) -> Self {
        Self {
            torque_nm: vec![0.0; len],
            force_n: vec![0.0; len],
            energy_j: 0.0,
        }
    }
}

/// Scalar summary bundle derived from a completed analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Range of motion: max − min of the filtered angle, in degrees.
    pub amplitude_deg: f64,
    /// RMS of the third time derivative of angle (smoothness index).
    pub jerk_rms: f64,
    /// Peak reaction force converted to kgf.
    pub peak_force_kgf: f64,
    /// Peak absolute joint torque in N·m.
    pub peak_torque_nm: f64,
    /// Total mechanical energy in J.
    pub total_energy_j: f64,
    /// Frequency of the dominant spectral peak in Hz (0 when no spectrum).
    pub peak_tremor_freq_hz: f64,
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur during analysis.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Timestamps not strictly increasing at index {index}")]
    NonMonotonicTimestamps { index: usize },

    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    #[error("Insufficient cycles for ensemble: found {found}, need at least 2")]
    InsufficientCycles { found: usize },
}
