//! Biomechanical Model — anthropometrics and pendulum dynamics
//!
//! Maps subject parameters (mass, height, sex) and an exercise profile to
//! segment anthropometrics, selects the joint-angle channel for the
//! exercise, and converts a kinematic series into joint torque, reaction
//! force, and session energy via a rigid-pendulum dynamics equation:
//!
//! ```text
//! torque = I·α + m·g·r·sin(θ)        I = segment_mass · com_radius²
//! force  = torque / lever_length
//! energy = ∫ |torque · ω| dt          (composite Simpson)
//! ```
//!
//! Segment-mass fractions follow standard anthropometric tables keyed by
//! sex; lever and center-of-mass radii are fractions of subject height.
//!
//! A failed dynamics computation (degenerate subject, empty input,
//! non-finite output) reports a [`DegradedReason`] instead of a hard
//! error, so an interactive session can always render something. Callers
//! substitute a zeroed series and must mark it "analysis unavailable"
//! rather than show it as a measurement.
//!
//! ## Example
//!
//! ```rust
//! use fisio_core::model::{Exercise, SexClass, SubjectModel, SubjectParams};
//!
//! let params = SubjectParams {
//!     mass_kg: 70.0,
//!     height_m: 1.70,
//!     sex: SexClass::Male,
//!     exercise: Exercise::KneeFlexion,
//! };
//! let model = SubjectModel::new(&params);
//! assert!(model.segment_mass_kg() > 0.0);
//! assert!(model.lever_length_m() > 0.0);
//! ```

use crate::calculus::simpson;
use crate::types::{DynamicsSeries, KinematicSeries, SensorFrame, GRAVITY};
use serde::{Deserialize, Serialize};

/// Subject sex class, selecting the anthropometric coefficient table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SexClass {
    Male,
    Female,
}

/// Segment-mass fractions of total body mass.
#[derive(Debug, Clone, Copy)]
struct MassFractions {
    thigh: f64,
    shank: f64,
    foot: f64,
}

const MASS_FRACTIONS_MALE: MassFractions = MassFractions {
    thigh: 0.105,
    shank: 0.0475,
    foot: 0.0143,
};

const MASS_FRACTIONS_FEMALE: MassFractions = MassFractions {
    thigh: 0.1175,
    shank: 0.0483,
    foot: 0.0129,
};

/// Segment lengths as fractions of subject height.
const SHANK_LENGTH_FRACTION: f64 = 0.246;
const FOOT_LENGTH_FRACTION: f64 = 0.152;

/// Supported exercise profiles.
///
/// Each variant fixes both the anthropometric parameterization and the
/// joint-angle channel, resolved once at [`SubjectModel`] construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exercise {
    /// Knee flexion/extension: angle from the pitch difference between
    /// the shank and thigh sensors.
    KneeFlexion,
    /// Hip abduction: angle from the thigh sensor roll channel.
    HipAbduction,
    /// Ankle dorsiflexion: angle from the pitch difference between the
    /// foot and shank sensors.
    AnkleDorsiflexion,
    /// Unrecognized exercise; falls back to the distal-segment
    /// (foot) profile and channels.
    Other,
}

impl Exercise {
    /// Parse an exercise label, accepting the device's Portuguese names
    /// and common English equivalents. Unknown labels map to `Other`.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("joelho") || lower.contains("knee") {
            Exercise::KneeFlexion
        } else if lower.contains("quadril") || lower.contains("hip") {
            Exercise::HipAbduction
        } else if lower.contains("dorsifle")
            || lower.contains("tornozelo")
            || lower.contains("ankle")
        {
            Exercise::AnkleDorsiflexion
        } else {
            Exercise::Other
        }
    }
}

/// Joint-angle channel selection, resolved once per exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelSelector {
    /// Pitch difference between two sensors: `pitch[b] - pitch[a]`.
    PitchDiff { a: usize, b: usize },
    /// Single roll channel of one sensor.
    Roll { sensor: usize },
}

impl ChannelSelector {
    /// Exact channels, or `None` if any required channel is missing.
    fn try_angle(&self, frame: &SensorFrame) -> Option<f64> {
        match *self {
            ChannelSelector::PitchDiff { a, b } => Some(frame.pitch[b]? - frame.pitch[a]?),
            ChannelSelector::Roll { sensor } => frame.roll[sensor],
        }
    }
}

/// Subject parameters supplied by the caller per analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectParams {
    pub mass_kg: f64,
    pub height_m: f64,
    pub sex: SexClass,
    pub exercise: Exercise,
}

/// Reason a dynamics computation degraded to a zeroed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DegradedReason {
    #[error("degenerate subject parameters")]
    DegenerateSubject,
    #[error("empty kinematic series")]
    EmptySeries,
    #[error("dynamics produced non-finite values")]
    NonFinite,
}

/// Anthropometric parameterization of one subject for one exercise.
///
/// Immutable once built; created once per analysis request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectModel {
    exercise: Exercise,
    selector: ChannelSelector,
    segment_mass_kg: f64,
    lever_length_m: f64,
    com_radius_m: f64,
}

impl SubjectModel {
    /// Resolve anthropometrics and channel selection for the subject.
    pub fn new(params: &SubjectParams) -> Self {
        let fractions = match params.sex {
            SexClass::Male => MASS_FRACTIONS_MALE,
            SexClass::Female => MASS_FRACTIONS_FEMALE,
        };
        let m = params.mass_kg;
        let h = params.height_m;

        let (selector, segment_mass_kg, lever_length_m, com_radius_m) = match params.exercise {
            Exercise::KneeFlexion => {
                let shank = h * SHANK_LENGTH_FRACTION;
                let lever = shank + h * FOOT_LENGTH_FRACTION * 0.5;
                (
                    ChannelSelector::PitchDiff { a: 0, b: 1 },
                    m * (fractions.shank + fractions.foot),
                    lever,
                    shank * 0.606,
                )
            }
            Exercise::HipAbduction => {
                let lever = h * 0.53;
                (
                    ChannelSelector::Roll { sensor: 0 },
                    m * (fractions.thigh + fractions.shank + fractions.foot),
                    lever,
                    lever * 0.45,
                )
            }
            Exercise::AnkleDorsiflexion | Exercise::Other => {
                let lever = h * FOOT_LENGTH_FRACTION;
                (
                    ChannelSelector::PitchDiff { a: 1, b: 2 },
                    m * fractions.foot,
                    lever,
                    lever * 0.5,
                )
            }
        };

        Self {
            exercise: params.exercise,
            selector,
            segment_mass_kg,
            lever_length_m,
            com_radius_m,
        }
    }

    pub fn exercise(&self) -> Exercise {
        self.exercise
    }

    pub fn segment_mass_kg(&self) -> f64 {
        self.segment_mass_kg
    }

    pub fn lever_length_m(&self) -> f64 {
        self.lever_length_m
    }

    pub fn com_radius_m(&self) -> f64 {
        self.com_radius_m
    }

    /// Joint angle for one frame.
    ///
    /// When the channels the exercise profile asks for are missing, falls
    /// back to the first available channel; a frame with no channels at
    /// all yields 0. Use [`SubjectModel::has_required_channels`] to
    /// detect the fallback up front.
    pub fn joint_angle(&self, frame: &SensorFrame) -> f64 {
        self.selector
            .try_angle(frame)
            .or_else(|| frame.first_available())
            .unwrap_or(0.0)
    }

    /// Whether a frame carries the channels this exercise needs.
    pub fn has_required_channels(&self, frame: &SensorFrame) -> bool {
        self.selector.try_angle(frame).is_some()
    }

    /// Compute joint torque, reaction force, and session energy.
    ///
    /// Degrades instead of erroring: the caller maps `Err` to
    /// [`DynamicsSeries::zeroed`](crate::types::DynamicsSeries::zeroed)
    /// plus an "analysis unavailable" marker.
    pub fn dynamics(&self, kin: &KinematicSeries) -> Result<DynamicsSeries, DegradedReason> {
        if kin.angle_deg.is_empty() {
            return Err(DegradedReason::EmptySeries);
        }
        if !(self.segment_mass_kg > 0.0
            && self.lever_length_m > 0.0
            && self.com_radius_m > 0.0
            && self.segment_mass_kg.is_finite()
            && self.lever_length_m.is_finite()
            && self.com_radius_m.is_finite())
        {
            return Err(DegradedReason::DegenerateSubject);
        }

        let inertia = self.segment_mass_kg * self.com_radius_m * self.com_radius_m;
        let gravity_arm = self.segment_mass_kg * GRAVITY * self.com_radius_m;

        let n = kin.angle_deg.len();
        let mut torque_nm = Vec::with_capacity(n);
        let mut force_n = Vec::with_capacity(n);
        let mut power = Vec::with_capacity(n);
        for i in 0..n {
            let theta = kin.angle_deg[i].to_radians();
            let tau = inertia * kin.acceleration_rad_s2[i] + gravity_arm * theta.sin();
            torque_nm.push(tau);
            force_n.push(tau / self.lever_length_m);
            power.push((tau * kin.velocity_rad_s[i]).abs());
        }

        let energy_j = simpson(&power, kin.dt_s);
        if torque_nm.iter().any(|v| !v.is_finite()) || !energy_j.is_finite() {
            return Err(DegradedReason::NonFinite);
        }

        Ok(DynamicsSeries {
            torque_nm,
            force_n,
            energy_j,
        })
    }
}
