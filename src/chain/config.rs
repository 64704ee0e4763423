use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::limit::{LimitShaping, StretchBlend};
use super::EPSILON;
use crate::dynamics::AdditionMode;
use crate::error::ConfigError;

/// How often the step solver runs for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverMode {
    /// One step per evaluation from the previous evaluated time.
    #[default]
    Once,
    /// Replay whole unit steps from the start time, reading past transforms.
    IterateFromStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationMode {
    /// Orientation follows the simulated aim; the up axis is static.
    AimOnly,
    /// The up axis is simulated as well, giving twist dynamics.
    #[default]
    AimAndUp,
}

fn default_start_time() -> f64 {
    1.0
}
fn default_up_vector() -> Vec3 {
    Vec3::Y
}
fn default_gravity_direction() -> Vec3 {
    Vec3::NEG_Y
}
fn default_one3() -> Vec3 {
    Vec3::ONE
}

/// Chain-wide values as the host stores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSettings {
    #[serde(default)]
    pub solver_mode: SolverMode,

    /// Only consulted in [`SolverMode::IterateFromStart`] unless the host
    /// supplies no playback start.
    #[serde(default = "default_start_time")]
    pub start_time: f64,

    #[serde(default)]
    pub addition_mode: AdditionMode,

    #[serde(default)]
    pub rotation_mode: RotationMode,

    /// Up axis in each joint's input space.
    #[serde(default = "default_up_vector")]
    pub up_vector: Vec3,

    #[serde(default = "default_gravity_direction")]
    pub gravity_direction: Vec3,

    /// 0 keeps the rest length when stretched, 1 follows the simulation.
    #[serde(default)]
    pub stretch_positive: f32,

    /// 0 keeps the rest length when compressed, 1 follows the simulation.
    #[serde(default)]
    pub stretch_negative: f32,

    #[serde(default = "default_one3")]
    pub weight_positive: Vec3,

    #[serde(default = "default_one3")]
    pub weight_negative: Vec3,

    /// Fraction of each axis limit over which travel is eased in.
    #[serde(default = "default_one3")]
    pub smoothing: Vec3,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            solver_mode: SolverMode::default(),
            start_time: default_start_time(),
            addition_mode: AdditionMode::default(),
            rotation_mode: RotationMode::default(),
            up_vector: default_up_vector(),
            gravity_direction: default_gravity_direction(),
            stretch_positive: 0.0,
            stretch_negative: 0.0,
            weight_positive: default_one3(),
            weight_negative: default_one3(),
            smoothing: default_one3(),
        }
    }
}

impl ChainSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.start_time.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "start_time".into(),
                message: "must be finite".into(),
            });
        }
        if !self.up_vector.is_finite() || self.up_vector.length_squared() == 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "up_vector".into(),
                message: "must be a finite, non-zero vector".into(),
            });
        }
        Ok(())
    }

    /// Normalizes directions and clamps the chain-wide factors into range.
    pub fn resolve(&self) -> ChainConfig {
        let up = self.up_vector.normalize_or_zero();
        let unit = |v: Vec3| v.clamp(Vec3::ZERO, Vec3::ONE);

        ChainConfig {
            solver_mode: self.solver_mode,
            start_time: self.start_time,
            addition_mode: self.addition_mode,
            rotation_mode: self.rotation_mode,
            up,
            down: -up,
            gravity_direction: self.gravity_direction.normalize_or_zero(),
            stretch: StretchBlend {
                positive: self.stretch_positive.clamp(0.0, 1.0),
                negative: self.stretch_negative.clamp(0.0, 1.0),
            },
            shaping: LimitShaping {
                weight_positive: unit(self.weight_positive),
                weight_negative: unit(self.weight_negative),
                // a zero-width knee would leave the limit unsmoothed
                smoothing: Vec3::splat(EPSILON) + unit(self.smoothing) * (1.0 - EPSILON),
            },
        }
    }
}

/// Resolved chain-wide constants for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainConfig {
    pub solver_mode: SolverMode,
    pub start_time: f64,
    pub addition_mode: AdditionMode,
    pub rotation_mode: RotationMode,
    /// Normalized up axis.
    pub up: Vec3,
    /// Negated up axis, tracked alongside `up` to cancel drift.
    pub down: Vec3,
    pub gravity_direction: Vec3,
    pub stretch: StretchBlend,
    pub shaping: LimitShaping,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainSettings::default().resolve()
    }
}
