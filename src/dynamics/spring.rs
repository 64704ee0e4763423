use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::rk4::rk4;

/// How an integrated offset is turned back into a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdditionMode {
    /// The integrated offset is added to the target.
    #[default]
    Velocity,
    /// The velocity change over the step is added to the target, so a
    /// target moving at constant speed produces no lag.
    Acceleration,
}

/// Mass-spring-damper acceleration: `a = (-k x - c v) / m + g`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringDamper {
    pub stiffness: f32,
    pub mass: f32,
    /// Absolute damping coefficient `c`.
    pub damping: f32,
    pub gravity: Vec3,
}

impl SpringDamper {
    /// `damping_ratio` scales the critical damping `2 m sqrt(k / m)`;
    /// a ratio of 1 returns to rest without oscillating.
    pub fn new(mass: f32, stiffness: f32, damping_ratio: f32, gravity: Vec3) -> Self {
        let critical = 2.0 * mass * (stiffness / mass).sqrt();
        Self {
            stiffness,
            mass,
            damping: damping_ratio * critical,
            gravity,
        }
    }

    /// Same spring with gravity removed, used for the up-vector trackers.
    pub fn without_gravity(&self) -> Self {
        Self {
            gravity: Vec3::ZERO,
            ..*self
        }
    }

    pub fn acceleration(&self, x: Vec3, v: Vec3) -> Vec3 {
        (-self.stiffness * x - self.damping * v) / self.mass + self.gravity
    }
}

/// A simulated point chasing a driven target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tracked {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Tracked {
    /// At rest on `position`.
    pub fn at_rest(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
        }
    }

    /// Integrates the offset from `target` toward zero over `dt`.
    pub fn advance(&mut self, target: Vec3, dt: f32, spring: &SpringDamper, mode: AdditionMode) {
        let offset = self.position - target;
        let (new_offset, new_velocity) =
            rk4(offset, self.velocity, dt, |x, v| spring.acceleration(x, v));

        self.position = match mode {
            AdditionMode::Velocity => target + new_offset,
            AdditionMode::Acceleration => target + (self.velocity - new_velocity),
        };
        self.velocity = new_velocity;
    }
}
