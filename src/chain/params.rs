use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::config::{ChainConfig, ChainSettings};
use super::limit::JointLimit;
use super::ramp::Ramp;
use super::EPSILON;
use crate::dynamics::SpringDamper;
use crate::math::RotationOrder;

/// Smallest mass a joint may resolve to.
pub const MIN_MASS: f32 = 1.0e-4;
pub const MAX_STIFFNESS: f32 = 2.0;

/// A chain-wide value that may be scaled along the chain by a ramp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampedScalar {
    pub value: f32,
    #[serde(default)]
    pub use_ramp: bool,
    #[serde(default)]
    pub ramp: Ramp,
}

impl RampedScalar {
    pub fn constant(value: f32) -> Self {
        Self {
            value,
            use_ramp: false,
            ramp: Ramp::default(),
        }
    }

    pub fn ramped(value: f32, ramp: Ramp) -> Self {
        Self {
            value,
            use_ramp: true,
            ramp,
        }
    }

    /// Direct value, multiplied by the ramp at `position` when enabled.
    pub fn at(&self, position: f32) -> f32 {
        if self.use_ramp {
            self.value * self.ramp.value_at(position)
        } else {
            self.value
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitAttributes {
    #[serde(default)]
    pub enabled: bool,
    pub positive: Vec3,
    pub negative: Vec3,
}

/// Optional per-joint host arrays. Any entry may be missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointAttributes {
    pub index: usize,
    #[serde(default)]
    pub rotation_order: Option<RotationOrder>,
    /// Euler angles in radians, applied x then y then z.
    #[serde(default)]
    pub joint_orient: Option<Vec3>,
    #[serde(default)]
    pub limit: Option<LimitAttributes>,
}

impl JointAttributes {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }
}

fn default_weight() -> RampedScalar {
    RampedScalar::constant(1.0)
}
fn default_mass() -> RampedScalar {
    RampedScalar::constant(1.0)
}
fn default_stiffness() -> RampedScalar {
    RampedScalar::constant(0.5)
}
fn default_damping() -> RampedScalar {
    RampedScalar::constant(0.5)
}
fn default_gravity() -> RampedScalar {
    RampedScalar::constant(0.0)
}

/// Per-joint raw values: the six ramped scalars and the joint entries.
///
/// The entries also define the chain's active joint indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainAttributes {
    #[serde(default = "default_weight")]
    pub aim_weight: RampedScalar,
    #[serde(default = "default_weight")]
    pub up_weight: RampedScalar,
    #[serde(default = "default_mass")]
    pub mass: RampedScalar,
    #[serde(default = "default_stiffness")]
    pub stiffness: RampedScalar,
    #[serde(default = "default_damping")]
    pub damping: RampedScalar,
    /// Gravity magnitude along the chain's gravity direction.
    #[serde(default = "default_gravity")]
    pub gravity: RampedScalar,
    #[serde(default)]
    pub joints: Vec<JointAttributes>,
}

impl Default for ChainAttributes {
    fn default() -> Self {
        Self {
            aim_weight: default_weight(),
            up_weight: default_weight(),
            mass: default_mass(),
            stiffness: default_stiffness(),
            damping: default_damping(),
            gravity: default_gravity(),
            joints: Vec::new(),
        }
    }
}

impl ChainAttributes {
    /// Attributes for joints `0..count` with no per-joint overrides.
    pub fn with_joints(count: usize) -> Self {
        Self {
            joints: (0..count).map(JointAttributes::new).collect(),
            ..Default::default()
        }
    }

    /// Active joint indices, ascending and without duplicates.
    pub fn indices(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.joints.iter().map(|j| j.index).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn joint(&self, index: usize) -> Option<&JointAttributes> {
        self.joints.iter().find(|j| j.index == index)
    }
}

/// Resolved constants of one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointParams {
    pub mass: f32,
    pub stiffness: f32,
    /// Fraction of critical damping.
    pub damping: f32,
    pub gravity: Vec3,
    pub aim_weight: f32,
    pub up_weight: f32,
    pub rotation_order: RotationOrder,
    pub joint_orient_inverse: Quat,
    pub limit: JointLimit,
}

impl JointParams {
    pub fn spring(&self) -> SpringDamper {
        SpringDamper::new(self.mass, self.stiffness, self.damping, self.gravity)
    }
}

impl Default for JointParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 0.5,
            damping: 0.5,
            gravity: Vec3::ZERO,
            aim_weight: 1.0,
            up_weight: 1.0,
            rotation_order: RotationOrder::Xyz,
            joint_orient_inverse: Quat::IDENTITY,
            limit: JointLimit::DISABLED,
        }
    }
}

/// Everything static about a chain for one evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StaticSnapshot {
    pub config: ChainConfig,
    joints: BTreeMap<usize, JointParams>,
}

impl StaticSnapshot {
    pub fn new(config: ChainConfig, joints: BTreeMap<usize, JointParams>) -> Self {
        Self { config, joints }
    }

    /// Resolves raw host values.
    pub fn resolve(settings: &ChainSettings, attributes: &ChainAttributes) -> Self {
        let config = settings.resolve();
        let ids = attributes.indices();
        let ranks = ramp_positions(ids.len());

        let joints = ids
            .iter()
            .zip(ranks)
            .map(|(&index, position)| {
                let params = resolve_joint(&config, attributes, attributes.joint(index), position);
                (index, params)
            })
            .collect();

        Self { config, joints }
    }

    /// Joints in ascending index order.
    pub fn joints(&self) -> impl Iterator<Item = (usize, &JointParams)> + '_ {
        self.joints.iter().map(|(&index, params)| (index, params))
    }

    pub fn joint(&self, index: usize) -> Option<&JointParams> {
        self.joints.get(&index)
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.joints.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

/// Normalized rank of each of `count` joints along the chain.
fn ramp_positions(count: usize) -> Vec<f32> {
    if count <= 1 {
        return vec![0.0; count];
    }
    let last = (count - 1) as f32;
    (0..count).map(|k| k as f32 / last).collect()
}

fn resolve_joint(
    config: &ChainConfig,
    attributes: &ChainAttributes,
    joint: Option<&JointAttributes>,
    position: f32,
) -> JointParams {
    let gravity = attributes.gravity.at(position);

    let rotation_order = joint
        .and_then(|j| j.rotation_order)
        .unwrap_or_default();
    let joint_orient_inverse = joint
        .and_then(|j| j.joint_orient)
        .map(|angles| RotationOrder::Xyz.to_quat(angles).inverse())
        .unwrap_or(Quat::IDENTITY);
    let limit = joint
        .and_then(|j| j.limit)
        .map(|l| JointLimit::new(l.enabled, l.positive, l.negative))
        .unwrap_or(JointLimit::DISABLED);

    JointParams {
        mass: attributes.mass.at(position).max(MIN_MASS),
        stiffness: attributes.stiffness.at(position).clamp(EPSILON, MAX_STIFFNESS),
        damping: attributes.damping.at(position).clamp(0.0, 1.0),
        gravity: config.gravity_direction * gravity,
        aim_weight: attributes.aim_weight.at(position).clamp(0.0, 1.0),
        up_weight: attributes.up_weight.at(position).clamp(0.0, 1.0),
        rotation_order,
        joint_orient_inverse,
        limit,
    }
}

/// Caches the static snapshot until the caller reports a change.
#[derive(Debug, Default)]
pub struct StaticParameterResolver {
    snapshot: Option<StaticSnapshot>,
}

impl StaticParameterResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot, rebuilding it first when it is missing
    /// or `config_changed` is set.
    pub fn resolve(
        &mut self,
        settings: &ChainSettings,
        attributes: &ChainAttributes,
        config_changed: bool,
    ) -> &StaticSnapshot {
        if config_changed {
            self.snapshot = None;
        }
        self.snapshot.get_or_insert_with(|| {
            log::debug!(
                "resolving static parameters for {} joints",
                attributes.indices().len()
            );
            StaticSnapshot::resolve(settings, attributes)
        })
    }

    pub fn is_fresh(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }
}
