//! Host-facing entry point: resolve, advance, write outputs.

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};

use super::config::ChainSettings;
use super::controller::{ChainState, EvalTime};
use super::params::{ChainAttributes, JointParams, StaticParameterResolver, StaticSnapshot};
use super::solver::JointPose;
use super::source::TransformSource;
use crate::error::ChainError;
use crate::math::Transform;

/// Final per-joint output channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointOutput {
    /// Local matrix with the joint orient removed.
    pub matrix: Mat4,
    pub translation: Vec3,
    /// Euler angles in radians, per the joint's rotation order.
    pub rotation: Vec3,
    pub transform: Transform,
}

impl JointOutput {
    pub fn from_pose(pose: &JointPose, params: &JointParams) -> Self {
        let Transform {
            position,
            rotation,
            scale,
        } = Transform::from_matrix(&pose.local);
        let rotation = (params.joint_orient_inverse * rotation).normalize();
        let transform = Transform {
            position,
            rotation,
            scale,
        };

        Self {
            matrix: transform.to_matrix(),
            translation: position,
            rotation: params.rotation_order.to_euler(rotation),
            transform,
        }
    }
}

/// Receives one output per active joint.
pub trait OutputSink {
    fn write(&mut self, joint: usize, output: JointOutput);
}

impl OutputSink for Vec<(usize, JointOutput)> {
    fn write(&mut self, joint: usize, output: JointOutput) {
        self.push((joint, output));
    }
}

impl OutputSink for BTreeMap<usize, JointOutput> {
    fn write(&mut self, joint: usize, output: JointOutput) {
        self.insert(joint, output);
    }
}

/// Advances `state` to `time` and writes one output per joint to `sink`.
///
/// An empty chain still succeeds and writes nothing. On error nothing is
/// written and the state is left uninitialized.
pub fn evaluate(
    time: EvalTime,
    snapshot: &StaticSnapshot,
    state: &mut ChainState,
    current: &dyn TransformSource,
    history: &dyn TransformSource,
    sink: &mut dyn OutputSink,
) -> Result<(), ChainError> {
    if snapshot.is_empty() {
        log::trace!("empty chain at t={}", time.current);
        return Ok(());
    }

    let result = state.advance(snapshot, time, current, history)?;
    for pose in &result.poses {
        if let Some(params) = snapshot.joint(pose.index) {
            sink.write(pose.index, JointOutput::from_pose(pose, params));
        }
    }
    Ok(())
}

/// One dynamic chain as a host node owns it.
///
/// Holds the raw host values, the cached static snapshot and the simulated
/// state. Changing any raw value marks the snapshot stale; the next
/// evaluation rebuilds it and keeps simulating from the current state. Only
/// a change of the active joint set resets the simulation.
#[derive(Debug)]
pub struct DynamicChain {
    settings: ChainSettings,
    attributes: ChainAttributes,
    resolver: StaticParameterResolver,
    state: ChainState,
    config_changed: bool,
}

impl DynamicChain {
    pub fn new(settings: ChainSettings, attributes: ChainAttributes) -> Self {
        Self {
            settings,
            attributes,
            resolver: StaticParameterResolver::new(),
            state: ChainState::new(),
            config_changed: true,
        }
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    pub fn attributes(&self) -> &ChainAttributes {
        &self.attributes
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn set_settings(&mut self, settings: ChainSettings) {
        self.settings = settings;
        self.mark_config_changed();
    }

    pub fn set_attributes(&mut self, attributes: ChainAttributes) {
        self.attributes = attributes;
        self.mark_config_changed();
    }

    /// Reports a host-side change the chain cannot see, such as an edited ramp.
    pub fn mark_config_changed(&mut self) {
        self.config_changed = true;
    }

    pub fn evaluate(
        &mut self,
        time: EvalTime,
        current: &dyn TransformSource,
        history: &dyn TransformSource,
        sink: &mut dyn OutputSink,
    ) -> Result<(), ChainError> {
        let changed = std::mem::take(&mut self.config_changed);
        let snapshot = self.resolver.resolve(&self.settings, &self.attributes, changed);
        evaluate(time, snapshot, &mut self.state, current, history, sink)
    }
}
