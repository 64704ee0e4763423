//! One discrete integration step across a whole chain.
//!
//! Joints are solved root first. The root chases its own goal; every other
//! joint is first re-seated on the simulated result of the joint before it,
//! so children lag their parent instead of only chasing their rest pose.

use glam::{Mat4, Vec3};

use super::config::{ChainConfig, RotationMode};
use super::limit::limit_from_goal;
use super::orientation::build_orientation;
use super::params::{JointParams, StaticSnapshot};
use super::source::{FrameTriple, TransformSource};
use super::state::{JointKinematicState, KinematicStateStore};
use crate::dynamics::AdditionMode;
use crate::error::SourceError;
use crate::math::MatrixExt;

/// Local output transform of one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    pub index: usize,
    /// Transform in the joint's parent space.
    pub local: Mat4,
}

/// Output of one simulated instant, in ascending joint order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepResult {
    pub poses: Vec<JointPose>,
}

impl StepResult {
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn pose(&self, index: usize) -> Option<&JointPose> {
        self.poses.iter().find(|p| p.index == index)
    }
}

// Simulated world transform and goal of the joint solved just before.
struct Upstream {
    world: Mat4,
    goal: Vec3,
}

/// Re-expresses a joint's rest pose relative to its simulated predecessor.
fn reseat(frames: &FrameTriple, upstream: &Upstream) -> FrameTriple {
    let goal_in_input = frames.input.inverse() * frames.goal;
    let rotation_in_parent = (frames.relative * frames.input).without_translation();

    let relative = upstream.world.inverse();
    let offset = relative.transform_vector3(upstream.goal - upstream.world.translation());

    let input = upstream.world * Mat4::from_translation(offset) * rotation_in_parent;
    let goal = input * goal_in_input;

    FrameTriple {
        relative,
        input,
        goal,
    }
}

/// Advances every joint by `dt`, reading host transforms at `time`.
pub fn step(
    snapshot: &StaticSnapshot,
    store: &mut KinematicStateStore,
    source: &dyn TransformSource,
    time: f64,
    dt: f32,
) -> Result<StepResult, SourceError> {
    let config = &snapshot.config;
    let mut poses = Vec::with_capacity(snapshot.len());
    let mut upstream: Option<Upstream> = None;

    log::trace!("step at t={time} dt={dt}");

    for (index, params) in snapshot.joints() {
        let host = source.sample_at(index, time)?;
        let frames = match &upstream {
            None => host,
            Some(up) => reseat(&host, up),
        };

        let state = store.entry(index);
        let world = solve_joint(config, params, state, &frames, dt);

        poses.push(JointPose {
            index,
            local: frames.relative * world,
        });
        upstream = Some(Upstream {
            world,
            goal: state.goal.position,
        });
    }

    Ok(StepResult { poses })
}

fn solve_joint(
    config: &ChainConfig,
    params: &JointParams,
    state: &mut JointKinematicState,
    frames: &FrameTriple,
    dt: f32,
) -> Mat4 {
    let input = frames.input.translation();
    let goal = frames.goal.translation();
    let spring = params.spring();

    state.goal.advance(goal, dt, &spring, config.addition_mode);

    let rest_distance = (goal - input).length();
    let limited = limit_from_goal(
        goal,
        state.goal.position - goal,
        &frames.input,
        rest_distance,
        &params.limit,
        &config.shaping,
    );
    let mut simulated = config.stretch.apply(limited, input, rest_distance);
    if params.aim_weight < 1.0 {
        simulated = goal.lerp(simulated, params.aim_weight);
    }
    state.goal.position = simulated;

    let up = match config.rotation_mode {
        RotationMode::AimOnly => frames.input.transform_vector3(config.up).normalize_or_zero(),
        RotationMode::AimAndUp => track_up(config, params, state, &frames.input, dt),
    };

    let aim = simulated - input;
    let base_aim = (frames.input.inverse() * frames.goal).translation();
    let rotation = build_orientation(aim, base_aim, up, config.up);

    Mat4::from_rotation_translation(rotation, input)
}

/// Integrates both up references and returns the effective up direction.
fn track_up(
    config: &ChainConfig,
    params: &JointParams,
    state: &mut JointKinematicState,
    input: &Mat4,
    dt: f32,
) -> Vec3 {
    let spring = params.spring().without_gravity();
    let up_target = input.transform_vector3(config.up).normalize_or_zero();
    let down_target = input.transform_vector3(config.down).normalize_or_zero();

    state.up.advance(up_target, dt, &spring, AdditionMode::Velocity);
    state.down.advance(down_target, dt, &spring, AdditionMode::Velocity);

    if params.up_weight != 1.0 {
        state.up.position = up_target.lerp(state.up.position, params.up_weight);
        state.down.position = down_target.lerp(state.down.position, params.up_weight);
    }

    // common drift of the two references cancels out, twist does not
    let up = (state.up.position - state.down.position).normalize_or_zero();

    state.up.position = state.up.position.normalize_or_zero();
    state.down.position = state.down.position.normalize_or_zero();

    up
}

/// Puts every joint at rest on its driven goal at `time` and returns the
/// unsimulated rest pose.
pub fn rest_pose(
    snapshot: &StaticSnapshot,
    store: &mut KinematicStateStore,
    source: &dyn TransformSource,
    time: f64,
) -> Result<StepResult, SourceError> {
    let config = &snapshot.config;
    let mut poses = Vec::with_capacity(snapshot.len());

    store.clear();
    for index in snapshot.indices() {
        let frames = source.sample_at(index, time)?;
        let up = frames.input.transform_vector3(config.up).normalize_or_zero();
        let down = frames.input.transform_vector3(config.down).normalize_or_zero();

        store.insert(
            index,
            JointKinematicState::at_rest(frames.goal.translation(), up, down),
        );
        poses.push(JointPose {
            index,
            local: frames.relative * frames.input,
        });
    }

    Ok(StepResult { poses })
}
