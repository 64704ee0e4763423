//! Per-joint chain dynamics.
//!
//! Each joint chases its driven goal through a spring-damper. The simulated
//! goal is then shaped by per-axis limits and a stretch blend, and turned
//! into an orientation. Joints are solved root first, each re-seated on its
//! simulated parent.

mod config;
mod controller;
mod evaluate;
mod limit;
mod orientation;
mod params;
mod ramp;
mod setup;
mod solver;
mod source;
mod state;

/// Tolerance used for clamps, floors and degenerate-direction checks.
pub const EPSILON: f32 = 1.0e-3;

pub use config::{ChainConfig, ChainSettings, RotationMode, SolverMode};
pub use controller::{ChainState, EvalTime, SolverPhase, ITERATION_DT, MAX_ONCE_DT};
pub use evaluate::{evaluate, DynamicChain, JointOutput, OutputSink};
pub use limit::{limit_from_goal, soft_limit, JointLimit, LimitShaping, StretchBlend};
pub use orientation::build_orientation;
pub use params::{
    ChainAttributes, JointAttributes, JointParams, LimitAttributes, RampedScalar,
    StaticParameterResolver, StaticSnapshot, MAX_STIFFNESS, MIN_MASS,
};
pub use ramp::{Ramp, RampInterpolation, RampKey};
pub use setup::ChainSetup;
pub use solver::{rest_pose, step, JointPose, StepResult};
pub use source::{FrameSnapshot, FrameTriple, History, LevelMatrices, TransformSource};
pub use state::{JointKinematicState, KinematicStateStore};
