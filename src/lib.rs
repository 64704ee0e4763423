//! # chain-dynamics
//!
//! Secondary motion for chains of jointed segments: every joint chases an
//! animated goal through a spring-damper, so the chain lags, overshoots and
//! settles instead of following its driver rigidly.
//!
//! ## Features
//! - RK4-integrated spring-damper per joint, with gravity
//! - Per-axis soft limits and stretch/compression blending
//! - Optional simulated up axis for twist dynamics
//! - Deterministic replay from a start time, or one step per evaluation
//! - TOML chain setups
//!
//! ## Example
//! ```rust,ignore
//! use chain_dynamics::chain::{
//!     ChainAttributes, ChainSettings, DynamicChain, EvalTime, FrameTriple, History, JointOutput,
//! };
//! use glam::{Mat4, Vec3};
//!
//! let mut chain = DynamicChain::new(ChainSettings::default(), ChainAttributes::with_joints(3));
//!
//! // joint k sits at (0, k, 0) and aims one unit up
//! let source = History::new(|joint, _time| {
//!     let input = Mat4::from_translation(Vec3::new(0.0, joint as f32, 0.0));
//!     Ok(FrameTriple::new(Mat4::IDENTITY, input, input * Mat4::from_translation(Vec3::Y)))
//! });
//!
//! let mut outputs: Vec<(usize, JointOutput)> = Vec::new();
//! chain.evaluate(EvalTime::at(1.0), &source, &source, &mut outputs)?;
//! for (joint, output) in &outputs {
//!     println!("{joint}: {:?}", output.rotation);
//! }
//! ```

pub mod chain;
pub mod dynamics;
pub mod error;
pub mod math;

pub use chain::{
    ChainAttributes, ChainSettings, ChainSetup, ChainState, DynamicChain, EvalTime, JointOutput,
    OutputSink, TransformSource,
};
pub use dynamics::{AdditionMode, SpringDamper};
pub use error::{ChainError, ConfigError, SourceError};
pub use math::Transform;
