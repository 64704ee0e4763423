//! Host transform sources.
//!
//! The solver reads three transforms per joint: the relative transform that
//! takes world space into the joint's parent space, the input (rest) pose and
//! the goal (driven target). Reading them "now" is expected to be cheap;
//! reading them at an arbitrary past time may re-evaluate the host and is
//! only done by [`SolverMode::IterateFromStart`](super::SolverMode).

use std::collections::BTreeMap;

use glam::Mat4;

use crate::error::SourceError;

/// Relative, input and goal transforms of one joint in a common space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTriple {
    /// World to parent space.
    pub relative: Mat4,
    pub input: Mat4,
    pub goal: Mat4,
}

impl FrameTriple {
    pub fn new(relative: Mat4, input: Mat4, goal: Mat4) -> Self {
        Self {
            relative,
            input,
            goal,
        }
    }
}

/// Raw per-joint matrices as a host stores them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelMatrices {
    /// World transform of the joint's parent.
    pub parent: Mat4,
    pub input: Mat4,
    pub goal: Mat4,
}

impl LevelMatrices {
    /// Moves the matrices into the space given by `global_relative`.
    pub fn resolve(&self, global_relative: &Mat4) -> FrameTriple {
        FrameTriple {
            relative: (*global_relative * self.parent).inverse(),
            input: *global_relative * self.input,
            goal: *global_relative * self.goal,
        }
    }
}

pub trait TransformSource {
    /// Transforms of `joint` at `time`.
    fn sample_at(&self, joint: usize, time: f64) -> Result<FrameTriple, SourceError>;
}

/// Current host values; the requested time is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    global_relative: Mat4,
    levels: BTreeMap<usize, LevelMatrices>,
}

impl Default for FrameSnapshot {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

impl FrameSnapshot {
    pub fn new(global_relative: Mat4) -> Self {
        Self {
            global_relative,
            levels: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, joint: usize, level: LevelMatrices) {
        self.levels.insert(joint, level);
    }

    pub fn with_level(mut self, joint: usize, level: LevelMatrices) -> Self {
        self.insert(joint, level);
        self
    }

    pub fn set_global_relative(&mut self, global_relative: Mat4) {
        self.global_relative = global_relative;
    }
}

impl TransformSource for FrameSnapshot {
    fn sample_at(&self, joint: usize, _time: f64) -> Result<FrameTriple, SourceError> {
        self.levels
            .get(&joint)
            .map(|level| level.resolve(&self.global_relative))
            .ok_or(SourceError::MissingJoint { joint })
    }
}

/// Historical values computed on demand by a closure.
pub struct History<F> {
    sample: F,
}

impl<F> History<F>
where
    F: Fn(usize, f64) -> Result<FrameTriple, SourceError>,
{
    pub fn new(sample: F) -> Self {
        Self { sample }
    }
}

impl<F> TransformSource for History<F>
where
    F: Fn(usize, f64) -> Result<FrameTriple, SourceError>,
{
    fn sample_at(&self, joint: usize, time: f64) -> Result<FrameTriple, SourceError> {
        (self.sample)(joint, time)
    }
}

impl<F> std::fmt::Debug for History<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History").finish_non_exhaustive()
    }
}
