use std::collections::BTreeMap;

use glam::Vec3;

use crate::dynamics::Tracked;

/// Simulated history of one joint, carried from step to step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointKinematicState {
    pub goal: Tracked,
    /// Tracks the configured up axis.
    pub up: Tracked,
    /// Tracks the negated up axis.
    pub down: Tracked,
}

impl JointKinematicState {
    /// At rest with the simulated goal on the driven goal.
    pub fn at_rest(goal: Vec3, up: Vec3, down: Vec3) -> Self {
        Self {
            goal: Tracked::at_rest(goal),
            up: Tracked::at_rest(up),
            down: Tracked::at_rest(down),
        }
    }

    pub fn goal_position(&self) -> Vec3 {
        self.goal.position
    }

    pub fn goal_velocity(&self) -> Vec3 {
        self.goal.velocity
    }
}

/// Kinematic state of every joint in a chain, keyed by joint index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KinematicStateStore {
    joints: BTreeMap<usize, JointKinematicState>,
}

impl KinematicStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.joints.clear();
    }

    pub fn insert(&mut self, joint: usize, state: JointKinematicState) {
        self.joints.insert(joint, state);
    }

    pub fn get(&self, joint: usize) -> Option<&JointKinematicState> {
        self.joints.get(&joint)
    }

    /// State of `joint`, created at rest on the origin if it has none yet.
    pub fn entry(&mut self, joint: usize) -> &mut JointKinematicState {
        self.joints.entry(joint).or_default()
    }

    /// Whether the store holds exactly the joints in `indices`.
    pub fn covers<I>(&self, indices: I) -> bool
    where
        I: IntoIterator<Item = usize>,
    {
        let mut count = 0;
        for index in indices {
            if !self.joints.contains_key(&index) {
                return false;
            }
            count += 1;
        }
        count == self.joints.len()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}
