//! Decides how many solver steps an evaluation runs, and when to reset.

use super::config::SolverMode;
use super::params::StaticSnapshot;
use super::solver::{rest_pose, step, StepResult};
use super::source::TransformSource;
use super::state::{JointKinematicState, KinematicStateStore};
use super::EPSILON;
use crate::error::SourceError;

/// Largest step Once mode will take, in either direction.
pub const MAX_ONCE_DT: f64 = 1.0;

/// Step size used when replaying from the start time.
pub const ITERATION_DT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverPhase {
    /// No history yet; the next evaluation resets.
    #[default]
    Uninitialized,
    /// Reset at or before the start time.
    RestingAtStart,
    Running,
}

/// What the host tells the chain about the instant being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvalTime {
    pub current: f64,
    /// Start of the host's playback range. Once mode resets at or before it
    /// when present.
    pub playback_start: Option<f64>,
}

impl EvalTime {
    pub fn at(current: f64) -> Self {
        Self {
            current,
            playback_start: None,
        }
    }

    pub fn with_playback_start(mut self, start: f64) -> Self {
        self.playback_start = Some(start);
        self
    }
}

/// Everything a chain remembers between evaluations.
#[derive(Debug, Clone, Default)]
pub struct ChainState {
    phase: SolverPhase,
    last_time: f64,
    joints: KinematicStateStore,
    last_result: StepResult,
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SolverPhase {
        self.phase
    }

    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    pub fn joint(&self, index: usize) -> Option<&JointKinematicState> {
        self.joints.get(index)
    }

    pub fn joints(&self) -> &KinematicStateStore {
        &self.joints
    }

    /// Forces a full reset on the next evaluation.
    pub fn invalidate(&mut self) {
        self.phase = SolverPhase::Uninitialized;
    }

    /// Advances the chain to `time.current` and returns the pose there.
    ///
    /// `current` serves host values at the evaluated instant; `history` is
    /// only read when replaying from the start time. If either source fails
    /// the state is invalidated, so no half-advanced history is reused.
    pub fn advance(
        &mut self,
        snapshot: &StaticSnapshot,
        time: EvalTime,
        current: &dyn TransformSource,
        history: &dyn TransformSource,
    ) -> Result<&StepResult, SourceError> {
        match self.try_advance(snapshot, time, current, history) {
            Ok(result) => {
                self.last_result = result;
                Ok(&self.last_result)
            }
            Err(err) => {
                log::warn!("evaluation at t={} aborted: {err}", time.current);
                self.invalidate();
                Err(err)
            }
        }
    }

    fn try_advance(
        &mut self,
        snapshot: &StaticSnapshot,
        time: EvalTime,
        current: &dyn TransformSource,
        history: &dyn TransformSource,
    ) -> Result<StepResult, SourceError> {
        let config = &snapshot.config;
        let now = time.current;
        let start = match config.solver_mode {
            SolverMode::Once => time.playback_start.unwrap_or(config.start_time),
            SolverMode::IterateFromStart => config.start_time,
        };

        if self.phase == SolverPhase::Uninitialized || !self.joints.covers(snapshot.indices()) {
            log::debug!("initial reset at t={now}");
            let result = rest_pose(snapshot, &mut self.joints, current, now)?;
            self.phase = SolverPhase::Running;
            self.last_time = now;
            return Ok(result);
        }

        if now <= start {
            log::debug!("resting at start t={start} (evaluated t={now})");
            let result = rest_pose(snapshot, &mut self.joints, current, now)?;
            self.phase = SolverPhase::RestingAtStart;
            self.last_time = start;
            return Ok(result);
        }

        let result = match config.solver_mode {
            SolverMode::Once => self.step_once(snapshot, now, current)?,
            SolverMode::IterateFromStart => self.iterate_from_start(snapshot, now, start, history)?,
        };
        self.phase = SolverPhase::Running;
        self.last_time = now;
        Ok(result)
    }

    fn step_once(
        &mut self,
        snapshot: &StaticSnapshot,
        now: f64,
        current: &dyn TransformSource,
    ) -> Result<StepResult, SourceError> {
        let elapsed = now - self.last_time;
        let dt = elapsed.clamp(-MAX_ONCE_DT, MAX_ONCE_DT);
        if dt != elapsed {
            log::warn!("time jump of {elapsed} clamped to {dt}");
        }
        step(snapshot, &mut self.joints, current, now, dt as f32)
    }

    fn iterate_from_start(
        &mut self,
        snapshot: &StaticSnapshot,
        now: f64,
        start: f64,
        history: &dyn TransformSource,
    ) -> Result<StepResult, SourceError> {
        let mut time = self.last_time;
        let mut result = None;

        if now < self.last_time {
            log::debug!("scrubbed back to t={now}, replaying from t={start}");
            result = Some(rest_pose(snapshot, &mut self.joints, history, start)?);
            time = start;
        }

        let steps = (now - time) / ITERATION_DT;
        let whole = steps.floor();
        for _ in 0..whole as u64 {
            time += ITERATION_DT;
            result = Some(step(snapshot, &mut self.joints, history, time, ITERATION_DT as f32)?);
        }

        let remainder = (steps - whole) * ITERATION_DT;
        if remainder > f64::from(EPSILON) {
            time += remainder;
            result = Some(step(snapshot, &mut self.joints, history, time, remainder as f32)?);
        }

        log::debug!("replayed {} steps up to t={time}", whole as u64);
        Ok(result.unwrap_or_else(|| self.last_result.clone()))
    }
}
