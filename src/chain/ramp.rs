use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RampInterpolation {
    /// Hold the key's value until the next key.
    None,
    #[default]
    Linear,
    /// Smoothstep between neighbouring keys.
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampKey {
    pub position: f32,
    pub value: f32,
    #[serde(default)]
    pub interpolation: RampInterpolation,
}

impl RampKey {
    pub fn new(position: f32, value: f32) -> Self {
        Self {
            position,
            value,
            interpolation: RampInterpolation::Linear,
        }
    }
}

/// A curve over [0, 1] scaling a per-joint parameter along the chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ramp {
    keys: Vec<RampKey>,
}

impl Ramp {
    pub fn new(mut keys: Vec<RampKey>) -> Self {
        keys.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { keys }
    }

    /// Straight line from `start` at position 0 to `end` at position 1.
    pub fn linear(start: f32, end: f32) -> Self {
        Self::new(vec![RampKey::new(0.0, start), RampKey::new(1.0, end)])
    }

    pub fn keys(&self) -> &[RampKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Value at `position`. Outside the keyed range the end values hold; a
    /// ramp without keys evaluates to 0.
    pub fn value_at(&self, position: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if position <= first.position {
            return first.value;
        }
        if position >= last.position {
            return last.value;
        }

        // keys are sorted, so a bracketing pair exists here
        let upper = self.keys.partition_point(|k| k.position <= position);
        let (a, b) = (&self.keys[upper - 1], &self.keys[upper]);

        let span = b.position - a.position;
        let t = if span > 0.0 {
            (position - a.position) / span
        } else {
            1.0
        };
        let t = match a.interpolation {
            RampInterpolation::None => 0.0,
            RampInterpolation::Linear => t,
            RampInterpolation::Smooth => t * t * (3.0 - 2.0 * t),
        };
        a.value + (b.value - a.value) * t
    }
}
