//! Directional limiting of simulated travel and stretch blending.
//!
//! Travel is the vector from the driven goal to the simulated goal. It is
//! limited per axis of the joint's input frame, against an ellipsoid made of
//! one positive and one negative half-extent per axis, with an exponential
//! soft knee so the simulation eases into the limit instead of hitting it.

use glam::{Mat4, Vec3};

use super::EPSILON;

/// Per-joint travel limit, in the joint's input frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimit {
    pub enabled: bool,
    /// Half-extents along +x, +y, +z. Never below [`EPSILON`].
    pub positive: Vec3,
    /// Half-extents along -x, -y, -z, stored negative. Never above `-EPSILON`.
    pub negative: Vec3,
}

impl JointLimit {
    pub const DISABLED: Self = Self {
        enabled: false,
        positive: Vec3::ZERO,
        negative: Vec3::ZERO,
    };

    /// Keeps every half-extent at least [`EPSILON`] away from zero.
    pub fn new(enabled: bool, positive: Vec3, negative: Vec3) -> Self {
        Self {
            enabled,
            positive: positive.max(Vec3::splat(EPSILON)),
            negative: negative.min(Vec3::splat(-EPSILON)),
        }
    }
}

impl Default for JointLimit {
    fn default() -> Self {
        Self::DISABLED
    }
}

/// Chain-wide scaling and easing of the per-joint limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitShaping {
    pub weight_positive: Vec3,
    pub weight_negative: Vec3,
    /// Knee width as a fraction of each axis maximum.
    pub smoothing: Vec3,
}

impl Default for LimitShaping {
    fn default() -> Self {
        Self {
            weight_positive: Vec3::ONE,
            weight_negative: Vec3::ONE,
            smoothing: Vec3::ONE,
        }
    }
}

/// Eases `current` toward `max` once it passes `max - smoothing * max`.
///
/// Below the knee the distance passes through unchanged. With a zero-width
/// knee this is a hard clamp; a zero `max` leaves `current` untouched.
pub fn soft_limit(current: f32, max: f32, smoothing: f32) -> f32 {
    let delta = smoothing * max;
    let start = max - delta;

    if delta <= 0.0 {
        // no room to ease into: clamp hard, unless there is no limit at all
        return if max > 0.0 { current.min(max) } else { current };
    }
    if current < start {
        return current;
    }
    delta * (1.0 - ((start - current) / delta).exp()) + start
}

/// Limits the travel from `goal` to a simulated point and returns the
/// limited simulated point.
///
/// `frame` is the joint's input transform; travel is limited along its axes.
/// With limiting disabled each axis maximum is `rest_distance`.
pub fn limit_from_goal(
    goal: Vec3,
    travel: Vec3,
    frame: &Mat4,
    rest_distance: f32,
    limit: &JointLimit,
    shaping: &LimitShaping,
) -> Vec3 {
    let local = frame.inverse().transform_vector3(travel);
    let positive = local.cmpge(Vec3::ZERO);

    let max = if limit.enabled {
        Vec3::select(positive, limit.positive, limit.negative)
    } else {
        Vec3::splat(rest_distance)
    };
    let weight = Vec3::select(positive, shaping.weight_positive, shaping.weight_negative);
    let max = (max * weight).abs();

    let magnitude = local.abs();
    let limited = Vec3::new(
        soft_limit(magnitude.x, max.x, shaping.smoothing.x),
        soft_limit(magnitude.y, max.y, shaping.smoothing.y),
        soft_limit(magnitude.z, max.z, shaping.smoothing.z),
    );

    let sign = Vec3::select(positive, Vec3::ONE, Vec3::NEG_ONE);
    goal + frame.transform_vector3(sign * limited)
}

/// Blend between the rest length and the simulated length.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StretchBlend {
    /// Weight of the simulated length when it exceeds the rest length.
    pub positive: f32,
    /// Weight of the simulated length when it is shorter than the rest length.
    pub negative: f32,
}

impl StretchBlend {
    /// Moves `simulated` along its direction from `input` so its distance is
    /// the blended length.
    pub fn apply(&self, simulated: Vec3, input: Vec3, rest_distance: f32) -> Vec3 {
        let offset = simulated - input;
        let distance = offset.length().max(EPSILON);

        let weight = if distance >= rest_distance {
            self.positive
        } else {
            self.negative
        };
        let blended = (1.0 - weight) * rest_distance + weight * distance;

        input + offset.normalize_or_zero() * blended
    }
}
