use glam::{Quat, Vec3};

use super::EPSILON;
use crate::math::shortest_arc;

/// Rotation that turns `base_aim` onto `aim` and then twists about the aim
/// so `base_up` lands as close to `up` as possible.
///
/// Both up vectors are first made orthogonal to their aim. When the rotated
/// baseline up and the desired up are antiparallel the twist axis of the
/// shortest arc is arbitrary, so the aim direction is used as the axis.
pub fn build_orientation(aim: Vec3, base_aim: Vec3, up: Vec3, base_up: Vec3) -> Quat {
    let aim_rotation = shortest_arc(base_aim, aim);

    let intermediate_up = aim_rotation * orthogonalize(base_up, base_aim);
    let up = orthogonalize(up, aim);

    let mut twist = shortest_arc(intermediate_up, up);
    if intermediate_up.dot(up) < EPSILON - 1.0 {
        let (_, angle) = twist.to_axis_angle();
        let axis = aim.normalize_or_zero();
        if axis != Vec3::ZERO {
            twist = Quat::from_axis_angle(axis, angle);
        }
    }

    // aim first, then twist
    twist * aim_rotation
}

// Component of `up` perpendicular to `aim`, normalized.
fn orthogonalize(up: Vec3, aim: Vec3) -> Vec3 {
    let side = aim.cross(up).normalize_or_zero();
    side.cross(aim).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn matching_directions_give_identity() {
        let aim = Vec3::new(0.0, 3.0, 1.0);
        let up = Vec3::new(1.0, 0.0, 0.2);
        let q = build_orientation(aim, aim, up, up);
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn aim_is_carried_onto_the_desired_direction() {
        let q = build_orientation(Vec3::X, Vec3::Y, Vec3::Z, Vec3::Z);
        assert!((q * Vec3::Y).abs_diff_eq(Vec3::X, 1e-6));
        assert!((q * Vec3::Z).abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn up_twists_about_the_aim() {
        let q = build_orientation(Vec3::Y, Vec3::Y, Vec3::Z, Vec3::X);
        assert!((q * Vec3::Y).abs_diff_eq(Vec3::Y, 1e-6));
        assert!((q * Vec3::X).abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn antiparallel_up_twists_half_a_turn_about_the_aim() {
        let q = build_orientation(Vec3::Y, Vec3::Y, Vec3::NEG_X, Vec3::X);
        let (axis, angle) = q.to_axis_angle();

        assert!((angle - PI).abs() < 1e-4);
        assert!(axis.abs_diff_eq(Vec3::Y, 1e-4) || axis.abs_diff_eq(Vec3::NEG_Y, 1e-4));
        assert!((q * Vec3::X).abs_diff_eq(Vec3::NEG_X, 1e-5));
    }

    #[test]
    fn up_parallel_to_aim_does_not_produce_nan() {
        let q = build_orientation(Vec3::Y, Vec3::Y, Vec3::Y, Vec3::Y);
        assert!(q.is_finite());
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }
}
