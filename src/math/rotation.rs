use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Euler rotation order of an output joint.
///
/// Named the way animation hosts name them: `Xyz` rotates about X first, then
/// Y, then Z. `Unordered` is accepted from hosts that leave the channel unset
/// and behaves like `Xyz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationOrder {
    #[default]
    Xyz,
    Yzx,
    Zxy,
    Xzy,
    Yxz,
    Zyx,
    #[serde(rename = "none")]
    Unordered,
}

impl RotationOrder {
    /// Decodes a host enum index (0..=6); unknown values fall back to `Xyz`.
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::Yzx,
            2 => Self::Zxy,
            3 => Self::Xzy,
            4 => Self::Yxz,
            5 => Self::Zyx,
            6 => Self::Unordered,
            _ => Self::Xyz,
        }
    }

    // glam composes intrinsically from the left, so the host's first axis is
    // glam's last one.
    fn glam_order(self) -> EulerRot {
        match self {
            Self::Xyz | Self::Unordered => EulerRot::ZYX,
            Self::Yzx => EulerRot::XZY,
            Self::Zxy => EulerRot::YXZ,
            Self::Xzy => EulerRot::YZX,
            Self::Yxz => EulerRot::ZXY,
            Self::Zyx => EulerRot::XYZ,
        }
    }

    /// Builds a rotation from per-axis angles (radians) applied in this order.
    pub fn to_quat(self, angles: Vec3) -> Quat {
        let Vec3 { x, y, z } = angles;
        let order = self.glam_order();
        match self {
            Self::Xyz | Self::Unordered => Quat::from_euler(order, z, y, x),
            Self::Yzx => Quat::from_euler(order, x, z, y),
            Self::Zxy => Quat::from_euler(order, y, x, z),
            Self::Xzy => Quat::from_euler(order, y, z, x),
            Self::Yxz => Quat::from_euler(order, z, x, y),
            Self::Zyx => Quat::from_euler(order, x, y, z),
        }
    }

    /// Decomposes `rotation` into per-axis angles (radians), returned as
    /// `(x, y, z)` regardless of the order they are applied in.
    pub fn to_euler(self, rotation: Quat) -> Vec3 {
        let (a, b, c) = rotation.to_euler(self.glam_order());
        match self {
            Self::Xyz | Self::Unordered => Vec3::new(c, b, a),
            Self::Yzx => Vec3::new(a, c, b),
            Self::Zxy => Vec3::new(b, a, c),
            Self::Xzy => Vec3::new(c, a, b),
            Self::Yxz => Vec3::new(b, c, a),
            Self::Zyx => Vec3::new(a, b, c),
        }
    }
}

/// Shortest rotation taking direction `from` onto direction `to`.
///
/// Inputs need not be normalized. A zero-length input has no direction and
/// yields the identity.
pub fn shortest_arc(from: Vec3, to: Vec3) -> Quat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(from, to)
}
