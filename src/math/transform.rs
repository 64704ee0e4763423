use glam::{Mat4, Quat, Vec3, Vec4};

/// Decomposed affine transform, as written to a joint's output channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Splits a 4x4 affine matrix into scale, rotation and translation.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Translation access on host matrices.
///
/// Host transforms are full 4x4 affine matrices that may carry scale or
/// shear, so the solver edits their translation row in place instead of
/// round-tripping through [`Transform`].
pub trait MatrixExt {
    fn translation(&self) -> Vec3;
    fn with_translation(&self, translation: Vec3) -> Self;
    fn without_translation(&self) -> Self;
}

impl MatrixExt for Mat4 {
    fn translation(&self) -> Vec3 {
        self.w_axis.truncate()
    }

    fn with_translation(&self, translation: Vec3) -> Self {
        let mut out = *self;
        out.w_axis = Vec4::new(translation.x, translation.y, translation.z, self.w_axis.w);
        out
    }

    fn without_translation(&self) -> Self {
        self.with_translation(Vec3::ZERO)
    }
}
