//! Math utilities module
//!
//! Provides convenient re-exports from glam plus the transform and rotation
//! helpers the chain solver is built on.

mod rotation;
mod transform;

pub use rotation::{shortest_arc, RotationOrder};
pub use transform::{MatrixExt, Transform};

// Re-export commonly used glam types
pub use glam::{Mat4, Quat, Vec3};
