//! Math utilities and types
//!
//! Provides the fundamental math types used by pick geometry resolution.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Matrix4, Quaternion, Unit, UnitQuaternion, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Common direction vectors (Y-up, right-handed, -Z forward)
pub mod vectors {
    use super::Vec3;

    /// Zero vector
    pub fn zero() -> Vec3 {
        Vec3::zeros()
    }

    /// World up (+Y)
    pub fn up() -> Vec3 {
        Vec3::new(0.0, 1.0, 0.0)
    }

    /// World down (-Y)
    pub fn down() -> Vec3 {
        Vec3::new(0.0, -1.0, 0.0)
    }

    /// Forward (-Z)
    pub fn forward() -> Vec3 {
        Vec3::new(0.0, 0.0, -1.0)
    }
}

/// Rigid pose: a position and orientation in world space
///
/// Skeleton joints and hand controllers report their state as a `Pose`.
/// Unlike a full transform there is no scale component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in world space
    pub position: Vec3,

    /// Orientation in world space
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
        }
    }
}

impl Pose {
    /// Create a pose from a position and orientation
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    /// Create a pose with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Map a point from pose-local space into world space
    pub fn transform_point(&self, local: &Vec3) -> Vec3 {
        self.position + self.orientation * local
    }

    /// Rotate a local direction into world space (no translation)
    pub fn transform_vector(&self, local: &Vec3) -> Vec3 {
        self.orientation * local
    }

    /// World-space forward axis of this pose
    pub fn forward(&self) -> Vec3 {
        self.orientation * vectors::forward()
    }
}

/// Math utility functions
pub mod utils {
    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees.to_radians()
    }

    /// Returns `true` when every component of the vector is finite
    pub fn is_finite(v: &super::Vec3) -> bool {
        v.iter().all(|c| c.is_finite())
    }
}
