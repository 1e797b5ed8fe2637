//! Collision region description for volumetric picks
//!
//! A region is stored exactly as configured; turning it into physics
//! geometry is the collaborator's job.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Quat, Vec3};
use super::primitives::BoundingSphere;

/// Volumetric shape types accepted by collision picks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeType {
    /// Axis-aligned box scaled by the region dimensions
    Box,
    /// Sphere with diameter taken from the largest dimension
    Sphere,
    /// Ellipsoid scaled by the region dimensions
    Ellipsoid,
    /// Capsule along the X axis
    CapsuleX,
    /// Capsule along the Y axis
    CapsuleY,
    /// Capsule along the Z axis
    CapsuleZ,
    /// Cylinder along the X axis
    CylinderX,
    /// Cylinder along the Y axis
    CylinderY,
    /// Cylinder along the Z axis
    CylinderZ,
    /// Convex hull generated from a model
    SimpleHull,
    /// Several convex hulls generated from a model
    SimpleCompound,
    /// Author-supplied compound hulls from a model
    Compound,
    /// Exact triangle mesh of a model
    StaticMesh,
}

impl ShapeType {
    /// Whether this shape is built from a model and needs a model URL
    pub fn requires_model(self) -> bool {
        matches!(
            self,
            Self::SimpleHull | Self::SimpleCompound | Self::Compound | Self::StaticMesh
        )
    }
}

/// A physical volume tested by a collision pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionRegion {
    /// Shape of the volume
    pub shape: ShapeType,
    /// Size to scale the shape to
    pub dimensions: Vec3,
    /// Model used to generate model-based shapes
    pub model_url: Option<String>,
    /// World-space position of the region
    pub position: Vec3,
    /// World-space orientation of the region
    pub orientation: Quat,
}

impl CollisionRegion {
    /// Conservative sphere enclosing the region regardless of orientation
    pub fn bounding_sphere(&self) -> BoundingSphere {
        let radius = match self.shape {
            ShapeType::Sphere => self.dimensions.abs().max() * 0.5,
            _ => self.dimensions.abs().magnitude() * 0.5,
        };
        BoundingSphere::new(self.position, radius)
    }
}
