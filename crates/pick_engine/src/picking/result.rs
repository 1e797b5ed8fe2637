//! Pick results
//!
//! A result is produced whole by one evaluation and never modified
//! afterwards. The next evaluation replaces it outright.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::physics::{CollisionRegion, Ray};
use super::items::TargetId;

/// What kind of target an intersection landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IntersectionType {
    /// Nothing was intersected
    #[default]
    None,
    /// A domain or avatar entity
    Entity,
    /// A client-only entity
    LocalEntity,
    /// An avatar body
    Avatar,
    /// The heads-up display
    Hud,
}

/// Closest surface intersection along a ray
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHit {
    /// Target that was hit
    pub target: TargetId,
    /// Kind of target that was hit
    pub intersection: IntersectionType,
    /// Distance from the ray origin to the hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Surface normal at the hit point
    pub normal: Vec3,
}

/// One target overlapping a collision region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Overlapping target
    pub target: TargetId,
    /// Kind of overlapping target
    pub intersection: IntersectionType,
    /// Approximate world-space contact point
    pub point: Vec3,
    /// How deep the target reaches into the region
    pub penetration: f32,
}

/// Outcome of a ray-shaped pick (static, joint, mouse or stylus)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfacePickResult {
    /// Ray that was cast; absent when the source could not be resolved
    pub search_ray: Option<Ray>,
    /// Closest accepted hit
    pub hit: Option<SurfaceHit>,
}

/// Outcome of a collision pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionPickResult {
    /// Region that was tested
    pub region: CollisionRegion,
    /// Whether the physics collaborator was available to run the query
    pub loaded: bool,
    /// Accepted overlapping targets, deepest first
    pub contacts: Vec<Contact>,
}

/// Most recent outcome of evaluating one pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PickResult {
    /// Ray or stylus result
    Surface(SurfacePickResult),
    /// Collision volume result
    Collision(CollisionPickResult),
}

impl PickResult {
    /// No-hit surface result for a pick whose geometry could not be resolved
    pub fn unresolved() -> Self {
        Self::Surface(SurfacePickResult::default())
    }

    /// No-hit surface result for a resolved ray
    pub fn miss(search_ray: Ray) -> Self {
        Self::Surface(SurfacePickResult {
            search_ray: Some(search_ray),
            hit: None,
        })
    }

    /// Collision result for a region the physics collaborator could not test
    pub fn unloaded(region: &CollisionRegion) -> Self {
        Self::Collision(CollisionPickResult {
            region: region.clone(),
            loaded: false,
            contacts: Vec::new(),
        })
    }

    /// Whether anything was intersected
    pub fn is_hit(&self) -> bool {
        match self {
            Self::Surface(result) => result.hit.is_some(),
            Self::Collision(result) => !result.contacts.is_empty(),
        }
    }

    /// Distance to the hit, or from the region center to the closest contact
    pub fn distance(&self) -> Option<f32> {
        match self {
            Self::Surface(result) => result.hit.as_ref().map(|hit| hit.distance),
            Self::Collision(result) => result
                .contacts
                .iter()
                .map(|contact| (contact.point - result.region.position).magnitude())
                .min_by(f32::total_cmp),
        }
    }

    /// Primary intersected target: the surface hit, or the deepest contact
    pub fn target(&self) -> Option<TargetId> {
        match self {
            Self::Surface(result) => result.hit.as_ref().map(|hit| hit.target),
            Self::Collision(result) => result.contacts.first().map(|contact| contact.target),
        }
    }

    /// Kind of the primary intersected target
    pub fn intersection(&self) -> IntersectionType {
        match self {
            Self::Surface(result) => result
                .hit
                .as_ref()
                .map_or(IntersectionType::None, |hit| hit.intersection),
            Self::Collision(result) => result
                .contacts
                .first()
                .map_or(IntersectionType::None, |contact| contact.intersection),
        }
    }

    /// Surface details, if this is a ray or stylus result
    pub fn as_surface(&self) -> Option<&SurfacePickResult> {
        match self {
            Self::Surface(result) => Some(result),
            Self::Collision(_) => None,
        }
    }

    /// Collision details, if this is a collision result
    pub fn as_collision(&self) -> Option<&CollisionPickResult> {
        match self {
            Self::Collision(result) => Some(result),
            Self::Surface(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use crate::physics::ShapeType;

    fn hit(distance: f32) -> SurfaceHit {
        SurfaceHit {
            target: TargetId(3),
            intersection: IntersectionType::Entity,
            distance,
            point: Vec3::new(0.0, -distance, 0.0),
            normal: Vec3::new(0.0, 1.0, 0.0),
        }
    }

    #[test]
    fn test_unresolved_is_miss() {
        let result = PickResult::unresolved();
        assert!(!result.is_hit());
        assert_eq!(result.distance(), None);
        assert_eq!(result.target(), None);
        assert_eq!(result.intersection(), IntersectionType::None);
        assert!(result.as_surface().unwrap().search_ray.is_none());
    }

    #[test]
    fn test_surface_hit_accessors() {
        let result = PickResult::Surface(SurfacePickResult {
            search_ray: Some(Ray::new(Vec3::zeros(), Vec3::new(0.0, -1.0, 0.0))),
            hit: Some(hit(5.0)),
        });

        assert!(result.is_hit());
        assert_eq!(result.distance(), Some(5.0));
        assert_eq!(result.target(), Some(TargetId(3)));
        assert!(result.as_collision().is_none());
    }

    #[test]
    fn test_collision_accessors() {
        let region = CollisionRegion {
            shape: ShapeType::Sphere,
            dimensions: Vec3::new(1.0, 1.0, 1.0),
            model_url: None,
            position: Vec3::zeros(),
            orientation: Quat::identity(),
        };

        let unloaded = PickResult::unloaded(&region);
        assert!(!unloaded.is_hit());
        assert_eq!(unloaded.distance(), None);
        assert!(!unloaded.as_collision().unwrap().loaded);

        let touching = PickResult::Collision(CollisionPickResult {
            region,
            loaded: true,
            contacts: vec![Contact {
                target: TargetId(9),
                intersection: IntersectionType::Avatar,
                point: Vec3::new(0.0, 0.5, 0.0),
                penetration: 0.25,
            }],
        });
        assert!(touching.is_hit());
        assert_eq!(touching.distance(), Some(0.5));
        assert_eq!(touching.target(), Some(TargetId(9)));
        assert_eq!(touching.intersection(), IntersectionType::Avatar);
    }

    #[test]
    fn test_result_serializes_for_readback() {
        let result = PickResult::Surface(SurfacePickResult {
            search_ray: None,
            hit: Some(hit(2.5)),
        });
        let text = ron::to_string(&result).unwrap();
        assert!(text.contains("distance"));
        assert!(text.contains("2.5"));
        assert!(text.contains("Entity"));
    }
}
