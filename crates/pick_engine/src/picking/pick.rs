//! Pick variants and their per-frame evaluation

use log::trace;

use crate::foundation::math::{vectors, Vec3};
use crate::physics::{CollisionRegion, OverlapQuery, Ray, RayQuery};
use super::filter::PickFilter;
use super::items::TargetSelection;
use super::result::{CollisionPickResult, PickResult, SurfacePickResult};
use super::sources::{Hand, PickCollaborators};
use super::{PickError, PickType};

/// Head joint of the local avatar
pub const HEAD_JOINT: &str = "Head";

/// Joint alias meaning "the avatar's head"
pub const AVATAR_JOINT: &str = "Avatar";

/// Joint name that turns a ray pick into a mouse pick
pub const MOUSE_JOINT: &str = "Mouse";

/// Distance from the hand controller to the stylus tip, along its forward axis
pub const STYLUS_TIP_LENGTH: f32 = 0.1;

/// Where a pick takes its geometry from
#[derive(Debug, Clone, PartialEq)]
pub enum PickSource {
    /// Fixed world-space ray
    StaticRay {
        /// The ray, direction normalized
        ray: Ray,
    },
    /// Ray attached to a skeleton joint
    JointRay {
        /// Joint name as configured
        joint: String,
        /// Origin offset in joint space
        pos_offset: Vec3,
        /// Direction in joint space
        dir_offset: Vec3,
    },
    /// Ray under the pointer
    MouseRay,
    /// Short probe from a hand controller
    Stylus {
        /// Controller the stylus follows
        hand: Hand,
    },
    /// Overlap volume
    Collision {
        /// Volume to test
        region: CollisionRegion,
    },
}

impl PickSource {
    /// Scripting-level type of this source
    pub fn pick_type(&self) -> PickType {
        match self {
            Self::StaticRay { .. } | Self::JointRay { .. } | Self::MouseRay => PickType::Ray,
            Self::Stylus { .. } => PickType::Stylus,
            Self::Collision { .. } => PickType::Collision,
        }
    }

    /// Resolve this frame's ray; `None` for collision picks and for sources
    /// whose collaborator cannot currently answer
    pub fn resolve_ray(&self, collaborators: &PickCollaborators) -> Option<Ray> {
        match self {
            Self::StaticRay { ray } => Some(*ray),
            Self::JointRay {
                joint,
                pos_offset,
                dir_offset,
            } => {
                let name = if joint == AVATAR_JOINT { HEAD_JOINT } else { joint.as_str() };
                let pose = collaborators.skeleton.as_ref()?.resolve_joint_pose(name)?;
                Ray::try_new(
                    pose.transform_point(pos_offset),
                    pose.transform_vector(dir_offset),
                )
            }
            Self::MouseRay => collaborators.pointer.as_ref()?.current_pointer_ray(),
            Self::Stylus { hand } => {
                if *hand == Hand::Invalid {
                    return None;
                }
                let pose = collaborators.controllers.as_ref()?.resolve_hand_pose(*hand)?;
                let tip = pose.transform_point(&(vectors::forward() * STYLUS_TIP_LENGTH));
                Ray::try_new(tip, pose.forward())
            }
            Self::Collision { .. } => None,
        }
    }

    /// Evaluate against the collaborators, producing a fresh result
    pub fn evaluate(&self, settings: &PickSettings, collaborators: &PickCollaborators) -> PickResult {
        match self {
            Self::Collision { region } => Self::evaluate_region(region, settings, collaborators),
            _ => self.evaluate_ray(settings, collaborators),
        }
    }

    fn evaluate_ray(&self, settings: &PickSettings, collaborators: &PickCollaborators) -> PickResult {
        let Some(ray) = self.resolve_ray(collaborators) else {
            trace!("{:?} pick could not resolve its ray this frame", self.pick_type());
            return PickResult::unresolved();
        };
        if settings.filter.picks_nothing() {
            return PickResult::miss(ray);
        }
        let Some(physics) = collaborators.physics.as_ref() else {
            trace!("No physics collaborator, reporting a miss");
            return PickResult::miss(ray);
        };

        let max_distance = settings.distance_limit();
        let hit = physics
            .intersect_ray(&RayQuery {
                ray,
                max_distance,
                filter: settings.filter,
                selection: &settings.selection,
            })
            .filter(|hit| settings.selection.accepts(hit.target))
            .filter(|hit| max_distance.map_or(true, |max| hit.distance <= max));

        PickResult::Surface(SurfacePickResult {
            search_ray: Some(ray),
            hit,
        })
    }

    fn evaluate_region(
        region: &CollisionRegion,
        settings: &PickSettings,
        collaborators: &PickCollaborators,
    ) -> PickResult {
        let Some(physics) = collaborators.physics.as_ref() else {
            trace!("No physics collaborator, collision region left unloaded");
            return PickResult::unloaded(region);
        };

        let contacts = if settings.filter.picks_nothing() {
            Vec::new()
        } else {
            physics
                .overlap_region(&OverlapQuery {
                    region,
                    filter: settings.filter,
                    max_distance: settings.distance_limit(),
                    selection: &settings.selection,
                })
                .into_iter()
                .filter(|contact| settings.selection.accepts(contact.target))
                .collect()
        };

        PickResult::Collision(CollisionPickResult {
            region: region.clone(),
            loaded: true,
            contacts,
        })
    }
}

/// Mutable per-pick settings shared by every variant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickSettings {
    /// Target categories and precision
    pub filter: PickFilter,
    /// Maximum hit distance, 0 for unbounded
    max_distance: f32,
    /// Ignore/include lists
    pub selection: TargetSelection,
}

impl PickSettings {
    /// Validate and build settings
    pub fn new(filter: PickFilter, max_distance: f32) -> Result<Self, PickError> {
        if !max_distance.is_finite() || max_distance < 0.0 {
            return Err(PickError::InvalidMaxDistance(max_distance));
        }
        Ok(Self {
            filter,
            max_distance,
            selection: TargetSelection::new(),
        })
    }

    /// Configured maximum distance, 0 meaning unbounded
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Maximum distance as a query bound
    pub fn distance_limit(&self) -> Option<f32> {
        (self.max_distance > 0.0).then_some(self.max_distance)
    }

    /// Whether exact geometry is requested
    pub fn precision_picking(&self) -> bool {
        self.filter.is_precise()
    }

    /// Toggle exact geometry
    pub fn set_precision_picking(&mut self, precise: bool) {
        self.filter = self.filter.with_precision(precise);
    }
}

/// A fully validated pick, ready to be registered
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    /// Geometry source
    pub source: PickSource,
    /// Filter, distance and item lists
    pub settings: PickSettings,
    /// Initial enabled state
    pub enabled: bool,
}

impl Pick {
    /// Bundle a source with its settings
    pub fn new(source: PickSource, settings: PickSettings) -> Self {
        Self {
            source,
            settings,
            enabled: false,
        }
    }

    /// Set the initial enabled state
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Scripting-level type
    pub fn pick_type(&self) -> PickType {
        self.source.pick_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Pose, Quat};
    use crate::physics::{
        BoundingSphere, Collider, ColliderWorld, PhysicsQuery, ShapeType,
    };
    use crate::picking::items::TargetId;
    use crate::picking::filter::TargetCategory;
    use crate::picking::sources::{StaticControllers, StaticSkeleton};
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;
    use std::sync::Arc;

    fn world_with_ball(id: u64, center: Vec3) -> Arc<ColliderWorld> {
        let world = ColliderWorld::new();
        world.insert(Collider::sphere(
            TargetId(id),
            TargetCategory::DomainEntity,
            BoundingSphere::new(center, 1.0),
        ));
        Arc::new(world)
    }

    fn entity_settings(max_distance: f32) -> PickSettings {
        PickSettings::new(PickFilter::ENTITIES, max_distance).unwrap()
    }

    #[test]
    fn test_settings_reject_bad_distance() {
        assert!(matches!(
            PickSettings::new(PickFilter::ENTITIES, -1.0),
            Err(PickError::InvalidMaxDistance(_))
        ));
        assert!(PickSettings::new(PickFilter::ENTITIES, f32::NAN).is_err());
        assert!(PickSettings::new(PickFilter::ENTITIES, f32::INFINITY).is_err());
        assert_eq!(entity_settings(0.0).distance_limit(), None);
        assert_eq!(entity_settings(4.0).distance_limit(), Some(4.0));
    }

    #[test]
    fn test_static_ray_hit_within_distance() {
        let physics: Arc<dyn PhysicsQuery> = world_with_ball(1, Vec3::new(0.0, -6.0, 0.0));
        let collaborators = PickCollaborators::new().with_physics(physics);
        let source = PickSource::StaticRay {
            ray: Ray::new(Vec3::zeros(), vectors::down()),
        };

        let result = source.evaluate(&entity_settings(10.0), &collaborators);
        assert_relative_eq!(result.distance().unwrap(), 5.0, epsilon = 1e-5);

        let short = source.evaluate(&entity_settings(2.0), &collaborators);
        assert!(!short.is_hit());
        assert!(short.as_surface().unwrap().search_ray.is_some());
    }

    #[test]
    fn test_empty_filter_skips_physics() {
        let physics: Arc<dyn PhysicsQuery> = world_with_ball(1, Vec3::new(0.0, -6.0, 0.0));
        let collaborators = PickCollaborators::new().with_physics(physics);
        let source = PickSource::StaticRay {
            ray: Ray::new(Vec3::zeros(), vectors::down()),
        };

        let settings = PickSettings::new(PickFilter::empty(), 0.0).unwrap();
        assert!(!source.evaluate(&settings, &collaborators).is_hit());
    }

    #[test]
    fn test_avatar_joint_resolves_head() {
        let skeleton = Arc::new(StaticSkeleton::new());
        // Head turned a quarter turn about Y: local -Z becomes world -X
        let turned = Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2);
        skeleton.set_joint(HEAD_JOINT, Pose::new(Vec3::new(0.0, 2.0, 0.0), turned));

        let collaborators = PickCollaborators::new().with_skeleton(skeleton);
        let source = PickSource::JointRay {
            joint: AVATAR_JOINT.to_string(),
            pos_offset: Vec3::new(0.0, 0.0, -1.0),
            dir_offset: vectors::forward(),
        };

        let ray = source.resolve_ray(&collaborators).unwrap();
        assert_relative_eq!(ray.origin, Vec3::new(-1.0, 2.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(ray.direction, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_missing_joint_is_unresolved() {
        let collaborators = PickCollaborators::new().with_skeleton(Arc::new(StaticSkeleton::new()));
        let source = PickSource::JointRay {
            joint: "LeftHand".to_string(),
            pos_offset: Vec3::zeros(),
            dir_offset: vectors::up(),
        };

        let result = source.evaluate(&entity_settings(0.0), &collaborators);
        assert!(!result.is_hit());
        assert!(result.as_surface().unwrap().search_ray.is_none());
    }

    #[test]
    fn test_stylus_tip_and_direction() {
        let controllers = Arc::new(StaticControllers::new());
        controllers.set_hand(Hand::Right, Pose::from_position(Vec3::new(0.3, 1.0, 0.0)));
        let collaborators = PickCollaborators::new().with_controllers(controllers);

        let ray = PickSource::Stylus { hand: Hand::Right }
            .resolve_ray(&collaborators)
            .unwrap();
        assert_relative_eq!(ray.origin, Vec3::new(0.3, 1.0, -STYLUS_TIP_LENGTH), epsilon = 1e-6);
        assert_relative_eq!(ray.direction, vectors::forward(), epsilon = 1e-6);

        assert!(PickSource::Stylus { hand: Hand::Left }.resolve_ray(&collaborators).is_none());
        assert!(PickSource::Stylus { hand: Hand::Invalid }.resolve_ray(&collaborators).is_none());
    }

    #[test]
    fn test_collision_without_physics_is_unloaded() {
        let region = CollisionRegion {
            shape: ShapeType::Sphere,
            dimensions: Vec3::new(1.0, 1.0, 1.0),
            model_url: None,
            position: Vec3::zeros(),
            orientation: Quat::identity(),
        };
        let source = PickSource::Collision { region };

        let result = source.evaluate(&entity_settings(0.0), &PickCollaborators::new());
        let collision = result.as_collision().unwrap();
        assert!(!collision.loaded);
        assert!(collision.contacts.is_empty());

        let physics: Arc<dyn PhysicsQuery> = world_with_ball(4, Vec3::new(0.5, 0.0, 0.0));
        let loaded = source.evaluate(&entity_settings(0.0), &PickCollaborators::new().with_physics(physics));
        assert!(loaded.as_collision().unwrap().loaded);
        assert_eq!(loaded.target(), Some(TargetId(4)));
    }

    #[test]
    fn test_pick_types() {
        assert_eq!(PickSource::MouseRay.pick_type(), PickType::Ray);
        assert_eq!(PickSource::Stylus { hand: Hand::Left }.pick_type(), PickType::Stylus);
    }
}
