//! Geometry sources consumed by picks
//!
//! Skeleton, controller and pointer state belong to other subsystems. Picks
//! only query them, once per evaluation, through these narrow traits.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::foundation::math::Pose;
use crate::physics::{PhysicsQuery, Ray};

/// Hand side a stylus pick is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Hand {
    /// Left hand controller
    Left,
    /// Right hand controller
    Right,
    /// Not bound to any controller
    #[default]
    Invalid,
}

impl Hand {
    /// Map a script-style index: 0 is left, 1 is right, anything else invalid
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::Left,
            1 => Self::Right,
            _ => Self::Invalid,
        }
    }
}

/// Skeletal pose query
pub trait SkeletonQuery: Send + Sync {
    /// Current world-space pose of a named joint on the local avatar
    fn resolve_joint_pose(&self, name: &str) -> Option<Pose>;
}

/// Hand controller pose query
pub trait ControllerQuery: Send + Sync {
    /// Current world-space pose of a hand controller, `None` when untracked
    fn resolve_hand_pose(&self, hand: Hand) -> Option<Pose>;
}

/// Pointer and viewport query
pub trait PointerQuery: Send + Sync {
    /// World-space ray under the pointer, `None` without an active viewport
    fn current_pointer_ray(&self) -> Option<Ray>;
}

/// Every collaborator the evaluation pass may consult
///
/// A missing collaborator is not an error: picks that need it resolve to a
/// no-hit result until it is provided.
#[derive(Clone, Default)]
pub struct PickCollaborators {
    /// Ray cast and overlap queries
    pub physics: Option<Arc<dyn PhysicsQuery>>,
    /// Joint poses for joint ray picks
    pub skeleton: Option<Arc<dyn SkeletonQuery>>,
    /// Hand poses for stylus picks
    pub controllers: Option<Arc<dyn ControllerQuery>>,
    /// Pointer rays for mouse ray picks
    pub pointer: Option<Arc<dyn PointerQuery>>,
}

impl PickCollaborators {
    /// No collaborators at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a physics collaborator
    #[must_use]
    pub fn with_physics(mut self, physics: Arc<dyn PhysicsQuery>) -> Self {
        self.physics = Some(physics);
        self
    }

    /// Attach a skeleton collaborator
    #[must_use]
    pub fn with_skeleton(mut self, skeleton: Arc<dyn SkeletonQuery>) -> Self {
        self.skeleton = Some(skeleton);
        self
    }

    /// Attach a controller collaborator
    #[must_use]
    pub fn with_controllers(mut self, controllers: Arc<dyn ControllerQuery>) -> Self {
        self.controllers = Some(controllers);
        self
    }

    /// Attach a pointer collaborator
    #[must_use]
    pub fn with_pointer(mut self, pointer: Arc<dyn PointerQuery>) -> Self {
        self.pointer = Some(pointer);
        self
    }
}

impl std::fmt::Debug for PickCollaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickCollaborators")
            .field("physics", &self.physics.is_some())
            .field("skeleton", &self.skeleton.is_some())
            .field("controllers", &self.controllers.is_some())
            .field("pointer", &self.pointer.is_some())
            .finish()
    }
}

/// Map-backed skeleton whose joints are posed explicitly
#[derive(Debug, Default)]
pub struct StaticSkeleton {
    joints: RwLock<HashMap<String, Pose>>,
}

impl StaticSkeleton {
    /// Create a skeleton with no joints
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the pose of a joint
    pub fn set_joint(&self, name: impl Into<String>, pose: Pose) {
        self.joints
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), pose);
    }

    /// Remove a joint, as when the avatar model changes
    pub fn remove_joint(&self, name: &str) {
        self.joints
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }
}

impl SkeletonQuery for StaticSkeleton {
    fn resolve_joint_pose(&self, name: &str) -> Option<Pose> {
        self.joints
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }
}

/// Map-backed hand controllers
#[derive(Debug, Default)]
pub struct StaticControllers {
    hands: RwLock<HashMap<Hand, Pose>>,
}

impl StaticControllers {
    /// Create controllers with neither hand tracked
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a hand as tracked at the given pose; `Invalid` is ignored
    pub fn set_hand(&self, hand: Hand, pose: Pose) {
        if hand == Hand::Invalid {
            return;
        }
        self.hands
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(hand, pose);
    }

    /// Mark a hand as untracked
    pub fn lose_tracking(&self, hand: Hand) {
        self.hands
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&hand);
    }
}

impl ControllerQuery for StaticControllers {
    fn resolve_hand_pose(&self, hand: Hand) -> Option<Pose> {
        self.hands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&hand)
            .copied()
    }
}
