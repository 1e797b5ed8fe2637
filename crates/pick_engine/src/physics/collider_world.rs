//! Reference physics collaborator
//!
//! A flat list of sphere colliders with optional triangle geometry. Coarse
//! queries test the sphere, precise queries test the triangles when a
//! collider has any.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::foundation::math::Vec3;
use crate::picking::{Contact, PickFilter, SurfaceHit, TargetCategory, TargetId, TargetSelection};
use super::primitives::{BoundingSphere, Ray, Triangle};
use super::query::{OverlapQuery, PhysicsQuery, RayQuery};

/// One pickable target in a [`ColliderWorld`]
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    /// Target identity reported in hits
    pub target: TargetId,
    /// Category matched against pick filters
    pub category: TargetCategory,
    /// Coarse bounds
    pub bounds: BoundingSphere,
    /// Exact geometry, empty when the bounds are the geometry
    pub triangles: Vec<Triangle>,
    /// Rendered or hidden
    pub visible: bool,
    /// Takes part in collisions
    pub collidable: bool,
}

impl Collider {
    /// Visible, collidable sphere collider
    pub fn sphere(target: TargetId, category: TargetCategory, bounds: BoundingSphere) -> Self {
        Self {
            target,
            category,
            bounds,
            triangles: Vec::new(),
            visible: true,
            collidable: true,
        }
    }

    /// Attach exact geometry used by precise queries
    #[must_use]
    pub fn with_triangles(mut self, triangles: Vec<Triangle>) -> Self {
        self.triangles = triangles;
        self
    }

    /// Mark as invisible
    #[must_use]
    pub fn invisible(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Mark as non-collidable
    #[must_use]
    pub fn noncollidable(mut self) -> Self {
        self.collidable = false;
        self
    }

    fn accepted_by(&self, filter: PickFilter, selection: &TargetSelection) -> bool {
        selection.accepts(self.target)
            && filter.picks_target(self.category, self.visible, self.collidable)
    }

    fn intersect_ray(&self, ray: &Ray, filter: PickFilter) -> Option<SurfaceHit> {
        let (distance, point, normal) = self.bounds.intersect_ray(ray)?;
        if filter.is_coarse() || self.triangles.is_empty() {
            return Some(self.hit(distance, point, normal));
        }

        // Bounds were hit, now find the nearest triangle
        self.triangles
            .iter()
            .filter_map(|triangle| triangle.intersect_ray(ray).map(|t| (t, triangle)))
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
            .map(|(t, triangle)| {
                let mut normal = triangle.normal();
                if normal.dot(&ray.direction) > 0.0 {
                    normal = -normal;
                }
                self.hit(t, ray.point_at(t), normal)
            })
    }

    fn hit(&self, distance: f32, point: Vec3, normal: Vec3) -> SurfaceHit {
        SurfaceHit {
            target: self.target,
            intersection: self.category.intersection_type(),
            distance,
            point,
            normal,
        }
    }
}

/// Thread-safe set of colliders answering [`PhysicsQuery`]
#[derive(Debug, Default)]
pub struct ColliderWorld {
    colliders: RwLock<BTreeMap<TargetId, Collider>>,
}

impl ColliderWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a collider
    pub fn insert(&self, collider: Collider) {
        self.colliders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(collider.target, collider);
    }

    /// Remove a collider, returning it if present
    pub fn remove(&self, target: TargetId) -> Option<Collider> {
        self.colliders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&target)
    }

    /// Number of colliders
    pub fn len(&self) -> usize {
        self.colliders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when the world holds no colliders
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PhysicsQuery for ColliderWorld {
    fn intersect_ray(&self, query: &RayQuery<'_>) -> Option<SurfaceHit> {
        let colliders = self.colliders.read().unwrap_or_else(PoisonError::into_inner);

        colliders
            .values()
            .filter(|collider| collider.accepted_by(query.filter, query.selection))
            .filter_map(|collider| collider.intersect_ray(&query.ray, query.filter))
            .filter(|hit| query.max_distance.map_or(true, |max| hit.distance <= max))
            .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal))
    }

    fn overlap_region(&self, query: &OverlapQuery<'_>) -> Vec<Contact> {
        let region = query.region.bounding_sphere();
        let colliders = self.colliders.read().unwrap_or_else(PoisonError::into_inner);

        let mut contacts: Vec<Contact> = colliders
            .values()
            .filter(|collider| collider.accepted_by(query.filter, query.selection))
            .filter(|collider| region.intersects(&collider.bounds))
            .filter(|collider| {
                query.max_distance.map_or(true, |max| {
                    (collider.bounds.center - region.center).magnitude() <= max
                })
            })
            .map(|collider| {
                let offset = collider.bounds.center - region.center;
                let point = offset
                    .try_normalize(f32::EPSILON)
                    .map_or(region.center, |dir| region.center + dir * region.radius);
                Contact {
                    target: collider.target,
                    intersection: collider.category.intersection_type(),
                    point,
                    penetration: region.penetration_depth(&collider.bounds),
                }
            })
            .collect();

        contacts.sort_by(|a, b| b.penetration.partial_cmp(&a.penetration).unwrap_or(Ordering::Equal));
        contacts
    }
}
