//! Scenario tests for the pick manager
//!
//! Shared fakes live here: a scripted physics collaborator that charges a
//! fixed cost against a manual clock per query, so budget behavior is exact.


use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::foundation::math::Vec3;
use crate::foundation::time::ManualClock;
use crate::physics::{OverlapQuery, PhysicsQuery, RayQuery};
use crate::picking::{
    Contact, IntersectionType, PickCollaborators, PickFilter, PickManager, RayPickProperties,
    SurfaceHit, TargetId,
};

/// One query seen by [`ScriptedPhysics`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct SeenQuery {
    pub origin: Vec3,
    pub filter: PickFilter,
    pub max_distance: Option<f32>,
}

/// Physics fake reporting a fixed set of targets at fixed distances
pub(super) struct ScriptedPhysics {
    clock: ManualClock,
    cost: Duration,
    targets: Vec<(TargetId, f32)>,
    honor_selection: bool,
    seen: Mutex<Vec<SeenQuery>>,
}

impl ScriptedPhysics {
    pub fn new(clock: ManualClock, cost: Duration) -> Self {
        Self {
            clock,
            cost,
            targets: Vec::new(),
            honor_selection: true,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_target(mut self, target: TargetId, distance: f32) -> Self {
        self.targets.push((target, distance));
        self
    }

    /// Return every target regardless of the item lists
    pub fn ignoring_selection(mut self) -> Self {
        self.honor_selection = false;
        self
    }

    pub fn seen(&self) -> Vec<SeenQuery> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// X coordinate of every ray origin seen, which tests use as a pick label
    pub fn seen_labels(&self) -> Vec<u32> {
        self.seen().iter().map(|query| query.origin.x as u32).collect()
    }

    pub fn clear_seen(&self) {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl PhysicsQuery for ScriptedPhysics {
    fn intersect_ray(&self, query: &RayQuery<'_>) -> Option<SurfaceHit> {
        self.clock.advance(self.cost);
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).push(SeenQuery {
            origin: query.ray.origin,
            filter: query.filter,
            max_distance: query.max_distance,
        });

        self.targets
            .iter()
            .filter(|(target, _)| !self.honor_selection || query.selection.accepts(*target))
            .filter(|(_, distance)| query.max_distance.map_or(true, |max| *distance <= max))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(target, distance)| SurfaceHit {
                target: *target,
                intersection: IntersectionType::Entity,
                distance: *distance,
                point: query.ray.point_at(*distance),
                normal: -query.ray.direction,
            })
    }

    fn overlap_region(&self, query: &OverlapQuery<'_>) -> Vec<Contact> {
        self.clock.advance(self.cost);
        self.targets
            .iter()
            .filter(|(target, _)| !self.honor_selection || query.selection.accepts(*target))
            .map(|(target, depth)| Contact {
                target: *target,
                intersection: IntersectionType::Avatar,
                point: query.region.position,
                penetration: *depth,
            })
            .collect()
    }
}

/// Manager on a manual clock wired to the given physics fake
pub(super) fn manager_with(physics: &Arc<ScriptedPhysics>, clock: &ManualClock) -> PickManager {
    let physics: Arc<dyn PhysicsQuery> = Arc::clone(physics) as Arc<dyn PhysicsQuery>;
    PickManager::with_clock(
        PickCollaborators::new().with_physics(physics),
        Arc::new(clock.clone()),
    )
}

/// Enabled static ray pointing down from `(label, 0, 0)`
pub(super) fn labelled_ray(label: u32) -> RayPickProperties {
    RayPickProperties {
        enabled: true,
        filter: PickFilter::ENTITIES,
        position: Some(Vec3::new(label as f32, 0.0, 0.0)),
        ..Default::default()
    }
}
