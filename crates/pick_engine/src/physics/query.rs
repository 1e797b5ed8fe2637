//! Physics query seam used by pick evaluation

use crate::picking::{Contact, PickFilter, SurfaceHit, TargetSelection};
use super::primitives::Ray;
use super::shape::CollisionRegion;

/// Closest-hit ray cast request
#[derive(Debug, Clone, Copy)]
pub struct RayQuery<'a> {
    /// Ray to cast
    pub ray: Ray,
    /// Hits further than this are ignored; `None` is unbounded
    pub max_distance: Option<f32>,
    /// Target categories and precision to consider
    pub filter: PickFilter,
    /// Ignore/include lists
    pub selection: &'a TargetSelection,
}

/// Volume overlap request
#[derive(Debug, Clone, Copy)]
pub struct OverlapQuery<'a> {
    /// Region to test
    pub region: &'a CollisionRegion,
    /// Target categories and precision to consider
    pub filter: PickFilter,
    /// Contacts further than this from the region center are ignored
    pub max_distance: Option<f32>,
    /// Ignore/include lists
    pub selection: &'a TargetSelection,
}

/// Physics collaborator answering ray and overlap queries
///
/// Implementations are shared with the evaluation thread and must tolerate
/// concurrent calls.
pub trait PhysicsQuery: Send + Sync {
    /// Closest accepted hit along the ray
    fn intersect_ray(&self, query: &RayQuery<'_>) -> Option<SurfaceHit>;

    /// Every accepted target overlapping the region, deepest first
    fn overlap_region(&self, query: &OverlapQuery<'_>) -> Vec<Contact>;
}
