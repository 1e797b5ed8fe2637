//! Physics geometry and the query seam used by picks
//!
//! Picks never own geometry. They describe what to look for, and a
//! [`PhysicsQuery`] implementation answers. [`ColliderWorld`] is the bundled
//! implementation used by the demo driver and tests.

pub mod collider_world;
pub mod primitives;
pub mod query;
pub mod shape;

pub use collider_world::{Collider, ColliderWorld};
pub use primitives::{BoundingSphere, Ray, Triangle};
pub use query::{OverlapQuery, PhysicsQuery, RayQuery};
pub use shape::{CollisionRegion, ShapeType};
