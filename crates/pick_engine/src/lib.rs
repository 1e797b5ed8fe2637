//! # Pick Engine
//!
//! Budgeted per-frame evaluation of spatial picks with cross-thread result
//! caching.
//!
//! ## Features
//!
//! - **Heterogeneous picks**: static, joint and mouse rays, hand styluses and
//!   collision volumes behind one registry
//! - **Time-budgeted scheduling**: round-robin evaluation that stops when the
//!   per-frame budget is spent
//! - **Lock-light readback**: results are swapped whole and read from any
//!   thread
//! - **Typed properties**: pick definitions parsed from TOML or RON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pick_engine::prelude::*;
//!
//! let world = Arc::new(ColliderWorld::new());
//! world.insert(Collider::sphere(
//!     TargetId(1),
//!     TargetCategory::DomainEntity,
//!     BoundingSphere::new(Vec3::new(0.0, -6.0, 0.0), 1.0),
//! ));
//!
//! let manager = PickManager::new(PickCollaborators::new().with_physics(world));
//! let id = manager.add_pick(RayPickProperties {
//!     enabled: true,
//!     filter: PickFilter::ENTITIES,
//!     max_distance: 10.0,
//!     position: Some(Vec3::zeros()),
//!     ..Default::default()
//! });
//!
//! manager.run_evaluation_pass();
//! if let Some(result) = manager.get_prev_pick_result(id) {
//!     println!("hit at {:?}", result.distance());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod picking;

/// Common imports for pick engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PickManagerConfig},
        foundation::{
            math::{Pose, Quat, Vec3},
            time::{ManualClock, SystemClock, TimeSource},
        },
        input::{PointerTracker, Viewport},
        physics::{BoundingSphere, Collider, ColliderWorld, CollisionRegion, PhysicsQuery, Ray, ShapeType},
        picking::{
            CollisionPickProperties, Hand, PassReport, PickCollaborators, PickError, PickFilter,
            PickId, PickManager, PickProperties, PickResult, PickType, RayPickProperties,
            StylusPickProperties, TargetCategory, TargetId,
        },
    };
}
