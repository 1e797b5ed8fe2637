//! Pick registry, scheduling and result caching
//!
//! A pick is a spatial probe (ray, stylus or collision volume) owned by the
//! [`PickManager`]. Every frame the manager evaluates enabled picks in
//! round-robin order until its time budget runs out, caching each result for
//! readers on other threads.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pick_engine::physics::ColliderWorld;
//! use pick_engine::picking::{PickCollaborators, PickManager, PickProperties};
//!
//! let world = Arc::new(ColliderWorld::new());
//! let manager = PickManager::new(PickCollaborators::new().with_physics(world));
//!
//! let properties = PickProperties::from_toml_str(
//!     "type = \"ray\"\nenabled = true\nfilter = 7\nposition = [0.0, 0.0, 0.0]",
//! ).unwrap();
//! let id = manager.add_pick(properties);
//!
//! manager.run_evaluation_pass();
//! let hit = manager.get_prev_pick_result(id).map(|result| result.is_hit());
//! ```

pub mod filter;
pub mod items;
pub mod manager;
pub mod pick;
pub mod properties;
pub mod result;
pub mod slot;
pub mod sources;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::physics::ShapeType;

pub use filter::{PickFilter, TargetCategory};
pub use items::{TargetId, TargetSelection};
pub use manager::{PassReport, PickManager};
pub use pick::{Pick, PickSettings, PickSource, AVATAR_JOINT, HEAD_JOINT, MOUSE_JOINT, STYLUS_TIP_LENGTH};
pub use properties::{
    CollisionPickProperties, PickProperties, RayPickProperties, ShapeProperties,
    StylusPickProperties,
};
pub use result::{
    CollisionPickResult, Contact, IntersectionType, PickResult, SurfaceHit, SurfacePickResult,
};
pub use slot::ResultSlot;
pub use sources::{
    ControllerQuery, Hand, PickCollaborators, PointerQuery, SkeletonQuery, StaticControllers,
    StaticSkeleton,
};

/// Identity of a registered pick
///
/// Assigned monotonically from 1 and never reused. `0` is never assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickId(pub u32);

impl PickId {
    /// Returned when a pick could not be created
    pub const INVALID: Self = Self(0);

    /// `false` only for [`PickId::INVALID`]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for PickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pick#{}", self.0)
    }
}

/// Scripting-level pick type
///
/// Joint and mouse picks are ray picks with a different geometry source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickType {
    /// Ray pick
    Ray,
    /// Stylus pick
    Stylus,
    /// Collision pick
    Collision,
}

impl PickType {
    /// Map a raw script value, `None` when unrecognized
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(Self::Ray),
            1 => Some(Self::Stylus),
            2 => Some(Self::Collision),
            _ => None,
        }
    }
}

/// Pick construction and lookup errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PickError {
    /// Raw type value does not name a pick type
    #[error("Unknown pick type: {0}")]
    UnknownPickType(u16),

    /// Properties describe a different type than requested
    #[error("Requested a {requested:?} pick but properties describe a {provided:?} pick")]
    TypeMismatch {
        /// Type asked for
        requested: PickType,
        /// Type the properties build
        provided: PickType,
    },

    /// Required property absent
    #[error("{pick_type:?} pick is missing required property '{field}'")]
    MissingField {
        /// Type being built
        pick_type: PickType,
        /// Missing property
        field: &'static str,
    },

    /// Max distance negative or not finite
    #[error("Invalid max distance: {0}")]
    InvalidMaxDistance(f32),

    /// Zero-length or non-finite direction
    #[error("Degenerate vector in '{0}'")]
    DegenerateDirection(&'static str),

    /// Orientation cannot be normalized
    #[error("Orientation is not a valid rotation")]
    InvalidOrientation,

    /// Model-based shape without a model
    #[error("Shape {0:?} requires a model URL")]
    MissingModelUrl(ShapeType),

    /// Malformed property document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Every pick id has been handed out
    #[error("Pick id space exhausted")]
    IdsExhausted,
}
