//! Pick filter bitmask
//!
//! Classifies which categories of target a pick may intersect, and whether
//! the intersection should run against coarse bounds or exact geometry.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::result::IntersectionType;

bitflags::bitflags! {
    /// Target categories and query modifiers a pick is allowed to consider
    ///
    /// The default filter is empty and matches nothing, so a freshly created
    /// pick never triggers a wildcard scan by accident. Bits with no defined
    /// meaning survive [`PickFilter::from_bits_retain`] untouched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PickFilter: u32 {
        /// Entities owned by the domain
        const DOMAIN_ENTITIES = 1 << 0;
        /// Entities attached to avatars
        const AVATAR_ENTITIES = 1 << 1;
        /// Client-only entities
        const LOCAL_ENTITIES = 1 << 2;
        /// Avatar bodies
        const AVATARS = 1 << 3;
        /// The heads-up display surface
        const HUD = 1 << 4;
        /// Include visible targets
        const VISIBLE = 1 << 5;
        /// Include invisible targets
        const INVISIBLE = 1 << 6;
        /// Include collidable targets
        const COLLIDABLE = 1 << 7;
        /// Include non-collidable targets
        const NONCOLLIDABLE = 1 << 8;
        /// Intersect exact geometry
        const PRECISE = 1 << 9;
        /// Intersect coarse bounds only
        const COARSE = 1 << 10;

        /// Every kind of entity
        const ENTITIES = Self::DOMAIN_ENTITIES.bits()
            | Self::AVATAR_ENTITIES.bits()
            | Self::LOCAL_ENTITIES.bits();
    }
}

/// Category of a pickable target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetCategory {
    /// Domain-owned entity
    DomainEntity,
    /// Entity attached to an avatar
    AvatarEntity,
    /// Client-only entity
    LocalEntity,
    /// Avatar body
    Avatar,
    /// Heads-up display
    Hud,
}

impl TargetCategory {
    /// Filter bit selecting this category
    pub fn flag(self) -> PickFilter {
        match self {
            Self::DomainEntity => PickFilter::DOMAIN_ENTITIES,
            Self::AvatarEntity => PickFilter::AVATAR_ENTITIES,
            Self::LocalEntity => PickFilter::LOCAL_ENTITIES,
            Self::Avatar => PickFilter::AVATARS,
            Self::Hud => PickFilter::HUD,
        }
    }

    /// How a hit on this category is reported to callers
    pub fn intersection_type(self) -> IntersectionType {
        match self {
            Self::DomainEntity | Self::AvatarEntity => IntersectionType::Entity,
            Self::LocalEntity => IntersectionType::LocalEntity,
            Self::Avatar => IntersectionType::Avatar,
            Self::Hud => IntersectionType::Hud,
        }
    }
}

impl PickFilter {
    const CATEGORIES: Self = Self::ENTITIES.union(Self::AVATARS).union(Self::HUD);

    /// Membership test for one target category
    pub fn does_pick(self, category: TargetCategory) -> bool {
        self.contains(category.flag())
    }

    /// `true` when no target category is selected
    ///
    /// Such a filter can never produce a hit, so evaluation skips the
    /// collaborator query entirely.
    pub fn picks_nothing(self) -> bool {
        !self.intersects(Self::CATEGORIES)
    }

    /// Visibility test
    ///
    /// Visible targets pass unless the filter asks for invisible targets
    /// only; invisible targets pass only when `INVISIBLE` is set.
    pub fn picks_visibility(self, visible: bool) -> bool {
        if visible {
            self.contains(Self::VISIBLE) || !self.contains(Self::INVISIBLE)
        } else {
            self.contains(Self::INVISIBLE)
        }
    }

    /// Collidability test, same rules as [`PickFilter::picks_visibility`]
    pub fn picks_collidability(self, collidable: bool) -> bool {
        if collidable {
            self.contains(Self::COLLIDABLE) || !self.contains(Self::NONCOLLIDABLE)
        } else {
            self.contains(Self::NONCOLLIDABLE)
        }
    }

    /// Full target test used by collaborators before any narrow-phase work
    pub fn picks_target(self, category: TargetCategory, visible: bool, collidable: bool) -> bool {
        self.does_pick(category)
            && self.picks_visibility(visible)
            && self.picks_collidability(collidable)
    }

    /// Coarse-bounds intersection requested
    ///
    /// `PRECISE` wins when both modifiers are set.
    pub fn is_coarse(self) -> bool {
        self.contains(Self::COARSE) && !self.contains(Self::PRECISE)
    }

    /// Exact-geometry intersection requested
    pub fn is_precise(self) -> bool {
        !self.is_coarse()
    }

    /// Copy of this filter with precision picking switched on or off
    #[must_use]
    pub fn with_precision(self, precise: bool) -> Self {
        if precise {
            self.difference(Self::COARSE).union(Self::PRECISE)
        } else {
            self.difference(Self::PRECISE).union(Self::COARSE)
        }
    }
}

impl Default for PickFilter {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<u32> for PickFilter {
    fn from(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}

impl From<PickFilter> for u32 {
    fn from(filter: PickFilter) -> Self {
        filter.bits()
    }
}

impl Serialize for PickFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for PickFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::from_bits_retain)
    }
}
