//! Target identities and per-pick allow/deny lists

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of something a pick can intersect (entity, avatar, HUD surface)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

/// Ignore and include lists applied to intersection candidates
///
/// The two lists are independent. A target on the ignore list is always
/// rejected, even when it also appears on the include list. An empty include
/// list accepts every target that is not ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSelection {
    ignore: HashSet<TargetId>,
    include: HashSet<TargetId>,
}

impl TargetSelection {
    /// Selection that accepts every target
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the ignore list
    pub fn set_ignore<I: IntoIterator<Item = TargetId>>(&mut self, items: I) {
        self.ignore = items.into_iter().collect();
    }

    /// Replace the include list
    pub fn set_include<I: IntoIterator<Item = TargetId>>(&mut self, items: I) {
        self.include = items.into_iter().collect();
    }

    /// Builder form of [`TargetSelection::set_ignore`]
    #[must_use]
    pub fn with_ignore<I: IntoIterator<Item = TargetId>>(mut self, items: I) -> Self {
        self.set_ignore(items);
        self
    }

    /// Builder form of [`TargetSelection::set_include`]
    #[must_use]
    pub fn with_include<I: IntoIterator<Item = TargetId>>(mut self, items: I) -> Self {
        self.set_include(items);
        self
    }

    /// Current ignore list
    pub fn ignored(&self) -> &HashSet<TargetId> {
        &self.ignore
    }

    /// Current include list
    pub fn included(&self) -> &HashSet<TargetId> {
        &self.include
    }

    /// Whether a candidate survives both lists
    pub fn accepts(&self, target: TargetId) -> bool {
        // Exclusion first: it is the cheaper rejection and it wins ties
        if self.ignore.contains(&target) {
            return false;
        }
        self.include.is_empty() || self.include.contains(&target)
    }
}
