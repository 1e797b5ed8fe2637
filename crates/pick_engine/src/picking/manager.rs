//! Pick manager: registry, per-frame scheduling and result readback

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use log::{debug, info, trace, warn};

use crate::config::PickManagerConfig;
use crate::foundation::time::{Stopwatch, SystemClock, TimeSource};
use crate::physics::PhysicsQuery;
use super::items::TargetId;
use super::pick::{Pick, PickSettings, PickSource};
use super::properties::PickProperties;
use super::result::PickResult;
use super::slot::ResultSlot;
use super::sources::{Hand, PickCollaborators};
use super::{PickError, PickId, PickType};

/// Outcome of one evaluation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Picks evaluated this pass
    pub evaluated: usize,
    /// Enabled picks left with stale results
    pub skipped: usize,
    /// Time spent in the pass
    pub elapsed: Duration,
    /// Whether the pass stopped early on the budget
    pub budget_exhausted: bool,
}

/// A registered pick and its cached result
#[derive(Debug)]
struct PickEntry {
    source: PickSource,
    settings: RwLock<PickSettings>,
    enabled: AtomicBool,
    retired: AtomicBool,
    result: ResultSlot,
}

impl PickEntry {
    fn new(pick: Pick) -> Self {
        Self {
            source: pick.source,
            settings: RwLock::new(pick.settings),
            enabled: AtomicBool::new(pick.enabled),
            retired: AtomicBool::new(false),
            result: ResultSlot::new(),
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    /// Still registered and enabled
    fn is_live(&self) -> bool {
        !self.is_retired() && self.is_enabled()
    }

    fn update_settings(&self, update: impl FnOnce(&mut PickSettings)) {
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut *settings);
    }
}

#[derive(Debug)]
struct Registry {
    picks: BTreeMap<PickId, Arc<PickEntry>>,
    next_id: u32,
}

impl Registry {
    fn allocate_id(&mut self) -> Result<PickId, PickError> {
        // next_id wraps to 0 once u32::MAX has been handed out
        if self.next_id == 0 {
            return Err(PickError::IdsExhausted);
        }
        let id = PickId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }
}

/// # Pick Manager
///
/// Owns every pick, evaluates enabled picks once per frame under a time
/// budget and caches one result per pick.
///
/// All methods take `&self`; the manager is meant to be shared through an
/// `Arc` between the frame thread running [`PickManager::run_evaluation_pass`]
/// and any number of threads configuring picks or reading results.
///
/// ## Scheduling
///
/// Enabled picks are visited in id order starting just after the last pick
/// evaluated by the previous pass, wrapping around. Before each pick the
/// elapsed time is checked against the budget; once it is reached the pass
/// stops and the remaining picks keep their previous results. Over enough
/// frames every enabled pick gets evaluated.
pub struct PickManager {
    registry: RwLock<Registry>,
    collaborators: RwLock<PickCollaborators>,
    clock: Arc<dyn TimeSource>,
    per_frame_budget_usecs: AtomicU32,
    resume_after: Mutex<Option<PickId>>,
    last_report: Mutex<PassReport>,
    pass_guard: Mutex<()>,
}

impl PickManager {
    /// Create a manager using the wall clock and the default budget
    pub fn new(collaborators: PickCollaborators) -> Self {
        Self::with_clock(collaborators, Arc::new(SystemClock::new()))
    }

    /// Create a manager measuring its budget against a custom time source
    pub fn with_clock(collaborators: PickCollaborators, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            registry: RwLock::new(Registry {
                picks: BTreeMap::new(),
                next_id: 1,
            }),
            collaborators: RwLock::new(collaborators),
            clock,
            per_frame_budget_usecs: AtomicU32::new(crate::config::DEFAULT_PER_FRAME_TIME_BUDGET_USECS),
            resume_after: Mutex::new(None),
            last_report: Mutex::new(PassReport::default()),
            pass_guard: Mutex::new(()),
        }
    }

    /// Create a manager from startup configuration
    pub fn from_config(config: &PickManagerConfig, collaborators: PickCollaborators) -> Self {
        let manager = Self::new(collaborators);
        manager.set_per_frame_time_budget(config.per_frame_time_budget_usecs);
        info!(
            "Pick manager created with a {}us per-frame budget",
            config.per_frame_time_budget_usecs
        );
        manager
    }

    #[cfg(test)]
    pub(crate) fn set_next_id(&self, next_id: u32) {
        self.write_registry().next_id = next_id;
    }

    fn read_registry(&self) -> std::sync::RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> std::sync::RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn entry(&self, id: PickId) -> Option<Arc<PickEntry>> {
        self.read_registry().picks.get(&id).cloned()
    }

    // ---- Construction and removal ----

    /// Register a pick, returning [`PickId::INVALID`] on failure
    pub fn add_pick(&self, properties: impl Into<PickProperties>) -> PickId {
        self.try_add_pick(properties).unwrap_or_else(|e| {
            warn!("Rejected pick creation: {}", e);
            PickId::INVALID
        })
    }

    /// Register a pick after checking the properties describe `pick_type`
    pub fn add_pick_of_type(&self, pick_type: PickType, properties: impl Into<PickProperties>) -> PickId {
        let properties = properties.into();
        let provided = properties.pick_type();
        if provided != pick_type {
            warn!(
                "Rejected pick creation: {}",
                PickError::TypeMismatch {
                    requested: pick_type,
                    provided,
                }
            );
            return PickId::INVALID;
        }
        self.add_pick(properties)
    }

    /// Register a pick from a raw script type value
    pub fn add_pick_from_raw(&self, raw_type: u16, properties: impl Into<PickProperties>) -> PickId {
        match PickType::from_raw(raw_type) {
            Some(pick_type) => self.add_pick_of_type(pick_type, properties),
            None => {
                warn!("Rejected pick creation: {}", PickError::UnknownPickType(raw_type));
                PickId::INVALID
            }
        }
    }

    /// Register a pick, reporting why it was rejected
    pub fn try_add_pick(&self, properties: impl Into<PickProperties>) -> Result<PickId, PickError> {
        let pick = properties.into().into_pick()?;
        self.try_register(pick)
    }

    /// Register an already validated pick
    pub fn try_register(&self, pick: Pick) -> Result<PickId, PickError> {
        let pick_type = pick.pick_type();
        let entry = Arc::new(PickEntry::new(pick));

        let mut registry = self.write_registry();
        let id = registry.allocate_id()?;
        registry.picks.insert(id, entry);
        drop(registry);

        debug!("Added {:?} pick {}", pick_type, id);
        Ok(id)
    }

    /// Deregister a pick; unknown ids are ignored
    ///
    /// A pass that is evaluating the pick right now finishes on its own
    /// reference and discards the result.
    pub fn remove_pick(&self, id: PickId) {
        let removed = self.write_registry().picks.remove(&id);
        if let Some(entry) = removed {
            entry.retired.store(true, Ordering::Release);
            entry.result.clear();
            debug!("Removed pick {}", id);
        }
    }

    // ---- Per-pick state ----

    /// Include the pick in future passes
    pub fn enable_pick(&self, id: PickId) {
        if let Some(entry) = self.entry(id) {
            entry.enabled.store(true, Ordering::Release);
        }
    }

    /// Exclude the pick from future passes; its cached result is kept
    pub fn disable_pick(&self, id: PickId) {
        if let Some(entry) = self.entry(id) {
            entry.enabled.store(false, Ordering::Release);
        }
    }

    /// Whether the pick exists and is enabled
    pub fn is_enabled(&self, id: PickId) -> bool {
        self.entry(id).is_some_and(|entry| entry.is_enabled())
    }

    /// Most recent result, `None` before the first evaluation or for unknown ids
    pub fn get_prev_pick_result(&self, id: PickId) -> Option<Arc<PickResult>> {
        self.entry(id)?.result.load()
    }

    /// Switch between exact geometry and coarse bounds
    pub fn set_precision_picking(&self, id: PickId, precision_picking: bool) {
        if let Some(entry) = self.entry(id) {
            entry.update_settings(|settings| settings.set_precision_picking(precision_picking));
        }
    }

    /// Replace the ignore list
    pub fn set_ignore_items<I: IntoIterator<Item = TargetId>>(&self, id: PickId, items: I) {
        if let Some(entry) = self.entry(id) {
            entry.update_settings(|settings| settings.selection.set_ignore(items));
        }
    }

    /// Replace the include list
    pub fn set_include_items<I: IntoIterator<Item = TargetId>>(&self, id: PickId, items: I) {
        if let Some(entry) = self.entry(id) {
            entry.update_settings(|settings| settings.selection.set_include(items));
        }
    }

    /// Scripting-level type of a live pick
    pub fn pick_type(&self, id: PickId) -> Option<PickType> {
        self.entry(id).map(|entry| entry.source.pick_type())
    }

    /// `true` for a stylus pick on the left hand
    pub fn is_left_hand(&self, id: PickId) -> bool {
        self.entry(id).is_some_and(|entry| {
            matches!(entry.source, PickSource::Stylus { hand: Hand::Left })
        })
    }

    /// `true` for a stylus pick on the right hand
    pub fn is_right_hand(&self, id: PickId) -> bool {
        self.entry(id).is_some_and(|entry| {
            matches!(entry.source, PickSource::Stylus { hand: Hand::Right })
        })
    }

    /// `true` for a ray pick following the pointer
    pub fn is_mouse(&self, id: PickId) -> bool {
        self.entry(id)
            .is_some_and(|entry| matches!(entry.source, PickSource::MouseRay))
    }

    /// Number of registered picks
    pub fn pick_count(&self) -> usize {
        self.read_registry().picks.len()
    }

    // ---- Manager settings ----

    /// Set the per-frame budget in microseconds, 0 for unbounded
    pub fn set_per_frame_time_budget(&self, usecs: u32) {
        self.per_frame_budget_usecs.store(usecs, Ordering::Relaxed);
    }

    /// Per-frame budget in microseconds, 0 for unbounded
    pub fn per_frame_time_budget(&self) -> u32 {
        self.per_frame_budget_usecs.load(Ordering::Relaxed)
    }

    /// Replace every collaborator
    pub fn set_collaborators(&self, collaborators: PickCollaborators) {
        *self.collaborators.write().unwrap_or_else(PoisonError::into_inner) = collaborators;
    }

    /// Replace the physics collaborator, or detach it with `None`
    pub fn set_physics(&self, physics: Option<Arc<dyn PhysicsQuery>>) {
        self.collaborators
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .physics = physics;
    }

    /// Report of the most recent pass
    pub fn last_pass_report(&self) -> PassReport {
        *self.last_report.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- Evaluation ----

    /// Evaluate enabled picks until done or out of budget
    pub fn run_evaluation_pass(&self) -> PassReport {
        let _pass = self.pass_guard.lock().unwrap_or_else(PoisonError::into_inner);

        let mut order: Vec<(PickId, Arc<PickEntry>)> = self
            .read_registry()
            .picks
            .iter()
            .filter(|(_, entry)| entry.is_enabled())
            .map(|(id, entry)| (*id, Arc::clone(entry)))
            .collect();

        let resume_after = *self.resume_after.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = resume_after {
            let start = order.iter().position(|(id, _)| *id > last).unwrap_or(0);
            order.rotate_left(start);
        }

        let collaborators = self
            .collaborators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let budget = Duration::from_micros(u64::from(self.per_frame_time_budget()));
        let stopwatch = Stopwatch::start_new(self.clock.as_ref());

        let mut report = PassReport::default();
        let mut last_evaluated = None;

        for (index, (id, entry)) in order.iter().enumerate() {
            if !budget.is_zero() && stopwatch.elapsed() >= budget {
                report.budget_exhausted = true;
                report.skipped = order[index..]
                    .iter()
                    .filter(|(_, entry)| entry.is_live())
                    .count();
                debug!(
                    "Pick budget of {:?} exhausted after {} picks, {} deferred",
                    budget, report.evaluated, report.skipped
                );
                break;
            }
            if !entry.is_live() {
                continue;
            }

            let settings = entry
                .settings
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            let result = entry.source.evaluate(&settings, &collaborators);

            if entry.is_retired() {
                trace!("Pick {} removed during evaluation, result discarded", id);
            } else {
                trace!("Pick {} evaluated, hit: {}", id, result.is_hit());
                entry.result.store(result);
            }
            report.evaluated += 1;
            last_evaluated = Some(*id);
        }

        if last_evaluated.is_some() {
            *self.resume_after.lock().unwrap_or_else(PoisonError::into_inner) = last_evaluated;
        }
        report.elapsed = stopwatch.elapsed();
        *self.last_report.lock().unwrap_or_else(PoisonError::into_inner) = report;
        report
    }
}

impl std::fmt::Debug for PickManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickManager")
            .field("picks", &self.pick_count())
            .field("per_frame_time_budget", &self.per_frame_time_budget())
            .field("last_pass", &self.last_pass_report())
            .finish_non_exhaustive()
    }
}
