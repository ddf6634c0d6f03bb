mod deferred;

pub use deferred::DelayedAddQueue;

use std::time::Instant;

use log::{debug, trace, warn};

use crate::{
    collision::{bvh::BoundingVolumeTree, kinetic::KineticSet, resolution::Resolver},
    config::EngineConfig,
    core::{
        collidable::{inspect, EntityHandle},
        types::Rect,
    },
    error::Result,
    utils::{
        logging::{warn_if_tick_budget_exceeded, ScopedTimer},
        profiling::{AccumulatingTimer, TickProfile},
    },
};

/// Tick-driven collision engine.
///
/// Static entities live in a [`BoundingVolumeTree`], kinetic ones in a
/// [`KineticSet`]. Every [`update`](Self::update) queries the tree with each
/// kinetic boundary, fires triggers and pushes kinetic entities out of solid
/// geometry. Entities built before their final placement is known can be
/// queued with [`delay_add`](Self::delay_add) and registered later by
/// [`flush`](Self::flush).
pub struct CollisionEngine {
    kinetic: KineticSet,
    statics: BoundingVolumeTree,
    delayed: DelayedAddQueue,
    config: EngineConfig,
    last_tick: TickProfile,
    ticks: u64,
    simulated_ms: u64,
    initialized: bool,
    disposed: bool,
}

impl Default for CollisionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl CollisionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            kinetic: KineticSet::new(),
            statics: BoundingVolumeTree::new(),
            delayed: DelayedAddQueue::new(),
            config: config.sanitized(),
            last_tick: TickProfile::default(),
            ticks: 0,
            simulated_ms: 0,
            initialized: false,
            disposed: false,
        }
    }

    pub fn builder() -> CollisionEngineBuilder {
        CollisionEngineBuilder::default()
    }

    /// Marks the engine ready. Repeated calls do nothing.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        debug!(
            "collision engine initialized (separation factor {:.2})",
            self.config.separation_factor
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Releases every entity reference. `update` must not be called afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.clear();
        self.delayed.clear();
        self.disposed = true;
        debug!("collision engine disposed after {} ticks", self.ticks);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers `entity` immediately: static entities go into the tree,
    /// everything else into the kinetic set.
    pub fn add(&mut self, entity: EntityHandle) -> Result<bool> {
        let is_static = inspect(&entity, |e| e.is_static())?;
        let added = if is_static {
            self.statics.add(&entity)?
        } else {
            self.kinetic.add(entity)
        };
        trace!(
            "add {} entity -> {added}",
            if is_static { "static" } else { "kinetic" }
        );
        Ok(added)
    }

    /// Queues `entity` for the next [`flush`](Self::flush). Queued entities
    /// are invisible to [`contains`](Self::contains) and [`query`](Self::query).
    pub fn delay_add(&mut self, entity: EntityHandle) {
        self.delayed.push(entity);
    }

    /// Registers every queued entity in queue order and returns how many were
    /// added. The queue is always left empty; failures are logged and dropped.
    pub fn flush(&mut self) -> usize {
        let queued = self.delayed.take_all();
        let total = queued.len();
        let mut added = 0;

        for entity in queued {
            match self.add(entity) {
                Ok(true) => added += 1,
                Ok(false) => warn!("dropping delayed entity rejected during flush"),
                Err(err) => warn!("dropping delayed entity: {err}"),
            }
        }

        if total > 0 {
            debug!("flushed {total} delayed entities, {added} registered");
        }
        added
    }

    /// Number of entities waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.delayed.len()
    }

    /// Unregisters one registration of `entity`, dispatching on its static flag.
    pub fn remove(&mut self, entity: &EntityHandle) -> Result<bool> {
        let is_static = inspect(entity, |e| e.is_static())?;
        let removed = if is_static {
            self.statics.remove(entity)
        } else {
            self.kinetic.remove(entity)
        };
        Ok(removed)
    }

    pub fn contains(&self, entity: &EntityHandle) -> bool {
        self.kinetic.contains(entity) || self.statics.contains(entity)
    }

    pub fn count(&self) -> usize {
        self.kinetic.len() + self.statics.count()
    }

    pub fn kinetic_count(&self) -> usize {
        self.kinetic.len()
    }

    pub fn static_count(&self) -> usize {
        self.statics.count()
    }

    /// Empties both membership structures. The delayed queue is untouched.
    pub fn clear(&mut self) {
        self.kinetic.clear();
        self.statics.clear();
    }

    /// Static entities overlapping `area`.
    pub fn query(&self, area: &Rect) -> Vec<EntityHandle> {
        self.statics.query(area)
    }

    /// Snapshot order: kinetic members first, then static ones.
    pub fn iter(&self) -> impl Iterator<Item = &EntityHandle> + '_ {
        self.kinetic.iter().chain(self.statics.iter())
    }

    pub fn static_index(&self) -> &BoundingVolumeTree {
        &self.statics
    }

    /// Counters from the most recent [`update`](Self::update).
    pub fn last_tick(&self) -> &TickProfile {
        &self.last_tick
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Sum of every delta passed to [`update`](Self::update).
    pub fn simulated_ms(&self) -> u64 {
        self.simulated_ms
    }

    /// Runs one collision tick.
    ///
    /// For each kinetic entity, every overlapping static entity first fires
    /// its trigger (when it is one) and then, independently, pushes the
    /// kinetic entity out (when it is solid). Resolution re-reads the kinetic
    /// boundary, so a trigger that already moved it clear leaves nothing to
    /// resolve. `delta_ms` is recorded but does not scale resolution.
    pub fn update(&mut self, delta_ms: u32) {
        debug_assert!(!self.disposed, "update called on a disposed collision engine");
        let _timer = ScopedTimer::new("collision::update");
        let started = Instant::now();
        let factor = self.config.separation_factor;
        let mut profile = TickProfile::default();

        for kinetic in self.kinetic.iter() {
            let Some(mut body) = kinetic.try_lock() else {
                profile.skipped_busy += 1;
                warn!("skipping kinetic entity locked during collision tick");
                continue;
            };
            profile.kinetic_scanned += 1;

            let area = body.boundary();
            let hits = {
                let _query_timer = AccumulatingTimer::new(&mut profile.query_time);
                self.statics.query(&area)
            };

            for hit in hits {
                profile.static_hits += 1;
                // a static that is locked (or is the kinetic entity itself) cannot react
                let Some(mut fixed) = hit.try_lock() else {
                    trace!("skipping locked static entity");
                    continue;
                };

                if fixed.is_trigger() {
                    fixed.trigger(&mut *body);
                    profile.triggers_fired += 1;
                }
                if fixed.is_solid()
                    && Resolver::resolve(&mut *body, &fixed.boundary(), factor).is_some()
                {
                    profile.resolutions += 1;
                }
            }
        }

        profile.total_time = started.elapsed();
        self.ticks += 1;
        self.simulated_ms += u64::from(delta_ms);
        warn_if_tick_budget_exceeded(profile.total_time, self.config.tick_budget_ms);
        if self.config.report_ticks {
            profile.report();
        }
        self.last_tick = profile;
    }
}

impl std::fmt::Debug for CollisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionEngine")
            .field("kinetic", &self.kinetic.len())
            .field("statics", &self.statics)
            .field("pending", &self.delayed.len())
            .field("config", &self.config)
            .field("ticks", &self.ticks)
            .field("initialized", &self.initialized)
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Builder for [`CollisionEngine`].
#[derive(Debug, Clone, Default)]
pub struct CollisionEngineBuilder {
    config: EngineConfig,
}

impl CollisionEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn separation_factor(mut self, factor: f32) -> Self {
        self.config.separation_factor = factor;
        self
    }

    pub fn tick_budget_ms(mut self, budget_ms: f32) -> Self {
        self.config.tick_budget_ms = budget_ms;
        self
    }

    pub fn report_ticks(mut self, enabled: bool) -> Self {
        self.config.report_ticks = enabled;
        self
    }

    pub fn build(self) -> CollisionEngine {
        CollisionEngine::new(self.config)
    }
}
