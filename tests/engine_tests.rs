use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use approx::assert_relative_eq;
use parking_lot::Mutex;
use tile_collision::*;

/// Static tile that counts trigger hits and can optionally bounce the intruder.
struct TriggerTile {
    bounds: Rect,
    solid: bool,
    hits: Arc<AtomicUsize>,
    launch: Option<Vec2>,
    log: Option<Arc<Mutex<Vec<&'static str>>>>,
}

impl TriggerTile {
    fn new(bounds: Rect, solid: bool) -> Self {
        Self {
            bounds,
            solid,
            hits: Arc::new(AtomicUsize::new(0)),
            launch: None,
            log: None,
        }
    }
}

impl Collidable for TriggerTile {
    fn boundary(&self) -> Rect {
        self.bounds
    }

    fn translate(&mut self, offset: Vec2) {
        self.bounds = self.bounds.translated(offset);
    }

    fn is_static(&self) -> bool {
        true
    }

    fn is_solid(&self) -> bool {
        self.solid
    }

    fn is_trigger(&self) -> bool {
        true
    }

    fn trigger(&mut self, other: &mut dyn Collidable) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.lock().push("trigger");
        }
        if let Some(launch) = self.launch {
            other.translate(launch);
        }
    }
}

/// Kinetic body that records every translation it receives.
struct Recorder {
    bounds: Rect,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Collidable for Recorder {
    fn boundary(&self) -> Rect {
        self.bounds
    }

    fn translate(&mut self, offset: Vec2) {
        self.log.lock().push("translate");
        self.bounds = self.bounds.translated(offset);
    }

    fn is_static(&self) -> bool {
        false
    }

    fn is_solid(&self) -> bool {
        true
    }

    fn is_trigger(&self) -> bool {
        false
    }
}

fn wall(x: f32, y: f32, w: f32, h: f32) -> EntityHandle {
    share(StaticTile::solid(Rect::new(x, y, w, h)))
}

fn body(x: f32, y: f32, w: f32, h: f32) -> EntityHandle {
    share(KineticBody::new(Rect::new(x, y, w, h)))
}

#[test]
fn kinetic_is_pushed_out_of_solid_tile() {
    let mut engine = CollisionEngine::default();
    let player = share(KineticBody::new(Rect::new(0.0, 0.0, 2.0, 2.0)));
    engine.add(wall(1.0, 0.0, 2.0, 2.0)).unwrap();
    engine.add(player.clone()).unwrap();

    engine.update(16);

    let bounds = player.lock().bounds;
    assert_relative_eq!(bounds.left(), -1.1, epsilon = 1e-5);
    assert_relative_eq!(bounds.top(), 0.0);
    assert_relative_eq!(bounds.right(), 0.9, epsilon = 1e-5);
    assert!(!bounds.intersects(&Rect::new(1.0, 0.0, 2.0, 2.0)));
}

#[test]
fn passable_tile_does_not_push() {
    let mut engine = CollisionEngine::default();
    let player = share(KineticBody::new(Rect::new(0.0, 0.0, 2.0, 2.0)));
    engine
        .add(share(StaticTile::passable(Rect::new(1.0, 0.0, 2.0, 2.0))))
        .unwrap();
    engine.add(player.clone()).unwrap();

    engine.update(16);

    assert_eq!(player.lock().bounds, Rect::new(0.0, 0.0, 2.0, 2.0));
    assert_eq!(engine.last_tick().static_hits, 1);
    assert_eq!(engine.last_tick().resolutions, 0);
}

#[test]
fn delayed_entities_appear_only_after_flush() {
    let mut engine = CollisionEngine::default();
    let a = wall(0.0, 0.0, 1.0, 1.0);
    let b = body(4.0, 4.0, 1.0, 1.0);

    engine.delay_add(a.clone());
    engine.delay_add(b.clone());
    assert!(!engine.contains(&a));
    assert!(!engine.contains(&b));
    assert!(engine.query(&Rect::new(0.0, 0.0, 1.0, 1.0)).is_empty());
    assert_eq!(engine.pending(), 2);
    assert_eq!(engine.count(), 0);

    assert_eq!(engine.flush(), 2);
    assert!(engine.contains(&a));
    assert!(engine.contains(&b));
    assert_eq!(engine.pending(), 0);
    assert_eq!(engine.count(), 2);
    assert_eq!(engine.flush(), 0);
}

#[test]
fn flush_drops_failed_entries() {
    let mut engine = CollisionEngine::default();
    let good = wall(0.0, 0.0, 1.0, 1.0);
    let bad = wall(f32::NAN, 0.0, 1.0, 1.0);
    let busy = body(0.0, 0.0, 1.0, 1.0);

    engine.delay_add(good.clone());
    engine.delay_add(bad.clone());
    engine.delay_add(busy.clone());

    let added = {
        let _held = busy.lock();
        engine.flush()
    };

    assert_eq!(added, 1);
    assert_eq!(engine.pending(), 0);
    assert!(engine.contains(&good));
    assert!(!engine.contains(&bad));
    assert!(!engine.contains(&busy));
    // failed entries are not retried
    assert_eq!(engine.flush(), 0);
}

#[test]
fn count_tracks_membership_in_any_order() {
    let mut engine = CollisionEngine::default();
    let statics: Vec<_> = (0..6).map(|i| wall(i as f32 * 2.0, 0.0, 1.0, 1.0)).collect();
    let kinetics: Vec<_> = (0..4).map(|i| body(i as f32 * 2.0, 5.0, 1.0, 1.0)).collect();

    for (i, entity) in statics.iter().chain(kinetics.iter()).enumerate() {
        assert_eq!(engine.add(entity.clone()), Ok(true));
        assert_eq!(engine.count(), i + 1);
    }
    assert_eq!(engine.static_count(), 6);
    assert_eq!(engine.kinetic_count(), 4);

    assert_eq!(engine.remove(&kinetics[1]), Ok(true));
    assert_eq!(engine.remove(&statics[4]), Ok(true));
    assert_eq!(engine.remove(&statics[4]), Ok(false));
    assert_eq!(engine.count(), 8);
    assert!(!engine.contains(&kinetics[1]));
    assert!(!engine.contains(&statics[4]));

    let snapshot: Vec<_> = engine.iter().cloned().collect();
    assert_eq!(snapshot.len(), engine.count());
    for entity in statics.iter().chain(kinetics.iter()) {
        let appearances = snapshot.iter().filter(|m| same_entity(m, entity)).count();
        assert_eq!(appearances, usize::from(engine.contains(entity)));
    }
}

#[test]
fn iteration_lists_kinetic_members_first() {
    let mut engine = CollisionEngine::default();
    let tile = wall(0.0, 0.0, 1.0, 1.0);
    let mover = body(3.0, 3.0, 1.0, 1.0);
    engine.add(tile.clone()).unwrap();
    engine.add(mover.clone()).unwrap();

    let order: Vec<_> = engine.iter().collect();
    assert!(same_entity(order[0], &mover));
    assert!(same_entity(order[1], &tile));
}

#[test]
fn clear_is_idempotent_and_keeps_delayed_queue() {
    let mut engine = CollisionEngine::default();
    engine.clear();
    assert_eq!(engine.count(), 0);

    engine.add(wall(0.0, 0.0, 1.0, 1.0)).unwrap();
    engine.add(body(0.0, 0.0, 1.0, 1.0)).unwrap();
    engine.delay_add(body(2.0, 2.0, 1.0, 1.0));

    engine.clear();
    assert_eq!(engine.count(), 0);
    engine.clear();
    assert_eq!(engine.count(), 0);
    assert_eq!(engine.pending(), 1);
    assert_eq!(engine.flush(), 1);
    assert_eq!(engine.count(), 1);
}

#[test]
fn locked_entity_is_reported_not_swallowed() {
    let mut engine = CollisionEngine::default();
    let tile = wall(0.0, 0.0, 1.0, 1.0);
    let _held = tile.lock();

    assert!(matches!(
        engine.add(tile.clone()),
        Err(CollisionError::InvalidArgument(_))
    ));
    assert!(matches!(
        engine.remove(&tile),
        Err(CollisionError::InvalidArgument(_))
    ));
}

#[test]
fn trigger_fires_before_solid_resolution() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = CollisionEngine::default();

    let mut tile = TriggerTile::new(Rect::new(1.0, 0.0, 2.0, 2.0), true);
    tile.log = Some(log.clone());
    let hits = tile.hits.clone();
    engine.add(share(tile)).unwrap();
    engine
        .add(share(Recorder {
            bounds: Rect::new(0.0, 0.0, 2.0, 2.0),
            log: log.clone(),
        }))
        .unwrap();

    engine.update(16);

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(*log.lock(), vec!["trigger", "translate"]);
    assert_eq!(engine.last_tick().triggers_fired, 1);
    assert_eq!(engine.last_tick().resolutions, 1);
}

#[test]
fn trigger_that_moves_kinetic_clear_suppresses_resolution() {
    let mut engine = CollisionEngine::default();
    let mut spring = TriggerTile::new(Rect::new(1.0, 0.0, 2.0, 2.0), true);
    spring.launch = Some(Vec2::new(0.0, -10.0));
    let hits = spring.hits.clone();
    engine.add(share(spring)).unwrap();

    let player = share(KineticBody::new(Rect::new(0.0, 0.0, 2.0, 2.0)));
    engine.add(player.clone()).unwrap();

    engine.update(16);

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(player.lock().bounds, Rect::new(0.0, -10.0, 2.0, 2.0));
    assert_eq!(engine.last_tick().resolutions, 0);
}

#[test]
fn non_solid_trigger_only_fires_callback() {
    let mut engine = CollisionEngine::default();
    let coin = TriggerTile::new(Rect::new(0.5, 0.5, 1.0, 1.0), false);
    let hits = coin.hits.clone();
    engine.add(share(coin)).unwrap();

    let player = share(KineticBody::new(Rect::new(0.0, 0.0, 2.0, 2.0)));
    engine.add(player.clone()).unwrap();

    engine.update(16);
    engine.update(16);

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(player.lock().bounds, Rect::new(0.0, 0.0, 2.0, 2.0));
}

#[test]
fn wedged_kinetic_is_pushed_once_per_hit() {
    let mut engine = CollisionEngine::default();
    engine.add(wall(-1.0, 0.0, 1.5, 4.0)).unwrap();
    engine.add(wall(1.5, 0.0, 1.5, 4.0)).unwrap();
    let player = share(KineticBody::new(Rect::new(0.0, 1.0, 2.0, 2.0)));
    engine.add(player.clone()).unwrap();

    engine.update(16);

    assert_eq!(engine.last_tick().static_hits, 2);
    assert!(engine.last_tick().resolutions >= 1);
    assert_relative_eq!(player.lock().bounds.top(), 1.0);
}

#[test]
fn kinetic_locked_during_tick_is_skipped() {
    let mut engine = CollisionEngine::default();
    engine.add(wall(1.0, 0.0, 2.0, 2.0)).unwrap();
    let player = share(KineticBody::new(Rect::new(0.0, 0.0, 2.0, 2.0)));
    engine.add(player.clone()).unwrap();

    {
        let _held = player.lock();
        engine.update(16);
    }

    assert_eq!(engine.last_tick().skipped_busy, 1);
    assert_eq!(player.lock().bounds, Rect::new(0.0, 0.0, 2.0, 2.0));
}

#[test]
fn falling_body_lands_on_floor_tiles() {
    let mut engine = CollisionEngine::builder().separation_factor(1.1).build();
    for column in 0..8 {
        engine
            .add(wall(column as f32 * 16.0, 64.0, 16.0, 16.0))
            .unwrap();
    }
    let player = share(
        KineticBody::new(Rect::new(20.0, 40.0, 12.0, 20.0)).with_velocity(Vec2::new(0.0, 120.0)),
    );
    engine.add(player.clone()).unwrap();

    for _ in 0..30 {
        player.lock().integrate(16);
        engine.update(16);
        let bounds = player.lock().bounds;
        assert!(bounds.bottom() <= 64.0 + 1e-3, "sank into floor: {bounds:?}");
    }
    assert_eq!(engine.ticks(), 30);
    assert_eq!(engine.simulated_ms(), 480);
}
