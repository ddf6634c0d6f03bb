//! The capability every registered entity provides to the collision core.

use std::sync::Arc;

use glam::Vec2;
use parking_lot::Mutex;

use super::types::Rect;
use crate::error::{CollisionError, Result};

/// Contract between game objects and the collision engine.
///
/// The engine reads the classification flags once, when the entity is
/// registered, and trusts them for the whole membership lifetime. It moves an
/// entity exclusively through [`Collidable::translate`].
pub trait Collidable {
    /// Current bounds; must reflect the entity's position at call time.
    fn boundary(&self) -> Rect;

    /// Moves the entity by `offset`.
    fn translate(&mut self, offset: Vec2);

    fn is_static(&self) -> bool;

    fn is_solid(&self) -> bool;

    fn is_trigger(&self) -> bool;

    /// Called on a trigger entity when `other` overlaps it.
    fn trigger(&mut self, _other: &mut dyn Collidable) {}

    /// Informational only; resolution is purely positional.
    fn velocity(&self) -> Vec2 {
        Vec2::ZERO
    }
}

/// Shared handle the engine keeps for each registered entity.
pub type EntityHandle = Arc<Mutex<dyn Collidable + Send>>;

/// Wraps an entity so it can be registered while the caller keeps a typed handle.
///
/// ```
/// use tile_collision::{share, EntityHandle, StaticTile, Rect};
///
/// let tile = share(StaticTile::solid(Rect::new(0.0, 0.0, 16.0, 16.0)));
/// let handle: EntityHandle = tile.clone();
/// let other: EntityHandle = tile;
/// assert!(tile_collision::same_entity(&handle, &other));
/// ```
pub fn share<T>(entity: T) -> Arc<Mutex<T>>
where
    T: Collidable + Send,
{
    Arc::new(Mutex::new(entity))
}

/// Identity comparison on the handle allocation, ignoring vtable metadata.
pub fn same_entity(a: &EntityHandle, b: &EntityHandle) -> bool {
    entity_key(a) == entity_key(b)
}

pub(crate) fn entity_key(handle: &EntityHandle) -> usize {
    Arc::as_ptr(handle) as *const () as usize
}

/// Reads from an entity without blocking; a held lock is reported as an invalid argument.
pub(crate) fn inspect<R>(
    handle: &EntityHandle,
    read: impl FnOnce(&(dyn Collidable + Send)) -> R,
) -> Result<R> {
    let guard = handle.try_lock().ok_or_else(|| {
        CollisionError::InvalidArgument("entity is locked elsewhere and cannot be inspected".into())
    })?;
    Ok(read(&*guard))
}

/// Immovable tile geometry: the common static case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticTile {
    pub bounds: Rect,
    pub solid: bool,
}

impl StaticTile {
    pub fn solid(bounds: Rect) -> Self {
        Self {
            bounds,
            solid: true,
        }
    }

    pub fn passable(bounds: Rect) -> Self {
        Self {
            bounds,
            solid: false,
        }
    }
}

impl Collidable for StaticTile {
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
        false
    }
}

/// A moving box with a velocity, e.g. a player or projectile hitbox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KineticBody {
    pub bounds: Rect,
    pub velocity: Vec2,
    pub solid: bool,
}

impl KineticBody {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            velocity: Vec2::ZERO,
            solid: true,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Advances the body by its velocity over `delta_ms` milliseconds.
    pub fn integrate(&mut self, delta_ms: u32) {
        let seconds = delta_ms as f32 / 1000.0;
        self.bounds = self.bounds.translated(self.velocity * seconds);
    }
}

impl Collidable for KineticBody {
    fn boundary(&self) -> Rect {
        self.bounds
    }

    fn translate(&mut self, offset: Vec2) {
        self.bounds = self.bounds.translated(offset);
    }

    fn is_static(&self) -> bool {
        false
    }

    fn is_solid(&self) -> bool {
        self.solid
    }

    fn is_trigger(&self) -> bool {
        false
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }
}
