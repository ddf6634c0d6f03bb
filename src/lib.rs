//! Tile Collision – tick-driven collision core for tile-based 2D games.
//!
//! Static level geometry is indexed in a bounding volume tree; moving
//! ("kinetic") entities are scanned every tick, fire trigger callbacks on
//! the static entities they overlap and are pushed out of solid ones along
//! the axis of least penetration. Entities are shared handles implementing
//! [`Collidable`]; the engine tracks membership and never owns them.
//!
//! ```
//! use tile_collision::*;
//!
//! let mut engine = CollisionEngine::default();
//! engine.initialize();
//!
//! let wall = share(StaticTile::solid(Rect::new(1.0, 0.0, 2.0, 2.0)));
//! let player = share(KineticBody::new(Rect::new(0.0, 0.0, 2.0, 2.0)));
//! engine.add(wall.clone()).unwrap();
//! engine.add(player.clone()).unwrap();
//!
//! engine.update(16);
//! let bounds = player.lock().boundary();
//! assert!(!bounds.intersects(&wall.lock().boundary()));
//! ```

pub mod collision;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod utils;

pub use glam::Vec2;

pub use collision::{
    bvh::BoundingVolumeTree,
    kinetic::KineticSet,
    resolution::{PushAxis, Resolver},
};
pub use config::{EngineConfig, DEFAULT_SEPARATION_FACTOR, DEFAULT_TICK_BUDGET_MS};
pub use core::{
    collidable::{same_entity, share, Collidable, EntityHandle, KineticBody, StaticTile},
    types::Rect,
};
pub use engine::{CollisionEngine, CollisionEngineBuilder, DelayedAddQueue};
pub use error::CollisionError;
pub use utils::profiling::TickProfile;
