//! Core types shared by every collision component: rectangles and the collidable capability.

pub mod collidable;
pub mod types;

pub use collidable::{same_entity, share, Collidable, EntityHandle, KineticBody, StaticTile};
pub use types::Rect;
