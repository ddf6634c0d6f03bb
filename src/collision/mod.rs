//! Collision components: the static AABB tree, the kinetic set and push-out resolution.

pub mod bvh;
pub mod kinetic;
pub mod resolution;

pub use bvh::BoundingVolumeTree;
pub use kinetic::KineticSet;
pub use resolution::{PushAxis, Resolver};
