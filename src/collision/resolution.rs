//! Minimal-axis push-out of a kinetic box from a static one.

use glam::Vec2;

use crate::core::{collidable::Collidable, types::Rect};

/// Axis along which a kinetic box is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushAxis {
    X,
    Y,
}

/// Stateless positional resolver. The static side is never moved.
pub struct Resolver;

impl Resolver {
    /// Axis of least penetration for an overlap region. Ties go to Y.
    pub fn push_axis(overlap: &Rect) -> PushAxis {
        if overlap.width() < overlap.height() {
            PushAxis::X
        } else {
            PushAxis::Y
        }
    }

    /// Displacement that moves `kinetic` clear of `fixed`, or `None` when the
    /// boxes do not overlap with positive area.
    ///
    /// The kinetic box is pushed away from the static box's center along
    /// [`Resolver::push_axis`] by `factor` times its penetration depth in that
    /// direction. For a partial overlap the depth is the overlap extent; a box
    /// embedded in the static one on that axis needs the full distance to the
    /// far edge.
    pub fn separation(kinetic: &Rect, fixed: &Rect, factor: f32) -> Option<Vec2> {
        let overlap = kinetic.intersection(fixed);
        if overlap.is_empty() {
            return None;
        }

        let kinetic_center = kinetic.center();
        let fixed_center = fixed.center();
        let displacement = match Self::push_axis(&overlap) {
            PushAxis::X => {
                let shift = if kinetic_center.x < fixed_center.x {
                    -(kinetic.right() - fixed.left())
                } else {
                    fixed.right() - kinetic.left()
                };
                Vec2::new(shift * factor, 0.0)
            }
            PushAxis::Y => {
                let shift = if kinetic_center.y < fixed_center.y {
                    -(kinetic.bottom() - fixed.top())
                } else {
                    fixed.bottom() - kinetic.top()
                };
                Vec2::new(0.0, shift * factor)
            }
        };
        Some(displacement)
    }

    /// Reads the kinetic entity's boundary now and translates it out of `fixed`.
    ///
    /// Returns the applied displacement, if any.
    pub fn resolve(kinetic: &mut dyn Collidable, fixed: &Rect, factor: f32) -> Option<Vec2> {
        let displacement = Self::separation(&kinetic.boundary(), fixed, factor)?;
        kinetic.translate(displacement);
        Some(displacement)
    }
}
