use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world units.
///
/// `position` is the top-left corner (y grows downward, as in tile maps) and
/// `size` is the extent along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const EMPTY: Rect = Rect {
        position: Vec2::ZERO,
        size: Vec2::ZERO,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            position: min,
            size: max - min,
        }
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn min(&self) -> Vec2 {
        self.position
    }

    pub fn max(&self) -> Vec2 {
        self.position + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    pub fn area(&self) -> f32 {
        self.size.x * self.size.y
    }

    /// True when the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Finite coordinates and non-negative extent.
    pub fn is_valid(&self) -> bool {
        self.position.is_finite() && self.size.is_finite() && self.size.x >= 0.0 && self.size.y >= 0.0
    }

    /// Strict overlap: rectangles that merely share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Overlapping region of both rectangles, or [`Rect::EMPTY`] when they do not overlap.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let min = self.min().max(other.min());
        let max = self.max().min(other.max());
        if max.x > min.x && max.y > min.y {
            Rect::from_min_max(min, max)
        } else {
            Rect::EMPTY
        }
    }

    /// Smallest rectangle enclosing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_min_max(self.min().min(other.min()), self.max().max(other.max()))
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.left() <= other.left()
            && self.top() <= other.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left() && point.x < self.right() && point.y >= self.top() && point.y < self.bottom()
    }

    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect {
            position: self.position + offset,
            size: self.size,
        }
    }
}
