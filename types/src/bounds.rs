//! Screen-space rectangle math (spec §3 invariants).

use serde::{Deserialize, Serialize};

/// Screen-space rectangle in points: `(x, y, w, h)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Bounds {
    pub const ZERO: Bounds = Bounds { x: 0, y: 0, w: 0, h: 0 };

    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub const fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    /// `(cx, cy)` of the rectangle, rounded toward the origin.
    pub const fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// `ax1 < bx2 && ax2 > bx1 && ay1 < by2 && ay2 > by1`.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Width/height both strictly less than `ratio` of `container`'s,
    /// with non-zero dimensions on both sides. Used by the overlay
    /// bounds heuristic (spec §4.2).
    pub fn is_smaller_than(&self, container: &Bounds, ratio: f64) -> bool {
        if self.is_empty() || container.is_empty() {
            return false;
        }
        (self.w as f64) < (container.w as f64) * ratio || (self.h as f64) < (container.h as f64) * ratio
    }

    /// Whether `self`'s center lies within `tolerance` of `container`'s
    /// center, as a fraction of `container`'s own dimensions, on both axes.
    pub fn is_centered_in(&self, container: &Bounds, tolerance: f64) -> bool {
        if container.is_empty() {
            return false;
        }
        let (cx, cy) = self.center();
        let (wx, wy) = container.center();
        let dx = (cx - wx).unsigned_abs() as f64;
        let dy = (cy - wy).unsigned_abs() as f64;
        dx <= container.w as f64 * tolerance && dy <= container.h as f64 * tolerance
    }
}
