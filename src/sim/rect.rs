//! Integer pixel rectangles
//!
//! Every collision test and draw placement works on these. Continuous positions
//! live on the entity; a `Rect` is always derived from them, never the reverse.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect of `size` with its top-left at `pos` rounded to the nearest pixel
    pub fn at_top_left(pos: Vec2, size: IVec2) -> Self {
        let p = pos.round().as_ivec2();
        Self::new(p.x, p.y, size.x, size.y)
    }

    /// Rect of `size` with its centre at `pos` rounded to the nearest pixel
    pub fn at_center(pos: Vec2, size: IVec2) -> Self {
        let mut rect = Self::new(0, 0, size.x, size.y);
        rect.set_center(pos.round().as_ivec2());
        rect
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.w, self.h)
    }

    #[inline]
    pub fn top_left(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Centre with integer division, matching where a sprite of this size is blitted
    #[inline]
    pub fn center(&self) -> IVec2 {
        IVec2::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    #[inline]
    pub fn mid_bottom(&self) -> IVec2 {
        IVec2::new(self.x + self.w / 2, self.bottom())
    }

    pub fn set_top(&mut self, top: i32) {
        self.y = top;
    }

    pub fn set_bottom(&mut self, bottom: i32) {
        self.y = bottom - self.h;
    }

    pub fn set_left(&mut self, left: i32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: i32) {
        self.x = right - self.w;
    }

    pub fn set_center(&mut self, center: IVec2) {
        self.x = center.x - self.w / 2;
        self.y = center.y - self.h / 2;
    }

    /// True for rects with no area; they never collide with anything
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Strict overlap test: touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Overlapping region, if any
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Half-open point containment (right and bottom edges excluded)
    pub fn contains_point(&self, p: IVec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn translated(&self, by: IVec2) -> Rect {
        Rect::new(self.x + by.x, self.y + by.y, self.w, self.h)
    }
}
