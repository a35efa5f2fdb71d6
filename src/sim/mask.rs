//! Binary opacity masks for pixel-accurate hits

use glam::IVec2;

use super::rect::Rect;

/// Alpha values above this count as opaque
pub const ALPHA_THRESHOLD: u8 = 127;

/// Per-pixel opacity bitmap, row-major
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mask {
    width: i32,
    height: i32,
    bits: Vec<bool>,
}

impl Mask {
    /// Fully transparent mask
    pub fn empty(width: i32, height: i32) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        Self {
            width,
            height,
            bits: vec![false; (width * height) as usize],
        }
    }

    /// Fully opaque mask
    pub fn filled(width: i32, height: i32) -> Self {
        let mut mask = Self::empty(width, height);
        mask.bits.fill(true);
        mask
    }

    /// Build from RGBA pixels using the alpha channel
    pub fn from_rgba(width: i32, height: i32, pixels: &[[u8; 4]]) -> Self {
        let mut mask = Self::empty(width, height);
        for (bit, px) in mask.bits.iter_mut().zip(pixels) {
            *bit = px[3] > ALPHA_THRESHOLD;
        }
        mask
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return false;
        }
        self.bits[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: i32, y: i32, opaque: bool) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        self.bits[(y * self.width + x) as usize] = opaque;
    }

    /// Number of opaque pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Mirror left-to-right
    pub fn flipped_x(&self) -> Self {
        let mut out = Self::empty(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(self.width - 1 - x, y, self.get(x, y));
            }
        }
        out
    }

    /// True if any opaque pixel of `self` placed at `pos` lands on an opaque
    /// pixel of `other` placed at `other_pos`
    pub fn overlaps(&self, pos: IVec2, other: &Mask, other_pos: IVec2) -> bool {
        let a = Rect::new(pos.x, pos.y, self.width, self.height);
        let b = Rect::new(other_pos.x, other_pos.y, other.width, other.height);
        let Some(area) = a.intersection(&b) else {
            return false;
        };

        for wy in area.top()..area.bottom() {
            for wx in area.left()..area.right() {
                if self.get(wx - pos.x, wy - pos.y) && other.get(wx - other_pos.x, wy - other_pos.y) {
                    return true;
                }
            }
        }
        false
    }
}
