//! Two-layer parallax sky

use glam::{IVec2, Vec2};

use super::draw::DrawCommand;
use crate::assets::ImageId;

/// Horizontal sky tiles needed to cover the map plus one viewport, rounded up
pub fn sky_count(map_width: i32, viewport_width: i32, tile_width: i32) -> usize {
    if tile_width <= 0 {
        return 0;
    }
    let span = (map_width + viewport_width).max(0);
    ((span + tile_width - 1) / tile_width) as usize
}

/// Background sky (far layer) and foreground sky (near layer)
#[derive(Debug, Clone, PartialEq)]
pub struct Sky {
    pub bg: ImageId,
    pub fg: ImageId,
    pub tile_width: i32,
    /// Tiles per layer, fixed at setup
    pub count: usize,
    /// First tile starts this far left of the map origin
    pub padding: f32,
    pub horizon_y: f32,
    pub bg_parallax: f32,
    pub fg_parallax: f32,
}

impl Sky {
    pub fn new(bg: ImageId, fg: ImageId, tile_width: i32, map_width: i32, viewport_width: i32) -> Self {
        Self {
            bg,
            fg,
            tile_width,
            count: sky_count(map_width, viewport_width, tile_width),
            padding: viewport_width as f32 / 2.0,
            horizon_y: crate::consts::SKY_HORIZON_Y,
            bg_parallax: crate::consts::BG_SKY_PARALLAX,
            fg_parallax: crate::consts::FG_SKY_PARALLAX,
        }
    }

    /// Blits for both layers; each tile draws its far copy then its near copy
    pub fn draw(&self, offset: Vec2, out: &mut Vec<DrawCommand>) {
        let bg_shift = offset / self.bg_parallax;
        let fg_shift = offset / self.fg_parallax;

        for i in 0..self.count {
            let x = -self.padding + (i as i32 * self.tile_width) as f32;
            let base = Vec2::new(x, self.horizon_y);
            out.push(Self::blit(self.bg, base - bg_shift));
            out.push(Self::blit(self.fg, base - fg_shift));
        }
    }

    fn blit(image: ImageId, pos: Vec2) -> DrawCommand {
        DrawCommand {
            image,
            pos: IVec2::new(pos.x.round() as i32, pos.y.round() as i32),
            flip_x: false,
            entity: None,
        }
    }
}
