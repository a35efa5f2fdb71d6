//! Layered rendering
//!
//! Draw order every frame: parallax sky, entities by depth, overlay.
//! Everything is offset by a camera centred on the player.

pub mod camera;
pub mod draw;
pub mod framebuffer;
pub mod sky;

pub use camera::Camera;
pub use draw::{DrawCommand, depth_order, draw_entities, draw_overlay};
pub use framebuffer::{FrameBuffer, Rgba};
pub use sky::{Sky, sky_count};

use crate::assets::{Assets, ImageId};
use crate::level::LevelError;
use crate::settings::Settings;
use crate::sim::World;

/// Image names the renderer needs beyond the level's own
pub const BG_SKY_IMAGE: &str = "bg_sky";
pub const FG_SKY_IMAGE: &str = "fg_sky";
pub const HEART_IMAGE: &str = "heart";

pub struct Renderer {
    pub camera: Camera,
    pub sky: Sky,
    pub heart: ImageId,
    commands: Vec<DrawCommand>,
}

impl Renderer {
    /// Set up the camera and sky for a map `map_width` pixels wide
    pub fn new(assets: &Assets, settings: &Settings, map_width: i32) -> Result<Self, LevelError> {
        let lookup = |name: &str| assets.id(name).ok_or_else(|| LevelError::UnknownImage(name.to_string()));
        let bg = lookup(BG_SKY_IMAGE)?;
        let fg = lookup(FG_SKY_IMAGE)?;
        let heart = lookup(HEART_IMAGE)?;
        let tile_width = assets.get(bg).map_or(0, |img| img.width());

        let mut sky = Sky::new(bg, fg, tile_width, map_width, settings.window_width as i32);
        sky.horizon_y = settings.sky_horizon_y;
        sky.bg_parallax = settings.bg_parallax;
        sky.fg_parallax = settings.fg_parallax;
        log::debug!("Sky: {} tiles of {}px", sky.count, tile_width);

        Ok(Self {
            camera: Camera::new(settings.viewport()),
            sky,
            heart,
            commands: Vec::new(),
        })
    }

    /// Build this frame's draw list from the world's current positions
    pub fn build(&mut self, world: &World, assets: &Assets) -> &[DrawCommand] {
        self.commands.clear();
        if let Some(player_box) = world.player_rect() {
            self.camera.compute_offset(player_box);
        }
        let offset = self.camera.offset;

        self.sky.draw(offset, &mut self.commands);
        draw_entities(world, assets, offset, &mut self.commands);
        let health = world.player().and_then(|p| p.actor()).map_or(0, |a| a.health);
        draw_overlay(health, self.heart, assets, &mut self.commands);

        &self.commands
    }

    /// Draw the frame into `target` (which the caller has already cleared)
    pub fn render(&mut self, world: &World, assets: &Assets, target: &mut FrameBuffer) {
        self.build(world, assets);
        target.execute(&self.commands, assets);
    }
}
