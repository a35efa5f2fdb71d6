//! Draw list generation
//!
//! Rendering is split in two: this module turns world state into a list of
//! blits in screen space, the framebuffer executes them.

use glam::{IVec2, Vec2};

use crate::assets::{Assets, ImageId};
use crate::sim::{Collection, EntityId, World};

/// One image blit in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub image: ImageId,
    /// Top-left corner on screen
    pub pos: IVec2,
    pub flip_x: bool,
    /// Entity this blit belongs to, if any
    pub entity: Option<EntityId>,
}

/// Render-set members ordered by depth. The sort is stable, so equal depths
/// keep their insertion order.
pub fn depth_order(world: &World) -> Vec<EntityId> {
    let mut order: Vec<_> = world
        .members(Collection::Render)
        .iter()
        .filter_map(|id| world.get(*id).map(|e| (*id, e.depth())))
        .collect();
    order.sort_by_key(|(_, depth)| *depth);
    order.into_iter().map(|(id, _)| id).collect()
}

/// Blits for every renderable entity, centred on its box minus the offset
pub fn draw_entities(world: &World, assets: &Assets, offset: Vec2, out: &mut Vec<DrawCommand>) {
    let offset = offset.round().as_ivec2();
    for id in depth_order(world) {
        let Some(entity) = world.get(id) else {
            continue;
        };
        let Some(image) = assets.get(entity.image) else {
            continue;
        };
        let center = entity.rect().center() - offset;
        out.push(DrawCommand {
            image: entity.image,
            pos: center - image.size() / 2,
            flip_x: entity.flip_x,
            entity: Some(id),
        });
    }
}

/// Health overlay: one heart per remaining hit point, top-left of the screen
pub fn draw_overlay(health: i32, heart: ImageId, assets: &Assets, out: &mut Vec<DrawCommand>) {
    let Some(image) = assets.get(heart) else {
        return;
    };
    for i in 0..health.max(0) {
        out.push(DrawCommand {
            image: heart,
            pos: IVec2::new(10 + i * (image.width() + 4), 10),
            flip_x: false,
            entity: None,
        });
    }
}
