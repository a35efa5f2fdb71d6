//! Per-frame simulation step
//!
//! Phases run in a fixed order and each completes for every entity before the
//! next begins: platform solver, entity update, spawn/expiry, projectile
//! collisions.

use super::collision::{CollisionReport, resolve_projectiles};
use super::entity::{InputState, Shot, UpdateContext};
use super::platform::solve_platforms;
use super::state::{Collection, World};
use crate::assets::{Assets, ImageId};
use crate::settings::Settings;

/// Callback that turns a shot request into a projectile
pub type ShootFn = Box<dyn FnMut(&mut World, &Assets, &Shot)>;

/// Default shoot callback: spawn a bullet into the render and projectile sets
pub fn bullet_spawner(image: ImageId, settings: &Settings) -> ShootFn {
    let speed = settings.bullet_speed;
    let lifetime = settings.bullet_lifetime;
    Box::new(move |world: &mut World, assets: &Assets, shot: &Shot| {
        let id = world.spawn_bullet(shot, assets, image, speed, lifetime);
        log::trace!("Bullet {:?} fired by {:?}", id, shot.source);
    })
}

/// Summary of one simulation step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub shots: usize,
    pub expired: usize,
    pub collisions: CollisionReport,
}

/// Advance the world by `dt` seconds
pub fn tick(world: &mut World, assets: &Assets, input: &InputState, dt: f32, shoot: &mut ShootFn) -> TickReport {
    solve_platforms(world);

    let shots = update_entities(world, input, dt);
    for shot in &shots {
        shoot(world, assets, shot);
    }

    let expired = expire_projectiles(world);
    let collisions = resolve_projectiles(world, assets);

    TickReport {
        shots: shots.len(),
        expired,
        collisions,
    }
}

/// Update every render-set entity; shots are collected, not spawned
pub fn update_entities(world: &mut World, input: &InputState, dt: f32) -> Vec<Shot> {
    let obstacles = world.obstacle_rects();
    let player_id = world.player_id();
    let order = world.members(Collection::Render).to_vec();
    let mut shots = Vec::new();

    for id in order {
        // Enemies see the player as already moved this frame
        let ctx = UpdateContext {
            input: if Some(id) == player_id { *input } else { InputState::default() },
            player_rect: world.player_rect(),
            obstacles: &obstacles,
        };
        let Some(entity) = world.get_mut(id) else {
            continue;
        };
        if let Some(shot) = entity.update(dt, &ctx) {
            shots.push(shot);
        }
    }
    shots
}

/// Destroy bullets that outlived their lifetime
pub fn expire_projectiles(world: &mut World) -> usize {
    let expired: Vec<_> = world
        .members(Collection::Projectile)
        .iter()
        .filter(|id| world.get(**id).is_some_and(|e| e.is_expired()))
        .copied()
        .collect();
    world.destroy_all(expired)
}
