//! Projectile collision resolution
//!
//! Two ordered passes: obstacles swallow any bullet whose box touches them,
//! then vulnerable entities take damage from bullets whose opaque pixels
//! overlap their own. A bullet is consumed at most once per frame.

use std::collections::BTreeSet;

use super::entity::{EntityId, EntityKind, Role};
use super::state::{Collection, World};
use crate::assets::Assets;

/// What happened during one resolver run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Bullets destroyed by obstacles
    pub blocked: usize,
    /// Bullets destroyed by hitting a vulnerable entity
    pub hits: usize,
    /// Entities whose health dropped
    pub damaged: Vec<EntityId>,
    /// Enemies removed after reaching zero health
    pub killed: Vec<EntityId>,
}

/// Destroy every bullet whose box intersects a collision-set member.
/// Returns the number of bullets destroyed.
pub fn resolve_obstacle_hits(world: &mut World) -> usize {
    let obstacles = world.members(Collection::Collision).to_vec();
    let projectiles = world.members(Collection::Projectile).to_vec();
    let mut consumed = BTreeSet::new();

    for obstacle_id in &obstacles {
        let Some(obstacle) = world.get(*obstacle_id) else {
            continue;
        };
        let obstacle_rect = obstacle.rect();
        for bullet_id in &projectiles {
            if consumed.contains(bullet_id) {
                continue;
            }
            let Some(bullet) = world.get(*bullet_id) else {
                continue;
            };
            if bullet.rect().intersects(&obstacle_rect) {
                consumed.insert(*bullet_id);
            }
        }
    }

    world.destroy_all(consumed)
}

/// Damage vulnerable entities hit by a bullet's opaque pixels and destroy
/// those bullets. Box overlap alone is not a hit.
pub fn resolve_damage_hits(world: &mut World, assets: &Assets, report: &mut CollisionReport) {
    let targets = world.members(Collection::Vulnerable).to_vec();
    let projectiles = world.members(Collection::Projectile).to_vec();
    let mut consumed = BTreeSet::new();

    for target_id in &targets {
        let Some(target) = world.get(*target_id) else {
            continue;
        };
        let Some((target_mask, target_origin)) = target.mask(assets) else {
            continue;
        };
        let target_rect = target.rect();

        let mut hit = false;
        for bullet_id in &projectiles {
            if consumed.contains(bullet_id) {
                continue;
            }
            let Some(bullet) = world.get(*bullet_id) else {
                continue;
            };
            // Cheap reject before the per-pixel test
            if !bullet.rect().intersects(&target_rect) {
                continue;
            }
            let Some((bullet_mask, bullet_origin)) = bullet.mask(assets) else {
                continue;
            };
            if target_mask.overlaps(target_origin, bullet_mask, bullet_origin) {
                consumed.insert(*bullet_id);
                hit = true;
            }
        }

        if hit && world.get_mut(*target_id).is_some_and(|t| t.damage()) {
            log::debug!("Entity {:?} damaged", target_id);
            report.damaged.push(*target_id);
        }
    }

    report.hits += world.destroy_all(consumed);
}

/// Remove enemies that have run out of health. The player is never removed.
pub fn remove_dead_enemies(world: &mut World) -> Vec<EntityId> {
    let dead: Vec<EntityId> = world
        .members(Collection::Vulnerable)
        .iter()
        .filter(|id| {
            world.get(**id).is_some_and(|e| match &e.kind {
                EntityKind::Actor(a) => a.role == Role::Enemy && !a.is_alive(),
                _ => false,
            })
        })
        .copied()
        .collect();

    for id in &dead {
        world.destroy(*id);
        log::info!("Enemy {:?} destroyed", id);
    }
    dead
}

/// Run both passes in order, then sweep dead enemies
pub fn resolve_projectiles(world: &mut World, assets: &Assets) -> CollisionReport {
    let mut report = CollisionReport {
        blocked: resolve_obstacle_hits(world),
        ..Default::default()
    };
    resolve_damage_hits(world, assets, &mut report);
    report.killed = remove_dead_enemies(world);
    report
}
