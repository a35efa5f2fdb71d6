//! World state: entity storage plus the typed collections that drive each pass
//!
//! An entity takes part in a pass only if it was explicitly registered in that
//! pass's collection. Collections keep insertion order; removal goes through
//! [`World::destroy`] so an entity leaves every collection at once.

use std::collections::BTreeMap;

use glam::IVec2;

use super::entity::{Entity, EntityId, Shot};
use super::rect::Rect;
use crate::assets::{Assets, ImageId};

/// The collections an entity can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Drawn (and updated) every frame
    Render,
    /// Static or moving obstacles
    Collision,
    /// Constrained by the platform solver
    Platform,
    Projectile,
    /// Can be damaged by projectiles
    Vulnerable,
}

/// Complete simulation state
#[derive(Debug, Default)]
pub struct World {
    pub(crate) entities: BTreeMap<EntityId, Entity>,
    pub(crate) render: Vec<EntityId>,
    pub(crate) collision: Vec<EntityId>,
    pub(crate) platforms: Vec<EntityId>,
    pub(crate) projectiles: Vec<EntityId>,
    pub(crate) vulnerable: Vec<EntityId>,
    /// Immutable platform travel limits
    pub(crate) borders: Vec<Rect>,
    player: Option<EntityId>,
    /// Map size in pixels
    map_size: IVec2,
    next_id: u32,
}

impl World {
    pub fn new(map_size: IVec2) -> Self {
        Self {
            map_size,
            next_id: 1,
            ..Default::default()
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Build an entity with a fresh ID and register it in `sets`
    pub fn spawn(&mut self, make: impl FnOnce(EntityId) -> Entity, sets: &[Collection]) -> EntityId {
        let id = self.next_entity_id();
        self.entities.insert(id, make(id));
        for set in sets {
            let members = self.members_mut(*set);
            if !members.contains(&id) {
                members.push(id);
            }
        }
        id
    }

    /// Remove an entity from storage and from every collection.
    /// Returns the removed entity, or `None` if it was already gone.
    pub fn destroy(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        for set in [
            Collection::Render,
            Collection::Collision,
            Collection::Platform,
            Collection::Projectile,
            Collection::Vulnerable,
        ] {
            self.members_mut(set).retain(|m| *m != id);
        }
        Some(entity)
    }

    /// Destroy every listed entity; already-removed IDs are skipped
    pub fn destroy_all(&mut self, ids: impl IntoIterator<Item = EntityId>) -> usize {
        ids.into_iter().filter(|id| self.destroy(*id).is_some()).count()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Members of a collection, in insertion order
    pub fn members(&self, set: Collection) -> &[EntityId] {
        match set {
            Collection::Render => &self.render,
            Collection::Collision => &self.collision,
            Collection::Platform => &self.platforms,
            Collection::Projectile => &self.projectiles,
            Collection::Vulnerable => &self.vulnerable,
        }
    }

    fn members_mut(&mut self, set: Collection) -> &mut Vec<EntityId> {
        match set {
            Collection::Render => &mut self.render,
            Collection::Collision => &mut self.collision,
            Collection::Platform => &mut self.platforms,
            Collection::Projectile => &mut self.projectiles,
            Collection::Vulnerable => &mut self.vulnerable,
        }
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn add_border(&mut self, border: Rect) {
        self.borders.push(border);
    }

    pub fn borders(&self) -> &[Rect] {
        &self.borders
    }

    pub fn set_player(&mut self, id: EntityId) {
        self.player = Some(id);
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.get(id))
    }

    pub fn player_rect(&self) -> Option<Rect> {
        self.player().map(Entity::rect)
    }

    /// Map size in pixels
    pub fn map_size(&self) -> IVec2 {
        self.map_size
    }

    /// Boxes of every collision-set member, in insertion order
    pub fn obstacle_rects(&self) -> Vec<Rect> {
        self.collision
            .iter()
            .filter_map(|id| self.get(*id))
            .map(Entity::rect)
            .collect()
    }

    /// Spawn a bullet for `shot` into the render and projectile sets
    pub fn spawn_bullet(&mut self, shot: &Shot, assets: &Assets, image: ImageId, speed: f32, lifetime: f32) -> EntityId {
        let size = assets.get(image).map_or(IVec2::ONE, |img| img.size());
        self.spawn(
            |id| Entity::bullet(id, shot, size, image, speed, lifetime),
            &[Collection::Render, Collection::Projectile],
        )
    }
}
