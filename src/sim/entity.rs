//! Entities and their per-frame update step
//!
//! One struct covers every positioned object; the `kind` tag carries the
//! optional capabilities (projectile lifetime, actor health, platform motion).
//! Position is continuous and authoritative, the box is re-derived from it.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::assets::{Assets, ImageId};
use crate::consts::*;
use crate::sim::mask::Mask;

/// Render depth buckets, drawn low to high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Bg = 0,
    BgDetail = 1,
    Level = 2,
    FgDetailBottom = 3,
    FgDetailTop = 4,
}

impl Layer {
    /// Tile layers that only decorate, in draw order
    pub const DECORATIVE: [Layer; 4] = [
        Layer::Bg,
        Layer::BgDetail,
        Layer::FgDetailBottom,
        Layer::FgDetailTop,
    ];

    /// Name of the tile layer in level data
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Bg => "BG",
            Layer::BgDetail => "BG Detail",
            Layer::Level => "Level",
            Layer::FgDetailBottom => "FG Detail Bottom",
            Layer::FgDetailTop => "FG Detail Top",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "BG" => Some(Layer::Bg),
            "BG Detail" => Some(Layer::BgDetail),
            "Level" => Some(Layer::Level),
            "FG Detail Bottom" => Some(Layer::FgDetailBottom),
            "FG Detail Top" => Some(Layer::FgDetailTop),
            _ => None,
        }
    }

    #[inline]
    pub fn depth(&self) -> i32 {
        *self as i32
    }
}

/// Stable entity handle, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Which point of the box the continuous position refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    TopLeft,
    Center,
}

/// Directional and action signals for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl InputState {
    /// Per-axis intent; right beats left, up beats down
    pub fn direction(&self) -> Vec2 {
        let x = if self.right {
            1.0
        } else if self.left {
            -1.0
        } else {
            0.0
        };
        let y = if self.up {
            -1.0
        } else if self.down {
            1.0
        } else {
            0.0
        };
        Vec2::new(x, y)
    }
}

/// A request to spawn a projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub pos: Vec2,
    pub direction: Vec2,
    pub source: EntityId,
}

/// What an entity can see of the world during its update
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateContext<'a> {
    pub input: InputState,
    pub player_rect: Option<Rect>,
    /// Snapshot of collision-set boxes taken before the update phase
    pub obstacles: &'a [Rect],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Enemy,
}

/// Health, hit cooldown and weapon state shared by player and enemies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub role: Role,
    pub health: i32,
    /// Seconds of invulnerability granted per hit
    pub invulnerability: f32,
    /// Seconds of invulnerability remaining
    pub invulnerable_for: f32,
    pub shoot_cooldown: f32,
    pub cooldown_left: f32,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub sight_range: f32,
}

impl Actor {
    pub fn new(role: Role, health: i32, shoot_cooldown: f32, invulnerability: f32) -> Self {
        Self {
            role,
            health,
            invulnerability,
            invulnerable_for: 0.0,
            shoot_cooldown,
            cooldown_left: 0.0,
            facing: 1.0,
            sight_range: ENEMY_SIGHT_RANGE,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    #[inline]
    pub fn is_vulnerable(&self) -> bool {
        self.invulnerable_for <= 0.0
    }

    /// Take one hit unless still invulnerable. Returns whether health dropped.
    pub fn damage(&mut self) -> bool {
        if !self.is_vulnerable() || !self.is_alive() {
            return false;
        }
        self.health -= 1;
        self.invulnerable_for = self.invulnerability;
        true
    }

    fn tick_timers(&mut self, dt: f32) {
        self.invulnerable_for = (self.invulnerable_for - dt).max(0.0);
        self.cooldown_left = (self.cooldown_left - dt).max(0.0);
    }

    fn try_fire(&mut self) -> bool {
        if !self.is_alive() || self.cooldown_left > 0.0 {
            return false;
        }
        self.cooldown_left = self.shoot_cooldown;
        true
    }
}

/// Projectile bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Simulated seconds since spawn
    pub age: f32,
    pub lifetime: f32,
    pub source: EntityId,
}

/// Capability tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Decorative tile
    Tile,
    /// Static collision tile
    Terrain,
    /// Vertically moving platform
    Platform,
    Bullet(Bullet),
    Actor(Actor),
}

/// A positioned, renderable object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Authoritative continuous position (meaning set by `anchor`)
    pub pos: Vec2,
    /// Unit-scaled per-axis direction
    pub direction: Vec2,
    /// Pixels per second along `direction`
    pub speed: f32,
    pub image: ImageId,
    pub flip_x: bool,
    pub kind: EntityKind,
    anchor: Anchor,
    depth: Layer,
    rect: Rect,
}

impl Entity {
    fn new(
        id: EntityId,
        pos: Vec2,
        size: IVec2,
        anchor: Anchor,
        depth: Layer,
        image: ImageId,
        kind: EntityKind,
    ) -> Self {
        let mut entity = Self {
            id,
            pos,
            direction: Vec2::ZERO,
            speed: 0.0,
            image,
            flip_x: false,
            kind,
            anchor,
            depth,
            rect: Rect::new(0, 0, size.x, size.y),
        };
        entity.sync_rect();
        entity
    }

    /// Decorative tile anchored at its top-left pixel
    pub fn tile(id: EntityId, pos: Vec2, size: IVec2, image: ImageId, depth: Layer) -> Self {
        Self::new(id, pos, size, Anchor::TopLeft, depth, image, EntityKind::Tile)
    }

    /// Static collision tile
    pub fn terrain(id: EntityId, pos: Vec2, size: IVec2, image: ImageId) -> Self {
        Self::new(id, pos, size, Anchor::TopLeft, Layer::Level, image, EntityKind::Terrain)
    }

    /// Moving platform, initially heading up
    pub fn platform(id: EntityId, pos: Vec2, size: IVec2, image: ImageId, speed: f32) -> Self {
        let mut e = Self::new(id, pos, size, Anchor::TopLeft, Layer::Level, image, EntityKind::Platform);
        e.direction = Vec2::new(0.0, -1.0);
        e.speed = speed;
        e
    }

    /// Bullet centred on `pos`, mirrored when travelling left
    pub fn bullet(id: EntityId, shot: &Shot, size: IVec2, image: ImageId, speed: f32, lifetime: f32) -> Self {
        let kind = EntityKind::Bullet(Bullet {
            age: 0.0,
            lifetime,
            source: shot.source,
        });
        let mut e = Self::new(id, shot.pos, size, Anchor::Center, Layer::Level, image, kind);
        e.direction = shot.direction;
        e.speed = speed;
        e.flip_x = shot.direction.x < 0.0;
        e
    }

    /// Player or enemy anchored at its top-left
    pub fn new_actor(id: EntityId, pos: Vec2, size: IVec2, image: ImageId, actor: Actor, speed: f32) -> Self {
        let mut e = Self::new(id, pos, size, Anchor::TopLeft, Layer::Level, image, EntityKind::Actor(actor));
        e.speed = speed;
        e
    }

    /// Current bounding box, derived from `pos`
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn depth(&self) -> Layer {
        self.depth
    }

    /// Recompute the box from the continuous position
    pub fn sync_rect(&mut self) {
        let size = self.rect.size();
        self.rect = match self.anchor {
            Anchor::TopLeft => Rect::at_top_left(self.pos, size),
            Anchor::Center => Rect::at_center(self.pos, size),
        };
    }

    /// Move so the box becomes `rect`; the position follows exactly
    pub fn place_rect(&mut self, rect: Rect) {
        self.pos = match self.anchor {
            Anchor::TopLeft => rect.top_left().as_vec2(),
            Anchor::Center => rect.center().as_vec2(),
        };
        self.rect = rect;
    }

    pub fn snap_top(&mut self, top: i32) {
        let mut r = self.rect;
        r.set_top(top);
        self.place_rect(r);
    }

    pub fn snap_bottom(&mut self, bottom: i32) {
        let mut r = self.rect;
        r.set_bottom(bottom);
        self.place_rect(r);
    }

    pub fn snap_left(&mut self, left: i32) {
        let mut r = self.rect;
        r.set_left(left);
        self.place_rect(r);
    }

    pub fn snap_right(&mut self, right: i32) {
        let mut r = self.rect;
        r.set_right(right);
        self.place_rect(r);
    }

    pub fn actor(&self) -> Option<&Actor> {
        match &self.kind {
            EntityKind::Actor(a) => Some(a),
            _ => None,
        }
    }

    pub fn actor_mut(&mut self) -> Option<&mut Actor> {
        match &mut self.kind {
            EntityKind::Actor(a) => Some(a),
            _ => None,
        }
    }

    /// Bullets past their lifetime
    pub fn is_expired(&self) -> bool {
        matches!(&self.kind, EntityKind::Bullet(b) if b.age >= b.lifetime)
    }

    /// Opacity mask of the current visual and its top-left in world pixels
    pub fn mask<'a>(&self, assets: &'a Assets) -> Option<(&'a Mask, IVec2)> {
        let image = assets.get(self.image)?;
        let origin = self.rect.center() - image.size() / 2;
        Some((image.mask(self.flip_x), origin))
    }

    /// Take a hit if this entity can be damaged
    pub fn damage(&mut self) -> bool {
        match self.actor_mut() {
            Some(actor) => actor.damage(),
            None => false,
        }
    }

    /// Advance by `dt` seconds. A zero step changes nothing.
    pub fn update(&mut self, dt: f32, ctx: &UpdateContext) -> Option<Shot> {
        if dt == 0.0 {
            return None;
        }

        match &self.kind {
            EntityKind::Tile | EntityKind::Terrain => None,
            EntityKind::Platform => {
                self.translate(dt);
                None
            }
            EntityKind::Bullet(_) => {
                self.translate(dt);
                if let EntityKind::Bullet(bullet) = &mut self.kind {
                    bullet.age += dt;
                }
                None
            }
            EntityKind::Actor(actor) => match actor.role {
                Role::Player => self.update_player(dt, ctx),
                Role::Enemy => self.update_enemy(dt, ctx),
            },
        }
    }

    fn translate(&mut self, dt: f32) {
        self.pos += self.direction * self.speed * dt;
        self.sync_rect();
    }

    fn update_player(&mut self, dt: f32, ctx: &UpdateContext) -> Option<Shot> {
        let alive = self.actor().is_some_and(Actor::is_alive);
        let direction = if alive { ctx.input.direction() } else { Vec2::ZERO };
        self.direction = direction;

        if let Some(actor) = self.actor_mut() {
            actor.tick_timers(dt);
            if direction.x != 0.0 {
                actor.facing = direction.x.signum();
            }
        }
        self.flip_x = self.facing() < 0.0;

        // Axis-separated so sliding along walls keeps the free axis
        let before = self.rect;
        self.pos.x += self.direction.x * self.speed * dt;
        self.sync_rect();
        self.resolve_horizontal(before, ctx.obstacles);

        let before = self.rect;
        self.pos.y += self.direction.y * self.speed * dt;
        self.sync_rect();
        self.resolve_vertical(before, ctx.obstacles);

        if ctx.input.fire { self.fire() } else { None }
    }

    fn update_enemy(&mut self, dt: f32, ctx: &UpdateContext) -> Option<Shot> {
        let center = self.rect.center();
        let rect = self.rect;

        let actor = self.actor_mut()?;
        actor.tick_timers(dt);
        let player = ctx.player_rect?;
        let target = player.center();

        if target.x != center.x {
            actor.facing = (target.x - center.x).signum() as f32;
        }
        let in_range = ((target.x - center.x) as f32).abs() < actor.sight_range;
        let level_with = rect.top() - ENEMY_SIGHT_SLACK < target.y && target.y < rect.bottom() + ENEMY_SIGHT_SLACK;
        self.flip_x = self.facing() < 0.0;

        if in_range && level_with { self.fire() } else { None }
    }

    fn facing(&self) -> f32 {
        self.actor().map_or(1.0, |a| a.facing)
    }

    fn fire(&mut self) -> Option<Shot> {
        let facing = self.facing();
        let center = self.rect.center().as_vec2();
        let id = self.id;
        if !self.actor_mut()?.try_fire() {
            return None;
        }
        Some(Shot {
            pos: center + Vec2::new(facing * MUZZLE_OFFSET_X, MUZZLE_OFFSET_Y),
            direction: Vec2::new(facing, 0.0),
            source: id,
        })
    }

    /// Push out of obstacles entered by the horizontal step. Obstacles that
    /// already overlapped `before` were not hit along this axis.
    fn resolve_horizontal(&mut self, before: Rect, obstacles: &[Rect]) {
        for obstacle in obstacles {
            if !self.rect.intersects(obstacle) || before.intersects(obstacle) {
                continue;
            }
            if self.direction.x > 0.0 {
                self.snap_right(obstacle.left());
            } else if self.direction.x < 0.0 {
                self.snap_left(obstacle.right());
            }
        }
    }

    fn resolve_vertical(&mut self, before: Rect, obstacles: &[Rect]) {
        for obstacle in obstacles {
            if !self.rect.intersects(obstacle) || before.intersects(obstacle) {
                continue;
            }
            if self.direction.y > 0.0 {
                self.snap_bottom(obstacle.top());
            } else if self.direction.y < 0.0 {
                self.snap_top(obstacle.bottom());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const IMG: ImageId = ImageId(0);

    fn player_at(pos: Vec2) -> Entity {
        let actor = Actor::new(Role::Player, 10, 0.2, 0.5);
        Entity::new_actor(EntityId(1), pos, IVec2::new(40, 80), IMG, actor, 400.0)
    }

    #[test]
    fn test_input_priority() {
        let input = InputState {
            left: true,
            right: true,
            up: true,
            down: true,
            fire: false,
        };
        assert_eq!(input.direction(), Vec2::new(1.0, -1.0));
        assert_eq!(InputState::default().direction(), Vec2::ZERO);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut player = player_at(Vec2::new(10.3, 20.7));
        let before = player.clone();
        let ctx = UpdateContext {
            input: InputState {
                right: true,
                fire: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(player.update(0.0, &ctx).is_none());
        assert_eq!(player, before);
    }

    #[test]
    fn test_platform_translation_is_linear() {
        let mut a = Entity::platform(EntityId(1), Vec2::new(0.0, 500.0), IVec2::new(192, 32), IMG, 200.0);
        let mut b = a.clone();
        let ctx = UpdateContext::default();
        a.update(0.5, &ctx);
        b.update(0.25, &ctx);
        b.update(0.25, &ctx);
        assert_eq!(a.pos, Vec2::new(0.0, 400.0));
        assert!((a.pos - b.pos).length() < 1e-4);
        assert_eq!(a.rect().top(), 400);
    }

    #[test]
    fn test_large_dt_produces_large_step() {
        let mut bullet = Entity::bullet(
            EntityId(2),
            &Shot {
                pos: Vec2::ZERO,
                direction: Vec2::X,
                source: EntityId(1),
            },
            IVec2::new(12, 6),
            IMG,
            1200.0,
            1.0,
        );
        bullet.update(5.0, &UpdateContext::default());
        assert_eq!(bullet.pos.x, 6000.0);
        assert!(bullet.is_expired());
    }

    #[test]
    fn test_bullet_flipped_when_travelling_left() {
        let shot = Shot {
            pos: Vec2::new(100.0, 100.0),
            direction: Vec2::NEG_X,
            source: EntityId(1),
        };
        let bullet = Entity::bullet(EntityId(2), &shot, IVec2::new(12, 6), IMG, 1200.0, 1.0);
        assert!(bullet.flip_x);
        assert_eq!(bullet.rect().center(), IVec2::new(100, 100));
    }

    #[test]
    fn test_player_blocked_by_obstacle() {
        let mut player = player_at(Vec2::new(0.0, 0.0));
        let wall = [Rect::new(45, 0, 64, 64)];
        let ctx = UpdateContext {
            input: InputState {
                right: true,
                ..Default::default()
            },
            player_rect: None,
            obstacles: &wall,
        };
        player.update(0.1, &ctx);
        assert_eq!(player.rect().right(), 45);
        assert_eq!(player.pos.x, 5.0);
    }

    #[test]
    fn test_overlap_from_other_axis_does_not_push_sideways() {
        // A platform rose 10px into the player's feet before this step
        let mut player = player_at(Vec2::new(1000.0, 300.0));
        let platform = [Rect::new(960, 370, 192, 32)];
        assert!(player.rect().intersects(&platform[0]));
        let ctx = UpdateContext {
            input: InputState {
                right: true,
                ..Default::default()
            },
            player_rect: None,
            obstacles: &platform,
        };
        player.update(0.016, &ctx);
        assert!((player.pos.x - 1006.4).abs() < 1e-3);
        assert_eq!(player.rect().left(), 1006);
        assert_eq!(player.rect().top(), 300);
    }

    #[test]
    fn test_player_fire_respects_cooldown() {
        let mut player = player_at(Vec2::ZERO);
        let ctx = UpdateContext {
            input: InputState {
                fire: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let shot = player.update(0.016, &ctx).expect("first shot");
        assert_eq!(shot.direction, Vec2::X);
        assert_eq!(shot.source, EntityId(1));
        assert!(player.update(0.016, &ctx).is_none());
        assert!(player.update(0.3, &ctx).is_some());
    }

    #[test]
    fn test_damage_cooldown() {
        let mut player = player_at(Vec2::ZERO);
        assert!(player.damage());
        assert!(!player.damage());
        player.update(0.6, &UpdateContext::default());
        assert!(player.damage());
        assert_eq!(player.actor().unwrap().health, 8);
    }

    #[test]
    fn test_tiles_cannot_be_damaged() {
        let mut tile = Entity::terrain(EntityId(3), Vec2::ZERO, IVec2::splat(64), IMG);
        assert!(!tile.damage());
    }

    #[test]
    fn test_enemy_faces_and_fires_at_level_player() {
        let actor = Actor::new(Role::Enemy, 3, 1.0, 0.5);
        let mut enemy = Entity::new_actor(EntityId(5), Vec2::new(500.0, 100.0), IVec2::new(40, 80), IMG, actor, 0.0);
        let ctx = UpdateContext {
            player_rect: Some(Rect::new(100, 100, 40, 80)),
            ..Default::default()
        };
        let shot = enemy.update(0.016, &ctx).expect("enemy shoots");
        assert_eq!(shot.direction, Vec2::NEG_X);
        assert!(enemy.flip_x);

        // Player far above: no shot even once the cooldown has elapsed
        let ctx = UpdateContext {
            player_rect: Some(Rect::new(100, -400, 40, 80)),
            ..Default::default()
        };
        assert!(enemy.update(2.0, &ctx).is_none());
    }

    proptest! {
        #[test]
        fn prop_rect_tracks_position(x in -2000.0f32..2000.0, y in -2000.0f32..2000.0, dt in 0.0f32..0.1) {
            let mut p = Entity::platform(EntityId(1), Vec2::new(x, y), IVec2::new(192, 32), IMG, 200.0);
            p.update(dt, &UpdateContext::default());
            prop_assert_eq!(p.rect(), Rect::at_top_left(p.pos, IVec2::new(192, 32)));
        }
    }
}
