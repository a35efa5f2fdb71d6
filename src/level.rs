//! Level data and world setup
//!
//! Level files are JSON tile/object maps. Building a world from one either
//! succeeds completely or fails with a [`LevelError`]; there is no partial world.

use std::path::Path;

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::{Assets, ImageId};
use crate::consts::TILE_SIZE;
use crate::settings::Settings;
use crate::sim::{Actor, Collection, Entity, Layer, Rect, Role, World};

/// Object layer holding actor spawn points
pub const ENTITIES_LAYER: &str = "Entities";
/// Object layer holding platforms and their borders
pub const PLATFORMS_LAYER: &str = "Platforms";

pub const PLAYER_OBJECT: &str = "Player";
pub const ENEMY_OBJECT: &str = "Enemy";
pub const PLATFORM_OBJECT: &str = "Platform";

/// Setup failures. Any of these stops the game from starting.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level has no layer named `{0}`")]
    MissingLayer(String),
    #[error("level has no `{0}` object")]
    MissingObject(String),
    #[error("image `{0}` is not loaded")]
    UnknownImage(String),
    #[error("platform at ({0}, {1}) has no image")]
    PlatformWithoutImage(f32, f32),
    #[error("malformed level data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cannot decode image {path}: {source}")]
    Image {
        path: std::path::PathBuf,
        source: image::ImageError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One tile on the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilePlacement {
    pub x: i32,
    pub y: i32,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub name: String,
    #[serde(default)]
    pub tiles: Vec<TilePlacement>,
}

/// A named object placed in pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectLayer {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

/// A complete level: map size in tiles plus its layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    /// Width in tiles
    pub width: i32,
    /// Height in tiles
    pub height: i32,
    pub tile_layers: Vec<TileLayer>,
    pub object_layers: Vec<ObjectLayer>,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn tile_layer(&self, name: &str) -> Result<&TileLayer, LevelError> {
        self.tile_layers
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| LevelError::MissingLayer(name.to_string()))
    }

    pub fn object_layer(&self, name: &str) -> Result<&ObjectLayer, LevelError> {
        self.object_layers
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| LevelError::MissingLayer(name.to_string()))
    }

    /// Map size in pixels
    pub fn pixel_size(&self) -> IVec2 {
        IVec2::new(self.width * TILE_SIZE, self.height * TILE_SIZE)
    }

    /// Procedurally generated level referencing [`Assets::placeholder`] images
    pub fn demo(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let (width, height) = (60, 14);
        let ground_row = 11;

        let tile = |x: i32, y: i32, image: &str| TilePlacement {
            x,
            y,
            image: image.to_string(),
        };

        let mut level_tiles = Vec::new();
        for x in 0..width {
            for y in ground_row..height {
                level_tiles.push(tile(x, y, "terrain"));
            }
        }
        // Left and right walls
        for y in 0..ground_row {
            level_tiles.push(tile(0, y, "terrain"));
            level_tiles.push(tile(width - 1, y, "terrain"));
        }
        // A few steps between the spawn point and the platform shaft
        for _ in 0..4 {
            let x = rng.random_range(4..18);
            level_tiles.push(tile(x, ground_row - 1, "terrain"));
        }

        let mut bg = Vec::new();
        let mut bg_detail = Vec::new();
        let mut fg_bottom = Vec::new();
        let mut fg_top = Vec::new();
        for x in 1..width - 1 {
            bg.push(tile(x, ground_row - 1, "bg"));
            if rng.random_bool(0.3) {
                bg_detail.push(tile(x, ground_row - 2, "bg_detail"));
            }
            if rng.random_bool(0.15) {
                fg_bottom.push(tile(x, ground_row, "fg_detail"));
            }
            if rng.random_bool(0.1) {
                fg_top.push(tile(x, ground_row - 1, "fg_detail"));
            }
        }

        let object = |name: &str, x: f32, y: f32| MapObject {
            name: name.to_string(),
            x,
            y,
            width: 0.0,
            height: 0.0,
            image: None,
        };

        let ground_y = (ground_row * TILE_SIZE) as f32;
        let mut entities = vec![object(PLAYER_OBJECT, 128.0, ground_y - 88.0)];
        for _ in 0..rng.random_range(3..6) {
            let x = rng.random_range(26..width - 2) * TILE_SIZE;
            entities.push(object(ENEMY_OBJECT, x as f32, ground_y - 88.0));
        }

        let shaft_x = (20 * TILE_SIZE) as f32;
        let platforms = vec![
            MapObject {
                image: Some("platform".to_string()),
                ..object(PLATFORM_OBJECT, shaft_x, (8 * TILE_SIZE) as f32)
            },
            MapObject {
                width: 192.0,
                height: 32.0,
                ..object("Border", shaft_x, (3 * TILE_SIZE) as f32)
            },
            MapObject {
                width: 192.0,
                height: 32.0,
                ..object("Border", shaft_x, (10 * TILE_SIZE) as f32)
            },
        ];

        Self {
            width,
            height,
            tile_layers: vec![
                TileLayer {
                    name: Layer::Level.name().to_string(),
                    tiles: level_tiles,
                },
                TileLayer {
                    name: Layer::Bg.name().to_string(),
                    tiles: bg,
                },
                TileLayer {
                    name: Layer::BgDetail.name().to_string(),
                    tiles: bg_detail,
                },
                TileLayer {
                    name: Layer::FgDetailBottom.name().to_string(),
                    tiles: fg_bottom,
                },
                TileLayer {
                    name: Layer::FgDetailTop.name().to_string(),
                    tiles: fg_top,
                },
            ],
            object_layers: vec![
                ObjectLayer {
                    name: ENTITIES_LAYER.to_string(),
                    objects: entities,
                },
                ObjectLayer {
                    name: PLATFORMS_LAYER.to_string(),
                    objects: platforms,
                },
            ],
        }
    }
}

fn image_id(assets: &Assets, name: &str) -> Result<ImageId, LevelError> {
    assets.id(name).ok_or_else(|| LevelError::UnknownImage(name.to_string()))
}

fn image_size(assets: &Assets, id: ImageId) -> IVec2 {
    assets.get(id).map_or(IVec2::splat(TILE_SIZE), |img| img.size())
}

/// Grid coordinate to top-left pixel position
pub fn grid_to_pixel(x: i32, y: i32) -> Vec2 {
    Vec2::new((x * TILE_SIZE) as f32, (y * TILE_SIZE) as f32)
}

/// Populate a world from level data.
///
/// Terrain comes first so enemies can be settled onto the ground, then the
/// player (enemies track it), then enemies, then platforms and borders.
pub fn build_world(level: &LevelData, assets: &Assets, settings: &Settings) -> Result<World, LevelError> {
    let mut world = World::new(level.pixel_size());

    // Validate every layer up front so a bad level never half-loads
    let level_layer = level.tile_layer(Layer::Level.name())?;
    let decorative = Layer::DECORATIVE
        .iter()
        .map(|layer| level.tile_layer(layer.name()).map(|tiles| (*layer, tiles)))
        .collect::<Result<Vec<_>, _>>()?;
    let entities = level.object_layer(ENTITIES_LAYER)?;
    let platforms = level.object_layer(PLATFORMS_LAYER)?;

    for t in &level_layer.tiles {
        let image = image_id(assets, &t.image)?;
        let size = image_size(assets, image);
        world.spawn(
            |id| Entity::terrain(id, grid_to_pixel(t.x, t.y), size, image),
            &[Collection::Render, Collection::Collision],
        );
    }

    for (layer, tiles) in decorative {
        for t in &tiles.tiles {
            let image = image_id(assets, &t.image)?;
            let size = image_size(assets, image);
            world.spawn(
                |id| Entity::tile(id, grid_to_pixel(t.x, t.y), size, image, layer),
                &[Collection::Render],
            );
        }
    }

    let player_obj = entities
        .objects
        .iter()
        .find(|o| o.name == PLAYER_OBJECT)
        .ok_or_else(|| LevelError::MissingObject(PLAYER_OBJECT.to_string()))?;
    let image = image_id(assets, player_obj.image.as_deref().unwrap_or("player"))?;
    let size = image_size(assets, image);
    let actor = Actor::new(
        Role::Player,
        settings.player_health,
        settings.player_shoot_cooldown,
        settings.invulnerability,
    );
    let player = world.spawn(
        |id| Entity::new_actor(id, Vec2::new(player_obj.x, player_obj.y), size, image, actor, settings.player_speed),
        &[Collection::Render, Collection::Vulnerable],
    );
    world.set_player(player);

    let ground = world.obstacle_rects();
    for obj in entities.objects.iter().filter(|o| o.name == ENEMY_OBJECT) {
        let image = image_id(assets, obj.image.as_deref().unwrap_or("enemy"))?;
        let size = image_size(assets, image);
        let mut actor = Actor::new(
            Role::Enemy,
            settings.enemy_health,
            settings.enemy_shoot_cooldown,
            settings.invulnerability,
        );
        actor.sight_range = settings.enemy_sight_range;
        let enemy = world.spawn(
            |id| {
                let mut e = Entity::new_actor(id, Vec2::new(obj.x, obj.y), size, image, actor, 0.0);
                settle_on_ground(&mut e, &ground);
                e
            },
            &[Collection::Render, Collection::Vulnerable],
        );
        log::debug!("Enemy {:?} placed at ({}, {})", enemy, obj.x, obj.y);
    }

    for obj in &platforms.objects {
        if obj.name == PLATFORM_OBJECT {
            let name = obj
                .image
                .as_deref()
                .ok_or(LevelError::PlatformWithoutImage(obj.x, obj.y))?;
            let image = image_id(assets, name)?;
            let size = image_size(assets, image);
            world.spawn(
                |id| Entity::platform(id, Vec2::new(obj.x, obj.y), size, image, settings.platform_speed),
                &[Collection::Render, Collection::Collision, Collection::Platform],
            );
        } else {
            let border = Rect::at_top_left(Vec2::new(obj.x, obj.y), Vec2::new(obj.width, obj.height).round().as_ivec2());
            world.add_border(border);
        }
    }

    log::info!(
        "World ready: {} entities ({} render, {} collision, {} platforms, {} vulnerable, {} borders)",
        world.len(),
        world.members(Collection::Render).len(),
        world.members(Collection::Collision).len(),
        world.members(Collection::Platform).len(),
        world.members(Collection::Vulnerable).len(),
        world.borders().len(),
    );

    Ok(world)
}

/// Drop an actor onto the obstacle under its mid-bottom point, if any
fn settle_on_ground(entity: &mut Entity, ground: &[Rect]) {
    let foot = entity.rect().mid_bottom();
    if let Some(floor) = ground.iter().find(|r| r.contains_point(foot)) {
        entity.snap_bottom(floor.top());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_json() -> String {
        r#"{
            "width": 4,
            "height": 4,
            "tile_layers": [
                { "name": "Level", "tiles": [ { "x": 0, "y": 3, "image": "terrain" }, { "x": 1, "y": 3, "image": "terrain" } ] },
                { "name": "BG", "tiles": [ { "x": 0, "y": 0, "image": "bg" } ] },
                { "name": "BG Detail" },
                { "name": "FG Detail Bottom" },
                { "name": "FG Detail Top" }
            ],
            "object_layers": [
                { "name": "Entities", "objects": [
                    { "name": "Player", "x": 10, "y": 20 },
                    { "name": "Enemy", "x": 64, "y": 150 }
                ] },
                { "name": "Platforms", "objects": [
                    { "name": "Platform", "x": 128, "y": 64, "image": "platform" },
                    { "name": "Border", "x": 128, "y": 0, "width": 192, "height": 32 }
                ] }
            ]
        }"#
        .to_string()
    }

    #[test]
    fn test_build_minimal_level() {
        let level = LevelData::from_json(&minimal_json()).unwrap();
        let assets = Assets::placeholder();
        let world = build_world(&level, &assets, &Settings::default()).unwrap();

        // 2 terrain + 1 bg + player + enemy + platform
        assert_eq!(world.len(), 6);
        assert_eq!(world.members(Collection::Collision).len(), 3);
        assert_eq!(world.members(Collection::Platform).len(), 1);
        assert_eq!(world.members(Collection::Vulnerable).len(), 2);
        assert_eq!(world.borders(), &[Rect::new(128, 0, 192, 32)]);
        assert_eq!(world.map_size(), IVec2::new(256, 256));

        let player = world.player().unwrap();
        assert_eq!(player.rect().top_left(), IVec2::new(10, 20));
    }

    #[test]
    fn test_tiles_placed_on_grid() {
        let level = LevelData::from_json(&minimal_json()).unwrap();
        let world = build_world(&level, &Assets::placeholder(), &Settings::default()).unwrap();
        let first = world.members(Collection::Collision)[0];
        let terrain = world.get(first).unwrap();
        assert_eq!(terrain.rect(), Rect::new(0, 192, 64, 64));
        assert_eq!(terrain.depth(), Layer::Level);
    }

    #[test]
    fn test_enemy_settles_on_ground() {
        let level = LevelData::from_json(&minimal_json()).unwrap();
        let world = build_world(&level, &Assets::placeholder(), &Settings::default()).unwrap();
        let enemy = world
            .members(Collection::Vulnerable)
            .iter()
            .filter_map(|id| world.get(*id))
            .find(|e| e.actor().is_some_and(|a| a.role == Role::Enemy))
            .unwrap();
        // mid-bottom (88, 238) lies in terrain tile x 64..128, y 192..256
        assert_eq!(enemy.rect().bottom(), 192);
    }

    #[test]
    fn test_missing_layer_is_fatal() {
        let mut level = LevelData::from_json(&minimal_json()).unwrap();
        level.object_layers.retain(|l| l.name != PLATFORMS_LAYER);
        let err = build_world(&level, &Assets::placeholder(), &Settings::default()).unwrap_err();
        assert!(matches!(err, LevelError::MissingLayer(name) if name == PLATFORMS_LAYER));
    }

    #[test]
    fn test_missing_player_is_fatal() {
        let mut level = LevelData::from_json(&minimal_json()).unwrap();
        level.object_layers[0].objects.retain(|o| o.name != PLAYER_OBJECT);
        let err = build_world(&level, &Assets::placeholder(), &Settings::default()).unwrap_err();
        assert!(matches!(err, LevelError::MissingObject(_)));
    }

    #[test]
    fn test_unknown_image_is_fatal() {
        let mut level = LevelData::from_json(&minimal_json()).unwrap();
        level.tile_layers[0].tiles[0].image = "lava".to_string();
        let err = build_world(&level, &Assets::placeholder(), &Settings::default()).unwrap_err();
        assert!(matches!(err, LevelError::UnknownImage(name) if name == "lava"));
    }

    #[test]
    fn test_platform_needs_image() {
        let mut level = LevelData::from_json(&minimal_json()).unwrap();
        level.object_layers[1].objects[0].image = None;
        let err = build_world(&level, &Assets::placeholder(), &Settings::default()).unwrap_err();
        assert!(matches!(err, LevelError::PlatformWithoutImage(..)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(LevelData::from_json("{ nope"), Err(LevelError::Parse(_))));
    }

    #[test]
    fn test_demo_level_is_deterministic_and_valid() {
        let a = LevelData::demo(7);
        let b = LevelData::demo(7);
        assert_eq!(a, b);
        let world = build_world(&a, &Assets::placeholder(), &Settings::default()).unwrap();
        assert!(world.player().is_some());
        assert_eq!(world.members(Collection::Platform).len(), 1);
        assert_eq!(world.borders().len(), 2);
    }

    #[test]
    fn test_json_round_trip_of_demo() {
        let level = LevelData::demo(3);
        let json = level.to_json().unwrap();
        assert_eq!(LevelData::from_json(&json).unwrap(), level);
    }
}
