//! Contra - side-scrolling run-and-gun simulation core
//!
//! Core modules:
//! - `sim`: Per-frame simulation (entities, platform solver, projectile collisions)
//! - `renderer`: Camera, parallax sky, depth-sorted draw list and software framebuffer
//! - `level`: Level data and world setup
//! - `assets`: Image registry with precomputed opacity masks
//! - `game`: Frame loop state machine
//! - `settings`: Tunable configuration

pub mod assets;
pub mod game;
pub mod level;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use assets::{Assets, Image, ImageId};
pub use game::{Game, LoopState};
pub use level::{LevelData, LevelError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Default viewport size in pixels
    pub const WINDOW_WIDTH: u32 = 1280;
    pub const WINDOW_HEIGHT: u32 = 720;
    /// Largest accepted viewport edge
    pub const MAX_VIEWPORT: u32 = 8192;

    /// Edge length of one map tile in pixels
    pub const TILE_SIZE: i32 = 64;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 400.0;
    pub const PLAYER_HEALTH: i32 = 10;
    pub const PLAYER_SHOOT_COOLDOWN: f32 = 0.2;
    /// Horizontal distance from actor centre to the muzzle
    pub const MUZZLE_OFFSET_X: f32 = 60.0;
    pub const MUZZLE_OFFSET_Y: f32 = -16.0;

    /// Enemy defaults
    pub const ENEMY_HEALTH: i32 = 3;
    pub const ENEMY_SHOOT_COOLDOWN: f32 = 1.0;
    pub const ENEMY_SIGHT_RANGE: f32 = 600.0;
    /// Vertical slack when checking if the player is level with an enemy
    pub const ENEMY_SIGHT_SLACK: i32 = 20;

    /// Seconds an actor ignores damage after being hit
    pub const INVULNERABILITY_DURATION: f32 = 0.5;

    /// Bullet defaults
    pub const BULLET_SPEED: f32 = 1200.0;
    /// Simulated seconds before a bullet expires
    pub const BULLET_LIFETIME: f32 = 1.0;

    /// Moving platform speed (pixels/s)
    pub const PLATFORM_SPEED: f32 = 200.0;

    /// Sky layers are drawn with their top at this y before parallax
    pub const SKY_HORIZON_Y: f32 = 850.0;
    pub const BG_SKY_PARALLAX: f32 = 2.5;
    pub const FG_SKY_PARALLAX: f32 = 2.0;

    /// Frame clear colour (salmon)
    pub const CLEAR_COLOR: [u8; 4] = [249, 131, 103, 255];

    /// A frame longer than this is logged as a stall
    pub const STALL_THRESHOLD: f32 = 0.25;
}
