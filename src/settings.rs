//! Game settings and tuning
//!
//! Loaded once at startup from an optional JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Game settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Viewport ===
    /// Viewport width in pixels
    pub window_width: u32,
    /// Viewport height in pixels
    pub window_height: u32,
    /// Frame clear colour (RGBA)
    pub clear_color: [u8; 4],

    // === Background ===
    /// Top of the sky layers before parallax
    pub sky_horizon_y: f32,
    /// Divisor applied to the camera offset for the far sky layer
    pub bg_parallax: f32,
    /// Divisor applied to the camera offset for the near sky layer
    pub fg_parallax: f32,

    // === Actors ===
    pub player_speed: f32,
    pub player_health: i32,
    pub player_shoot_cooldown: f32,
    pub enemy_health: i32,
    pub enemy_shoot_cooldown: f32,
    pub enemy_sight_range: f32,
    pub invulnerability: f32,

    // === Projectiles & platforms ===
    pub bullet_speed: f32,
    pub bullet_lifetime: f32,
    pub platform_speed: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            clear_color: CLEAR_COLOR,

            sky_horizon_y: SKY_HORIZON_Y,
            bg_parallax: BG_SKY_PARALLAX,
            fg_parallax: FG_SKY_PARALLAX,

            player_speed: PLAYER_SPEED,
            player_health: PLAYER_HEALTH,
            player_shoot_cooldown: PLAYER_SHOOT_COOLDOWN,
            enemy_health: ENEMY_HEALTH,
            enemy_shoot_cooldown: ENEMY_SHOOT_COOLDOWN,
            enemy_sight_range: ENEMY_SIGHT_RANGE,
            invulnerability: INVULNERABILITY_DURATION,

            bullet_speed: BULLET_SPEED,
            bullet_lifetime: BULLET_LIFETIME,
            platform_speed: PLATFORM_SPEED,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("No settings at {} ({e}), using defaults", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str::<Settings>(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.validate()
            }
            Err(e) => {
                log::warn!("Malformed settings in {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Replace values that would break the simulation with defaults
    pub fn validate(mut self) -> Self {
        let defaults = Self::default();
        if self.window_width == 0 || self.window_height == 0 {
            log::warn!("Viewport size must be non-zero, using defaults");
            self.window_width = defaults.window_width;
            self.window_height = defaults.window_height;
        }
        if self.window_width > MAX_VIEWPORT || self.window_height > MAX_VIEWPORT {
            log::warn!(
                "Viewport {}x{} exceeds {MAX_VIEWPORT}px, clamping",
                self.window_width,
                self.window_height
            );
            self.window_width = self.window_width.min(MAX_VIEWPORT);
            self.window_height = self.window_height.min(MAX_VIEWPORT);
        }
        if self.bg_parallax <= 0.0 {
            self.bg_parallax = defaults.bg_parallax;
        }
        if self.fg_parallax <= 0.0 {
            self.fg_parallax = defaults.fg_parallax;
        }
        self.player_health = self.player_health.max(1);
        self.enemy_health = self.enemy_health.max(1);
        self.player_shoot_cooldown = self.player_shoot_cooldown.max(0.0);
        self.enemy_shoot_cooldown = self.enemy_shoot_cooldown.max(0.0);
        self.invulnerability = self.invulnerability.max(0.0);
        self.bullet_lifetime = self.bullet_lifetime.max(0.0);
        self
    }

    /// Viewport size as a float vector
    pub fn viewport(&self) -> glam::Vec2 {
        glam::Vec2::new(self.window_width as f32, self.window_height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "window_width": 800 }"#).unwrap();
        assert_eq!(settings.window_width, 800);
        assert_eq!(settings.window_height, WINDOW_HEIGHT);
        assert_eq!(settings.bullet_speed, BULLET_SPEED);
    }

    #[test]
    fn test_validate_rejects_zero_viewport() {
        let settings = Settings {
            window_width: 0,
            bg_parallax: -1.0,
            enemy_health: 0,
            ..Default::default()
        }
        .validate();
        assert_eq!(settings.window_width, WINDOW_WIDTH);
        assert_eq!(settings.bg_parallax, BG_SKY_PARALLAX);
        assert_eq!(settings.enemy_health, 1);
    }

    #[test]
    fn test_validate_clamps_huge_viewport() {
        let settings = Settings {
            window_width: u32::MAX,
            window_height: 100_000,
            ..Default::default()
        }
        .validate();
        assert_eq!(settings.window_width, MAX_VIEWPORT);
        assert_eq!(settings.window_height, MAX_VIEWPORT);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let settings = Settings::load("/nonexistent/contra-settings.json");
        assert_eq!(settings, Settings::default());
    }
}
