//! Per-frame simulation module
//!
//! All gameplay logic lives here. No rendering or platform dependencies:
//! - Continuous positions, derived integer boxes
//! - Explicit collection membership
//! - Stable iteration order (insertion order per collection)

pub mod collision;
pub mod entity;
pub mod mask;
pub mod platform;
pub mod rect;
pub mod state;
pub mod tick;

pub use collision::{CollisionReport, resolve_damage_hits, resolve_obstacle_hits, resolve_projectiles};
pub use entity::{Actor, Anchor, Bullet, Entity, EntityId, EntityKind, InputState, Layer, Role, Shot, UpdateContext};
pub use mask::Mask;
pub use platform::{PlatformContact, solve_platform, solve_platforms};
pub use rect::Rect;
pub use state::{Collection, World};
pub use tick::{ShootFn, TickReport, bullet_spawner, tick};
