//! Moving platform solver
//!
//! Platforms travel vertically and turn around when they run into a border
//! region or come down onto the player.

use super::entity::Entity;
use super::rect::Rect;
use super::state::World;

/// Which constraint fired for a platform this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformContact {
    pub border: bool,
    pub player: bool,
}

/// Constrain one platform against the borders and the player box.
///
/// At most one border resolves per call (first match). The player check runs
/// afterwards regardless, so its snap wins when both apply.
pub fn solve_platform(platform: &mut Entity, borders: &[Rect], player: Option<Rect>) -> PlatformContact {
    let mut contact = PlatformContact::default();

    if let Some(border) = borders.iter().find(|b| platform.rect().intersects(b)) {
        if platform.direction.y < 0.0 {
            platform.snap_top(border.bottom());
            platform.direction.y = 1.0;
        } else {
            platform.snap_bottom(border.top());
            platform.direction.y = -1.0;
        }
        contact.border = true;
    }

    if let Some(player) = player {
        let rect = platform.rect();
        if rect.intersects(&player) && player.center().y > rect.center().y {
            platform.snap_bottom(player.top());
            platform.direction.y = -1.0;
            contact.player = true;
        }
    }

    contact
}

/// Run the solver over every platform in the world
pub fn solve_platforms(world: &mut World) {
    let player = world.player_rect();
    let World {
        entities,
        platforms,
        borders,
        ..
    } = world;

    for id in platforms.iter() {
        let Some(platform) = entities.get_mut(id) else {
            continue;
        };
        let contact = solve_platform(platform, borders.as_slice(), player);
        if contact.border || contact.player {
            log::trace!(
                "Platform {:?} reversed (border={}, player={}) -> dir.y={}",
                id,
                contact.border,
                contact.player,
                platform.direction.y
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageId;
    use crate::sim::entity::EntityId;
    use crate::sim::state::Collection;
    use glam::{IVec2, Vec2};
    use proptest::prelude::*;

    fn platform_at(top: f32, dir_y: f32) -> Entity {
        let mut p = Entity::platform(EntityId(1), Vec2::new(100.0, top), IVec2::new(192, 32), ImageId(0), 200.0);
        p.direction.y = dir_y;
        p
    }

    #[test]
    fn test_upward_platform_pinned_below_border() {
        let mut p = platform_at(300.0, -1.0);
        let border = Rect::new(100, 250, 192, 60); // bottom = 310
        let contact = solve_platform(&mut p, &[border], None);
        assert!(contact.border);
        assert_eq!(p.rect().top(), 310);
        assert_eq!(p.pos.y, 310.0);
        assert_eq!(p.direction.y, 1.0);
    }

    #[test]
    fn test_downward_platform_pinned_above_border() {
        let mut p = platform_at(300.0, 1.0);
        let border = Rect::new(100, 320, 192, 32);
        solve_platform(&mut p, &[border], None);
        assert_eq!(p.rect().bottom(), 320);
        assert_eq!(p.direction.y, -1.0);
    }

    #[test]
    fn test_idle_platform_treated_as_downward() {
        let mut p = platform_at(300.0, 0.0);
        let border = Rect::new(100, 320, 192, 32);
        solve_platform(&mut p, &[border], None);
        assert_eq!(p.rect().bottom(), 320);
        assert_eq!(p.direction.y, -1.0);
    }

    #[test]
    fn test_first_border_wins() {
        let mut p = platform_at(300.0, -1.0);
        let first = Rect::new(100, 290, 50, 20); // bottom = 310
        let second = Rect::new(200, 280, 50, 40); // bottom = 320
        solve_platform(&mut p, &[first, second], None);
        assert_eq!(p.rect().top(), 310);
        assert_eq!(p.direction.y, 1.0);
    }

    #[test]
    fn test_platform_lands_on_player() {
        let mut p = platform_at(300.0, 1.0);
        let player = Rect::new(150, 320, 40, 80); // centre y 360 > platform centre 316
        let contact = solve_platform(&mut p, &[], Some(player));
        assert!(contact.player);
        assert_eq!(p.rect().bottom(), 320);
        assert_eq!(p.direction.y, -1.0);
    }

    #[test]
    fn test_player_above_platform_ignored() {
        let mut p = platform_at(300.0, -1.0);
        let player = Rect::new(150, 230, 40, 80); // centre y 270 < 316
        let contact = solve_platform(&mut p, &[], Some(player));
        assert!(!contact.player);
        assert_eq!(p.rect().top(), 300);
        assert_eq!(p.direction.y, -1.0);
    }

    #[test]
    fn test_player_check_overrides_border() {
        // Moving down into a border while the player is just under it
        let mut p = platform_at(300.0, 1.0);
        let border = Rect::new(100, 330, 192, 20); // would pin bottom to 330
        let player = Rect::new(150, 325, 40, 80);
        let contact = solve_platform(&mut p, &[border], Some(player));
        assert!(contact.border && contact.player);
        assert_eq!(p.rect().bottom(), 325);
        assert_eq!(p.direction.y, -1.0);
    }

    #[test]
    fn test_solve_platforms_over_world() {
        let mut world = World::new(IVec2::new(6400, 1280));
        world.add_border(Rect::new(0, 250, 400, 60));
        let id = world.spawn(
            |id| Entity::platform(id, Vec2::new(100.0, 300.0), IVec2::new(192, 32), ImageId(0), 200.0),
            &[Collection::Render, Collection::Collision, Collection::Platform],
        );
        solve_platforms(&mut world);
        let p = world.get(id).unwrap();
        assert_eq!(p.rect().top(), 310);
        assert_eq!(p.direction.y, 1.0);
    }

    #[test]
    fn test_empty_world_is_fine() {
        let mut world = World::new(IVec2::ZERO);
        solve_platforms(&mut world);
    }

    proptest! {
        #[test]
        fn prop_upward_hit_pins_top_to_border_bottom(top in 0i32..400, border_bottom in 1i32..500, height in 1i32..100) {
            let border = Rect::new(100, border_bottom - height, 192, height);
            let mut p = platform_at(top as f32, -1.0);
            let hit = p.rect().intersects(&border);
            solve_platform(&mut p, &[border], None);
            if hit {
                prop_assert_eq!(p.rect().top(), border_bottom);
                prop_assert_eq!(p.direction.y, 1.0);
            } else {
                prop_assert_eq!(p.rect().top(), top);
                prop_assert_eq!(p.direction.y, -1.0);
            }
        }
    }
}
