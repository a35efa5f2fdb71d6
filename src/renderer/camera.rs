//! Player-centred camera

use glam::{IVec2, Vec2};

use crate::sim::Rect;

/// Camera offset recomputed from the player box every frame.
///
/// The offset is not clamped to the map; near the edges the view shows
/// whatever lies outside the tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub viewport: Vec2,
    pub offset: Vec2,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            offset: Vec2::ZERO,
        }
    }

    /// Centre the view on `player_box`; no smoothing, no lag
    pub fn compute_offset(&mut self, player_box: Rect) -> Vec2 {
        self.offset = player_box.center().as_vec2() - self.viewport / 2.0;
        self.offset
    }

    /// World pixel to screen pixel under the current offset
    pub fn to_screen(&self, world: IVec2) -> IVec2 {
        world - self.offset.round().as_ivec2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_centres_player() {
        let mut camera = Camera::new(Vec2::new(800.0, 600.0));
        let player = Rect::new(980, 460, 40, 80); // centre (1000, 500)
        assert_eq!(camera.compute_offset(player), Vec2::new(600.0, 200.0));
        assert_eq!(camera.to_screen(IVec2::new(700, 500)), IVec2::new(100, 300));
    }

    #[test]
    fn test_offset_is_not_clamped() {
        let mut camera = Camera::new(Vec2::new(1280.0, 720.0));
        let offset = camera.compute_offset(Rect::new(0, 0, 40, 80));
        assert_eq!(offset, Vec2::new(-620.0, -320.0));
    }

    #[test]
    fn test_offset_recomputed_fresh() {
        let mut camera = Camera::new(Vec2::new(800.0, 600.0));
        camera.compute_offset(Rect::new(0, 0, 40, 80));
        let offset = camera.compute_offset(Rect::new(980, 460, 40, 80));
        assert_eq!(offset, Vec2::new(600.0, 200.0));
    }
}
