//! Frame loop
//!
//! One thread, one world. Each running tick: poll events, measure `dt`, clear
//! the frame, simulate, draw, present. The loop only stops on an explicit quit.

use std::time::Instant;

use crate::assets::Assets;
use crate::consts::STALL_THRESHOLD;
use crate::level::{LevelData, LevelError, build_world};
use crate::renderer::{FrameBuffer, Renderer};
use crate::settings::Settings;
use crate::sim::{InputState, ShootFn, TickReport, World, bullet_spawner, tick};

/// Loop state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Terminal
    Quitting,
}

/// Everything the host reports for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameEvents {
    pub quit: bool,
    pub input: InputState,
}

/// Source of per-frame input and quit signals
pub trait EventSource {
    fn poll(&mut self) -> FrameEvents;
}

/// Source of elapsed time between ticks
pub trait Clock {
    /// Seconds since the previous call
    fn tick(&mut self) -> f32;
}

/// Wall-clock time; `dt` is neither capped nor smoothed
#[derive(Debug)]
pub struct WallClock {
    last: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self { last: Instant::now() }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

/// Constant step, for tests and headless runs
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub f32);

impl Clock for FixedClock {
    fn tick(&mut self) -> f32 {
        self.0
    }
}

/// Game instance holding all state
pub struct Game {
    pub world: World,
    pub assets: Assets,
    pub settings: Settings,
    pub renderer: Renderer,
    pub frame: FrameBuffer,
    state: LoopState,
    shoot: ShootFn,
    frames: u64,
}

impl Game {
    /// Build the world and renderer. Any missing layer, object or image is fatal.
    pub fn new(level: &LevelData, assets: Assets, settings: Settings) -> Result<Self, LevelError> {
        let world = build_world(level, &assets, &settings)?;
        let renderer = Renderer::new(&assets, &settings, level.pixel_size().x)?;
        let bullet = assets
            .id("bullet")
            .ok_or_else(|| LevelError::UnknownImage("bullet".to_string()))?;
        let shoot = bullet_spawner(bullet, &settings);
        let frame = FrameBuffer::new(settings.window_width, settings.window_height);

        Ok(Self {
            world,
            assets,
            settings,
            renderer,
            frame,
            state: LoopState::Running,
            shoot,
            frames: 0,
        })
    }

    /// Replace the shoot callback (graphics/sound hooks live in the host)
    pub fn set_shoot(&mut self, shoot: ShootFn) {
        self.shoot = shoot;
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames simulated so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one frame. A quit event ends the loop before anything is simulated.
    pub fn frame(&mut self, events: FrameEvents, dt: f32) -> Option<TickReport> {
        if self.state == LoopState::Quitting {
            return None;
        }
        if events.quit {
            log::info!("Quit requested after {} frames", self.frames);
            self.state = LoopState::Quitting;
            return None;
        }
        if dt > STALL_THRESHOLD {
            log::warn!("Long frame: dt = {dt:.3}s, movement this step is scaled accordingly");
        }

        self.frame.clear(self.settings.clear_color);
        let report = tick(&mut self.world, &self.assets, &events.input, dt, &mut self.shoot);
        self.renderer.render(&self.world, &self.assets, &mut self.frame);
        self.frames += 1;
        log::trace!("Frame {} dt={dt:.4} {:?}", self.frames, report);
        Some(report)
    }

    /// Loop until the event source asks to quit. `present` receives each
    /// finished frame.
    pub fn run(
        &mut self,
        events: &mut impl EventSource,
        clock: &mut impl Clock,
        mut present: impl FnMut(&FrameBuffer),
    ) {
        log::info!("Entering frame loop");
        while self.state == LoopState::Running {
            let polled = events.poll();
            let dt = clock.tick();
            if self.frame(polled, dt).is_some() {
                present(&self.frame);
            }
        }
        log::info!("Frame loop finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Collection;

    /// Replays a script of inputs, then quits
    struct Script {
        frames: Vec<InputState>,
        index: usize,
    }

    impl EventSource for Script {
        fn poll(&mut self) -> FrameEvents {
            let events = match self.frames.get(self.index) {
                Some(input) => FrameEvents {
                    quit: false,
                    input: *input,
                },
                None => FrameEvents {
                    quit: true,
                    ..Default::default()
                },
            };
            self.index += 1;
            events
        }
    }

    fn demo_game() -> Game {
        Game::new(&LevelData::demo(42), Assets::placeholder(), Settings::default()).unwrap()
    }

    #[test]
    fn test_runs_until_quit() {
        let mut game = demo_game();
        let mut script = Script {
            frames: vec![InputState::default(); 5],
            index: 0,
        };
        let mut presented = 0;
        game.run(&mut script, &mut FixedClock(1.0 / 60.0), |_| presented += 1);
        assert_eq!(game.state(), LoopState::Quitting);
        assert_eq!(game.frames(), 5);
        assert_eq!(presented, 5);
    }

    #[test]
    fn test_quitting_is_terminal() {
        let mut game = demo_game();
        game.frame(
            FrameEvents {
                quit: true,
                ..Default::default()
            },
            0.016,
        );
        assert!(game.frame(FrameEvents::default(), 0.016).is_none());
        assert_eq!(game.state(), LoopState::Quitting);
    }

    #[test]
    fn test_camera_tracks_moved_player() {
        let mut game = demo_game();
        let input = InputState {
            right: true,
            ..Default::default()
        };
        game.frame(FrameEvents { quit: false, input }, 0.1);
        let player_box = game.world.player_rect().unwrap();
        let expected = player_box.center().as_vec2() - game.settings.viewport() / 2.0;
        assert_eq!(game.renderer.camera.offset, expected);
    }

    #[test]
    fn test_huge_dt_does_not_crash() {
        let mut game = demo_game();
        let input = InputState {
            fire: true,
            ..Default::default()
        };
        game.frame(FrameEvents { quit: false, input }, 0.016);
        assert!(game.frame(FrameEvents::default(), 30.0).is_some());
        assert!(game.world.members(Collection::Projectile).is_empty());
    }

    #[test]
    fn test_frame_is_cleared_and_drawn() {
        let mut game = demo_game();
        game.frame(FrameEvents::default(), 0.016);
        // The first heart of the overlay sits at (10, 10)
        let px = game.frame.pixel(12, 12).unwrap();
        assert_eq!([px.r, px.g, px.b, px.a], [220, 30, 50, 255]);
    }

    #[test]
    fn test_missing_bullet_image_is_fatal() {
        let mut assets = Assets::new();
        for (name, image) in [
            "terrain", "bg", "bg_detail", "fg_detail", "platform", "player", "enemy", "heart", "bg_sky", "fg_sky",
        ]
        .iter()
        .map(|n| (*n, crate::assets::Image::solid(8, 8, [1, 1, 1, 255])))
        {
            assets.insert(name, image);
        }
        let err = Game::new(&LevelData::demo(1), assets, Settings::default()).err().unwrap();
        assert!(matches!(err, LevelError::UnknownImage(name) if name == "bullet"));
    }
}
