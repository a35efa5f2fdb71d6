//! Contra entry point
//!
//! Headless runner: loads (or generates) a level, drives the frame loop with a
//! scripted pilot and optionally dumps the last frame as raw RGBA.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use contra::game::{EventSource, FixedClock, FrameEvents, WallClock};
use contra::sim::{Collection, InputState};
use contra::{Assets, Game, LevelData, Settings};

/// Walks right, hops up and down, fires in bursts, quits after `frames`
struct Pilot {
    frame: u64,
    frames: u64,
}

impl EventSource for Pilot {
    fn poll(&mut self) -> FrameEvents {
        let f = self.frame;
        self.frame += 1;
        if f >= self.frames {
            return FrameEvents {
                quit: true,
                ..Default::default()
            };
        }
        FrameEvents {
            quit: false,
            input: InputState {
                right: f % 240 < 180,
                left: f % 240 >= 200,
                up: f % 120 < 10,
                down: (60..70).contains(&(f % 120)),
                fire: f % 30 < 5,
            },
        }
    }
}

/// Headless run of a level with a scripted pilot
#[derive(Parser, Debug)]
#[command(name = "contra", version, about)]
struct Args {
    /// Level JSON file; a demo level is generated when omitted
    level: Option<PathBuf>,

    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Directory of PNG images; solid-colour placeholders when omitted
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Frames to simulate before quitting
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Seed for the generated demo level
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Fixed step in seconds instead of wall-clock time
    #[arg(long)]
    fixed_dt: Option<f32>,

    /// Write the last frame as raw RGBA
    #[arg(long)]
    dump_frame: Option<PathBuf>,

    /// Write the level as JSON
    #[arg(long)]
    dump_level: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let level = match &args.level {
        Some(path) => LevelData::load(path)?,
        None => {
            log::info!("No level given, generating demo level (seed {})", args.seed);
            LevelData::demo(args.seed)
        }
    };
    if let Some(path) = &args.dump_level {
        std::fs::write(path, level.to_json()?)?;
        log::info!("Level written to {}", path.display());
    }

    let assets = match &args.assets {
        Some(dir) => Assets::load_dir(dir)?,
        None => Assets::placeholder(),
    };

    let mut game = Game::new(&level, assets, settings)?;
    let mut pilot = Pilot {
        frame: 0,
        frames: args.frames,
    };
    match args.fixed_dt {
        Some(dt) => game.run(&mut pilot, &mut FixedClock(dt), |_| {}),
        None => game.run(&mut pilot, &mut WallClock::new(), |_| {}),
    }

    let world = &game.world;
    log::info!(
        "Ran {} frames: {} entities, {} projectiles in flight, {} vulnerable left",
        game.frames(),
        world.len(),
        world.members(Collection::Projectile).len(),
        world.members(Collection::Vulnerable).len(),
    );

    if let Some(path) = &args.dump_frame {
        std::fs::write(path, game.frame.as_bytes())?;
        let (w, h) = game.frame.size();
        log::info!("Frame ({w}x{h} RGBA) written to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Contra (headless) starting...");

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
