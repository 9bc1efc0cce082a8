//! Crossroads headless runner
//!
//! Loads optional tuning and level JSON, plays a scripted input sequence
//! against the world at the nominal rate and logs every emitted event.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crossroads::Tuning;
use crossroads::consts::NOMINAL_FPS;
use crossroads::persistence::{self, MemoryStore};
use crossroads::sim::{GameEvent, GamePhase, LevelData, Session, TickInput, World};

/// Run the simulation headless with a scripted player.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tuning override JSON; fields left out keep their defaults.
    #[arg(long, value_name = "PATH")]
    tuning: Option<PathBuf>,
    /// Level JSON; the built-in Forgotten Crossroads when omitted.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,
    /// Seed for the world RNG.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Simulated seconds to run at the nominal rate.
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..=3600)
    )]
    seconds: u32,
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_world(args: &Args) -> Result<World> {
    let tuning = match &args.tuning {
        Some(path) => Tuning::from_json(&read(path)?)
            .with_context(|| format!("tuning {}", path.display()))?,
        None => Tuning::default(),
    };
    let level = match &args.level {
        Some(path) => LevelData::from_json(&read(path)?, &tuning)
            .with_context(|| format!("level {}", path.display()))?,
        None => LevelData::forgotten_crossroads(),
    };
    let world = World::new(level, tuning, Session::default(), args.seed)?;
    Ok(world)
}

/// Input held on a given tick: walk right, hopping, slashing, casting and
/// trying to interact on a fixed rhythm
fn scripted_input(tick: u64) -> TickInput {
    let beat = tick % 120;
    TickInput {
        move_left: (90..100).contains(&beat),
        move_right: beat < 90,
        jump: (20..24).contains(&beat) || (26..29).contains(&beat),
        attack: (40..42).contains(&beat),
        fireball: (60..62).contains(&beat),
        interact: (100..102).contains(&beat),
    }
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = Args::parse();
    let mut world = load_world(&args).context("failed to load")?;
    let mut store = MemoryStore::new();

    let ticks = u64::from(args.seconds) * NOMINAL_FPS as u64;
    let dt = 1.0 / NOMINAL_FPS;
    log::info!("Running {ticks} ticks (seed {})", args.seed);

    for tick in 0..ticks {
        world.step(&scripted_input(tick), dt);

        for event in world.drain_events() {
            match &event {
                GameEvent::Effect { .. } => log::debug!("[{tick}] {event:?}"),
                GameEvent::SavePointActivated { .. } => {
                    log::info!("[{tick}] {event:?}");
                    let save = world.snapshot(format!("tick-{tick}"));
                    if let Err(e) = persistence::save_game(&mut store, &save) {
                        log::warn!("Save failed: {e}");
                    }
                }
                _ => log::info!("[{tick}] {event:?}"),
            }
        }

        match world.phase {
            GamePhase::Dead => {
                log::info!("[{tick}] Player died; respawning");
                world.respawn();
            }
            GamePhase::Victory => {
                log::info!("[{tick}] Victory");
                break;
            }
            GamePhase::Playing => {}
        }
    }

    let player = &world.player;
    log::info!(
        "Finished at ({:.1}, {:.1}): level {}, {} exp, {}/{} hp, {} enemies left",
        player.body.pos.x,
        player.body.pos.y,
        player.level,
        player.experience,
        player.health,
        player.max_health,
        world.living_enemies().count()
    );
    match persistence::load_game(&store)? {
        Some(save) => log::info!("Last save: {}", save.timestamp),
        None => log::info!("No save recorded"),
    }
    Ok(())
}
