#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Echo Defence headless.

mod autoplayer;
mod file_slot;
mod session;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use echo_defence_core::{config::SimulationConfig, Command, Event};
use echo_defence_world::{apply, World};
use log::info;
use serde::Deserialize;

use autoplayer::{AutoplayConfig, Autoplayer};
use file_slot::FileSlot;
use session::{Report, FRAME};

#[derive(Debug, Parser)]
#[command(name = "echo-defence", version)]
#[command(about = "Runs a headless Echo Defence session driven by a scripted player")]
struct Args {
    /// Map seed for the first level; also seeds wave composition
    #[arg(long)]
    seed: Option<u32>,

    /// Environment identifier for the first level
    #[arg(long)]
    env: Option<u32>,

    /// Wall-clock seconds to simulate before speed scaling
    #[arg(long, default_value_t = 300.0)]
    seconds: f32,

    /// Game speed multiplier (1-4)
    #[arg(long, default_value_t = 4)]
    speed: u8,

    /// TOML file with `[simulation]` and `[autoplay]` tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// File the run autosaves into and is saved to on exit
    #[arg(long)]
    save: Option<PathBuf>,

    /// Save file to resume from
    #[arg(long)]
    load: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    simulation: SimulationConfig,
    autoplay: AutoplayConfig,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file = match &args.config {
        Some(path) => read_config(path)?,
        None => ConfigFile::default(),
    };
    let mut simulation = file.simulation;
    if let Some(seed) = args.seed {
        simulation.map_seed = seed;
        simulation.composition_seed = Some(u64::from(seed));
    }
    if let Some(env) = args.env {
        simulation.env_id = env;
    }

    let mut world = World::new(simulation);
    if let Some(path) = &args.save {
        let slot = FileSlot::new(path);
        info!("autosaving to {}", slot.path().display());
        world = world.with_save_slot(Box::new(slot));
    }
    if let Some(path) = &args.load {
        load(&mut world, path)?;
    }

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::SetSpeed {
            multiplier: args.speed,
        },
        &mut events,
    );

    let frames = (args.seconds.max(0.0) / FRAME.as_secs_f32()).ceil() as u64;
    let mut player = Autoplayer::new(file.autoplay);
    let mut summary = session::run(&mut world, &mut player, frames);

    if args.save.is_some() {
        apply(&mut world, Command::Save, &mut events);
        if events.contains(&Event::GameSaved) {
            summary.saves += 1;
        } else {
            bail!("final save could not be written");
        }
    }

    println!(
        "{}",
        Report {
            world: &world,
            summary: &summary,
        }
    );
    Ok(())
}

fn read_config(path: &Path) -> Result<ConfigFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config toml at {}", path.display()))
}

fn load(world: &mut World, path: &Path) -> Result<()> {
    let blob = fs::read_to_string(path)
        .with_context(|| format!("failed to read save at {}", path.display()))?;
    let mut events = Vec::new();
    apply(world, Command::Load { blob }, &mut events);
    if !events.contains(&Event::LoadCompleted { success: true }) {
        bail!("save at {} could not be restored", path.display());
    }
    info!("resumed run from {}", path.display());
    Ok(())
}
