//! `surveil <config>`: plan a sensor deployment for a floor plan and
//! simulate whether the configured adversaries get detected.
//!
//! Runs headless; interactive display front-ends drive the library through
//! the `SceneVisualizer` seam instead.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

use surveil::adversary::{Adversary, AdversaryPool};
use surveil::config::Config;
use surveil::constants::BOX_SIZE;
use surveil::environment::Environment;
use surveil::grid::{BoxGrid, OccupancyGrid};
use surveil::object::SurveillanceObject;
use surveil::placement::PlacementPipeline;
use surveil::reduce::RoomMap;
use surveil::sensors::Sensor;
use surveil::sim::{RunBudget, Simulator};

#[derive(Parser)]
#[command(name = "surveil")]
#[command(about = "Plan and simulate a surveillance deployment from a config file")]
struct Args {
    /// Surveillance configuration file (YAML)
    config: PathBuf,

    /// Seed for the randomised placement stages (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Write the built room graph blob to this path
    #[arg(long)]
    save_graph: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config::from_path(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let map = &config.environment.map;
    let grid = OccupancyGrid::from_image(&map.image)
        .with_context(|| format!("loading map {}", map.image.display()))?;
    let boxes = BoxGrid::downsample(&grid, BOX_SIZE)?;

    let room_map = match &map.graph {
        Some(path) => {
            let loaded = RoomMap::load(path)
                .with_context(|| format!("loading graph {}", path.display()))?;
            if !loaded.matches(&boxes) {
                bail!(
                    "graph blob {} was built for a different map",
                    path.display()
                );
            }
            loaded
        }
        None => RoomMap::build(boxes),
    };
    info!(
        "room graph: {} cells, {} reduced nodes",
        room_map.cells.len(),
        room_map.reduced.len()
    );

    if let Some(path) = &args.save_graph {
        room_map.save(path)?;
        info!("saved graph blob to {}", path.display());
    }

    let env = Environment::new(grid, room_map, map.pixel_to_cm)?;

    let sensors: Vec<Sensor> = config.sensors.iter().map(Sensor::from_config).collect();
    let mut rng = match args.seed.or(config.seed) {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let placement = PlacementPipeline::standard().run(sensors, &env, &mut rng)?;
    for sensor in &placement.sensors {
        let pose = sensor.pose().expect("pipeline placed every sensor");
        println!(
            "{}: ({:.1}, {:.1}) heading {:.2} rad",
            sensor.name(),
            pose.x,
            pose.y,
            pose.theta
        );
    }

    let adversaries = build_adversaries(&config, &env);
    let mut simulator = Simulator::new(
        &env,
        placement.sensors,
        adversaries,
        config.environment.max_timesteps,
    );
    let detections = simulator.run(&RunBudget::unlimited());

    println!(
        "{} detections over {} timesteps",
        detections.len(),
        simulator.timestep()
    );
    for detection in detections.iter().take(10) {
        println!(
            "  t={}: {} saw adversaries {:?}",
            detection.timestep, detection.sensor, detection.adversaries
        );
    }
    Ok(())
}

/// Build the adversary pool. Configured poses are honoured; an adversary
/// without one spawns at the centre of the largest room.
fn build_adversaries(config: &Config, env: &Environment) -> AdversaryPool {
    let spawn = default_spawn(env);
    let adversaries = config
        .adversaries
        .iter()
        .map(|cfg| {
            let mut adversary = Adversary::new(cfg.radius, cfg.speed);
            match cfg.pose {
                Some(pose) => adversary.place(pose.x, pose.y, pose.theta),
                None => adversary.place(spawn.0, spawn.1, 0.0),
            }
            adversary
        })
        .collect();
    AdversaryPool::new(adversaries)
}

fn default_spawn(env: &Environment) -> (f64, f64) {
    let reduced = &env.room_map.reduced;
    let best = reduced
        .node_ids()
        .into_iter()
        .max_by_key(|&id| {
            let node = reduced.node(id).expect("listed node exists");
            (node.is_room(), node.area())
        })
        .expect("reduced graph is never empty for a valid map");
    let pos = reduced.node(best).expect("listed node exists").pos;
    env.cell_center_cm(pos)
}
