//! Warehouse floor demo
//!
//! Runs a scripted operator session against the simulation at a fixed 60 Hz
//! step, with a console renderer standing in for the 3D view.
//!
//! Usage: `warehouse_demo [config.toml|config.ron]`

mod console;

use std::time::Duration;

use thiserror::Error;
use warehouse_sim::config::ConfigError;
use warehouse_sim::foundation::logging;
use warehouse_sim::prelude::*;

use console::{ConsoleBackend, ConsoleOverlay};

const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Debug, Error)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),
}

#[derive(Debug, Clone, Copy)]
enum Cue {
    Control(ControlAction),
    Resize(f32, f32),
}

/// Operator session: (milliseconds from start, cue)
fn script() -> Vec<(u64, Cue)> {
    use ControlAction::*;
    use ProductCategory::*;

    vec![
        (0, Cue::Control(SelectZone(0))),
        (0, Cue::Control(AddProduct(Wheel))),
        (200, Cue::Control(AddProduct(Wheel))),
        (400, Cue::Control(AddProduct(Door))),
        (600, Cue::Control(SelectZone(2))),
        (600, Cue::Control(AddProduct(Headlight))),
        (800, Cue::Control(AddProduct(Headlight))),
        (2500, Cue::Control(SelectZone(0))),
        (2500, Cue::Control(SelectTargetZone(4))),
        (2500, Cue::Control(MoveProduct)),
        (3800, Cue::Control(SelectZone(2))),
        (3800, Cue::Control(LoadTruck)),
        (4000, Cue::Control(LoadTruck)),
        (4200, Cue::Control(LoadTruck)),
        (4500, Cue::Resize(1920.0, 1080.0)),
        (6500, Cue::Control(DispatchTruck)),
        (7000, Cue::Control(DispatchTruck)),
    ]
}

fn main() -> Result<(), AppError> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load_from_file(&path)?,
        None => SimulationConfig::default(),
    };
    logging::init_with_level(&config.logging.level);
    log::info!("Starting warehouse demo");

    let viewport = Viewport::new(1280.0, 720.0);
    let mut camera = Camera::perspective(Vec3::new(20.0, 20.0, 20.0), 75.0, viewport.aspect(), 0.1, 1000.0);
    camera.look_at(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0));
    let mut view = ViewportCamera::new(camera, viewport);

    let session_length = config.timing.dispatch_total() + Duration::from_millis(7500);
    let mut simulation = WarehouseSimulation::new(config, ConsoleBackend::default(), ConsoleOverlay::default())?;
    let mut frames = FrameLoop::new();
    let mut cues = script().into_iter().peekable();

    while frames.simulated() < session_length {
        let now = u64::try_from(frames.simulated().as_millis()).unwrap_or(u64::MAX);
        while let Some((_, cue)) = cues.next_if(|(at, _)| *at <= now) {
            match cue {
                Cue::Control(action) => {
                    let outcome = simulation.handle(action)?;
                    log::info!("[{:>5} ms] {} -> {:?}", now, action, outcome);
                }
                Cue::Resize(width, height) => {
                    if view.resize(width, height) {
                        simulation.on_resize()?;
                    }
                }
            }
        }

        frames.step(FRAME, &mut simulation, &view)?;

        for event in simulation.drain_events() {
            match event {
                SimEvent::Warning(warning) => log::warn!("[{:>5} ms] {}", now, warning),
                other => log::debug!("[{:>5} ms] {:?}", now, other),
            }
        }
    }

    log::info!("Zone Stats");
    for row in simulation.stats_snapshot() {
        log::info!("  {}", row);
    }
    let store = simulation.store();
    log::info!(
        "{} added, {} shipped, truck {}",
        store.total_added(),
        store.total_removed(),
        simulation.truck().state()
    );

    simulation.dispose()?;
    log::info!(
        "Ran {} frames; {} entities left in the backend",
        frames.frame_count(),
        simulation.backend().live_entities()
    );
    Ok(())
}
