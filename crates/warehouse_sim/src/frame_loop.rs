//! Per-frame driver
//!
//! Owns only timing. Each frame measures the wall-clock delta and hands it
//! to [`WarehouseSimulation::tick`]; [`FrameLoop::step`] takes an explicit
//! delta for fixed-step runs and tests.

use std::time::Duration;

use crate::foundation::time::Timer;
use crate::render::{CameraView, OverlayLayer, RenderBackend};
use crate::simulation::{SimulationError, WarehouseSimulation};

/// Frame driver for a [`WarehouseSimulation`]
#[derive(Default)]
pub struct FrameLoop {
    timer: Timer,
    frames: u64,
    simulated: Duration,
}

impl FrameLoop {
    /// Start measuring from now
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame with the wall-clock time since the previous frame
    pub fn frame<B: RenderBackend, O: OverlayLayer>(
        &mut self,
        simulation: &mut WarehouseSimulation<B, O>,
        view: &dyn CameraView,
    ) -> Result<Duration, SimulationError> {
        let dt = self.timer.update();
        self.step(dt, simulation, view)?;
        Ok(dt)
    }

    /// Run one frame with an exact delta
    pub fn step<B: RenderBackend, O: OverlayLayer>(
        &mut self,
        dt: Duration,
        simulation: &mut WarehouseSimulation<B, O>,
        view: &dyn CameraView,
    ) -> Result<(), SimulationError> {
        simulation.tick(dt, view)?;
        self.frames += 1;
        self.simulated += dt;
        log::trace!("Frame {} ({:?}, total {:?})", self.frames, dt, self.simulated);
        Ok(())
    }

    /// Run fixed steps of `dt` until `total` has been simulated
    pub fn run_for<B: RenderBackend, O: OverlayLayer>(
        &mut self,
        total: Duration,
        dt: Duration,
        simulation: &mut WarehouseSimulation<B, O>,
        view: &dyn CameraView,
    ) -> Result<(), SimulationError> {
        if dt.is_zero() {
            return Ok(());
        }
        let mut remaining = total;
        while !remaining.is_zero() {
            let step = dt.min(remaining);
            self.step(step, simulation, view)?;
            remaining -= step;
        }
        Ok(())
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Simulated time so far
    pub fn simulated(&self) -> Duration {
        self.simulated
    }

    /// Average frames per second of wall-clock `frame` calls
    pub fn average_fps(&self) -> f32 {
        self.timer.average_fps()
    }
}
