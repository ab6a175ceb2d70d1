//! # Warehouse Sim
//!
//! Simulation core of an interactive warehouse floor: five storage zones
//! with bounded capacity, products dropped onto and moved between zones, and
//! a delivery truck that products are carried into before it drives off.
//!
//! ## Features
//!
//! - **Inventory**: LIFO zones with capacity and ownership tracking
//! - **Animation**: Time-based property tweens with easing and continuations
//! - **Transport**: Load and dispatch requests as named stage chains
//! - **Projection**: Zone labels placed in screen space every frame
//! - **Backend-agnostic**: Rendering and overlay reached through traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use warehouse_sim::prelude::*;
//! # fn run<B: RenderBackend, O: OverlayLayer>(backend: B, overlay: O) -> Result<(), SimulationError> {
//! let mut simulation = WarehouseSimulation::new(SimulationConfig::default(), backend, overlay)?;
//! let view = ViewportCamera::new(Camera::default(), Viewport::new(1280.0, 720.0));
//! let mut frames = FrameLoop::new();
//!
//! simulation.handle(ControlAction::AddProduct(ProductCategory::Wheel))?;
//! simulation.handle(ControlAction::LoadTruck)?;
//! frames.frame(&mut simulation, &view)?;
//!
//! for row in simulation.stats_snapshot() {
//!     println!("{}", row);
//! }
//! simulation.dispose()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::must_use_candidate
)]

pub mod animation;
pub mod config;
pub mod control;
pub mod events;
pub mod foundation;
pub mod inventory;
pub mod projection;
pub mod render;
pub mod scene;
pub mod transport;

mod frame_loop;
mod simulation;

#[cfg(test)]
mod tests;

pub use frame_loop::FrameLoop;
pub use simulation::{ActionOutcome, SimulationError, WarehouseSimulation, ZoneStats};

/// Common imports for simulation users
pub mod prelude {
    pub use crate::{
        ActionOutcome, FrameLoop, SimulationError, WarehouseSimulation, ZoneStats,
        animation::{AnimationScheduler, AnimationTask, Easing},
        config::{Config, SimulationConfig},
        control::{ControlAction, ControlPanel},
        events::{SimEvent, Warning},
        foundation::math::{Transform, Vec3},
        inventory::{Ownership, ProductCategory, ProductId, ZoneIndex, ZoneStatus},
        projection::LabelPlacement,
        render::{
            Camera, CameraView, EntityHandle, EntityKind, LabelHandle, OverlayLayer, RenderBackend,
            RenderError, Viewport, ViewportCamera,
        },
        transport::TruckState,
    };
}
