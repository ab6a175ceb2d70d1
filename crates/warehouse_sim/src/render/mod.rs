//! Seams to the outside renderer
//!
//! The simulation never draws anything itself. It asks a [`RenderBackend`]
//! for entities and moves them, asks an [`OverlayLayer`] for zone labels and
//! places them, and reads the view from a [`CameraView`].

pub mod backend;
pub mod camera;

pub use backend::{EntityHandle, EntityKind, LabelHandle, OverlayLayer, RenderBackend, RenderError};
pub use camera::{Camera, CameraView, Viewport, ViewportCamera};
