//! Render backend and overlay traits
//!
//! Keeps the simulation independent of whatever actually draws the scene.
//! Handles are opaque numbers issued by the backend.

use thiserror::Error;

use crate::foundation::math::Transform;
use crate::inventory::{ProductCategory, ZoneIndex};
use crate::projection::LabelPlacement;

/// Handle to a backend entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(pub u64);

/// Handle to an overlay label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelHandle(pub u64);

/// What an entity looks like; the backend picks geometry and material
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    /// Ground plane
    Floor {
        /// Extent along X
        width: f32,
        /// Extent along Z
        depth: f32,
    },
    /// Vertical wall panel
    Wall {
        /// Horizontal extent
        width: f32,
        /// Vertical extent
        height: f32,
    },
    /// Shelving of one zone
    ShelfUnit(ZoneIndex),
    /// Delivery truck
    Truck,
    /// Inventory item; see [`ProductCategory::visual`]
    Product(ProductCategory),
}

/// Rendering failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Backend could not allocate the resource
    #[error("Render resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Handle not issued by this backend or already destroyed
    #[error("Unknown entity {0:?}")]
    UnknownEntity(EntityHandle),

    /// Handle not issued by this overlay or already destroyed
    #[error("Unknown label {0:?}")]
    UnknownLabel(LabelHandle),

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Scene side of the renderer
pub trait RenderBackend {
    /// Create an entity at `transform`
    fn create_entity(&mut self, kind: EntityKind, transform: &Transform) -> Result<EntityHandle, RenderError>;

    /// Release an entity
    fn destroy_entity(&mut self, handle: EntityHandle) -> Result<(), RenderError>;

    /// Move an entity
    fn set_transform(&mut self, handle: EntityHandle, transform: &Transform) -> Result<(), RenderError>;

    /// Draw the current scene
    fn submit_frame(&mut self) -> Result<(), RenderError>;
}

/// Screen-space text layer
pub trait OverlayLayer {
    /// Create a label for `zone`
    fn create_label(&mut self, zone: ZoneIndex, text: &str) -> Result<LabelHandle, RenderError>;

    /// Position a label
    fn update_label(&mut self, handle: LabelHandle, placement: &LabelPlacement) -> Result<(), RenderError>;

    /// Release a label
    fn destroy_label(&mut self, handle: LabelHandle) -> Result<(), RenderError>;
}
