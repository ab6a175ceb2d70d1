//! Products and their categories

use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use super::zone::ZoneIndex;
use crate::foundation::math::Vec3;

new_key_type! {
    /// Stable product identity
    pub struct ProductId;
}

/// Closed set of product categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    /// Tyre and rim
    Wheel,
    /// Car door panel
    Door,
    /// Headlight unit
    Headlight,
}

/// Geometry the render backend should build for a category
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProductShape {
    /// Ring lying in the XY plane
    Torus {
        /// Ring radius
        radius: f32,
        /// Tube radius
        tube: f32,
    },
    /// Axis-aligned box
    Box {
        /// X extent
        width: f32,
        /// Y extent
        height: f32,
        /// Z extent
        depth: f32,
    },
    /// Sphere
    Sphere {
        /// Radius
        radius: f32,
    },
}

/// Fixed visual parameters of a category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductVisual {
    /// 0xRRGGBB colour
    pub color: u32,
    /// Nominal size
    pub size: f32,
    /// Mesh shape
    pub shape: ProductShape,
}

impl ProductCategory {
    /// Every category
    pub const ALL: [Self; 3] = [Self::Wheel, Self::Door, Self::Headlight];

    /// Display name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wheel => "wheel",
            Self::Door => "door",
            Self::Headlight => "headlight",
        }
    }

    /// Visual parameters for this category
    pub const fn visual(self) -> ProductVisual {
        match self {
            Self::Wheel => ProductVisual {
                color: 0x44_44_44,
                size: 1.0,
                shape: ProductShape::Torus { radius: 0.5, tube: 0.2 },
            },
            Self::Door => ProductVisual {
                color: 0x66_66_66,
                size: 2.0,
                shape: ProductShape::Box { width: 1.5, height: 2.0, depth: 0.1 },
            },
            Self::Headlight => ProductVisual {
                color: 0xcc_cc_cc,
                size: 0.5,
                shape: ProductShape::Sphere { radius: 0.3 },
            },
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which container currently holds a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// Sitting in a zone
    OwnedByZone(ZoneIndex),
    /// Taken from a zone, on its way to the truck
    InTransitToTruck,
    /// Landed in the truck bed
    OwnedByTruck,
    /// Gone from the scene
    Removed,
}

impl Ownership {
    /// Whether the product still counts as inventory
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Removed)
    }
}

/// A unit of inventory
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Identity
    pub id: ProductId,
    /// Category
    pub category: ProductCategory,
    /// Current world position, written by animations
    pub position: Vec3,
    /// Current owner
    pub ownership: Ownership,
}
