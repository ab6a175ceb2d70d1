//! Operator requests and the selection state they act on

use std::fmt;

use crate::inventory::{InvalidZoneIndex, ProductCategory, ZoneIndex};

/// One request from the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Add a product of this category to the selected zone
    AddProduct(ProductCategory),
    /// Choose the zone add, move and load act on
    SelectZone(usize),
    /// Choose the destination of moves
    SelectTargetZone(usize),
    /// Move the newest product of the selected zone to the target zone
    MoveProduct,
    /// Send the newest product of the selected zone to the truck
    LoadTruck,
    /// Send the truck off and back
    DispatchTruck,
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddProduct(category) => write!(f, "Add {}", category),
            Self::SelectZone(index) => write!(f, "Select zone #{}", index),
            Self::SelectTargetZone(index) => write!(f, "Move to zone #{}", index),
            Self::MoveProduct => f.write_str("Move Product"),
            Self::LoadTruck => f.write_str("Load in Truck"),
            Self::DispatchTruck => f.write_str("Start Truck"),
        }
    }
}

/// Selection state written by control-surface hooks
///
/// Owned by one simulation instance; there is no shared panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPanel {
    category: ProductCategory,
    selected_zone: ZoneIndex,
    target_zone: ZoneIndex,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            category: ProductCategory::Wheel,
            selected_zone: ZoneIndex::FIRST,
            target_zone: ZoneIndex::FIRST,
        }
    }
}

impl ControlPanel {
    /// Fresh panel: wheels, zone 1 selected and targeted
    pub fn new() -> Self {
        Self::default()
    }

    /// Category used by the last add
    pub fn category(&self) -> ProductCategory {
        self.category
    }

    /// Zone add, move and load act on
    pub fn selected_zone(&self) -> ZoneIndex {
        self.selected_zone
    }

    /// Destination of moves
    pub fn target_zone(&self) -> ZoneIndex {
        self.target_zone
    }

    /// Remember the category for later adds
    pub fn set_category(&mut self, category: ProductCategory) {
        self.category = category;
    }

    /// Select a zone by raw index
    pub fn select_zone(&mut self, index: usize) -> Result<ZoneIndex, InvalidZoneIndex> {
        self.selected_zone = ZoneIndex::new(index)?;
        Ok(self.selected_zone)
    }

    /// Select a move destination by raw index
    pub fn select_target_zone(&mut self, index: usize) -> Result<ZoneIndex, InvalidZoneIndex> {
        self.target_zone = ZoneIndex::new(index)?;
        Ok(self.target_zone)
    }
}
