//! Storage zones

use std::fmt;

use thiserror::Error;

use super::product::ProductId;
use crate::foundation::math::Vec3;

/// Number of zones on the floor
pub const ZONE_COUNT: usize = 5;

/// Products a zone can hold
pub const ZONE_CAPACITY: usize = 10;

/// Zone index outside `0..ZONE_COUNT`; a caller bug, not a runtime condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("zone index {0} is outside 0..{ZONE_COUNT}")]
pub struct InvalidZoneIndex(pub usize);

/// Validated zone index in `0..ZONE_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneIndex(u8);

impl ZoneIndex {
    /// Zone 1
    pub const FIRST: Self = Self(0);

    /// Validate a raw index
    pub fn new(index: usize) -> Result<Self, InvalidZoneIndex> {
        if index < ZONE_COUNT {
            u8::try_from(index).map(Self).map_err(|_| InvalidZoneIndex(index))
        } else {
            Err(InvalidZoneIndex(index))
        }
    }

    /// Raw index
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Every zone in index order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..ZONE_COUNT).filter_map(|index| Self::new(index).ok())
    }
}

impl TryFrom<usize> for ZoneIndex {
    type Error = InvalidZoneIndex;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

/// Zones are numbered from 1 for people
impl fmt::Display for ZoneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Zone {}", self.get() + 1)
    }
}

/// Stock level derived from a zone's count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneStatus {
    /// Nothing stored
    Empty,
    /// Under a third of capacity
    LowStock,
    /// Between low stock and full
    GoodStock,
    /// At capacity
    Full,
}

impl ZoneStatus {
    /// Classify `count` against `capacity`
    pub const fn from_count(count: usize, capacity: usize) -> Self {
        if count == 0 {
            Self::Empty
        } else if count >= capacity {
            Self::Full
        } else if count * 3 < capacity {
            Self::LowStock
        } else {
            Self::GoodStock
        }
    }

    /// Display name
    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::LowStock => "Low Stock",
            Self::GoodStock => "Good Stock",
            Self::Full => "Full",
        }
    }
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed storage slot with an ordered occupant list
#[derive(Debug, Clone)]
pub struct Zone {
    index: ZoneIndex,
    position: Vec3,
    capacity: usize,
    /// Arrival order, newest last
    occupants: Vec<ProductId>,
}

impl Zone {
    /// Create an empty zone at `position`
    pub fn new(index: ZoneIndex, position: Vec3) -> Self {
        Self {
            index,
            position,
            capacity: ZONE_CAPACITY,
            occupants: Vec::with_capacity(ZONE_CAPACITY),
        }
    }

    /// Zone index
    pub fn index(&self) -> ZoneIndex {
        self.index
    }

    /// Base world position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Maximum occupants
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Occupants in arrival order
    pub fn occupants(&self) -> &[ProductId] {
        &self.occupants
    }

    /// Occupant count
    pub fn count(&self) -> usize {
        self.occupants.len()
    }

    /// Whether the zone is at capacity
    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity
    }

    /// Current stock level
    pub fn status(&self) -> ZoneStatus {
        ZoneStatus::from_count(self.count(), self.capacity)
    }

    pub(crate) fn push(&mut self, product: ProductId) {
        debug_assert!(!self.is_full());
        self.occupants.push(product);
    }

    pub(crate) fn pop(&mut self) -> Option<ProductId> {
        self.occupants.pop()
    }

    pub(crate) fn clear(&mut self) {
        self.occupants.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_index_bounds() {
        assert!(ZoneIndex::new(0).is_ok());
        assert!(ZoneIndex::new(4).is_ok());
        assert_eq!(ZoneIndex::new(5), Err(InvalidZoneIndex(5)));
        assert_eq!(ZoneIndex::try_from(usize::MAX), Err(InvalidZoneIndex(usize::MAX)));
        assert_eq!(ZoneIndex::all().count(), ZONE_COUNT);
    }

    #[test]
    fn test_zone_index_display_is_one_based() {
        let index = ZoneIndex::new(2).unwrap();
        assert_eq!(index.to_string(), "Zone 3");
    }

    #[test]
    fn test_status_thresholds() {
        let expected = [
            ZoneStatus::Empty,
            ZoneStatus::LowStock,
            ZoneStatus::LowStock,
            ZoneStatus::LowStock,
            ZoneStatus::GoodStock,
            ZoneStatus::GoodStock,
            ZoneStatus::GoodStock,
            ZoneStatus::GoodStock,
            ZoneStatus::GoodStock,
            ZoneStatus::GoodStock,
            ZoneStatus::Full,
        ];
        for (count, status) in expected.into_iter().enumerate() {
            assert_eq!(ZoneStatus::from_count(count, ZONE_CAPACITY), status, "count {count}");
        }
    }
}
