//! Authoritative zone inventory

use slotmap::SlotMap;
use thiserror::Error;

use super::product::{Ownership, Product, ProductCategory, ProductId};
use super::zone::{Zone, ZoneIndex, ZoneStatus, ZONE_COUNT};
use crate::foundation::math::Vec3;

/// Recoverable inventory failures; the store is unchanged when one is returned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Destination zone is full
    #[error("{zone} is at full capacity ({capacity} items)")]
    CapacityExceeded {
        /// Full zone
        zone: ZoneIndex,
        /// Its capacity
        capacity: usize,
    },

    /// Source zone has nothing to take
    #[error("no products in {zone}")]
    EmptySource {
        /// Empty zone
        zone: ZoneIndex,
    },

    /// Ownership change not allowed from the current state
    #[error("product {product:?} cannot move from {from:?} to {to:?}")]
    Ownership {
        /// Product concerned
        product: ProductId,
        /// Current owner
        from: Ownership,
        /// Requested owner
        to: Ownership,
    },

    /// No record for this product
    #[error("unknown product {0:?}")]
    UnknownProduct(ProductId),
}

/// Which product occupies which zone
///
/// Zones pop their newest occupant first (LIFO) for both moves and truck
/// loads. Records of removed products are kept so their final ownership can
/// still be queried.
#[derive(Debug, Clone)]
pub struct ZoneInventoryStore {
    zones: Vec<Zone>,
    products: SlotMap<ProductId, Product>,
    total_added: usize,
    total_removed: usize,
}

impl ZoneInventoryStore {
    /// Create empty zones at the given base positions
    pub fn new(positions: [Vec3; ZONE_COUNT]) -> Self {
        let zones = ZoneIndex::all()
            .zip(positions)
            .map(|(index, position)| Zone::new(index, position))
            .collect();
        Self {
            zones,
            products: SlotMap::with_key(),
            total_added: 0,
            total_removed: 0,
        }
    }

    /// Create a product in `zone`, placed at `position`
    pub fn add_product(
        &mut self,
        zone: ZoneIndex,
        category: ProductCategory,
        position: Vec3,
    ) -> Result<ProductId, InventoryError> {
        self.ensure_room(zone)?;

        let id = self.products.insert_with_key(|id| Product {
            id,
            category,
            position,
            ownership: Ownership::OwnedByZone(zone),
        });
        self.zone_mut(zone).push(id);
        self.total_added += 1;
        Ok(id)
    }

    /// Move the newest occupant of `source` into `destination`
    pub fn move_product(
        &mut self,
        source: ZoneIndex,
        destination: ZoneIndex,
    ) -> Result<ProductId, InventoryError> {
        if self.zone(source).count() == 0 {
            return Err(InventoryError::EmptySource { zone: source });
        }
        self.ensure_room(destination)?;

        let id = self
            .zone_mut(source)
            .pop()
            .ok_or(InventoryError::EmptySource { zone: source })?;
        self.zone_mut(destination).push(id);
        if let Some(product) = self.products.get_mut(id) {
            product.ownership = Ownership::OwnedByZone(destination);
        }
        Ok(id)
    }

    /// Take the newest occupant of `zone` and mark it in transit
    pub fn remove_for_transit(&mut self, zone: ZoneIndex) -> Result<ProductId, InventoryError> {
        let id = self
            .zone_mut(zone)
            .pop()
            .ok_or(InventoryError::EmptySource { zone })?;
        if let Some(product) = self.products.get_mut(id) {
            product.ownership = Ownership::InTransitToTruck;
        }
        Ok(id)
    }

    /// Product landed in the truck bed
    pub fn mark_owned_by_truck(&mut self, id: ProductId) -> Result<(), InventoryError> {
        self.transition(id, Ownership::InTransitToTruck, Ownership::OwnedByTruck)
    }

    /// Product left the scene for good
    pub fn mark_removed(&mut self, id: ProductId) -> Result<(), InventoryError> {
        self.transition(id, Ownership::OwnedByTruck, Ownership::Removed)?;
        self.total_removed += 1;
        Ok(())
    }

    /// Stock level of a zone
    pub fn status_of(&self, zone: ZoneIndex) -> ZoneStatus {
        self.zone(zone).status()
    }

    /// Occupant count of a zone
    pub fn count(&self, zone: ZoneIndex) -> usize {
        self.zone(zone).count()
    }

    /// Occupants of a zone in arrival order
    pub fn occupants(&self, zone: ZoneIndex) -> &[ProductId] {
        self.zone(zone).occupants()
    }

    /// Zone record
    pub fn zone(&self, zone: ZoneIndex) -> &Zone {
        &self.zones[zone.get()]
    }

    /// All zones in index order
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    /// Product record, including removed products
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    pub(crate) fn product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.get_mut(id)
    }

    /// Current owner of a product
    pub fn ownership(&self, id: ProductId) -> Option<Ownership> {
        self.products.get(id).map(|product| product.ownership)
    }

    /// Products not yet removed
    pub fn live_products(&self) -> impl Iterator<Item = &Product> {
        self.products.values().filter(|product| product.ownership.is_live())
    }

    /// Products between a zone and the truck bed
    pub fn in_transit_count(&self) -> usize {
        self.count_owned_by(Ownership::InTransitToTruck)
    }

    /// Products sitting in the truck bed
    pub fn on_truck_count(&self) -> usize {
        self.count_owned_by(Ownership::OwnedByTruck)
    }

    /// Products held by all zones together
    pub fn stored_count(&self) -> usize {
        self.zones.iter().map(Zone::count).sum()
    }

    /// Products ever added
    pub fn total_added(&self) -> usize {
        self.total_added
    }

    /// Products that reached `Removed`
    pub fn total_removed(&self) -> usize {
        self.total_removed
    }

    /// Drop every product and empty every zone
    pub fn clear(&mut self) {
        for zone in &mut self.zones {
            zone.clear();
        }
        self.products.clear();
    }

    fn count_owned_by(&self, ownership: Ownership) -> usize {
        self.products
            .values()
            .filter(|product| product.ownership == ownership)
            .count()
    }

    /// `CapacityExceeded` when `zone` cannot take another product
    pub fn ensure_room(&self, zone: ZoneIndex) -> Result<(), InventoryError> {
        let record = self.zone(zone);
        if record.is_full() {
            Err(InventoryError::CapacityExceeded {
                zone,
                capacity: record.capacity(),
            })
        } else {
            Ok(())
        }
    }

    fn transition(
        &mut self,
        id: ProductId,
        expected: Ownership,
        next: Ownership,
    ) -> Result<(), InventoryError> {
        let product = self
            .products
            .get_mut(id)
            .ok_or(InventoryError::UnknownProduct(id))?;
        if product.ownership != expected {
            return Err(InventoryError::Ownership {
                product: id,
                from: product.ownership,
                to: next,
            });
        }
        product.ownership = next;
        Ok(())
    }

    fn zone_mut(&mut self, zone: ZoneIndex) -> &mut Zone {
        &mut self.zones[zone.get()]
    }
}
