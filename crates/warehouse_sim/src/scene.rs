//! Animatable state of the warehouse floor

use crate::animation::{Animatable, Property};
use crate::inventory::{ProductId, ZoneInventoryStore};
use crate::transport::Truck;

/// What an animation task moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneTarget {
    /// A live product
    Product(ProductId),
    /// The truck
    Truck,
}

/// Inventory plus truck: everything animation tasks read and write
#[derive(Debug, Clone)]
pub struct Scene {
    /// Zone contents and product records
    pub store: ZoneInventoryStore,
    /// The truck
    pub truck: Truck,
}

impl Scene {
    /// Combine a store and a truck
    pub fn new(store: ZoneInventoryStore, truck: Truck) -> Self {
        Self { store, truck }
    }
}

impl Animatable<SceneTarget> for Scene {
    fn read(&self, target: SceneTarget, property: Property) -> Option<f32> {
        match target {
            SceneTarget::Product(id) => {
                let product = self.store.product(id).filter(|p| p.ownership.is_live())?;
                match property {
                    Property::PositionX => Some(product.position.x),
                    Property::PositionY => Some(product.position.y),
                    Property::PositionZ => Some(product.position.z),
                    Property::Yaw => None,
                }
            }
            SceneTarget::Truck => {
                let position = self.truck.position();
                Some(match property {
                    Property::PositionX => position.x,
                    Property::PositionY => position.y,
                    Property::PositionZ => position.z,
                    Property::Yaw => self.truck.yaw(),
                })
            }
        }
    }

    fn write(&mut self, target: SceneTarget, property: Property, value: f32) {
        match target {
            SceneTarget::Product(id) => {
                let Some(product) = self.store.product_mut(id) else {
                    return;
                };
                match property {
                    Property::PositionX => product.position.x = value,
                    Property::PositionY => product.position.y = value,
                    Property::PositionZ => product.position.z = value,
                    Property::Yaw => {}
                }
            }
            SceneTarget::Truck => match property {
                Property::PositionX => self.truck.position_mut().x = value,
                Property::PositionY => self.truck.position_mut().y = value,
                Property::PositionZ => self.truck.position_mut().z = value,
                Property::Yaw => self.truck.set_yaw(value),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::foundation::math::Vec3;
    use crate::inventory::{ProductCategory, ZoneIndex};

    fn scene() -> Scene {
        let layout = LayoutConfig::default();
        Scene::new(ZoneInventoryStore::new(layout.zone_positions()), Truck::new(layout.truck_home))
    }

    #[test]
    fn test_truck_properties() {
        let mut scene = scene();
        scene.write(SceneTarget::Truck, Property::PositionZ, 15.0);
        scene.write(SceneTarget::Truck, Property::Yaw, 1.0);
        assert_eq!(scene.truck.position(), Vec3::new(10.0, 0.0, 15.0));
        assert_eq!(scene.read(SceneTarget::Truck, Property::Yaw), Some(1.0));
    }

    #[test]
    fn test_retired_products_are_not_readable() {
        let mut scene = scene();
        let zone = ZoneIndex::FIRST;
        let id = scene.store.add_product(zone, ProductCategory::Door, Vec3::zeros()).unwrap();
        assert_eq!(scene.read(SceneTarget::Product(id), Property::PositionY), Some(0.0));
        assert_eq!(scene.read(SceneTarget::Product(id), Property::Yaw), None);

        scene.store.remove_for_transit(zone).unwrap();
        scene.store.mark_owned_by_truck(id).unwrap();
        scene.store.mark_removed(id).unwrap();
        assert_eq!(scene.read(SceneTarget::Product(id), Property::PositionY), None);
    }
}
