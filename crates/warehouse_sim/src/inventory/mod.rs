//! Zone inventory bookkeeping
//!
//! [`ZoneInventoryStore`] is the single source of truth for which product sits
//! in which zone. Ownership changes are committed here synchronously; the
//! animations that visualise them run independently.

pub mod product;
pub mod zone;
pub mod store;

pub use product::{Ownership, Product, ProductCategory, ProductId, ProductShape, ProductVisual};
pub use zone::{InvalidZoneIndex, Zone, ZoneIndex, ZoneStatus, ZONE_CAPACITY, ZONE_COUNT};
pub use store::{InventoryError, ZoneInventoryStore};
