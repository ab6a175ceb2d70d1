//! Deferred callbacks and outbound notifications
//!
//! - [`DeferredQueue`] delivers actions once a delay has passed on the
//!   simulation clock. It is the only timer in the system, so clearing it
//!   cancels every pending callback.
//! - [`EventFeed`] buffers [`SimEvent`]s for whoever drives the simulation
//!   (stats panel, toast messages).

use std::collections::VecDeque;
use std::time::Duration;

use thiserror::Error;

use crate::inventory::{InventoryError, ProductCategory, ProductId, ZoneIndex};
use crate::transport::{TransportError, TruckState};

/// Handle to a pending deferred action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeferredId(u64);

#[derive(Debug)]
struct Deferred<A> {
    id: DeferredId,
    due: Duration,
    action: A,
}

/// Actions waiting for a point on the simulation clock
///
/// The clock only moves through [`advance`](Self::advance). Due actions are
/// taken with [`drain_due`](Self::drain_due) in due-time order, ties broken by
/// posting order.
#[derive(Debug)]
pub struct DeferredQueue<A> {
    now: Duration,
    next_id: u64,
    pending: Vec<Deferred<A>>,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<A> DeferredQueue<A> {
    /// Create an empty queue at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Deliver `action` once `delay` has passed from now
    pub fn post(&mut self, delay: Duration, action: A) -> DeferredId {
        let id = DeferredId(self.next_id);
        self.next_id += 1;
        self.pending.push(Deferred {
            id,
            due: self.now + delay,
            action,
        });
        id
    }

    /// Move the clock forward
    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
    }

    /// Remove and return every action whose time has come
    pub fn drain_due(&mut self) -> Vec<A> {
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|entry| entry.due <= now);
        self.pending = pending;
        due.sort_by_key(|entry| (entry.due, entry.id));
        due.into_iter().map(|entry| entry.action).collect()
    }

    /// Cancel one pending action
    pub fn cancel(&mut self, id: DeferredId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.id != id);
        self.pending.len() != before
    }

    /// Cancel everything; returns how many actions were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Pending action count
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Recoverable rejection of a control request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    /// Zone full or empty
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Truck cannot take the request right now
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Something observers may want to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// New product placed in a zone
    ProductAdded {
        /// New product
        product: ProductId,
        /// Receiving zone
        zone: ZoneIndex,
        /// Its category
        category: ProductCategory,
    },
    /// Product moved between zones
    ProductMoved {
        /// Moved product
        product: ProductId,
        /// Source zone
        from: ZoneIndex,
        /// Destination zone
        to: ZoneIndex,
    },
    /// Product left a zone for the truck
    ProductLoaded {
        /// Loaded product
        product: ProductId,
        /// Zone it left
        zone: ZoneIndex,
    },
    /// Product landed in the truck bed
    ProductStowed {
        /// Stowed product
        product: ProductId,
    },
    /// Product left the scene
    ProductRetired {
        /// Retired product
        product: ProductId,
    },
    /// Truck changed state
    TruckStateChanged {
        /// Previous state
        from: TruckState,
        /// New state
        to: TruckState,
    },
    /// A request was rejected
    Warning(Warning),
}

/// Bounded buffer of events, oldest dropped first
#[derive(Debug)]
pub struct EventFeed {
    events: VecDeque<SimEvent>,
    capacity: usize,
}

impl EventFeed {
    /// Default number of buffered events
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Create a feed holding at most `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Append an event
    pub fn push(&mut self, event: SimEvent) {
        if self.events.len() == self.capacity {
            if let Some(dropped) = self.events.pop_front() {
                log::trace!("Event feed full, dropping {:?}", dropped);
            }
        }
        self.events.push_back(event);
    }

    /// Append many events
    pub fn extend(&mut self, events: impl IntoIterator<Item = SimEvent>) {
        for event in events {
            self.push(event);
        }
    }

    /// Take every buffered event, oldest first
    pub fn drain(&mut self) -> Vec<SimEvent> {
        self.events.drain(..).collect()
    }

    /// Buffered event count
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every buffered event
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for EventFeed {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
