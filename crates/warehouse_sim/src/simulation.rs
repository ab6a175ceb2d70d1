//! The warehouse floor simulation
//!
//! [`WarehouseSimulation`] owns the inventory, the truck, every in-flight
//! animation and deferred callback, and every render entity and overlay label
//! it created. Control requests are applied synchronously; time only moves
//! through [`WarehouseSimulation::tick`].

use std::fmt;
use std::time::Duration;

use slotmap::SecondaryMap;
use thiserror::Error;

use crate::animation::{AnimationScheduler, AnimationTask, Easing};
use crate::config::{ConfigError, SimulationConfig, TimingConfig};
use crate::control::{ControlAction, ControlPanel};
use crate::events::{DeferredQueue, EventFeed, SimEvent, Warning};
use crate::foundation::math::{constants, Transform, Vec3};
use crate::inventory::{
    InvalidZoneIndex, Ownership, ProductCategory, ProductId, ZoneIndex, ZoneInventoryStore, ZoneStatus,
};
use crate::projection::SpatialProjector;
use crate::render::{CameraView, EntityHandle, EntityKind, LabelHandle, OverlayLayer, RenderBackend, RenderError};
use crate::scene::{Scene, SceneTarget};
use crate::transport::{StageStep, TransportContext, TransportStateMachine, Truck};

const FLOOR_WIDTH: f32 = 40.0;
const FLOOR_DEPTH: f32 = 30.0;
const WALL_HEIGHT: f32 = 10.0;

/// Failures the caller cannot recover from by retrying
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Caller passed a zone index outside the row
    #[error(transparent)]
    InvalidZoneIndex(#[from] InvalidZoneIndex),

    /// Render backend or overlay failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration rejected at construction
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Used after `dispose`
    #[error("Simulation has been disposed")]
    Disposed,
}

/// What a control request did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Product created and dropping onto its shelf
    Added(ProductId),
    /// Product flying to another zone
    Moved(ProductId),
    /// Product on its way to the truck
    Loading(ProductId),
    /// Truck left
    Dispatched,
    /// Zone selection changed
    Selected(ZoneIndex),
    /// Nothing changed; see the warning
    Rejected(Warning),
}

impl ActionOutcome {
    /// Whether the request was refused
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// One row of the stock table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneStats {
    /// Zone
    pub zone: ZoneIndex,
    /// Products stored
    pub count: usize,
    /// Stock level
    pub status: ZoneStatus,
}

impl fmt::Display for ZoneStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} items ({})", self.zone, self.count, self.status)
    }
}

/// Render entities and labels created by the simulation
#[derive(Debug, Default)]
struct EntityArena {
    fixtures: Vec<EntityHandle>,
    truck: Option<EntityHandle>,
    products: SecondaryMap<ProductId, EntityHandle>,
    labels: Vec<(ZoneIndex, LabelHandle)>,
}

/// Warehouse zones, their products and the delivery truck
pub struct WarehouseSimulation<B: RenderBackend, O: OverlayLayer> {
    config: SimulationConfig,
    scene: Scene,
    scheduler: AnimationScheduler<SceneTarget, StageStep>,
    deferred: DeferredQueue<StageStep>,
    transport: TransportStateMachine,
    projector: SpatialProjector,
    panel: ControlPanel,
    backend: B,
    overlay: O,
    arena: EntityArena,
    events: EventFeed,
    disposed: bool,
}

impl<B: RenderBackend, O: OverlayLayer> WarehouseSimulation<B, O> {
    /// Validate `config`, build the static scene and create the zone labels
    pub fn new(config: SimulationConfig, backend: B, overlay: O) -> Result<Self, SimulationError> {
        config.validate()?;
        let layout = &config.layout;
        let scene = Scene::new(
            ZoneInventoryStore::new(layout.zone_positions()),
            Truck::new(layout.truck_home),
        );

        let mut simulation = Self {
            scheduler: AnimationScheduler::new(),
            deferred: DeferredQueue::new(),
            transport: TransportStateMachine::new(&config),
            projector: SpatialProjector::new(layout.label_height),
            panel: ControlPanel::new(),
            backend,
            overlay,
            arena: EntityArena::default(),
            events: EventFeed::default(),
            disposed: false,
            scene,
            config,
        };
        simulation.build_scene()?;
        simulation.create_labels()?;
        log::info!(
            "Warehouse simulation ready: {} zones, truck at {:?}",
            simulation.scene.store.zones().count(),
            simulation.scene.truck.home()
        );
        Ok(simulation)
    }

    /// Apply one control request
    pub fn handle(&mut self, action: ControlAction) -> Result<ActionOutcome, SimulationError> {
        self.ensure_live()?;
        log::debug!("Control: {}", action);
        match action {
            ControlAction::AddProduct(category) => {
                self.panel.set_category(category);
                self.add_product(self.panel.selected_zone(), category)
            }
            ControlAction::SelectZone(index) => Ok(ActionOutcome::Selected(self.panel.select_zone(index)?)),
            ControlAction::SelectTargetZone(index) => {
                Ok(ActionOutcome::Selected(self.panel.select_target_zone(index)?))
            }
            ControlAction::MoveProduct => self.move_product(self.panel.selected_zone(), self.panel.target_zone()),
            ControlAction::LoadTruck => self.load_truck(self.panel.selected_zone()),
            ControlAction::DispatchTruck => self.dispatch_truck(),
        }
    }

    /// Spawn a product above the floor and drop it onto `zone`'s stack
    pub fn add_product(&mut self, zone: ZoneIndex, category: ProductCategory) -> Result<ActionOutcome, SimulationError> {
        self.ensure_live()?;
        if let Err(e) = self.scene.store.ensure_room(zone) {
            return Ok(self.reject(e.into()));
        }

        let layout = &self.config.layout;
        let spawn = layout.spawn_point;
        let base = self.scene.store.zone(zone).position();
        let slot = Vec3::new(base.x, layout.stack_height(self.scene.store.count(zone)), base.z);

        let handle = self
            .backend
            .create_entity(EntityKind::Product(category), &Transform::from_position(spawn))?;
        let id = match self.scene.store.add_product(zone, category, spawn) {
            Ok(id) => id,
            Err(e) => {
                self.backend.destroy_entity(handle)?;
                return Ok(self.reject(e.into()));
            }
        };
        self.arena.products.insert(id, handle);

        self.scheduler.start(
            AnimationTask::new(SceneTarget::Product(id), TimingConfig::ms(self.config.timing.spawn_drop_ms))
                .with_position(slot)
                .with_easing(Easing::BounceOut),
        );
        log::info!("Added {} to {} ({} items)", category, zone, self.scene.store.count(zone));
        self.events.push(SimEvent::ProductAdded {
            product: id,
            zone,
            category,
        });
        Ok(ActionOutcome::Added(id))
    }

    /// Move the newest product of `source` onto `destination`'s stack
    pub fn move_product(&mut self, source: ZoneIndex, destination: ZoneIndex) -> Result<ActionOutcome, SimulationError> {
        self.ensure_live()?;
        let id = match self.scene.store.move_product(source, destination) {
            Ok(id) => id,
            Err(e) => return Ok(self.reject(e.into())),
        };

        let layout = &self.config.layout;
        let base = self.scene.store.zone(destination).position();
        let top = self.scene.store.count(destination).saturating_sub(1);
        let slot = Vec3::new(base.x, layout.stack_height(top), base.z);
        self.scheduler.start(
            AnimationTask::new(SceneTarget::Product(id), TimingConfig::ms(self.config.timing.shuffle_ms))
                .with_position(slot)
                .with_easing(Easing::QuadraticOut),
        );
        log::info!("Moved product {:?} from {} to {}", id, source, destination);
        self.events.push(SimEvent::ProductMoved {
            product: id,
            from: source,
            to: destination,
        });
        Ok(ActionOutcome::Moved(id))
    }

    /// Carry the newest product of `zone` to the truck
    pub fn load_truck(&mut self, zone: ZoneIndex) -> Result<ActionOutcome, SimulationError> {
        self.ensure_live()?;
        let (transport, mut ctx) = self.transport_parts();
        match transport.request_load(zone, &mut ctx) {
            Ok(id) => Ok(ActionOutcome::Loading(id)),
            Err(e) => Ok(self.reject(e.into())),
        }
    }

    /// Send the truck off
    pub fn dispatch_truck(&mut self) -> Result<ActionOutcome, SimulationError> {
        self.ensure_live()?;
        let (transport, mut ctx) = self.transport_parts();
        match transport.request_dispatch(&mut ctx) {
            Ok(()) => Ok(ActionOutcome::Dispatched),
            Err(e) => Ok(self.reject(e.into())),
        }
    }

    /// One frame: advance time, sync transforms, place labels, render
    pub fn tick(&mut self, dt: Duration, view: &dyn CameraView) -> Result<(), SimulationError> {
        self.advance(dt)?;
        self.sync_scene()?;
        self.update_labels(view)?;
        self.render()
    }

    /// Advance deferred callbacks and animations by `dt`
    ///
    /// The deferred clock moves first so stages finishing this frame schedule
    /// their follow-up snaps from the new time. Snaps due this frame fire
    /// after the animations have been advanced.
    pub fn advance(&mut self, dt: Duration) -> Result<(), SimulationError> {
        self.ensure_live()?;
        self.deferred.advance(dt);

        let finished = self.scheduler.tick(dt, &mut self.scene);
        for step in finished {
            let (transport, mut ctx) = self.transport_parts();
            transport.on_stage_complete(step, &mut ctx);
        }
        for step in self.deferred.drain_due() {
            let (transport, mut ctx) = self.transport_parts();
            transport.on_deferred(step, &mut ctx);
        }

        self.release_retired()
    }

    /// Push product and truck transforms to the backend
    pub fn sync_scene(&mut self) -> Result<(), SimulationError> {
        self.ensure_live()?;
        for (id, handle) in &self.arena.products {
            if let Some(product) = self.scene.store.product(id) {
                self.backend
                    .set_transform(*handle, &Transform::from_position(product.position))?;
            }
        }
        if let Some(truck) = self.arena.truck {
            self.backend.set_transform(truck, &self.scene.truck.transform())?;
        }
        Ok(())
    }

    /// Project zone anchors through `view` and move the labels
    pub fn update_labels(&mut self, view: &dyn CameraView) -> Result<(), SimulationError> {
        self.ensure_live()?;
        let placements = self.projector.place_labels(self.scene.store.zones(), view);
        for placement in &placements {
            let label = self
                .arena
                .labels
                .iter()
                .find(|(zone, _)| *zone == placement.zone)
                .map(|(_, label)| *label);
            if let Some(label) = label {
                self.overlay.update_label(label, placement)?;
            }
        }
        Ok(())
    }

    /// Hand the frame to the backend
    pub fn render(&mut self) -> Result<(), SimulationError> {
        self.ensure_live()?;
        self.backend.submit_frame()?;
        Ok(())
    }

    /// Viewport changed: recreate the zone labels
    pub fn on_resize(&mut self) -> Result<(), SimulationError> {
        self.ensure_live()?;
        log::debug!("Viewport resized, recreating zone labels");
        self.destroy_labels()?;
        self.create_labels()
    }

    /// Count and status of every zone, in zone order
    pub fn stats_snapshot(&self) -> Vec<ZoneStats> {
        self.scene
            .store
            .zones()
            .map(|zone| ZoneStats {
                zone: zone.index(),
                count: zone.count(),
                status: zone.status(),
            })
            .collect()
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    /// Drop every animation and deferred callback and release everything
    /// created through the backend and overlay
    ///
    /// Safe to call more than once; also run on drop.
    pub fn dispose(&mut self) -> Result<(), SimulationError> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        let tasks = self.scheduler.clear();
        let callbacks = self.deferred.clear();
        let chains = self.transport.clear();

        let mut first_error: Option<RenderError> = None;
        let mut keep = |result: Result<(), RenderError>| {
            if let Err(e) = result {
                log::error!("Release failed during dispose: {}", e);
                first_error.get_or_insert(e);
            }
        };
        let mut released = 0usize;
        for (_, handle) in self.arena.products.drain() {
            keep(self.backend.destroy_entity(handle));
            released += 1;
        }
        if let Some(truck) = self.arena.truck.take() {
            keep(self.backend.destroy_entity(truck));
            released += 1;
        }
        for handle in self.arena.fixtures.drain(..) {
            keep(self.backend.destroy_entity(handle));
            released += 1;
        }
        for (_, label) in self.arena.labels.drain(..) {
            keep(self.overlay.destroy_label(label));
            released += 1;
        }
        self.events.clear();

        log::info!(
            "Warehouse simulation disposed: {} tasks, {} callbacks, {} chains dropped; {} render objects released",
            tasks,
            callbacks,
            chains,
            released
        );
        first_error.map_or(Ok(()), |e| Err(e.into()))
    }

    /// Whether `dispose` has run
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Inventory
    pub fn store(&self) -> &ZoneInventoryStore {
        &self.scene.store
    }

    /// Truck pose and state
    pub fn truck(&self) -> &Truck {
        &self.scene.truck
    }

    /// Current selections
    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    /// Settings in use
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Animation tasks in flight
    pub fn active_animations(&self) -> usize {
        self.scheduler.active_count()
    }

    /// Deferred callbacks waiting to fire
    pub fn pending_callbacks(&self) -> usize {
        self.deferred.len()
    }

    /// Load and dispatch chains still running
    pub fn active_chains(&self) -> usize {
        self.transport.active_chains()
    }

    /// Whether `product` has a render entity
    pub fn has_entity(&self, product: ProductId) -> bool {
        self.arena.products.contains_key(product)
    }

    /// The render backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The overlay
    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    fn ensure_live(&self) -> Result<(), SimulationError> {
        if self.disposed {
            Err(SimulationError::Disposed)
        } else {
            Ok(())
        }
    }

    fn reject(&mut self, warning: Warning) -> ActionOutcome {
        log::warn!("{}", warning);
        self.events.push(SimEvent::Warning(warning.clone()));
        ActionOutcome::Rejected(warning)
    }

    fn transport_parts(&mut self) -> (&mut TransportStateMachine, TransportContext<'_>) {
        (
            &mut self.transport,
            TransportContext {
                scene: &mut self.scene,
                scheduler: &mut self.scheduler,
                deferred: &mut self.deferred,
                events: &mut self.events,
            },
        )
    }

    /// Destroy entities of products that have left the scene
    fn release_retired(&mut self) -> Result<(), SimulationError> {
        let store = &self.scene.store;
        let retired: Vec<ProductId> = self
            .arena
            .products
            .keys()
            .filter(|id| store.ownership(*id) == Some(Ownership::Removed))
            .collect();
        for id in retired {
            if let Some(handle) = self.arena.products.remove(id) {
                log::trace!("Releasing entity {:?} of product {:?}", handle, id);
                self.backend.destroy_entity(handle)?;
            }
        }
        Ok(())
    }

    fn build_scene(&mut self) -> Result<(), SimulationError> {
        let half_width = FLOOR_WIDTH * 0.5;
        let half_depth = FLOOR_DEPTH * 0.5;
        let wall_y = WALL_HEIGHT * 0.5;
        let wall = EntityKind::Wall {
            width: FLOOR_WIDTH,
            height: WALL_HEIGHT,
        };

        let mut fixtures = vec![
            (
                EntityKind::Floor {
                    width: FLOOR_WIDTH,
                    depth: FLOOR_DEPTH,
                },
                Transform::default(),
            ),
            (wall, Transform::from_position(Vec3::new(0.0, wall_y, -half_depth))),
            (
                wall,
                Transform::from_position_yaw(Vec3::new(-half_width, wall_y, 0.0), constants::HALF_PI),
            ),
            (
                wall,
                Transform::from_position_yaw(Vec3::new(half_width, wall_y, 0.0), constants::HALF_PI),
            ),
        ];
        fixtures.extend(
            self.scene
                .store
                .zones()
                .map(|zone| (EntityKind::ShelfUnit(zone.index()), Transform::from_position(zone.position()))),
        );

        for (kind, transform) in fixtures {
            let handle = self.backend.create_entity(kind, &transform)?;
            self.arena.fixtures.push(handle);
        }
        self.arena.truck = Some(
            self.backend
                .create_entity(EntityKind::Truck, &self.scene.truck.transform())?,
        );
        Ok(())
    }

    fn create_labels(&mut self) -> Result<(), SimulationError> {
        for zone in ZoneIndex::all() {
            let label = self.overlay.create_label(zone, &zone.to_string())?;
            self.arena.labels.push((zone, label));
        }
        Ok(())
    }

    fn destroy_labels(&mut self) -> Result<(), SimulationError> {
        for (_, label) in self.arena.labels.drain(..) {
            self.overlay.destroy_label(label)?;
        }
        Ok(())
    }
}

impl<B: RenderBackend, O: OverlayLayer> Drop for WarehouseSimulation<B, O> {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            log::error!("Failed to dispose warehouse simulation: {}", e);
        }
    }
}
