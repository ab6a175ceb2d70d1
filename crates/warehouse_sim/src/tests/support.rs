//! Recording test doubles for the render seams

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crate::config::SimulationConfig;
use crate::foundation::math::{Mat4, Transform};
use crate::inventory::ZoneIndex;
use crate::projection::LabelPlacement;
use crate::render::{
    Camera, CameraView, EntityHandle, EntityKind, LabelHandle, OverlayLayer, RenderBackend, RenderError, Viewport,
    ViewportCamera,
};
use crate::{FrameLoop, WarehouseSimulation};

/// Everything the doubles saw, shared so it outlives the simulation
#[derive(Debug, Default)]
pub struct RenderLog {
    next_id: u64,
    pub entities: HashMap<EntityHandle, (EntityKind, Transform)>,
    pub labels: HashMap<LabelHandle, (ZoneIndex, String, Option<LabelPlacement>)>,
    pub entities_created: usize,
    pub labels_created: usize,
    pub labels_destroyed: usize,
    pub frames: usize,
}

impl RenderLog {
    fn issue(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn count_kind(&self, wanted: impl Fn(&EntityKind) -> bool) -> usize {
        self.entities.values().filter(|(kind, _)| wanted(kind)).count()
    }

    pub fn truck_transform(&self) -> Option<Transform> {
        self.entities
            .values()
            .find(|(kind, _)| *kind == EntityKind::Truck)
            .map(|(_, transform)| *transform)
    }
}

pub type SharedLog = Rc<RefCell<RenderLog>>;

pub struct RecordingBackend(pub SharedLog);

impl RenderBackend for RecordingBackend {
    fn create_entity(&mut self, kind: EntityKind, transform: &Transform) -> Result<EntityHandle, RenderError> {
        let mut log = self.0.borrow_mut();
        let handle = EntityHandle(log.issue());
        log.entities.insert(handle, (kind, *transform));
        log.entities_created += 1;
        Ok(handle)
    }

    fn destroy_entity(&mut self, handle: EntityHandle) -> Result<(), RenderError> {
        self.0
            .borrow_mut()
            .entities
            .remove(&handle)
            .map(|_| ())
            .ok_or(RenderError::UnknownEntity(handle))
    }

    fn set_transform(&mut self, handle: EntityHandle, transform: &Transform) -> Result<(), RenderError> {
        let mut log = self.0.borrow_mut();
        let entry = log.entities.get_mut(&handle).ok_or(RenderError::UnknownEntity(handle))?;
        entry.1 = *transform;
        Ok(())
    }

    fn submit_frame(&mut self) -> Result<(), RenderError> {
        self.0.borrow_mut().frames += 1;
        Ok(())
    }
}

pub struct RecordingOverlay(pub SharedLog);

impl OverlayLayer for RecordingOverlay {
    fn create_label(&mut self, zone: ZoneIndex, text: &str) -> Result<LabelHandle, RenderError> {
        let mut log = self.0.borrow_mut();
        let handle = LabelHandle(log.issue());
        log.labels.insert(handle, (zone, text.to_string(), None));
        log.labels_created += 1;
        Ok(handle)
    }

    fn update_label(&mut self, handle: LabelHandle, placement: &LabelPlacement) -> Result<(), RenderError> {
        let mut log = self.0.borrow_mut();
        let entry = log.labels.get_mut(&handle).ok_or(RenderError::UnknownLabel(handle))?;
        entry.2 = Some(*placement);
        Ok(())
    }

    fn destroy_label(&mut self, handle: LabelHandle) -> Result<(), RenderError> {
        let mut log = self.0.borrow_mut();
        log.labels.remove(&handle).ok_or(RenderError::UnknownLabel(handle))?;
        log.labels_destroyed += 1;
        Ok(())
    }
}

/// View with a fixed matrix
pub struct FixedView {
    pub view_projection: Mat4,
    pub viewport: Viewport,
}

impl CameraView for FixedView {
    fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

pub type TestSimulation = WarehouseSimulation<RecordingBackend, RecordingOverlay>;

/// Simulation, its render log, a frame driver and a camera
pub struct Harness {
    pub sim: TestSimulation,
    pub log: SharedLog,
    pub frames: FrameLoop,
    pub view: ViewportCamera,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        let log = SharedLog::default();
        let sim = WarehouseSimulation::new(
            config,
            RecordingBackend(Rc::clone(&log)),
            RecordingOverlay(Rc::clone(&log)),
        )
        .unwrap();
        Self {
            sim,
            log,
            frames: FrameLoop::new(),
            view: ViewportCamera::new(Camera::default(), Viewport::new(1280.0, 720.0)),
        }
    }

    /// Step in 100ms frames
    pub fn run_ms(&mut self, total: u64) {
        self.frames
            .run_for(
                Duration::from_millis(total),
                Duration::from_millis(100),
                &mut self.sim,
                &self.view,
            )
            .unwrap();
    }
}

pub fn zone(index: usize) -> ZoneIndex {
    ZoneIndex::new(index).unwrap()
}
