//! Log-based render backend and overlay
//!
//! Stands in for a real renderer: entities and labels are tracked in maps
//! and every change goes to the log.

use std::collections::HashMap;

use warehouse_sim::prelude::*;

/// Frames between scene summaries at info level
const SUMMARY_INTERVAL: u64 = 60;

#[derive(Default)]
pub struct ConsoleBackend {
    next_id: u64,
    entities: HashMap<EntityHandle, (EntityKind, Transform)>,
    frames: u64,
}

impl ConsoleBackend {
    pub fn live_entities(&self) -> usize {
        self.entities.len()
    }
}

impl RenderBackend for ConsoleBackend {
    fn create_entity(&mut self, kind: EntityKind, transform: &Transform) -> Result<EntityHandle, RenderError> {
        self.next_id += 1;
        let handle = EntityHandle(self.next_id);
        log::debug!("create {:?} {:?} at {:?}", handle, kind, transform.position);
        self.entities.insert(handle, (kind, *transform));
        Ok(handle)
    }

    fn destroy_entity(&mut self, handle: EntityHandle) -> Result<(), RenderError> {
        let (kind, _) = self
            .entities
            .remove(&handle)
            .ok_or(RenderError::UnknownEntity(handle))?;
        log::debug!("destroy {:?} {:?}", handle, kind);
        Ok(())
    }

    fn set_transform(&mut self, handle: EntityHandle, transform: &Transform) -> Result<(), RenderError> {
        let entry = self
            .entities
            .get_mut(&handle)
            .ok_or(RenderError::UnknownEntity(handle))?;
        entry.1 = *transform;
        log::trace!("move {:?} to {:?}", handle, transform.position);
        Ok(())
    }

    fn submit_frame(&mut self) -> Result<(), RenderError> {
        self.frames += 1;
        if self.frames % SUMMARY_INTERVAL == 0 {
            let truck = self
                .entities
                .values()
                .find(|(kind, _)| *kind == EntityKind::Truck)
                .map(|(_, transform)| transform.position);
            log::info!(
                "frame {}: {} entities, truck at {:?}",
                self.frames,
                self.entities.len(),
                truck
            );
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ConsoleOverlay {
    next_id: u64,
    labels: HashMap<LabelHandle, (ZoneIndex, String)>,
}

impl OverlayLayer for ConsoleOverlay {
    fn create_label(&mut self, zone: ZoneIndex, text: &str) -> Result<LabelHandle, RenderError> {
        self.next_id += 1;
        let handle = LabelHandle(self.next_id);
        log::debug!("label {:?} '{}'", handle, text);
        self.labels.insert(handle, (zone, text.to_string()));
        Ok(handle)
    }

    fn update_label(&mut self, handle: LabelHandle, placement: &LabelPlacement) -> Result<(), RenderError> {
        let (_, text) = self.labels.get(&handle).ok_or(RenderError::UnknownLabel(handle))?;
        log::trace!(
            "'{}' at ({:.0}, {:.0}){}",
            text,
            placement.x,
            placement.y,
            if placement.visible { "" } else { " hidden" }
        );
        Ok(())
    }

    fn destroy_label(&mut self, handle: LabelHandle) -> Result<(), RenderError> {
        self.labels.remove(&handle).ok_or(RenderError::UnknownLabel(handle))?;
        Ok(())
    }
}
