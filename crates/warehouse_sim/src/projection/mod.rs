//! World-to-screen placement of zone labels

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::inventory::{Zone, ZoneIndex};
use crate::render::{CameraView, Viewport};

/// Where a zone label goes this frame, in pixels from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    /// Labelled zone
    pub zone: ZoneIndex,
    /// Horizontal pixel position
    pub x: f32,
    /// Vertical pixel position, growing downwards
    pub y: f32,
    /// Anchor is in front of the camera and inside the depth range
    pub visible: bool,
}

/// Screen position of a projected point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// Horizontal pixel position
    pub x: f32,
    /// Vertical pixel position, growing downwards
    pub y: f32,
    /// In front of the camera and inside the depth range
    pub visible: bool,
}

/// Projects zone anchors through the camera every frame
///
/// Stateless apart from the anchor height; owns no overlay elements.
#[derive(Debug, Clone, Copy)]
pub struct SpatialProjector {
    label_height: f32,
}

impl SpatialProjector {
    /// Labels float `label_height` above each zone base
    pub fn new(label_height: f32) -> Self {
        Self { label_height }
    }

    /// World anchor of a zone's label
    pub fn anchor(&self, zone_base: Vec3) -> Vec3 {
        zone_base + Vec3::new(0.0, self.label_height, 0.0)
    }

    /// Project a world point to viewport pixels
    pub fn project_point(&self, world: Vec3, view_projection: &Mat4, viewport: Viewport) -> ScreenPoint {
        let clip = view_projection * Vec4::new(world.x, world.y, world.z, 1.0);
        if clip.w.abs() <= f32::EPSILON {
            return ScreenPoint {
                x: 0.0,
                y: 0.0,
                visible: false,
            };
        }
        let ndc = clip.xyz() / clip.w;
        ScreenPoint {
            x: (ndc.x * 0.5 + 0.5) * viewport.width,
            y: (-ndc.y * 0.5 + 0.5) * viewport.height,
            visible: clip.w > 0.0 && (-1.0..=1.0).contains(&ndc.z),
        }
    }

    /// Placements for every zone label, in zone order
    pub fn place_labels<'a>(
        &self,
        zones: impl IntoIterator<Item = &'a Zone>,
        view: &dyn CameraView,
    ) -> Vec<LabelPlacement> {
        let view_projection = view.view_projection();
        let viewport = view.viewport();
        zones
            .into_iter()
            .map(|zone| {
                let point = self.project_point(self.anchor(zone.position()), &view_projection, viewport);
                log::trace!("{} label at ({:.1}, {:.1})", zone.index(), point.x, point.y);
                LabelPlacement {
                    zone: zone.index(),
                    x: point.x,
                    y: point.y,
                    visible: point.visible,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::inventory::ZoneInventoryStore;
    use crate::render::{Camera, ViewportCamera};
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_maps_ndc_to_pixels() {
        let projector = SpatialProjector::new(0.0);
        let viewport = Viewport::new(800.0, 600.0);

        let center = projector.project_point(Vec3::zeros(), &Mat4::identity(), viewport);
        assert_relative_eq!(center.x, 400.0);
        assert_relative_eq!(center.y, 300.0);
        assert!(center.visible);

        let corner = projector.project_point(Vec3::new(0.5, -0.5, 0.0), &Mat4::identity(), viewport);
        assert_relative_eq!(corner.x, 600.0);
        assert_relative_eq!(corner.y, 450.0);
    }

    #[test]
    fn test_ndc_top_left_is_pixel_origin() {
        let projector = SpatialProjector::new(0.0);
        let point = projector.project_point(Vec3::new(-1.0, 1.0, 0.0), &Mat4::identity(), Viewport::new(1024.0, 768.0));
        assert_relative_eq!(point.x, 0.0);
        assert_relative_eq!(point.y, 0.0);
    }

    #[test]
    fn test_anchor_adds_label_height() {
        let projector = SpatialProjector::new(8.0);
        assert_relative_eq!(projector.anchor(Vec3::new(-16.0, 0.0, -12.0)), Vec3::new(-16.0, 8.0, -12.0));
    }

    #[test]
    fn test_default_camera_sees_every_zone_label() {
        let layout = LayoutConfig::default();
        let store = ZoneInventoryStore::new(layout.zone_positions());
        let view = ViewportCamera::new(Camera::default(), Viewport::new(1280.0, 720.0));
        let projector = SpatialProjector::new(layout.label_height);

        let placements = projector.place_labels(store.zones(), &view);
        assert_eq!(placements.len(), 5);
        for placement in &placements {
            assert!(placement.visible);
            assert!((0.0..=1280.0).contains(&placement.x));
            assert!((0.0..=720.0).contains(&placement.y));
        }
        // zones run along +X, which points right-ish from (20, 20, 20)
        assert!(placements[0].x < placements[4].x);
    }

    #[test]
    fn test_point_behind_camera_is_hidden() {
        let view = ViewportCamera::new(Camera::default(), Viewport::new(800.0, 600.0));
        let projector = SpatialProjector::new(0.0);
        let behind = projector.project_point(Vec3::new(40.0, 40.0, 40.0), &view.view_projection(), view.viewport());
        assert!(!behind.visible);
    }
}
