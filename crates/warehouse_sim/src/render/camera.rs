//! Perspective camera and viewport
//!
//! Matrices follow the right-handed, Y-up OpenGL convention from
//! [`Mat4Ext`]; NDC depth is in [-1, 1].

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// 3D perspective camera
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera looking at the origin with +Y up
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Width / height of the viewport
    /// * `near` - Near plane distance (must be > 0)
    /// * `far` - Far plane distance (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: utils::deg_to_rad(fov_degrees),
            aspect,
            near,
            far,
        }
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Point the camera at `target` with the given up vector
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Update aspect ratio after a viewport change
    ///
    /// Only changes larger than 0.01 are logged to keep resize drags quiet.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// World to camera space
    pub fn get_view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// Camera to clip space
    pub fn get_projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect, self.near, self.far)
    }

    /// World to clip space, `P × V`
    pub fn get_view_projection_matrix(&self) -> Mat4 {
        self.get_projection_matrix() * self.get_view_matrix()
    }
}

impl Default for Camera {
    /// Warehouse overview: 75° FOV from (20, 20, 20) towards the origin
    fn default() -> Self {
        Self::perspective(Vec3::new(20.0, 20.0, 20.0), 75.0, 16.0 / 9.0, 0.1, 1000.0)
    }
}

/// Drawable area in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width / height, 1.0 for a degenerate viewport
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Anything that can supply the current view to the simulation
pub trait CameraView {
    /// World to clip space
    fn view_projection(&self) -> Mat4;

    /// Current viewport
    fn viewport(&self) -> Viewport;
}

/// A camera bound to a viewport; resizing keeps the aspect in sync
#[derive(Debug, Clone)]
pub struct ViewportCamera {
    /// The camera
    pub camera: Camera,
    viewport: Viewport,
}

impl ViewportCamera {
    /// Bind `camera` to `viewport`, adopting the viewport's aspect
    pub fn new(mut camera: Camera, viewport: Viewport) -> Self {
        camera.aspect = viewport.aspect();
        Self { camera, viewport }
    }

    /// Apply a window resize. Returns `false` when the size did not change.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.camera.set_aspect_ratio(viewport.aspect());
        true
    }
}

impl CameraView for ViewportCamera {
    fn view_projection(&self) -> Mat4 {
        self.camera.get_view_projection_matrix()
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}
