//! Perspective camera and its slow dolly.

use crate::config::CameraConfig;
use crate::pointer::Ray;
use glam::{Mat4, Vec2, Vec3};

/// Everything needed to cast rays and build the view-projection matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width over height of the render surface.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraState {
    /// Camera at `position` looking at the origin with +Y up.
    pub fn looking_at_origin(position: Vec3, fov_y: f32, aspect: f32) -> Self {
        Self {
            position,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y,
            aspect,
            near: 0.1,
            far: 2000.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Orthonormal `(forward, right, up)` frame.
    ///
    /// `None` when the camera sits on its target or looks along its up vector.
    pub fn basis(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let forward = (self.target - self.position).try_normalize()?;
        let right = forward.cross(self.up).try_normalize()?;
        let up = right.cross(forward);
        Some((forward, right, up))
    }

    /// Ray from the eye through a point in normalized device coordinates.
    ///
    /// `ndc` spans `[-1, 1]` on both axes with +Y up, origin at view center.
    pub fn ray_through(&self, ndc: Vec2) -> Option<Ray> {
        let (forward, right, up) = self.basis()?;
        let half_height = (self.fov_y * 0.5).tan();
        let half_width = half_height * self.aspect;
        let direction = forward + right * (ndc.x * half_width) + up * (ndc.y * half_height);
        Ray::new(self.position, direction)
    }
}

/// Camera that bobs along Z around its resting distance, always facing the origin.
#[derive(Debug, Clone)]
pub struct CameraRig {
    config: CameraConfig,
    state: CameraState,
}

impl CameraRig {
    pub fn new(config: CameraConfig, aspect: f32) -> Self {
        let state = CameraState {
            position: Vec3::new(0.0, 0.0, config.distance),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
        };
        Self { config, state }
    }

    /// Current camera state.
    #[inline]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Move the camera to its dolly position for host time `now_ms`.
    ///
    /// Non-finite timestamps leave the camera where it is.
    pub fn update(&mut self, now_ms: f64) {
        if !now_ms.is_finite() {
            return;
        }
        let phase = now_ms * self.config.dolly_rate as f64;
        let z = self.config.distance + phase.sin() as f32 * self.config.dolly_amplitude;
        self.state.position = Vec3::new(0.0, 0.0, z);
        self.state.target = Vec3::ZERO;
    }

    /// Update the aspect ratio from a surface size in pixels.
    ///
    /// Zero-sized surfaces (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.state.aspect = width as f32 / height as f32;
        }
    }
}
