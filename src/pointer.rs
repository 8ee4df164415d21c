//! Pointer input: surface pixels to NDC, and NDC to a world-space force origin.
//!
//! The host reports raw client coordinates together with the bounding
//! rectangle of the render surface. [`client_to_ndc`] maps them into
//! normalized device coordinates, [`PointerProjector::project`] casts a camera
//! ray through that point onto a reference plane, and [`PointerState`] keeps
//! the last valid result so the pointer stays put between events and across
//! degenerate projections.
//!
//! ```ignore
//! let rect = SurfaceRect::new(0.0, 0.0, 1280.0, 720.0);
//! pointer.update_from_client(Vec2::new(640.0, 360.0), rect, camera, &Plane::Z0);
//! field.step(dt, pointer.world_position());
//! ```

use crate::camera::CameraState;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Below this `|normal · direction|` a ray is treated as parallel to a plane.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Bounding rectangle of the render surface in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle anchored at the client origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    fn is_usable(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Map client pixels to normalized device coordinates.
///
/// `x` runs from -1 at the left edge to 1 at the right edge; `y` is flipped so
/// it runs from 1 at the top to -1 at the bottom. Returns `None` for an empty
/// rectangle or non-finite input.
pub fn client_to_ndc(client: Vec2, rect: SurfaceRect) -> Option<Vec2> {
    if !client.is_finite() || !rect.is_usable() {
        return None;
    }
    let x = ((client.x - rect.left) / rect.width) * 2.0 - 1.0;
    let y = -((client.y - rect.top) / rect.height) * 2.0 + 1.0;
    Some(Vec2::new(x, y))
}

/// Plane of points `p` with `normal · p = offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vec3,
    pub offset: f32,
}

impl Plane {
    /// The `z = 0` plane.
    pub const Z0: Plane = Plane {
        normal: Vec3::Z,
        offset: 0.0,
    };

    pub const fn new(normal: Vec3, offset: f32) -> Self {
        Self { normal, offset }
    }

    /// Finite, non-zero normal and finite offset.
    pub fn is_valid(&self) -> bool {
        self.normal.is_finite() && self.offset.is_finite() && self.normal.length_squared() > 0.0
    }

    /// Signed distance scaled by `|normal|`.
    #[inline]
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.offset
    }
}

/// Half-line from `origin` along the unit vector `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Normalizes `direction`; `None` if it has no length or is not finite.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        if !origin.is_finite() {
            return None;
        }
        Some(Self {
            origin,
            direction: direction.try_normalize()?,
        })
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// First point where the ray meets `plane`.
    ///
    /// `None` when the ray runs parallel to the plane or the plane lies behind
    /// the origin. A ray starting on the plane hits it at its origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let start = plane.distance_to(self.origin);
        if start == 0.0 {
            return Some(self.origin);
        }
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < PARALLEL_EPSILON * plane.normal.length() {
            return None;
        }
        let t = -start / denom;
        if t < 0.0 || !t.is_finite() {
            return None;
        }
        Some(self.at(t))
    }
}

/// Stateless NDC to world projection.
pub struct PointerProjector;

impl PointerProjector {
    /// World point under `ndc` on `plane`, seen from `camera`.
    ///
    /// `None` means no usable intersection: a degenerate camera, a ray
    /// parallel to the plane, or a plane behind the camera. Callers keep their
    /// previous pointer position in that case.
    pub fn project(ndc: Vec2, camera: &CameraState, plane: &Plane) -> Option<Vec3> {
        if !ndc.is_finite() {
            return None;
        }
        let ray = camera.ray_through(ndc)?;
        ray.intersect_plane(plane).filter(|p| p.is_finite())
    }
}

/// Last known pointer position in world space.
///
/// Only updated when a new input event projects cleanly; otherwise the
/// previous value is reused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    ndc: Vec2,
    world_position: Vec3,
    updates: u64,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerState {
    /// Pointer at the view center on the origin.
    pub fn new() -> Self {
        Self {
            ndc: Vec2::ZERO,
            world_position: Vec3::ZERO,
            updates: 0,
        }
    }

    /// Pointer fixed at a world position.
    pub fn at(world_position: Vec3) -> Self {
        Self {
            world_position,
            ..Self::new()
        }
    }

    /// Last valid world position.
    #[inline]
    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    /// Last valid normalized device coordinates.
    #[inline]
    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }

    /// Number of accepted updates so far.
    #[inline]
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Project `ndc` and store the result. Returns `false` and keeps the
    /// previous value when the projection has no valid intersection.
    pub fn update_from_ndc(&mut self, ndc: Vec2, camera: &CameraState, plane: &Plane) -> bool {
        match PointerProjector::project(ndc, camera, plane) {
            Some(world) => {
                self.ndc = ndc;
                self.world_position = world;
                self.updates += 1;
                true
            }
            None => {
                log::warn!(
                    "pointer at {:?} missed the reference plane; keeping previous position",
                    ndc
                );
                false
            }
        }
    }

    /// Map client pixels through the surface rect, then project.
    pub fn update_from_client(
        &mut self,
        client: Vec2,
        rect: SurfaceRect,
        camera: &CameraState,
        plane: &Plane,
    ) -> bool {
        match client_to_ndc(client, rect) {
            Some(ndc) => self.update_from_ndc(ndc, camera, plane),
            None => {
                log::warn!("rejected pointer input {:?} for surface {:?}", client, rect);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_camera() -> CameraState {
        CameraState::looking_at_origin(Vec3::new(0.0, 0.0, 60.0), 60f32.to_radians(), 2.0)
    }

    #[test]
    fn test_client_to_ndc_reference_points() {
        let rect = SurfaceRect::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(client_to_ndc(Vec2::new(100.0, 50.0), rect), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(client_to_ndc(Vec2::new(0.0, 0.0), rect), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(client_to_ndc(Vec2::new(200.0, 100.0), rect), Some(Vec2::new(1.0, -1.0)));
    }

    #[test]
    fn test_client_to_ndc_respects_offset() {
        let rect = SurfaceRect::new(20.0, 10.0, 200.0, 100.0);
        assert_eq!(client_to_ndc(Vec2::new(120.0, 60.0), rect), Some(Vec2::ZERO));
    }

    #[test]
    fn test_client_to_ndc_rejects_bad_input() {
        let rect = SurfaceRect::new(0.0, 0.0, 0.0, 100.0);
        assert!(client_to_ndc(Vec2::new(1.0, 1.0), rect).is_none());
        let rect = SurfaceRect::new(0.0, 0.0, 200.0, 100.0);
        assert!(client_to_ndc(Vec2::new(f32::NAN, 1.0), rect).is_none());
    }

    #[test]
    fn test_center_projects_to_origin() {
        let p = PointerProjector::project(Vec2::ZERO, &default_camera(), &Plane::Z0).unwrap();
        assert!(p.length() < 1e-4);
    }

    #[test]
    fn test_edge_projects_to_frustum_edge() {
        let cam = default_camera();
        let p = PointerProjector::project(Vec2::new(0.0, 1.0), &cam, &Plane::Z0).unwrap();
        let expected_y = 60.0 * (30f32.to_radians()).tan();
        assert!((p.y - expected_y).abs() < 1e-3);
        assert!(p.x.abs() < 1e-4);
        assert!(p.z.abs() < 1e-4);
    }

    #[test]
    fn test_parallel_ray_has_no_intersection() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::X).unwrap();
        assert!(ray.intersect_plane(&Plane::Z0).is_none());
    }

    #[test]
    fn test_plane_behind_ray_has_no_intersection() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).unwrap();
        assert!(ray.intersect_plane(&Plane::Z0).is_none());
    }

    #[test]
    fn test_offset_plane() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 10.0), Vec3::NEG_Z).unwrap();
        let hit = ray.intersect_plane(&Plane::new(Vec3::Z, 4.0)).unwrap();
        assert!((hit - Vec3::new(1.0, 2.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_parallel_projection_keeps_previous_pointer() {
        // Camera looking along +X: the center ray never meets z = 0.
        let camera = CameraState {
            position: Vec3::new(0.0, 0.0, 60.0),
            target: Vec3::new(100.0, 0.0, 60.0),
            up: Vec3::Y,
            fov_y: 1.0,
            aspect: 1.0,
            near: 0.1,
            far: 2000.0,
        };
        let mut pointer = PointerState::at(Vec3::new(3.0, 4.0, 0.0));
        let accepted = pointer.update_from_ndc(Vec2::ZERO, &camera, &Plane::Z0);
        assert!(!accepted);
        assert_eq!(pointer.world_position(), Vec3::new(3.0, 4.0, 0.0));
        assert!(pointer.world_position().is_finite());
    }

    #[test]
    fn test_sticky_pointer_between_events() {
        let camera = default_camera();
        let rect = SurfaceRect::new(0.0, 0.0, 200.0, 100.0);
        let mut pointer = PointerState::new();
        assert!(pointer.update_from_client(Vec2::new(150.0, 50.0), rect, &camera, &Plane::Z0));
        let first = pointer.world_position();
        assert!(first.x > 0.0);

        let bad = Vec2::new(f32::INFINITY, 0.0);
        assert!(!pointer.update_from_client(bad, rect, &camera, &Plane::Z0));
        assert_eq!(pointer.world_position(), first);
        assert_eq!(pointer.updates(), 1);
    }
}
