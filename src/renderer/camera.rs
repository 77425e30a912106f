//! The rendering camera.
//!
//! A camera has a position and an orientation determined by a target to
//! look at and an "up" vector, plus projection properties. The derived
//! matrices and the view frustum are computed lazily and cached; any setter
//! invalidates the cache.

use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

use std::cell::Cell;

/// The projection type of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    Perspective,
    Orthographic,
}

/// The camera properties.
#[derive(Debug, Clone, Copy)]
pub struct CameraProperties {
    /// The projection type.
    pub kind: CameraKind,
    /// World-space position of the camera.
    pub position: Vec3,
    /// World-space target the camera looks at.
    pub target: Vec3,
    /// World-space vector corresponding to "up" on the camera.
    pub up: Vec3,
    /// Vertical field of view in radians (perspective cameras only).
    pub fov: f32,
    /// Width, in world units, of the camera (orthographic cameras only).
    pub width: f32,
    /// Aspect ratio (width / height) of the render viewport.
    pub aspect: f32,
    /// Distance of the near clip plane.
    pub znear: f32,
    /// Distance of the far clip plane.
    pub zfar: f32,
}

/// Matrices derived from the camera properties.
#[derive(Debug, Clone, Copy)]
pub struct CameraMatrices {
    /// World-to-camera-space matrix.
    pub view: Mat4,
    /// Inverse of `view`.
    pub view_inv: Mat4,
    /// Camera-to-screen-space matrix.
    pub projection: Mat4,
    /// `projection * view`.
    pub view_proj: Mat4,
    /// Inverse of `view_proj`.
    pub view_proj_inv: Mat4,
}

/// View frustum as six inward-facing planes (left, right, bottom, top,
/// near, far), each as (normal, d) with `normal·p + d >= 0` inside.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extracts the frustum planes from a view-projection matrix
    /// (Gribb-Hartmann).
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];
        let mut planes = [
            rows[3] + rows[0], // left
            rows[3] - rows[0], // right
            rows[3] + rows[1], // bottom
            rows[3] - rows[1], // top
            rows[3] + rows[2], // near
            rows[3] - rows[2], // far
        ];
        for plane in &mut planes {
            let length = plane.xyz().length();
            if length > 1e-6 {
                *plane /= length;
            } else {
                *plane = Vec4::ZERO;
            }
        }
        Self { planes }
    }

    /// Sphere-frustum intersection test.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        for plane in &self.planes {
            if *plane == Vec4::ZERO {
                continue;
            }
            if plane.xyz().dot(center) + plane.w < -radius {
                return false;
            }
        }
        true
    }
}

/// A camera used for rendering.
#[derive(Debug, Clone)]
pub struct Camera {
    properties: CameraProperties,
    matrices: Cell<Option<CameraMatrices>>,
    frustum: Cell<Option<Frustum>>,
}

impl Camera {
    #[must_use]
    pub fn new(properties: CameraProperties) -> Self {
        Self {
            properties,
            matrices: Cell::new(None),
            frustum: Cell::new(None),
        }
    }

    #[must_use]
    pub fn properties(&self) -> &CameraProperties {
        &self.properties
    }

    /// Replaces all camera properties at once.
    pub fn set_properties(&mut self, properties: CameraProperties) {
        self.properties = properties;
        self.clear_cache();
    }

    #[must_use]
    pub fn kind(&self) -> CameraKind {
        self.properties.kind
    }

    pub fn set_kind(&mut self, kind: CameraKind) {
        self.properties.kind = kind;
        self.clear_cache();
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.properties.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.properties.position = position;
        self.clear_cache();
    }

    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.properties.target
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.properties.target = target;
        self.clear_cache();
    }

    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.properties.up
    }

    pub fn set_up(&mut self, up: Vec3) {
        self.properties.up = up;
        self.clear_cache();
    }

    #[must_use]
    pub fn fov(&self) -> f32 {
        self.properties.fov
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.properties.fov = fov;
        self.clear_cache();
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.properties.width
    }

    pub fn set_width(&mut self, width: f32) {
        self.properties.width = width;
        self.clear_cache();
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.properties.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.properties.aspect = aspect;
        self.clear_cache();
    }

    #[must_use]
    pub fn znear(&self) -> f32 {
        self.properties.znear
    }

    pub fn set_znear(&mut self, znear: f32) {
        self.properties.znear = znear;
        self.clear_cache();
    }

    #[must_use]
    pub fn zfar(&self) -> f32 {
        self.properties.zfar
    }

    pub fn set_zfar(&mut self, zfar: f32) {
        self.properties.zfar = zfar;
        self.clear_cache();
    }

    /// Returns the derived matrices, computing them if the cache is stale.
    #[must_use]
    pub fn matrices(&self) -> CameraMatrices {
        if let Some(matrices) = self.matrices.get() {
            return matrices;
        }
        let matrices = Self::create_matrices(&self.properties);
        self.matrices.set(Some(matrices));
        matrices
    }

    /// Returns the view frustum, computing it if the cache is stale.
    #[must_use]
    pub fn frustum(&self) -> Frustum {
        if let Some(frustum) = self.frustum.get() {
            return frustum;
        }
        let frustum = Frustum::from_matrix(self.matrices().view_proj);
        self.frustum.set(Some(frustum));
        frustum
    }

    /// Unprojects a normalized-device-coordinate point to the world-space
    /// positions where it meets the near and far planes.
    #[must_use]
    pub fn unproject(&self, coords: glam::Vec2) -> (Vec3, Vec3) {
        let m = self.matrices();
        (
            m.view_proj_inv.project_point3(Vec3::new(coords.x, coords.y, 0.0)),
            m.view_proj_inv.project_point3(Vec3::new(coords.x, coords.y, 1.0)),
        )
    }

    fn create_matrices(properties: &CameraProperties) -> CameraMatrices {
        let view = Mat4::look_at_rh(properties.position, properties.target, properties.up);
        // The projection flips the depth axis so that clip-space Z grows
        // more negative with camera distance; the renderer's view-distance
        // computation relies on that.
        let projection = match properties.kind {
            CameraKind::Perspective => Mat4::perspective_lh(
                properties.fov,
                properties.aspect,
                properties.znear,
                properties.zfar,
            ),
            CameraKind::Orthographic => {
                let width = properties.width;
                let height = width / properties.aspect;
                Mat4::orthographic_lh(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    properties.znear,
                    properties.zfar,
                )
            }
        };
        let view_proj = projection * view;
        CameraMatrices {
            view,
            view_inv: view.inverse(),
            projection,
            view_proj,
            view_proj_inv: view_proj.inverse(),
        }
    }

    fn clear_cache(&mut self) {
        self.matrices.set(None);
        self.frustum.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(CameraProperties {
            kind: CameraKind::Perspective,
            position: Vec3::new(0.0, 0.0, -10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_2,
            width: 0.0,
            aspect: 1.0,
            znear: 1.0,
            zfar: 100.0,
        })
    }

    #[test]
    fn setters_invalidate_the_matrix_cache() {
        let mut camera = camera();
        let before = camera.matrices().view_proj;
        camera.set_position(Vec3::new(0.0, 0.0, -20.0));
        let after = camera.matrices().view_proj;
        assert_ne!(before, after);
    }

    #[test]
    fn view_distance_grows_with_camera_distance() {
        let camera = camera();
        let m = camera.matrices();
        let near = (m.view_proj * Vec4::new(0.0, 0.0, 2.0, 1.0)).z;
        let far = (m.view_proj * Vec4::new(0.0, 0.0, 50.0, 1.0)).z;
        assert!(-far > -near);
    }
}
