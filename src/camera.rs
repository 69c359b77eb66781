#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

use crate::consts::{
    DEFAULT_FOV_Y_DEG, DEFAULT_MAX_RADIUS, DEFAULT_MIN_RADIUS, DEFAULT_PHI, DEFAULT_RADIUS, DEFAULT_THETA,
    PHI_EPSILON, Z_FAR, Z_NEAR,
};
use crate::math::Ray;

/// Orbit camera looking at the world origin.
///
/// `theta` is the azimuth around +Y measured from +Z, `phi` the polar angle
/// from +Y. Both in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Viewport width / height.
    pub aspect: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            theta: DEFAULT_THETA,
            phi: DEFAULT_PHI,
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
            fov_y_deg: DEFAULT_FOV_Y_DEG,
            aspect: 1.0,
        }
    }
}

impl OrbitCamera {
    /// World-space eye position.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.radius * Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_deg.to_radians(), self.aspect, Z_NEAR, Z_FAR)
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Unproject normalized device coordinates (`[-1, 1]`, y up) into a world
    /// ray running from the near plane toward the far plane.
    #[must_use]
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let near = inv * ndc.extend(-1.0).extend(1.0);
        let far = inv * ndc.extend(1.0).extend(1.0);
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;
        Ray::new(near, far - near)
    }

    /// Project a world point into NDC. `None` when it lies behind the eye.
    #[must_use]
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some(clip.xyz() / clip.w)
    }

    /// Rotate around the origin by `delta` scaled by `sensitivity`.
    pub fn orbit(&mut self, delta: Vec2, sensitivity: f32) {
        self.theta -= delta.x * sensitivity;
        self.phi = (self.phi - delta.y * sensitivity).clamp(PHI_EPSILON, std::f32::consts::PI - PHI_EPSILON);
    }

    /// Step the radius by `step` in the direction of `delta`'s sign.
    pub fn zoom(&mut self, delta: f32, step: f32) {
        if delta == 0.0 || !delta.is_finite() {
            return;
        }
        self.radius = (self.radius + step * delta.signum()).clamp(self.min_radius, self.max_radius);
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }
}
