//! Position / rotation / scale value type shared by every component.
//!
//! Rotation is stored as XYZ Euler angles in radians, which is what the
//! document format and the side panel expose. Conversions to quaternions and
//! model matrices live here so the rest of the crate never has to pick an
//! Euler order on its own.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Euler order used throughout the editor.
pub const EULER_ORDER: EulerRot = EulerRot::XYZ;

/// An object's placement in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// World position.
    pub position: Vec3,
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
    /// Per-axis scale factors.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self { position: Vec3::ZERO, rotation: Vec3::ZERO, scale: Vec3::ONE }
    }
}

impl Transform {
    /// Identity transform moved to `position`.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::default() }
    }

    /// Build from the `[x, y, z]` triples used by the document format.
    #[must_use]
    pub fn from_arrays(position: [f32; 3], rotation: [f32; 3], scale: [f32; 3]) -> Self {
        Self {
            position: Vec3::from_array(position),
            rotation: Vec3::from_array(rotation),
            scale: Vec3::from_array(scale),
        }
    }

    /// True when every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }

    /// Rotation as a quaternion.
    #[must_use]
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EULER_ORDER, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Model matrix `T * R * S`.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }

    /// Componentwise linear interpolation of all three channels, including
    /// the Euler angles.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.lerp(other.rotation, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }

    /// Like [`Transform::lerp`] but rotation follows the shortest arc between
    /// the two orientations.
    #[must_use]
    pub fn slerp(&self, other: &Self, t: f32) -> Self {
        let rotation = self.quat().slerp(other.quat(), t);
        let (x, y, z) = rotation.to_euler(EULER_ORDER);
        Self {
            position: self.position.lerp(other.position, t),
            rotation: Vec3::new(x, y, z),
            scale: self.scale.lerp(other.scale, t),
        }
    }
}
