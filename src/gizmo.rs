//! Transform handles attached to the selected object.
//!
//! A [`Gizmo`] exists only while something is selected. In move mode it shows
//! three axis handles (segments along +X, +Y, +Z) plus long guide lines; in
//! rotate mode a single ring in the XZ plane. Handles are picked against the
//! pointer ray before any scene object.
//!
//! Drags are expressed as pure functions over a [`Transform`]:
//!
//! - [`begin_move`] records where along the axis the handle was grabbed.
//! - [`move_step`] intersects the pointer ray with a plane that contains the
//!   axis and faces the camera, and writes only that axis component.
//! - [`rotate_step`] turns horizontal pointer travel into yaw.

#[cfg(test)]
#[path = "gizmo_test.rs"]
mod gizmo_test;

use glam::{Vec2, Vec3};

use crate::consts::{
    GIZMO_AXIS_LENGTH, GIZMO_GUIDE_LENGTH, GIZMO_PICK_RADIUS, GIZMO_RING_RADIUS, GIZMO_RING_TOLERANCE,
    PLANE_PARALLEL_EPSILON,
};
use crate::math::{self, Plane, Ray};
use crate::scene::ObjectId;
use crate::transform::Transform;

/// Which handles the gizmo shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    #[default]
    Move,
    Rotate,
}

/// A pickable gizmo handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
    /// The rotate-mode ring around Y.
    RotateRing,
}

impl GizmoAxis {
    /// Unit direction of a move axis. The ring rotates about +Y.
    #[must_use]
    pub fn direction(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y | Self::RotateRing => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// Gizmo attached to one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gizmo {
    pub mode: GizmoMode,
    pub target: ObjectId,
    /// World position, kept equal to the target's position.
    pub position: Vec3,
    /// Handle currently being dragged.
    pub active_axis: Option<GizmoAxis>,
}

impl Gizmo {
    #[must_use]
    pub fn new(mode: GizmoMode, target: ObjectId, position: Vec3) -> Self {
        Self { mode, target, position, active_axis: None }
    }

    /// Axis handle segments as `(axis, start, end)`. Empty in rotate mode.
    #[must_use]
    pub fn axis_segments(&self) -> Vec<(GizmoAxis, Vec3, Vec3)> {
        axis_segments(self.mode, self.position)
    }

    /// Long, non-pickable guide lines through the gizmo origin.
    #[must_use]
    pub fn guide_lines(&self) -> Vec<(GizmoAxis, Vec3, Vec3)> {
        guide_lines(self.mode, self.position)
    }

    /// Handle under `ray` and the ray parameter of the hit. Nearest wins.
    #[must_use]
    pub fn hit_test(&self, ray: &Ray) -> Option<(GizmoAxis, f32)> {
        match self.mode {
            GizmoMode::Move => self
                .axis_segments()
                .into_iter()
                .filter_map(|(axis, start, end)| {
                    let (t, distance) = math::ray_segment_distance(ray, start, end);
                    (distance <= GIZMO_PICK_RADIUS).then_some((axis, t))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1)),
            GizmoMode::Rotate => {
                let plane = Plane::from_normal_and_point(Vec3::Y, self.position);
                let t = plane.intersect_ray(ray)?;
                let offset = ray.point_at(t) - self.position;
                let radial = Vec2::new(offset.x, offset.z).length();
                ((radial - GIZMO_RING_RADIUS).abs() <= GIZMO_RING_TOLERANCE).then_some((GizmoAxis::RotateRing, t))
            }
        }
    }
}

const MOVE_AXES: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

/// Move-handle segments of a gizmo in `mode` at `position`.
#[must_use]
pub fn axis_segments(mode: GizmoMode, position: Vec3) -> Vec<(GizmoAxis, Vec3, Vec3)> {
    if mode != GizmoMode::Move {
        return Vec::new();
    }
    MOVE_AXES.into_iter().map(|axis| (axis, position, position + axis.direction() * GIZMO_AXIS_LENGTH)).collect()
}

/// Guide lines of a gizmo in `mode` at `position`, reaching both ways.
#[must_use]
pub fn guide_lines(mode: GizmoMode, position: Vec3) -> Vec<(GizmoAxis, Vec3, Vec3)> {
    if mode != GizmoMode::Move {
        return Vec::new();
    }
    MOVE_AXES
        .into_iter()
        .map(|axis| {
            let reach = axis.direction() * GIZMO_GUIDE_LENGTH;
            (axis, position - reach, position + reach)
        })
        .collect()
}

/// Plane through `position` containing `axis` and facing `eye` as squarely as
/// possible. `None` when the view runs along the axis.
#[must_use]
pub fn drag_plane(axis: GizmoAxis, eye: Vec3, position: Vec3) -> Option<Plane> {
    let dir = axis.direction();
    let to_eye = eye - position;
    let normal = to_eye - dir * to_eye.dot(dir);
    if normal.length_squared() < PLANE_PARALLEL_EPSILON {
        return None;
    }
    Some(Plane::from_normal_and_point(normal, position))
}

/// Grab offset along `axis` between the pointer hit and the object's position.
/// Zero when the drag plane is degenerate or missed.
#[must_use]
pub fn begin_move(axis: GizmoAxis, ray: &Ray, eye: Vec3, position: Vec3) -> f32 {
    let dir = axis.direction();
    drag_plane(axis, eye, position)
        .and_then(|plane| plane.intersect_ray(ray))
        .map_or(0.0, |t| (ray.point_at(t) - position).dot(dir))
}

/// One move-drag step. Returns the new transform with only the `axis`
/// component of the position replaced, or `None` to skip the step.
#[must_use]
pub fn move_step(axis: GizmoAxis, ray: &Ray, eye: Vec3, transform: &Transform, grab: f32) -> Option<Transform> {
    let plane = drag_plane(axis, eye, transform.position)?;
    let t = plane.intersect_ray(ray)?;
    let along = ray.point_at(t).dot(axis.direction()) - grab;
    if !along.is_finite() {
        return None;
    }
    let mut next = *transform;
    match axis {
        GizmoAxis::X => next.position.x = along,
        GizmoAxis::Y => next.position.y = along,
        GizmoAxis::Z => next.position.z = along,
        GizmoAxis::RotateRing => return None,
    }
    Some(next)
}

/// One rotate-drag step: yaw by horizontal NDC travel.
#[must_use]
pub fn rotate_step(transform: &Transform, dx_ndc: f32, sensitivity: f32) -> Transform {
    let mut next = *transform;
    next.rotation.y += dx_ndc * sensitivity;
    next
}
