//! Geometry primitives for picking and gizmo drags.
//!
//! Everything here is pure and allocation-free: rays, planes, boxes and
//! spheres plus the intersection routines the picker and the gizmo need.
//! Ray parameters are returned as `t` values along the ray direction; callers
//! compare them to find the nearest hit.

#[cfg(test)]
#[path = "math_test.rs"]
mod math_test;

use glam::{Mat4, Vec3};

use crate::consts::PLANE_PARALLEL_EPSILON;

/// A ray in world or local space.
///
/// Rays built with [`Ray::new`] have a unit direction. Rays produced by
/// [`Ray::transformed`] keep the scaled direction so that `t` values stay
/// comparable with the original world-space ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray with a normalized direction.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize_or_zero() }
    }

    /// Point at parameter `t` along the ray.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transform the ray by `matrix` without renormalizing the direction.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }

    /// Parameter of the point on the ray closest to `point` (may be negative).
    #[must_use]
    pub fn closest_t(&self, point: Vec3) -> f32 {
        let len_sq = self.direction.length_squared();
        if len_sq == 0.0 {
            return 0.0;
        }
        (point - self.origin).dot(self.direction) / len_sq
    }
}

/// An infinite plane `normal · p = distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    /// Plane through `point` with the given normal (normalized here).
    #[must_use]
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self { normal, distance: normal.dot(point) }
    }

    /// Ray parameter of the intersection, if the ray is not parallel and the
    /// hit lies in front of the origin.
    #[must_use]
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < PLANE_PARALLEL_EPSILON {
            return None;
        }
        let t = (self.distance - self.normal.dot(ray.origin)) / denom;
        (t >= 0.0).then_some(t)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered on the origin with the given half extents.
    #[must_use]
    pub fn from_half_extents(half: Vec3) -> Self {
        Self { min: -half, max: half }
    }

    /// Slab test. Returns the entry parameter, or the exit parameter when the
    /// ray starts inside the box.
    #[must_use]
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;

        let t_near = t0.min(t1).max_element();
        let t_far = t0.max(t1).min_element();

        if t_near.is_nan() || t_far.is_nan() {
            return None;
        }
        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// The eight corners, for wireframe drawing.
    #[must_use]
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ]
    }
}

/// Ray-sphere intersection for a sphere centered at `center`.
///
/// Works with unnormalized ray directions. Returns the nearest non-negative
/// parameter.
#[must_use]
pub fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.direction.length_squared();
    if a == 0.0 {
        return None;
    }
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = half_b * half_b - a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_d = disc.sqrt();
    let near = (-half_b - sqrt_d) / a;
    if near >= 0.0 {
        return Some(near);
    }
    let far = (-half_b + sqrt_d) / a;
    (far >= 0.0).then_some(far)
}

/// Ray intersection with a Y-aligned capped cylinder centered on the origin.
///
/// Works with unnormalized ray directions. Returns the nearest non-negative
/// parameter over the side wall and both caps.
#[must_use]
pub fn intersect_cylinder(ray: &Ray, radius: f32, half_height: f32) -> Option<f32> {
    let (o, d) = (ray.origin, ray.direction);
    let r_sq = radius * radius;
    let mut best: Option<f32> = None;
    let mut consider = |t: f32| {
        if t >= 0.0 && best.is_none_or(|b| t < b) {
            best = Some(t);
        }
    };

    let a = d.x * d.x + d.z * d.z;
    if a > 0.0 {
        let half_b = o.x * d.x + o.z * d.z;
        let c = o.x * o.x + o.z * o.z - r_sq;
        let disc = half_b * half_b - a * c;
        if disc >= 0.0 {
            let sqrt_d = disc.sqrt();
            for t in [(-half_b - sqrt_d) / a, (-half_b + sqrt_d) / a] {
                if (o.y + t * d.y).abs() <= half_height {
                    consider(t);
                }
            }
        }
    }

    if d.y != 0.0 {
        for cap in [-half_height, half_height] {
            let t = (cap - o.y) / d.y;
            let p = o + d * t;
            if p.x * p.x + p.z * p.z <= r_sq {
                consider(t);
            }
        }
    }

    best
}

/// Closest approach between a ray and the segment `p0..p1`.
///
/// Returns `(t, distance)` where `t` is the ray parameter of the closest point
/// (clamped to be non-negative) and `distance` the gap between the two closest
/// points.
#[must_use]
pub fn ray_segment_distance(ray: &Ray, p0: Vec3, p1: Vec3) -> (f32, f32) {
    let u = ray.direction;
    let v = p1 - p0;
    let w = ray.origin - p0;

    let a = u.dot(u);
    let b = u.dot(v);
    let c = v.dot(v);
    let d = u.dot(w);
    let e = v.dot(w);
    let denom = a * c - b * b;

    // Segment parameter in [0, 1] and ray parameter >= 0.
    let mut s = if denom.abs() > f32::EPSILON { ((b * d - a * e) / -denom).clamp(0.0, 1.0) } else { 0.0 };
    let mut t = if a > 0.0 { (b * s - d) / a } else { 0.0 };
    if t < 0.0 {
        t = 0.0;
        s = if c > 0.0 { (e / c).clamp(0.0, 1.0) } else { 0.0 };
    }

    let on_ray = ray.point_at(t);
    let on_segment = p0 + v * s;
    (t, on_ray.distance(on_segment))
}
