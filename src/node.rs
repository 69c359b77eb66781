//! Render node trees: what each scene object looks like and how it is picked.
//!
//! Every object owns one [`RenderNode`] tree. Simple primitives are a single
//! [`RenderNode::Leaf`]; the rig is a [`RenderNode::Composite`] of joint and
//! bone leaves. Each node carries its own [`RenderHandle`] so a picked leaf can
//! be traced back to its owning object through the registry's handle map
//! instead of walking parent pointers.
//!
//! Picking works on bounding volumes in each leaf's local space: the world ray
//! is carried into local space by the inverse model matrix without being
//! renormalized, so ray parameters from different leaves stay comparable.

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;

use glam::{Mat4, Vec3};

use crate::consts::{RIG_BONE_HALF_WIDTH, RIG_JOINT_RADIUS, SKY_RADIUS};
use crate::math::{self, Aabb, Ray};
use crate::scene::ObjectKind;

/// Opaque reference to a drawable, owned by the object registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u64);

/// Pickable bounding volume of a leaf, in leaf-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Volume {
    /// Box centered on the leaf origin.
    Box { half: Vec3 },
    /// Sphere centered on the leaf origin.
    Sphere { radius: f32 },
    /// Y-aligned capped cylinder centered on the leaf origin.
    Cylinder { radius: f32, half_height: f32 },
}

/// Geometry of a single drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    /// Bounding volume used for picking and wireframes.
    pub volume: Volume,
    /// Placement of the leaf relative to the owning object's transform.
    pub local: Mat4,
    /// Backdrops (the sky) are drawn but never picked.
    pub pickable: bool,
}

impl Shape {
    fn at(volume: Volume, offset: Vec3) -> Self {
        Self { volume, local: Mat4::from_translation(offset), pickable: true }
    }
}

/// A drawable node: either one shape or a group of child nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Leaf { handle: RenderHandle, shape: Shape },
    Composite { handle: RenderHandle, children: Vec<RenderNode> },
}

/// Result of testing a ray against a node tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeHit {
    /// Ray parameter of the hit.
    pub t: f32,
    /// Handle of the leaf that was hit.
    pub handle: RenderHandle,
}

/// Named joint offsets of the rig, hip first.
const RIG_JOINTS: [Vec3; 4] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(0.0, 0.6, 0.0),
    Vec3::new(0.0, 1.1, 0.0),
    Vec3::new(0.0, 1.35, 0.0),
];

impl RenderNode {
    /// Build the node tree for an object kind, drawing handles from `next`.
    pub fn for_kind(kind: ObjectKind, next: &mut impl FnMut() -> RenderHandle) -> Self {
        let unit = Vec3::splat(0.5);
        let shape = match kind {
            ObjectKind::Cube | ObjectKind::Pyramid => Shape::at(Volume::Box { half: unit }, Vec3::ZERO),
            ObjectKind::Sphere => Shape::at(Volume::Sphere { radius: 0.5 }, Vec3::ZERO),
            ObjectKind::Cylinder => Shape::at(Volume::Cylinder { radius: 0.5, half_height: 0.5 }, Vec3::ZERO),
            ObjectKind::Torus => Shape::at(Volume::Box { half: Vec3::new(0.7, 0.2, 0.7) }, Vec3::ZERO),
            ObjectKind::Sky => Shape {
                volume: Volume::Sphere { radius: SKY_RADIUS },
                local: Mat4::IDENTITY,
                pickable: false,
            },
            ObjectKind::Rig => return Self::rig(next),
        };
        Self::Leaf { handle: next(), shape }
    }

    /// Four joints joined by three bones.
    fn rig(next: &mut impl FnMut() -> RenderHandle) -> Self {
        let handle = next();
        let mut children = Vec::with_capacity(RIG_JOINTS.len() * 2 - 1);
        for joint in RIG_JOINTS {
            children.push(Self::Leaf {
                handle: next(),
                shape: Shape::at(Volume::Sphere { radius: RIG_JOINT_RADIUS }, joint),
            });
        }
        for pair in RIG_JOINTS.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let half_len = (to - from).length() * 0.5;
            children.push(Self::Leaf {
                handle: next(),
                shape: Shape::at(
                    Volume::Box { half: Vec3::new(RIG_BONE_HALF_WIDTH, half_len, RIG_BONE_HALF_WIDTH) },
                    (from + to) * 0.5,
                ),
            });
        }
        Self::Composite { handle, children }
    }

    /// This node's own handle.
    #[must_use]
    pub fn handle(&self) -> RenderHandle {
        match self {
            Self::Leaf { handle, .. } | Self::Composite { handle, .. } => *handle,
        }
    }

    /// Every handle in the tree, root first.
    #[must_use]
    pub fn handles(&self) -> Vec<RenderHandle> {
        let mut out = Vec::new();
        self.collect_handles(&mut out);
        out
    }

    fn collect_handles(&self, out: &mut Vec<RenderHandle>) {
        out.push(self.handle());
        if let Self::Composite { children, .. } = self {
            for child in children {
                child.collect_handles(out);
            }
        }
    }

    /// Every leaf shape in the tree, depth first.
    #[must_use]
    pub fn shapes(&self) -> Vec<&Shape> {
        match self {
            Self::Leaf { shape, .. } => vec![shape],
            Self::Composite { children, .. } => children.iter().flat_map(Self::shapes).collect(),
        }
    }

    /// Nearest pickable leaf hit by `ray` when the tree is placed by `model`.
    #[must_use]
    pub fn intersect(&self, ray: &Ray, model: &Mat4) -> Option<NodeHit> {
        match self {
            Self::Leaf { handle, shape } => {
                if !shape.pickable {
                    return None;
                }
                let world = *model * shape.local;
                if world.determinant().abs() <= f32::EPSILON {
                    return None;
                }
                let local_ray = ray.transformed(&world.inverse());
                let t = match shape.volume {
                    Volume::Box { half } => Aabb::from_half_extents(half).intersect_ray(&local_ray),
                    Volume::Sphere { radius } => math::intersect_sphere(&local_ray, Vec3::ZERO, radius),
                    Volume::Cylinder { radius, half_height } => {
                        math::intersect_cylinder(&local_ray, radius, half_height)
                    }
                }?;
                Some(NodeHit { t, handle: *handle })
            }
            Self::Composite { children, .. } => children
                .iter()
                .filter_map(|child| child.intersect(ray, model))
                .min_by(|a, b| a.t.total_cmp(&b.t)),
        }
    }
}

/// Corner index pairs of the twelve box edges, matching [`Aabb::corners`].
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

const RING_SEGMENTS: usize = 24;

/// Line segments outlining a shape in world space, for wireframe drawing.
#[must_use]
pub fn wireframe(shape: &Shape, model: &Mat4) -> Vec<(Vec3, Vec3)> {
    let world = *model * shape.local;
    let ring = |radius: f32, y: f32, plane: usize| -> Vec<(Vec3, Vec3)> {
        (0..RING_SEGMENTS)
            .map(|i| {
                let point = |k: usize| {
                    let a = std::f32::consts::TAU * k as f32 / RING_SEGMENTS as f32;
                    let (s, c) = a.sin_cos();
                    match plane {
                        0 => Vec3::new(c * radius, y, s * radius),
                        1 => Vec3::new(c * radius, s * radius, 0.0),
                        _ => Vec3::new(0.0, c * radius, s * radius),
                    }
                };
                (world.transform_point3(point(i)), world.transform_point3(point(i + 1)))
            })
            .collect()
    };

    match shape.volume {
        Volume::Box { half } => {
            let c = Aabb::from_half_extents(half).corners();
            BOX_EDGES
                .iter()
                .map(|&(a, b)| (world.transform_point3(c[a]), world.transform_point3(c[b])))
                .collect()
        }
        Volume::Sphere { radius } => {
            let mut lines = ring(radius, 0.0, 0);
            lines.extend(ring(radius, 0.0, 1));
            lines.extend(ring(radius, 0.0, 2));
            lines
        }
        Volume::Cylinder { radius, half_height } => {
            let mut lines = ring(radius, half_height, 0);
            lines.extend(ring(radius, -half_height, 0));
            for (x, z) in [(radius, 0.0), (-radius, 0.0), (0.0, radius), (0.0, -radius)] {
                lines.push((
                    world.transform_point3(Vec3::new(x, half_height, z)),
                    world.transform_point3(Vec3::new(x, -half_height, z)),
                ));
            }
            lines
        }
    }
}
