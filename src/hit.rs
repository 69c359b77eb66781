#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::gizmo::{Gizmo, GizmoAxis};
use crate::math::Ray;
use crate::node::RenderHandle;
use crate::scene::{ObjectId, ObjectRegistry};

/// What the pointer ray landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitPart {
    /// A gizmo handle of the current selection.
    GizmoHandle(GizmoAxis),
    /// A scene object, reached through one of its leaves.
    Object { id: ObjectId, index: usize, handle: RenderHandle },
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub part: HitPart,
    /// Ray parameter of the hit.
    pub t: f32,
}

/// Test what lies under `ray`, checking the gizmo's handles before any scene
/// object. Among objects the nearest hit wins, ties going to the lower index.
#[must_use]
pub fn hit_test(ray: &Ray, registry: &ObjectRegistry, gizmo: Option<&Gizmo>) -> Option<Hit> {
    if let Some((axis, t)) = gizmo.and_then(|g| g.hit_test(ray)) {
        return Some(Hit { part: HitPart::GizmoHandle(axis), t });
    }
    pick_object(ray, registry)
}

/// Nearest scene object under `ray`, ignoring gizmos.
#[must_use]
pub fn pick_object(ray: &Ray, registry: &ObjectRegistry) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for obj in registry.all() {
        let Some(node_hit) = obj.node().intersect(ray, &obj.transform.matrix()) else {
            continue;
        };
        // Strictly nearer only, so equal distances keep the earlier index.
        if best.is_some_and(|b| node_hit.t >= b.t) {
            continue;
        }
        let Some(id) = registry.owner_of(node_hit.handle) else {
            continue;
        };
        let Some(index) = registry.index_of(id) else {
            continue;
        };
        best = Some(Hit { part: HitPart::Object { id, index, handle: obj.render_handle() }, t: node_hit.t });
    }
    best
}
