//! Scene objects and the ordered registry that owns them.
//!
//! The registry is the single owner of every [`SceneObject`] and its render
//! node tree. Objects are addressed two ways: by positional index (what the
//! side panel and the document format use) and by a stable [`ObjectId`] (what
//! the keyframe store and the selection hold, so deleting one object never
//! reattaches another object's data).
//!
//! Every mutation queues a [`RegistryEvent`]; the engine drains them with
//! [`ObjectRegistry::take_events`] to keep the renderer in sync.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::node::{RenderHandle, RenderNode};
use crate::transform::Transform;

/// Stable identifier for a scene object.
pub type ObjectId = Uuid;

/// The kind of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Cube,
    Sphere,
    Cylinder,
    Torus,
    Pyramid,
    /// Backdrop sphere. At most one per scene, never pickable.
    Sky,
    /// Four joints joined by three bones.
    Rig,
}

impl ObjectKind {
    /// Every kind, in palette order.
    pub const ALL: [Self; 7] =
        [Self::Cube, Self::Sphere, Self::Cylinder, Self::Torus, Self::Pyramid, Self::Sky, Self::Rig];

    /// Human-readable label used for default names.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Cube => "Cube",
            Self::Sphere => "Sphere",
            Self::Cylinder => "Cylinder",
            Self::Torus => "Torus",
            Self::Pyramid => "Pyramid",
            Self::Sky => "Sky",
            Self::Rig => "Rig",
        }
    }
}

/// A placed object.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub name: String,
    pub transform: Transform,
    /// 24-bit `0xRRGGBB`.
    pub color: u32,
    node: RenderNode,
}

impl SceneObject {
    /// The object's node tree.
    #[must_use]
    pub fn node(&self) -> &RenderNode {
        &self.node
    }

    /// Handle of the root node, used for highlight and removal.
    #[must_use]
    pub fn render_handle(&self) -> RenderHandle {
        self.node.handle()
    }
}

/// A change to the registry the renderer has not seen yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    Added { id: ObjectId, handle: RenderHandle },
    Removed { id: ObjectId, handle: RenderHandle },
    Updated { id: ObjectId },
}

/// Ordered collection of scene objects.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: Vec<SceneObject>,
    owners: HashMap<RenderHandle, ObjectId>,
    next_handle: u64,
    events: Vec<RegistryEvent>,
}

impl ObjectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry whose render handles continue after this one's, so
    /// it can later [`replace`](Self::replace) it without handle reuse.
    #[must_use]
    pub fn successor(&self) -> Self {
        Self { next_handle: self.next_handle, ..Self::default() }
    }

    /// Append an object with a generated name. Returns its index.
    pub fn add(&mut self, kind: ObjectKind, transform: Transform, color: u32) -> usize {
        let name = self.default_name(kind);
        self.add_named(kind, name, transform, color)
    }

    /// Append an object with an explicit name. Returns its index.
    ///
    /// Adding a sky while one exists removes the existing sky first.
    pub fn add_named(&mut self, kind: ObjectKind, name: String, transform: Transform, color: u32) -> usize {
        if kind == ObjectKind::Sky
            && let Some(existing) = self.objects.iter().position(|o| o.kind == ObjectKind::Sky)
        {
            log::debug!("registry: replacing existing sky at index {existing}");
            self.remove(existing);
        }

        let mut next_handle = self.next_handle;
        let node = RenderNode::for_kind(kind, &mut || {
            let handle = RenderHandle(next_handle);
            next_handle += 1;
            handle
        });
        self.next_handle = next_handle;

        let id = Uuid::new_v4();
        for handle in node.handles() {
            self.owners.insert(handle, id);
        }
        let handle = node.handle();
        log::debug!("registry: added {kind:?} '{name}' ({id})");
        self.objects.push(SceneObject { id, kind, name, transform, color, node });
        self.events.push(RegistryEvent::Added { id, handle });
        self.objects.len() - 1
    }

    /// Remove the object at `index`, shifting later objects down by one.
    /// Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<SceneObject> {
        if index >= self.objects.len() {
            return None;
        }
        let obj = self.objects.remove(index);
        for handle in obj.node.handles() {
            self.owners.remove(&handle);
        }
        log::debug!("registry: removed '{}' ({}) from index {index}", obj.name, obj.id);
        self.events.push(RegistryEvent::Removed { id: obj.id, handle: obj.render_handle() });
        Some(obj)
    }

    /// Swap in `next` wholesale. The previous objects are released and their
    /// removal queued ahead of `next`'s own pending events.
    pub fn replace(&mut self, next: Self) {
        let old = std::mem::replace(self, next);
        let mut events = old.events;
        events.extend(
            old.objects
                .iter()
                .map(|o| RegistryEvent::Removed { id: o.id, handle: o.render_handle() }),
        );
        events.append(&mut self.events);
        self.events = events;
        self.next_handle = self.next_handle.max(old.next_handle);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(index)
    }

    #[must_use]
    pub fn get_by_id(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Current index of the object with `id`.
    #[must_use]
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Object owning the node with `handle`, at any depth of its tree.
    #[must_use]
    pub fn owner_of(&self, handle: RenderHandle) -> Option<ObjectId> {
        self.owners.get(&handle).copied()
    }

    #[must_use]
    pub fn all(&self) -> &[SceneObject] {
        &self.objects
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn set_transform(&mut self, index: usize, transform: Transform) -> bool {
        self.update(index, |o| o.transform = transform)
    }

    pub fn rename(&mut self, index: usize, name: String) -> bool {
        self.update(index, |o| o.name = name)
    }

    pub fn set_color(&mut self, index: usize, color: u32) -> bool {
        self.update(index, |o| o.color = color)
    }

    /// Replace the transform of the object with `id`, queuing an update.
    pub fn set_transform_by_id(&mut self, id: ObjectId, transform: Transform) -> bool {
        match self.index_of(id) {
            Some(index) => self.set_transform(index, transform),
            None => false,
        }
    }

    /// Drain the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    fn update(&mut self, index: usize, apply: impl FnOnce(&mut SceneObject)) -> bool {
        let Some(obj) = self.objects.get_mut(index) else {
            return false;
        };
        apply(obj);
        self.events.push(RegistryEvent::Updated { id: obj.id });
        true
    }

    fn default_name(&self, kind: ObjectKind) -> String {
        let mut n = self.objects.iter().filter(|o| o.kind == kind).count() + 1;
        loop {
            let name = format!("{} {n}", kind.label());
            if !self.objects.iter().any(|o| o.name == name) {
                return name;
            }
            n += 1;
        }
    }
}
