//! Per-object keyframe tracks and deterministic sampling.
//!
//! Tracks are keyed by stable [`ObjectId`], so deleting or reordering objects
//! never moves keyframes onto a different object. Each track is a sparse
//! `frame -> Transform` map holding value snapshots; an object's track is
//! dropped as soon as its last keyframe is removed.

#[cfg(test)]
#[path = "keyframe_test.rs"]
mod keyframe_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scene::ObjectId;
use crate::transform::Transform;

/// How rotation is blended between two keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationInterpolation {
    /// Componentwise lerp of the Euler angles.
    #[default]
    Euler,
    /// Shortest-arc quaternion slerp.
    Quaternion,
}

/// All keyframes in the scene.
#[derive(Debug, Clone, Default)]
pub struct KeyframeStore {
    tracks: BTreeMap<ObjectId, BTreeMap<u32, Transform>>,
    rotation: RotationInterpolation,
}

impl KeyframeStore {
    #[must_use]
    pub fn new(rotation: RotationInterpolation) -> Self {
        Self { tracks: BTreeMap::new(), rotation }
    }

    #[must_use]
    pub fn rotation_interpolation(&self) -> RotationInterpolation {
        self.rotation
    }

    /// Store a snapshot of `transform` at `frame`, overwriting any existing one.
    pub fn capture(&mut self, object: ObjectId, frame: u32, transform: Transform) {
        self.tracks.entry(object).or_default().insert(frame, transform);
    }

    /// Remove the keyframe at `frame`. Returns whether one existed.
    pub fn delete(&mut self, object: ObjectId, frame: u32) -> bool {
        let Some(track) = self.tracks.get_mut(&object) else {
            return false;
        };
        let removed = track.remove(&frame).is_some();
        if track.is_empty() {
            self.tracks.remove(&object);
        }
        removed
    }

    /// Transform of `object` at `frame`.
    ///
    /// Holds the single keyframe when there is only one, clamps outside the
    /// keyed range, and interpolates linearly between the bracketing pair
    /// otherwise. Stored snapshots are returned exactly at keyed frames.
    #[must_use]
    pub fn sample(&self, object: ObjectId, frame: u32) -> Option<Transform> {
        let track = self.tracks.get(&object)?;
        if let Some(exact) = track.get(&frame) {
            return Some(*exact);
        }
        let before = track.range(..frame).next_back();
        let after = track.range(frame..).next();
        match (before, after) {
            (Some((&f0, a)), Some((&f1, b))) => {
                let t = (frame - f0) as f32 / (f1 - f0) as f32;
                Some(match self.rotation {
                    RotationInterpolation::Euler => a.lerp(b, t),
                    RotationInterpolation::Quaternion => a.slerp(b, t),
                })
            }
            (Some((_, only)), None) | (None, Some((_, only))) => Some(*only),
            (None, None) => None,
        }
    }

    #[must_use]
    pub fn has_keyframes(&self, object: ObjectId) -> bool {
        self.tracks.contains_key(&object)
    }

    /// Keyed frames of `object`, ascending.
    #[must_use]
    pub fn frames(&self, object: ObjectId) -> Vec<u32> {
        self.tracks.get(&object).map(|track| track.keys().copied().collect()).unwrap_or_default()
    }

    #[must_use]
    pub fn keyframe_count(&self, object: ObjectId) -> usize {
        self.tracks.get(&object).map_or(0, BTreeMap::len)
    }

    /// Drop every keyframe of `object`.
    pub fn remove_object(&mut self, object: ObjectId) -> bool {
        self.tracks.remove(&object).is_some()
    }

    /// Objects with at least two keyframes, i.e. the ones playback moves.
    pub fn animated_objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.tracks.iter().filter(|(_, track)| track.len() >= 2).map(|(id, _)| *id)
    }

    /// Every track, for export.
    pub fn tracks(&self) -> impl Iterator<Item = (ObjectId, &BTreeMap<u32, Transform>)> {
        self.tracks.iter().map(|(id, track)| (*id, track))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
