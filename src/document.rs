//! The persisted scene document.
//!
//! A document is plain JSON: an ordered object list plus keyframes keyed by
//! decimal object index and decimal frame number. Indices exist only here;
//! export maps stable ids to current registry indices and import maps them
//! back onto the ids of freshly created objects.
//!
//! Import is all-or-nothing. [`Document::instantiate`] validates everything
//! and builds a complete new registry and keyframe store before the caller
//! swaps them in, so a bad document never leaves a half-loaded scene.

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_COLOR;
use crate::error::ErrorCode;
use crate::keyframe::{KeyframeStore, RotationInterpolation};
use crate::scene::{ObjectKind, ObjectRegistry, SceneObject};
use crate::transform::Transform;

/// Reasons a document is rejected.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("object {index}: {field} is not finite")]
    NonFinite { index: usize, field: &'static str },
    #[error("object {index}: color {color:#08x} is not 24-bit rgb")]
    ColorOutOfRange { index: usize, color: u32 },
    #[error("document contains more than one sky")]
    DuplicateSky,
    #[error("keyframes reference object {key:?} but the document has {count} objects")]
    ObjectKeyOutOfRange { key: String, count: usize },
    #[error("keyframe key {key:?} is not a frame number")]
    InvalidFrameKey { key: String },
    #[error("keyframe for object {index} at frame {frame} is not finite")]
    NonFiniteKeyframe { index: usize, frame: u32 },
    #[error("keyframe key {key:?} repeats an earlier key with the same number")]
    DuplicateKey { key: String },
}

impl ErrorCode for DocumentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Json(_) => "E_DOC_JSON",
            Self::NonFinite { .. } => "E_DOC_NON_FINITE",
            Self::ColorOutOfRange { .. } => "E_DOC_COLOR",
            Self::DuplicateSky => "E_DOC_DUPLICATE_SKY",
            Self::ObjectKeyOutOfRange { .. } => "E_DOC_OBJECT_KEY",
            Self::InvalidFrameKey { .. } => "E_DOC_FRAME_KEY",
            Self::NonFiniteKeyframe { .. } => "E_DOC_KEYFRAME_NON_FINITE",
            Self::DuplicateKey { .. } => "E_DOC_DUPLICATE_KEY",
        }
    }
}

/// A whole scene as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub objects: Vec<DocObject>,
    /// Object index -> frame number -> transform, all keys decimal strings.
    #[serde(default)]
    pub keyframes: BTreeMap<String, BTreeMap<String, DocTransform>>,
}

/// One stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocObject {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub name: String,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub color: u32,
}

/// One stored keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocTransform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl From<&Transform> for DocTransform {
    fn from(t: &Transform) -> Self {
        Self { position: t.position.to_array(), rotation: t.rotation.to_array(), scale: t.scale.to_array() }
    }
}

impl From<&DocTransform> for Transform {
    fn from(t: &DocTransform) -> Self {
        Transform::from_arrays(t.position, t.rotation, t.scale)
    }
}

impl From<&SceneObject> for DocObject {
    fn from(obj: &SceneObject) -> Self {
        let t = DocTransform::from(&obj.transform);
        Self {
            kind: obj.kind,
            name: obj.name.clone(),
            position: t.position,
            rotation: t.rotation,
            scale: t.scale,
            color: obj.color,
        }
    }
}

impl DocObject {
    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform::from_arrays(self.position, self.rotation, self.scale)
    }
}

impl Document {
    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_str(json)?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Export the registry and keyframes, mapping ids to current indices.
    #[must_use]
    pub fn snapshot(registry: &ObjectRegistry, keyframes: &KeyframeStore) -> Self {
        let objects = registry.all().iter().map(DocObject::from).collect();
        let mut doc_keys = BTreeMap::new();
        for (id, track) in keyframes.tracks() {
            // Tracks of deleted objects are pruned on delete; skip any stragglers.
            let Some(index) = registry.index_of(id) else {
                continue;
            };
            let frames = track.iter().map(|(frame, t)| (frame.to_string(), DocTransform::from(t))).collect();
            doc_keys.insert(index.to_string(), frames);
        }
        Self { objects, keyframes: doc_keys }
    }

    /// Check every rule a loadable document must satisfy.
    pub fn validate(&self) -> Result<(), DocumentError> {
        self.validate_objects()?;
        self.parsed_keyframes().map(|_| ())
    }

    fn validate_objects(&self) -> Result<(), DocumentError> {
        let mut skies = 0usize;
        for (index, obj) in self.objects.iter().enumerate() {
            for (field, value) in [("position", obj.position), ("rotation", obj.rotation), ("scale", obj.scale)] {
                if !value.iter().all(|c| c.is_finite()) {
                    return Err(DocumentError::NonFinite { index, field });
                }
            }
            if obj.color > MAX_COLOR {
                return Err(DocumentError::ColorOutOfRange { index, color: obj.color });
            }
            if obj.kind == ObjectKind::Sky {
                skies += 1;
                if skies > 1 {
                    return Err(DocumentError::DuplicateSky);
                }
            }
        }
        Ok(())
    }

    /// Build a fresh registry (continuing `base`'s handle sequence) and
    /// keyframe store from this document. Nothing is modified on error.
    pub fn instantiate(
        &self,
        base: &ObjectRegistry,
        rotation: RotationInterpolation,
    ) -> Result<(ObjectRegistry, KeyframeStore), DocumentError> {
        self.validate_objects()?;
        let tracks = self.parsed_keyframes()?;

        let mut registry = base.successor();
        let mut ids = Vec::with_capacity(self.objects.len());
        for obj in &self.objects {
            let index = registry.add_named(obj.kind, obj.name.clone(), obj.transform(), obj.color);
            if let Some(created) = registry.get(index) {
                ids.push(created.id);
            }
        }

        let mut keyframes = KeyframeStore::new(rotation);
        for (index, frames) in tracks {
            let Some(&id) = ids.get(index) else {
                continue;
            };
            for (frame, t) in frames {
                keyframes.capture(id, frame, t);
            }
        }
        Ok((registry, keyframes))
    }

    /// Keyframes with numeric keys, checked against the object list.
    ///
    /// Keys that differ as strings but parse to the same number (`"7"` and
    /// `"07"`) are rejected rather than letting one overwrite the other.
    fn parsed_keyframes(&self) -> Result<BTreeMap<usize, BTreeMap<u32, Transform>>, DocumentError> {
        let count = self.objects.len();
        let mut out = BTreeMap::new();
        for (key, frames) in &self.keyframes {
            let index = match key.parse::<usize>() {
                Ok(index) if index < count => index,
                _ => return Err(DocumentError::ObjectKeyOutOfRange { key: key.clone(), count }),
            };
            let mut parsed = BTreeMap::new();
            for (frame_key, doc_t) in frames {
                let frame =
                    frame_key.parse::<u32>().map_err(|_| DocumentError::InvalidFrameKey { key: frame_key.clone() })?;
                let t = Transform::from(doc_t);
                if !t.is_finite() {
                    return Err(DocumentError::NonFiniteKeyframe { index, frame });
                }
                if parsed.insert(frame, t).is_some() {
                    return Err(DocumentError::DuplicateKey { key: frame_key.clone() });
                }
            }
            if out.insert(index, parsed).is_some() {
                return Err(DocumentError::DuplicateKey { key: key.clone() });
            }
        }
        Ok(out)
    }
}
