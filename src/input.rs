//! Input model: mouse buttons, keys, wheel deltas, and the interaction state
//! machine.
//!
//! `InteractionState` is the gesture tracked between pointer-down and
//! pointer-up. Pointer positions are normalized device coordinates (`[-1, 1]`,
//! y up) so the core never needs the canvas size.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use glam::Vec2;

use crate::gizmo::GizmoAxis;
use crate::scene::ObjectId;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code. Unknown codes are ignored.
    #[must_use]
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"k"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Editor command bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    DeleteSelected,
    Deselect,
    MoveMode,
    RotateMode,
    CaptureKeyframe,
}

impl Key {
    /// Shortcut bound to this key, if any. Letter keys ignore case.
    #[must_use]
    pub fn shortcut(&self) -> Option<Shortcut> {
        match self.0.as_str() {
            "Delete" | "Backspace" => Some(Shortcut::DeleteSelected),
            "Escape" => Some(Shortcut::Deselect),
            "w" | "W" => Some(Shortcut::MoveMode),
            "e" | "E" => Some(Shortcut::RotateMode),
            "k" | "K" => Some(Shortcut::CaptureKeyframe),
            _ => None,
        }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Vertical scroll amount (positive = away from the user, zooms out).
    pub dy: f32,
}

/// Gesture in progress between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Secondary-button drag orbiting the camera.
    OrbitingCamera {
        /// Pointer position at the previous event.
        last: Vec2,
    },
    /// Dragging a gizmo handle of the selected object.
    DraggingGizmo {
        axis: GizmoAxis,
        /// Object being dragged.
        object: ObjectId,
        /// Offset along the axis between the grab point and the object.
        grab: f32,
        /// Pointer position at the previous event.
        last: Vec2,
    },
}

impl InteractionState {
    /// True while a gesture owns the pointer.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}
