//! Scene editing and keyframe animation engine for a browser 3D editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! editor state: the ordered object registry, selection and the transform
//! gizmo, per-object keyframes and their playback, and the orbit camera. The
//! host JavaScript layer wires DOM events to the engine, reacts to the
//! returned [`engine::Action`]s, and supplies storage through
//! [`persistence::Persistence`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`scene`] | Object registry, object kinds and registry events |
//! | [`node`] | Render node trees and their pick volumes |
//! | [`transform`] | Position / Euler rotation / scale value type |
//! | [`camera`] | Orbit camera, projection and pointer rays |
//! | [`hit`] | Hit-testing: gizmo handles first, then objects |
//! | [`gizmo`] | Move and rotate handles and their drag math |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`keyframe`] | Keyframe store and interpolation |
//! | [`playback`] | Timeline and the cancellable playback tick |
//! | [`document`] | JSON scene document import and export |
//! | [`persistence`] | Async storage interface and save status |
//! | [`render`] | Renderer interface and the canvas wireframe renderer |
//! | [`config`] | Host-supplied editor configuration |
//! | [`error`] | Stable error codes shared by the error enums |
//! | [`math`] | Rays, planes, boxes and intersection tests |
//! | [`consts`] | Shared numeric constants (timeline, camera, gizmo sizes) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod document;
pub mod engine;
pub mod error;
pub mod gizmo;
pub mod hit;
pub mod input;
pub mod keyframe;
pub mod math;
pub mod node;
pub mod persistence;
pub mod playback;
pub mod render;
pub mod scene;
pub mod transform;
