//! Rendering: the renderer interface and a 2D-canvas wireframe renderer.
//!
//! The engine talks to a [`Renderer`] only through commands: add, remove and
//! update drawables, toggle highlights, place the gizmo, move the camera.
//! Renderers perform no editor logic.
//!
//! [`CanvasRenderer`] keeps a retained copy of what it was told and draws it
//! as projected wireframes. It is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]; all fallible `Canvas2D` calls
//! propagate errors via `Result<(), JsValue>`.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::OrbitCamera;
use crate::gizmo::{self, Gizmo, GizmoAxis, GizmoMode};
use crate::node::{self, RenderHandle, RenderNode};
use crate::scene::{ObjectRegistry, RegistryEvent};
use crate::transform::Transform;

/// Stroke color of the selected object.
const HIGHLIGHT_COLOR: &str = "#FFB000";

/// Stroke color of the active gizmo handle.
const ACTIVE_HANDLE_COLOR: &str = "#FFFFFF";

/// Guide line color.
const GUIDE_COLOR: &str = "rgba(255, 255, 255, 0.15)";

/// Segments used to draw the rotate ring.
const RING_SEGMENTS: usize = 48;

/// What the renderer needs to draw a gizmo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoView {
    pub mode: GizmoMode,
    pub position: Vec3,
    pub active_axis: Option<GizmoAxis>,
}

impl From<&Gizmo> for GizmoView {
    fn from(g: &Gizmo) -> Self {
        Self { mode: g.mode, position: g.position, active_axis: g.active_axis }
    }
}

/// Camera placement handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub view_projection: Mat4,
}

impl From<&OrbitCamera> for CameraPose {
    fn from(cam: &OrbitCamera) -> Self {
        Self { eye: cam.eye(), view_projection: cam.view_projection() }
    }
}

/// Draw-side collaborator.
pub trait Renderer {
    fn add(&mut self, handle: RenderHandle, node: &RenderNode, transform: &Transform, color: u32);
    fn remove(&mut self, handle: RenderHandle);
    fn update(&mut self, handle: RenderHandle, transform: &Transform, color: u32);
    fn set_highlight(&mut self, handle: RenderHandle, on: bool);
    fn set_gizmo(&mut self, gizmo: Option<GizmoView>);
    fn set_camera(&mut self, pose: CameraPose);
}

/// Non-registry renderer updates queued by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderCommand {
    Highlight { handle: RenderHandle, on: bool },
    Gizmo(Option<GizmoView>),
    Camera(CameraPose),
}

impl RenderCommand {
    pub fn apply(self, renderer: &mut impl Renderer) {
        match self {
            Self::Highlight { handle, on } => renderer.set_highlight(handle, on),
            Self::Gizmo(view) => renderer.set_gizmo(view),
            Self::Camera(pose) => renderer.set_camera(pose),
        }
    }
}

/// Forward drained registry events to `renderer`.
///
/// An `Added` whose object was removed again before the flush is skipped;
/// its `Removed` still reaches the renderer, which ignores unknown handles.
pub fn apply_registry_events(renderer: &mut impl Renderer, registry: &ObjectRegistry, events: &[RegistryEvent]) {
    for event in events {
        match *event {
            RegistryEvent::Added { id, handle } => {
                if let Some(obj) = registry.get_by_id(id).filter(|o| o.render_handle() == handle) {
                    renderer.add(handle, obj.node(), &obj.transform, obj.color);
                }
            }
            RegistryEvent::Removed { handle, .. } => renderer.remove(handle),
            RegistryEvent::Updated { id } => {
                if let Some(obj) = registry.get_by_id(id) {
                    renderer.update(obj.render_handle(), &obj.transform, obj.color);
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Drawable {
    node: RenderNode,
    transform: Transform,
    color: u32,
    highlighted: bool,
}

/// Retained-mode wireframe renderer for a 2D canvas.
#[derive(Debug, Default)]
pub struct CanvasRenderer {
    drawables: BTreeMap<RenderHandle, Drawable>,
    gizmo: Option<GizmoView>,
    camera: Option<CameraPose>,
}

impl Renderer for CanvasRenderer {
    fn add(&mut self, handle: RenderHandle, node: &RenderNode, transform: &Transform, color: u32) {
        self.drawables
            .insert(handle, Drawable { node: node.clone(), transform: *transform, color, highlighted: false });
    }

    fn remove(&mut self, handle: RenderHandle) {
        self.drawables.remove(&handle);
    }

    fn update(&mut self, handle: RenderHandle, transform: &Transform, color: u32) {
        if let Some(d) = self.drawables.get_mut(&handle) {
            d.transform = *transform;
            d.color = color;
        }
    }

    fn set_highlight(&mut self, handle: RenderHandle, on: bool) {
        if let Some(d) = self.drawables.get_mut(&handle) {
            d.highlighted = on;
        }
    }

    fn set_gizmo(&mut self, gizmo: Option<GizmoView>) {
        self.gizmo = gizmo;
    }

    fn set_camera(&mut self, pose: CameraPose) {
        self.camera = Some(pose);
    }
}

impl CanvasRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of retained drawables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    #[must_use]
    pub fn is_highlighted(&self, handle: RenderHandle) -> bool {
        self.drawables.get(&handle).is_some_and(|d| d.highlighted)
    }

    #[must_use]
    pub fn gizmo(&self) -> Option<GizmoView> {
        self.gizmo
    }

    /// Draw every drawable and the gizmo.
    ///
    /// `width` and `height` are in CSS pixels. `dpr` is the device pixel ratio.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn draw(&self, ctx: &CanvasRenderingContext2d, width: f64, height: f64, dpr: f64) -> Result<(), JsValue> {
        ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
        ctx.clear_rect(0.0, 0.0, width, height);
        let Some(camera) = self.camera else {
            return Ok(());
        };
        let screen = Viewport { view_projection: camera.view_projection, width, height };

        ctx.set_line_width(1.0);
        for d in self.drawables.values() {
            let color = if d.highlighted { HIGHLIGHT_COLOR.to_string() } else { css_color(d.color) };
            ctx.set_stroke_style_str(&color);
            let model = d.transform.matrix();
            ctx.begin_path();
            for shape in d.node.shapes() {
                for (a, b) in node::wireframe(shape, &model) {
                    screen.segment(ctx, a, b);
                }
            }
            ctx.stroke();
        }

        if let Some(gizmo) = self.gizmo {
            draw_gizmo(ctx, &screen, gizmo);
        }
        Ok(())
    }
}

fn draw_gizmo(ctx: &CanvasRenderingContext2d, screen: &Viewport, view: GizmoView) {
    ctx.set_line_width(1.0);
    ctx.set_stroke_style_str(GUIDE_COLOR);
    ctx.begin_path();
    for (_, a, b) in gizmo::guide_lines(view.mode, view.position) {
        screen.segment(ctx, a, b);
    }
    ctx.stroke();

    ctx.set_line_width(3.0);
    for (axis, a, b) in gizmo::axis_segments(view.mode, view.position) {
        ctx.set_stroke_style_str(handle_color(axis, view.active_axis));
        ctx.begin_path();
        screen.segment(ctx, a, b);
        ctx.stroke();
    }

    if view.mode == GizmoMode::Rotate {
        ctx.set_stroke_style_str(handle_color(GizmoAxis::RotateRing, view.active_axis));
        ctx.begin_path();
        for (a, b) in ring_points(view.position) {
            screen.segment(ctx, a, b);
        }
        ctx.stroke();
    }
}

fn handle_color(axis: GizmoAxis, active: Option<GizmoAxis>) -> &'static str {
    if active == Some(axis) {
        return ACTIVE_HANDLE_COLOR;
    }
    match axis {
        GizmoAxis::X => "#E5484D",
        GizmoAxis::Y => "#46A758",
        GizmoAxis::Z => "#3E63DD",
        GizmoAxis::RotateRing => "#F5D90A",
    }
}

/// Segments of the rotate ring around `center` in the XZ plane.
fn ring_points(center: Vec3) -> Vec<(Vec3, Vec3)> {
    let point = |k: usize| {
        let a = std::f32::consts::TAU * k as f32 / RING_SEGMENTS as f32;
        let (s, c) = a.sin_cos();
        center + Vec3::new(c, 0.0, s) * crate::consts::GIZMO_RING_RADIUS
    };
    (0..RING_SEGMENTS).map(|k| (point(k), point(k + 1))).collect()
}

/// `0xRRGGBB` as a CSS hex color.
#[must_use]
pub fn css_color(color: u32) -> String {
    format!("#{:06X}", color & crate::consts::MAX_COLOR)
}

/// World-to-screen projection for one frame.
struct Viewport {
    view_projection: Mat4,
    width: f64,
    height: f64,
}

impl Viewport {
    /// Screen position of a world point in CSS pixels, `None` behind the eye.
    fn to_screen(&self, p: Vec3) -> Option<(f64, f64)> {
        let clip = self.view_projection * p.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let x = f64::from(clip.x / clip.w);
        let y = f64::from(clip.y / clip.w);
        Some(((x + 1.0) * 0.5 * self.width, (1.0 - y) * 0.5 * self.height))
    }

    /// Add a segment to the current path. Segments crossing behind the eye
    /// are dropped rather than clipped.
    fn segment(&self, ctx: &CanvasRenderingContext2d, a: Vec3, b: Vec3) {
        if let (Some((ax, ay)), Some((bx, by))) = (self.to_screen(a), self.to_screen(b)) {
            ctx.move_to(ax, ay);
            ctx.line_to(bx, by);
        }
    }
}
