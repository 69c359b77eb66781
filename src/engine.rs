use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;
use gloo_timers::callback::Interval;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::OrbitCamera;
use crate::config::{ConfigError, EditorConfig};
use crate::consts::{MAX_COLOR, TICK_INTERVAL_MS};
use crate::document::{Document, DocumentError};
use crate::error::ErrorCode;
use crate::gizmo::{self, Gizmo, GizmoAxis, GizmoMode};
use crate::hit::{self, HitPart};
use crate::input::{Button, InteractionState, Key, Shortcut, WheelDelta};
use crate::keyframe::KeyframeStore;
use crate::math::Ray;
use crate::node::RenderHandle;
use crate::persistence::{Ack, Persistence, PersistenceError, ProjectRef, SaveStatus};
use crate::playback::{TickHandle, Timeline};
use crate::render::{self, CameraPose, CanvasRenderer, GizmoView, RenderCommand, Renderer};
use crate::scene::{ObjectId, ObjectKind, ObjectRegistry};
use crate::transform::Transform;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from engine operations for the host to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RenderNeeded,
    /// Objects were added, removed or edited; refresh the object list.
    RegistryChanged,
    SelectionChanged { index: Option<usize> },
    KeyframesChanged { id: ObjectId },
    FrameChanged(u32),
    PlaybackChanged { playing: bool },
    SaveFinished { ok: bool },
    LoadFinished { ok: bool },
}

/// The selected object and the handle highlighted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    id: ObjectId,
    handle: RenderHandle,
}

/// Core engine state: all editor logic that doesn't depend on the browser.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub config: EditorConfig,
    pub registry: ObjectRegistry,
    pub keyframes: KeyframeStore,
    pub timeline: Timeline,
    pub camera: OrbitCamera,
    gizmo_mode: GizmoMode,
    selection: Option<Selection>,
    gizmo: Option<Gizmo>,
    interaction: InteractionState,
    keyframe_panel: Vec<u32>,
    render_queue: Vec<RenderCommand>,
    save_status: SaveStatus,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine state seeded from a validated host configuration.
    #[must_use]
    pub fn with_config(config: EditorConfig) -> Self {
        let camera = OrbitCamera {
            radius: config.initial_radius,
            theta: config.initial_theta,
            phi: config.initial_phi,
            min_radius: config.min_radius,
            max_radius: config.max_radius,
            fov_y_deg: config.fov_y_deg,
            ..OrbitCamera::default()
        };
        Self {
            registry: ObjectRegistry::new(),
            keyframes: KeyframeStore::new(config.rotation_interpolation),
            timeline: Timeline::new(config.max_frame),
            render_queue: vec![RenderCommand::Camera(CameraPose::from(&camera))],
            camera,
            gizmo_mode: GizmoMode::default(),
            selection: None,
            gizmo: None,
            interaction: InteractionState::default(),
            keyframe_panel: Vec::new(),
            save_status: SaveStatus::default(),
            config,
        }
    }

    // --- Objects ---

    /// Append an object from the palette. Adding a sky replaces the current one.
    /// Colors above `0xFFFFFF` are rejected.
    pub fn add_object(&mut self, kind: ObjectKind, transform: Transform, color: u32) -> Vec<Action> {
        if color > MAX_COLOR {
            log::warn!("engine: ignoring {kind:?} with color {color:#X}");
            return Vec::new();
        }
        let mut actions = Vec::new();
        let existing_sky = match kind {
            ObjectKind::Sky => self.registry.all().iter().find(|o| o.kind == ObjectKind::Sky).map(|o| o.id),
            _ => None,
        };
        if let Some(existing) = existing_sky {
            actions.extend(self.release(existing));
        }
        self.registry.add(kind, transform, color);
        actions.extend([Action::RegistryChanged, Action::RenderNeeded]);
        actions
    }

    /// Remove the object at `index` along with its keyframes. Out-of-range is a no-op.
    pub fn delete_object(&mut self, index: usize) -> Vec<Action> {
        let Some(id) = self.registry.get(index).map(|o| o.id) else {
            return Vec::new();
        };
        let mut actions = self.release(id);
        self.registry.remove(index);
        actions.extend([Action::RegistryChanged, Action::RenderNeeded]);
        actions
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        match self.selected_index() {
            Some(index) => self.delete_object(index),
            None => Vec::new(),
        }
    }

    /// Side-panel transform edit. Non-finite values are rejected.
    pub fn set_object_transform(&mut self, index: usize, transform: Transform) -> Vec<Action> {
        if !transform.is_finite() {
            log::warn!("engine: ignoring non-finite transform for index {index}");
            return Vec::new();
        }
        if !self.registry.set_transform(index, transform) {
            return Vec::new();
        }
        self.sync_gizmo();
        vec![Action::RegistryChanged, Action::RenderNeeded]
    }

    pub fn rename_object(&mut self, index: usize, name: String) -> Vec<Action> {
        if !self.registry.rename(index, name) {
            return Vec::new();
        }
        vec![Action::RegistryChanged]
    }

    /// Side-panel color edit. Values above `0xFFFFFF` are rejected.
    pub fn set_object_color(&mut self, index: usize, color: u32) -> Vec<Action> {
        if color > MAX_COLOR {
            log::warn!("engine: ignoring color {color:#X} for index {index}");
            return Vec::new();
        }
        if !self.registry.set_color(index, color) {
            return Vec::new();
        }
        vec![Action::RegistryChanged, Action::RenderNeeded]
    }

    // --- Selection / gizmo ---

    /// Select by registry index. Out of range behaves like a pick miss.
    pub fn select_index(&mut self, index: usize) -> Vec<Action> {
        match self.registry.get(index).map(|o| o.id) {
            Some(id) => self.select(id),
            None => self.deselect(),
        }
    }

    pub fn deselect(&mut self) -> Vec<Action> {
        if !self.clear_selection() {
            return Vec::new();
        }
        vec![Action::SelectionChanged { index: None }, Action::RenderNeeded]
    }

    /// Switch gizmo mode, rebuilding the gizmo for the current selection.
    pub fn set_gizmo_mode(&mut self, mode: GizmoMode) -> Vec<Action> {
        self.gizmo_mode = mode;
        log::debug!("gizmo: mode {mode:?}");
        let Some(id) = self.selected_id() else {
            return Vec::new();
        };
        let Some(position) = self.registry.get_by_id(id).map(|o| o.transform.position) else {
            return Vec::new();
        };
        if matches!(self.interaction, InteractionState::DraggingGizmo { .. }) {
            self.interaction = InteractionState::Idle;
        }
        let g = Gizmo::new(mode, id, position);
        self.render_queue.push(RenderCommand::Gizmo(Some(GizmoView::from(&g))));
        self.gizmo = Some(g);
        vec![Action::RenderNeeded]
    }

    fn select(&mut self, id: ObjectId) -> Vec<Action> {
        let found = self
            .registry
            .all()
            .iter()
            .enumerate()
            .find(|(_, o)| o.id == id)
            .map(|(index, o)| (index, o.render_handle(), o.transform.position));
        let Some((index, handle, position)) = found else {
            return self.deselect();
        };

        self.clear_selection();
        self.selection = Some(Selection { id, handle });
        self.render_queue.push(RenderCommand::Highlight { handle, on: true });
        let g = Gizmo::new(self.gizmo_mode, id, position);
        self.render_queue.push(RenderCommand::Gizmo(Some(GizmoView::from(&g))));
        self.gizmo = Some(g);
        self.refresh_panel();
        log::debug!("selection: {id} at index {index}");
        vec![Action::SelectionChanged { index: Some(index) }, Action::RenderNeeded]
    }

    /// Drop selection, highlight and gizmo. Returns whether anything was selected.
    fn clear_selection(&mut self) -> bool {
        let Some(selection) = self.selection.take() else {
            return false;
        };
        self.render_queue.push(RenderCommand::Highlight { handle: selection.handle, on: false });
        self.gizmo = None;
        self.render_queue.push(RenderCommand::Gizmo(None));
        self.keyframe_panel.clear();
        if matches!(self.interaction, InteractionState::DraggingGizmo { .. }) {
            self.interaction = InteractionState::Idle;
        }
        log::debug!("selection: cleared {}", selection.id);
        true
    }

    /// Forget everything that refers to `id` ahead of its removal.
    fn release(&mut self, id: ObjectId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.selected_id() == Some(id) && self.clear_selection() {
            actions.push(Action::SelectionChanged { index: None });
        }
        if self.keyframes.remove_object(id) {
            actions.push(Action::KeyframesChanged { id });
        }
        actions
    }

    /// Move the gizmo onto its target after the target's transform changed.
    fn sync_gizmo(&mut self) {
        let Some(g) = self.gizmo.as_mut() else {
            return;
        };
        let Some(obj) = self.registry.get_by_id(g.target) else {
            return;
        };
        if g.position != obj.transform.position {
            g.position = obj.transform.position;
            self.render_queue.push(RenderCommand::Gizmo(Some(GizmoView::from(&*g))));
        }
    }

    fn refresh_panel(&mut self) {
        self.keyframe_panel = self.selected_id().map(|id| self.keyframes.frames(id)).unwrap_or_default();
    }

    // --- Keyframes ---

    /// Snapshot the selected object's transform at the current frame.
    pub fn capture_keyframe(&mut self) -> Vec<Action> {
        let Some(id) = self.selected_id() else {
            return Vec::new();
        };
        let Some(transform) = self.registry.get_by_id(id).map(|o| o.transform) else {
            return Vec::new();
        };
        let frame = self.timeline.current_frame();
        self.keyframes.capture(id, frame, transform);
        log::debug!("keyframes: captured {id} at frame {frame}");
        self.refresh_panel();
        vec![Action::KeyframesChanged { id }]
    }

    /// Remove the selected object's keyframe at the current frame, if any.
    pub fn delete_keyframe(&mut self) -> Vec<Action> {
        let Some(id) = self.selected_id() else {
            return Vec::new();
        };
        let frame = self.timeline.current_frame();
        if !self.keyframes.delete(id, frame) {
            return Vec::new();
        }
        log::debug!("keyframes: deleted {id} at frame {frame}");
        self.refresh_panel();
        vec![Action::KeyframesChanged { id }]
    }

    // --- Playback ---

    /// Start playback with a tick source from `make_handle`. No-op while playing.
    pub fn play(&mut self, make_handle: impl FnOnce() -> Box<dyn TickHandle>) -> Vec<Action> {
        if !self.timeline.start(make_handle) {
            return Vec::new();
        }
        vec![Action::PlaybackChanged { playing: true }]
    }

    pub fn pause(&mut self) -> Vec<Action> {
        if !self.timeline.pause() {
            return Vec::new();
        }
        vec![Action::PlaybackChanged { playing: false }]
    }

    /// Stop playback, rewind to frame 0 and show it.
    pub fn stop(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.timeline.stop() {
            actions.push(Action::PlaybackChanged { playing: false });
        }
        actions.extend(self.show_frame(0));
        actions
    }

    /// One playback tick. Ignored while stopped.
    pub fn tick(&mut self) -> Vec<Action> {
        match self.timeline.tick() {
            Some(frame) => self.show_frame(frame),
            None => Vec::new(),
        }
    }

    /// Scrub to `frame`, clamped to the timeline.
    pub fn seek(&mut self, frame: u32) -> Vec<Action> {
        let frame = self.timeline.seek(frame);
        self.refresh_panel();
        self.show_frame(frame)
    }

    /// Change the timeline length. A playhead pulled back is resampled there.
    pub fn set_max_frame(&mut self, max_frame: u32) -> Vec<Action> {
        self.timeline.set_max_frame(max_frame);
        self.show_frame(self.timeline.current_frame())
    }

    /// Resample every animated object at `frame`.
    fn show_frame(&mut self, frame: u32) -> Vec<Action> {
        let mut changed = false;
        for id in self.keyframes.animated_objects() {
            if let Some(t) = self.keyframes.sample(id, frame) {
                changed |= self.registry.set_transform_by_id(id, t);
            }
        }
        log::trace!("playback: frame {frame}");
        if !changed {
            return vec![Action::FrameChanged(frame)];
        }
        self.sync_gizmo();
        vec![Action::FrameChanged(frame), Action::RegistryChanged, Action::RenderNeeded]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, ndc: Vec2, button: Button) -> Vec<Action> {
        if self.interaction.is_active() {
            return Vec::new();
        }
        match button {
            Button::Primary => self.primary_down(ndc),
            Button::Secondary => {
                self.interaction = InteractionState::OrbitingCamera { last: ndc };
                Vec::new()
            }
            Button::Middle => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, ndc: Vec2) -> Vec<Action> {
        match self.interaction {
            InteractionState::Idle => Vec::new(),
            InteractionState::OrbitingCamera { last } => {
                self.interaction = InteractionState::OrbitingCamera { last: ndc };
                self.camera.orbit(ndc - last, self.config.orbit_sensitivity);
                self.push_camera();
                vec![Action::RenderNeeded]
            }
            InteractionState::DraggingGizmo { axis, object, grab, last } => {
                self.interaction = InteractionState::DraggingGizmo { axis, object, grab, last: ndc };
                self.drag_step(axis, object, grab, ndc - last, ndc)
            }
        }
    }

    /// End any gesture. Also resets when no matching pointer-down was seen.
    pub fn on_pointer_up(&mut self, _ndc: Vec2, _button: Button) -> Vec<Action> {
        match std::mem::take(&mut self.interaction) {
            InteractionState::DraggingGizmo { .. } => {
                if let Some(g) = self.gizmo.as_mut() {
                    g.active_axis = None;
                    self.render_queue.push(RenderCommand::Gizmo(Some(GizmoView::from(&*g))));
                }
                vec![Action::RenderNeeded]
            }
            InteractionState::Idle | InteractionState::OrbitingCamera { .. } => Vec::new(),
        }
    }

    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        let before = self.camera.radius;
        self.camera.zoom(delta.dy, self.config.zoom_step);
        if self.camera.radius.to_bits() == before.to_bits() {
            return Vec::new();
        }
        self.push_camera();
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: Key) -> Vec<Action> {
        match key.shortcut() {
            Some(Shortcut::DeleteSelected) => self.delete_selected(),
            Some(Shortcut::Deselect) => self.deselect(),
            Some(Shortcut::MoveMode) => self.set_gizmo_mode(GizmoMode::Move),
            Some(Shortcut::RotateMode) => self.set_gizmo_mode(GizmoMode::Rotate),
            Some(Shortcut::CaptureKeyframe) => self.capture_keyframe(),
            None => Vec::new(),
        }
    }

    /// Viewport size in CSS pixels.
    pub fn set_viewport(&mut self, width: f32, height: f32) -> Vec<Action> {
        self.camera.set_aspect(width, height);
        self.push_camera();
        vec![Action::RenderNeeded]
    }

    fn primary_down(&mut self, ndc: Vec2) -> Vec<Action> {
        let ray = self.camera.ray_from_ndc(ndc);
        match hit::hit_test(&ray, &self.registry, self.gizmo.as_ref()).map(|h| h.part) {
            Some(HitPart::GizmoHandle(axis)) => self.begin_drag(axis, &ray, ndc),
            Some(HitPart::Object { id, .. }) => self.select(id),
            None => self.deselect(),
        }
    }

    fn begin_drag(&mut self, axis: GizmoAxis, ray: &Ray, ndc: Vec2) -> Vec<Action> {
        let Some(g) = self.gizmo.as_mut() else {
            return Vec::new();
        };
        let grab = match axis {
            GizmoAxis::RotateRing => 0.0,
            GizmoAxis::X | GizmoAxis::Y | GizmoAxis::Z => gizmo::begin_move(axis, ray, self.camera.eye(), g.position),
        };
        g.active_axis = Some(axis);
        self.interaction = InteractionState::DraggingGizmo { axis, object: g.target, grab, last: ndc };
        self.render_queue.push(RenderCommand::Gizmo(Some(GizmoView::from(&*g))));
        log::debug!("gizmo: drag {axis:?} on {}", g.target);
        vec![Action::RenderNeeded]
    }

    fn drag_step(&mut self, axis: GizmoAxis, object: ObjectId, grab: f32, delta: Vec2, ndc: Vec2) -> Vec<Action> {
        let found = self.registry.index_of(object).and_then(|i| self.registry.get(i).map(|o| (i, o.transform)));
        let Some((index, current)) = found else {
            self.interaction = InteractionState::Idle;
            return Vec::new();
        };
        let next = match axis {
            GizmoAxis::RotateRing => Some(gizmo::rotate_step(&current, delta.x, self.config.rotate_sensitivity)),
            GizmoAxis::X | GizmoAxis::Y | GizmoAxis::Z => {
                gizmo::move_step(axis, &self.camera.ray_from_ndc(ndc), self.camera.eye(), &current, grab)
            }
        };
        let Some(next) = next else {
            log::trace!("gizmo: degenerate drag step skipped");
            return Vec::new();
        };
        self.registry.set_transform(index, next);
        self.sync_gizmo();
        vec![Action::RegistryChanged, Action::RenderNeeded]
    }

    fn push_camera(&mut self) {
        self.render_queue.push(RenderCommand::Camera(CameraPose::from(&self.camera)));
    }

    // --- Documents ---

    /// Replace the scene with `document`. On error nothing changes.
    pub fn load_document(&mut self, document: &Document) -> Result<Vec<Action>, DocumentError> {
        let (registry, keyframes) = document
            .instantiate(&self.registry, self.keyframes.rotation_interpolation())
            .inspect_err(|e| log::warn!("document: rejected ({}): {e}", e.error_code()))?;

        let mut actions = Vec::new();
        if self.timeline.stop() {
            actions.push(Action::PlaybackChanged { playing: false });
        }
        if self.clear_selection() {
            actions.push(Action::SelectionChanged { index: None });
        }
        self.interaction = InteractionState::Idle;
        self.registry.replace(registry);
        self.keyframes = keyframes;
        log::debug!("document: loaded {} objects", self.registry.len());
        actions.extend([Action::FrameChanged(0), Action::RegistryChanged, Action::RenderNeeded]);
        Ok(actions)
    }

    pub fn load_json(&mut self, json: &str) -> Result<Vec<Action>, DocumentError> {
        let document = Document::from_json(json).inspect_err(|e| log::warn!("document: unreadable: {e}"))?;
        self.load_document(&document)
    }

    #[must_use]
    pub fn snapshot_document(&self) -> Document {
        Document::snapshot(&self.registry, &self.keyframes)
    }

    pub fn export_json(&self) -> Result<String, DocumentError> {
        self.snapshot_document().to_json()
    }

    /// Snapshot the scene for an async save. Editing may continue meanwhile.
    pub fn begin_save(&mut self) -> Document {
        self.save_status = SaveStatus::Saving;
        self.snapshot_document()
    }

    /// Record the outcome of a save started with [`begin_save`](Self::begin_save).
    pub fn finish_save(&mut self, result: Result<Ack, PersistenceError>) -> Vec<Action> {
        if let Err(e) = &result {
            log::warn!("save failed ({}): {e}", e.error_code());
        }
        self.save_status = SaveStatus::from_result(&result);
        vec![Action::SaveFinished { ok: result.is_ok() }]
    }

    // --- Render ---

    /// Hand queued registry events and render commands to `renderer`.
    pub fn flush_render(&mut self, renderer: &mut impl Renderer) {
        let events = self.registry.take_events();
        render::apply_registry_events(renderer, &self.registry, &events);
        for command in self.render_queue.drain(..) {
            command.apply(renderer);
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn selected_id(&self) -> Option<ObjectId> {
        self.selection.map(|s| s.id)
    }

    /// Current registry index of the selection.
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_id().and_then(|id| self.registry.index_of(id))
    }

    #[must_use]
    pub fn gizmo(&self) -> Option<&Gizmo> {
        self.gizmo.as_ref()
    }

    #[must_use]
    pub fn gizmo_mode(&self) -> GizmoMode {
        self.gizmo_mode
    }

    #[must_use]
    pub fn interaction(&self) -> InteractionState {
        self.interaction
    }

    /// Sorted keyframe frames of the selected object.
    #[must_use]
    pub fn keyframe_panel(&self) -> &[u32] {
        &self.keyframe_panel
    }

    #[must_use]
    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    #[must_use]
    pub fn current_frame(&self) -> u32 {
        self.timeline.current_frame()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.timeline.is_playing()
    }
}

/// Browser-side state shared with the playback timer and async tasks, which
/// hold it weakly.
struct Shared {
    core: EngineCore,
    renderer: CanvasRenderer,
    canvas: HtmlCanvasElement,
    width: f64,
    height: f64,
    dpr: f64,
    listener: Option<Rc<dyn Fn(&[Action])>>,
}

impl Shared {
    fn render(&mut self) -> Result<(), JsValue> {
        self.core.flush_render(&mut self.renderer);
        let Some(ctx) = self.canvas.get_context("2d")? else {
            return Err(JsValue::from_str("2d context unavailable"));
        };
        let ctx: CanvasRenderingContext2d = ctx.dyn_into()?;
        self.renderer.draw(&ctx, self.width, self.height, self.dpr)
    }
}

/// Run `f` against the shared state from a callback, then report its actions
/// to the listener with the state released.
fn dispatch(shared: &Rc<RefCell<Shared>>, f: impl FnOnce(&mut Shared) -> Vec<Action>) {
    let (actions, listener) = match shared.try_borrow_mut() {
        Ok(mut state) => {
            let actions = f(&mut state);
            (actions, state.listener.clone())
        }
        Err(_) => {
            log::trace!("engine busy; callback skipped");
            return;
        }
    };
    if let Some(listener) = listener
        && !actions.is_empty()
    {
        listener(&actions);
    }
}

/// 30 Hz playback tick driven by a `gloo_timers` interval.
struct IntervalTick(Interval);

impl IntervalTick {
    fn start(shared: Weak<RefCell<Shared>>) -> Self {
        Self(Interval::new(TICK_INTERVAL_MS, move || {
            let Some(strong) = shared.upgrade() else {
                return;
            };
            dispatch(&strong, |state| {
                let actions = state.core.tick();
                if let Err(e) = state.render() {
                    log::warn!("render failed: {e:?}");
                }
                actions
            });
        }))
    }
}

impl TickHandle for IntervalTick {
    /// Dropping the interval clears it.
    fn cancel(self: Box<Self>) {
        drop(self.0);
    }
}

/// The full editor engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    shared: Rc<RefCell<Shared>>,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, config: EditorConfig) -> Self {
        let shared = Shared {
            core: EngineCore::with_config(config),
            renderer: CanvasRenderer::new(),
            canvas,
            width: 0.0,
            height: 0.0,
            dpr: 1.0,
            listener: None,
        };
        Self { shared: Rc::new(RefCell::new(shared)) }
    }

    /// Create an engine from the host's JSON configuration.
    pub fn from_config_json(canvas: HtmlCanvasElement, json: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(canvas, EditorConfig::from_json(json)?))
    }

    /// Route `log` output to the browser console at the configured level.
    pub fn init_logging(config: &EditorConfig) -> Result<(), JsValue> {
        let filter = config.level_filter().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let Some(level) = filter.to_level() else {
            return Ok(());
        };
        console_log::init_with_level(level).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Receive actions produced outside a direct call: playback ticks and
    /// completed saves or loads.
    pub fn set_action_listener(&self, listener: impl Fn(&[Action]) + 'static) {
        self.shared.borrow_mut().listener = Some(Rc::new(listener));
    }

    /// Run `f` against the core.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut EngineCore) -> R) -> R {
        f(&mut self.shared.borrow_mut().core)
    }

    // --- Delegated operations ---

    pub fn add_object(&self, kind: ObjectKind, transform: Transform, color: u32) -> Vec<Action> {
        self.with_core(|core| core.add_object(kind, transform, color))
    }

    pub fn delete_object(&self, index: usize) -> Vec<Action> {
        self.with_core(|core| core.delete_object(index))
    }

    pub fn select_index(&self, index: usize) -> Vec<Action> {
        self.with_core(|core| core.select_index(index))
    }

    pub fn set_gizmo_mode(&self, mode: GizmoMode) -> Vec<Action> {
        self.with_core(|core| core.set_gizmo_mode(mode))
    }

    pub fn capture_keyframe(&self) -> Vec<Action> {
        self.with_core(EngineCore::capture_keyframe)
    }

    pub fn delete_keyframe(&self) -> Vec<Action> {
        self.with_core(EngineCore::delete_keyframe)
    }

    pub fn load_json(&self, json: &str) -> Result<Vec<Action>, DocumentError> {
        self.with_core(|core| core.load_json(json))
    }

    pub fn export_json(&self) -> Result<String, DocumentError> {
        self.with_core(|core| core.export_json())
    }

    // --- Playback ---

    /// Start the 30 Hz tick. Each tick redraws and reports to the listener.
    pub fn play(&self) -> Vec<Action> {
        let weak = Rc::downgrade(&self.shared);
        self.with_core(move |core| core.play(move || Box::new(IntervalTick::start(weak))))
    }

    pub fn pause(&self) -> Vec<Action> {
        self.with_core(EngineCore::pause)
    }

    pub fn stop(&self) -> Vec<Action> {
        self.with_core(EngineCore::stop)
    }

    pub fn seek(&self, frame: u32) -> Vec<Action> {
        self.with_core(|core| core.seek(frame))
    }

    // --- Persistence ---

    /// Save a snapshot in the background. Completion reaches the listener as
    /// `SaveFinished`.
    pub fn save(&self, store: Rc<dyn Persistence>, project: ProjectRef) {
        let document = self.with_core(EngineCore::begin_save);
        let weak = Rc::downgrade(&self.shared);
        spawn_local(async move {
            let result = store.save(&project, document).await;
            if let Some(strong) = weak.upgrade() {
                dispatch(&strong, |state| state.core.finish_save(result));
            }
        });
    }

    /// Load a project in the background, replacing the scene only if the
    /// stored document is valid. Completion reaches the listener as
    /// `LoadFinished`.
    pub fn load(&self, store: Rc<dyn Persistence>, project: ProjectRef) {
        let weak = Rc::downgrade(&self.shared);
        spawn_local(async move {
            let result = store.load(&project).await;
            let Some(strong) = weak.upgrade() else {
                return;
            };
            dispatch(&strong, |state| {
                let loaded = result.and_then(|doc| state.core.load_document(&doc).map_err(PersistenceError::from));
                match loaded {
                    Ok(mut actions) => {
                        actions.push(Action::LoadFinished { ok: true });
                        actions
                    }
                    Err(e) => {
                        log::warn!("load of '{}' failed ({}): {e}", project.0, e.error_code());
                        vec![Action::LoadFinished { ok: false }]
                    }
                }
            });
        });
    }

    // --- Viewport ---

    /// Set the canvas size in CSS pixels and the device pixel ratio.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_viewport(&self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        let mut shared = self.shared.borrow_mut();
        shared.width = width_css;
        shared.height = height_css;
        shared.dpr = dpr;
        shared.core.set_viewport(width_css as f32, height_css as f32)
    }

    // --- Input events ---

    pub fn on_pointer_down(&self, ndc: Vec2, button: Button) -> Vec<Action> {
        self.with_core(|core| core.on_pointer_down(ndc, button))
    }

    pub fn on_pointer_move(&self, ndc: Vec2) -> Vec<Action> {
        self.with_core(|core| core.on_pointer_move(ndc))
    }

    pub fn on_pointer_up(&self, ndc: Vec2, button: Button) -> Vec<Action> {
        self.with_core(|core| core.on_pointer_up(ndc, button))
    }

    pub fn on_wheel(&self, delta: WheelDelta) -> Vec<Action> {
        self.with_core(|core| core.on_wheel(delta))
    }

    pub fn on_key_down(&self, key: Key) -> Vec<Action> {
        self.with_core(|core| core.on_key_down(key))
    }

    // --- Render ---

    /// Flush pending changes to the canvas renderer and redraw.
    pub fn render(&self) -> Result<(), JsValue> {
        self.shared.borrow_mut().render()
    }
}
