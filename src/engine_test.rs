#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;

use super::*;
use crate::consts::{DEFAULT_COLOR, DEFAULT_ZOOM_STEP, GIZMO_RING_RADIUS};
use crate::keyframe::RotationInterpolation;
use crate::node::RenderNode;

// =============================================================
// Helpers
// =============================================================

fn core_with_cube_at(position: Vec3) -> EngineCore {
    let mut core = EngineCore::new();
    core.add_object(ObjectKind::Cube, Transform::from_position(position), DEFAULT_COLOR);
    core
}

/// NDC of a world point as seen by the core's camera.
fn ndc_of(core: &EngineCore, world: Vec3) -> Vec2 {
    core.camera.project(world).unwrap().truncate()
}

fn click(core: &mut EngineCore, ndc: Vec2) -> Vec<Action> {
    let mut actions = core.on_pointer_down(ndc, Button::Primary);
    actions.extend(core.on_pointer_up(ndc, Button::Primary));
    actions
}

fn position_of(core: &EngineCore, index: usize) -> Vec3 {
    core.registry.get(index).unwrap().transform.position
}

/// Counts cancellations of the ticks it hands out.
struct CountingTick {
    cancels: Rc<Cell<u32>>,
}

impl TickHandle for CountingTick {
    fn cancel(self: Box<Self>) {
        self.cancels.set(self.cancels.get() + 1);
    }
}

fn counting(cancels: &Rc<Cell<u32>>, made: &Rc<Cell<u32>>) -> impl FnOnce() -> Box<dyn TickHandle> {
    let cancels = Rc::clone(cancels);
    let made = Rc::clone(made);
    move || {
        made.set(made.get() + 1);
        Box::new(CountingTick { cancels })
    }
}

/// Renderer that records calls in order.
#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
}

impl Renderer for Recorder {
    fn add(&mut self, handle: RenderHandle, _node: &RenderNode, _transform: &Transform, _color: u32) {
        self.calls.push(format!("add {}", handle.0));
    }

    fn remove(&mut self, handle: RenderHandle) {
        self.calls.push(format!("remove {}", handle.0));
    }

    fn update(&mut self, handle: RenderHandle, _transform: &Transform, _color: u32) {
        self.calls.push(format!("update {}", handle.0));
    }

    fn set_highlight(&mut self, handle: RenderHandle, on: bool) {
        self.calls.push(format!("highlight {} {on}", handle.0));
    }

    fn set_gizmo(&mut self, gizmo: Option<GizmoView>) {
        self.calls.push(format!("gizmo {}", gizmo.is_some()));
    }

    fn set_camera(&mut self, _pose: CameraPose) {
        self.calls.push("camera".into());
    }
}

// =============================================================
// Picking / selection
// =============================================================

#[test]
fn clicking_object_selects_it() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    let ndc = ndc_of(&core, Vec3::ZERO);
    let actions = click(&mut core, ndc);

    assert!(actions.contains(&Action::SelectionChanged { index: Some(0) }));
    let id = core.registry.get(0).unwrap().id;
    assert_eq!(core.selected_id(), Some(id));
    let gizmo = core.gizmo().unwrap();
    assert_eq!(gizmo.target, id);
    assert_eq!(gizmo.position, Vec3::ZERO);
    assert_eq!(gizmo.mode, GizmoMode::Move);
}

#[test]
fn clicking_empty_space_clears_selection_and_gizmo() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    assert!(core.gizmo().is_some());

    let actions = click(&mut core, Vec2::new(0.95, 0.95));
    assert_eq!(actions, vec![Action::SelectionChanged { index: None }, Action::RenderNeeded]);
    assert_eq!(core.selected_id(), None);
    assert!(core.gizmo().is_none());
    assert!(core.keyframe_panel().is_empty());
}

#[test]
fn miss_with_nothing_selected_is_quiet() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    assert!(click(&mut core, Vec2::new(0.95, 0.95)).is_empty());
    assert!(core.gizmo().is_none());
}

#[test]
fn select_index_matches_viewport_pick() {
    let mut picked = core_with_cube_at(Vec3::new(1.0, 0.0, 0.0));
    let ndc = ndc_of(&picked, Vec3::new(1.0, 0.0, 0.0));
    click(&mut picked, ndc);

    let mut listed = core_with_cube_at(Vec3::new(1.0, 0.0, 0.0));
    listed.select_index(0);

    assert_eq!(picked.selected_index(), listed.selected_index());
    assert_eq!(picked.gizmo().map(|g| (g.mode, g.position)), listed.gizmo().map(|g| (g.mode, g.position)));
    assert_eq!(picked.keyframe_panel(), listed.keyframe_panel());
}

#[test]
fn select_index_out_of_range_deselects() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    let actions = core.select_index(5);
    assert!(actions.contains(&Action::SelectionChanged { index: None }));
    assert_eq!(core.selected_id(), None);
}

#[test]
fn selecting_another_object_moves_highlight() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.add_object(ObjectKind::Sphere, Transform::from_position(Vec3::X * 3.0), DEFAULT_COLOR);
    let first = core.registry.get(0).unwrap().render_handle();
    let second = core.registry.get(1).unwrap().render_handle();

    let mut recorder = Recorder::default();
    core.select_index(0);
    core.flush_render(&mut recorder);
    recorder.calls.clear();

    core.select_index(1);
    core.flush_render(&mut recorder);
    assert_eq!(
        recorder.calls,
        vec![
            format!("highlight {} false", first.0),
            "gizmo false".to_string(),
            format!("highlight {} true", second.0),
            "gizmo true".to_string(),
        ]
    );
}

#[test]
fn sky_is_not_pickable() {
    let mut core = EngineCore::new();
    core.add_object(ObjectKind::Sky, Transform::default(), 0x000022);
    assert!(click(&mut core, Vec2::ZERO).is_empty());
    assert_eq!(core.selected_id(), None);
}

// =============================================================
// Gizmo drags
// =============================================================

#[test]
fn x_drag_changes_only_x() {
    let start = Vec3::new(0.0, 0.25, -0.5);
    let mut core = core_with_cube_at(start);
    core.select_index(0);

    let down = ndc_of(&core, start + Vec3::X);
    core.on_pointer_down(down, Button::Primary);
    assert!(matches!(core.interaction(), InteractionState::DraggingGizmo { axis: GizmoAxis::X, .. }));
    assert_eq!(core.gizmo().unwrap().active_axis, Some(GizmoAxis::X));

    let to = ndc_of(&core, start + Vec3::X * 2.0);
    let actions = core.on_pointer_move(to);
    assert!(actions.contains(&Action::RegistryChanged));

    let moved = core.registry.get(0).unwrap().transform;
    assert!((moved.position.x - 1.0).abs() < 1e-3, "x = {}", moved.position.x);
    assert_eq!(moved.position.y.to_bits(), start.y.to_bits());
    assert_eq!(moved.position.z.to_bits(), start.z.to_bits());
    assert_eq!(moved.rotation, Vec3::ZERO);
    assert_eq!(moved.scale, Vec3::ONE);
    assert_eq!(core.gizmo().unwrap().position, moved.position);
}

#[test]
fn pointer_up_ends_drag() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    let down = ndc_of(&core, Vec3::X);
    core.on_pointer_down(down, Button::Primary);

    let actions = core.on_pointer_up(down, Button::Primary);
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(core.interaction(), InteractionState::Idle);
    assert_eq!(core.gizmo().unwrap().active_axis, None);

    let before = position_of(&core, 0);
    assert!(core.on_pointer_move(ndc_of(&core, Vec3::X * 2.0)).is_empty());
    assert_eq!(position_of(&core, 0), before);
}

#[test]
fn rotate_drag_turns_about_y() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    core.set_gizmo_mode(GizmoMode::Rotate);

    let down = ndc_of(&core, Vec3::X * GIZMO_RING_RADIUS);
    core.on_pointer_down(down, Button::Primary);
    assert!(matches!(core.interaction(), InteractionState::DraggingGizmo { axis: GizmoAxis::RotateRing, .. }));

    core.on_pointer_move(down + Vec2::new(0.1, 0.3));
    let rotation = core.registry.get(0).unwrap().transform.rotation;
    let expected = 0.1 * core.config.rotate_sensitivity;
    assert!((rotation.y - expected).abs() < 1e-4);
    assert_eq!(rotation.x, 0.0);
    assert_eq!(rotation.z, 0.0);
    assert_eq!(position_of(&core, 0), Vec3::ZERO);
}

#[test]
fn mode_switch_rebuilds_gizmo() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    let actions = core.set_gizmo_mode(GizmoMode::Rotate);
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(core.gizmo().unwrap().mode, GizmoMode::Rotate);

    core.deselect();
    assert!(core.set_gizmo_mode(GizmoMode::Move).is_empty());
    assert_eq!(core.gizmo_mode(), GizmoMode::Move);
    core.select_index(0);
    assert_eq!(core.gizmo().unwrap().mode, GizmoMode::Move);
}

#[test]
fn side_panel_edit_resyncs_gizmo() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    let target = Transform::from_position(Vec3::new(2.0, 1.0, 0.0));
    core.set_object_transform(0, target);
    assert_eq!(core.gizmo().unwrap().position, target.position);
}

#[test]
fn side_panel_rejects_bad_values() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    let bad = Transform::from_position(Vec3::new(f32::NAN, 0.0, 0.0));
    assert!(core.set_object_transform(0, bad).is_empty());
    assert!(core.set_object_color(0, 0x0100_0000).is_empty());
    assert_eq!(core.registry.get(0).unwrap().color, DEFAULT_COLOR);
    assert_eq!(core.rename_object(0, "Crate".into()), vec![Action::RegistryChanged]);
    assert_eq!(core.registry.get(0).unwrap().name, "Crate");
}

// =============================================================
// Interaction state machine
// =============================================================

#[test]
fn secondary_drag_orbits_camera() {
    let mut core = EngineCore::new();
    let theta = core.camera.theta;
    core.on_pointer_down(Vec2::ZERO, Button::Secondary);
    assert!(matches!(core.interaction(), InteractionState::OrbitingCamera { .. }));

    let actions = core.on_pointer_move(Vec2::new(0.1, 0.0));
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!((core.camera.theta - (theta - 0.1 * core.config.orbit_sensitivity)).abs() < 1e-5);

    core.on_pointer_up(Vec2::new(0.1, 0.0), Button::Secondary);
    assert_eq!(core.interaction(), InteractionState::Idle);
}

#[test]
fn pointer_down_during_gesture_is_ignored() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.on_pointer_down(Vec2::ZERO, Button::Secondary);
    assert!(core.on_pointer_down(ndc_of(&core, Vec3::ZERO), Button::Primary).is_empty());
    assert_eq!(core.selected_id(), None);
    assert!(matches!(core.interaction(), InteractionState::OrbitingCamera { .. }));
}

#[test]
fn pointer_up_without_down_resets() {
    let mut core = EngineCore::new();
    assert!(core.on_pointer_up(Vec2::ZERO, Button::Middle).is_empty());
    assert_eq!(core.interaction(), InteractionState::Idle);
}

#[test]
fn middle_button_does_nothing() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    assert!(core.on_pointer_down(Vec2::ZERO, Button::Middle).is_empty());
    assert_eq!(core.interaction(), InteractionState::Idle);
}

#[test]
fn wheel_zooms_in_steps_and_keeps_state() {
    let mut core = EngineCore::new();
    let radius = core.camera.radius;
    core.on_pointer_down(Vec2::ZERO, Button::Secondary);

    assert_eq!(core.on_wheel(WheelDelta { dy: 120.0 }), vec![Action::RenderNeeded]);
    assert!((core.camera.radius - (radius + DEFAULT_ZOOM_STEP)).abs() < 1e-5);
    assert!(matches!(core.interaction(), InteractionState::OrbitingCamera { .. }));

    assert!(core.on_wheel(WheelDelta { dy: 0.0 }).is_empty());
}

// =============================================================
// Keyboard shortcuts
// =============================================================

#[test]
fn shortcuts_drive_editor_commands() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    let id = core.selected_id().unwrap();

    core.on_key_down(Key("e".into()));
    assert_eq!(core.gizmo().unwrap().mode, GizmoMode::Rotate);
    core.on_key_down(Key("W".into()));
    assert_eq!(core.gizmo().unwrap().mode, GizmoMode::Move);

    assert_eq!(core.on_key_down(Key("k".into())), vec![Action::KeyframesChanged { id }]);
    assert!(core.keyframes.has_keyframes(id));
    assert_eq!(core.keyframe_panel(), &[0]);

    core.on_key_down(Key("Escape".into()));
    assert_eq!(core.selected_id(), None);

    core.select_index(0);
    core.on_key_down(Key("Delete".into()));
    assert!(core.registry.is_empty());
    assert!(!core.keyframes.has_keyframes(id));
}

#[test]
fn unbound_key_is_ignored() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    assert!(core.on_key_down(Key("q".into())).is_empty());
}

// =============================================================
// Objects
// =============================================================

#[test]
fn deleting_selected_object_clears_selection() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    let actions = core.delete_selected();
    assert_eq!(
        actions,
        vec![Action::SelectionChanged { index: None }, Action::RegistryChanged, Action::RenderNeeded]
    );
    assert!(core.gizmo().is_none());
    assert!(core.delete_selected().is_empty());
}

#[test]
fn delete_during_drag_resets_interaction() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    core.on_pointer_down(ndc_of(&core, Vec3::X), Button::Primary);
    core.on_key_down(Key("Backspace".into()));
    assert_eq!(core.interaction(), InteractionState::Idle);
}

#[test]
fn selection_follows_object_across_removal() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.add_object(ObjectKind::Sphere, Transform::default(), DEFAULT_COLOR);
    core.select_index(1);
    core.delete_object(0);
    assert_eq!(core.selected_index(), Some(0));
}

#[test]
fn second_sky_replaces_selected_sky() {
    let mut core = EngineCore::new();
    core.add_object(ObjectKind::Sky, Transform::default(), 0x000022);
    core.select_index(0);
    let actions = core.add_object(ObjectKind::Sky, Transform::default(), 0x220000);

    assert!(actions.contains(&Action::SelectionChanged { index: None }));
    assert_eq!(core.registry.len(), 1);
    assert_eq!(core.registry.get(0).unwrap().color, 0x220000);
}

#[test]
fn out_of_range_color_rejected_on_add_and_edit() {
    let mut core = EngineCore::new();
    assert!(core.add_object(ObjectKind::Cube, Transform::default(), 0x0100_0000).is_empty());
    assert!(core.registry.is_empty());

    core.add_object(ObjectKind::Cube, Transform::default(), MAX_COLOR);
    assert!(core.set_object_color(0, MAX_COLOR + 1).is_empty());
    assert_eq!(core.registry.get(0).unwrap().color, MAX_COLOR);
}

#[test]
fn delete_out_of_range_is_noop() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    assert!(core.delete_object(3).is_empty());
    assert_eq!(core.registry.len(), 1);
}

#[test]
fn removal_releases_handle_once() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.add_object(ObjectKind::Rig, Transform::default(), DEFAULT_COLOR);
    let mut recorder = Recorder::default();
    core.flush_render(&mut recorder);

    let handle = core.registry.get(0).unwrap().render_handle();
    core.delete_object(0);
    core.flush_render(&mut recorder);
    core.flush_render(&mut recorder);

    let removes = recorder.calls.iter().filter(|c| **c == format!("remove {}", handle.0)).count();
    assert_eq!(removes, 1);
}

// =============================================================
// Keyframes
// =============================================================

#[test]
fn keyframe_ops_without_selection_are_noops() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    assert!(core.capture_keyframe().is_empty());
    assert!(core.delete_keyframe().is_empty());
    assert!(core.keyframes.is_empty());
}

#[test]
fn delete_keyframe_at_current_frame() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    let id = core.selected_id().unwrap();
    core.capture_keyframe();
    core.seek(10);
    assert!(core.delete_keyframe().is_empty());

    core.seek(0);
    assert_eq!(core.delete_keyframe(), vec![Action::KeyframesChanged { id }]);
    assert!(!core.keyframes.has_keyframes(id));
    assert!(core.keyframe_panel().is_empty());
}

#[test]
fn keyframes_stay_with_object_after_earlier_delete() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.add_object(ObjectKind::Sphere, Transform::default(), DEFAULT_COLOR);
    core.select_index(1);
    let sphere = core.selected_id().unwrap();
    core.capture_keyframe();
    core.seek(10);
    core.set_object_transform(1, Transform::from_position(Vec3::new(4.0, 0.0, 0.0)));
    core.capture_keyframe();

    core.delete_object(0);
    assert_eq!(core.keyframes.keyframe_count(sphere), 2);

    core.seek(5);
    assert_eq!(core.registry.get(0).unwrap().id, sphere);
    assert!((position_of(&core, 0).x - 2.0).abs() < 1e-5);
}

#[test]
fn scrub_moves_gizmo_with_animated_selection() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    core.capture_keyframe();
    core.seek(20);
    core.set_object_transform(0, Transform::from_position(Vec3::new(0.0, 2.0, 0.0)));
    core.capture_keyframe();

    let actions = core.seek(10);
    assert_eq!(actions, vec![Action::FrameChanged(10), Action::RegistryChanged, Action::RenderNeeded]);
    assert_eq!(core.gizmo().unwrap().position, position_of(&core, 0));
    assert_eq!(core.keyframe_panel(), &[0, 20]);
}

// =============================================================
// Playback
// =============================================================

#[test]
fn playback_wraps_and_keeps_running() {
    let config = EditorConfig { max_frame: 3, ..EditorConfig::default() };
    let mut core = EngineCore::with_config(config);
    let cancels = Rc::new(Cell::new(0));
    let made = Rc::new(Cell::new(0));
    assert_eq!(core.play(counting(&cancels, &made)), vec![Action::PlaybackChanged { playing: true }]);

    let frames: Vec<u32> = (0..6).map(|_| core.tick()).map(|a| match a[0] {
        Action::FrameChanged(f) => f,
        other => panic!("unexpected {other:?}"),
    }).collect();
    assert_eq!(frames, vec![1, 2, 3, 0, 1, 2]);
    assert!(core.is_playing());
}

#[test]
fn play_while_playing_makes_no_second_tick() {
    let mut core = EngineCore::new();
    let cancels = Rc::new(Cell::new(0));
    let made = Rc::new(Cell::new(0));
    core.play(counting(&cancels, &made));
    assert!(core.play(counting(&cancels, &made)).is_empty());
    assert_eq!(made.get(), 1);

    core.tick();
    core.tick();
    let actions = core.stop();
    assert_eq!(actions[0], Action::PlaybackChanged { playing: false });
    assert_eq!(cancels.get(), 1);
    assert_eq!(core.current_frame(), 0);

    assert!(core.tick().is_empty());
    core.stop();
    assert_eq!(cancels.get(), 1);
}

#[test]
fn pause_keeps_frame() {
    let mut core = EngineCore::new();
    let cancels = Rc::new(Cell::new(0));
    let made = Rc::new(Cell::new(0));
    core.play(counting(&cancels, &made));
    core.tick();
    core.tick();
    assert_eq!(core.pause(), vec![Action::PlaybackChanged { playing: false }]);
    assert_eq!(core.current_frame(), 2);
    assert!(core.pause().is_empty());
    assert_eq!(cancels.get(), 1);
}

#[test]
fn tick_resamples_only_animated_objects() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.add_object(ObjectKind::Sphere, Transform::from_position(Vec3::Z), DEFAULT_COLOR);

    core.select_index(0);
    core.capture_keyframe();
    core.seek(2);
    core.set_object_transform(0, Transform::from_position(Vec3::new(2.0, 0.0, 0.0)));
    core.capture_keyframe();
    // One keyframe only: held still.
    core.select_index(1);
    core.capture_keyframe();
    core.seek(0);

    let cancels = Rc::new(Cell::new(0));
    let made = Rc::new(Cell::new(0));
    core.play(counting(&cancels, &made));
    core.tick();
    assert!((position_of(&core, 0).x - 1.0).abs() < 1e-5);
    assert_eq!(position_of(&core, 1), Vec3::Z);
}

#[test]
fn shrinking_timeline_pulls_playhead_back() {
    let mut core = EngineCore::new();
    core.seek(100);
    assert_eq!(core.set_max_frame(30), vec![Action::FrameChanged(30)]);
    assert_eq!(core.seek(500), vec![Action::FrameChanged(30)]);
}

#[test]
fn shrinking_timeline_resamples_animated_objects() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    core.capture_keyframe();
    core.seek(100);
    core.set_object_transform(0, Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
    core.capture_keyframe();

    let actions = core.set_max_frame(50);
    assert_eq!(actions, vec![Action::FrameChanged(50), Action::RegistryChanged, Action::RenderNeeded]);
    assert!((position_of(&core, 0).x - 5.0).abs() < 1e-5);
    assert_eq!(core.gizmo().unwrap().position, position_of(&core, 0));
}

// =============================================================
// Documents
// =============================================================

const SCENE: &str = r#"{
    "objects": [
        { "type": "cube", "name": "Box", "position": [1, 0, 0], "rotation": [0, 0, 0],
          "scale": [1, 1, 1], "color": 16711680 },
        { "type": "rig", "name": "Walker", "position": [0, 0, -2], "rotation": [0, 0, 0],
          "scale": [1, 1, 1], "color": 65280 }
    ],
    "keyframes": {
        "1": {
            "0":  { "position": [0, 0, -2], "rotation": [0, 0, 0], "scale": [1, 1, 1] },
            "30": { "position": [4, 0, -2], "rotation": [0, 1, 0], "scale": [1, 1, 1] }
        }
    }
}"#;

#[test]
fn load_replaces_scene() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    let actions = core.load_json(SCENE).unwrap();

    assert!(actions.contains(&Action::SelectionChanged { index: None }));
    assert!(actions.contains(&Action::RegistryChanged));
    assert_eq!(core.registry.len(), 2);
    assert_eq!(core.registry.get(1).unwrap().name, "Walker");
    let walker = core.registry.get(1).unwrap().id;
    assert_eq!(core.keyframes.frames(walker), vec![0, 30]);
    assert_eq!(core.selected_id(), None);
}

#[test]
fn failed_load_leaves_state_untouched() {
    let mut core = core_with_cube_at(Vec3::new(0.5, 0.0, 0.0));
    core.select_index(0);
    core.capture_keyframe();
    let id = core.selected_id().unwrap();

    let bad = SCENE.replace("\"rig\"", "\"sky\"").replace("\"cube\"", "\"sky\"");
    assert!(matches!(core.load_json(&bad), Err(DocumentError::DuplicateSky)));
    assert!(core.load_json("{ not json").is_err());

    assert_eq!(core.registry.len(), 1);
    assert_eq!(core.registry.get(0).unwrap().id, id);
    assert_eq!(core.selected_id(), Some(id));
    assert_eq!(core.keyframes.frames(id), vec![0]);
}

#[test]
fn load_keeps_configured_rotation_interpolation() {
    let config = EditorConfig { rotation_interpolation: RotationInterpolation::Quaternion, ..EditorConfig::default() };
    let mut core = EngineCore::with_config(config);
    core.load_json(SCENE).unwrap();
    assert_eq!(core.keyframes.rotation_interpolation(), RotationInterpolation::Quaternion);
}

#[test]
fn load_stops_playback() {
    let mut core = EngineCore::new();
    let cancels = Rc::new(Cell::new(0));
    let made = Rc::new(Cell::new(0));
    core.play(counting(&cancels, &made));
    core.tick();
    let actions = core.load_json(SCENE).unwrap();
    assert_eq!(actions[0], Action::PlaybackChanged { playing: false });
    assert_eq!(cancels.get(), 1);
    assert_eq!(core.current_frame(), 0);
}

#[test]
fn load_releases_old_handles_before_adding_new() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    let mut recorder = Recorder::default();
    core.flush_render(&mut recorder);
    let old = core.registry.get(0).unwrap().render_handle();
    recorder.calls.clear();

    core.load_json(SCENE).unwrap();
    core.flush_render(&mut recorder);
    assert_eq!(recorder.calls[0], format!("remove {}", old.0));
    assert_eq!(recorder.calls.iter().filter(|c| c.starts_with("add")).count(), 2);
    assert!(core.registry.all().iter().all(|o| o.render_handle() != old));
}

#[test]
fn export_maps_ids_to_indices() {
    let mut core = EngineCore::new();
    core.load_json(SCENE).unwrap();
    core.delete_object(0);

    let doc = core.snapshot_document();
    assert_eq!(doc.objects.len(), 1);
    assert_eq!(doc.keyframes.keys().collect::<Vec<_>>(), vec!["0"]);
    assert_eq!(doc.keyframes["0"].len(), 2);
}

// =============================================================
// Saving
// =============================================================

#[test]
fn save_status_tracks_outcome() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    let doc = core.begin_save();
    assert_eq!(doc.objects.len(), 1);
    assert!(core.save_status().is_saving());

    let actions = core.finish_save(Err(PersistenceError::Unavailable("offline".into())));
    assert_eq!(actions, vec![Action::SaveFinished { ok: false }]);
    assert!(matches!(core.save_status(), SaveStatus::Failed { retryable: true, .. }));
    assert_eq!(core.registry.len(), 1);

    core.begin_save();
    core.finish_save(Ok(Ack { revision: Some(2) }));
    assert_eq!(core.save_status(), &SaveStatus::Saved(Ack { revision: Some(2) }));
}

// =============================================================
// Render flush
// =============================================================

#[test]
fn flush_sends_camera_then_new_objects_then_commands() {
    let mut core = core_with_cube_at(Vec3::ZERO);
    core.select_index(0);
    let handle = core.registry.get(0).unwrap().render_handle();

    let mut recorder = Recorder::default();
    core.flush_render(&mut recorder);
    assert_eq!(
        recorder.calls,
        vec![
            format!("add {}", handle.0),
            "camera".to_string(),
            format!("highlight {} true", handle.0),
            "gizmo true".to_string(),
        ]
    );

    recorder.calls.clear();
    core.flush_render(&mut recorder);
    assert!(recorder.calls.is_empty());
}

#[test]
fn viewport_change_updates_camera() {
    let mut core = EngineCore::new();
    core.set_viewport(800.0, 400.0);
    assert_eq!(core.camera.aspect, 2.0);
    let mut recorder = Recorder::default();
    core.flush_render(&mut recorder);
    assert_eq!(recorder.calls.last().map(String::as_str), Some("camera"));
}
