#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::consts::GIZMO_RING_RADIUS;
use crate::scene::ObjectKind;

fn registry_with_two() -> ObjectRegistry {
    let mut reg = ObjectRegistry::new();
    reg.add(ObjectKind::Cube, Transform::default(), 0xFF0000);
    reg.add(ObjectKind::Rig, Transform::default(), 0x00FF00);
    reg
}

fn sync(renderer: &mut CanvasRenderer, reg: &mut ObjectRegistry) {
    let events = reg.take_events();
    apply_registry_events(renderer, reg, &events);
}

// =============================================================
// Registry events
// =============================================================

#[test]
fn added_objects_become_drawables() {
    let mut reg = registry_with_two();
    let mut renderer = CanvasRenderer::new();
    sync(&mut renderer, &mut reg);
    assert_eq!(renderer.len(), 2);
}

#[test]
fn removed_objects_are_dropped() {
    let mut reg = registry_with_two();
    let mut renderer = CanvasRenderer::new();
    sync(&mut renderer, &mut reg);
    reg.remove(0);
    sync(&mut renderer, &mut reg);
    assert_eq!(renderer.len(), 1);
}

#[test]
fn add_then_remove_before_flush_draws_nothing() {
    let mut reg = registry_with_two();
    reg.remove(1);
    reg.remove(0);
    let mut renderer = CanvasRenderer::new();
    sync(&mut renderer, &mut reg);
    assert!(renderer.is_empty());
}

#[test]
fn updates_reach_retained_drawable() {
    let mut reg = registry_with_two();
    let mut renderer = CanvasRenderer::new();
    sync(&mut renderer, &mut reg);
    let moved = Transform::from_position(Vec3::new(4.0, 0.0, 0.0));
    reg.set_transform(0, moved);
    reg.set_color(0, 0x0000FF);
    sync(&mut renderer, &mut reg);
    let handle = reg.get(0).unwrap().render_handle();
    let drawable = &renderer.drawables[&handle];
    assert_eq!(drawable.transform, moved);
    assert_eq!(drawable.color, 0x0000FF);
}

// =============================================================
// Commands
// =============================================================

#[test]
fn highlight_command_toggles() {
    let mut reg = registry_with_two();
    let mut renderer = CanvasRenderer::new();
    sync(&mut renderer, &mut reg);
    let handle = reg.get(1).unwrap().render_handle();

    RenderCommand::Highlight { handle, on: true }.apply(&mut renderer);
    assert!(renderer.is_highlighted(handle));
    RenderCommand::Highlight { handle, on: false }.apply(&mut renderer);
    assert!(!renderer.is_highlighted(handle));
}

#[test]
fn highlight_unknown_handle_is_ignored() {
    let mut renderer = CanvasRenderer::new();
    renderer.set_highlight(RenderHandle(99), true);
    assert!(!renderer.is_highlighted(RenderHandle(99)));
    assert!(renderer.is_empty());
}

#[test]
fn gizmo_command_sets_and_clears() {
    let mut renderer = CanvasRenderer::new();
    let gizmo = Gizmo::new(GizmoMode::Rotate, Uuid::new_v4(), Vec3::ONE);
    RenderCommand::Gizmo(Some(GizmoView::from(&gizmo))).apply(&mut renderer);
    assert_eq!(renderer.gizmo().map(|g| g.mode), Some(GizmoMode::Rotate));
    RenderCommand::Gizmo(None).apply(&mut renderer);
    assert!(renderer.gizmo().is_none());
}

#[test]
fn camera_command_stores_pose() {
    let mut renderer = CanvasRenderer::new();
    let cam = OrbitCamera::default();
    RenderCommand::Camera(CameraPose::from(&cam)).apply(&mut renderer);
    assert_eq!(renderer.camera.map(|p| p.eye), Some(cam.eye()));
}

// =============================================================
// Helpers
// =============================================================

#[test]
fn css_color_is_six_hex_digits() {
    assert_eq!(css_color(0x0088CC), "#0088CC");
    assert_eq!(css_color(0), "#000000");
    assert_eq!(css_color(0xFF12_3456), "#123456");
}

#[test]
fn handle_color_marks_active_axis() {
    assert_eq!(handle_color(GizmoAxis::X, Some(GizmoAxis::X)), ACTIVE_HANDLE_COLOR);
    assert_ne!(handle_color(GizmoAxis::Y, Some(GizmoAxis::X)), ACTIVE_HANDLE_COLOR);
}

#[test]
fn ring_points_lie_on_ring() {
    let center = Vec3::new(1.0, 2.0, 3.0);
    let segments = ring_points(center);
    assert_eq!(segments.len(), RING_SEGMENTS);
    for (a, _) in segments {
        assert!(((a - center).length() - GIZMO_RING_RADIUS).abs() < 1e-4);
        assert_eq!(a.y, 2.0);
    }
}

#[test]
fn viewport_maps_origin_to_center() {
    let cam = OrbitCamera::default();
    let viewport = Viewport { view_projection: cam.view_projection(), width: 800.0, height: 600.0 };
    let (x, y) = viewport.to_screen(Vec3::ZERO).unwrap();
    assert!((x - 400.0).abs() < 1e-3);
    assert!((y - 300.0).abs() < 1e-3);
}

#[test]
fn viewport_drops_points_behind_eye() {
    let cam = OrbitCamera::default();
    let viewport = Viewport { view_projection: cam.view_projection(), width: 800.0, height: 600.0 };
    assert!(viewport.to_screen(cam.eye() * 2.0).is_none());
}
