//! Camera Tests
//!
//! Tests for:
//! - Rotation normalization and the derived basis vectors
//! - FPS keyboard controls (movement and yaw)
//! - Key binding configuration
//! - Skybox attachment and drawing through the render context

use glam::Vec3;
use lumen::{
    ButtonState, Camera, Key, KeyBindings, Keyboard, RecordingDevice, RenderContext, RenderSettings,
    Resources, create_cuboid,
};

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn holding(keys: &[Key]) -> Keyboard {
    let mut kb = Keyboard::new();
    for &key in keys {
        kb.inject_key(key, ButtonState::Pressed);
    }
    kb
}

// ============================================================================
// Orientation
// ============================================================================

#[test]
fn rotation_is_normalized() {
    let mut cam = Camera::default();
    cam.set_rotation(450.0, -10.0, 720.0);
    assert!(vec3_approx(cam.rotation(), Vec3::new(90.0, 350.0, 0.0)));

    cam.rotate_by(0.0, 20.0, -30.0);
    assert!(vec3_approx(cam.rotation(), Vec3::new(90.0, 10.0, 330.0)));
}

#[test]
fn default_camera_looks_along_positive_z() {
    let cam = Camera::default();
    assert!(vec3_approx(cam.forward(), Vec3::Z));
    assert!(vec3_approx(cam.left(), Vec3::NEG_X));
    assert!(vec3_approx(cam.up(), Vec3::Y));
}

#[test]
fn basis_stays_orthonormal() {
    let mut cam = Camera::default();
    cam.set_rotation(33.0, 217.0, 12.0);
    let (f, l, u) = (cam.forward(), cam.left(), cam.up());
    for v in [f, l, u] {
        assert!((v.length() - 1.0).abs() < EPSILON);
    }
    assert!(f.dot(l).abs() < EPSILON);
    assert!(f.dot(u).abs() < EPSILON);
    assert!(l.dot(u).abs() < EPSILON);
}

#[test]
fn perspective_updates_projection() {
    let mut cam = Camera::default();
    let before = cam.projection_matrix();
    cam.set_perspective(60.0, 0.1, 500.0);
    assert_eq!(cam.far(), 500.0);
    assert_ne!(cam.projection_matrix(), before);
}

// ============================================================================
// FPS controls
// ============================================================================

#[test]
fn arrow_up_moves_forward() {
    let mut cam = Camera::default();
    // 100 ms at 0.01 units/ms
    cam.handle_fps(&holding(&[Key::ArrowUp]), 100.0);
    assert!(vec3_approx(cam.position(), Vec3::new(0.0, 0.0, 1.0)));
}

#[test]
fn strafe_and_climb_combine() {
    let mut cam = Camera::default();
    cam.handle_fps(&holding(&[Key::ArrowLeft, Key::Q]), 100.0);
    assert!(vec3_approx(cam.position(), Vec3::new(-1.0, 1.0, 0.0)));
}

#[test]
fn opposite_keys_prefer_the_first_binding() {
    let mut cam = Camera::default();
    cam.handle_fps(&holding(&[Key::ArrowUp, Key::ArrowDown]), 100.0);
    assert!(vec3_approx(cam.position(), Vec3::new(0.0, 0.0, 1.0)));
}

#[test]
fn yaw_then_walk() {
    let mut cam = Camera::default();
    // 900 ms at 0.1 deg/ms
    cam.handle_fps(&holding(&[Key::D]), 900.0);
    assert!(vec3_approx(cam.rotation(), Vec3::new(0.0, 90.0, 0.0)));

    cam.handle_fps(&holding(&[Key::ArrowUp]), 100.0);
    assert!(vec3_approx(cam.position(), Vec3::new(1.0, 0.0, 0.0)));
}

#[test]
fn released_keys_stop_movement() {
    let mut kb = holding(&[Key::ArrowUp]);
    kb.inject_key(Key::ArrowUp, ButtonState::Released);
    let mut cam = Camera::default();
    cam.handle_fps(&kb, 100.0);
    assert_eq!(cam.position(), Vec3::ZERO);
}

#[test]
fn key_bindings_load_partially_from_json() {
    let bindings: KeyBindings = serde_json::from_str(r#"{ "go_forward": "W", "rotate_x_cw": "I" }"#).unwrap();
    assert_eq!(bindings.go_forward, Key::W);
    assert_eq!(bindings.rotate_x_cw, Key::I);
    assert_eq!(bindings.go_backward, KeyBindings::default().go_backward);

    let mut cam = Camera::default();
    cam.key_bindings = bindings;
    cam.handle_fps(&holding(&[Key::W]), 100.0);
    assert!(vec3_approx(cam.position(), Vec3::new(0.0, 0.0, 1.0)));
}

// ============================================================================
// Skybox
// ============================================================================

#[test]
fn skybox_is_drawn_around_the_camera() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    let resources = Resources::new();

    let mut sky = create_cuboid(50.0, 50.0, 50.0);
    sky.flip_triangles();
    ctx.camera.set_skybox(Some(sky));
    ctx.upload_skybox();
    ctx.camera.set_position(3.0, 1.0, -2.0);

    assert!(ctx.render_frame(|ctx| ctx.draw_skybox(&resources)));
    let draws = &ctx.device().draws;
    assert_eq!(draws.len(), 1);
    let origin = draws[0].uniforms.world_matrix().w_axis.truncate();
    assert!(vec3_approx(origin, Vec3::new(3.0, 1.0, -2.0)));
}

#[test]
fn no_skybox_draws_nothing() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    let resources = Resources::new();
    assert!(ctx.render_frame(|ctx| ctx.draw_skybox(&resources)));
    assert!(ctx.device().draws.is_empty());
}
